//! CSV export shape for filtered record sets.
//!
//! Pure data shaping: a fixed column order and row building, plus
//! string assembly with RFC 4180 quoting. Writing the file is the
//! caller's job.

use crate::analysis::kpis::to_number;
use crate::models::ContractRecord;

/// Fixed column order for the export.
pub const CSV_HEADER: [&str; 18] = [
    "Referencia",
    "Estado",
    "Fecha de firma",
    "Fecha de inicio",
    "Fecha de fin",
    "Modalidad",
    "Tipo de contrato",
    "Valor",
    "Proveedor",
    "Documento proveedor",
    "Es PyME",
    "Objeto",
    "Descripción",
    "Supervisor",
    "Valor pagado",
    "Valor pendiente",
    "Liquidación",
    "Última actualización",
];

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn money_cell(value: &serde_json::Value) -> String {
    if value.is_null() {
        String::new()
    } else {
        to_number(value).to_string()
    }
}

/// Builds one row per record in the header's column order.
pub fn csv_rows(records: &[ContractRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            let referencia = r
                .referencia_contrato
                .clone()
                .or_else(|| r.referencia_proceso.clone())
                .or_else(|| r.id_contrato.clone())
                .unwrap_or_default();

            vec![
                referencia,
                cell(&r.estado_contrato),
                cell(&r.fecha_firma),
                cell(&r.fecha_inicio),
                cell(&r.fecha_fin),
                cell(&r.modalidad_contratacion),
                cell(&r.tipo_contrato),
                money_cell(&r.valor_contrato),
                cell(&r.proveedor_adjudicado),
                cell(&r.documento_proveedor),
                cell(&r.es_pyme),
                cell(&r.objeto_contrato),
                cell(&r.descripcion_proceso),
                cell(&r.nombre_supervisor),
                money_cell(&r.valor_pagado),
                money_cell(&r.valor_pendiente),
                cell(&r.liquidacion),
                cell(&r.ultima_actualizacion),
            ]
        })
        .collect()
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Assembles the full CSV document (header plus rows).
pub fn to_csv_string(records: &[ContractRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        CSV_HEADER
            .iter()
            .map(|h| quote(h))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in csv_rows(records) {
        lines.push(
            row.iter()
                .map(|f| quote(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}
