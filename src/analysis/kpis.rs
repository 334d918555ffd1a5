//! KPI aggregation over a classified record set.
//!
//! Everything here is a pure function of the records and the reference
//! date. Monetary fields arrive as loose JSON values and go through
//! [`to_number`] before any arithmetic; rate fields are fractions in
//! 0..1 and degrade to 0 on an empty set.

use crate::analysis::lifecycle::{
    execution_days, is_active, is_delayed_execution, is_due_within, is_overdue, parse_fecha,
};
use crate::models::{ContractRecord, KpiSnapshot, ModalidadUso, ProveedorResumen, RangoDias};
use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Rows kept in the supplier ranking.
const TOP_PROVEEDORES: usize = 20;
/// Grouping label for records missing a field.
const SIN_DATO: &str = "N/D";

/// Coerces a loose monetary field to a number.
///
/// Numbers pass through. Null (and any non-string, non-number value)
/// becomes 0. Strings are stripped of every character that is not a
/// digit, `.`, or `-`, then parsed; when the full cleaned string does
/// not parse, the longest parseable prefix is used (so a mixed-locale
/// value still yields a finite magnitude). Anything unparseable is 0.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_loose_number(s),
        _ => 0.0,
    }
}

fn parse_loose_number(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    for end in (1..=cleaned.len()).rev() {
        if !cleaned.is_char_boundary(end) {
            continue;
        }
        if let Ok(v) = cleaned[..end].parse::<f64>() {
            return if v.is_finite() { v } else { 0.0 };
        }
    }

    0.0
}

fn safe_rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Computes the KPI snapshot for a record set at the reference date.
///
/// The delayed-execution KPI uses the state+date rule
/// (`is_delayed_execution`), matching alert generation.
pub fn compute_kpis(records: &[ContractRecord], today: NaiveDate) -> KpiSnapshot {
    let total = records.len();

    let total_adjudicados = records.iter().filter(|r| is_active(r)).count();
    let suma_adjudicado: f64 = records.iter().map(|r| to_number(&r.valor_contrato)).sum();
    let suma_pagado: f64 = records.iter().map(|r| to_number(&r.valor_pagado)).sum();

    let promedio_precio_base = if total == 0 {
        0.0
    } else {
        suma_adjudicado / total as f64
    };

    // Year/month groupings skip records whose signing date does not parse.
    let mut contratos_por_anio: IndexMap<String, usize> = IndexMap::new();
    let mut contratos_por_mes: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        if let Some(firma) = parse_fecha(record.fecha_firma.as_deref()) {
            *contratos_por_anio.entry(firma.year().to_string()).or_insert(0) += 1;
            *contratos_por_mes
                .entry(firma.format("%Y-%m").to_string())
                .or_insert(0) += 1;
        }
    }

    let mut por_modalidad: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let modalidad = record
            .modalidad_contratacion
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| SIN_DATO.to_string());
        *por_modalidad.entry(modalidad).or_insert(0) += 1;
    }
    let mut modalidades_mas_usadas: Vec<ModalidadUso> = por_modalidad
        .into_iter()
        .map(|(modalidad, cantidad)| ModalidadUso {
            modalidad,
            cantidad,
            porcentaje: safe_rate(cantidad, total),
        })
        .collect();
    // Stable sort: ties keep first-seen order.
    modalidades_mas_usadas.sort_by(|a, b| b.cantidad.cmp(&a.cantidad));

    let mut por_proveedor: IndexMap<String, (usize, f64)> = IndexMap::new();
    for record in records {
        let proveedor = record
            .proveedor_adjudicado
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| SIN_DATO.to_string());
        let entry = por_proveedor.entry(proveedor).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += to_number(&record.valor_contrato);
    }
    let mut proveedores_mas_frecuentes: Vec<ProveedorResumen> = por_proveedor
        .into_iter()
        .map(|(proveedor, (cantidad, valor_total))| ProveedorResumen {
            proveedor,
            cantidad,
            valor_total,
        })
        .collect();
    proveedores_mas_frecuentes.sort_by(|a, b| b.cantidad.cmp(&a.cantidad));
    proveedores_mas_frecuentes.truncate(TOP_PROVEEDORES);

    // Grouped by display text on purpose: different spellings of the
    // same semantic state stay separate here.
    let mut distribucion_estados: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let estado = record
            .estado_contrato
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| SIN_DATO.to_string());
        *distribucion_estados.entry(estado).or_insert(0) += 1;
    }

    let mut distribucion_tipos: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let tipo = record
            .tipo_contrato
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| SIN_DATO.to_string());
        *distribucion_tipos.entry(tipo).or_insert(0) += 1;
    }

    let duraciones: Vec<i64> = records
        .iter()
        .filter_map(execution_days)
        .filter(|d| *d > 0)
        .collect();
    let (tiempo_ejecucion_promedio, tiempo_ejecucion_rango) = if duraciones.is_empty() {
        (0, RangoDias::default())
    } else {
        let suma: i64 = duraciones.iter().sum();
        let promedio = (suma as f64 / duraciones.len() as f64).round() as i64;
        let min = *duraciones.iter().min().unwrap_or(&0);
        let max = *duraciones.iter().max().unwrap_or(&0);
        (promedio, RangoDias { min, max })
    };

    let contratos_retrasados = records
        .iter()
        .filter(|r| is_delayed_execution(r, today))
        .count();
    let contratos_vencidos = records.iter().filter(|r| is_overdue(r, today)).count();
    let contratos_proximo_vencimiento = records
        .iter()
        .filter(|r| is_due_within(r, today, 30))
        .count();

    debug!(
        total,
        vencidos = contratos_vencidos,
        retrasados = contratos_retrasados,
        "computed KPI snapshot"
    );

    KpiSnapshot {
        total_procesos: total,
        total_adjudicados,
        tasa_adjudicacion: safe_rate(total_adjudicados, total),
        suma_adjudicado,
        suma_pagado,
        promedio_precio_base,
        contratos_por_anio,
        contratos_por_mes,
        modalidades_mas_usadas,
        proveedores_mas_frecuentes,
        distribucion_estados,
        distribucion_tipos,
        tiempo_ejecucion_promedio,
        tiempo_ejecucion_rango,
        contratos_retrasados,
        porcentaje_retrasados: safe_rate(contratos_retrasados, total),
        contratos_vencidos,
        porcentaje_vencidos: safe_rate(contratos_vencidos, total),
        contratos_proximo_vencimiento,
        porcentaje_proximo_vencimiento: safe_rate(contratos_proximo_vencimiento, total),
    }
}
