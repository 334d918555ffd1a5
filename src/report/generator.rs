//! Markdown report generation.
//!
//! This module renders the analysis report (KPI snapshot plus lifecycle
//! alerts) as Markdown or JSON.

use crate::models::{Alert, AlertSummary, KpiSnapshot, Report, ReportMetadata, Severity};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Informe de Contratación - SecopLens\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Alert summary
    output.push_str(&generate_summary_section(&report.summary));

    // KPI section
    output.push_str(&generate_kpi_section(&report.kpis));

    // Alert detail
    output.push_str(&generate_alerts_section(&report.alerts));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadatos\n\n");
    if let Some(ref nit) = metadata.nit_entidad {
        section.push_str(&format!("- **NIT entidad:** {}\n", nit));
    }
    section.push_str(&format!(
        "- **Rango analizado:** {} a {}\n",
        metadata.fecha_desde, metadata.fecha_hasta
    ));
    section.push_str(&format!("- **Fecha de corte:** {}\n", metadata.fecha_corte));
    section.push_str(&format!(
        "- **Generado:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Contratos firmados (origen):** {}\n",
        metadata.contratos_origen
    ));
    section.push_str(&format!(
        "- **Procesos en curso (origen):** {}\n",
        metadata.procesos_origen
    ));
    section.push_str(&format!(
        "- **Registros tras deduplicación:** {}\n",
        metadata.registros_analizados
    ));
    section.push_str(&format!(
        "- **Duración del análisis:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push_str("\n");

    section
}

/// Generate the alert summary section.
fn generate_summary_section(summary: &AlertSummary) -> String {
    let mut section = String::new();

    section.push_str("## Resumen de Alertas\n\n");
    section.push_str(&format!(
        "| {} Críticas | {} Advertencias | {} Info | **Total** |\n",
        Severity::Critica.emoji(),
        Severity::Advertencia.emoji(),
        Severity::Info.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        summary.criticas, summary.advertencias, summary.info, summary.total
    ));

    if !summary.por_tipo.is_empty() {
        section.push_str("### Alertas por Tipo\n\n");
        section.push_str("| Tipo | Cantidad |\n");
        section.push_str("|:---|:---:|\n");

        for (tipo, count) in &summary.por_tipo {
            section.push_str(&format!("| {} | {} |\n", tipo, count));
        }
        section.push_str("\n");
    }

    section
}

fn pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Generate the KPI section.
fn generate_kpi_section(kpis: &KpiSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Indicadores\n\n");
    section.push_str(&format!("- **Total de procesos:** {}\n", kpis.total_procesos));
    section.push_str(&format!(
        "- **Adjudicados:** {} ({})\n",
        kpis.total_adjudicados,
        pct(kpis.tasa_adjudicacion)
    ));
    section.push_str(&format!("- **Valor contratado:** $ {:.2}\n", kpis.suma_adjudicado));
    section.push_str(&format!("- **Valor pagado:** $ {:.2}\n", kpis.suma_pagado));
    section.push_str(&format!(
        "- **Precio base promedio:** $ {:.2}\n",
        kpis.promedio_precio_base
    ));
    section.push_str(&format!(
        "- **Vencidos:** {} ({})\n",
        kpis.contratos_vencidos,
        pct(kpis.porcentaje_vencidos)
    ));
    section.push_str(&format!(
        "- **Próximos a vencer (30 días):** {} ({})\n",
        kpis.contratos_proximo_vencimiento,
        pct(kpis.porcentaje_proximo_vencimiento)
    ));
    section.push_str(&format!(
        "- **En ejecución retrasada:** {} ({})\n",
        kpis.contratos_retrasados,
        pct(kpis.porcentaje_retrasados)
    ));
    if kpis.tiempo_ejecucion_promedio > 0 {
        section.push_str(&format!(
            "- **Tiempo de ejecución:** {} días en promedio (mín {}, máx {})\n",
            kpis.tiempo_ejecucion_promedio,
            kpis.tiempo_ejecucion_rango.min,
            kpis.tiempo_ejecucion_rango.max
        ));
    }
    section.push_str("\n");

    if !kpis.contratos_por_anio.is_empty() {
        section.push_str("### Contratos por Año\n\n");
        section.push_str("| Año | Contratos |\n");
        section.push_str("|:---|:---:|\n");
        for (anio, count) in &kpis.contratos_por_anio {
            section.push_str(&format!("| {} | {} |\n", anio, count));
        }
        section.push_str("\n");
    }

    if !kpis.modalidades_mas_usadas.is_empty() {
        section.push_str("### Modalidades más Usadas\n\n");
        section.push_str("| Modalidad | Cantidad | Porcentaje |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for m in &kpis.modalidades_mas_usadas {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                m.modalidad,
                m.cantidad,
                pct(m.porcentaje)
            ));
        }
        section.push_str("\n");
    }

    if !kpis.proveedores_mas_frecuentes.is_empty() {
        section.push_str("### Proveedores más Frecuentes\n\n");
        section.push_str("| Proveedor | Contratos | Valor total |\n");
        section.push_str("|:---|:---:|---:|\n");
        for p in &kpis.proveedores_mas_frecuentes {
            section.push_str(&format!(
                "| {} | {} | $ {:.2} |\n",
                p.proveedor, p.cantidad, p.valor_total
            ));
        }
        section.push_str("\n");
    }

    if !kpis.distribucion_estados.is_empty() {
        section.push_str("### Distribución de Estados\n\n");
        section.push_str("| Estado | Cantidad |\n");
        section.push_str("|:---|:---:|\n");
        for (estado, count) in &kpis.distribucion_estados {
            section.push_str(&format!("| {} | {} |\n", estado, count));
        }
        section.push_str("\n");
    }

    if !kpis.distribucion_tipos.is_empty() {
        section.push_str("### Distribución por Tipo de Contrato\n\n");
        section.push_str("| Tipo | Cantidad |\n");
        section.push_str("|:---|:---:|\n");
        for (tipo, count) in &kpis.distribucion_tipos {
            section.push_str(&format!("| {} | {} |\n", tipo, count));
        }
        section.push_str("\n");
    }

    section
}

/// Generate the alert detail section.
fn generate_alerts_section(alerts: &[Alert]) -> String {
    let mut section = String::new();

    section.push_str("## Alertas\n\n");

    if alerts.is_empty() {
        section.push_str("No hay alertas para el rango analizado.\n\n");
        return section;
    }

    for alert in alerts {
        section.push_str(&generate_alert_block(alert));
    }

    section
}

/// Generate a single alert block.
fn generate_alert_block(alert: &Alert) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### {} **{}** - {}\n\n",
        alert.severity.emoji(),
        alert.kind,
        alert.contract_ref()
    ));

    let dias_label = match alert.kind {
        crate::models::AlertKind::ProximoVencimiento => "Días restantes",
        _ => "Días de atraso",
    };
    block.push_str(&format!("**{}:** {}\n\n", dias_label, alert.dias_delta));

    if let Some(ref estado) = alert.contract.estado_contrato {
        block.push_str(&format!("**Estado:** {}\n\n", estado));
    }
    if let Some(ref proveedor) = alert.contract.proveedor_adjudicado {
        block.push_str(&format!("**Proveedor:** {}\n\n", proveedor));
    }
    if let Some(ref objeto) = alert.contract.objeto_contrato {
        block.push_str(&format!("**Objeto:** {}\n\n", objeto));
    }
    if let Some(ref fin) = alert.contract.fecha_fin {
        block.push_str(&format!("**Fecha de fin:** {}\n\n", fin));
    }

    block.push_str("---\n\n");

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Informe generado por SecopLens*\n");

    footer
}

/// Write the Markdown report to a file.
#[allow(dead_code)] // Alternative to writing from main
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
