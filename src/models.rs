//! Data models for the contract analyzer.
//!
//! This module contains the canonical contract record shape, the alert
//! types derived from lifecycle classification, and the KPI snapshot
//! produced by the aggregator.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity level of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - no action required
    Info,
    /// Warning - approaching a deadline or mildly overdue
    Advertencia,
    /// Critical - far overdue or imminent deadline
    Critica,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Advertencia => write!(f, "Advertencia"),
            Severity::Critica => write!(f, "Crítica"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "🔵",
            Severity::Advertencia => "🟡",
            Severity::Critica => "🔴",
        }
    }
}

/// Kind of lifecycle alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    /// Past its end date and not finalized.
    Vencido,
    /// End date within the next 30 days.
    ProximoVencimiento,
    /// Active but already past its end date.
    EjecucionRetrasada,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Vencido => write!(f, "Vencido"),
            AlertKind::ProximoVencimiento => write!(f, "Próximo a vencer"),
            AlertKind::EjecucionRetrasada => write!(f, "Ejecución retrasada"),
        }
    }
}

/// Canonical contract record after source normalization.
///
/// Both SECOP sources (signed contracts and in-flight procurement
/// processes) are mapped onto this shape before any analysis runs.
/// Date fields stay as raw strings here; parsing happens in the
/// lifecycle module and a malformed date is treated as absent.
/// Monetary fields stay as loose JSON values (number, string with
/// currency symbols, or null) until coerced by `to_number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractRecord {
    /// Contract identifier, when the source assigns one.
    pub id_contrato: Option<String>,
    /// Contract reference code.
    pub referencia_contrato: Option<String>,
    /// Procurement process reference (processes only).
    pub referencia_proceso: Option<String>,
    /// Tax ID of the contracting entity.
    pub nit_entidad: Option<String>,
    /// Supplier identity document.
    pub documento_proveedor: Option<String>,
    /// Signing date (raw string, possibly malformed).
    pub fecha_firma: Option<String>,
    /// Execution start date (raw string, possibly malformed).
    pub fecha_inicio: Option<String>,
    /// Execution end date (raw string, possibly malformed).
    pub fecha_fin: Option<String>,
    /// Free-text contract state as reported by the source.
    pub estado_contrato: Option<String>,
    /// Contract value; number, currency string, or null.
    pub valor_contrato: Value,
    /// Paid value; number, currency string, or null.
    pub valor_pagado: Value,
    /// Pending-payment value; number, currency string, or null.
    pub valor_pendiente: Value,
    /// Contracting modality.
    pub modalidad_contratacion: Option<String>,
    /// Contract type.
    pub tipo_contrato: Option<String>,
    /// Awarded supplier name.
    pub proveedor_adjudicado: Option<String>,
    /// Contract object (what is being contracted).
    pub objeto_contrato: Option<String>,
    /// Longer process description.
    pub descripcion_proceso: Option<String>,
    /// Whether the supplier is a registered SME.
    pub es_pyme: Option<String>,
    /// Supervisor name.
    pub nombre_supervisor: Option<String>,
    /// Liquidation state or date.
    pub liquidacion: Option<String>,
    /// Last update timestamp as reported by the source.
    pub ultima_actualizacion: Option<String>,
}

/// A lifecycle alert derived from one contract record.
///
/// Alerts are recomputed on every pass and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// What triggered the alert.
    pub kind: AlertKind,
    /// The contract that triggered it.
    pub contract: ContractRecord,
    /// Days overdue (vencido, ejecución retrasada) or days until due
    /// (próximo a vencer).
    pub dias_delta: i64,
    /// Escalation level.
    pub severity: Severity,
}

impl Alert {
    /// A short human-readable reference for the underlying contract.
    pub fn contract_ref(&self) -> &str {
        self.contract
            .id_contrato
            .as_deref()
            .or(self.contract.referencia_contrato.as_deref())
            .or(self.contract.referencia_proceso.as_deref())
            .unwrap_or("(sin referencia)")
    }
}

/// Usage share of one contracting modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalidadUso {
    pub modalidad: String,
    pub cantidad: usize,
    /// Fraction of all records, in 0..1.
    pub porcentaje: f64,
}

/// Aggregate row for one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProveedorResumen {
    pub proveedor: String,
    pub cantidad: usize,
    pub valor_total: f64,
}

/// Min/max execution duration in days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangoDias {
    pub min: i64,
    pub max: i64,
}

/// KPI snapshot over one filtered record set at one reference date.
///
/// All rate fields are fractions in 0..1 and are 0 (never NaN or
/// infinite) when the record set is empty. Groupings preserve first-seen
/// insertion order so output is deterministic across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Total record count.
    pub total_procesos: usize,
    /// Records in an active state.
    pub total_adjudicados: usize,
    /// `total_adjudicados / total_procesos`.
    pub tasa_adjudicacion: f64,
    /// Sum of contract values.
    pub suma_adjudicado: f64,
    /// Sum of paid values.
    pub suma_pagado: f64,
    /// `suma_adjudicado / total_procesos`.
    pub promedio_precio_base: f64,
    /// Record count per signing year.
    pub contratos_por_anio: IndexMap<String, usize>,
    /// Record count per signing month (`YYYY-MM`).
    pub contratos_por_mes: IndexMap<String, usize>,
    /// Modalities sorted by usage, descending.
    pub modalidades_mas_usadas: Vec<ModalidadUso>,
    /// Top 20 suppliers by record count, descending.
    pub proveedores_mas_frecuentes: Vec<ProveedorResumen>,
    /// Record count per raw (display) state text.
    pub distribucion_estados: IndexMap<String, usize>,
    /// Record count per contract type.
    pub distribucion_tipos: IndexMap<String, usize>,
    /// Average execution duration in days, rounded.
    pub tiempo_ejecucion_promedio: i64,
    /// Min/max execution duration in days.
    pub tiempo_ejecucion_rango: RangoDias,
    pub contratos_retrasados: usize,
    pub porcentaje_retrasados: f64,
    pub contratos_vencidos: usize,
    pub porcentaje_vencidos: f64,
    pub contratos_proximo_vencimiento: usize,
    pub porcentaje_proximo_vencimiento: f64,
}

/// Summary of alerts by severity and kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Total number of alerts.
    pub total: usize,
    /// Number of critical alerts.
    pub criticas: usize,
    /// Number of warning alerts.
    pub advertencias: usize,
    /// Number of informational alerts.
    pub info: usize,
    /// Alerts grouped by kind.
    pub por_tipo: IndexMap<String, usize>,
}

impl AlertSummary {
    /// Creates a summary from a list of alerts.
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self::default();
        summary.total = alerts.len();

        for alert in alerts {
            match alert.severity {
                Severity::Critica => summary.criticas += 1,
                Severity::Advertencia => summary.advertencias += 1,
                Severity::Info => summary.info += 1,
            }

            *summary.por_tipo.entry(alert.kind.to_string()).or_insert(0) += 1;
        }

        summary
    }
}

/// Metadata about one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tax ID of the analyzed entity, if filtered.
    pub nit_entidad: Option<String>,
    /// Start of the analyzed date range.
    pub fecha_desde: NaiveDate,
    /// End of the analyzed date range.
    pub fecha_hasta: NaiveDate,
    /// Reference date used for all lifecycle classification.
    pub fecha_corte: NaiveDate,
    /// Wall-clock time the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Signed-contract records ingested (before dedup).
    pub contratos_origen: usize,
    /// Procurement-process records ingested (before dedup).
    pub procesos_origen: usize,
    /// Records after merge and dedup.
    pub registros_analizados: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Aggregated indicators.
    pub kpis: KpiSnapshot,
    /// Lifecycle alerts, most severe first.
    pub alerts: Vec<Alert>,
    /// Summary statistics of the alerts.
    pub summary: AlertSummary,
}
