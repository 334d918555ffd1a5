//! Alert generation from classified contract records.

use crate::analysis::lifecycle::{
    days_overdue, days_until_due, is_delayed_execution, is_overdue,
};
use crate::models::{Alert, AlertKind, ContractRecord, Severity};
use chrono::NaiveDate;
use tracing::debug;

/// Days-until-due window that triggers a "próximo a vencer" alert.
const VENTANA_PROXIMO_VENCIMIENTO: i64 = 30;
/// Days overdue past which a "vencido" alert escalates to critical.
const UMBRAL_VENCIDO_CRITICO: i64 = 30;
/// Days-until-due at or below which a "próximo a vencer" alert is critical.
const UMBRAL_PROXIMO_CRITICO: i64 = 7;

/// Generates lifecycle alerts for a record set at the given reference
/// date.
///
/// The three checks are independent: one record can emit zero, one,
/// two, or all three alert kinds. Alerts are ephemeral; callers
/// recompute them on every pass.
pub fn generate_alerts(records: &[ContractRecord], today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for record in records {
        if is_overdue(record, today) {
            let dias = days_overdue(record, today);
            alerts.push(Alert {
                kind: AlertKind::Vencido,
                contract: record.clone(),
                dias_delta: dias,
                severity: if dias > UMBRAL_VENCIDO_CRITICO {
                    Severity::Critica
                } else {
                    Severity::Advertencia
                },
            });
        }

        if let Some(dias) = days_until_due(record, today) {
            if dias > 0 && dias <= VENTANA_PROXIMO_VENCIMIENTO {
                alerts.push(Alert {
                    kind: AlertKind::ProximoVencimiento,
                    contract: record.clone(),
                    dias_delta: dias,
                    severity: if dias <= UMBRAL_PROXIMO_CRITICO {
                        Severity::Critica
                    } else {
                        Severity::Advertencia
                    },
                });
            }
        }

        if is_delayed_execution(record, today) {
            alerts.push(Alert {
                kind: AlertKind::EjecucionRetrasada,
                contract: record.clone(),
                dias_delta: days_overdue(record, today),
                severity: Severity::Critica,
            });
        }
    }

    debug!(alerts = alerts.len(), records = records.len(), "generated alerts");
    alerts
}

/// Sort alerts in place, most severe first; ties keep larger overdue
/// deltas first.
pub fn sort_alerts_by_severity(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.dias_delta.cmp(&a.dias_delta))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(estado: &str, fin: Option<&str>) -> ContractRecord {
        let mut r = ContractRecord::default();
        r.estado_contrato = Some(estado.to_string());
        r.fecha_fin = fin.map(String::from);
        r
    }

    #[test]
    fn test_overdue_alert_critical_past_30_days() {
        // fechaFin 2024-01-01, today 2024-02-15: vencido, 45 days, crítica.
        let records = vec![record("En ejecución", Some("2024-01-01"))];
        let alerts = generate_alerts(&records, date(2024, 2, 15));

        let vencido: Vec<_> = alerts
            .iter()
            .filter(|a| a.kind == AlertKind::Vencido)
            .collect();
        assert_eq!(vencido.len(), 1);
        assert_eq!(vencido[0].dias_delta, 45);
        assert_eq!(vencido[0].severity, Severity::Critica);
    }

    #[test]
    fn test_overdue_alert_warning_within_30_days() {
        let records = vec![record("Borrador", Some("2024-02-01"))];
        let alerts = generate_alerts(&records, date(2024, 2, 15));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Vencido);
        assert_eq!(alerts[0].dias_delta, 14);
        assert_eq!(alerts[0].severity, Severity::Advertencia);
    }

    #[test]
    fn test_upcoming_due_alert() {
        // fechaFin 2024-03-01, today 2024-02-20: 10 days out, advertencia.
        let records = vec![record("Celebrado", Some("2024-03-01"))];
        let alerts = generate_alerts(&records, date(2024, 2, 20));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::ProximoVencimiento);
        assert_eq!(alerts[0].dias_delta, 10);
        assert_eq!(alerts[0].severity, Severity::Advertencia);
    }

    #[test]
    fn test_upcoming_due_alert_critical_within_week() {
        let records = vec![record("Celebrado", Some("2024-02-25"))];
        let alerts = generate_alerts(&records, date(2024, 2, 20));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critica);
    }

    #[test]
    fn test_active_overdue_record_emits_two_alerts() {
        // Active and past its end date: vencido + ejecución retrasada.
        let records = vec![record("En ejecución", Some("2024-02-10"))];
        let alerts = generate_alerts(&records, date(2024, 2, 15));

        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::Vencido));
        let retrasada = alerts
            .iter()
            .find(|a| a.kind == AlertKind::EjecucionRetrasada)
            .unwrap();
        assert_eq!(retrasada.dias_delta, 5);
        assert_eq!(retrasada.severity, Severity::Critica);
    }

    #[test]
    fn test_missing_end_date_emits_nothing() {
        let records = vec![
            record("En ejecución", None),
            record("Celebrado", Some("un dia de estos")),
        ];
        assert!(generate_alerts(&records, date(2024, 2, 15)).is_empty());
    }

    #[test]
    fn test_finalized_record_emits_nothing() {
        let records = vec![record("Liquidado", Some("2023-01-01"))];
        assert!(generate_alerts(&records, date(2024, 2, 15)).is_empty());
    }

    #[test]
    fn test_sort_alerts_by_severity() {
        let mut alerts = generate_alerts(
            &[
                record("Celebrado", Some("2024-03-01")),
                record("Borrador", Some("2023-06-01")),
            ],
            date(2024, 2, 20),
        );
        sort_alerts_by_severity(&mut alerts);

        assert_eq!(alerts[0].severity, Severity::Critica);
        assert_eq!(alerts[0].kind, AlertKind::Vencido);
        assert_eq!(alerts[1].severity, Severity::Advertencia);
    }
}
