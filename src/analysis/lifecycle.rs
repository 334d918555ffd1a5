//! Lifecycle classification of contract records.
//!
//! Pure functions over one record and an explicit reference date.
//! Nothing here reads the wall clock; callers inject `today` so every
//! classification is reproducible.

use crate::models::ContractRecord;
use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

/// States that end a contract's lifecycle. A finalized contract can
/// never be overdue or delayed, whatever its dates say.
const ESTADOS_FINALIZADOS: [&str; 6] = [
    "terminado",
    "cerrado",
    "liquidado",
    "cancelado",
    "suspendido",
    "anulado",
];

/// States that mean the contract is awarded and running.
const ESTADOS_ACTIVOS: [&str; 5] = [
    "en ejecucion",
    "celebrado",
    "aprobado",
    "modificado",
    "activo",
];

/// Normalizes a status string for comparison: trimmed, lowercased, and
/// with combining diacritical marks stripped after NFD decomposition.
///
/// Raw equality on SECOP state text is never valid; the same semantic
/// state arrives as "En Ejecución", "EN EJECUCION", "en ejecución ", etc.
pub fn normalize_status(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Parses a raw date field into a calendar date.
///
/// Accepts `YYYY-MM-DD`, datetime strings with a `YYYY-MM-DD` prefix,
/// and `DD/MM/YYYY`. Anything else is treated as absent, not as an
/// error: downstream rules degrade gracefully on `None`.
pub fn parse_fecha(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    // Datetime strings ("2024-01-01T00:00:00.000") keep their date prefix.
    if s.len() >= 10 && s.is_char_boundary(10) {
        if let Ok(date) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }

    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

fn estado_normalizado(record: &ContractRecord) -> String {
    normalize_status(record.estado_contrato.as_deref().unwrap_or(""))
}

/// Whether the record is in a finalized state.
pub fn is_finalized(record: &ContractRecord) -> bool {
    let estado = estado_normalizado(record);
    ESTADOS_FINALIZADOS.contains(&estado.as_str())
}

/// Whether the record is in an active (awarded, running) state.
/// Finalized takes precedence if a state somehow matches both sets.
pub fn is_active(record: &ContractRecord) -> bool {
    let estado = estado_normalizado(record);
    ESTADOS_ACTIVOS.contains(&estado.as_str()) && !ESTADOS_FINALIZADOS.contains(&estado.as_str())
}

/// Whether the record is past its end date and not finalized.
///
/// A record with no parseable end date is never overdue.
pub fn is_overdue(record: &ContractRecord, today: NaiveDate) -> bool {
    match parse_fecha(record.fecha_fin.as_deref()) {
        Some(fin) => !is_finalized(record) && fin < today,
        None => false,
    }
}

/// Days elapsed since the end date, floored at zero.
/// Returns 0 when the end date is missing or malformed.
pub fn days_overdue(record: &ContractRecord, today: NaiveDate) -> i64 {
    match parse_fecha(record.fecha_fin.as_deref()) {
        Some(fin) => (today - fin).num_days().max(0),
        None => 0,
    }
}

/// Days until the end date, negative when already past.
///
/// `None` is the "unbounded" sentinel for a missing/malformed end date:
/// it never satisfies a "due within N days" check. Callers sorting by
/// urgency must map `None` to `i64::MAX` so unbounded records land
/// after every real deadline.
pub fn days_until_due(record: &ContractRecord, today: NaiveDate) -> Option<i64> {
    parse_fecha(record.fecha_fin.as_deref()).map(|fin| (fin - today).num_days())
}

/// Whether the end date falls within the next `window` days, exclusive
/// of today and inclusive of the window edge. Unbounded records never
/// qualify.
pub fn is_due_within(record: &ContractRecord, today: NaiveDate, window: i64) -> bool {
    matches!(days_until_due(record, today), Some(days) if days > 0 && days <= window)
}

/// Whether an active record is already past its end date.
///
/// This is the alert-generation rule. It intentionally differs from
/// [`is_delayed_by_duration_ratio`], which flags schedule pressure
/// before the end date; both exist as distinct checks.
pub fn is_delayed_execution(record: &ContractRecord, today: NaiveDate) -> bool {
    match parse_fecha(record.fecha_fin.as_deref()) {
        Some(fin) => is_active(record) && today > fin,
        None => false,
    }
}

/// Whether an active record has burned more than 75% of its planned
/// duration with the end date at most 15 days away (and still ahead).
///
/// Requires valid start and end dates; a zero or negative planned
/// duration disqualifies the record.
#[allow(dead_code)] // Stricter schedule-pressure rule, not wired to alerts
pub fn is_delayed_by_duration_ratio(record: &ContractRecord, today: NaiveDate) -> bool {
    if !is_active(record) {
        return false;
    }

    let inicio = match parse_fecha(record.fecha_inicio.as_deref()) {
        Some(d) => d,
        None => return false,
    };
    let fin = match parse_fecha(record.fecha_fin.as_deref()) {
        Some(d) => d,
        None => return false,
    };

    let total_days = (fin - inicio).num_days();
    if total_days <= 0 {
        return false;
    }

    let elapsed_days = (today - inicio).num_days();
    let pct_elapsed = elapsed_days as f64 / total_days as f64 * 100.0;

    let hasta_fin = (fin - today).num_days();
    pct_elapsed > 75.0 && hasta_fin > 0 && hasta_fin <= 15
}

/// Planned execution duration in days, when both dates parse.
pub fn execution_days(record: &ContractRecord) -> Option<i64> {
    let inicio = parse_fecha(record.fecha_inicio.as_deref())?;
    let fin = parse_fecha(record.fecha_fin.as_deref())?;
    Some((fin - inicio).num_days())
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
    fn test_normalize_status_strips_case_and_diacritics() {
        assert_eq!(normalize_status("En Ejecución"), "en ejecucion");
        assert_eq!(normalize_status("  TERMINADO  "), "terminado");
        assert_eq!(
            normalize_status("En Ejecución"),
            normalize_status("en ejecucion")
        );
        assert_eq!(normalize_status("Anulado"), "anulado");
    }

    #[test]
    fn test_parse_fecha_variants() {
        assert_eq!(parse_fecha(Some("2024-01-05")), Some(date(2024, 1, 5)));
        assert_eq!(
            parse_fecha(Some("2024-01-05T13:45:00.000")),
            Some(date(2024, 1, 5))
        );
        assert_eq!(parse_fecha(Some("05/01/2024")), Some(date(2024, 1, 5)));
        assert_eq!(parse_fecha(Some("not a date")), None);
        assert_eq!(parse_fecha(Some("")), None);
        assert_eq!(parse_fecha(Some("2024-13-40")), None);
        assert_eq!(parse_fecha(None), None);
    }

    #[test]
    fn test_is_overdue_requires_valid_end_date() {
        let today = date(2024, 2, 15);
        assert!(is_overdue(&record("En ejecución", Some("2024-01-01")), today));
        assert!(!is_overdue(&record("En ejecución", None), today));
        assert!(!is_overdue(&record("En ejecución", Some("garbage")), today));
    }

    #[test]
    fn test_is_overdue_finalized_never_overdue() {
        let today = date(2024, 2, 15);
        assert!(!is_overdue(&record("Terminado", Some("2024-01-01")), today));
        assert!(!is_overdue(&record("Liquidado", Some("2020-01-01")), today));
    }

    #[test]
    fn test_is_overdue_monotonic_around_end_date() {
        let r = record("Celebrado", Some("2024-02-10"));
        assert!(!is_overdue(&r, date(2024, 2, 9)));
        assert!(!is_overdue(&r, date(2024, 2, 10)));
        assert!(is_overdue(&r, date(2024, 2, 11)));
        assert!(is_overdue(&r, date(2025, 2, 11)));
    }

    #[test]
    fn test_days_overdue_count() {
        // fechaFin 2024-01-01, today 2024-02-15: 45 days overdue.
        let r = record("En ejecución", Some("2024-01-01"));
        let today = date(2024, 2, 15);
        assert!(is_overdue(&r, today));
        assert_eq!(days_overdue(&r, today), 45);
    }

    #[test]
    fn test_days_overdue_floors_at_zero() {
        let r = record("Celebrado", Some("2024-03-01"));
        assert_eq!(days_overdue(&r, date(2024, 2, 1)), 0);
        assert_eq!(days_overdue(&record("Celebrado", None), date(2024, 2, 1)), 0);
    }

    #[test]
    fn test_days_until_due_sentinel() {
        let today = date(2024, 2, 20);
        let r = record("Celebrado", Some("2024-03-01"));
        assert_eq!(days_until_due(&r, today), Some(10));

        let unbounded = record("Celebrado", None);
        assert_eq!(days_until_due(&unbounded, today), None);
        assert!(!is_due_within(&unbounded, today, 30));
        // Mapped to i64::MAX for urgency sorting, None lands last.
        let mut deltas = vec![days_until_due(&unbounded, today), days_until_due(&r, today)];
        deltas.sort_by_key(|d| d.unwrap_or(i64::MAX));
        assert_eq!(deltas[0], Some(10));
        assert_eq!(deltas[1], None);
    }

    #[test]
    fn test_is_due_within_excludes_today_and_past() {
        let today = date(2024, 2, 20);
        assert!(!is_due_within(&record("Celebrado", Some("2024-02-20")), today, 30));
        assert!(!is_due_within(&record("Celebrado", Some("2024-02-01")), today, 30));
        assert!(is_due_within(&record("Celebrado", Some("2024-03-21")), today, 30));
        assert!(!is_due_within(&record("Celebrado", Some("2024-03-22")), today, 30));
    }

    #[test]
    fn test_is_active_and_finalized_precedence() {
        assert!(is_active(&record("CELEBRADO", None)));
        assert!(is_active(&record("en ejecución", None)));
        assert!(!is_active(&record("Terminado", None)));
        assert!(!is_active(&record("Borrador", None)));
        assert!(is_finalized(&record("Suspendido", None)));
    }

    #[test]
    fn test_is_delayed_execution_requires_active_state() {
        let today = date(2024, 2, 15);
        assert!(is_delayed_execution(&record("En ejecución", Some("2024-01-01")), today));
        // Overdue but not active: vencido, not ejecución retrasada.
        assert!(!is_delayed_execution(&record("Borrador", Some("2024-01-01")), today));
        assert!(!is_delayed_execution(&record("Terminado", Some("2024-01-01")), today));
        assert!(!is_delayed_execution(&record("En ejecución", None), today));
        // Not yet past the end date.
        assert!(!is_delayed_execution(&record("En ejecución", Some("2024-02-15")), today));
    }

    #[test]
    fn test_duration_ratio_rule() {
        let mut r = record("En ejecución", Some("2024-04-10"));
        r.fecha_inicio = Some("2024-01-01".to_string());
        // Total 100 days. At day 90 (2024-03-31): 90% elapsed, 10 days left.
        assert!(is_delayed_by_duration_ratio(&r, date(2024, 3, 31)));
        // At day 50: 50% elapsed.
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 2, 20)));
        // Past the end date: ratio rule no longer applies.
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 4, 11)));
        // End date exactly today: not within the forward window.
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 4, 10)));
    }

    #[test]
    fn test_duration_ratio_rejects_degenerate_spans() {
        let mut r = record("En ejecución", Some("2024-01-01"));
        r.fecha_inicio = Some("2024-01-01".to_string());
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 1, 1)));

        r.fecha_inicio = Some("2024-06-01".to_string());
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 1, 1)));

        let mut missing = record("En ejecución", Some("2024-04-10"));
        missing.fecha_inicio = None;
        assert!(!is_delayed_by_duration_ratio(&missing, date(2024, 3, 31)));
    }

    #[test]
    fn test_duration_ratio_requires_window_proximity() {
        let mut r = record("En ejecución", Some("2024-12-31"));
        r.fecha_inicio = Some("2024-01-01".to_string());
        // 90% elapsed but more than 15 days from the end.
        assert!(!is_delayed_by_duration_ratio(&r, date(2024, 11, 28)));
        // Inside the 15-day window with >75% elapsed.
        assert!(is_delayed_by_duration_ratio(&r, date(2024, 12, 20)));
    }

    #[test]
    fn test_execution_days() {
        let mut r = record("Celebrado", Some("2024-01-31"));
        r.fecha_inicio = Some("2024-01-01".to_string());
        assert_eq!(execution_days(&r), Some(30));

        r.fecha_inicio = None;
        assert_eq!(execution_days(&r), None);
    }
}
