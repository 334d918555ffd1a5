//! Merge and deduplication of the two SECOP record sources.
//!
//! Signed contracts and in-flight procurement processes describe the
//! same logical contracts with different field names. After both are
//! mapped onto [`ContractRecord`], this module concatenates them
//! (signed contracts first) and keeps the first occurrence per
//! identity key, so the signed-contract version wins on collision.

use crate::models::ContractRecord;
use std::collections::HashSet;
use tracing::debug;

/// Identity key for deduplication.
///
/// `id_contrato` wins when present. Otherwise the composite
/// `referencia|nit|documento|fechaFirma` identifies the record; missing
/// parts become empty strings, so fully blank records share the key
/// `"|||"` and collapse into one. That collapse is an accepted
/// data-quality floor, not an accident.
pub fn identity_key(record: &ContractRecord) -> String {
    if let Some(id) = record.id_contrato.as_deref() {
        if !id.is_empty() {
            return format!("id:{id}");
        }
    }

    format!(
        "{}|{}|{}|{}",
        record.referencia_contrato.as_deref().unwrap_or(""),
        record.nit_entidad.as_deref().unwrap_or(""),
        record.documento_proveedor.as_deref().unwrap_or(""),
        record.fecha_firma.as_deref().unwrap_or(""),
    )
}

/// Merges signed contracts and mapped procurement processes into one
/// deduplicated record set.
///
/// Iteration order is concatenation order and the output is stable:
/// first occurrence per identity key survives, later matches are
/// dropped. No re-sorting happens here; consumers sort as needed.
pub fn merge(
    contracts: Vec<ContractRecord>,
    processes: Vec<ContractRecord>,
) -> Vec<ContractRecord> {
    let input_len = contracts.len() + processes.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(input_len);
    let mut merged: Vec<ContractRecord> = Vec::with_capacity(input_len);

    for record in contracts.into_iter().chain(processes) {
        let key = identity_key(&record);
        if seen.insert(key) {
            merged.push(record);
        }
    }

    debug!(
        total = input_len,
        unique = merged.len(),
        dropped = input_len - merged.len(),
        "merged contract sources"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn with_id(id: &str, estado: &str) -> ContractRecord {
        let mut r = ContractRecord::default();
        r.id_contrato = Some(id.to_string());
        r.estado_contrato = Some(estado.to_string());
        r
    }

    fn with_composite(referencia: &str, nit: &str, doc: &str, firma: &str) -> ContractRecord {
        let mut r = ContractRecord::default();
        r.referencia_contrato = Some(referencia.to_string());
        r.nit_entidad = Some(nit.to_string());
        r.documento_proveedor = Some(doc.to_string());
        r.fecha_firma = Some(firma.to_string());
        r
    }

    #[test]
    fn test_first_occurrence_wins() {
        let merged = merge(
            vec![with_id("C1", "Celebrado")],
            vec![with_id("C1", "Borrador"), with_id("C2", "Borrador")],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].estado_contrato.as_deref(), Some("Celebrado"));
        assert_eq!(merged[1].id_contrato.as_deref(), Some("C2"));
    }

    #[test]
    fn test_composite_key_fallback() {
        let a = with_composite("REF-1", "900123", "CC-9", "2024-01-01");
        let b = with_composite("REF-1", "900123", "CC-9", "2024-01-01");
        let c = with_composite("REF-1", "900123", "CC-9", "2024-06-01");

        let merged = merge(vec![a], vec![b, c]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_blank_records_collapse() {
        let merged = merge(
            vec![ContractRecord::default(), ContractRecord::default()],
            vec![ContractRecord::default()],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(identity_key(&merged[0]), "|||");
    }

    #[test]
    fn test_empty_id_falls_back_to_composite() {
        let mut r = with_composite("REF-2", "900123", "CC-9", "2024-01-01");
        r.id_contrato = Some(String::new());
        assert_eq!(identity_key(&r), "REF-2|900123|CC-9|2024-01-01");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let records = vec![
            with_id("C1", "Celebrado"),
            with_id("C2", "En ejecución"),
            with_composite("REF-1", "900123", "CC-9", "2024-01-01"),
        ];
        let once = merge(records.clone(), records);
        let twice = merge(once.clone(), Vec::new());

        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            assert_eq!(identity_key(a), identity_key(b));
        }
    }

    #[test]
    fn test_no_duplicate_keys_in_output() {
        let merged = merge(
            vec![with_id("C1", "a"), with_id("C1", "b"), with_id("C3", "c")],
            vec![with_id("C3", "d"), ContractRecord::default(), ContractRecord::default()],
        );

        let keys: HashSet<String> = merged.iter().map(identity_key).collect();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn test_order_is_stable() {
        let merged = merge(
            vec![with_id("B", "x"), with_id("A", "x")],
            vec![with_id("C", "x")],
        );
        let ids: Vec<_> = merged.iter().map(|r| r.id_contrato.clone().unwrap()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }
}
