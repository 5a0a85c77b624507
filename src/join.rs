//! Left joins of auxiliary extracts onto the base summary table.
//!
//! Joins preserve base cardinality: every base row survives exactly once,
//! unmatched rows get empty cells, and auxiliary rows without a base match
//! are dropped. Because every join keys on the company identifier and adds
//! a disjoint column set, join order does not matter.

use crate::table::RawTable;
use std::collections::HashMap;

/// Left-joins `columns` of `aux` onto `base` by `key`. Columns absent from
/// `aux` or already present in `base` are skipped silently; duplicate keys
/// in `aux` resolve to the first occurrence.
pub fn left_join_columns(base: &mut RawTable, aux: &RawTable, key: &str, columns: &[&str]) {
    let aux_key_idx = match aux.column_index(key) {
        Some(idx) => idx,
        None => {
            log::debug!(
                "Join skipped: '{}' has no '{}' column",
                aux.name,
                key
            );
            return;
        }
    };
    let base_key_idx = match base.column_index(key) {
        Some(idx) => idx,
        None => {
            log::debug!(
                "Join skipped: base '{}' has no '{}' column",
                base.name,
                key
            );
            return;
        }
    };

    let mut lookup: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in &aux.rows {
        if let Some(k) = row.get(aux_key_idx) {
            lookup.entry(k.as_str()).or_insert(row);
        }
    }

    for column in columns {
        if *column == key {
            continue;
        }
        let aux_col_idx = match aux.column_index(column) {
            Some(idx) => idx,
            None => continue,
        };
        if base.has_column(column) {
            log::debug!(
                "Join of '{}' skipped column '{}': already in base",
                aux.name,
                column
            );
            continue;
        }

        let values: Vec<String> = base
            .rows
            .iter()
            .map(|row| {
                row.get(base_key_idx)
                    .and_then(|k| lookup.get(k.as_str()))
                    .and_then(|aux_row| aux_row.get(aux_col_idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        let new_idx = base.add_column(*column);
        for (row, value) in base.rows.iter_mut().zip(values) {
            row[new_idx] = value;
        }
    }

    log::debug!(
        "Joined '{}' onto '{}' ({} rows)",
        aux.name,
        base.name,
        base.row_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RawTable {
        let mut t = RawTable::with_headers(
            "base",
            vec!["id_empresa".to_string(), "total".to_string()],
        );
        t.push_row(vec!["1".to_string(), "10".to_string()]);
        t.push_row(vec!["2".to_string(), "20".to_string()]);
        t.push_row(vec!["1".to_string(), "30".to_string()]);
        t
    }

    fn aux() -> RawTable {
        let mut t = RawTable::with_headers(
            "aux",
            vec!["id_empresa".to_string(), "grupo".to_string()],
        );
        t.push_row(vec!["1".to_string(), "A".to_string()]);
        t.push_row(vec!["3".to_string(), "B".to_string()]);
        t
    }

    #[test]
    fn test_join_preserves_base_cardinality() {
        let mut b = base();
        let before = b.row_count();
        left_join_columns(&mut b, &aux(), "id_empresa", &["grupo"]);
        assert_eq!(b.row_count(), before);
    }

    #[test]
    fn test_join_fills_matches_and_leaves_gaps() {
        let mut b = base();
        left_join_columns(&mut b, &aux(), "id_empresa", &["grupo"]);
        let grupo = b.column_values("grupo");
        // Company 2 has no aux row; company 3's aux row is dropped.
        assert_eq!(grupo, vec!["A", "", "A"]);
    }

    #[test]
    fn test_join_skips_when_key_missing() {
        let mut b = base();
        let no_key = RawTable::with_headers("aux", vec!["grupo".to_string()]);
        left_join_columns(&mut b, &no_key, "id_empresa", &["grupo"]);
        assert!(!b.has_column("grupo"));
    }

    #[test]
    fn test_join_skips_absent_columns() {
        let mut b = base();
        left_join_columns(&mut b, &aux(), "id_empresa", &["grupo", "inexistente"]);
        assert!(b.has_column("grupo"));
        assert!(!b.has_column("inexistente"));
    }

    #[test]
    fn test_duplicate_aux_keys_use_first_match() {
        let mut dup = aux();
        dup.push_row(vec!["1".to_string(), "Z".to_string()]);
        let mut b = base();
        left_join_columns(&mut b, &dup, "id_empresa", &["grupo"]);
        assert_eq!(b.column_values("grupo"), vec!["A", "", "A"]);
    }
}
