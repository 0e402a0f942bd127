use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Normalize a column name the way every loaded table is normalized:
/// trimmed, uppercased, spaces replaced with underscores. Config column
/// references pass through the same normalization, so "Outlet Name" and
/// "OUTLET_NAME" address the same column.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_uppercase().replace(' ', "_")
}

/// One loaded CSV table with normalized headers. Records are padded to the
/// header width at load time.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl SourceTable {
    /// Index of a column by (normalized) name.
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| *h == wanted)
    }
}

/// Pre-loaded tables keyed by source name ("base", "incoming", "detail").
pub struct MergeInput {
    pub tables: HashMap<String, SourceTable>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Counters for one merge run. Kind-specific fields stay zero for the
/// other kind. Non-zero `duplicate_keys` and `unmatched_base` values are
/// warnings, not errors — silent mismatches would corrupt downstream
/// aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeSummary {
    pub output_rows: usize,
    pub base_rows: usize,
    /// Rows in the incoming/detail source after filters.
    pub incoming_rows: usize,
    pub filtered_out: usize,
    /// Append: incoming rows added to the output.
    pub appended: usize,
    /// Append: incoming keys already present in the base.
    pub matched_existing: usize,
    pub dropped_missing_coords: usize,
    pub dropped_out_of_bounds: usize,
    /// Enrich: base rows that found a detail match.
    pub enriched: usize,
    /// Enrich: base rows with no detail match.
    pub unmatched_base: usize,
    /// Per source, composite keys appearing more than once.
    pub duplicate_keys: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub config_name: String,
    pub kind: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    pub table: SourceTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header("Outlet Name"), "OUTLET_NAME");
        assert_eq!(normalize_header(" store_name "), "STORE_NAME");
        assert_eq!(normalize_header("ZIP4"), "ZIP4");
    }

    #[test]
    fn column_lookup_is_normalization_insensitive() {
        let table = SourceTable {
            headers: vec!["STORE_NAME".into(), "ZIP_CODE".into()],
            records: vec![],
        };
        assert_eq!(table.column("store name"), Some(0));
        assert_eq!(table.column("Zip Code"), Some(1));
        assert_eq!(table.column("missing"), None);
    }
}
