use std::collections::{HashMap, HashSet};

use crate::config::{MergeConfig, MergeKind, RowFilter, SourceConfig};
use crate::error::MergeError;
use crate::model::{MergeInput, MergeMeta, MergeResult, MergeSummary, SourceTable};

/// Run a merge per config. Returns the output table plus a summary.
pub fn run(config: &MergeConfig, input: &MergeInput) -> Result<MergeResult, MergeError> {
    let [base_name, other_name] = config.required_sources();

    let base = table(input, base_name)?;
    let other = table(input, other_name)?;

    let mut summary = MergeSummary::default();
    summary.base_rows = base.records.len();

    let out_table = match config.kind {
        MergeKind::Append => run_append(config, base, other, &mut summary)?,
        MergeKind::Enrich => run_enrich(config, base, other, &mut summary)?,
    };
    summary.output_rows = out_table.records.len();

    Ok(MergeResult {
        meta: MergeMeta {
            config_name: config.name.clone(),
            kind: config.kind.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        table: out_table,
    })
}

fn table<'a>(input: &'a MergeInput, name: &str) -> Result<&'a SourceTable, MergeError> {
    input
        .tables
        .get(name)
        .ok_or_else(|| MergeError::UnknownSource(name.to_string()))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse CSV text into a table with normalized headers. Short records are
/// padded to the header width, long ones truncated.
pub fn load_table(source_name: &str, csv_data: &str) -> Result<SourceTable, MergeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MergeError::Csv {
            source: source_name.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(crate::model::normalize_header)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Csv {
            source: source_name.into(),
            message: e.to_string(),
        })?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        records.push(row);
    }

    Ok(SourceTable { headers, records })
}

// ---------------------------------------------------------------------------
// Keys + filters
// ---------------------------------------------------------------------------

/// Resolve the configured key columns to indices.
fn key_indices(
    source_name: &str,
    source: &SourceConfig,
    table: &SourceTable,
) -> Result<Vec<usize>, MergeError> {
    source
        .key
        .iter()
        .map(|column| column_index(source_name, table, column))
        .collect()
}

fn column_index(
    source_name: &str,
    table: &SourceTable,
    column: &str,
) -> Result<usize, MergeError> {
    table.column(column).ok_or_else(|| MergeError::MissingColumn {
        source: source_name.into(),
        column: column.into(),
    })
}

/// Space-joined, uppercased composite key.
fn composite_key(record: &[String], key_idx: &[usize]) -> String {
    key_idx
        .iter()
        .map(|&i| record[i].trim())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn passes_filters(record: &[String], filters: &[(usize, &RowFilter)]) -> bool {
    filters.iter().all(|(idx, filter)| {
        let cell = record[*idx].trim();
        let value_ok = filter.values.is_empty() || filter.values.iter().any(|v| v == cell);
        let prefix_ok = filter
            .prefix
            .as_deref()
            .map_or(true, |prefix| cell.starts_with(prefix));
        value_ok && prefix_ok
    })
}

fn resolve_filters<'a>(
    source_name: &str,
    source: &'a SourceConfig,
    table: &SourceTable,
) -> Result<Vec<(usize, &'a RowFilter)>, MergeError> {
    source
        .filter
        .iter()
        .map(|f| Ok((column_index(source_name, table, &f.column)?, f)))
        .collect()
}

/// Count composite keys that appear more than once.
fn count_duplicates(keys: &[String]) -> usize {
    let mut seen = HashSet::new();
    keys.iter().filter(|k| !seen.insert(k.as_str())).count()
}

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

fn run_append(
    config: &MergeConfig,
    base: &SourceTable,
    incoming: &SourceTable,
    summary: &mut MergeSummary,
) -> Result<SourceTable, MergeError> {
    let base_config = &config.sources["base"];
    let incoming_config = &config.sources["incoming"];

    let base_key_idx = key_indices("base", base_config, base)?;
    let incoming_key_idx = key_indices("incoming", incoming_config, incoming)?;
    let filters = resolve_filters("incoming", incoming_config, incoming)?;

    // Incoming column -> base column mapping, resolved up front.
    let mut mapping: Vec<(usize, usize)> = Vec::new();
    for (from, to) in &incoming_config.map {
        let from_idx = column_index("incoming", incoming, from)?;
        let to_idx = column_index("base", base, to)?;
        mapping.push((from_idx, to_idx));
    }

    let mut defaults: Vec<(usize, &str)> = Vec::new();
    for (column, value) in &incoming_config.defaults {
        defaults.push((column_index("base", base, column)?, value.as_str()));
    }

    let naics = match &config.naics {
        Some(n) => Some((
            column_index("incoming", incoming, &n.column)?,
            column_index("base", base, &n.into)?,
            n,
        )),
        None => None,
    };

    let bounds = match &config.bounds {
        Some(b) => Some((
            column_index("incoming", incoming, &b.lat_column)?,
            column_index("incoming", incoming, &b.lon_column)?,
            b,
        )),
        None => None,
    };

    let id_idx = match &config.id {
        Some(id) => Some(column_index("base", base, &id.column)?),
        None => None,
    };

    // Base key set; duplicates within the base are a data-quality warning.
    let base_keys: Vec<String> = base
        .records
        .iter()
        .map(|r| composite_key(r, &base_key_idx))
        .collect();
    let dup_base = count_duplicates(&base_keys);
    if dup_base > 0 {
        summary.duplicate_keys.insert("base".into(), dup_base);
    }
    let base_key_set: HashSet<&str> = base_keys.iter().map(String::as_str).collect();

    let kept: Vec<&Vec<String>> = incoming
        .records
        .iter()
        .filter(|r| passes_filters(r, &filters))
        .collect();
    summary.filtered_out = incoming.records.len() - kept.len();
    summary.incoming_rows = kept.len();

    let incoming_keys: Vec<String> = kept
        .iter()
        .map(|r| composite_key(r, &incoming_key_idx))
        .collect();
    let dup_incoming = count_duplicates(&incoming_keys);
    if dup_incoming > 0 {
        summary.duplicate_keys.insert("incoming".into(), dup_incoming);
    }

    let mut records = base.records.clone();

    for (record, key) in kept.iter().zip(&incoming_keys) {
        if base_key_set.contains(key.as_str()) {
            summary.matched_existing += 1;
            continue;
        }

        if let Some((lat_idx, lon_idx, b)) = bounds {
            let lat = record[lat_idx].trim().parse::<f64>();
            let lon = record[lon_idx].trim().parse::<f64>();
            match (lat, lon) {
                (Ok(lat), Ok(lon)) => {
                    if lat < b.lat_min || lat > b.lat_max || lon < b.lon_min || lon > b.lon_max {
                        summary.dropped_out_of_bounds += 1;
                        continue;
                    }
                }
                _ => {
                    summary.dropped_missing_coords += 1;
                    continue;
                }
            }
        }

        let mut row = vec![String::new(); base.headers.len()];
        for &(from_idx, to_idx) in &mapping {
            row[to_idx] = record[from_idx].clone();
        }
        for &(idx, value) in &defaults {
            row[idx] = value.to_string();
        }
        if let Some((code_idx, into_idx, n)) = naics {
            let code = normalize_code(&record[code_idx]);
            row[into_idx] = n.map.get(code).cloned().unwrap_or_else(|| n.default.clone());
        }
        if let Some(idx) = id_idx {
            row[idx] = generate_record_id();
        }

        records.push(row);
        summary.appended += 1;
    }

    Ok(SourceTable {
        headers: base.headers.clone(),
        records,
    })
}

/// The integer part of a NAICS (or county) code cell, so "445110" and
/// "445110.0" compare equal.
fn normalize_code(cell: &str) -> &str {
    let cell = cell.trim();
    match cell.split_once('.') {
        Some((head, _)) => head,
        None => cell,
    }
}

/// UUIDv4-derived 64-bit decimal id for appended records.
fn generate_record_id() -> String {
    (uuid::Uuid::new_v4().as_u128() >> 64).to_string()
}

// ---------------------------------------------------------------------------
// Enrich
// ---------------------------------------------------------------------------

fn run_enrich(
    config: &MergeConfig,
    base: &SourceTable,
    detail: &SourceTable,
    summary: &mut MergeSummary,
) -> Result<SourceTable, MergeError> {
    let base_config = &config.sources["base"];
    let detail_config = &config.sources["detail"];

    let base_key_idx = key_indices("base", base_config, base)?;
    let detail_key_idx = key_indices("detail", detail_config, detail)?;
    let filters = resolve_filters("detail", detail_config, detail)?;

    let kept: Vec<&Vec<String>> = detail
        .records
        .iter()
        .filter(|r| passes_filters(r, &filters))
        .collect();
    summary.filtered_out = detail.records.len() - kept.len();
    summary.incoming_rows = kept.len();

    // Columns to pull onto matched base rows: configured list, or every
    // non-key detail column.
    let take_idx: Vec<usize> = match &detail_config.take {
        Some(columns) => columns
            .iter()
            .map(|c| column_index("detail", detail, c))
            .collect::<Result<_, _>>()?,
        None => (0..detail.headers.len())
            .filter(|i| !detail_key_idx.contains(i))
            .collect(),
    };

    // First occurrence wins on duplicate detail keys; extras are counted.
    let mut detail_by_key: HashMap<String, &Vec<String>> = HashMap::new();
    let mut dup_detail = 0;
    for record in &kept {
        let key = composite_key(record, &detail_key_idx);
        if detail_by_key.contains_key(&key) {
            dup_detail += 1;
        } else {
            detail_by_key.insert(key, *record);
        }
    }
    if dup_detail > 0 {
        summary.duplicate_keys.insert("detail".into(), dup_detail);
    }

    let base_keys: Vec<String> = base
        .records
        .iter()
        .map(|r| composite_key(r, &base_key_idx))
        .collect();
    let dup_base = count_duplicates(&base_keys);
    if dup_base > 0 {
        summary.duplicate_keys.insert("base".into(), dup_base);
    }

    let mut headers = base.headers.clone();
    headers.extend(take_idx.iter().map(|&i| detail.headers[i].clone()));

    let mut records = Vec::with_capacity(base.records.len());
    for (record, key) in base.records.iter().zip(&base_keys) {
        let mut row = record.clone();
        match detail_by_key.get(key) {
            Some(detail_record) => {
                row.extend(take_idx.iter().map(|&i| detail_record[i].clone()));
                summary.enriched += 1;
            }
            None => {
                row.extend(take_idx.iter().map(|_| String::new()));
                summary.unmatched_base += 1;
            }
        }
        records.push(row);
    }

    Ok(SourceTable { headers, records })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_table_normalizes_and_pads() {
        let csv = "Store Name,Zip Code,Extra\na,75201\nb,75202,x,y\n";
        let table = load_table("base", csv).unwrap();
        assert_eq!(table.headers, vec!["STORE_NAME", "ZIP_CODE", "EXTRA"]);
        assert_eq!(table.records[0], vec!["a", "75201", ""]);
        assert_eq!(table.records[1], vec!["b", "75202", "x"]);
    }

    #[test]
    fn composite_key_joins_and_uppercases() {
        let record = vec!["101 Elm St".to_string(), "dallas".to_string(), "tx".to_string()];
        assert_eq!(composite_key(&record, &[0, 1, 2]), "101 ELM ST DALLAS TX");
    }

    #[test]
    fn normalize_code_strips_decimal_part() {
        assert_eq!(normalize_code("445110"), "445110");
        assert_eq!(normalize_code("445110.0"), "445110");
        assert_eq!(normalize_code(" 57.0 "), "57");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn generated_ids_are_decimal_and_distinct() {
        let a = generate_record_id();
        let b = generate_record_id();
        assert!(a.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn duplicate_counting() {
        let keys = vec!["A".to_string(), "B".to_string(), "A".to_string(), "A".to_string()];
        assert_eq!(count_duplicates(&keys), 2);
    }
}
