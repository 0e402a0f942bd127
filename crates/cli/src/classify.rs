//! `fscape classify` — append cuisine classification columns to a CSV.

use std::collections::BTreeMap;
use std::path::PathBuf;

use foodscape_taxonomy::UNCATEGORIZED;

use crate::exit_codes::{EXIT_CLASSIFY_MISSING_COLUMN, EXIT_CLASSIFY_PARSE};
use crate::taxonomy::load_taxonomy;
use crate::util::{find_column, open_output, read_input};
use crate::CliError;

/// Columns appended to every classified row, in order.
const RESULT_COLUMNS: [&str; 4] = ["CUISINE_TYPE", "REGION", "SUBREGION", "SUB_SUBREGION"];

pub fn cmd_classify(
    input: Option<PathBuf>,
    name_col: String,
    type_col: String,
    taxonomy_path: Option<PathBuf>,
    exclude: Vec<String>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let taxonomy = load_taxonomy(&taxonomy_path)?;

    if !quiet {
        let ambiguous = taxonomy.ambiguous_triggers();
        if !ambiguous.is_empty() {
            eprintln!(
                "warning: {} trigger(s) appear under multiple categories; first match wins (see `fscape taxonomy lint`)",
                ambiguous.len(),
            );
        }
    }

    let data = read_input(&input)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| parse_err(format!("cannot read CSV header: {}", e)))?
        .clone();

    let name_idx = find_column(&headers, &name_col).ok_or_else(|| CliError {
        code: EXIT_CLASSIFY_MISSING_COLUMN,
        message: format!("input has no '{}' column", name_col),
        hint: Some("point --name-col at the store name column".into()),
    })?;
    // The store type column is optional; missing values coerce to "".
    let type_idx = find_column(&headers, &type_col);

    let excludes: Vec<String> = exclude.iter().map(|e| e.to_lowercase()).collect();

    let writer = open_output(&output)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut out_headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out_headers.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));
    csv_writer
        .write_record(&out_headers)
        .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;

    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    let mut excluded = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| parse_err(format!("CSV parse error: {}", e)))?;

        let store_name = record.get(name_idx).unwrap_or("");
        let store_type = type_idx.and_then(|i| record.get(i)).unwrap_or("");

        let lowered = store_name.to_lowercase();
        if excludes.iter().any(|e| lowered.contains(e)) {
            excluded += 1;
            continue;
        }

        let classification = taxonomy.classify(store_name, store_type);

        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        row.push(classification.label.clone());
        row.push(classification.region.unwrap_or_default());
        row.push(classification.subregion.unwrap_or_default());
        row.push(classification.sub_subregion.unwrap_or_default());
        csv_writer
            .write_record(&row)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;

        *label_counts.entry(classification.label).or_insert(0) += 1;
        total += 1;
    }

    csv_writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))?;

    if !quiet {
        print_summary(total, excluded, &label_counts);
    }

    Ok(())
}

fn parse_err(message: String) -> CliError {
    CliError { code: EXIT_CLASSIFY_PARSE, message, hint: None }
}

/// Category distribution on stderr, largest first.
fn print_summary(total: usize, excluded: usize, label_counts: &BTreeMap<String, usize>) {
    let uncategorized = label_counts.get(UNCATEGORIZED).copied().unwrap_or(0);
    let excluded_note = if excluded > 0 {
        format!(" ({} excluded)", excluded)
    } else {
        String::new()
    };
    eprintln!(
        "classified {} rows — {} categorized, {} uncategorized{}",
        total,
        total - uncategorized,
        uncategorized,
        excluded_note,
    );

    let mut counts: Vec<(&str, usize)> = label_counts
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (label, count) in counts {
        eprintln!("  {:<28} {}", label, count);
    }
}
