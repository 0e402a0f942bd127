//! `fscape merge` — config-driven dataset reconciliation.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Subcommand;

use foodscape_merge::{load_table, run, MergeConfig, MergeInput, SourceTable};

use crate::exit_codes::{EXIT_MERGE_INVALID_CONFIG, EXIT_MERGE_RUNTIME};
use crate::util::open_output;
use crate::CliError;

#[derive(Subcommand)]
pub enum MergeCommands {
    /// Run a merge from a TOML config file
    #[command(after_help = "\
Examples:
  fscape merge run merge.toml -o merged.csv
  fscape merge run merge.toml --json -o merged.csv")]
    Run {
        /// Path to the merge config file
        config: PathBuf,

        /// Output CSV file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print run metadata + summary as JSON to stdout
        /// (the merged table then goes only to --output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a merge config without running
    #[command(after_help = "\
Examples:
  fscape merge validate merge.toml")]
    Validate {
        /// Path to the merge config file
        config: PathBuf,
    },
}

pub fn cmd_merge(cmd: MergeCommands) -> Result<(), CliError> {
    match cmd {
        MergeCommands::Run { config, output, json } => cmd_merge_run(config, output, json),
        MergeCommands::Validate { config } => cmd_merge_validate(config),
    }
}

fn merge_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn cmd_merge_run(
    config_path: PathBuf,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, format!("cannot read config: {}", e)))?;
    let config = MergeConfig::from_toml(&config_str)
        .map_err(|e| merge_err(EXIT_MERGE_INVALID_CONFIG, e.to_string()))?;

    // Source files resolve relative to the config file's directory.
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let mut tables: HashMap<String, SourceTable> = HashMap::new();
    for (source_name, source) in &config.sources {
        let csv_path = base_dir.join(&source.file);
        let csv_data = std::fs::read_to_string(&csv_path).map_err(|e| {
            merge_err(
                EXIT_MERGE_RUNTIME,
                format!("cannot read {}: {}", csv_path.display(), e),
            )
        })?;
        let table = load_table(source_name, &csv_data)
            .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, e.to_string()))?;
        tables.insert(source_name.clone(), table);
    }

    let result = run(&config, &MergeInput { tables })
        .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, e.to_string()))?;

    // The merged table. With --json and no --output the table is skipped
    // so stdout stays valid JSON.
    if output.is_some() || !json {
        write_table(&result.table, &output)?;
    }

    let s = &result.summary;
    eprintln!(
        "{} merge '{}': {} base + {} {} rows -> {} output rows",
        result.meta.kind,
        result.meta.config_name,
        s.base_rows,
        s.incoming_rows,
        if result.meta.kind == "enrich" { "detail" } else { "incoming" },
        s.output_rows,
    );
    if s.filtered_out > 0 {
        eprintln!("  {} row(s) removed by filters", s.filtered_out);
    }
    if s.appended > 0 || s.matched_existing > 0 {
        eprintln!(
            "  {} appended, {} already present",
            s.appended, s.matched_existing,
        );
    }
    if s.dropped_missing_coords > 0 || s.dropped_out_of_bounds > 0 {
        eprintln!(
            "  dropped {} without coordinates, {} out of bounds",
            s.dropped_missing_coords, s.dropped_out_of_bounds,
        );
    }
    if s.enriched > 0 || s.unmatched_base > 0 {
        eprintln!("  {} enriched, {} base rows unmatched", s.enriched, s.unmatched_base);
    }
    for (source, count) in &s.duplicate_keys {
        eprintln!("warning: source '{}' has {} duplicate key(s)", source, count);
    }

    if json {
        let meta_json = serde_json::json!({
            "meta": result.meta,
            "summary": result.summary,
        });
        let json_str = serde_json::to_string_pretty(&meta_json).map_err(|e| {
            merge_err(EXIT_MERGE_RUNTIME, format!("JSON serialization error: {}", e))
        })?;
        println!("{json_str}");
    }

    Ok(())
}

/// Write the merged table as CSV. The header row is always written, even
/// for an empty table.
fn write_table(table: &SourceTable, output: &Option<PathBuf>) -> Result<(), CliError> {
    let writer = open_output(output)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(&table.headers)
        .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    for record in &table.records {
        csv_writer
            .write_record(record)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }
    csv_writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))
}

fn cmd_merge_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| merge_err(EXIT_MERGE_RUNTIME, format!("cannot read config: {}", e)))?;

    match MergeConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: {} merge '{}' with {} source(s)",
                config.kind,
                config.name,
                config.sources.len(),
            );
            Ok(())
        }
        Err(e) => Err(merge_err(EXIT_MERGE_INVALID_CONFIG, e.to_string())),
    }
}
