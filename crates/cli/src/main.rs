// foodscape CLI - outlet classification and dataset reconciliation

mod classify;
mod exit_codes;
mod geocode;
mod merge;
mod taxonomy;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "fscape")]
#[command(about = "Food-outlet classification and dataset reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify store names into cuisine categories
    #[command(after_help = "\
Examples:
  fscape classify outlets.csv -o classified.csv
  cat outlets.csv | fscape classify > classified.csv
  fscape classify outlets.csv --name-col 'Outlet Name' --type-col 'Outlet Type'
  fscape classify outlets.csv --taxonomy custom.toml --exclude 'bath & body works'")]
    Classify {
        /// Input CSV (omit to read from stdin)
        input: Option<PathBuf>,

        /// Column holding the store display name
        #[arg(long, default_value = "STORE_NAME")]
        name_col: String,

        /// Column holding the declared store type (may be absent)
        #[arg(long, default_value = "STORE_TYPE")]
        type_col: String,

        /// Custom taxonomy TOML (defaults to the built-in table)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Drop rows whose store name contains this text (repeatable,
        /// case-insensitive)
        #[arg(long, value_name = "SUBSTR")]
        exclude: Vec<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Suppress the stderr summary and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Merge outlet datasets per a TOML config
    #[command(subcommand)]
    Merge(merge::MergeCommands),

    /// Batch-geocode addresses via the Census Bureau geocoder
    #[command(after_help = "\
Examples:
  fscape geocode permits.csv -o permits_geocoded.csv
  fscape geocode permits.csv --address-col ADDRESS --city-col TOWN
  fscape geocode permits.csv --benchmark Public_AR_Census2020")]
    Geocode {
        /// Input CSV (omit to read from stdin)
        input: Option<PathBuf>,

        /// Column holding a unique row id (defaults to the row index)
        #[arg(long)]
        id_col: Option<String>,

        /// Street address column
        #[arg(long, default_value = "OUTLET_ADDRESS")]
        address_col: String,

        /// City column
        #[arg(long, default_value = "OUTLET_CITY")]
        city_col: String,

        /// State column
        #[arg(long, default_value = "OUTLET_STATE")]
        state_col: String,

        /// ZIP code column
        #[arg(long, default_value = "OUTLET_ZIP_CODE")]
        zip_col: String,

        /// Census geocoder benchmark
        #[arg(long, default_value = geocode::DEFAULT_BENCHMARK)]
        benchmark: String,

        /// Override the geocoder base URL (testing)
        #[arg(long, hide = true)]
        base_url: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Suppress stderr progress and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Inspect the cuisine taxonomy
    #[command(subcommand)]
    Taxonomy(taxonomy::TaxonomyCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify {
            input,
            name_col,
            type_col,
            taxonomy,
            exclude,
            output,
            quiet,
        } => classify::cmd_classify(input, name_col, type_col, taxonomy, exclude, output, quiet),
        Commands::Merge(cmd) => merge::cmd_merge(cmd),
        Commands::Geocode {
            input,
            id_col,
            address_col,
            city_col,
            state_col,
            zip_col,
            benchmark,
            base_url,
            output,
            quiet,
        } => geocode::cmd_geocode(
            input,
            id_col,
            address_col,
            city_col,
            state_col,
            zip_col,
            benchmark,
            base_url,
            output,
            quiet,
        ),
        Commands::Taxonomy(cmd) => taxonomy::cmd_taxonomy(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
