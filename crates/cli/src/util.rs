//! Small shared helpers for CLI commands.

use std::io::{Read, Write};
use std::path::PathBuf;

use foodscape_merge::model::normalize_header;

use crate::CliError;

/// Read a CSV input from a file path or stdin.
pub(crate) fn read_input(input: &Option<PathBuf>) -> Result<String, CliError> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e))),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("cannot read stdin: {}", e)))?;
            Ok(buf)
        }
    }
}

/// Open the output target (file or stdout) as a buffered writer.
pub(crate) fn open_output(output: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output {
        Some(path) => {
            let f = std::fs::File::create(path)
                .map_err(|e| CliError::io(format!("cannot create {}: {}", path.display(), e)))?;
            Ok(Box::new(std::io::BufWriter::new(f)))
        }
        None => Ok(Box::new(std::io::BufWriter::new(std::io::stdout().lock()))),
    }
}

/// Locate a column by normalization-insensitive name ("Outlet Name"
/// addresses OUTLET_NAME).
pub(crate) fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    headers.iter().position(|h| normalize_header(h) == wanted)
}
