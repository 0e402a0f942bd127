use std::fmt;

#[derive(Debug)]
pub enum MergeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (missing source, bad kind, empty key, etc.).
    ConfigValidation(String),
    /// A source named in the config has no loaded table.
    UnknownSource(String),
    /// Missing required column in a source's data.
    MissingColumn { source: String, column: String },
    /// CSV read error.
    Csv { source: String, message: String },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownSource(source) => write!(f, "unknown source: {source}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
            Self::Csv { source, message } => {
                write!(f, "source '{source}': CSV error: {message}")
            }
        }
    }
}

impl std::error::Error for MergeError {}
