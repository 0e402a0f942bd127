use std::fmt;

#[derive(Debug)]
pub enum TaxonomyError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// The table has no entries.
    EmptyTable,
    /// Two entries share the same label.
    DuplicateLabel(String),
    /// An entry declares no triggers.
    NoTriggers(String),
    /// An entry declares an empty or whitespace-only trigger.
    EmptyTrigger(String),
}

impl fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "taxonomy parse error: {msg}"),
            Self::EmptyTable => write!(f, "taxonomy has no entries"),
            Self::DuplicateLabel(label) => write!(f, "duplicate label: {label}"),
            Self::NoTriggers(label) => write!(f, "entry '{label}' has no triggers"),
            Self::EmptyTrigger(label) => {
                write!(f, "entry '{label}' has an empty trigger")
            }
        }
    }
}

impl std::error::Error for TaxonomyError {}
