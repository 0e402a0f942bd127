use std::collections::HashMap;

use serde::Deserialize;

use crate::error::MergeError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MergeConfig {
    pub name: String,
    pub kind: MergeKind,
    pub sources: HashMap<String, SourceConfig>,
    #[serde(default)]
    pub naics: Option<NaicsConfig>,
    #[serde(default)]
    pub bounds: Option<BoundsConfig>,
    #[serde(default)]
    pub id: Option<IdConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
    /// Append incoming rows whose key is absent from the base.
    Append,
    /// Left-join detail columns onto base rows by key.
    Enrich,
}

impl std::fmt::Display for MergeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Enrich => write!(f, "enrich"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Columns joined (space-separated, uppercased) into the composite
    /// match key.
    pub key: Vec<String>,
    /// Row filters, all of which must pass. Applied at load time.
    #[serde(default)]
    pub filter: Vec<RowFilter>,
    /// Incoming column → base column mapping (append only).
    #[serde(default)]
    pub map: HashMap<String, String>,
    /// Constant values for base columns with no incoming counterpart
    /// (append only).
    #[serde(default)]
    pub defaults: HashMap<String, String>,
    /// Detail columns to pull onto matched base rows (enrich only).
    /// Defaults to every non-key detail column.
    #[serde(default)]
    pub take: Option<Vec<String>>,
}

/// Keep a row when its cell equals one of `values` and/or starts with
/// `prefix`. At least one criterion must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// NAICS code → store type mapping, applied while building appended rows.
/// Codes are compared on their integer part, so "445110" and "445110.0"
/// both hit the same key.
#[derive(Debug, Clone, Deserialize)]
pub struct NaicsConfig {
    /// Incoming column holding the NAICS code.
    pub column: String,
    /// Base column receiving the mapped store type.
    pub into: String,
    #[serde(default = "default_naics_fallback")]
    pub default: String,
    pub map: HashMap<String, String>,
}

fn default_naics_fallback() -> String {
    "Other".to_string()
}

/// Coordinate sanity bounds. Appended rows with missing, unparseable, or
/// out-of-range coordinates are dropped and counted.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundsConfig {
    pub lat_column: String,
    pub lon_column: String,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Generated record ids for appended rows (UUIDv4-derived decimal).
#[derive(Debug, Clone, Deserialize)]
pub struct IdConfig {
    pub column: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The source names this config's kind requires.
    pub fn required_sources(&self) -> [&'static str; 2] {
        match self.kind {
            MergeKind::Append => ["base", "incoming"],
            MergeKind::Enrich => ["base", "detail"],
        }
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        for name in self.required_sources() {
            if !self.sources.contains_key(name) {
                return Err(MergeError::ConfigValidation(format!(
                    "kind '{}' requires a [sources.{name}] block",
                    self.kind
                )));
            }
        }

        for (name, source) in &self.sources {
            if source.key.is_empty() {
                return Err(MergeError::ConfigValidation(format!(
                    "source '{name}': key must name at least one column"
                )));
            }
            for filter in &source.filter {
                if filter.values.is_empty() && filter.prefix.is_none() {
                    return Err(MergeError::ConfigValidation(format!(
                        "source '{name}': filter on '{}' needs values or a prefix",
                        filter.column
                    )));
                }
            }
        }

        if let Some(ref bounds) = self.bounds {
            if bounds.lat_min >= bounds.lat_max || bounds.lon_min >= bounds.lon_max {
                return Err(MergeError::ConfigValidation(
                    "bounds: min values must be below max values".into(),
                ));
            }
        }

        if let Some(ref naics) = self.naics {
            if naics.map.is_empty() {
                return Err(MergeError::ConfigValidation(
                    "naics: mapping table is empty".into(),
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
