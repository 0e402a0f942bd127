use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fallback labels
// ---------------------------------------------------------------------------

/// Label for outlets whose name or declared type mentions liquor.
pub const LIQUOR_STORE: &str = "Liquor Store";

/// Label for outlets with a generic food/retail store type and no
/// cuisine match.
pub const GENERAL_RETAIL: &str = "General Retail/Food/Other";

/// Label when nothing else applies. A normal outcome, never an error.
pub const UNCATEGORIZED: &str = "Uncategorized";

// ---------------------------------------------------------------------------
// Taxonomy node
// ---------------------------------------------------------------------------

/// One node of the cuisine taxonomy.
///
/// Entries form an ordered sequence; matching is first-match-wins, so the
/// position of an entry in the table is significant. Region fields are
/// absent for non-ethnic keyword groups (the general-retail entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub sub_subregion: Option<String>,
    /// Lowercase literal phrases, in evaluation order. May contain spaces,
    /// apostrophes, hyphens, and digits — always matched as literal text.
    pub triggers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// Result of classifying one record. Recomputed fresh per call, never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_subregion: Option<String>,
}

impl Classification {
    /// A fallback result: label only, all region fields empty.
    pub(crate) fn fallback(label: &str) -> Self {
        Self {
            label: label.to_string(),
            region: None,
            subregion: None,
            sub_subregion: None,
        }
    }

    pub(crate) fn from_entry(entry: &CategoryEntry) -> Self {
        Self {
            label: entry.label.clone(),
            region: entry.region.clone(),
            subregion: entry.subregion.clone(),
            sub_subregion: entry.sub_subregion.clone(),
        }
    }
}
