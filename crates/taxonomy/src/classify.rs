use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::TaxonomyError;
use crate::matcher::TriggerPattern;
use crate::model::{
    CategoryEntry, Classification, GENERAL_RETAIL, LIQUOR_STORE, UNCATEGORIZED,
};
use crate::table;

/// Store-type substrings that mark a generic food/retail outlet when no
/// cuisine trigger matched. Plain substring tests, in priority order after
/// the liquor check.
const RETAIL_TYPE_HINTS: [&str; 5] = ["convenience", "gas", "supermarket", "market", "grocery"];

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// An immutable, ordered cuisine taxonomy with precompiled trigger
/// matchers. Built once at startup, read-only afterward; classification is
/// a pure function of its two inputs and this table.
#[derive(Debug)]
pub struct Taxonomy {
    entries: Vec<CategoryEntry>,
    /// Parallel to `entries`: one compiled pattern per trigger.
    patterns: Vec<Vec<TriggerPattern>>,
}

impl Taxonomy {
    /// Build a taxonomy from an ordered entry list.
    ///
    /// Malformed tables (no entries, duplicate labels, entries without
    /// triggers, blank triggers) are rejected here, never discovered at
    /// classification time.
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self, TaxonomyError> {
        if entries.is_empty() {
            return Err(TaxonomyError::EmptyTable);
        }

        let mut seen_labels = HashSet::new();
        for entry in &entries {
            if !seen_labels.insert(entry.label.clone()) {
                return Err(TaxonomyError::DuplicateLabel(entry.label.clone()));
            }
            if entry.triggers.is_empty() {
                return Err(TaxonomyError::NoTriggers(entry.label.clone()));
            }
            if entry.triggers.iter().any(|t| t.trim().is_empty()) {
                return Err(TaxonomyError::EmptyTrigger(entry.label.clone()));
            }
        }

        let patterns = entries
            .iter()
            .map(|e| e.triggers.iter().map(|t| TriggerPattern::new(t)).collect())
            .collect();

        Ok(Self { entries, patterns })
    }

    /// The built-in production table.
    pub fn builtin() -> Self {
        Self::new(table::builtin_entries()).expect("built-in taxonomy is valid")
    }

    /// Load a custom table from a TOML document with a `[[category]]`
    /// array. The same construction-time validation applies.
    pub fn from_toml(input: &str) -> Result<Self, TaxonomyError> {
        #[derive(Deserialize)]
        struct TaxonomyFile {
            #[serde(default)]
            category: Vec<CategoryEntry>,
        }

        let file: TaxonomyFile =
            toml::from_str(input).map_err(|e| TaxonomyError::ConfigParse(e.to_string()))?;
        Self::new(file.category)
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Classify one record from its display name and declared store type.
    ///
    /// Both inputs are lowercased before matching; callers coerce missing
    /// CSV fields to empty strings. Every input maps to exactly one label —
    /// "Uncategorized" is a normal outcome, not an error.
    pub fn classify(&self, store_name: &str, store_type: &str) -> Classification {
        let name = store_name.to_lowercase();
        let store_type = store_type.to_lowercase();

        for (entry, patterns) in self.entries.iter().zip(&self.patterns) {
            if patterns.iter().any(|p| p.is_match(&name)) {
                return Classification::from_entry(entry);
            }
        }

        // Fallbacks, fixed priority. The liquor check looks at both fields
        // with a plain substring test; the retail check only at the
        // declared store type.
        if store_type.contains("liquor") || name.contains("liquor") {
            return Classification::fallback(LIQUOR_STORE);
        }
        if RETAIL_TYPE_HINTS.iter().any(|hint| store_type.contains(hint)) {
            return Classification::fallback(GENERAL_RETAIL);
        }
        Classification::fallback(UNCATEGORIZED)
    }

    /// Every trigger phrase claimed by more than one entry, with the
    /// claiming labels in table order — the first label wins at
    /// classification time. First-match-wins is preserved; this surfaces
    /// the collisions instead of leaving them silent.
    pub fn ambiguous_triggers(&self) -> Vec<AmbiguousTrigger> {
        let mut order: Vec<String> = Vec::new();
        let mut claims: HashMap<String, Vec<String>> = HashMap::new();

        for (entry, patterns) in self.entries.iter().zip(&self.patterns) {
            let mut in_entry = HashSet::new();
            for pattern in patterns {
                let literal = pattern.literal().to_string();
                // A trigger repeated within one entry is not a collision.
                if !in_entry.insert(literal.clone()) {
                    continue;
                }
                match claims.get_mut(&literal) {
                    Some(labels) => labels.push(entry.label.clone()),
                    None => {
                        order.push(literal.clone());
                        claims.insert(literal, vec![entry.label.clone()]);
                    }
                }
            }
        }

        order
            .into_iter()
            .filter_map(|trigger| {
                let labels = claims.remove(&trigger)?;
                (labels.len() > 1).then_some(AmbiguousTrigger { trigger, labels })
            })
            .collect()
    }
}

/// A trigger phrase shared by two or more entries.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguousTrigger {
    pub trigger: String,
    /// Claiming labels in table order; the first wins.
    pub labels: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
