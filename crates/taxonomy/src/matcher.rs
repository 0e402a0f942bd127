//! Boundary-aware literal phrase matching.
//!
//! Triggers are literal text, never pattern syntax — phrases containing
//! apostrophes, hyphens, or digits need no escaping because nothing is
//! compiled to a pattern language. A trigger matches when it occurs as a
//! whole word or phrase: the character immediately before the occurrence
//! (if any) and the character immediately after (if any) must not be
//! lowercase ASCII letters. String boundaries, digits, and punctuation all
//! delimit; an occurrence embedded in a longer alphabetic word does not
//! ("la" never matches inside "atlanta").

/// A single precompiled trigger phrase. Lowercasing happens once at
/// table-build time, not per classification call.
#[derive(Debug, Clone)]
pub(crate) struct TriggerPattern {
    literal: String,
}

impl TriggerPattern {
    pub(crate) fn new(trigger: &str) -> Self {
        Self {
            literal: trigger.trim().to_lowercase(),
        }
    }

    pub(crate) fn literal(&self) -> &str {
        &self.literal
    }

    /// Whether the trigger occurs in `haystack` with clean boundaries on
    /// both sides. `haystack` must already be lowercased.
    pub(crate) fn is_match(&self, haystack: &str) -> bool {
        for (start, _) in haystack.match_indices(&self.literal) {
            let end = start + self.literal.len();
            let clean_before = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_lowercase());
            let clean_after = haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_ascii_lowercase());
            if clean_before && clean_after {
                return true;
            }
        }
        false
    }
}
