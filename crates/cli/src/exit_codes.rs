//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                               |
//! |---------|-----------|-------------------------------------------|
//! | 0       | Universal | Success                                   |
//! | 1       | Universal | General error (unspecified)               |
//! | 2       | Universal | CLI usage error (bad args, missing file)  |
//! | 3-9     | classify  | Classification + taxonomy codes           |
//! | 10-19   | merge     | Dataset merge codes                       |
//! | 50-59   | geocode   | Census geocoder connector codes           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Classify + taxonomy (3-9)
// =============================================================================

/// Parse error reading the input CSV.
pub const EXIT_CLASSIFY_PARSE: u8 = 3;

/// The input has no store-name column.
pub const EXIT_CLASSIFY_MISSING_COLUMN: u8 = 4;

/// A custom taxonomy table failed to parse or validate.
pub const EXIT_TAXONOMY_INVALID: u8 = 5;

/// `taxonomy lint` found trigger phrases claimed by multiple categories.
pub const EXIT_TAXONOMY_AMBIGUOUS: u8 = 6;

// =============================================================================
// Merge (10-19)
// =============================================================================

/// Merge config failed to parse or validate.
pub const EXIT_MERGE_INVALID_CONFIG: u8 = 10;

/// Merge runtime error (unreadable source file, missing column).
pub const EXIT_MERGE_RUNTIME: u8 = 11;

// =============================================================================
// Geocode (50-59) — Census batch geocoder connector
// =============================================================================

/// Batch rejected by the geocoder (400).
pub const EXIT_GEOCODE_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_GEOCODE_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx) or network failure after retries.
pub const EXIT_GEOCODE_UPSTREAM: u8 = 54;
