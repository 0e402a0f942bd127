//! `foodscape-merge` — config-driven outlet dataset reconciliation.
//!
//! Pure engine crate: receives pre-loaded CSV tables, returns a merged
//! table plus a summary. No CLI or file IO dependencies.
//!
//! Two operations, selected by the config's `kind`:
//! - `append` — rows of an incoming source whose composite address key is
//!   absent from the base source are transformed into the base schema
//!   (column map, defaults, NAICS store-type mapping, coordinate
//!   validation, record-id generation) and appended;
//! - `enrich` — a left join that pulls detail columns onto base rows
//!   sharing the same composite key.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;

pub use config::{MergeConfig, MergeKind};
pub use engine::{load_table, run};
pub use error::MergeError;
pub use model::{MergeInput, MergeResult, SourceTable};
