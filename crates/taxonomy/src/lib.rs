//! `foodscape-taxonomy` — cuisine taxonomy and store-name classifier.
//!
//! Pure engine crate: an ordered keyword taxonomy plus a boundary-aware
//! literal matcher. Receives store name/type strings, returns a
//! classification. No IO dependencies.

pub mod classify;
pub mod error;
pub mod matcher;
pub mod model;
pub mod table;

pub use classify::{AmbiguousTrigger, Taxonomy};
pub use error::TaxonomyError;
pub use model::{CategoryEntry, Classification};
pub use model::{GENERAL_RETAIL, LIQUOR_STORE, UNCATEGORIZED};
