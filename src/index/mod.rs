//! Catalog index - immutable lookup structures over the loaded corpus.
//!
//! Built once at startup from the full record set; construction validates
//! referential integrity (every section must resolve to a known course,
//! professor and term) and fails fast on inconsistency. After construction
//! the index only exposes read-only accessors, so it can be shared across
//! concurrent requests without locking.

mod catalog;
pub mod tokens;

pub use catalog::{CatalogIndex, TokenEntry};
