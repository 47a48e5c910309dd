//! Dataset loading - the boundary collaborator that turns raw records on
//! disk into the entity model consumed by the catalog index.
//!
//! Deliberately thin: parsing and shape validation happen here, referential
//! integrity is the index's job. The dataset is loaded exactly once per
//! process; everything downstream treats it as an immutable snapshot.

mod loader;

pub use loader::{load_dataset, LoadError};

use crate::types::{Course, Department, Professor, Section};

/// The full record set, as loaded. Input to [`crate::CatalogIndex::build`].
#[derive(Debug, Default)]
pub struct Dataset {
    pub departments: Vec<Department>,
    /// Raw term codes present in the corpus.
    pub terms: Vec<u32>,
    /// (tag, description) pairs for liberal-education requirements.
    pub libeds: Vec<(String, String)>,
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    pub sections: Vec<Section>,
}
