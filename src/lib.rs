//! grademap - structured queries over university course grade history.
//!
//! grademap loads a snapshot of course offerings, instructor grade
//! distributions, and external reputation signals into an immutable
//! in-memory catalog, then answers ranked, filtered queries over it.
//! The same engine backs a CLI and an MCP tool server.
//!
//! # Architecture
//!
//! ```text
//! dataset (JSON) → index → query planner → rank → results
//!                    ↓          ↓            ↓
//!                 resolve    aggregate    scorer
//! ```
//!
//! - [`dataset`]: raw snapshot loading and validation
//! - [`index`]: the immutable catalog index and token index
//! - [`resolve`]: department/term code and label resolution
//! - [`query`]: request types, validation, and the filter planner
//! - [`aggregate`]: grade-count accumulation and GPA statistics
//! - [`rank`]: deterministic ordering and fuzzy keyword scoring
//! - [`engine`]: the operation surface tying the above together
//! - [`mcp`]: the MCP tool server exposing the engine over stdio

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod index;
pub mod mcp;
pub mod query;
pub mod rank;
pub mod resolve;
pub mod types;

pub use aggregate::{GradeSummary, GroupBy};
pub use config::Config;
pub use engine::GradesEngine;
pub use error::{DataIntegrityError, QueryError};
pub use index::CatalogIndex;
pub use query::{CourseQuery, ProfessorQuery, SortHint};
pub use resolve::Resolver;
pub use types::{Course, CourseKey, CourseNumber, Department, Level, Professor, Section, Term};
