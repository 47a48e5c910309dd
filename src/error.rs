//! Error taxonomy for grademap.
//!
//! Three kinds of failure, with different lifetimes:
//! - [`DataIntegrityError`]: the source dataset is internally inconsistent.
//!   Raised during index construction only; fatal to process start.
//! - [`QueryError::Lookup`]: a request names a department, term, tag, course
//!   or professor that does not exist. Reported to the caller as structured
//!   "not found", never silently collapsed into an empty result set.
//! - [`QueryError::Validation`]: a request's filter combination is
//!   self-contradictory. Raised before the index is touched.
//!
//! Queries are deterministic, so none of these are retried.

use thiserror::Error;

use crate::types::CourseKey;

/// Dataset inconsistency detected while building the catalog index.
///
/// Any of these means the loaded snapshot cannot be trusted; construction
/// aborts and the process should not serve queries.
#[derive(Debug, Error, PartialEq)]
pub enum DataIntegrityError {
    /// A section references a course that is not in the course set.
    #[error("section references unknown course {0}")]
    UnknownCourse(CourseKey),

    /// A section references a professor id that is not in the professor set.
    #[error("section of {course} references unknown professor {professor}")]
    UnknownProfessor { course: CourseKey, professor: u32 },

    /// A section references a term code that is not in the term set.
    #[error("section of {course} references unknown term {term}")]
    UnknownTerm { course: CourseKey, term: u32 },

    /// A course's department code does not resolve.
    #[error("course {0} references unknown department")]
    UnknownDepartment(CourseKey),

    /// A course claims a liberal-education tag that is not defined.
    #[error("course {course} references unknown liberal-education tag {tag:?}")]
    UnknownLibEd { course: CourseKey, tag: String },

    /// A section carries no grade symbols at all.
    #[error("section of {0} has an empty grade-count map")]
    EmptyGrades(CourseKey),

    /// A grade count in the raw data is negative.
    #[error("section of {course} has negative count for grade {symbol:?}")]
    NegativeCount { course: CourseKey, symbol: String },

    /// A course number has no positive leading numeric part.
    #[error("course number {number:?} in department {department} is not a valid catalog code")]
    InvalidCourseNumber { department: String, number: String },

    /// A term code does not decode to a known session (Spring/Summer/Fall).
    #[error("term code {0} does not decode to a valid session")]
    InvalidTerm(u32),

    /// Two departments share a code.
    #[error("duplicate department code {0:?}")]
    DuplicateDepartment(String),

    /// Two courses share a (department, number) key.
    #[error("duplicate course {0}")]
    DuplicateCourse(CourseKey),

    /// Two professors share an id.
    #[error("duplicate professor id {0}")]
    DuplicateProfessor(u32),
}

/// Per-request failure, reported to the caller with the failing field.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    /// A filter value names an entity or code that does not resolve.
    ///
    /// Distinct from a valid filter that happens to match nothing: an
    /// unknown code is an error, an empty match is a result.
    #[error("unknown {field}: {value:?}")]
    Lookup { field: &'static str, value: String },

    /// A filter combination is self-contradictory or out of range.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
}

impl QueryError {
    /// Build a lookup failure for the given field.
    pub fn lookup(field: &'static str, value: impl Into<String>) -> Self {
        Self::Lookup {
            field,
            value: value.into(),
        }
    }

    /// Build a validation failure for the given field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// True if this is a lookup ("not found") failure.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}
