//! Typed query requests.
//!
//! Every recognized filter dimension is an explicit optional field;
//! unspecified dimensions impose no constraint, and unknown fields are
//! rejected at deserialization rather than silently ignored.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::types::Level;

/// Highest point value on the grade scale (A+).
const MAX_GPA: f64 = 4.333;

/// Explicit ordering for keyword-less searches.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortHint {
    /// Canonical identifier ascending (course key, professor id).
    #[default]
    Identifier,
    /// Aggregate GPA descending; entities without a computable GPA last.
    GpaDesc,
    /// Course number ascending, then department.
    NumberAsc,
    /// Total enrollment descending.
    EnrollmentDesc,
    /// External rating descending; unrated professors last.
    RatingDesc,
}

/// Course search request. All dimensions optional and conjunctive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct CourseQuery {
    /// Department code or full name, e.g. "CSCI" or "Computer Science".
    pub department: Option<String>,
    /// Inclusive lower bound on the numeric course number.
    pub number_min: Option<u32>,
    /// Inclusive upper bound on the numeric course number.
    pub number_max: Option<u32>,
    /// Course level derived from number magnitude.
    pub level: Option<Level>,
    /// Minimum aggregate GPA across all sections. A course with no
    /// computable GPA never satisfies this.
    pub min_gpa: Option<f64>,
    /// Liberal-education tag the course must satisfy.
    pub liberal_ed_tag: Option<String>,
    /// Free-text keyword, scored by the ranking engine rather than applied
    /// as a hard filter.
    pub keyword: Option<String>,
    /// Professor id or name fragment; matches courses with at least one
    /// section taught by a matching professor.
    pub professor: Option<String>,
    /// Inclusive lower bound on term code.
    pub term_min: Option<u32>,
    /// Inclusive upper bound on term code.
    pub term_max: Option<u32>,
    /// Ordering when no keyword is given.
    pub sort: Option<SortHint>,
}

impl CourseQuery {
    /// Reject self-contradictory combinations before any index access.
    pub fn validate(&self) -> Result<(), QueryError> {
        if let (Some(min), Some(max)) = (self.number_min, self.number_max) {
            if min > max {
                return Err(QueryError::validation(
                    "number_min",
                    format!("number_min ({min}) exceeds number_max ({max})"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.term_min, self.term_max) {
            if min > max {
                return Err(QueryError::validation(
                    "term_min",
                    format!("term_min ({min}) exceeds term_max ({max})"),
                ));
            }
        }
        if let Some(gpa) = self.min_gpa {
            if !(0.0..=MAX_GPA).contains(&gpa) {
                return Err(QueryError::validation(
                    "min_gpa",
                    format!("min_gpa ({gpa}) outside the 0.0-{MAX_GPA} grade scale"),
                ));
            }
        }
        if self.sort == Some(SortHint::RatingDesc) {
            return Err(QueryError::validation(
                "sort",
                "rating-desc applies to professor search only",
            ));
        }
        Ok(())
    }
}

/// Professor search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ProfessorQuery {
    /// Name or partial name, matched fuzzily by the ranking engine.
    pub name_fragment: Option<String>,
    /// Exact professor id; unknown ids are a lookup error.
    pub id: Option<u32>,
    /// Minimum external rating. Unrated professors never satisfy this.
    pub min_rating: Option<f64>,
    /// Ordering when no name fragment is given.
    pub sort: Option<SortHint>,
}

impl ProfessorQuery {
    /// Reject out-of-range or inapplicable values up front.
    pub fn validate(&self) -> Result<(), QueryError> {
        if let Some(rating) = self.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(QueryError::validation(
                    "min_rating",
                    format!("min_rating ({rating}) outside the 0-5 rating scale"),
                ));
            }
        }
        if self.sort == Some(SortHint::NumberAsc) {
            return Err(QueryError::validation(
                "sort",
                "number-asc applies to course search only",
            ));
        }
        Ok(())
    }
}
