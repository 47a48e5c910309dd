//! Core entity model for grademap.
//!
//! All entities are constructed once from the loaded dataset and are
//! immutable for the lifetime of the process. Query processing only ever
//! produces new derived values (summaries, scores), never mutates these.
//!
//! Ordered containers (`BTreeMap`/`BTreeSet`) are used anywhere iteration
//! order can reach output, so results are deterministic by construction.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a section within the catalog's section table.
pub type SectionId = usize;

/// An academic department: short code plus canonical name.
///
/// Unique by code; codes are stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    /// Short identifier, e.g. "CSCI".
    pub code: String,
    /// Canonical full name, e.g. "Computer Science".
    pub name: String,
}

/// An academic term, encoded the institutional way: the last digit selects
/// the session (3 = Spring, 5 = Summer, 9 = Fall) and the remaining digits
/// are the year offset from 1900. E.g. 1249 = Fall 2024.
///
/// Chronological order is numeric order of the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub code: u32,
    /// Human label, e.g. "Fall 2024". Derived once at load time.
    pub label: String,
}

/// A catalog course number: the raw code (possibly with a letter suffix,
/// e.g. "1001W") plus its leading numeric value used for range and level
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseNumber {
    /// Leading numeric value, e.g. 1001 for "1001W". Always positive.
    pub numeric: u32,
    /// The raw catalog code as it appears in the dataset.
    pub raw: String,
}

impl CourseNumber {
    /// Parse a catalog code. The leading digits must form a positive
    /// integer; an optional alphanumeric suffix is kept verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
        let numeric: u32 = digits.parse().ok()?;
        if numeric == 0 {
            return None;
        }
        Some(Self {
            numeric,
            raw: raw.to_string(),
        })
    }

    /// The level this number falls in, by magnitude.
    pub fn level(&self) -> Level {
        Level::of(self.numeric)
    }
}

impl fmt::Display for CourseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Course level, derived from the number's magnitude:
/// 1xxx-4xxx undergraduate, 5xxx-6xxx masters, 7xxx+ doctoral.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Undergraduate,
    Masters,
    Doctoral,
}

impl Level {
    /// Classify a numeric course number.
    pub fn of(numeric: u32) -> Self {
        match numeric / 1000 {
            0..=4 => Self::Undergraduate,
            5..=6 => Self::Masters,
            _ => Self::Doctoral,
        }
    }
}

/// Composite course key: (department code, course number).
///
/// This is the canonical identifier used for deterministic ordering of
/// course results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseKey {
    pub department: String,
    pub number: CourseNumber,
}

impl CourseKey {
    pub fn new(department: impl Into<String>, number: CourseNumber) -> Self {
        Self {
            department: department.into(),
            number,
        }
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.department, self.number)
    }
}

/// A course offering: key, title, liberal-education tags, and the sections
/// that have been taught under it.
#[derive(Debug, Clone)]
pub struct Course {
    pub key: CourseKey,
    pub title: String,
    /// Liberal-education tags this course satisfies (canonical tag strings).
    pub libed_tags: BTreeSet<String>,
    /// Indices into the catalog's section table. Filled during index build.
    pub sections: Vec<SectionId>,
}

/// External reputation signals for a professor (RateMyProfessor-style).
/// Absent entirely when the professor has no external record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Average rating, typically on a 0-5 scale.
    pub score: f64,
    /// Average difficulty, where known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// How many ratings the averages are built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ratings: Option<u32>,
    /// Link to the external profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// An instructor. The id is the canonical identifier for deterministic
/// ordering of professor results.
#[derive(Debug, Clone)]
pub struct Professor {
    pub id: u32,
    pub name: String,
    /// External rating summary, if one exists.
    pub rating: Option<RatingSummary>,
    /// Indices into the catalog's section table. Filled during index build.
    pub sections: Vec<SectionId>,
}

/// A liberal-education requirement and the courses that satisfy it.
#[derive(Debug, Clone)]
pub struct LibEd {
    pub tag: String,
    pub description: String,
    /// Filled during index build; canonical (key) order.
    pub courses: BTreeSet<CourseKey>,
}

/// Grade symbol -> student count. Symbols are the raw strings from the
/// dataset ("A", "B+", "W", "P", ...); the aggregator decides which carry
/// GPA points.
pub type GradeCounts = std::collections::BTreeMap<String, u32>;

/// The atomic grade record: one offering of one course by one professor in
/// one term, with its grade-count map.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub course: CourseKey,
    pub professor: u32,
    pub term: u32,
    pub grades: GradeCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_number_parse() {
        let plain = CourseNumber::parse("5511").unwrap();
        assert_eq!(plain.numeric, 5511);
        assert_eq!(plain.raw, "5511");

        let suffixed = CourseNumber::parse("1001W").unwrap();
        assert_eq!(suffixed.numeric, 1001);
        assert_eq!(suffixed.raw, "1001W");
        assert_eq!(suffixed.to_string(), "1001W");

        assert!(CourseNumber::parse("").is_none());
        assert!(CourseNumber::parse("W").is_none());
        assert!(CourseNumber::parse("0").is_none());
    }

    #[test]
    fn test_level_of() {
        assert_eq!(Level::of(1001), Level::Undergraduate);
        assert_eq!(Level::of(4999), Level::Undergraduate);
        assert_eq!(Level::of(5511), Level::Masters);
        assert_eq!(Level::of(6999), Level::Masters);
        assert_eq!(Level::of(8001), Level::Doctoral);
    }

    #[test]
    fn test_course_key_ordering() {
        let a = CourseKey::new("CSCI", CourseNumber::parse("1133").unwrap());
        let b = CourseKey::new("CSCI", CourseNumber::parse("5511").unwrap());
        let c = CourseKey::new("MATH", CourseNumber::parse("1001").unwrap());

        // Department first, then numeric course number.
        assert!(a < b);
        assert!(b < c);
        assert_eq!(b.to_string(), "CSCI 5511");
    }
}
