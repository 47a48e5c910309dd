//! Raw JSON dataset parsing.
//!
//! The on-disk format is one JSON document with flat record arrays; see
//! the `Raw*` structs for the exact shape. Grade counts arrive as signed
//! integers so that a negative count in the source is caught here as a
//! [`DataIntegrityError`] instead of wrapping silently.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::Dataset;
use crate::error::DataIntegrityError;
use crate::types::{
    Course, CourseKey, CourseNumber, Department, GradeCounts, Professor, RatingSummary, Section,
};

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDataset {
    departments: Vec<RawDepartment>,
    terms: Vec<u32>,
    #[serde(default)]
    liberal_education: Vec<RawLibEd>,
    courses: Vec<RawCourse>,
    professors: Vec<RawProfessor>,
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawDepartment {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLibEd {
    tag: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawCourse {
    department: String,
    number: String,
    title: String,
    #[serde(default)]
    liberal_ed: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawProfessor {
    id: u32,
    name: String,
    rating: Option<f64>,
    difficulty: Option<f64>,
    num_ratings: Option<u32>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    department: String,
    number: String,
    professor: u32,
    term: u32,
    grades: BTreeMap<String, i64>,
}

/// Load a dataset file from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let dataset = from_json(&content)?;
    info!(
        path = %path.display(),
        courses = dataset.courses.len(),
        professors = dataset.professors.len(),
        sections = dataset.sections.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse a dataset from a JSON string.
pub fn from_json(content: &str) -> Result<Dataset, LoadError> {
    let raw: RawDataset = serde_json::from_str(content)?;

    let departments = raw
        .departments
        .into_iter()
        .map(|d| Department {
            code: d.code.to_uppercase(),
            name: d.name,
        })
        .collect();

    let courses = raw
        .courses
        .into_iter()
        .map(|c| {
            let department = c.department.to_uppercase();
            let number = CourseNumber::parse(&c.number).ok_or_else(|| {
                DataIntegrityError::InvalidCourseNumber {
                    department: department.clone(),
                    number: c.number.clone(),
                }
            })?;
            Ok(Course {
                key: CourseKey::new(department, number),
                title: c.title,
                libed_tags: c.liberal_ed.into_iter().collect(),
                sections: Vec::new(),
            })
        })
        .collect::<Result<Vec<_>, DataIntegrityError>>()?;

    let professors = raw
        .professors
        .into_iter()
        .map(|p| Professor {
            id: p.id,
            name: p.name,
            rating: p.rating.map(|score| RatingSummary {
                score,
                difficulty: p.difficulty,
                num_ratings: p.num_ratings,
                link: p.link,
            }),
            sections: Vec::new(),
        })
        .collect();

    let sections = raw
        .sections
        .into_iter()
        .map(|s| {
            let department = s.department.to_uppercase();
            let number = CourseNumber::parse(&s.number).ok_or_else(|| {
                DataIntegrityError::InvalidCourseNumber {
                    department: department.clone(),
                    number: s.number.clone(),
                }
            })?;
            let course = CourseKey::new(department, number);
            let mut grades = GradeCounts::new();
            for (symbol, count) in s.grades {
                let count = u32::try_from(count).map_err(|_| {
                    DataIntegrityError::NegativeCount {
                        course: course.clone(),
                        symbol: symbol.clone(),
                    }
                })?;
                grades.insert(symbol, count);
            }
            Ok(Section {
                course,
                professor: s.professor,
                term: s.term,
                grades,
            })
        })
        .collect::<Result<Vec<_>, DataIntegrityError>>()?;

    Ok(Dataset {
        departments,
        terms: raw.terms,
        libeds: raw
            .liberal_education
            .into_iter()
            .map(|l| (l.tag, l.description))
            .collect(),
        courses,
        professors,
        sections,
    })
}
