//! The query engine: every supported operation as a method over the
//! immutable catalog snapshot.
//!
//! All operations are pure, non-blocking, in-memory reads. The engine is
//! shared behind `Arc` by the CLI and the MCP server; nothing here holds a
//! lock or mutates state, so arbitrary concurrent invocation is safe. A
//! future dataset refresh would build a whole new engine off to the side
//! and swap the shared reference, never touch this one in place.

use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{aggregate, GradeSummary, GroupBy, PartitionKey};
use crate::config::Config;
use crate::dataset::load_dataset;
use crate::error::QueryError;
use crate::index::CatalogIndex;
use crate::query::{
    filter_courses, filter_professors, plan_courses, plan_professors, CourseQuery, ProfessorQuery,
};
use crate::rank::{rank_courses, rank_professors, RankWeights};
use crate::resolve::{CodeLabel, Resolver};
use crate::types::{Course, CourseKey, CourseNumber, Professor, RatingSummary};

/// A course in a search result, with its overall summary and keyword
/// score (present only for keyword searches).
#[derive(Debug, Serialize)]
pub struct CourseHit {
    pub department: String,
    pub number: String,
    pub title: String,
    pub liberal_ed_tags: Vec<String>,
    pub summary: GradeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Partition label plus summary, for grouped grade reports.
#[derive(Debug, Serialize)]
pub struct LabeledSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<ProfessorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<TermRef>,
    #[serde(flatten)]
    pub summary: GradeSummary,
}

/// Minimal professor identification for partition labels.
#[derive(Debug, Serialize)]
pub struct ProfessorRef {
    pub id: u32,
    pub name: String,
}

/// Term code plus human label for partition labels.
#[derive(Debug, Serialize)]
pub struct TermRef {
    pub code: u32,
    pub label: String,
}

/// Grade report for one course.
#[derive(Debug, Serialize)]
pub struct CourseGrades {
    pub department: String,
    pub number: String,
    pub title: String,
    pub liberal_ed_tags: Vec<String>,
    /// One summary per partition, or a single overall summary.
    pub summaries: Vec<LabeledSummary>,
}

/// One course a professor has taught, with the terms they taught it.
#[derive(Debug, Serialize)]
pub struct CourseTaught {
    pub department: String,
    pub number: String,
    pub title: String,
    pub terms: Vec<String>,
}

/// A professor in a search result.
#[derive(Debug, Serialize)]
pub struct ProfessorHit {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingSummary>,
    pub summary: GradeSummary,
    pub courses_taught: Vec<CourseTaught>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Grade report for one professor.
#[derive(Debug, Serialize)]
pub struct ProfessorGrades {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingSummary>,
    /// Distinct courses this professor has taught.
    pub distinct_courses: usize,
    /// Total students across all their sections.
    pub total_students: u32,
    /// One summary per partition, or a single overall summary.
    pub summaries: Vec<LabeledSummary>,
}

/// Courses satisfying one liberal-education requirement, canonical order.
#[derive(Debug, Serialize)]
pub struct LibEdCourses {
    pub tag: String,
    pub description: String,
    pub courses: Vec<CourseRef>,
}

/// Minimal course identification.
#[derive(Debug, Serialize)]
pub struct CourseRef {
    pub department: String,
    pub number: String,
    pub title: String,
}

/// The process-wide immutable query engine.
#[derive(Debug)]
pub struct GradesEngine {
    index: CatalogIndex,
    resolver: Resolver,
    weights: RankWeights,
}

impl GradesEngine {
    /// Wrap a built catalog index.
    pub fn new(index: CatalogIndex, weights: RankWeights) -> Self {
        let resolver = Resolver::new(&index);
        Self {
            index,
            resolver,
            weights,
        }
    }

    /// Load config and dataset, build the index, and return a ready
    /// engine. Shared startup path for both binaries.
    pub fn bootstrap(dataset_override: Option<&Path>) -> anyhow::Result<Self> {
        let config = Config::load(&std::env::current_dir()?);
        let dataset_path = dataset_override
            .map(Path::to_path_buf)
            .or_else(|| config.dataset.clone())
            .context("no dataset path: pass --dataset or set `dataset` in grademap.toml")?;
        let dataset = load_dataset(&dataset_path)?;
        let index = CatalogIndex::build(dataset)?;
        info!(
            courses = index.courses().count(),
            professors = index.professors().count(),
            "catalog index built"
        );
        Ok(Self::new(index, config.ranking))
    }

    /// Read access to the catalog, mainly for tests and diagnostics.
    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// The resolver backing `get_abbreviations_and_terms`.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Search courses: plan, filter, rank. Returns the full ordered
    /// candidate set; truncation is the caller's concern.
    pub fn search_courses(&self, query: &CourseQuery) -> Result<Vec<CourseHit>, QueryError> {
        let plan = plan_courses(query, &self.index, &self.resolver)?;
        let candidates = filter_courses(&self.index, &plan);
        let ranked = rank_courses(
            candidates,
            plan.keyword.as_deref(),
            plan.sort,
            &self.weights,
        );
        debug!(results = ranked.len(), "search_courses");
        Ok(ranked
            .into_iter()
            .map(|(candidate, score)| CourseHit {
                department: candidate.course.key.department.clone(),
                number: candidate.course.key.number.raw.clone(),
                title: candidate.course.title.clone(),
                liberal_ed_tags: candidate.course.libed_tags.iter().cloned().collect(),
                summary: candidate.summary,
                score,
            })
            .collect())
    }

    /// Grade report for one course, optionally partitioned by professor
    /// or term.
    pub fn course_grades(
        &self,
        department: &str,
        number: &str,
        group_by: GroupBy,
    ) -> Result<CourseGrades, QueryError> {
        let course = self.lookup_course(department, number)?;
        let summaries = aggregate(self.index.course_sections(course), group_by);
        debug!(course = %course.key, partitions = summaries.len(), "course_grades");
        Ok(CourseGrades {
            department: course.key.department.clone(),
            number: course.key.number.raw.clone(),
            title: course.title.clone(),
            liberal_ed_tags: course.libed_tags.iter().cloned().collect(),
            summaries: self.label_summaries(summaries),
        })
    }

    /// Search professors: plan, filter, rank. Full ordered set, caller
    /// truncates.
    pub fn search_professors(
        &self,
        query: &ProfessorQuery,
    ) -> Result<Vec<ProfessorHit>, QueryError> {
        let plan = plan_professors(query, &self.index)?;
        let candidates = filter_professors(&self.index, &plan);
        let ranked = rank_professors(
            candidates,
            plan.name_fragment.as_deref(),
            plan.sort,
            &self.weights,
        );
        debug!(results = ranked.len(), "search_professors");
        Ok(ranked
            .into_iter()
            .map(|(candidate, score)| ProfessorHit {
                id: candidate.professor.id,
                name: candidate.professor.name.clone(),
                rating: candidate.professor.rating.clone(),
                summary: candidate.summary,
                courses_taught: self.courses_taught(candidate.professor),
                score,
            })
            .collect())
    }

    /// Grade report for one professor, optionally partitioned.
    pub fn professor_grades(
        &self,
        id: u32,
        group_by: GroupBy,
    ) -> Result<ProfessorGrades, QueryError> {
        let professor = self
            .index
            .professor(id)
            .ok_or_else(|| QueryError::lookup("professor", id.to_string()))?;

        let overall = aggregate(self.index.professor_sections(professor), GroupBy::None);
        let total_students = overall.first().map_or(0, |s| s.students);
        let summaries = aggregate(self.index.professor_sections(professor), group_by);
        debug!(professor = id, partitions = summaries.len(), "professor_grades");

        let distinct_courses = self
            .index
            .professor_sections(professor)
            .map(|s| &s.course)
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        Ok(ProfessorGrades {
            id: professor.id,
            name: professor.name.clone(),
            rating: professor.rating.clone(),
            distinct_courses,
            total_students,
            summaries: self.label_summaries(summaries),
        })
    }

    /// Courses satisfying a liberal-education requirement, in canonical
    /// (unranked) order.
    pub fn liberal_education_courses(&self, tag: &str) -> Result<LibEdCourses, QueryError> {
        let libed = self
            .index
            .libed(tag)
            .ok_or_else(|| QueryError::lookup("liberal_ed_tag", tag))?;
        let courses = libed
            .courses
            .iter()
            .filter_map(|key| self.index.course(key))
            .map(|course| CourseRef {
                department: course.key.department.clone(),
                number: course.key.number.raw.clone(),
                title: course.title.clone(),
            })
            .collect();
        Ok(LibEdCourses {
            tag: libed.tag.clone(),
            description: libed.description.clone(),
            courses,
        })
    }

    /// The enumerable department/term listing.
    pub fn abbreviations_and_terms(&self) -> Vec<CodeLabel> {
        self.resolver.list_all()
    }

    fn lookup_course(&self, department: &str, number: &str) -> Result<&Course, QueryError> {
        let dept = self.resolver.resolve_department(department)?;
        let parsed = CourseNumber::parse(number)
            .ok_or_else(|| QueryError::lookup("course", format!("{dept} {number}")))?;
        let key = CourseKey::new(dept, parsed);
        self.index
            .course(&key)
            .ok_or_else(|| QueryError::lookup("course", key.to_string()))
    }

    fn label_summaries(&self, summaries: Vec<GradeSummary>) -> Vec<LabeledSummary> {
        summaries
            .into_iter()
            .map(|summary| {
                let (professor, term) = match summary.partition {
                    Some(PartitionKey::Professor(id)) => (
                        Some(ProfessorRef {
                            id,
                            name: self
                                .index
                                .professor(id)
                                .map(|p| p.name.clone())
                                .unwrap_or_default(),
                        }),
                        None,
                    ),
                    Some(PartitionKey::Term(code)) => (
                        None,
                        Some(TermRef {
                            code,
                            label: self
                                .index
                                .term(code)
                                .map(|t| t.label.clone())
                                .unwrap_or_default(),
                        }),
                    ),
                    None => (None, None),
                };
                LabeledSummary {
                    professor,
                    term,
                    summary,
                }
            })
            .collect()
    }

    fn courses_taught(&self, professor: &Professor) -> Vec<CourseTaught> {
        let mut by_course: std::collections::BTreeMap<&CourseKey, std::collections::BTreeSet<u32>> =
            Default::default();
        for section in self.index.professor_sections(professor) {
            by_course.entry(&section.course).or_default().insert(section.term);
        }
        by_course
            .into_iter()
            .filter_map(|(key, terms)| {
                let course = self.index.course(key)?;
                Some(CourseTaught {
                    department: key.department.clone(),
                    number: key.number.raw.clone(),
                    title: course.title.clone(),
                    terms: terms
                        .into_iter()
                        .filter_map(|code| self.index.term(code).map(|t| t.label.clone()))
                        .collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;

    fn engine() -> GradesEngine {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        GradesEngine::new(index, RankWeights::default())
    }

    #[test]
    fn test_search_courses_conjunction() {
        let engine = engine();
        let hits = engine
            .search_courses(&CourseQuery {
                department: Some("CSCI".to_string()),
                number_min: Some(4000),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].number, "5511");
        assert_eq!(hits[0].summary.gpa, Some(3.783));
        assert_eq!(hits[0].score, None);
    }

    #[test]
    fn test_course_grades_overall_and_grouped() {
        let engine = engine();

        let overall = engine
            .course_grades("CSCI", "1133", GroupBy::None)
            .unwrap();
        assert_eq!(overall.summaries.len(), 1);
        assert_eq!(overall.summaries[0].summary.students, 27);

        let grouped = engine
            .course_grades("CSCI", "1133", GroupBy::Professor)
            .unwrap();
        // One summary per professor who has taught a section.
        assert_eq!(grouped.summaries.len(), 2);
        let names: Vec<&str> = grouped
            .summaries
            .iter()
            .map(|s| s.professor.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["Jane Smith", "John Smithson"]);

        // Partitioned counts sum to the overall counts.
        let partitioned: u32 = grouped.summaries.iter().map(|s| s.summary.students).sum();
        assert_eq!(partitioned, overall.summaries[0].summary.students);
    }

    #[test]
    fn test_course_grades_unknown_course_is_lookup() {
        let engine = engine();
        // Unknown department code fails lookup on the department field.
        let err = engine
            .course_grades("ZZZZ", "1001", GroupBy::None)
            .unwrap_err();
        assert_eq!(err, QueryError::lookup("department", "ZZZZ"));

        // Known department, unknown number fails on the course key.
        let err = engine
            .course_grades("CSCI", "9999", GroupBy::None)
            .unwrap_err();
        assert_eq!(err, QueryError::lookup("course", "CSCI 9999"));
    }

    #[test]
    fn test_search_professors_repeatable_order() {
        let engine = engine();
        let query = ProfessorQuery {
            name_fragment: Some("smith".to_string()),
            ..Default::default()
        };
        let first: Vec<u32> = engine
            .search_professors(&query)
            .unwrap()
            .iter()
            .map(|h| h.id)
            .collect();
        for _ in 0..3 {
            let again: Vec<u32> = engine
                .search_professors(&query)
                .unwrap()
                .iter()
                .map(|h| h.id)
                .collect();
            assert_eq!(again, first);
        }
        assert_eq!(first, [1, 2, 3]);
    }

    #[test]
    fn test_search_professors_includes_courses_taught() {
        let engine = engine();
        let hits = engine
            .search_professors(&ProfessorQuery {
                id: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        let taught = &hits[0].courses_taught;
        assert_eq!(taught.len(), 2);
        assert_eq!(taught[0].number, "1133");
        assert_eq!(taught[0].terms, ["Spring 2024"]);
    }

    #[test]
    fn test_professor_grades() {
        let engine = engine();
        let report = engine.professor_grades(1, GroupBy::Term).unwrap();
        assert_eq!(report.distinct_courses, 2);
        assert_eq!(report.total_students, 35);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(
            report.summaries[0].term.as_ref().unwrap().label,
            "Spring 2024"
        );

        let err = engine.professor_grades(99, GroupBy::None).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn test_liberal_education_courses() {
        let engine = engine();
        let listing = engine.liberal_education_courses("Writing Intensive").unwrap();
        assert_eq!(listing.courses.len(), 1);
        assert_eq!(listing.courses[0].number, "1001W");

        assert!(engine
            .liberal_education_courses("No Such Tag")
            .unwrap_err()
            .is_lookup());
    }

    #[test]
    fn test_abbreviations_and_terms() {
        let engine = engine();
        let listing = engine.abbreviations_and_terms();
        assert_eq!(listing.len(), 4);
        assert_eq!(listing[0].code, "CSCI");
    }

    #[test]
    fn test_undefined_gpa_excluded_from_min_gpa_search() {
        let engine = engine();
        let hits = engine
            .search_courses(&CourseQuery {
                min_gpa: Some(0.0),
                ..Default::default()
            })
            .unwrap();
        assert!(hits.iter().all(|h| h.number != "1001W"));
    }
}
