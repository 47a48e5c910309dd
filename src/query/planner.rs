//! Plan construction and candidate filtering.
//!
//! `plan_*` resolves every enumerable filter value against the catalog
//! (unknown value -> lookup error, contradictory combination -> validation
//! error). `filter_*` then walks the catalog in canonical order and keeps
//! the entities satisfying every specified dimension, computing the
//! aggregate summary for each survivor on the way out - the summary is
//! needed both for the GPA filter and for the response.

use std::collections::BTreeSet;

use tracing::debug;

use crate::aggregate::{aggregate, GradeSummary, GroupBy};
use crate::error::QueryError;
use crate::index::{tokens, CatalogIndex};
use crate::query::request::{CourseQuery, ProfessorQuery, SortHint};
use crate::resolve::Resolver;
use crate::types::{Course, Level, Professor};

/// A course query with every filter value resolved to canonical form.
#[derive(Debug)]
pub struct CoursePlan {
    pub department: Option<String>,
    pub number_min: Option<u32>,
    pub number_max: Option<u32>,
    pub level: Option<Level>,
    pub min_gpa: Option<f64>,
    /// Canonical liberal-education tag.
    pub liberal_ed_tag: Option<String>,
    /// Professor ids matching the request's professor filter. `None` when
    /// the dimension was not specified; an empty set is a valid filter
    /// that matches nothing.
    pub professors: Option<BTreeSet<u32>>,
    pub term_min: Option<u32>,
    pub term_max: Option<u32>,
    pub keyword: Option<String>,
    pub sort: SortHint,
}

/// A professor query with the id filter resolved.
#[derive(Debug)]
pub struct ProfessorPlan {
    pub id: Option<u32>,
    pub min_rating: Option<f64>,
    pub name_fragment: Option<String>,
    pub sort: SortHint,
}

/// A filter survivor, carrying the aggregate summary computed during
/// filtering.
#[derive(Debug)]
pub struct CourseCandidate<'a> {
    pub course: &'a Course,
    pub summary: GradeSummary,
}

/// A professor filter survivor with the aggregate summary over all their
/// sections.
#[derive(Debug)]
pub struct ProfessorCandidate<'a> {
    pub professor: &'a Professor,
    pub summary: GradeSummary,
}

/// Resolve a course query into a plan.
pub fn plan_courses(
    query: &CourseQuery,
    index: &CatalogIndex,
    resolver: &Resolver,
) -> Result<CoursePlan, QueryError> {
    query.validate()?;

    let department = query
        .department
        .as_deref()
        .map(|d| resolver.resolve_department(d))
        .transpose()?;

    let liberal_ed_tag = query
        .liberal_ed_tag
        .as_deref()
        .map(|tag| {
            index
                .libed(tag)
                .map(|l| l.tag.clone())
                .ok_or_else(|| QueryError::lookup("liberal_ed_tag", tag))
        })
        .transpose()?;

    let professors = query
        .professor
        .as_deref()
        .map(|spec| resolve_professor_filter(spec, index))
        .transpose()?;

    // A term bound that does not resolve against the corpus is a lookup
    // error, not a silently-empty (or silently-unbounded) range.
    for bound in [query.term_min, query.term_max].into_iter().flatten() {
        resolver.resolve_term(&bound.to_string())?;
    }

    Ok(CoursePlan {
        department,
        number_min: query.number_min,
        number_max: query.number_max,
        level: query.level,
        min_gpa: query.min_gpa,
        liberal_ed_tag,
        professors,
        term_min: query.term_min,
        term_max: query.term_max,
        keyword: query.keyword.clone(),
        sort: query.sort.unwrap_or_default(),
    })
}

/// A professor filter is either an exact id (unknown -> lookup error) or a
/// name fragment matched against compacted names (inherently fuzzy, so an
/// empty match set is a result, not an error).
fn resolve_professor_filter(
    spec: &str,
    index: &CatalogIndex,
) -> Result<BTreeSet<u32>, QueryError> {
    if let Ok(id) = spec.parse::<u32>() {
        return if index.professor(id).is_some() {
            Ok(BTreeSet::from([id]))
        } else {
            Err(QueryError::lookup("professor", spec))
        };
    }
    let needle = tokens::compact(spec);
    Ok(index
        .professors()
        .filter(|p| tokens::compact(&p.name).contains(&needle))
        .map(|p| p.id)
        .collect())
}

impl CoursePlan {
    /// Whether a course satisfies every hard dimension except `min_gpa`
    /// (which needs the aggregate summary and is applied by the filter).
    fn matches(&self, index: &CatalogIndex, course: &Course) -> bool {
        if let Some(dept) = &self.department {
            if &course.key.department != dept {
                return false;
            }
        }
        let numeric = course.key.number.numeric;
        if self.number_min.is_some_and(|min| numeric < min) {
            return false;
        }
        if self.number_max.is_some_and(|max| numeric > max) {
            return false;
        }
        if self.level.is_some_and(|level| course.key.number.level() != level) {
            return false;
        }
        if let Some(tag) = &self.liberal_ed_tag {
            if !course.libed_tags.contains(tag) {
                return false;
            }
        }
        if let Some(professors) = &self.professors {
            let taught = index
                .course_sections(course)
                .any(|s| professors.contains(&s.professor));
            if !taught {
                return false;
            }
        }
        if self.term_min.is_some() || self.term_max.is_some() {
            let in_range = index.course_sections(course).any(|s| {
                !self.term_min.is_some_and(|min| s.term < min)
                    && !self.term_max.is_some_and(|max| s.term > max)
            });
            if !in_range {
                return false;
            }
        }
        true
    }
}

/// Apply a course plan against the catalog.
///
/// Walks courses in canonical key order; the ranking engine may reorder
/// but never re-widen this set.
pub fn filter_courses<'a>(index: &'a CatalogIndex, plan: &CoursePlan) -> Vec<CourseCandidate<'a>> {
    let candidates: Vec<CourseCandidate<'a>> = index
        .courses()
        .filter(|course| plan.matches(index, course))
        .filter_map(|course| {
            let summary = aggregate(index.course_sections(course), GroupBy::None)
                .pop()
                .unwrap_or_else(|| GradeSummary::from_counts(Default::default()));
            if let Some(min) = plan.min_gpa {
                // Undefined GPA never satisfies a minimum-GPA bound.
                if !summary.gpa.is_some_and(|gpa| gpa >= min) {
                    return None;
                }
            }
            Some(CourseCandidate { course, summary })
        })
        .collect();
    debug!(candidates = candidates.len(), "course filter applied");
    candidates
}

/// Resolve a professor query into a plan.
pub fn plan_professors(
    query: &ProfessorQuery,
    index: &CatalogIndex,
) -> Result<ProfessorPlan, QueryError> {
    query.validate()?;

    if let Some(id) = query.id {
        if index.professor(id).is_none() {
            return Err(QueryError::lookup("professor", id.to_string()));
        }
    }

    Ok(ProfessorPlan {
        id: query.id,
        min_rating: query.min_rating,
        name_fragment: query.name_fragment.clone(),
        sort: query.sort.unwrap_or_default(),
    })
}

/// Apply a professor plan against the catalog, in id order.
pub fn filter_professors<'a>(
    index: &'a CatalogIndex,
    plan: &ProfessorPlan,
) -> Vec<ProfessorCandidate<'a>> {
    let candidates: Vec<ProfessorCandidate<'a>> = index
        .professors()
        .filter(|p| plan.id.is_none_or(|id| p.id == id))
        .filter(|p| {
            plan.min_rating.is_none_or(|min| {
                // No external rating never satisfies a minimum-rating bound.
                p.rating.as_ref().is_some_and(|r| r.score >= min)
            })
        })
        .map(|professor| {
            let summary = aggregate(index.professor_sections(professor), GroupBy::None)
                .pop()
                .unwrap_or_else(|| GradeSummary::from_counts(Default::default()));
            ProfessorCandidate { professor, summary }
        })
        .collect();
    debug!(candidates = candidates.len(), "professor filter applied");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;

    fn setup() -> (CatalogIndex, Resolver) {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        let resolver = Resolver::new(&index);
        (index, resolver)
    }

    fn run(query: &CourseQuery) -> Result<Vec<String>, QueryError> {
        let (index, resolver) = setup();
        let plan = plan_courses(query, &index, &resolver)?;
        Ok(filter_courses(&index, &plan)
            .iter()
            .map(|c| c.course.key.to_string())
            .collect())
    }

    #[test]
    fn test_empty_request_matches_entire_corpus() {
        let all = run(&CourseQuery::default()).unwrap();
        assert_eq!(all, ["CSCI 1133", "CSCI 5511", "WRIT 1001W"]);
    }

    #[test]
    fn test_conjunction_narrows() {
        let dept_only = run(&CourseQuery {
            department: Some("CSCI".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(dept_only, ["CSCI 1133", "CSCI 5511"]);

        let with_number = run(&CourseQuery {
            department: Some("CSCI".to_string()),
            number_min: Some(4000),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(with_number, ["CSCI 5511"]);

        // Adding min_gpa strictly narrows, never widens.
        let with_gpa = run(&CourseQuery {
            department: Some("CSCI".to_string()),
            number_min: Some(4000),
            min_gpa: Some(3.5),
            ..Default::default()
        })
        .unwrap();
        assert!(with_gpa.iter().all(|k| with_number.contains(k)));
        assert_eq!(with_gpa, ["CSCI 5511"]);
    }

    #[test]
    fn test_department_accepts_full_name() {
        let by_name = run(&CourseQuery {
            department: Some("Computer Science".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_name, ["CSCI 1133", "CSCI 5511"]);
    }

    #[test]
    fn test_unknown_department_is_lookup_error_not_empty() {
        let err = run(&CourseQuery {
            department: Some("ZZZZ".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, QueryError::lookup("department", "ZZZZ"));
    }

    #[test]
    fn test_undefined_gpa_excluded_by_min_gpa() {
        // WRIT 1001W is pass/fail only; any min_gpa must exclude it.
        let survivors = run(&CourseQuery {
            min_gpa: Some(0.0),
            ..Default::default()
        })
        .unwrap();
        assert!(!survivors.contains(&"WRIT 1001W".to_string()));
    }

    #[test]
    fn test_level_filter() {
        let masters = run(&CourseQuery {
            level: Some(Level::Masters),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(masters, ["CSCI 5511"]);
    }

    #[test]
    fn test_libed_filter_and_unknown_tag() {
        let writing = run(&CourseQuery {
            liberal_ed_tag: Some("Writing Intensive".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(writing, ["WRIT 1001W"]);

        let err = run(&CourseQuery {
            liberal_ed_tag: Some("No Such Tag".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn test_professor_filter_by_id_and_fragment() {
        let by_id = run(&CourseQuery {
            professor: Some("3".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_id, ["WRIT 1001W"]);

        // "smith" matches both Jane Smith and John Smithson.
        let by_name = run(&CourseQuery {
            professor: Some("smith".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_name, ["CSCI 1133", "CSCI 5511"]);

        let unknown_id = run(&CourseQuery {
            professor: Some("99".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(unknown_id.is_lookup());
    }

    #[test]
    fn test_term_range_filter() {
        let fall_only = run(&CourseQuery {
            term_min: Some(1249),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fall_only, ["CSCI 1133", "CSCI 5511"]);
    }

    #[test]
    fn test_unresolvable_term_bound_is_lookup_error() {
        // Last digit 0 does not decode to a session at all.
        let err = run(&CourseQuery {
            term_min: Some(1240),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, QueryError::lookup("term", "1240"));

        // Decodable but absent from the corpus is equally a lookup error,
        // never an unbounded (full-corpus) result.
        let err = run(&CourseQuery {
            term_max: Some(9993),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, QueryError::lookup("term", "9993"));
    }

    #[test]
    fn test_professor_plan_unknown_id() {
        let (index, _) = setup();
        let err = plan_professors(
            &ProfessorQuery {
                id: Some(99),
                ..Default::default()
            },
            &index,
        )
        .unwrap_err();
        assert_eq!(err, QueryError::lookup("professor", "99"));
    }

    #[test]
    fn test_min_rating_excludes_unrated() {
        let (index, _) = setup();
        let plan = plan_professors(
            &ProfessorQuery {
                min_rating: Some(3.0),
                ..Default::default()
            },
            &index,
        )
        .unwrap();
        let ids: Vec<u32> = filter_professors(&index, &plan)
            .iter()
            .map(|c| c.professor.id)
            .collect();
        // Professor 3 has no rating record and is excluded.
        assert_eq!(ids, [1, 2]);
    }
}
