//! Query planning and filtering.
//!
//! A structured request becomes a plan: every enumerable filter value
//! (department, term, tag, professor id) is resolved up front, so an
//! unknown value fails with a lookup error before any filtering happens,
//! and a contradictory combination fails validation before that. The plan
//! is then applied as a conjunctive predicate over the catalog's canonical
//! iteration order.

mod planner;
mod request;

pub use planner::{
    filter_courses, filter_professors, plan_courses, plan_professors, CourseCandidate,
    CoursePlan, ProfessorCandidate, ProfessorPlan,
};
pub use request::{CourseQuery, ProfessorQuery, SortHint};
