//! Ranking - deterministic ordering of filter survivors.
//!
//! With a keyword, candidates are scored by a weighted feature sum (exact
//! and substring matches dominate, token overlap next, edit-distance
//! similarity catches typos) and ordered score-descending. Without one,
//! the explicit sort hint applies. Every ordering ends in a total order
//! over canonical identifiers, so identical inputs always produce
//! identical output - no unordered traversal can leak through.

mod scorer;

pub use scorer::{keyword_score, normalized_similarity, RankWeights};

use crate::query::{CourseCandidate, ProfessorCandidate, SortHint};

/// A ranked course with its keyword score, if a keyword was given.
pub type RankedCourse<'a> = (CourseCandidate<'a>, Option<f64>);

/// A ranked professor with its keyword score, if a fragment was given.
pub type RankedProfessor<'a> = (ProfessorCandidate<'a>, Option<f64>);

/// Order course candidates.
pub fn rank_courses<'a>(
    candidates: Vec<CourseCandidate<'a>>,
    keyword: Option<&str>,
    sort: SortHint,
    weights: &RankWeights,
) -> Vec<RankedCourse<'a>> {
    let mut ranked: Vec<RankedCourse<'a>> = candidates
        .into_iter()
        .map(|candidate| {
            let score = keyword.map(|kw| {
                let text = format!(
                    "{} {} {}",
                    candidate.course.key.department, candidate.course.key.number,
                    candidate.course.title
                );
                keyword_score(weights, kw, &text)
            });
            (candidate, score)
        })
        .collect();

    ranked.sort_by(|(a, score_a), (b, score_b)| {
        if keyword.is_some() {
            score_desc(score_a, score_b)
                .then_with(|| gpa_desc(a.summary.gpa, b.summary.gpa))
                .then_with(|| a.course.key.cmp(&b.course.key))
        } else {
            let hint = match sort {
                SortHint::GpaDesc => gpa_desc(a.summary.gpa, b.summary.gpa),
                SortHint::NumberAsc => a
                    .course
                    .key
                    .number
                    .cmp(&b.course.key.number)
                    .then_with(|| a.course.key.department.cmp(&b.course.key.department)),
                SortHint::EnrollmentDesc => b.summary.students.cmp(&a.summary.students),
                _ => std::cmp::Ordering::Equal,
            };
            hint.then_with(|| a.course.key.cmp(&b.course.key))
        }
    });
    ranked
}

/// Order professor candidates.
pub fn rank_professors<'a>(
    candidates: Vec<ProfessorCandidate<'a>>,
    name_fragment: Option<&str>,
    sort: SortHint,
    weights: &RankWeights,
) -> Vec<RankedProfessor<'a>> {
    let mut ranked: Vec<RankedProfessor<'a>> = candidates
        .into_iter()
        .map(|candidate| {
            let score =
                name_fragment.map(|kw| keyword_score(weights, kw, &candidate.professor.name));
            (candidate, score)
        })
        .collect();

    ranked.sort_by(|(a, score_a), (b, score_b)| {
        if name_fragment.is_some() {
            score_desc(score_a, score_b)
                .then_with(|| gpa_desc(a.summary.gpa, b.summary.gpa))
                .then_with(|| a.professor.id.cmp(&b.professor.id))
        } else {
            let hint = match sort {
                SortHint::GpaDesc => gpa_desc(a.summary.gpa, b.summary.gpa),
                SortHint::RatingDesc => gpa_desc(
                    a.professor.rating.as_ref().map(|r| r.score),
                    b.professor.rating.as_ref().map(|r| r.score),
                ),
                SortHint::EnrollmentDesc => b.summary.students.cmp(&a.summary.students),
                _ => std::cmp::Ordering::Equal,
            };
            hint.then_with(|| a.professor.id.cmp(&b.professor.id))
        }
    });
    ranked
}

/// Descending comparison of optional scores; absent always sorts last.
fn score_desc(a: &Option<f64>, b: &Option<f64>) -> std::cmp::Ordering {
    gpa_desc(*a, *b)
}

/// Descending comparison where `None` (no computable value) sorts after
/// every defined value, including 0.0.
fn gpa_desc(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;
    use crate::index::CatalogIndex;
    use crate::query::{
        filter_courses, filter_professors, plan_courses, plan_professors, CourseQuery,
        ProfessorQuery,
    };
    use crate::resolve::Resolver;

    fn course_order(keyword: Option<&str>, sort: SortHint) -> Vec<String> {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        let resolver = Resolver::new(&index);
        let plan = plan_courses(&CourseQuery::default(), &index, &resolver).unwrap();
        let candidates = filter_courses(&index, &plan);
        rank_courses(candidates, keyword, sort, &RankWeights::default())
            .iter()
            .map(|(c, _)| c.course.key.to_string())
            .collect()
    }

    #[test]
    fn test_default_order_is_canonical() {
        assert_eq!(
            course_order(None, SortHint::Identifier),
            ["CSCI 1133", "CSCI 5511", "WRIT 1001W"]
        );
    }

    #[test]
    fn test_gpa_desc_puts_undefined_last() {
        // WRIT 1001W has no computable GPA and must sort last, even
        // though its key sorts after both CSCI courses anyway; the CSCI
        // order flips because 5511 has the higher GPA.
        assert_eq!(
            course_order(None, SortHint::GpaDesc),
            ["CSCI 5511", "CSCI 1133", "WRIT 1001W"]
        );
    }

    #[test]
    fn test_keyword_ranks_title_match_first() {
        let order = course_order(Some("artificial intelligence"), SortHint::Identifier);
        assert_eq!(order[0], "CSCI 5511");
    }

    #[test]
    fn test_keyword_typo_tolerance() {
        let order = course_order(Some("artifical inteligence"), SortHint::Identifier);
        assert_eq!(order[0], "CSCI 5511");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let first = course_order(Some("writing"), SortHint::Identifier);
        for _ in 0..5 {
            assert_eq!(course_order(Some("writing"), SortHint::Identifier), first);
        }
    }

    #[test]
    fn test_professor_fragment_ranking() {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        let plan = plan_professors(&ProfessorQuery::default(), &index).unwrap();
        let candidates = filter_professors(&index, &plan);
        let ranked = rank_professors(
            candidates,
            Some("smith"),
            SortHint::Identifier,
            &RankWeights::default(),
        );
        let names: Vec<&str> = ranked
            .iter()
            .map(|(c, _)| c.professor.name.as_str())
            .collect();
        // Exact token match ("Smith") outranks substring ("Smithson");
        // the non-match trails.
        assert_eq!(names, ["Jane Smith", "John Smithson", "Maria Garcia"]);
        assert!(ranked[0].1.unwrap() > ranked[1].1.unwrap());
        assert_eq!(ranked[2].1, Some(0.0));
    }

    #[test]
    fn test_rating_desc_puts_unrated_last() {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        let plan = plan_professors(&ProfessorQuery::default(), &index).unwrap();
        let candidates = filter_professors(&index, &plan);
        let ranked = rank_professors(
            candidates,
            None,
            SortHint::RatingDesc,
            &RankWeights::default(),
        );
        let ids: Vec<u32> = ranked.iter().map(|(c, _)| c.professor.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
