//! Abbreviation and term resolution.
//!
//! Bidirectional mapping between short codes and canonical names:
//! department code <-> full department name, term code <-> human label.
//! Loaded once from the catalog; consulted by the query planner and exposed
//! directly through the `get_abbreviations_and_terms` operation.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::QueryError;
use crate::index::CatalogIndex;

/// One (code, label) pair from the enumerable listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLabel {
    pub code: String,
    pub label: String,
}

/// Decode a term code to its human label.
///
/// The last digit selects the session (3 = Spring, 5 = Summer, 9 = Fall)
/// and the remaining digits are the year offset from 1900, so 1249 decodes
/// to "Fall 2024". Any other last digit is not a valid term.
pub fn term_label(code: u32) -> Option<String> {
    let season = match code % 10 {
        3 => "Spring",
        5 => "Summer",
        9 => "Fall",
        _ => return None,
    };
    Some(format!("{} {}", season, 1900 + code / 10))
}

/// Parse a human term label ("Fall 2024") back to its code.
pub fn parse_term_label(label: &str) -> Option<u32> {
    let mut parts = label.split_whitespace();
    let season = match parts.next()? {
        s if s.eq_ignore_ascii_case("spring") => 3,
        s if s.eq_ignore_ascii_case("summer") => 5,
        s if s.eq_ignore_ascii_case("fall") => 9,
        _ => return None,
    };
    let year: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || year < 1900 {
        return None;
    }
    Some((year - 1900) * 10 + season)
}

/// Resolves department codes/names and term codes/labels against the
/// loaded corpus.
#[derive(Debug)]
pub struct Resolver {
    /// code -> canonical name, in code order.
    departments: BTreeMap<String, String>,
    /// lowercase full name -> code.
    dept_by_name: HashMap<String, String>,
    /// term code -> label, in chronological order.
    terms: BTreeMap<u32, String>,
}

impl Resolver {
    /// Build the resolver from the catalog's department and term sets.
    pub fn new(index: &CatalogIndex) -> Self {
        let mut departments = BTreeMap::new();
        let mut dept_by_name = HashMap::new();
        for dept in index.departments() {
            departments.insert(dept.code.clone(), dept.name.clone());
            dept_by_name.insert(dept.name.to_lowercase(), dept.code.clone());
        }
        let terms = index
            .terms()
            .map(|t| (t.code, t.label.clone()))
            .collect();
        Self {
            departments,
            dept_by_name,
            terms,
        }
    }

    /// Resolve a department code or full name to its canonical code.
    ///
    /// Case-insensitive on both forms. Fails with a lookup error so the
    /// caller can tell "unknown department" from "no matching courses".
    pub fn resolve_department(&self, code_or_name: &str) -> Result<String, QueryError> {
        let upper = code_or_name.to_uppercase();
        if self.departments.contains_key(&upper) {
            return Ok(upper);
        }
        self.dept_by_name
            .get(&code_or_name.to_lowercase())
            .cloned()
            .ok_or_else(|| QueryError::lookup("department", code_or_name))
    }

    /// Resolve a term given as a numeric code or a human label.
    pub fn resolve_term(&self, code_or_label: &str) -> Result<u32, QueryError> {
        let code = code_or_label
            .parse::<u32>()
            .ok()
            .or_else(|| parse_term_label(code_or_label))
            .ok_or_else(|| QueryError::lookup("term", code_or_label))?;
        if self.terms.contains_key(&code) {
            Ok(code)
        } else {
            Err(QueryError::lookup("term", code_or_label))
        }
    }

    /// The enumerable "abbreviations and terms" listing: departments then
    /// terms, each sorted by code.
    pub fn list_all(&self) -> Vec<CodeLabel> {
        let mut entries: Vec<CodeLabel> = self
            .departments
            .iter()
            .map(|(code, name)| CodeLabel {
                code: code.clone(),
                label: name.clone(),
            })
            .collect();
        entries.extend(self.terms.iter().map(|(code, label)| CodeLabel {
            code: code.to_string(),
            label: label.clone(),
        }));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;

    fn resolver() -> Resolver {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        Resolver::new(&index)
    }

    #[test]
    fn test_term_label_round_trip() {
        assert_eq!(term_label(1249).as_deref(), Some("Fall 2024"));
        assert_eq!(term_label(1243).as_deref(), Some("Spring 2024"));
        assert_eq!(term_label(1215).as_deref(), Some("Summer 2021"));
        assert_eq!(term_label(1240), None);

        assert_eq!(parse_term_label("Fall 2024"), Some(1249));
        assert_eq!(parse_term_label("spring 2024"), Some(1243));
        assert_eq!(parse_term_label("Winter 2024"), None);
        assert_eq!(parse_term_label("Fall"), None);
    }

    #[test]
    fn test_resolve_department_by_code_and_name() {
        let resolver = resolver();
        assert_eq!(resolver.resolve_department("CSCI").unwrap(), "CSCI");
        assert_eq!(resolver.resolve_department("csci").unwrap(), "CSCI");
        assert_eq!(
            resolver.resolve_department("computer science").unwrap(),
            "CSCI"
        );
        assert_eq!(
            resolver.resolve_department("ZZZZ").unwrap_err(),
            QueryError::lookup("department", "ZZZZ")
        );
    }

    #[test]
    fn test_resolve_term() {
        let resolver = resolver();
        assert_eq!(resolver.resolve_term("1249").unwrap(), 1249);
        assert_eq!(resolver.resolve_term("Fall 2024").unwrap(), 1249);
        // Decodable but not in the corpus is still a lookup failure.
        assert!(resolver.resolve_term("Fall 1999").unwrap_err().is_lookup());
        assert!(resolver.resolve_term("nonsense").unwrap_err().is_lookup());
    }

    #[test]
    fn test_list_all_sorted_departments_then_terms() {
        let listing = resolver().list_all();
        let codes: Vec<&str> = listing.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["CSCI", "WRIT", "1243", "1249"]);
        assert_eq!(listing[0].label, "Computer Science");
        assert_eq!(listing[3].label, "Fall 2024");
    }
}
