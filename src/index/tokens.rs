//! Name normalization for fuzzy lookup.
//!
//! Two normal forms are used throughout matching and ranking:
//! - `tokenize`: lowercase word set, split on any non-alphanumeric boundary
//!   ("Intro to Machine Learning" -> {intro, to, machine, learning})
//! - `compact`: lowercase with everything non-alphanumeric removed
//!   ("Smith, Jane" -> "smithjane"), used for whitespace-insensitive
//!   substring matching.

use std::collections::BTreeSet;

/// Split free text into a set of lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect()
}

/// Lowercase the text and strip everything that is not alphanumeric.
///
/// Substring matching on this form ignores spacing and punctuation, so
/// "machinelearning" finds "Machine Learning" and "smith, j" finds
/// "Smith, Jane".
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
