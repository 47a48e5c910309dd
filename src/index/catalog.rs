//! The catalog index: every lookup structure the query pipeline needs,
//! built in one O(sections) pass and frozen.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::Dataset;
use crate::error::DataIntegrityError;
use crate::index::tokens;
use crate::resolve::term_label;
use crate::types::{
    Course, CourseKey, Department, LibEd, Professor, Section, SectionId, Term,
};

/// Courses and professors reachable from one normalized name token.
#[derive(Debug, Default, Clone)]
pub struct TokenEntry {
    pub courses: BTreeSet<CourseKey>,
    pub professors: BTreeSet<u32>,
}

/// Immutable lookup structures over the loaded corpus.
///
/// Construction validates referential integrity and fails with
/// [`DataIntegrityError`] on the first inconsistency. Accessors are O(log n)
/// map lookups; nothing mutates the index after [`CatalogIndex::build`]
/// returns, so a shared reference is safe under arbitrary concurrency.
#[derive(Debug)]
pub struct CatalogIndex {
    departments: BTreeMap<String, Department>,
    terms: BTreeMap<u32, Term>,
    courses: BTreeMap<CourseKey, Course>,
    professors: BTreeMap<u32, Professor>,
    libeds: BTreeMap<String, LibEd>,
    sections: Vec<Section>,
    tokens: BTreeMap<String, TokenEntry>,
}

impl CatalogIndex {
    /// Build the index from a loaded dataset.
    pub fn build(dataset: Dataset) -> Result<Self, DataIntegrityError> {
        let mut departments = BTreeMap::new();
        for dept in dataset.departments {
            if departments
                .insert(dept.code.clone(), dept.clone())
                .is_some()
            {
                return Err(DataIntegrityError::DuplicateDepartment(dept.code));
            }
        }

        let mut terms = BTreeMap::new();
        for code in dataset.terms {
            let label = term_label(code).ok_or(DataIntegrityError::InvalidTerm(code))?;
            terms.insert(code, Term { code, label });
        }

        let mut libeds: BTreeMap<String, LibEd> = dataset
            .libeds
            .into_iter()
            .map(|(tag, description)| {
                (
                    tag.clone(),
                    LibEd {
                        tag,
                        description,
                        courses: BTreeSet::new(),
                    },
                )
            })
            .collect();

        let mut courses: BTreeMap<CourseKey, Course> = BTreeMap::new();
        for course in dataset.courses {
            if !departments.contains_key(&course.key.department) {
                return Err(DataIntegrityError::UnknownDepartment(course.key));
            }
            for tag in &course.libed_tags {
                let libed = libeds.get_mut(tag).ok_or_else(|| {
                    DataIntegrityError::UnknownLibEd {
                        course: course.key.clone(),
                        tag: tag.clone(),
                    }
                })?;
                libed.courses.insert(course.key.clone());
            }
            let key = course.key.clone();
            if courses.insert(key.clone(), course).is_some() {
                return Err(DataIntegrityError::DuplicateCourse(key));
            }
        }

        let mut professors: BTreeMap<u32, Professor> = BTreeMap::new();
        for professor in dataset.professors {
            let id = professor.id;
            if professors.insert(id, professor).is_some() {
                return Err(DataIntegrityError::DuplicateProfessor(id));
            }
        }

        // Wire sections into their course and professor, validating every
        // reference along the way.
        let sections = dataset.sections;
        for (id, section) in sections.iter().enumerate() {
            if section.grades.is_empty() {
                return Err(DataIntegrityError::EmptyGrades(section.course.clone()));
            }
            let course = courses
                .get_mut(&section.course)
                .ok_or_else(|| DataIntegrityError::UnknownCourse(section.course.clone()))?;
            course.sections.push(id as SectionId);

            let professor = professors.get_mut(&section.professor).ok_or_else(|| {
                DataIntegrityError::UnknownProfessor {
                    course: section.course.clone(),
                    professor: section.professor,
                }
            })?;
            professor.sections.push(id as SectionId);

            if !terms.contains_key(&section.term) {
                return Err(DataIntegrityError::UnknownTerm {
                    course: section.course.clone(),
                    term: section.term,
                });
            }
        }

        // Token index over course titles/codes and professor names, for
        // fuzzy lookup.
        let mut token_index: BTreeMap<String, TokenEntry> = BTreeMap::new();
        for course in courses.values() {
            let text = format!("{} {} {}", course.key.department, course.key.number, course.title);
            for token in tokens::tokenize(&text) {
                token_index
                    .entry(token)
                    .or_default()
                    .courses
                    .insert(course.key.clone());
            }
        }
        for professor in professors.values() {
            for token in tokens::tokenize(&professor.name) {
                token_index
                    .entry(token)
                    .or_default()
                    .professors
                    .insert(professor.id);
            }
        }

        Ok(Self {
            departments,
            terms,
            courses,
            professors,
            libeds,
            sections,
            tokens: token_index,
        })
    }

    /// Department by exact uppercase code.
    pub fn department(&self, code: &str) -> Option<&Department> {
        self.departments.get(code)
    }

    /// All departments in code order.
    pub fn departments(&self) -> impl Iterator<Item = &Department> {
        self.departments.values()
    }

    /// Term by code.
    pub fn term(&self, code: u32) -> Option<&Term> {
        self.terms.get(&code)
    }

    /// All terms in chronological (code) order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    /// Course by composite key.
    pub fn course(&self, key: &CourseKey) -> Option<&Course> {
        self.courses.get(key)
    }

    /// All courses in canonical (key) order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Professor by id.
    pub fn professor(&self, id: u32) -> Option<&Professor> {
        self.professors.get(&id)
    }

    /// All professors in id order.
    pub fn professors(&self) -> impl Iterator<Item = &Professor> {
        self.professors.values()
    }

    /// Liberal-education requirement by tag, case-insensitive.
    pub fn libed(&self, tag: &str) -> Option<&LibEd> {
        self.libeds
            .get(tag)
            .or_else(|| {
                self.libeds
                    .values()
                    .find(|l| l.tag.eq_ignore_ascii_case(tag))
            })
    }

    /// All liberal-education requirements in tag order.
    pub fn libeds(&self) -> impl Iterator<Item = &LibEd> {
        self.libeds.values()
    }

    /// Section by id. Ids are only ever produced by this index, so the
    /// access is infallible.
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id]
    }

    /// All sections of a course.
    pub fn course_sections<'a>(
        &'a self,
        course: &'a Course,
    ) -> impl Iterator<Item = &'a Section> + 'a {
        course.sections.iter().map(|&id| self.section(id))
    }

    /// All sections taught by a professor.
    pub fn professor_sections<'a>(
        &'a self,
        professor: &'a Professor,
    ) -> impl Iterator<Item = &'a Section> + 'a {
        professor.sections.iter().map(|&id| self.section(id))
    }

    /// Entities reachable from a normalized name token.
    pub fn token(&self, token: &str) -> Option<&TokenEntry> {
        self.tokens.get(token)
    }
}
