//! Grade distribution summaries.
//!
//! A [`GradeSummary`] is a pure function of a set of grade-count maps:
//! merge by symbol-wise addition, then derive statistics once from the
//! merged counts. GPA-eligible symbols (A+ through F) contribute to the GPA
//! numerator and denominator; everything else (W, I, S, P, N, ...) stays in
//! the enrollment total and the distribution but never in the GPA.
//!
//! "No computable GPA" is `None`, never `0.0` - a section graded entirely
//! pass/fail has an undefined GPA, while an all-F section has GPA 0.0, and
//! callers must be able to tell those apart.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::types::{GradeCounts, Section};

/// Point values for GPA-eligible symbols.
static GRADE_POINTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("A+", 4.333),
        ("A", 4.0),
        ("A-", 3.667),
        ("B+", 3.333),
        ("B", 3.0),
        ("B-", 2.667),
        ("C+", 2.333),
        ("C", 2.0),
        ("C-", 1.667),
        ("D+", 1.333),
        ("D", 1.0),
        ("D-", 0.667),
        ("F", 0.0),
    ])
});

/// Symbols counted as passing for the pass-rate statistic.
const PASSING: &[&str] = &[
    "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D+", "D", "D-", "S", "P",
];

/// Symbols counted as failing for the pass-rate statistic.
const FAILING: &[&str] = &["F", "N"];

/// Withdrawal symbols.
const WITHDRAWN: &[&str] = &["W"];

/// Letter bands for the per-band breakdown. A band collects its
/// plus/minus variants; the F band is plain F only.
const A_BAND: &[&str] = &["A+", "A", "A-"];
const B_BAND: &[&str] = &["B+", "B", "B-"];
const C_BAND: &[&str] = &["C+", "C", "C-"];
const D_BAND: &[&str] = &["D+", "D", "D-"];
const F_BAND: &[&str] = &["F"];

/// Point value of a grade symbol, if it is GPA-eligible.
pub fn grade_points(symbol: &str) -> Option<f64> {
    GRADE_POINTS.get(symbol).copied()
}

/// How to partition sections before merging.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One overall summary across all input sections.
    #[default]
    None,
    /// One summary per distinct professor found in the input.
    Professor,
    /// One summary per distinct term found in the input.
    Term,
}

/// Partition label attached to a grouped summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PartitionKey {
    Professor(u32),
    Term(u32),
}

/// Percentage of graded students falling in each letter band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRates {
    pub a_rate: f64,
    pub b_rate: f64,
    pub c_rate: f64,
    pub d_rate: f64,
    pub f_rate: f64,
}

/// Merged distribution and derived statistics for one partition.
///
/// All `Option<f64>` statistics follow the same discipline as GPA: `None`
/// means the denominator was empty, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    /// Which partition this summary describes, for grouped aggregation.
    /// `None` for an overall summary. Translated to a labeled form at the
    /// operation boundary rather than serialized raw.
    #[serde(skip)]
    pub partition: Option<PartitionKey>,

    /// Merged symbol-wise counts.
    pub counts: GradeCounts,

    /// Total enrollment: every student in the distribution, including
    /// withdrawals and non-GPA symbols.
    pub students: u32,

    /// Students with a pass-or-fail outcome (denominator for pass rate).
    pub graded: u32,

    /// Students with a GPA-eligible grade (denominator for mean GPA).
    pub gpa_eligible: u32,

    /// Mean GPA over GPA-eligible grades, rounded to 3 decimals.
    pub gpa: Option<f64>,

    /// Percentage of graded students who passed.
    pub pass_rate: Option<f64>,

    /// Percentage of all students who withdrew.
    pub withdrawal_rate: Option<f64>,

    /// Letter-band breakdown of graded students; absent when nobody has a
    /// pass-or-fail outcome.
    pub grade_rates: Option<GradeRates>,
}

impl GradeSummary {
    /// Derive a summary from already-merged counts.
    pub fn from_counts(counts: GradeCounts) -> Self {
        let students: u32 = counts.values().sum();

        let mut points = 0.0;
        let mut gpa_eligible: u32 = 0;
        for (symbol, &count) in &counts {
            if let Some(value) = grade_points(symbol) {
                points += value * f64::from(count);
                gpa_eligible += count;
            }
        }
        let gpa = (gpa_eligible > 0).then(|| round3(points / f64::from(gpa_eligible)));

        let tally = |symbols: &[&str]| -> u32 {
            symbols.iter().filter_map(|s| counts.get(*s)).sum()
        };
        let passed = tally(PASSING);
        let failed = tally(FAILING);
        let withdrawn = tally(WITHDRAWN);
        let graded = passed + failed;

        let pass_rate =
            (graded > 0).then(|| round1(f64::from(passed) / f64::from(graded) * 100.0));
        let withdrawal_rate =
            (students > 0).then(|| round1(f64::from(withdrawn) / f64::from(students) * 100.0));
        let grade_rates = (graded > 0).then(|| {
            let band = |symbols| round1(f64::from(tally(symbols)) / f64::from(graded) * 100.0);
            GradeRates {
                a_rate: band(A_BAND),
                b_rate: band(B_BAND),
                c_rate: band(C_BAND),
                d_rate: band(D_BAND),
                f_rate: band(F_BAND),
            }
        });

        Self {
            partition: None,
            counts,
            students,
            graded,
            gpa_eligible,
            gpa,
            pass_rate,
            withdrawal_rate,
            grade_rates,
        }
    }

    fn labeled(partition: PartitionKey, counts: GradeCounts) -> Self {
        Self {
            partition: Some(partition),
            ..Self::from_counts(counts)
        }
    }
}

/// Symbol-wise addition of one grade-count map into an accumulator.
fn merge_into(acc: &mut GradeCounts, grades: &GradeCounts) {
    for (symbol, count) in grades {
        *acc.entry(symbol.clone()).or_insert(0) += count;
    }
}

/// Merge sections into one or more summaries.
///
/// With `GroupBy::None` the result is a single overall summary (present
/// even when the input is empty, so callers always get a distribution).
/// Otherwise one summary per partition discovered in the input, in
/// ascending partition-key order.
pub fn aggregate<'a, I>(sections: I, group_by: GroupBy) -> Vec<GradeSummary>
where
    I: IntoIterator<Item = &'a Section>,
{
    match group_by {
        GroupBy::None => {
            let mut counts = GradeCounts::new();
            for section in sections {
                merge_into(&mut counts, &section.grades);
            }
            vec![GradeSummary::from_counts(counts)]
        }
        GroupBy::Professor | GroupBy::Term => {
            let mut partitions: BTreeMap<PartitionKey, GradeCounts> = BTreeMap::new();
            for section in sections {
                let key = match group_by {
                    GroupBy::Professor => PartitionKey::Professor(section.professor),
                    _ => PartitionKey::Term(section.term),
                };
                merge_into(partitions.entry(key).or_default(), &section.grades);
            }
            partitions
                .into_iter()
                .map(|(key, counts)| GradeSummary::labeled(key, counts))
                .collect()
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
