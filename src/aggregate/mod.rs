//! Distribution aggregation - from sections to summary statistics.
//!
//! Merging grade-count maps is symbol-wise addition, so aggregation over any
//! number of sections is commutative and associative: the same set of
//! sections yields the same summary regardless of order or grouping of the
//! merges. All statistics (GPA, pass rate, withdrawal rate) are computed
//! from the merged counts in a single pass at the end.

mod summary;

pub use summary::{
    aggregate, grade_points, GradeRates, GradeSummary, GroupBy, PartitionKey,
};
