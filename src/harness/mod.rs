//! Blind side-by-side comparison of the two pipelines.

mod comparison;
mod labels;

pub use comparison::{
    Comparison, ComparisonHarness, ComparisonOutcome, HarnessError, PresentedOption,
};
pub use labels::{LabelAssignment, OptionLabel};
