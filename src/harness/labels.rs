use crate::pipeline::PipelineKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The neutral name an option is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionLabel {
    First,
    Second,
}

/// Which pipeline hides behind which label for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAssignment {
    pub seed: u64,
    pub first: PipelineKind,
    pub second: PipelineKind,
}

impl LabelAssignment {
    /// Same seed, same mapping.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (first, second) = if rng.random_bool(0.5) {
            (PipelineKind::External, PipelineKind::Local)
        } else {
            (PipelineKind::Local, PipelineKind::External)
        };
        Self {
            seed,
            first,
            second,
        }
    }

    pub fn random() -> Self {
        Self::from_seed(rand::rng().random())
    }

    pub fn kind_for(&self, label: OptionLabel) -> PipelineKind {
        match label {
            OptionLabel::First => self.first,
            OptionLabel::Second => self.second,
        }
    }

    pub fn label_for(&self, kind: PipelineKind) -> OptionLabel {
        if self.first == kind {
            OptionLabel::First
        } else {
            OptionLabel::Second
        }
    }
}
