use crate::external::ServiceError;
use crate::interpretation::InterpretationError;
use thiserror::Error;

/// Why a pipeline run ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Could not interpret prompt: {0}")]
    InterpretationSchema(#[from] InterpretationError),

    #[error("None of the {attempted} seed tracks could be resolved")]
    SeedUnresolvable { attempted: usize },

    #[error("External service failed: {0}")]
    ExternalService(#[from] ServiceError),

    #[error("No candidate tracks to rank")]
    EmptyCandidateSet,
}

impl PipelineError {
    /// Short text safe to show next to a failed option. Does not leak which pipeline ran.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InterpretationSchema(InterpretationError::EmptyPrompt) => {
                "The prompt was empty."
            }
            PipelineError::InterpretationSchema(_) => "The prompt could not be understood.",
            PipelineError::SeedUnresolvable { .. } => "No matching seed tracks were found.",
            PipelineError::ExternalService(_) => "A music service did not respond.",
            PipelineError::EmptyCandidateSet => "No tracks matched the prompt.",
        }
    }

    /// Stable machine-readable code for logs and vote records.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InterpretationSchema(_) => "interpretation_schema",
            PipelineError::SeedUnresolvable { .. } => "seed_unresolvable",
            PipelineError::ExternalService(_) => "external_service",
            PipelineError::EmptyCandidateSet => "empty_candidate_set",
        }
    }
}
