//! Prompt interpretation: from free text to a typed feature query.

mod interpreter;
pub mod llm;
mod models;

pub use interpreter::{
    parse_interpretation, strip_code_fence, system_prompt, InterpretationError,
    InterpretationMode, LlmPromptInterpreter, PromptInterpreter, SeedStrategy,
};
pub use models::{
    AudioFeatureTargets, InterpretedParams, InterpretedQuery, SchemaViolation, WeightParams,
    DEFAULT_FEATURE_WEIGHT,
};
