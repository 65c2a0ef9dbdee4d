//! The two playlist pipelines.
//!
//! Both share [`Orchestrator`]; what differs is the [`CandidateSource`] behind it. The
//! external source resolves seeds and asks the recommendation service, the local one
//! searches the static catalog.

mod error;
mod orchestrator;
mod run;
mod source;

pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use run::{PipelineKind, PipelineRun, PipelineStage, RunContext};
pub use source::{CandidateSource, ExternalServiceSource, LocalCatalogSource, ZeroSeedPolicy};
