use super::{CandidateSource, PipelineKind, PipelineRun, PipelineStage, RunContext};
use crate::interpretation::PromptInterpreter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs one pipeline end to end: interpret, then let the source produce a ranked list.
pub struct Orchestrator {
    interpreter: Arc<dyn PromptInterpreter>,
    source: Arc<dyn CandidateSource>,
    playlist_length: usize,
}

impl Orchestrator {
    pub fn new(
        interpreter: Arc<dyn PromptInterpreter>,
        source: Arc<dyn CandidateSource>,
        playlist_length: usize,
    ) -> Self {
        Self {
            interpreter,
            source,
            playlist_length,
        }
    }

    pub fn kind(&self) -> PipelineKind {
        self.source.kind()
    }

    /// Never fails as a whole; errors end up in [`PipelineRun::error`].
    pub async fn run(&self, prompt: &str) -> PipelineRun {
        let kind = self.kind();
        let started = Instant::now();
        let mut context = RunContext::default();

        context.enter(PipelineStage::Interpreting);
        let interpreted = self
            .interpreter
            .interpret(prompt, self.source.interpretation_mode())
            .await;

        let (query, outcome) = match interpreted {
            Ok(query) => {
                let outcome = self
                    .source
                    .produce(&query, self.playlist_length, &mut context)
                    .await;
                (Some(query), outcome)
            }
            Err(err) => (None, Err(err.into())),
        };

        let elapsed = started.elapsed();
        match &outcome {
            Ok(results) => info!(
                pipeline = %kind,
                "Produced {} tracks in {:?}",
                results.len(),
                elapsed
            ),
            Err(err) => warn!(
                pipeline = %kind,
                stage = ?context.current_stage(),
                "Failed after {:?}: {}",
                elapsed,
                err
            ),
        }

        PipelineRun::finish(kind, prompt, query, context, outcome, elapsed)
    }
}
