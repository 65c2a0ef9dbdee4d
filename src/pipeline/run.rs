use super::PipelineError;
use crate::interpretation::InterpretedQuery;
use crate::ranking::RankedTrack;
use crate::seeds::ResolvedSeed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Seeds, recommendation service, re-ranking.
    External,
    /// Similarity search over the static catalog.
    Local,
}

impl PipelineKind {
    pub fn name(self) -> &'static str {
        match self {
            PipelineKind::External => "external",
            PipelineKind::Local => "local",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Interpreting,
    ResolvingSeeds,
    RetrievingCandidates,
    Ranking,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

/// Mutable record of a run in progress, handed to the candidate source.
#[derive(Debug, Default)]
pub struct RunContext {
    stages: Vec<PipelineStage>,
    resolved_seeds: Vec<ResolvedSeed>,
}

impl RunContext {
    pub fn enter(&mut self, stage: PipelineStage) {
        self.stages.push(stage);
    }

    pub fn current_stage(&self) -> Option<PipelineStage> {
        self.stages.last().copied()
    }

    pub fn record_seeds(&mut self, seeds: Vec<ResolvedSeed>) {
        self.resolved_seeds = seeds;
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }
}

/// Everything one orchestrator did for one prompt.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub kind: PipelineKind,
    pub prompt: String,
    pub query: Option<InterpretedQuery>,
    pub resolved_seeds: Vec<ResolvedSeed>,
    /// Visited stages in order, ending with `Done` or `Failed`.
    pub stages: Vec<PipelineStage>,
    pub results: Vec<RankedTrack>,
    pub elapsed: Duration,
    pub error: Option<PipelineError>,
}

impl PipelineRun {
    pub(super) fn finish(
        kind: PipelineKind,
        prompt: &str,
        query: Option<InterpretedQuery>,
        context: RunContext,
        outcome: Result<Vec<RankedTrack>, PipelineError>,
        elapsed: Duration,
    ) -> Self {
        let RunContext {
            mut stages,
            resolved_seeds,
        } = context;
        let (results, error) = match outcome {
            Ok(results) => {
                stages.push(PipelineStage::Done);
                (results, None)
            }
            Err(err) => {
                stages.push(PipelineStage::Failed);
                (Vec::new(), Some(err))
            }
        };

        Self {
            kind,
            prompt: prompt.to_string(),
            query,
            resolved_seeds,
            stages,
            results,
            elapsed,
            error,
        }
    }

    pub fn final_stage(&self) -> PipelineStage {
        self.stages.last().copied().unwrap_or(PipelineStage::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.final_stage() == PipelineStage::Done
    }

    /// Stage that was running when the run failed.
    pub fn failed_at(&self) -> Option<PipelineStage> {
        if self.is_success() || self.stages.len() < 2 {
            return None;
        }
        self.stages.get(self.stages.len() - 2).copied()
    }
}
