use super::labels::{LabelAssignment, OptionLabel};
use crate::pipeline::{Orchestrator, PipelineKind, PipelineRun};
use crate::votes::{OptionStats, VoteChoice, VoteRecord, VoteSink, VoteSinkError};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    #[error("Unknown comparison {0}")]
    UnknownComparison(Uuid),

    #[error("Comparison {0} already has a vote")]
    AlreadyVoted(Uuid),

    #[error("Comparison {0} can not be voted on")]
    VoteNotAllowed(Uuid),

    #[error(transparent)]
    Sink(#[from] VoteSinkError),
}

/// One option as the voter sees it: a label and track ids, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedOption {
    pub label: OptionLabel,
    pub track_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Complete,
    /// One option failed and is not shown.
    Degraded { failed: OptionLabel, reason: String },
    /// Both options failed; each reason is kept under its blind label.
    TotalFailure {
        first_reason: String,
        second_reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub id: Uuid,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<PresentedOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<PresentedOption>,
    pub outcome: ComparisonOutcome,
}

impl Comparison {
    pub fn accepts_votes(&self) -> bool {
        self.outcome == ComparisonOutcome::Complete
    }
}

struct PendingComparison {
    prompt: String,
    assignment: LabelAssignment,
    first: OptionStats,
    second: OptionStats,
    votable: bool,
    voted: bool,
}

/// Comparisons waiting for a vote, oldest evicted first.
struct PendingComparisons {
    by_id: HashMap<Uuid, PendingComparison>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl PendingComparisons {
    fn new(capacity: usize) -> Self {
        Self {
            by_id: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, id: Uuid, pending: PendingComparison) {
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Evicting comparison {} awaiting a vote", oldest);
                self.by_id.remove(&oldest);
            }
        }
        self.order.push_back(id);
        self.by_id.insert(id, pending);
    }
}

fn stats(run: &PipelineRun) -> OptionStats {
    OptionStats {
        result_size: run.results.len(),
        elapsed_ms: run.elapsed.as_millis() as u64,
    }
}

fn present(label: OptionLabel, run: &PipelineRun) -> Option<PresentedOption> {
    run.is_success().then(|| PresentedOption {
        label,
        track_ids: run.results.iter().map(|t| t.track_id.clone()).collect(),
    })
}

fn failure_reason(run: &PipelineRun) -> String {
    run.error
        .as_ref()
        .map(|e| e.user_message().to_string())
        .unwrap_or_default()
}

/// Runs both pipelines on one prompt and collects a blind preference vote.
pub struct ComparisonHarness {
    external: Orchestrator,
    local: Orchestrator,
    sink: Arc<dyn VoteSink>,
    pending: Mutex<PendingComparisons>,
}

impl ComparisonHarness {
    pub fn new(
        external: Orchestrator,
        local: Orchestrator,
        sink: Arc<dyn VoteSink>,
        max_pending_comparisons: usize,
    ) -> Self {
        Self {
            external,
            local,
            sink,
            pending: Mutex::new(PendingComparisons::new(max_pending_comparisons)),
        }
    }

    /// Runs both pipelines concurrently, external first in the tuple.
    pub async fn run_both(&self, prompt: &str) -> (PipelineRun, PipelineRun) {
        tokio::join!(self.external.run(prompt), self.local.run(prompt))
    }

    pub async fn compare(&self, prompt: &str) -> Comparison {
        self.compare_with_assignment(prompt, LabelAssignment::random())
            .await
    }

    pub async fn compare_with_seed(&self, prompt: &str, seed: u64) -> Comparison {
        self.compare_with_assignment(prompt, LabelAssignment::from_seed(seed))
            .await
    }

    async fn compare_with_assignment(&self, prompt: &str, assignment: LabelAssignment) -> Comparison {
        let (external_run, local_run) = self.run_both(prompt).await;
        let (first_run, second_run) = match assignment.first {
            PipelineKind::External => (external_run, local_run),
            PipelineKind::Local => (local_run, external_run),
        };

        let first = present(OptionLabel::First, &first_run);
        let second = present(OptionLabel::Second, &second_run);
        let outcome = match (&first, &second) {
            (Some(_), Some(_)) => ComparisonOutcome::Complete,
            (None, Some(_)) => ComparisonOutcome::Degraded {
                failed: OptionLabel::First,
                reason: failure_reason(&first_run),
            },
            (Some(_), None) => ComparisonOutcome::Degraded {
                failed: OptionLabel::Second,
                reason: failure_reason(&second_run),
            },
            (None, None) => ComparisonOutcome::TotalFailure {
                first_reason: failure_reason(&first_run),
                second_reason: failure_reason(&second_run),
            },
        };

        let id = Uuid::new_v4();
        info!(
            comparison = %id,
            outcome = ?outcome,
            "Comparison ready"
        );

        let pending = PendingComparison {
            prompt: prompt.to_string(),
            assignment,
            first: stats(&first_run),
            second: stats(&second_run),
            votable: outcome == ComparisonOutcome::Complete,
            voted: false,
        };
        self.lock_pending().insert(id, pending);

        Comparison {
            id,
            prompt: prompt.to_string(),
            first,
            second,
            outcome,
        }
    }

    /// Accepts one vote per complete comparison and hands it to the sink.
    ///
    /// A sink failure leaves the comparison open for another attempt.
    pub async fn record_vote(&self, id: Uuid, choice: VoteChoice) -> Result<VoteRecord, HarnessError> {
        let record = {
            let mut pending = self.lock_pending();
            let entry = pending
                .by_id
                .get_mut(&id)
                .ok_or(HarnessError::UnknownComparison(id))?;
            if entry.voted {
                return Err(HarnessError::AlreadyVoted(id));
            }
            if !entry.votable {
                return Err(HarnessError::VoteNotAllowed(id));
            }
            entry.voted = true;

            VoteRecord {
                comparison_id: id,
                prompt: entry.prompt.clone(),
                assignment: entry.assignment,
                choice,
                first: entry.first,
                second: entry.second,
                recorded_at: Utc::now(),
            }
        };

        if let Err(err) = self.sink.record(&record).await {
            warn!("Could not store vote for {}: {}", id, err);
            if let Some(entry) = self.lock_pending().by_id.get_mut(&id) {
                entry.voted = false;
            }
            return Err(err.into());
        }

        info!(comparison = %id, choice = ?choice, "Vote accepted");
        Ok(record)
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().by_id.len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, PendingComparisons> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
