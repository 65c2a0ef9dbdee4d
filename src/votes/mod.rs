//! Where preference votes go once the harness has accepted them.

use crate::harness::{LabelAssignment, OptionLabel};
use crate::pipeline::PipelineKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    #[serde(alias = "first")]
    FirstOption,
    #[serde(alias = "second")]
    SecondOption,
    Tie,
}

impl VoteChoice {
    pub fn label(self) -> Option<OptionLabel> {
        match self {
            VoteChoice::FirstOption => Some(OptionLabel::First),
            VoteChoice::SecondOption => Some(OptionLabel::Second),
            VoteChoice::Tie => None,
        }
    }
}

/// Per-option figures kept alongside a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionStats {
    pub result_size: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub comparison_id: Uuid,
    pub prompt: String,
    pub assignment: LabelAssignment,
    pub choice: VoteChoice,
    pub first: OptionStats,
    pub second: OptionStats,
    pub recorded_at: DateTime<Utc>,
}

impl VoteRecord {
    /// The pipeline the voter preferred, `None` on a tie.
    pub fn unblind(&self) -> Option<PipelineKind> {
        self.choice.label().map(|label| self.assignment.kind_for(label))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoteSinkError {
    #[error("Failed to serialize vote: {0}")]
    Serialization(String),

    #[error("Failed to write vote to {path}: {message}")]
    Io { path: PathBuf, message: String },
}

#[async_trait]
pub trait VoteSink: Send + Sync {
    async fn record(&self, vote: &VoteRecord) -> Result<(), VoteSinkError>;
}

/// Appends one JSON object per line.
pub struct JsonLinesVoteSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesVoteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> VoteSinkError {
        VoteSinkError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl VoteSink for JsonLinesVoteSink {
    async fn record(&self, vote: &VoteRecord) -> Result<(), VoteSinkError> {
        let mut line =
            serde_json::to_string(vote).map_err(|e| VoteSinkError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Logs votes without storing them.
pub struct TracingVoteSink;

#[async_trait]
impl VoteSink for TracingVoteSink {
    async fn record(&self, vote: &VoteRecord) -> Result<(), VoteSinkError> {
        info!(
            comparison = %vote.comparison_id,
            choice = ?vote.choice,
            preferred = ?vote.unblind(),
            "Vote recorded"
        );
        Ok(())
    }
}
