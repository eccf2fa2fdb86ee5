//! # Run Events
//!
//! Decision points of an agent run, recorded alongside the tracing output so
//! callers (and tests) can see which branch was taken without scraping logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pipeline::PipelineStage;

/// Kind of run event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// Run started
    RunStarted,
    /// Provider tokens resolved (detail lists the connected providers)
    TokensResolved,
    /// Optional provider absent, its step was skipped
    ProviderSkipped,
    /// Meeting chosen for the briefing
    MeetingSelected,
    /// Context gathered from document stores
    ContextGathered,
    /// Briefing produced (possibly the sentinel)
    BriefingGenerated,
    /// Chat delivery attempted
    NotificationAttempted,
    /// Run stopped early
    RunAborted,
    /// Run finished
    RunCompleted,
}

/// An event in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: RunEventKind,
    /// Stage the pipeline was in
    pub stage: PipelineStage,
    /// Free-form detail
    #[serde(default)]
    pub detail: Option<String>,
}

impl RunEvent {
    /// Create a new event
    pub fn new(kind: RunEventKind, stage: PipelineStage) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            stage,
            detail: None,
        }
    }

    /// Add detail to the event
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
