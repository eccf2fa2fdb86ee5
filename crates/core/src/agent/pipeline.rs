//! # Pipeline Stages
//!
//! Linear state machine for one agent run. Every stage before `Notifying`
//! is a potential early exit.

use serde::{Deserialize, Serialize};

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Resolving provider tokens from the vault
    ResolvingTokens,
    /// Listing upcoming calendar events
    FetchingMeetings,
    /// Picking the soonest meeting
    SelectingMeeting,
    /// Searching drive and wiki
    GatheringContext,
    /// Calling the summarization model
    GeneratingBriefing,
    /// Delivering over chat
    Notifying,
    /// Complete
    Complete,
    /// Stopped early because a required dependency was absent
    Aborted,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Aborted)
    }
}

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// No calendar token: the user never connected Google
    CalendarNotConnected,
    /// Calendar returned no upcoming events
    NoUpcomingMeetings,
    /// Neither drive nor wiki produced any context
    NoDocuments,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::CalendarNotConnected => "calendar_not_connected",
            AbortReason::NoUpcomingMeetings => "no_upcoming_meetings",
            AbortReason::NoDocuments => "no_documents",
        }
    }

    /// Human-readable explanation for logs
    pub fn describe(&self) -> &'static str {
        match self {
            AbortReason::CalendarNotConnected => {
                "User has not connected Google. Cannot get meetings."
            }
            AbortReason::NoUpcomingMeetings => "No upcoming meetings to process.",
            AbortReason::NoDocuments => "Found no relevant documents. Nothing to summarize.",
        }
    }
}

/// The pipeline state machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: PipelineStage,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: PipelineStage::ResolvingTokens,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::ResolvingTokens => PipelineStage::FetchingMeetings,
            PipelineStage::FetchingMeetings => PipelineStage::SelectingMeeting,
            PipelineStage::SelectingMeeting => PipelineStage::GatheringContext,
            PipelineStage::GatheringContext => PipelineStage::GeneratingBriefing,
            PipelineStage::GeneratingBriefing => PipelineStage::Notifying,
            PipelineStage::Notifying => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Aborted => PipelineStage::Aborted,
        };
    }

    /// Stop the run. A finished run stays finished.
    pub fn abort(&mut self) {
        if !self.stage.is_terminal() {
            self.stage = PipelineStage::Aborted;
        }
    }
}
