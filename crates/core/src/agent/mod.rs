//! # Agent Orchestration
//!
//! Sequences the briefing pipeline for one user.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Tokens → Next Meeting → Drive (+ Notion) → Briefing → Slack DM (if connected)
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;

pub use coordinator::{Coordinator, RunOutcome, RunReport, RunSummary};
pub use events::{RunEvent, RunEventKind};
pub use pipeline::{AbortReason, Pipeline, PipelineStage};
