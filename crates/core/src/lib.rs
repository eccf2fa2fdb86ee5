//! # Catalyst Core
//!
//! The "Brain" of the Catalyst meeting-preparation agent: vendor clients,
//! typed records, and the pipeline that turns a user's next meeting into a
//! briefing.
//!
//! ## Architecture
//!
//! - `config` - Process-wide configuration, built once and injected
//! - `auth/` - Session validation and provider token vault
//! - `calendar` - Next meetings from the user's calendar
//! - `documents/` - Drive and Notion context search
//! - `briefing` - Prompt building and hosted summarization
//! - `notifier` - Slack direct-message delivery
//! - `agent/` - Run orchestration and pipeline state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalyst_core::{agent::Coordinator, config::CatalystConfig};
//!
//! let config = CatalystConfig::from_env()?;
//! let coordinator = Coordinator::new(&config)?;
//! let report = coordinator.run_catalyst_for_user("alice@example.com").await;
//! ```

pub mod agent;
pub mod auth;
pub mod briefing;
pub mod calendar;
pub mod config;
pub mod documents;
pub mod error;
pub mod models;
pub mod notifier;

pub use error::CatalystError;
