//! # Identity Provider
//!
//! Session validation and the per-user token vault, both served by the
//! identity provider's REST API.

pub mod session;
pub mod token_broker;

pub use session::SessionValidator;
pub use token_broker::TokenBroker;

const SERVICE: &str = "Descope";
