//! # Agent API
//!
//! Session validation and the agent trigger.
//!
//! `/trigger-agent` runs one full agent pass (soonest meeting only) before
//! responding. Early aborts such as "calendar not connected" are reported in
//! the body, not as HTTP errors.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SharedState;

/// Request to validate a session token
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateSessionRequest {
    pub token: Option<String>,
}

/// Validated session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub status: String,
    /// Stable user id (`sub` claim)
    pub user: String,
}

/// Request to run the agent for a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerAgentRequest {
    #[serde(rename = "loginId")]
    pub login_id: Option<String>,
}

/// Result of an agent run
#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerAgentResponse {
    pub status: String,
    /// "completed" or "aborted"
    pub outcome: String,
    /// Abort reason, when aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Title of the briefed meeting, when completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<String>,
    /// Whether the briefing reached Slack, when completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Validate a session token and return its user id
#[utoipa::path(
    post,
    path = "/validate-session",
    tag = "session",
    request_body = ValidateSessionRequest,
    responses(
        (status = 200, description = "Session is valid", body = SessionResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    )
)]
pub async fn validate_session(
    State(state): State<SharedState>,
    payload: Result<Json<ValidateSessionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let token = req.token.unwrap_or_default();
    if token.trim().is_empty() {
        return error(StatusCode::UNAUTHORIZED, "Session token is missing");
    }

    match state.validator.validate(&token).await {
        Ok(identity) => {
            tracing::info!(user_id = %identity.user_id, "Validated user");
            Json(SessionResponse {
                status: "success".to_string(),
                user: identity.user_id,
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session validation failed");
            error(StatusCode::UNAUTHORIZED, "Invalid session")
        }
    }
}

/// Run the agent for a user and report how the run ended
#[utoipa::path(
    post,
    path = "/trigger-agent",
    tag = "agent",
    request_body = TriggerAgentRequest,
    responses(
        (status = 200, description = "Agent run finished (completed or aborted)", body = TriggerAgentResponse),
        (status = 400, description = "loginId missing or body malformed", body = ErrorResponse)
    )
)]
pub async fn trigger_agent(
    State(state): State<SharedState>,
    payload: Result<Json<TriggerAgentRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let login_id = match req.login_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return error(StatusCode::BAD_REQUEST, "loginId is required"),
    };

    tracing::info!(login_id = %login_id, "Trigger agent called");
    let report = state.coordinator.run_catalyst_for_user(&login_id).await;
    let summary = report.summary();

    Json(TriggerAgentResponse {
        status: format!("Agent run started for {}", login_id),
        outcome: summary.outcome.to_string(),
        reason: summary.reason.map(str::to_string),
        meeting: summary.meeting,
        delivered: summary.delivered,
    })
    .into_response()
}
