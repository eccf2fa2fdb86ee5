//! # HTTP API
//!
//! Routes, shared state, OpenAPI document and the embedded landing page.

pub mod agent;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Response, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use catalyst_core::agent::Coordinator;
use catalyst_core::auth::SessionValidator;
use catalyst_core::config::CatalystConfig;
use catalyst_core::CatalystError;
use rust_embed::RustEmbed;
use utoipa::OpenApi;

/// Embedded landing page assets
#[derive(RustEmbed)]
#[folder = "static"]
struct Assets;

/// Application state: components built once at startup
pub struct AppState {
    pub validator: SessionValidator,
    pub coordinator: Coordinator,
}

impl AppState {
    /// Build every component from one config, sharing one HTTP client
    pub fn from_config(config: &CatalystConfig) -> Result<Self, CatalystError> {
        let client = config.http_client()?;
        Ok(Self {
            validator: SessionValidator::new(config, client.clone()),
            coordinator: Coordinator::with_client(config, client),
        })
    }
}

pub type SharedState = Arc<AppState>;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalyst API",
        version = "1.0.0",
        description = "Meeting preparation agent: session validation and agent runs"
    ),
    paths(agent::validate_session, agent::trigger_agent),
    components(schemas(
        agent::ValidateSessionRequest,
        agent::SessionResponse,
        agent::TriggerAgentRequest,
        agent::TriggerAgentResponse,
        agent::ErrorResponse
    )),
    tags(
        (name = "session", description = "Session validation"),
        (name = "agent", description = "Agent runs")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/login", get(serve_index))
        .route("/validate-session", post(agent::validate_session))
        .route("/trigger-agent", post(agent::trigger_agent))
        .route("/openapi.json", get(serve_openapi))
        .fallback(get(serve_static))
        .with_state(state)
}

async fn serve_openapi() -> impl IntoResponse {
    match ApiDoc::openapi().to_json() {
        Ok(doc) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            doc,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn serve_index() -> Response<Body> {
    asset_response("index.html")
        .unwrap_or_else(|| plain(StatusCode::NOT_FOUND, "Not Found"))
}

async fn serve_static(uri: Uri) -> Response<Body> {
    let path = uri.path().trim_start_matches('/');
    asset_response(path).unwrap_or_else(|| plain(StatusCode::NOT_FOUND, "Not Found"))
}

fn asset_response(path: &str) -> Option<Response<Body>> {
    let file = Assets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref().to_string())],
            file.data.into_owned(),
        )
            .into_response(),
    )
}

fn plain(status: StatusCode, text: &'static str) -> Response<Body> {
    (status, text).into_response()
}
