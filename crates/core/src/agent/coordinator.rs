//! # Agent Coordinator
//!
//! Runs the briefing pipeline for one user: tokens, next meeting, context,
//! summary, delivery. Each step is attempted once, sequentially; optional
//! providers are skipped when not connected and required ones end the run.

use serde::Serialize;

use crate::briefing::BriefingGenerator;
use crate::calendar::MeetingFetcher;
use crate::config::CatalystConfig;
use crate::documents::{self, DocumentSource, DriveSearcher, NotionSearcher};
use crate::error::CatalystError;
use crate::models::{Briefing, Meeting, Provider};
use crate::notifier::{Delivery, SlackNotifier};

use super::events::{RunEvent, RunEventKind};
use super::pipeline::{AbortReason, Pipeline, PipelineStage};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every stage ran; the briefing may still be the sentinel
    Completed {
        meeting: Meeting,
        document_count: usize,
        briefing: Briefing,
        delivery: Delivery,
    },
    /// A required dependency was absent
    Aborted {
        stage: PipelineStage,
        reason: AbortReason,
    },
}

/// Result of one agent run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub login_id: String,
    pub outcome: RunOutcome,
    /// Decision points in the order they happened
    pub events: Vec<RunEvent>,
}

impl RunReport {
    /// Compact summary suitable for an HTTP response
    pub fn summary(&self) -> RunSummary {
        match &self.outcome {
            RunOutcome::Completed {
                meeting, delivery, ..
            } => RunSummary {
                outcome: "completed",
                reason: None,
                meeting: Some(meeting.title.clone()),
                delivered: Some(delivery.is_sent()),
            },
            RunOutcome::Aborted { reason, .. } => RunSummary {
                outcome: "aborted",
                reason: Some(reason.as_str()),
                meeting: None,
                delivered: None,
            },
        }
    }
}

/// Serializable view of a [`RunReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}

/// Tracks stage transitions and events for one run
struct RunTrace {
    pipeline: Pipeline,
    events: Vec<RunEvent>,
}

impl RunTrace {
    fn new() -> Self {
        Self {
            pipeline: Pipeline::new(),
            events: Vec::new(),
        }
    }

    fn record(&mut self, kind: RunEventKind, detail: Option<String>) {
        let event = RunEvent::new(kind, self.pipeline.stage);
        self.events.push(match detail {
            Some(detail) => event.with_detail(detail),
            None => event,
        });
    }

    fn abort(mut self, login_id: &str, reason: AbortReason) -> RunReport {
        let stage = self.pipeline.stage;
        tracing::info!(login_id, stage = ?stage, reason = reason.as_str(), "{}", reason.describe());
        self.record(RunEventKind::RunAborted, Some(reason.as_str().to_string()));
        self.pipeline.abort();
        RunReport {
            login_id: login_id.to_string(),
            outcome: RunOutcome::Aborted { stage, reason },
            events: self.events,
        }
    }
}

/// The agent coordinator
#[derive(Clone)]
pub struct Coordinator {
    broker: crate::auth::TokenBroker,
    meetings: MeetingFetcher,
    drive: DriveSearcher,
    notion: NotionSearcher,
    briefings: BriefingGenerator,
    notifier: SlackNotifier,
}

impl Coordinator {
    /// Create a coordinator with its own HTTP client
    pub fn new(config: &CatalystConfig) -> Result<Self, CatalystError> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    /// Create a coordinator sharing an existing HTTP client
    pub fn with_client(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            broker: crate::auth::TokenBroker::new(config, client.clone()),
            meetings: MeetingFetcher::new(config, client.clone()),
            drive: DriveSearcher::new(config, client.clone()),
            notion: NotionSearcher::new(config, client.clone()),
            briefings: BriefingGenerator::new(config, client.clone()),
            notifier: SlackNotifier::new(config, client),
        }
    }

    /// Run the agent for one user, to completion or early abort
    #[tracing::instrument(skip(self))]
    pub async fn run_catalyst_for_user(&self, login_id: &str) -> RunReport {
        tracing::info!("Running Catalyst agent");
        let mut trace = RunTrace::new();
        trace.record(RunEventKind::RunStarted, None);

        // 1. Tokens
        let tokens = self.broker.fetch(login_id).await;
        let connected = tokens
            .connected()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(connected = %connected, "Provider tokens resolved");
        trace.record(RunEventKind::TokensResolved, Some(connected));

        let Some(google) = tokens.get(Provider::Google) else {
            return trace.abort(login_id, AbortReason::CalendarNotConnected);
        };
        let google_token = google.access_token.as_str();

        // 2. Meetings
        trace.pipeline.advance();
        let meetings = self.meetings.upcoming_meetings(google_token).await;
        tracing::info!(count = meetings.len(), "Fetched upcoming meetings");

        // 3. Soonest meeting
        let Some(meeting) = meetings.into_iter().next() else {
            return trace.abort(login_id, AbortReason::NoUpcomingMeetings);
        };
        trace.pipeline.advance();
        tracing::info!(
            title = %meeting.title,
            attendees = meeting.attendees.len(),
            "Selected next meeting"
        );
        trace.record(RunEventKind::MeetingSelected, Some(meeting.title.clone()));

        // 4. Context
        trace.pipeline.advance();
        let query = meeting.search_query();
        let notion_token = tokens
            .get(Provider::Notion)
            .map(|r| r.access_token.as_str());
        if notion_token.is_none() {
            tracing::info!(
                "{} is not connected for this user",
                Provider::Notion.display_name()
            );
            trace.record(
                RunEventKind::ProviderSkipped,
                Some(Provider::Notion.as_str().to_string()),
            );
        }
        let sources: [(&dyn DocumentSource, Option<&str>); 2] = [
            (&self.drive, Some(google_token)),
            (&self.notion, notion_token),
        ];
        let context = documents::gather(&sources, query).await;
        trace.record(
            RunEventKind::ContextGathered,
            Some(format!("{} documents for '{}'", context.len(), query)),
        );
        if context.is_empty() {
            return trace.abort(login_id, AbortReason::NoDocuments);
        }

        // 5. Briefing
        trace.pipeline.advance();
        tracing::info!("Generating AI summary");
        let briefing = self
            .briefings
            .generate(&meeting.title, &meeting.attendees, &context)
            .await;
        tracing::info!(
            available = briefing.is_available(),
            briefing = %briefing,
            "Briefing generated"
        );
        trace.record(
            RunEventKind::BriefingGenerated,
            Some(if briefing.is_available() { "summary" } else { "unavailable" }.to_string()),
        );

        // 6. Delivery
        trace.pipeline.advance();
        let delivery = match tokens.get(Provider::Slack) {
            Some(slack) => {
                let delivery = self
                    .notifier
                    .send_direct_message(
                        &slack.access_token,
                        slack.provider_user_id.as_deref(),
                        briefing.as_text(),
                    )
                    .await;
                trace.record(
                    RunEventKind::NotificationAttempted,
                    Some(format!("{:?}", delivery)),
                );
                delivery
            }
            None => {
                tracing::info!(
                    "{} is not connected for this user",
                    Provider::Slack.display_name()
                );
                trace.record(
                    RunEventKind::ProviderSkipped,
                    Some(Provider::Slack.as_str().to_string()),
                );
                Delivery::Skipped("slack not connected".to_string())
            }
        };

        trace.pipeline.advance();
        trace.record(RunEventKind::RunCompleted, None);
        tracing::info!("Agent run complete");

        RunReport {
            login_id: login_id.to_string(),
            outcome: RunOutcome::Completed {
                meeting,
                document_count: context.len(),
                briefing,
                delivery,
            },
            events: trace.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Endpoints;
    use crate::models::BRIEFING_ERROR;

    const TOKEN_PATH: &str = "/v1/mgmt/user/provider/token";
    const EVENTS_PATH: &str = "/calendar/v3/calendars/primary/events";
    const FILES_PATH: &str = "/drive/v3/files";
    const MODEL_PATH: &str = "/models/sshleifer/distilbart-cnn-12-6";

    fn coordinator(server: &MockServer) -> Coordinator {
        let config = CatalystConfig::new("P123", "K456", "hf_key")
            .with_endpoints(Endpoints::all_at(&server.uri()));
        Coordinator::with_client(&config, reqwest::Client::new())
    }

    async fn mount_token(server: &MockServer, provider: &str, user_id: &str) {
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .and(query_param("provider", provider))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "provider": provider,
                "providerUserId": user_id,
                "accessToken": format!("{}-token", provider),
                "expiration": 1767225600,
                "scopes": []
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_not_connected(server: &MockServer, provider: &str) {
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .and(query_param("provider", provider))
            .respond_with(ResponseTemplate::new(404).set_body_string("token not found"))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_meetings(server: &MockServer, items: serde_json::Value, calls: u64) {
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .expect(calls)
            .mount(server)
            .await;
    }

    async fn expect_untouched(server: &MockServer, verb: &str, route: &str) {
        Mock::given(method(verb))
            .and(path_regex(route))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    fn budget_review() -> serde_json::Value {
        json!([
            {
                "summary": "Budget Review",
                "start": {"dateTime": "2026-10-20T15:00:00Z"},
                "attendees": [{"email": "ana@example.com"}, {"email": "raj@example.com"}]
            },
            {
                "summary": "Retro",
                "start": {"dateTime": "2026-10-21T15:00:00Z"}
            }
        ])
    }

    fn kinds(report: &RunReport) -> Vec<RunEventKind> {
        report.events.iter().map(|e| e.kind).collect()
    }

    /// Calendar + drive connected, no wiki or chat: briefing generated, delivery skipped
    #[tokio::test]
    async fn test_scenario_calendar_and_drive_only() {
        let server = MockServer::start().await;
        mount_token(&server, "google", "g-1").await;
        mount_not_connected(&server, "notion").await;
        mount_not_connected(&server, "slack").await;
        mount_meetings(&server, budget_review(), 1).await;

        Mock::given(method("GET"))
            .and(path(FILES_PATH))
            .and(query_param(
                "q",
                "name contains 'Budget' and mimeType != 'application/vnd.google-apps.folder'",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{"id": "doc1", "name": "Budget FY27", "mimeType": "application/vnd.google-apps.document"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/doc1/export"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Spend is up 4%"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"summary_text": "Review FY27 spend."}])),
            )
            .expect(1)
            .mount(&server)
            .await;
        expect_untouched(&server, "POST", "^/v1/search$").await;
        expect_untouched(&server, "POST", "^/slack/.*").await;

        let report = coordinator(&server)
            .run_catalyst_for_user("alice@example.com")
            .await;

        match &report.outcome {
            RunOutcome::Completed {
                meeting,
                document_count,
                briefing,
                delivery,
            } => {
                assert_eq!(meeting.title, "Budget Review");
                assert_eq!(meeting.attendees.len(), 2);
                assert_eq!(*document_count, 1);
                assert_eq!(briefing.as_text(), "Review FY27 spend.");
                assert!(matches!(delivery, Delivery::Skipped(_)));
            }
            other => panic!("expected completed run, got {:?}", other),
        }
        assert_eq!(
            kinds(&report),
            vec![
                RunEventKind::RunStarted,
                RunEventKind::TokensResolved,
                RunEventKind::MeetingSelected,
                RunEventKind::ProviderSkipped,
                RunEventKind::ContextGathered,
                RunEventKind::BriefingGenerated,
                RunEventKind::ProviderSkipped,
                RunEventKind::RunCompleted,
            ]
        );
        assert_eq!(report.summary().outcome, "completed");
        assert_eq!(report.summary().delivered, Some(false));
    }

    /// No calendar connection: abort before any meeting, document or model call
    #[tokio::test]
    async fn test_scenario_calendar_not_connected() {
        let server = MockServer::start().await;
        mount_not_connected(&server, "google").await;
        mount_token(&server, "notion", "n-1").await;
        mount_token(&server, "slack", "U1").await;
        expect_untouched(&server, "GET", "^/calendar/.*").await;
        expect_untouched(&server, "GET", "^/drive/.*").await;
        expect_untouched(&server, "POST", "^/v1/search$").await;
        expect_untouched(&server, "POST", "^/models/.*").await;
        expect_untouched(&server, "POST", "^/slack/.*").await;

        let report = coordinator(&server).run_catalyst_for_user("bob").await;

        assert_eq!(
            report.outcome,
            RunOutcome::Aborted {
                stage: PipelineStage::ResolvingTokens,
                reason: AbortReason::CalendarNotConnected,
            }
        );
        assert_eq!(report.summary().reason, Some("calendar_not_connected"));
    }

    /// Meetings exist but no store has anything: abort before summarization
    #[tokio::test]
    async fn test_scenario_no_documents() {
        let server = MockServer::start().await;
        mount_token(&server, "google", "g-1").await;
        mount_token(&server, "notion", "n-1").await;
        mount_token(&server, "slack", "U1").await;
        mount_meetings(&server, budget_review(), 1).await;

        Mock::given(method("GET"))
            .and(path(FILES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;
        expect_untouched(&server, "POST", "^/models/.*").await;
        expect_untouched(&server, "POST", "^/slack/.*").await;

        let report = coordinator(&server).run_catalyst_for_user("carol").await;

        assert_eq!(
            report.outcome,
            RunOutcome::Aborted {
                stage: PipelineStage::GatheringContext,
                reason: AbortReason::NoDocuments,
            }
        );
        assert_eq!(kinds(&report).last(), Some(&RunEventKind::RunAborted));
    }

    #[tokio::test]
    async fn test_no_meetings_stops_before_documents() {
        let server = MockServer::start().await;
        mount_token(&server, "google", "g-1").await;
        mount_not_connected(&server, "notion").await;
        mount_not_connected(&server, "slack").await;
        mount_meetings(&server, json!([]), 1).await;
        expect_untouched(&server, "GET", "^/drive/.*").await;
        expect_untouched(&server, "POST", "^/models/.*").await;

        let report = coordinator(&server).run_catalyst_for_user("dan").await;
        assert_eq!(
            report.outcome,
            RunOutcome::Aborted {
                stage: PipelineStage::FetchingMeetings,
                reason: AbortReason::NoUpcomingMeetings,
            }
        );
    }

    /// Everything connected: wiki titles follow drive content, DM goes to the vault's Slack user
    #[tokio::test]
    async fn test_full_run_delivers_over_slack() {
        let server = MockServer::start().await;
        mount_token(&server, "google", "g-1").await;
        mount_token(&server, "notion", "n-1").await;
        mount_token(&server, "slack", "U024BE7LH").await;
        mount_meetings(&server, budget_review(), 1).await;

        Mock::given(method("GET"))
            .and(path(FILES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{"id": "f1", "name": "Budget.txt", "mimeType": "text/plain"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f1"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_string("drive text"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"properties": {"title": {"title": [{"plain_text": "Budget page"}]}}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        // Summarization fails: the sentinel is what gets delivered
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/slack/chat.postMessage"))
            .and(wiremock::matchers::body_partial_json(json!({
                "channel": "U024BE7LH",
                "text": BRIEFING_ERROR
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let report = coordinator(&server).run_catalyst_for_user("erin").await;

        match report.outcome {
            RunOutcome::Completed {
                document_count,
                briefing,
                delivery,
                ..
            } => {
                assert_eq!(document_count, 2);
                assert_eq!(briefing, Briefing::Unavailable);
                assert_eq!(delivery, Delivery::Sent);
            }
            other => panic!("expected completed run, got {:?}", other),
        }
    }
}
