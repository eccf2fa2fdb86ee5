//! # Notifier
//!
//! Delivers a briefing as a Slack direct message. Slack reports failures in
//! the body (`ok: false`) as well as through HTTP status, so both are checked.

use serde::{Deserialize, Serialize};

use crate::config::CatalystConfig;
use crate::error::{read_json, CatalystError};

const SERVICE: &str = "Slack";

/// What happened to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    /// No call was made
    Skipped(String),
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    unfurl_links: bool,
    unfurl_media: bool,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    #[serde(default)]
    ok: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl SlackNotifier {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.slack.clone(),
        }
    }

    /// Post `text` to the DM channel of `user_id`.
    ///
    /// A missing or blank destination short-circuits without calling Slack.
    pub async fn send_direct_message(
        &self,
        access_token: &str,
        user_id: Option<&str>,
        text: &str,
    ) -> Delivery {
        let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
            tracing::warn!("Slack user id is missing, cannot send DM");
            return Delivery::Skipped("missing destination user id".to_string());
        };

        match self.post_message(access_token, user_id, text).await {
            Ok(()) => {
                tracing::info!(user_id, "Slack message sent");
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Error sending Slack message");
                Delivery::Failed(e.to_string())
            }
        }
    }

    async fn post_message(
        &self,
        access_token: &str,
        channel: &str,
        text: &str,
    ) -> Result<(), CatalystError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&PostMessage {
                channel,
                text,
                unfurl_links: false,
                unfurl_media: false,
            })
            .send()
            .await?;

        let status = response.status();
        let body: SlackResponse = read_json(SERVICE, response).await?;
        if body.ok {
            Ok(())
        } else {
            Err(CatalystError::Vendor {
                service: SERVICE,
                error: body
                    .error
                    .unwrap_or_else(|| format!("unknown_error (HTTP {})", status.as_u16())),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Endpoints;

    fn notifier(server: &MockServer) -> SlackNotifier {
        let config =
            CatalystConfig::new("P", "K", "hf").with_endpoints(Endpoints::all_at(&server.uri()));
        SlackNotifier::new(&config, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_sends_dm_without_unfurling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slack/chat.postMessage"))
            .and(header("Authorization", "Bearer xoxp-1"))
            .and(body_json(json!({
                "channel": "U024BE7LH",
                "text": "Briefing",
                "unfurl_links": false,
                "unfurl_media": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let delivery = notifier(&server)
            .send_direct_message("xoxp-1", Some("U024BE7LH"), "Briefing")
            .await;
        assert_eq!(delivery, Delivery::Sent);
    }

    #[tokio::test]
    async fn test_ok_false_is_failure_despite_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slack/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "channel_not_found"})),
            )
            .mount(&server)
            .await;

        let delivery = notifier(&server)
            .send_direct_message("xoxp-1", Some("U1"), "hi")
            .await;
        assert!(matches!(delivery, Delivery::Failed(ref e) if e.contains("channel_not_found")));
    }

    #[tokio::test]
    async fn test_missing_user_id_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = notifier(&server);
        assert!(matches!(
            notifier.send_direct_message("xoxp-1", None, "hi").await,
            Delivery::Skipped(_)
        ));
        assert!(matches!(
            notifier.send_direct_message("xoxp-1", Some(""), "hi").await,
            Delivery::Skipped(_)
        ));
    }
}
