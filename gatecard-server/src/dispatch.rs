//! Single-attempt delivery of cards to a Feishu bot webhook.

use std::fmt;
use std::time::Duration;

use gatecard_core::NotificationCard;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{RelayConfig, WEBHOOK_ENV};

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No webhook is configured; nothing was sent.
    Skipped,
    /// Feishu accepted the card.
    Delivered(u16),
    /// Feishu answered with an error status or error code.
    Rejected {
        /// HTTP status of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The request did not complete (connect error, timeout).
    Failed(String),
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "{WEBHOOK_ENV} is not set; skipping card delivery"),
            Self::Delivered(status) => write!(f, "feishu card delivered ({status})"),
            Self::Rejected { status, body } => write!(f, "feishu rejected card ({status}): {body}"),
            Self::Failed(message) => write!(f, "feishu card delivery failed: {message}"),
        }
    }
}

/// Feishu bot reply; `code` is non-zero on failure even with HTTP 200.
#[derive(Debug, Deserialize)]
struct BotReply {
    code: Option<i64>,
}

/// Posts cards to the configured webhook, once, with a bounded timeout.
#[derive(Debug, Clone)]
pub struct CardDispatcher {
    webhook_url: Option<String>,
    client: Client,
}

impl CardDispatcher {
    /// Build a dispatcher for an optional webhook.
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }

    /// Build a dispatcher from relay configuration.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_config(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.webhook_url.clone(), config.timeout)
    }

    /// Whether a destination is configured.
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Send the card. Failures are logged and reported, never raised.
    pub async fn dispatch(&self, card: &NotificationCard) -> DispatchOutcome {
        let outcome = self.send(card).await;
        match &outcome {
            DispatchOutcome::Delivered(_) => log::info!("{outcome}"),
            _ => log::error!("{outcome}"),
        }
        outcome
    }

    async fn send(&self, card: &NotificationCard) -> DispatchOutcome {
        let Some(url) = self.webhook_url.as_deref() else {
            return DispatchOutcome::Skipped;
        };

        let response = match self.client.post(url).json(card).send().await {
            Ok(response) => response,
            Err(err) => return DispatchOutcome::Failed(err.to_string()),
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let error_code = serde_json::from_str::<BotReply>(&body)
            .ok()
            .and_then(|reply| reply.code)
            .filter(|code| *code != 0);

        if !(200..300).contains(&status) || error_code.is_some() {
            return DispatchOutcome::Rejected { status, body };
        }
        DispatchOutcome::Delivered(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecard_core::{AnalysisReport, build_card};
    use httpmock::Method::POST;
    use httpmock::MockServer;

    fn sample_card() -> NotificationCard {
        let report: AnalysisReport = serde_json::from_value(serde_json::json!({
            "project": {"name": "demo"},
            "branch": {"name": "7", "url": "https://sonar.example.com/pr/7"},
            "qualityGate": {"status": "ERROR", "conditions": []}
        }))
        .expect("report");
        build_card(&report).expect("card")
    }

    fn dispatcher(url: Option<String>) -> CardDispatcher {
        CardDispatcher::new(url, Duration::from_secs(5)).expect("dispatcher")
    }

    #[actix_web::test]
    async fn posts_card_json_to_webhook() {
        let card = sample_card();
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/open-apis/bot/v2/hook/abc")
                    .header("content-type", "application/json")
                    .json_body(serde_json::to_value(&card).expect("card json"));
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"code":0,"msg":"success","data":{}}"#);
            })
            .await;

        let outcome = dispatcher(Some(server.url("/open-apis/bot/v2/hook/abc")))
            .dispatch(&card)
            .await;

        hook.assert_async().await;
        assert_eq!(outcome, DispatchOutcome::Delivered(200));
    }

    #[actix_web::test]
    async fn reports_http_errors_with_body() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(400).body("bad card");
            })
            .await;

        let outcome = dispatcher(Some(server.url("/hook")))
            .dispatch(&sample_card())
            .await;

        hook.assert_async().await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected {
                status: 400,
                body: "bad card".to_string()
            }
        );
    }

    #[actix_web::test]
    async fn reports_feishu_error_codes() {
        let server = MockServer::start_async().await;
        let reply = r#"{"code":19024,"msg":"Key Words Not Found"}"#;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(reply);
            })
            .await;

        let outcome = dispatcher(Some(server.url("/hook")))
            .dispatch(&sample_card())
            .await;

        match outcome {
            DispatchOutcome::Rejected { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("19024"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn times_out_slow_webhooks() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/slow");
                then.status(200).delay(Duration::from_millis(500));
            })
            .await;

        let dispatcher = CardDispatcher::new(
            Some(server.url("/slow")),
            Duration::from_millis(50),
        )
        .expect("dispatcher");
        let outcome = dispatcher.dispatch(&sample_card()).await;

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    }

    #[test]
    fn outcomes_describe_themselves() {
        assert!(DispatchOutcome::Skipped.to_string().contains("FEISHU_WEBHOOK"));
        assert_eq!(
            DispatchOutcome::Rejected {
                status: 400,
                body: "bad".to_string()
            }
            .to_string(),
            "feishu rejected card (400): bad"
        );
    }

    #[actix_web::test]
    async fn skips_without_webhook() {
        let dispatcher = dispatcher(None);
        assert!(!dispatcher.is_configured());
        assert_eq!(
            dispatcher.dispatch(&sample_card()).await,
            DispatchOutcome::Skipped
        );
    }

    #[actix_web::test]
    async fn unreachable_webhook_is_not_fatal() {
        let outcome = dispatcher(Some("http://127.0.0.1:9/hook".to_string()))
            .dispatch(&sample_card())
            .await;
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    }
}
