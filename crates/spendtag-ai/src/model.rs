//! Language-model category suggestion over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfig;
use crate::extract::extract_suggestion;
use crate::prompt::{system_prompt, user_prompt};
use crate::provider::{Credential, build_request};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Something that can propose a category for an expense.
///
/// Returns the raw suggestion text (at most a few words); callers map it onto
/// the label set with [`crate::Normalizer`].
#[async_trait]
pub trait CategorySuggester: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    async fn suggest(&self, title: &str, notes: &str) -> Result<String, ModelError>;
}

/// HTTP client for a configured text-generation provider.
pub struct HttpModelClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl HttpModelClient {
    /// Build a client whose every request is bounded by `config.timeout`.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ModelError::Network)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.config.timeout)
        } else {
            ModelError::Network(err)
        }
    }
}

#[async_trait]
impl CategorySuggester for HttpModelClient {
    fn name(&self) -> &str {
        self.config.provider.as_str()
    }

    async fn suggest(&self, title: &str, notes: &str) -> Result<String, ModelError> {
        let req = build_request(&self.config, system_prompt(), user_prompt(title, notes));

        debug!(url = %req.url, model = %self.config.model, "requesting category suggestion");
        let builder = self.client.post(&req.url).json(&req.body);
        let builder = match &req.credential {
            Credential::QueryKey(key) => builder.query(&[("key", key)]),
            Credential::Bearer(key) => builder.bearer_auth(key),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await.map_err(|e| self.transport_error(e))?;
        let body: Value = serde_json::from_str(&raw)?;
        let suggestion = extract_suggestion(&body, self.config.provider.text_pointer())
            .ok_or_else(|| ModelError::MalformedResponse("no text in response".to_string()))?;

        debug!(suggestion = %suggestion, "model suggested category");
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// What the stub server saw on its last request.
    #[derive(Default)]
    struct Seen {
        query: HashMap<String, String>,
        auth: Option<String>,
        body: Option<Value>,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        reply: String,
        delay: Duration,
        seen: Arc<Mutex<Seen>>,
    }

    async fn handle(
        State(stub): State<Stub>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        {
            let mut seen = stub.seen.lock().unwrap();
            seen.query = query;
            seen.auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            seen.body = Some(body);
        }
        tokio::time::sleep(stub.delay).await;
        (stub.status, stub.reply.clone())
    }

    /// Serve `reply` with `status` on an ephemeral port; returns the base URL.
    async fn serve(status: StatusCode, reply: &str, delay: Duration) -> (String, Arc<Mutex<Seen>>) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let stub = Stub {
            status,
            reply: reply.to_string(),
            delay,
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/v1beta/models/:model", post(handle))
            .route("/v1/chat/completions", post(handle))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn gemini(base_url: &str) -> HttpModelClient {
        HttpModelClient::new(ModelConfig::new(Provider::Gemini, "test-key").with_base_url(base_url))
            .unwrap()
    }

    #[tokio::test]
    async fn gemini_success_extracts_text() {
        let reply = r#"{"candidates":[{"content":{"parts":[{"text":"Groceries\n"}]}}]}"#;
        let (url, seen) = serve(StatusCode::OK, reply, Duration::ZERO).await;

        let suggestion = gemini(&url).suggest("Weekly shop", "veg\nbox").await.unwrap();
        assert_eq!(suggestion, "Groceries");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.query.get("key").map(String::as_str), Some("test-key"));
        let body = seen.body.as_ref().unwrap();
        assert_eq!(
            body.pointer("/contents/0/parts/0/text").and_then(Value::as_str),
            Some(r#"Title: "Weekly shop" Notes: "veg box" ->"#)
        );
        let system = body
            .pointer("/systemInstruction/parts/0/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(system.contains("electronics, grocery, treat"));
    }

    #[tokio::test]
    async fn openai_uses_bearer_and_chat_path() {
        let reply = r#"{"choices":[{"message":{"role":"assistant","content":"transit"}}]}"#;
        let (url, seen) = serve(StatusCode::OK, reply, Duration::ZERO).await;
        let client = HttpModelClient::new(
            ModelConfig::new(Provider::OpenAi, "sk-test").with_base_url(&url),
        )
        .unwrap();

        assert_eq!(client.suggest("Bus", "").await.unwrap(), "transit");
        assert_eq!(client.name(), "openai");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.auth.as_deref(), Some("Bearer sk-test"));
        assert!(seen.query.is_empty());
    }

    #[tokio::test]
    async fn unexpected_shape_is_scanned() {
        let reply = r#"{"result":{"output":[{"text":"health and wellness spending today"}]}}"#;
        let (url, _) = serve(StatusCode::OK, reply, Duration::ZERO).await;
        let suggestion = gemini(&url).suggest("Vitamins", "").await.unwrap();
        assert_eq!(suggestion, "health and wellness spending");
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let (url, _) = serve(StatusCode::TOO_MANY_REQUESTS, "slow down", Duration::ZERO).await;
        match gemini(&url).suggest("x", "").await {
            Err(ModelError::UpstreamStatus { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let (url, _) = serve(StatusCode::OK, "<html>oops</html>", Duration::ZERO).await;
        let err = gemini(&url).suggest("x", "").await.unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_text_is_malformed() {
        let (url, _) = serve(StatusCode::OK, r#"{"candidates":[]}"#, Duration::ZERO).await;
        let err = gemini(&url).suggest("x", "").await.unwrap_err();
        assert!(matches!(err, ModelError::MalformedResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let (url, _) = serve(StatusCode::OK, "{}", Duration::from_secs(5)).await;
        let client = HttpModelClient::new(
            ModelConfig::new(Provider::Gemini, "k")
                .with_base_url(&url)
                .with_timeout(Duration::from_millis(100)),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let err = client.suggest("x", "").await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gemini(&format!("http://{addr}"))
            .suggest("x", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Network(_)), "got {err:?}");
    }
}
