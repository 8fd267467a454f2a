//! HTTP implementation of the remote seams
//!
//! Available with the `http` feature (on by default).

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::Instrument;

use crate::{CountrySource, FormConfig, FormError, SubmissionEndpoint, ValidDraft};

/// `reqwest` client bound to the endpoints of a [`FormConfig`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    reference_url: String,
    submission_url: String,
}

impl HttpClient {
    /// Build a client for `config`'s endpoints and request timeout.
    pub fn new(config: &FormConfig) -> Result<Self, FormError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FormError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing `reqwest` client.
    pub fn with_client(client: Client, config: &FormConfig) -> Self {
        Self {
            client,
            reference_url: config.reference_url().to_string(),
            submission_url: config.submission_url().to_string(),
        }
    }

    async fn get_countries(&self) -> Result<Vec<serde_json::Value>, FormError> {
        let response = self
            .client
            .get(&self.reference_url)
            .send()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FormError::Decode(e.to_string()))?;
        match body {
            serde_json::Value::Array(records) => Ok(records),
            other => Err(FormError::Decode(format!(
                "expected an array of countries, got {}",
                json_kind(&other)
            ))),
        }
    }

    async fn post_request(&self, draft: &ValidDraft) -> Result<(), FormError> {
        let started = std::time::Instant::now();
        let response = self
            .client
            .post(&self.submission_url)
            .header(CONTENT_TYPE, "application/json")
            .json(draft)
            .send()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            elapsed = ?round_millis(started.elapsed()),
            "submission endpoint responded"
        );
        if status.is_success() {
            Ok(())
        } else {
            Err(FormError::Status(status.as_u16()))
        }
    }
}

impl CountrySource for HttpClient {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<serde_json::Value>, FormError>> {
        let span = tracing::debug_span!("fetch_countries", url = %self.reference_url);
        self.get_countries().instrument(span).boxed()
    }
}

impl SubmissionEndpoint for HttpClient {
    fn submit<'a>(&'a self, draft: &'a ValidDraft) -> BoxFuture<'a, Result<(), FormError>> {
        let span = tracing::debug_span!("post_request", url = %self.submission_url);
        self.post_request(draft).instrument(span).boxed()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn round_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis().try_into().unwrap_or(u64::MAX))
}
