//! The authenticated exchange with the upstream patent service.

use std::sync::RwLock;
use std::time::Duration;

use partsight_core::{ErrorKind, ScreenerConfig};
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::AuthVariant;
use crate::response;

/// Typed failures at the client seam.
///
/// Transport errors never escape raw: every failure path maps to one of
/// these discriminants, which callers rely on for user-facing messaging
/// and retry policy.
#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("client configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("all authentication variants failed; last error: {0}")]
    Authentication(String),
    #[error("upstream request failed: {0}")]
    Api(String),
    #[error("unparseable upstream response: {0}")]
    ResponseFormat(String),
    #[error("failed to process upstream response: {0}")]
    Processing(String),
}

impl ScreenerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScreenerError::Configuration(_) => ErrorKind::Configuration,
            ScreenerError::Validation(_) => ErrorKind::Validation,
            ScreenerError::Authentication(_) => ErrorKind::Authentication,
            ScreenerError::Api(_) => ErrorKind::ApiError,
            ScreenerError::ResponseFormat(_) => ErrorKind::ResponseFormat,
            ScreenerError::Processing(_) => ErrorKind::Processing,
        }
    }
}

const MAX_TITLE_CHARS: usize = 200;
const MAX_SUMMARY_CHARS: usize = 2000;

/// Client for the upstream patent-screening data API.
///
/// Remembers which [`AuthVariant`] the upstream last accepted so that
/// follow-up calls skip the probe.
pub struct ScreenerClient {
    http: reqwest::Client,
    config: ScreenerConfig,
    selected: RwLock<Option<AuthVariant>>,
}

impl ScreenerClient {
    /// Build a client from the given configuration.
    ///
    /// Every request is bounded by `config.timeout_seconds`.
    pub fn new(config: ScreenerConfig) -> Result<Self, ScreenerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| {
                ScreenerError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            config,
            selected: RwLock::new(None),
        })
    }

    /// Submit an analysis query, probing auth variants in order.
    ///
    /// Returns the session token (if the upstream went asynchronous) and
    /// the raw response body. Input limits are enforced before any
    /// network I/O; `rows` is clamped to `[1, max_rows]`.
    pub async fn submit_query(
        &self,
        title: &str,
        summary: &str,
        reference: &str,
        rows: Option<u32>,
    ) -> Result<(Option<String>, Value), ScreenerError> {
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ScreenerError::Validation(format!(
                "title too long (max {MAX_TITLE_CHARS} characters)"
            )));
        }
        if summary.chars().count() > MAX_SUMMARY_CHARS {
            return Err(ScreenerError::Validation(format!(
                "summary too long (max {MAX_SUMMARY_CHARS} characters)"
            )));
        }
        let rows = rows
            .unwrap_or(self.config.default_rows)
            .clamp(1, self.config.max_rows);

        let fields: Vec<(&'static str, String)> = vec![
            ("username", self.config.username.clone()),
            ("reference", reference.to_string()),
            ("title", title.to_string()),
            ("summary", summary.to_string()),
            ("rows", rows.to_string()),
        ];

        let mut last_error = String::from("no variants attempted");

        for variant in AuthVariant::ALL {
            info!(variant = variant.label(), "probing upstream auth variant");
            let send = self
                .send_with_retry(|| {
                    variant.request(
                        &self.http,
                        Method::POST,
                        &self.config.data_api_url,
                        &fields,
                        &self.config.data_key,
                    )
                })
                .await;

            let response = match send {
                Ok(response) => response,
                Err(err) => {
                    warn!(variant = variant.label(), %err, "transport failure");
                    last_error = format!("transport failure ({}): {err}", variant.label());
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(variant = variant.label(), status = status.as_u16(), "variant rejected");
                last_error = if status.as_u16() == 401 {
                    format!("authentication failed ({})", variant.label())
                } else {
                    format!(
                        "HTTP {} ({}): {}",
                        status.as_u16(),
                        variant.label(),
                        truncate(&body, 200)
                    )
                };
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let json: Value = match serde_json::from_str(&body) {
                Ok(json) => json,
                Err(err) => {
                    warn!(variant = variant.label(), %err, "invalid JSON body");
                    last_error = format!("invalid JSON response ({})", variant.label());
                    continue;
                }
            };

            if let Some(token) = response::extract_token(&json) {
                info!(variant = variant.label(), "session token received");
                self.remember(variant);
                return Ok((Some(token), json));
            }
            if response::has_result_data(&json) {
                info!(variant = variant.label(), "immediate results received");
                self.remember(variant);
                return Ok((None, json));
            }

            last_error = format!("no session token or results ({})", variant.label());
        }

        Err(ScreenerError::Authentication(last_error))
    }

    /// Retrieve results for a session token, reusing the auth variant
    /// that won the submission probe. Never re-probes.
    pub async fn get_results(
        &self,
        session_token: &str,
        include_family: bool,
    ) -> Result<Value, ScreenerError> {
        let variant = self
            .selected
            .read()
            .expect("auth variant lock poisoned")
            .unwrap_or(AuthVariant::RawKey);

        let fields: Vec<(&'static str, String)> = vec![
            ("token", session_token.to_string()),
            ("family", if include_family { "true" } else { "false" }.to_string()),
        ];

        let response = self
            .send_with_retry(|| {
                variant.request(
                    &self.http,
                    Method::GET,
                    &self.config.data_api_url,
                    &fields,
                    &self.config.data_key,
                )
            })
            .await
            .map_err(|err| ScreenerError::Api(format!("results request failed: {err}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ScreenerError::Api(format!(
                "results request failed with status {}: {}",
                status.as_u16(),
                truncate(&body, 200)
            )));
        }

        serde_json::from_str(&body).map_err(|_| {
            ScreenerError::ResponseFormat("invalid JSON response when retrieving results".into())
        })
    }

    fn remember(&self, variant: AuthVariant) {
        *self.selected.write().expect("auth variant lock poisoned") = Some(variant);
    }

    /// Send a request, retrying transport-level failures up to the
    /// configured ceiling. HTTP error statuses are not transport failures
    /// and are returned to the caller for per-variant handling.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut attempt = 1u32;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.config.max_retries => {
                    warn!(attempt, %err, "upstream request failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
