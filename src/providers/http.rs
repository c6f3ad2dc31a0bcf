//! Shared HTTP client for upstream providers
//!
//! One attempt per call, an explicit per-request timeout, and a uniform
//! mapping of transport and HTTP failures into [`BridgeError`].

use crate::error::{BridgeError, BridgeResult};
use crate::logging::{log_debug, log_error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Upstream response bodies longer than this are truncated in errors.
const MAX_ERROR_BODY_CHARS: usize = 2_000;

/// Thin wrapper around `reqwest::Client` bound to one provider
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    display_name: &'static str,
}

impl UpstreamClient {
    /// Create a client that labels its errors with `display_name`
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] if the TLS backend cannot be
    /// initialized.
    pub fn new(display_name: &'static str) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("luxrig-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::configuration(format!(
                    "Failed to build HTTP client for {display_name}: {e}"
                ))
            })?;

        Ok(Self {
            client,
            display_name,
        })
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> BridgeResult<T> {
        let request = self.client.get(url).query(query).timeout(timeout);
        let response = self.send(request, url, timeout).await?;
        self.parse_success_response(response).await
    }

    /// POST a JSON body to `url` and decode the JSON reply
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
        timeout: Duration,
    ) -> BridgeResult<T> {
        let request = self
            .client
            .post(url)
            .query(query)
            .json(body)
            .timeout(timeout);
        let response = self.send(request, url, timeout).await?;
        self.parse_success_response(response).await
    }

    /// Execute a single HTTP request; non-2xx becomes [`BridgeError::Upstream`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> BridgeResult<reqwest::Response> {
        log_debug!(provider = self.display_name, url = %url, "Sending upstream request");

        // `without_url` keeps query-string credentials out of messages.
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            let message = if e.is_timeout() {
                format!(
                    "{} timed out after {}s at {url}",
                    self.display_name,
                    timeout.as_secs_f64()
                )
            } else {
                format!("{} is unreachable at {url}: {e}", self.display_name)
            };
            BridgeError::unavailable(self.display_name, message, Some(Box::new(e)))
        })?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        Ok(response)
    }

    /// Handle non-success HTTP responses
    async fn handle_error_response(&self, response: reqwest::Response) -> BridgeError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        BridgeError::upstream(self.display_name, status, truncate(&body))
    }

    /// Parse a successful HTTP response as JSON
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> BridgeResult<T> {
        let raw_body = response.text().await.map_err(|e| {
            log_error!(
                provider = self.display_name,
                error = %e,
                "Failed to read response body"
            );
            BridgeError::response_parsing(
                self.display_name,
                format!("failed to read response: {}", e.without_url()),
            )
        })?;

        serde_json::from_str(&raw_body).map_err(|e| {
            BridgeError::response_parsing(
                self.display_name,
                format!("{e} (body: {})", truncate(&raw_body)),
            )
        })
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}
