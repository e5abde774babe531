use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use tracing::{debug, error};

use crate::config::{ApiKey, AppConfig};
use crate::errors::AppError;
use crate::models::{UpstreamMessage, UpstreamRequest};

const MESSAGES_PATH: &str = "/v1/messages";

/// Client for the provider's streaming Messages endpoint.
/// Holds only configuration; one request per relayed chat turn.
#[derive(Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<ApiKey>,
    model: String,
    max_tokens: u32,
    api_version: String,
}

impl AnthropicClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_version: config.api_version.clone(),
        }
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Opens a streaming completion. On success the returned response's body
    /// is the provider's event stream; a non-success status is turned into
    /// [`AppError::UpstreamRejected`] before any byte is relayed.
    pub async fn open_stream(
        &self,
        system: Option<&str>,
        messages: &[UpstreamMessage],
    ) -> Result<Response, AppError> {
        let api_key = self.api_key.as_ref().ok_or(AppError::MissingCredential)?;
        let body = UpstreamRequest {
            model: &self.model,
            messages,
            system,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let url = format!("{}{MESSAGES_PATH}", self.base_url);
        debug!(%url, model = %self.model, messages = messages.len(), "opening upstream stream");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request to {url} failed: {e}");
                AppError::UpstreamUnreachable(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            error!(status = status.as_u16(), "Upstream rejected the request");
            let status = axum::http::StatusCode::from_u16(status.as_u16())
                .unwrap_or(axum::http::StatusCode::BAD_GATEWAY);
            return Err(AppError::UpstreamRejected { status, body });
        }

        if response.content_length() == Some(0) {
            error!("Upstream answered with an empty body");
            return Err(AppError::StreamUnavailable);
        }

        Ok(response)
    }
}
