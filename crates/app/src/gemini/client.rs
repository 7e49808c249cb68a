//! Gemini API client for text generation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::GeminiConfig;
use crate::services::generation::RecipeGenerator;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};

const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature used for recipe generation.
pub const RECIPE_TEMPERATURE: f32 = 0.7;

/// Gemini API client.
///
/// Built without a key, the client reports itself as unconfigured and
/// every call fails with [`GeminiError::NotConfigured`].
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    configured: bool,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret())
                .map_err(|_| GeminiError::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.as_str().trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint,
                model: config.model.clone(),
                configured: config.api_key.is_some(),
            }),
        })
    }

    /// Whether an API key was supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.configured
    }

    /// Generate text for `prompt`, asking for a JSON reply.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured, the request fails, the API
    /// answers with an error, or the reply has no text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model, prompt_len = prompt.len()))]
    pub async fn generate_json(&self, prompt: &str) -> Result<String, GeminiError> {
        if !self.inner.configured {
            return Err(GeminiError::NotConfigured);
        }

        let request =
            GenerateContentRequest::from_prompt(prompt, GenerationConfig::json(RECIPE_TEMPERATURE));

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let body = self.handle_response(response).await?;
        let text = body
            .text()
            .ok_or_else(|| GeminiError::EmptyResponse(body.empty_reason()))?;
        debug!(response_len = text.len(), "generation complete");
        Ok(text)
    }

    /// Handle a response.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GeminiError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return GeminiError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return GeminiError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => GeminiError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                },
                Err(_) => GeminiError::Api {
                    status: status.to_string(),
                    message: body,
                },
            },
            Err(e) => GeminiError::Http(e),
        }
    }
}

impl RecipeGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        Self::is_configured(self)
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate_json(prompt).await
    }
}
