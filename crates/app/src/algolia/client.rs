//! Algolia search client for the recipe index.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use cookmate_core::Recipe;

use crate::config::AlgoliaConfig;
use crate::services::search::RecipeIndex;

use super::error::{AlgoliaError, ApiErrorResponse};
use super::types::{SearchRequest, SearchResponse};

const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Hits requested per query.
pub const HITS_PER_PAGE: u32 = 20;

/// Algolia search client.
#[derive(Clone)]
pub struct AlgoliaClient {
    inner: Arc<AlgoliaClientInner>,
}

struct AlgoliaClientInner {
    client: reqwest::Client,
    /// `None` when the configuration is incomplete.
    endpoint: Option<Url>,
    index_name: String,
}

impl AlgoliaClient {
    /// Create a new Algolia client.
    ///
    /// An incomplete configuration yields an unconfigured client rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &AlgoliaConfig) -> Result<Self, AlgoliaError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(app_id) = &config.app_id {
            headers.insert(
                APPLICATION_ID_HEADER,
                HeaderValue::from_str(app_id).map_err(|_| AlgoliaError::InvalidCredentials)?,
            );
        }
        if let Some(key) = &config.search_key {
            let mut value = HeaderValue::from_str(key.expose_secret())
                .map_err(|_| AlgoliaError::InvalidCredentials)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let index_name = config.index_name.clone().unwrap_or_default();
        let endpoint = config
            .is_configured()
            .then(|| config.base_url())
            .flatten()
            .and_then(|base| query_endpoint(base, &index_name));

        Ok(Self {
            inner: Arc::new(AlgoliaClientInner {
                client,
                endpoint,
                index_name,
            }),
        })
    }

    /// Whether application id, search key and index name are all present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.endpoint.is_some()
    }

    /// Run a full-text query and map the hits to recipes, in ranking order.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is unconfigured, the request fails,
    /// or the response cannot be parsed.
    #[instrument(skip(self), fields(index = %self.inner.index_name))]
    pub async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, AlgoliaError> {
        let endpoint = self
            .inner
            .endpoint
            .clone()
            .ok_or(AlgoliaError::NotConfigured)?;

        let request = SearchRequest {
            query: query.to_string(),
            hits_per_page: HITS_PER_PAGE,
        };

        let response = self
            .inner
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await?;

        let body = self.handle_response(response).await?;
        debug!(
            hits = body.hits.len(),
            nb_hits = body.nb_hits,
            processing_time_ms = body.processing_time_ms,
            "search complete"
        );
        Ok(body.hits.into_iter().map(|hit| hit.into_recipe()).collect())
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<SearchResponse, AlgoliaError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| AlgoliaError::Parse(format!("Failed to parse response: {e}")));
        }

        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AlgoliaError::Unauthorized(message));
        }
        Err(AlgoliaError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// `{base}/1/indexes/{index}/query`, with the index name percent-encoded
/// as a single path segment.
fn query_endpoint(mut base: Url, index_name: &str) -> Option<Url> {
    base.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["1", "indexes", index_name, "query"]);
    Some(base)
}

impl RecipeIndex for AlgoliaClient {
    fn is_configured(&self) -> bool {
        Self::is_configured(self)
    }

    async fn search(&self, query: &str) -> Result<Vec<Recipe>, AlgoliaError> {
        self.search_recipes(query).await
    }
}
