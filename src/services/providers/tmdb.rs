/// TMDB catalog provider
///
/// Uses the `/discover/movie` endpoint, which filters by genre, release date,
/// runtime and score in a single call. Authenticates with a v4 bearer token
/// when one is configured, otherwise with the v3 `api_key` query parameter.
use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{TmdbDiscoverResponse, TmdbMovie},
    services::{providers::CatalogProvider, query::CatalogQuery},
};

#[derive(Debug, Clone)]
enum Credentials {
    ApiKey(String),
    Bearer(String),
    None,
}

#[derive(Debug, Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_url: String,
    credentials: Credentials,
}

impl TmdbProvider {
    /// Creates a provider; the bearer token wins when both credentials are given
    pub fn new(
        api_key: Option<String>,
        bearer_token: Option<String>,
        api_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let credentials = match (bearer_token, api_key) {
            (Some(token), _) => Credentials::Bearer(token),
            (None, Some(key)) => Credentials::ApiKey(key),
            (None, None) => {
                tracing::warn!("No TMDB credentials configured, catalog requests will fail");
                Credentials::None
            }
        };

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie", self.api_url)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    #[instrument(skip(self, query), fields(provider = "tmdb"))]
    async fn discover(&self, query: &CatalogQuery) -> AppResult<Vec<TmdbMovie>> {
        let params = query.to_params();
        tracing::debug!(params = ?params, "Discover request");

        let mut request = self.http_client.get(self.discover_url()).query(&params);
        request = match &self.credentials {
            Credentials::Bearer(token) => request.bearer_auth(token),
            Credentials::ApiKey(key) => request.query(&[("api_key", key.as_str())]),
            Credentials::None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::upstream(format!("TMDB request timed out: {}", e))
            } else {
                AppError::upstream(format!("TMDB request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbDiscoverResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse TMDB response: {}", e)))?;

        tracing::info!(results = page.results.len(), "Discover completed");

        Ok(page.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
