use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetail, MovieSummary},
};

/// Source of movie metadata for the add flow.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// First page of title matches, unfiltered.
    async fn search(&self, query: &str) -> AppResult<Vec<MovieSummary>>;

    async fn fetch(&self, id: i64) -> AppResult<MovieDetail>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, movie database requests will be rejected");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, api_key, base_url, limiter }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        self.limiter.until_ready().await;
        tracing::debug!(query = %query, "searching movie database");

        let resp: SearchResponse = self
            .client
            .get(self.url("search/movie"))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(query = %query, results = resp.results.len(), "search finished");
        Ok(resp.results)
    }

    async fn fetch(&self, id: i64) -> AppResult<MovieDetail> {
        self.limiter.until_ready().await;
        tracing::debug!(tmdb_id = id, "fetching movie details");

        let resp = self
            .client
            .get(self.url(&format!("movie/{id}")))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("movie database entry {id}")));
        }

        Ok(resp.error_for_status()?.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<MovieSummary>,
}
