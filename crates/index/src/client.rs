//! REST client for the search engine.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::hits::{Hit, HitSet};
use crate::query::SearchError;

/// Search engine connection settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the engine, e.g. `http://localhost:9200`.
    pub base_url: String,
}

impl SearchConfig {
    /// Load from the environment.
    ///
    /// | Env Var      | Default                 |
    /// |--------------|-------------------------|
    /// | `SEARCH_URL` | `http://localhost:9200` |
    pub fn from_env() -> Self {
        let base_url = std::env::var("SEARCH_URL")
            .unwrap_or_else(|_| "http://localhost:9200".into());
        SearchConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchResponseHits,
}

#[derive(Debug, Deserialize)]
struct SearchResponseHits {
    hits: Vec<Hit>,
}

/// Client for the engine's document and search endpoints.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Self {
        SearchClient {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    /// Create or overwrite a document in the index.
    pub async fn put_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SearchError> {
        let url = format!("{}/{index}/_doc/{id}", self.base_url);
        let response = self.http.put(&url).json(body).send().await?;
        Self::check(response).await
    }

    /// Apply a partial update to a document in the index.
    pub async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SearchError> {
        let url = format!("{}/{index}/_update/{id}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "doc": body }))
            .send()
            .await?;
        Self::check(response).await
    }

    /// Remove a document from the index.
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
        let url = format!("{}/{index}/_doc/{id}", self.base_url);
        let response = self.http.delete(&url).send().await?;
        // The engine answers 404 for an id that was never indexed; removal
        // of an absent document is not an error for us.
        if response.status().as_u16() == 404 {
            return Ok(());
        }
        Self::check(response).await
    }

    /// Run a query and collect the hits.
    pub async fn search(&self, index: &str, query: &Value) -> Result<HitSet, SearchError> {
        let url = format!("{}/{index}/_search", self.base_url);
        let response = self.http.post(&url).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Engine {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(HitSet::new(parsed.hits.hits))
    }

    async fn check(response: reqwest::Response) -> Result<(), SearchError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SearchError::Engine {
                status: status.as_u16(),
                body,
            })
        }
    }
}
