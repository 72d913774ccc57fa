//! HTTP client for the MedShare API
//!
//! NOTE: Registration is intentionally NOT included here.
//! Accounts are created with a direct call to POST /users/register, and
//! moderator rights are granted server-side.

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the assistant as tool errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },
}

/// HTTP client for communicating with the MedShare API
#[derive(Clone)]
pub struct MedShareClient {
    client: reqwest::Client,
    base_url: String,
}

impl MedShareClient {
    /// Create a new client from environment variables
    ///
    /// Required env vars:
    /// - MEDSHARE_API_KEY: The user's API key (sk-...)
    /// - MEDSHARE_API_URL: Base URL of the API (defaults to http://localhost:8080)
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("MEDSHARE_API_KEY")
            .context("MEDSHARE_API_KEY not set. Register via POST /users/register to get one.")?;
        let base_url = std::env::var("MEDSHARE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Self::new(&base_url, &api_key)
    }

    /// Create a new client with explicit configuration
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Moderation ---

    /// One page of the review queue
    pub async fn review_queue(&self, query: &ReviewQueueQuery) -> Result<String, ApiError> {
        self.send(Method::GET, "/admin/models", Some(query), None::<&()>)
            .await
    }

    /// Status counts across all models
    pub async fn review_stats(&self) -> Result<String, ApiError> {
        self.send(Method::GET, "/admin/models/stats", None::<&()>, None::<&()>)
            .await
    }

    /// Approve or reject a model
    pub async fn review(&self, model_id: &str, request: &ReviewRequest) -> Result<String, ApiError> {
        self.send(
            Method::POST,
            &format!("/admin/models/{}/review", model_id),
            None::<&()>,
            Some(request),
        )
        .await
    }

    // --- Browsing ---

    /// Model detail with permissions
    pub async fn view_model(&self, model_id: &str) -> Result<String, ApiError> {
        self.send(
            Method::GET,
            &format!("/models/{}", model_id),
            None::<&()>,
            None::<&()>,
        )
        .await
    }

    /// Public feed of published models
    pub async fn browse(&self, query: &BrowseQuery) -> Result<String, ApiError> {
        self.send(Method::GET, "/models", Some(query), None::<&()>)
            .await
    }

    // --- Engagement ---

    /// Like, unlike or download a model
    pub async fn engage(&self, model_id: &str, request: &EngageRequest) -> Result<String, ApiError> {
        self.send(
            Method::POST,
            &format!("/models/{}/engage", model_id),
            None::<&()>,
            Some(request),
        )
        .await
    }

    // --- Internal helpers ---

    async fn send<Q: Serialize, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "Calling MedShare API");
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status { status, body });
    }

    Ok(pretty_json(&body))
}

/// Pretty-print JSON bodies for readability; anything else passes through
fn pretty_json(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

// --- Request Types ---

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EngageRequest {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EngageMetadata>,
}

#[derive(Debug, Serialize)]
pub struct EngageMetadata {
    pub source: String,
}
