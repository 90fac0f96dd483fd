//! Org auth token issuing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request for a new org auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    /// Organization the token is scoped to
    #[serde(skip)]
    pub org_slug: String,

    /// Name shown in the organization's token list
    pub name: String,
}

impl TokenRequest {
    /// Request named after the day it was generated on.
    pub fn for_org(org_slug: &str, date: NaiveDate) -> Self {
        Self {
            org_slug: org_slug.to_string(),
            name: format!("Generated by Docs on {}", date.format("%Y-%m-%d")),
        }
    }

    pub fn today(org_slug: &str) -> Self {
        Self::for_org(org_slug, Utc::now().date_naive())
    }
}

/// Service that creates org auth tokens.
///
/// Returns `None` when no token could be created; callers only show a
/// generic error in that case.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn create_org_auth_token(&self, request: &TokenRequest) -> Option<String>;
}

/// Errors that can occur when talking to the token API.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid auth token header")]
    InvalidAuthToken,

    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {0} has no token")]
    MissingToken(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Token issuer backed by the Sentry web API.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTokenIssuer {
    /// Create an issuer that relies on ambient credentials only.
    pub fn new(base_url: &str) -> Result<Self, IssuerError> {
        Self::build(base_url, HeaderMap::new())
    }

    /// Create an issuer that sends `Authorization: Bearer <token>`.
    pub fn with_auth_token(base_url: &str, token: &str) -> Result<Self, IssuerError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| IssuerError::InvalidAuthToken)?;
        headers.insert(AUTHORIZATION, value);

        Self::build(base_url, headers)
    }

    fn build(base_url: &str, headers: HeaderMap) -> Result<Self, IssuerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("docsite/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(IssuerError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint that creates tokens for `org_slug`.
    pub fn endpoint(&self, org_slug: &str) -> String {
        format!(
            "{}/api/0/organizations/{}/org-auth-tokens/",
            self.base_url, org_slug
        )
    }

    /// Create a token, reporting why it failed.
    pub async fn request(&self, request: &TokenRequest) -> Result<String, IssuerError> {
        let url = self.endpoint(&request.org_slug);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| IssuerError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(IssuerError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|source| IssuerError::Request {
                url: url.clone(),
                source,
            })?;

        match body.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(IssuerError::MissingToken(url)),
        }
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn create_org_auth_token(&self, request: &TokenRequest) -> Option<String> {
        match self.request(request).await {
            Ok(token) => {
                tracing::debug!("Created org auth token for {}", request.org_slug);
                Some(token)
            }
            Err(e) => {
                tracing::warn!("Failed to create org auth token: {}", e);
                None
            }
        }
    }
}
