// Personality Insights API client.
//
// Sends one plain-text blob per account to the v2 `profile` endpoint and
// hands back the category tree untouched. Flattening it is the core's job,
// not this client's.
//
// Auth is HTTP basic: either a service username/password pair, or an API
// key sent under the fixed user name "apikey".

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::traits::PersonalityAnalyzer;
use crate::personality::extract::RawAnalysisTree;

/// Credentials for the analysis service.
#[derive(Clone)]
pub enum Credentials {
    Basic { username: String, password: String },
    ApiKey(String),
}

impl Credentials {
    fn basic_auth(&self) -> (&str, &str) {
        match self {
            Credentials::Basic { username, password } => (username.as_str(), password.as_str()),
            Credentials::ApiKey(key) => ("apikey", key.as_str()),
        }
    }
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
        }
    }
}

/// HTTP client for a Personality Insights v2 service.
pub struct PersonalityInsightsClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl PersonalityInsightsClient {
    /// Create a client for the service at `base_url` (without the `/v2/profile` suffix).
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent("affinity/0.1 (personality-comparison)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn profile_url(&self) -> String {
        format!("{}/v2/profile", self.base_url)
    }
}

#[async_trait]
impl PersonalityAnalyzer for PersonalityInsightsClient {
    async fn submit_for_analysis(&self, text: &str) -> Result<RawAnalysisTree> {
        let (username, password) = self.credentials.basic_auth();

        debug!(
            bytes = text.len(),
            words = text.split_whitespace().count(),
            "Submitting text for personality analysis"
        );

        let response = self
            .client
            .post(self.profile_url())
            .basic_auth(username, Some(password))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(ACCEPT, "application/json")
            .body(text.to_string())
            .send()
            .await
            .context("Failed to call Personality Insights API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Personality Insights API returned {}: {}", status, body);
        }

        let tree: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Personality Insights API response")?;

        Ok(tree.into())
    }
}
