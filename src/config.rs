use std::env;

use anyhow::{Context, Result};

use crate::insights::client::Credentials;
use crate::personality::compare::KeyPolicy;
use crate::personality::rank::DEFAULT_TOP_N;
use crate::pipeline::compare::CompareSettings;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Public AT Protocol API endpoint (defaults to https://public.api.bsky.app).
    pub public_api_url: String,
    /// Base URL of the Personality Insights service.
    pub insights_url: String,
    pub insights_username: String,
    pub insights_password: String,
    /// Alternative to username/password; sent as basic auth user "apikey".
    pub insights_api_key: String,
    /// Primary language subtag a post must carry (default "en").
    pub language: String,
    /// Posts to fetch per account (default and max 200).
    pub max_posts: usize,
    /// Traits to report (default 5).
    pub top_n: usize,
    pub key_policy: KeyPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the analysis service, which is only
    /// checked when a command actually needs it (see `require_insights`).
    pub fn load() -> Result<Self> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value (or `None` when unset).
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_posts = match lookup("AFFINITY_MAX_POSTS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("AFFINITY_MAX_POSTS must be a number, got '{raw}'"))?
                .min(crate::bluesky::posts::MAX_TIMELINE_POSTS),
            None => crate::bluesky::posts::MAX_TIMELINE_POSTS,
        };

        let top_n = match lookup("AFFINITY_TOP_N") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("AFFINITY_TOP_N must be a number, got '{raw}'"))?,
            None => DEFAULT_TOP_N,
        };

        let key_policy = match lookup("AFFINITY_KEY_POLICY") {
            Some(raw) => raw
                .parse::<KeyPolicy>()
                .context("Invalid AFFINITY_KEY_POLICY")?,
            None => KeyPolicy::default(),
        };

        let language = match lookup("AFFINITY_LANGUAGE") {
            Some(raw) => parse_language(&raw)?,
            None => "en".to_string(),
        };

        Ok(Self {
            public_api_url: lookup("PUBLIC_API_URL")
                .unwrap_or_else(|| crate::bluesky::client::DEFAULT_PUBLIC_API_URL.to_string()),
            insights_url: lookup("PI_URL").unwrap_or_default(),
            insights_username: lookup("PI_USERNAME").unwrap_or_default(),
            insights_password: lookup("PI_PASSWORD").unwrap_or_default(),
            insights_api_key: lookup("PI_API_KEY").unwrap_or_default(),
            language,
            max_posts,
            top_n,
            key_policy,
        })
    }

    /// Check that the analysis service is configured and pick its credentials.
    ///
    /// An API key wins over a username/password pair when both are set.
    pub fn require_insights(&self) -> Result<Credentials> {
        if self.insights_url.is_empty() {
            anyhow::bail!(
                "PI_URL not set. Add the Personality Insights service URL to your .env file.\n\
                 See .env.example for the required variables."
            );
        }

        if !self.insights_api_key.is_empty() {
            return Ok(Credentials::ApiKey(self.insights_api_key.clone()));
        }

        if self.insights_username.is_empty() || self.insights_password.is_empty() {
            anyhow::bail!(
                "Personality Insights credentials not set. Add PI_API_KEY, or both\n\
                 PI_USERNAME and PI_PASSWORD, to your .env file."
            );
        }

        Ok(Credentials::Basic {
            username: self.insights_username.clone(),
            password: self.insights_password.clone(),
        })
    }

    /// Comparison settings, with an optional policy override from the CLI.
    pub fn compare_settings(&self, policy: Option<KeyPolicy>) -> CompareSettings {
        CompareSettings {
            max_posts: self.max_posts,
            language: self.language.clone(),
            key_policy: policy.unwrap_or(self.key_policy),
        }
    }
}

/// Posts are matched on their primary language subtag, so only a bare
/// subtag like "en" can ever match.
fn parse_language(raw: &str) -> Result<String> {
    let language = raw.trim();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!(
            "AFFINITY_LANGUAGE must be a primary language subtag like 'en', got '{raw}'"
        );
    }
    Ok(language.to_ascii_lowercase())
}
