//! Twitter API v2 Client
//!
//! Bearer-token client for recent search and user timelines.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::Post;
use crate::ports::social::{SocialError, SocialMediaClient};
use super::types::{TweetsResponse, UserResponse};

const TWEET_FIELDS: &str = "public_metrics,created_at,author_id";

/// Twitter client configuration
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// Base URL for the v2 API
    pub api_base_url: String,
    pub bearer_token: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of retry attempts
    pub max_retries: u32,
    /// Page size for account timelines (5-100)
    pub timeline_max_results: u32,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.twitter.com/2".to_string(),
            bearer_token: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            timeline_max_results: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwitterClient {
    config: TwitterConfig,
    http: Client,
}

impl TwitterClient {
    pub fn new(bearer_token: String) -> Result<Self, SocialError> {
        Self::with_config(TwitterConfig {
            bearer_token,
            ..TwitterConfig::default()
        })
    }

    pub fn with_config(config: TwitterConfig) -> Result<Self, SocialError> {
        if config.bearer_token.is_empty() {
            return Err(SocialError::AuthError("bearer token is empty".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SocialError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    /// Resolve a username (without '@') to its numeric user id
    pub async fn resolve_user_id(&self, username: &str) -> Result<String, SocialError> {
        let username = username.trim_start_matches('@');
        let url = format!("{}/users/by/username/{}", self.config.api_base_url, username);

        let response: UserResponse = self.get_json(&url, &[]).await?;
        match response.data {
            Some(user) => Ok(user.id),
            None => {
                let detail = response
                    .errors
                    .and_then(|errs| errs.into_iter().next())
                    .and_then(|e| e.detail.or(e.title))
                    .unwrap_or_else(|| "no user data".to_string());
                Err(SocialError::AccountNotFound(format!("{}: {}", username, detail)))
            }
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SocialError> {
        let request = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.config.bearer_token);

        let response = self.execute_with_retry(|| async {
            request
                .try_clone()
                .ok_or_else(|| SocialError::ApiError("Failed to clone request".into()))?
                .send()
                .await
                .map_err(|e| SocialError::ApiError(e.to_string()))
        })
        .await?;

        self.handle_response(response).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, SocialError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, SocialError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                        tracing::warn!(
                            "Twitter rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff, attempt + 1, self.config.max_retries
                        );
                        last_error = Some(SocialError::RateLimited("Too many requests".into()));
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if response.status().is_server_error() {
                        last_error = Some(SocialError::ApiError(
                            format!("Server error: {}", response.status())
                        ));
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SocialError::ApiError("Max retries exceeded".into())))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SocialError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(SocialError::AuthError(format!("{}: {}", status, body)));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SocialError::RateLimited("Rate limit exceeded".into()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SocialError::ApiError(format!("API error {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SocialError::ParseError(format!("Failed to parse response: {}", e)))
    }
}

/// Recent-search query for `keyword` with retweets excluded
pub fn search_query(keyword: &str) -> String {
    format!("{} -is:retweet", keyword)
}

fn start_time(since: DateTime<Utc>) -> String {
    since.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl SocialMediaClient for TwitterClient {
    async fn search_recent_posts(
        &self,
        query: &str,
        since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Post>, SocialError> {
        let url = format!("{}/tweets/search/recent", self.config.api_base_url);
        let params = [
            ("query", search_query(query)),
            ("start_time", start_time(since)),
            ("max_results", max_results.clamp(10, 100).to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
        ];

        let response: TweetsResponse = self.get_json(&url, &params).await?;
        Ok(response.into_posts("unknown"))
    }

    async fn get_account_posts(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>, SocialError> {
        let user_id = self.resolve_user_id(account_id).await?;
        let url = format!("{}/users/{}/tweets", self.config.api_base_url, user_id);
        let params = [
            ("start_time", start_time(since)),
            ("max_results", self.config.timeline_max_results.clamp(5, 100).to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
        ];

        let response: TweetsResponse = self.get_json(&url, &params).await?;
        Ok(response.into_posts(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_config_default() {
        let config = TwitterConfig::default();
        assert_eq!(config.api_base_url, "https://api.twitter.com/2");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_client_requires_token() {
        assert!(matches!(TwitterClient::new(String::new()), Err(SocialError::AuthError(_))));
        assert!(TwitterClient::new("token".to_string()).is_ok());
    }

    #[test]
    fn test_search_query_excludes_retweets() {
        assert_eq!(search_query("$DOGE"), "$DOGE -is:retweet");
    }

    #[test]
    fn test_start_time_format() {
        let since = Utc.with_ymd_and_hms(2026, 10, 15, 8, 30, 0).unwrap();
        assert_eq!(start_time(since), "2026-10-15T08:30:00Z");
    }
}
