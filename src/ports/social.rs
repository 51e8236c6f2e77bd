use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Post;

/// Social data error type
#[derive(Error, Debug)]
pub enum SocialError {
    #[error("REST API error: {0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),
}

/// Social-media source the aggregator reads from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialMediaClient: Send + Sync {
    /// Recent posts matching `query` created after `since`, reposts excluded,
    /// at most `max_results` items
    async fn search_recent_posts(
        &self,
        query: &str,
        since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Post>, SocialError>;

    /// Posts authored by `account_id` created after `since`
    async fn get_account_posts(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>, SocialError>;
}
