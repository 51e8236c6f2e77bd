//! Twitter API v2 response types

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::Post;

#[derive(Debug, Deserialize)]
pub struct TweetsResponse {
    #[serde(default)]
    pub data: Option<Vec<Tweet>>,
    #[serde(default)]
    pub meta: Option<TweetsMeta>,
}

#[derive(Debug, Deserialize)]
pub struct TweetsMeta {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub data: Option<User>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl Tweet {
    /// Convert to a domain post; `fallback_author` is used when the API
    /// omits `author_id`
    pub fn into_post(self, fallback_author: &str) -> Post {
        let metrics = self.public_metrics.unwrap_or_default();
        let author = self.author_id.unwrap_or_else(|| fallback_author.to_string());
        Post::new(&self.id, &self.text, &author, self.created_at.unwrap_or_else(Utc::now))
            .with_engagement(metrics.like_count, metrics.retweet_count)
    }
}

impl TweetsResponse {
    pub fn into_posts(self, fallback_author: &str) -> Vec<Post> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.into_post(fallback_author))
            .collect()
    }
}
