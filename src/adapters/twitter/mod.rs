//! Twitter Adapter
//!
//! Implementation of the SocialMediaClient port for the Twitter API v2.

mod client;
mod types;

pub use client::{TwitterClient, TwitterConfig, search_query};
pub use types::{Tweet, TweetsResponse, PublicMetrics};
