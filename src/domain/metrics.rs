use serde::{Deserialize, Serialize};

use super::post::Engagement;

/// A post that crossed the engagement threshold, kept for audit logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViralPost {
    pub text: String,
    pub engagement: Engagement,
    pub sentiment: f64,
}

/// Fixed-shape reduction of one token's social activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Number of keyword-search posts scored for sentiment
    pub volume: usize,
    /// Mean sentiment in [-1, 1]; 0 when `volume` is 0
    pub avg_sentiment: f64,
    /// Posts whose likes or reposts exceeded the viral threshold
    pub viral_count: usize,
    /// Raw post count from tracked accounts in the lookback window
    pub influencer_mentions: usize,
    pub viral_posts: Vec<ViralPost>,
}

impl MetricsSummary {
    /// Summary of a window with no activity at all
    pub fn empty() -> Self {
        Self {
            volume: 0,
            avg_sentiment: 0.0,
            viral_count: 0,
            influencer_mentions: 0,
            viral_posts: Vec::new(),
        }
    }

    /// Summary from bare counts, without retained viral posts
    pub fn from_counts(
        avg_sentiment: f64,
        viral_count: usize,
        influencer_mentions: usize,
        volume: usize,
    ) -> Self {
        Self {
            volume,
            avg_sentiment,
            viral_count,
            influencer_mentions,
            viral_posts: Vec::new(),
        }
    }
}

impl Default for MetricsSummary {
    fn default() -> Self {
        Self::empty()
    }
}
