//! Signal Aggregator
//!
//! Turns a token symbol into a `MetricsSummary` by querying the social source:
//! one search per keyword, one timeline lookup per tracked account. Single
//! fetch failures are logged and skipped; the token is only reported
//! unavailable when every fetch fails.

use std::sync::Arc;
use chrono::{Duration, Utc};
use statrs::statistics::Statistics;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{ConfigurationError, MetricsSummary, Post, TokenRegistry, ViralPost};
use crate::ports::SocialMediaClient;
use super::params::{AggregatorConfig, MAX_LOOKBACK_HOURS};
use super::sentiment::SentimentScorer;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Lookback must be 1-168 hours, got {0}h")]
    InvalidLookback(i64),

    #[error("Social data unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },
}

/// Collects and reduces social activity per token
pub struct SignalAggregator {
    social: Arc<dyn SocialMediaClient>,
    scorer: Arc<dyn SentimentScorer>,
    registry: Arc<TokenRegistry>,
    config: AggregatorConfig,
}

impl SignalAggregator {
    pub fn new(
        social: Arc<dyn SocialMediaClient>,
        scorer: Arc<dyn SentimentScorer>,
        registry: Arc<TokenRegistry>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            social,
            scorer,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Analyze with the configured default lookback window
    pub async fn analyze_default(&self, symbol: &str) -> Result<MetricsSummary, AnalysisError> {
        self.analyze(symbol, self.config.lookback()).await
    }

    /// Fetch and reduce the last `lookback` of social activity for `symbol`
    pub async fn analyze(
        &self,
        symbol: &str,
        lookback: Duration,
    ) -> Result<MetricsSummary, AnalysisError> {
        let profile = self.registry.get(symbol).map_err(|e| {
            warn!(symbol, error = %e, "Cannot analyze unregistered token");
            e
        })?;

        if lookback < Duration::hours(1) || lookback > Duration::hours(MAX_LOOKBACK_HOURS) {
            warn!(symbol, hours = lookback.num_hours(), "Lookback out of range");
            return Err(AnalysisError::InvalidLookback(lookback.num_hours()));
        }
        let since = Utc::now()
            .checked_sub_signed(lookback)
            .ok_or(AnalysisError::InvalidLookback(lookback.num_hours()))?;
        let mut attempted = 0usize;
        let mut failures: Vec<String> = Vec::new();

        let mut keyword_posts: Vec<Post> = Vec::new();
        for keyword in profile.keywords() {
            attempted += 1;
            match self
                .social
                .search_recent_posts(keyword, since, self.config.max_results)
                .await
            {
                Ok(posts) => {
                    debug!(symbol, keyword = %keyword, count = posts.len(), "Keyword search");
                    keyword_posts.extend(posts);
                }
                Err(e) => {
                    warn!(symbol, keyword = %keyword, error = %e, "Keyword search failed, skipping");
                    failures.push(format!("search '{}': {}", keyword, e));
                }
            }
        }

        let mut influencer_mentions = 0usize;
        for account in profile.tracked_accounts() {
            attempted += 1;
            match self.social.get_account_posts(account, since).await {
                Ok(posts) => {
                    debug!(symbol, account = %account, count = posts.len(), "Account timeline");
                    influencer_mentions += posts.len();
                }
                Err(e) => {
                    warn!(symbol, account = %account, error = %e, "Account lookup failed, skipping");
                    failures.push(format!("account '{}': {}", account, e));
                }
            }
        }

        if attempted > 0 && failures.len() == attempted {
            let reason = failures.join("; ");
            warn!(symbol, %reason, "All social fetches failed");
            return Err(AnalysisError::Unavailable {
                symbol: profile.symbol().to_string(),
                reason,
            });
        }

        let summary = summarize(
            &keyword_posts,
            influencer_mentions,
            self.scorer.as_ref(),
            self.config.viral_engagement_threshold,
        );

        info!(
            symbol,
            volume = summary.volume,
            avg_sentiment = summary.avg_sentiment,
            viral = summary.viral_count,
            influencer = summary.influencer_mentions,
            failed_fetches = failures.len(),
            "Social metrics collected"
        );
        for viral in &summary.viral_posts {
            debug!(
                symbol,
                likes = viral.engagement.like_count,
                reposts = viral.engagement.repost_count,
                sentiment = viral.sentiment,
                text = %viral.text,
                "Viral post"
            );
        }

        Ok(summary)
    }
}

/// Reduce keyword-search posts plus the influencer post count to a summary.
///
/// Every post contributes one sentiment observation; `volume` is the number of
/// observations and the average is 0 when there are none.
pub fn summarize(
    posts: &[Post],
    influencer_mentions: usize,
    scorer: &dyn SentimentScorer,
    viral_threshold: u64,
) -> MetricsSummary {
    let mut sentiments = Vec::with_capacity(posts.len());
    let mut viral_posts = Vec::new();

    for post in posts {
        let sentiment = scorer.polarity(&post.text);
        sentiments.push(sentiment);

        if post.engagement.exceeds(viral_threshold) {
            viral_posts.push(ViralPost {
                text: post.text.clone(),
                engagement: post.engagement,
                sentiment,
            });
        }
    }

    let avg_sentiment = if sentiments.is_empty() {
        0.0
    } else {
        sentiments.iter().mean()
    };

    MetricsSummary {
        volume: sentiments.len(),
        avg_sentiment,
        viral_count: viral_posts.len(),
        influencer_mentions,
        viral_posts,
    }
}
