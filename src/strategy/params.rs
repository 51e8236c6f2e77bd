//! Strategy Parameters
//!
//! Thresholds for the aggregator, scoring rules and position sizing.
//! Defaults reproduce the stock rule set: sentiment > 0.2, 3 viral posts,
//! 2 influencer posts, 1000 posts of volume, buy at strength 3.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main strategy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub aggregator: AggregatorConfig,
    pub scoring: ScoringThresholds,
    pub sizing: SizingConfig,
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.aggregator.validate()?;
        self.scoring.validate()?;
        self.sizing.validate()?;
        Ok(())
    }
}

/// Longest lookback window the recent-search endpoint serves
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 7;

/// Social data collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Items requested per keyword search
    pub max_results: u32,
    /// Likes or reposts above this make a post viral
    pub viral_engagement_threshold: u64,
    /// Default lookback window in hours
    pub lookback_hours: i64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            viral_engagement_threshold: 1000,
            lookback_hours: 24,
        }
    }
}

impl AggregatorConfig {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        // Recent-search endpoints accept 10..=100 results per page
        if !(10..=100).contains(&self.max_results) {
            return Err(ParamsError::InvalidMaxResults(self.max_results));
        }
        if !(1..=MAX_LOOKBACK_HOURS).contains(&self.lookback_hours) {
            return Err(ParamsError::InvalidLookback(self.lookback_hours));
        }
        Ok(())
    }
}

/// Scoring rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringThresholds {
    /// Average sentiment must be strictly above this
    pub sentiment: f64,
    /// Viral post count must be at least this
    pub viral_count: usize,
    /// Influencer post count must be at least this
    pub influencer_mentions: usize,
    /// Volume must be strictly above this
    pub volume: usize,
    /// Strength at or above which the signal is a buy
    pub buy_strength: i32,
    /// Strength at or below which the signal is a sell
    pub sell_strength: i32,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            sentiment: 0.2,
            viral_count: 3,
            influencer_mentions: 2,
            volume: 1000,
            buy_strength: 3,
            sell_strength: -2,
        }
    }
}

impl ScoringThresholds {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(-1.0..=1.0).contains(&self.sentiment) {
            return Err(ParamsError::InvalidSentimentThreshold(self.sentiment));
        }
        if self.buy_strength <= 0 || self.sell_strength >= self.buy_strength {
            return Err(ParamsError::InvalidStrengthBands {
                buy: self.buy_strength,
                sell: self.sell_strength,
            });
        }
        Ok(())
    }
}

/// Position sizing limits, in quote currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Hard cap on buy notional
    pub max_trade_amount: f64,
    /// Free quote balance must be strictly above this to buy
    pub min_trade_amount: f64,
    /// Share of free quote balance committed per unit of strength
    pub position_fraction: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            max_trade_amount: 100.0,
            min_trade_amount: 20.0,
            position_fraction: 0.1,
        }
    }
}

impl SizingConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_trade_amount <= 0.0 {
            return Err(ParamsError::InvalidTradeAmount(self.max_trade_amount));
        }
        if self.min_trade_amount < 0.0 || self.min_trade_amount > self.max_trade_amount {
            return Err(ParamsError::InvalidMinimum {
                min: self.min_trade_amount,
                max: self.max_trade_amount,
            });
        }
        if self.position_fraction <= 0.0 || self.position_fraction > 1.0 {
            return Err(ParamsError::InvalidFraction(self.position_fraction));
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamsError {
    #[error("max_results must be 10-100, got {0}")]
    InvalidMaxResults(u32),
    #[error("lookback_hours must be 1-168, got {0}")]
    InvalidLookback(i64),
    #[error("sentiment threshold must be in [-1, 1], got {0}")]
    InvalidSentimentThreshold(f64),
    #[error("buy strength must be positive and above sell strength (buy {buy}, sell {sell})")]
    InvalidStrengthBands { buy: i32, sell: i32 },
    #[error("max_trade_amount must be > 0, got {0}")]
    InvalidTradeAmount(f64),
    #[error("min_trade_amount must be in [0, max_trade_amount] (min {min}, max {max})")]
    InvalidMinimum { min: f64, max: f64 },
    #[error("position_fraction must be in (0, 1], got {0}")]
    InvalidFraction(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_lookback_duration() {
        assert_eq!(AggregatorConfig::default().lookback(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_rejects_min_above_max() {
        let sizing = SizingConfig {
            max_trade_amount: 10.0,
            min_trade_amount: 20.0,
            ..Default::default()
        };
        assert!(matches!(sizing.validate(), Err(ParamsError::InvalidMinimum { .. })));
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let sizing = SizingConfig {
            position_fraction: 0.0,
            ..Default::default()
        };
        assert_eq!(sizing.validate(), Err(ParamsError::InvalidFraction(0.0)));
    }

    #[test]
    fn test_rejects_overlapping_strength_bands() {
        let scoring = ScoringThresholds {
            buy_strength: 1,
            sell_strength: 2,
            ..Default::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_search_page() {
        let aggregator = AggregatorConfig {
            max_results: 500,
            ..Default::default()
        };
        assert_eq!(aggregator.validate(), Err(ParamsError::InvalidMaxResults(500)));
    }
}
