//! Strategy Layer - Social signal aggregation and trade decisions
//!
//! - `sentiment`: deterministic lexical polarity scoring
//! - `aggregator`: posts -> MetricsSummary per token
//! - `scoring`: MetricsSummary -> Signal via fixed-threshold rules
//! - `sizing`: Signal + balances -> order instruction
//! - `decision`: scoring and sizing behind one configured engine
//! - `params`: thresholds and limits for all of the above

pub mod params;
pub mod sentiment;
pub mod aggregator;
pub mod scoring;
pub mod sizing;
pub mod decision;

pub use params::{MAX_LOOKBACK_HOURS, StrategyConfig, AggregatorConfig, ScoringThresholds, SizingConfig, ParamsError};
pub use sentiment::{SentimentScorer, LexiconScorer};
pub use aggregator::{SignalAggregator, AnalysisError, summarize};
pub use scoring::{score, select_action, ScoringRule, RULES};
pub use sizing::size;
pub use decision::DecisionEngine;
