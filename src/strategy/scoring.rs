//! Signal Scoring
//!
//! Fixed-threshold rules over a `MetricsSummary`. Each satisfied rule adds one
//! to the strength and appends its name to the reasons, in table order.

use crate::domain::{MetricsSummary, Signal, SignalAction};
use super::params::ScoringThresholds;

/// One additive scoring rule
#[derive(Clone, Copy)]
pub struct ScoringRule {
    pub name: &'static str,
    check: fn(&MetricsSummary, &ScoringThresholds) -> bool,
}

impl ScoringRule {
    pub fn is_satisfied(&self, summary: &MetricsSummary, thresholds: &ScoringThresholds) -> bool {
        (self.check)(summary, thresholds)
    }
}

impl std::fmt::Debug for ScoringRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringRule").field("name", &self.name).finish()
    }
}

pub const SENTIMENT_REASON: &str = "High positive sentiment";
pub const VIRALITY_REASON: &str = "Multiple viral tweets";
pub const INFLUENCER_REASON: &str = "Key influencer activity";
pub const VOLUME_REASON: &str = "High tweet volume";

/// Rules in evaluation order
pub const RULES: [ScoringRule; 4] = [
    ScoringRule { name: SENTIMENT_REASON, check: positive_sentiment },
    ScoringRule { name: VIRALITY_REASON, check: multiple_viral },
    ScoringRule { name: INFLUENCER_REASON, check: influencer_activity },
    ScoringRule { name: VOLUME_REASON, check: high_volume },
];

fn positive_sentiment(s: &MetricsSummary, t: &ScoringThresholds) -> bool {
    s.avg_sentiment > t.sentiment
}

fn multiple_viral(s: &MetricsSummary, t: &ScoringThresholds) -> bool {
    s.viral_count >= t.viral_count
}

fn influencer_activity(s: &MetricsSummary, t: &ScoringThresholds) -> bool {
    s.influencer_mentions >= t.influencer_mentions
}

fn high_volume(s: &MetricsSummary, t: &ScoringThresholds) -> bool {
    s.volume > t.volume
}

/// Evaluate every rule and pick an action from the resulting strength
pub fn score(summary: &MetricsSummary, thresholds: &ScoringThresholds) -> Signal {
    let mut strength = 0i32;
    let mut reasons = Vec::new();

    for rule in RULES.iter() {
        if rule.is_satisfied(summary, thresholds) {
            strength += 1;
            reasons.push(rule.name.to_string());
        }
    }

    Signal {
        action: select_action(strength, thresholds),
        strength,
        reasons,
    }
}

/// Map a strength to an action.
///
/// The sell band only triggers on negative strength, which none of the
/// current rules produce.
pub fn select_action(strength: i32, thresholds: &ScoringThresholds) -> SignalAction {
    match strength {
        s if s >= thresholds.buy_strength => SignalAction::Buy,
        s if s <= thresholds.sell_strength => SignalAction::Sell,
        _ => SignalAction::Hold,
    }
}
