//! Decision Engine
//!
//! Scoring and sizing behind one configured object.

use crate::domain::{BalanceSnapshot, MetricsSummary, Signal, SizingDecision, TokenProfile};
use super::params::{ScoringThresholds, SizingConfig};
use super::{scoring, sizing};

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: ScoringThresholds,
    sizing: SizingConfig,
}

impl DecisionEngine {
    pub fn new(thresholds: ScoringThresholds, sizing: SizingConfig) -> Self {
        Self { thresholds, sizing }
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    pub fn sizing(&self) -> &SizingConfig {
        &self.sizing
    }

    pub fn score(&self, summary: &MetricsSummary) -> Signal {
        scoring::score(summary, &self.thresholds)
    }

    pub fn size(
        &self,
        signal: &Signal,
        token: &TokenProfile,
        balances: &BalanceSnapshot,
    ) -> SizingDecision {
        sizing::size(signal, token, balances, &self.sizing)
    }
}
