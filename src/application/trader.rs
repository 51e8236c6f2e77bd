//! Meme Trader
//!
//! Polling loop that runs every configured pair through
//! analyze -> score -> size -> place. Tokens are handled one at a time and
//! a failure for one token never aborts the cycle.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, error, info, warn};

use crate::domain::{
    BalanceSnapshot, ConfigurationError, MetricsSummary, NoOpReason, Signal,
    SignalAction, SizingDecision, TokenProfile, TokenRegistry, DEFAULT_QUOTE_ASSET,
};
use crate::ports::{ExchangeClient, ExchangeError, OrderResult};
use crate::strategy::{AnalysisError, DecisionEngine, SignalAggregator};

#[derive(Debug, Error)]
pub enum TraderError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),
    #[error("Pair {0} is not listed on the exchange")]
    PairNotListed(String),
    #[error("No trading pairs configured")]
    NoTradingPairs,
}

/// What happened to one pair during a cycle
#[derive(Debug)]
pub enum TokenOutcome {
    /// Pair has no registered profile
    Misconfigured(ConfigurationError),
    /// Social data could not be fetched
    Unavailable(String),
    Hold(Signal),
    NoOp { signal: Signal, reason: NoOpReason },
    Executed { signal: Signal, order: OrderResult },
    /// Balance lookup or order placement failed
    Failed { signal: Signal, error: ExchangeError },
}

impl TokenOutcome {
    /// Exchange-side failure: the decided action was not carried out
    pub fn is_failure(&self) -> bool {
        matches!(self, TokenOutcome::Failed { .. })
    }

    /// Pair skipped before scoring; retried next cycle
    pub fn is_skipped(&self) -> bool {
        matches!(self, TokenOutcome::Misconfigured(_) | TokenOutcome::Unavailable(_))
    }

    pub fn signal(&self) -> Option<&Signal> {
        match self {
            TokenOutcome::Hold(signal)
            | TokenOutcome::NoOp { signal, .. }
            | TokenOutcome::Executed { signal, .. }
            | TokenOutcome::Failed { signal, .. } => Some(signal),
            TokenOutcome::Misconfigured(_) | TokenOutcome::Unavailable(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct TokenReport {
    pub pair: String,
    pub summary: Option<MetricsSummary>,
    pub outcome: TokenOutcome,
}

/// Result of one pass over all trading pairs
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tokens: Vec<TokenReport>,
}

impl CycleReport {
    pub fn executed(&self) -> impl Iterator<Item = &OrderResult> {
        self.tokens.iter().filter_map(|t| match &t.outcome {
            TokenOutcome::Executed { order, .. } => Some(order),
            _ => None,
        })
    }

    pub fn failures(&self) -> usize {
        self.tokens.iter().filter(|t| t.outcome.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.tokens.iter().filter(|t| t.outcome.is_skipped()).count()
    }

    /// True when every pair in the cycle hit an exchange failure
    pub fn is_failed(&self) -> bool {
        !self.tokens.is_empty() && self.failures() == self.tokens.len()
    }

    pub fn get(&self, pair: &str) -> Option<&TokenReport> {
        self.tokens.iter().find(|t| t.pair == pair)
    }
}

/// Social-signal trader over a fixed set of token profiles
pub struct MemeTrader {
    registry: Arc<TokenRegistry>,
    aggregator: Arc<SignalAggregator>,
    engine: DecisionEngine,
    exchange: Arc<dyn ExchangeClient>,
    quote_asset: String,
    pairs: Arc<RwLock<Vec<String>>>,
    is_running: Arc<RwLock<bool>>,
    stop_requested: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl MemeTrader {
    /// Create a trader whose pairs are the registry's tokens, in order
    pub fn new(
        registry: Arc<TokenRegistry>,
        aggregator: SignalAggregator,
        engine: DecisionEngine,
        exchange: Arc<dyn ExchangeClient>,
    ) -> Self {
        let pairs = registry.iter().map(TokenProfile::pair_symbol).collect();
        let quote_asset = registry
            .iter()
            .next()
            .map(|p| p.quote_asset().to_string())
            .unwrap_or_else(|| DEFAULT_QUOTE_ASSET.to_string());

        Self {
            registry,
            aggregator: Arc::new(aggregator),
            engine,
            exchange,
            quote_asset,
            pairs: Arc::new(RwLock::new(pairs)),
            is_running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            poll_interval: Duration::from_secs(300),
            error_backoff: Duration::from_secs(60),
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the wait after a failed cycle
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    pub fn with_quote_asset(mut self, quote_asset: &str) -> Self {
        self.quote_asset = quote_asset.to_uppercase();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn trading_pairs(&self) -> Vec<String> {
        self.pairs.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Run cycles until `stop()` is called.
    ///
    /// A stop requested before `run()` starts is honoured: the loop exits
    /// without running a cycle.
    pub async fn run(&self) -> Result<(), TraderError> {
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            info!("Stop requested before start, not running");
            return Ok(());
        }
        *self.is_running.write().await = true;

        info!(
            "Starting meme trader - pairs: {:?}, poll interval: {:?}",
            self.trading_pairs().await,
            self.poll_interval
        );

        while !self.stop_requested.load(Ordering::SeqCst) {
            let cycle = self.tick().await;
            match &cycle {
                Ok(report) if report.is_failed() => {
                    warn!(failures = report.failures(), "Every pair failed at the exchange this cycle");
                }
                Ok(report) => {
                    info!(
                        pairs = report.tokens.len(),
                        orders = report.executed().count(),
                        skipped = report.skipped(),
                        failures = report.failures(),
                        "Cycle complete"
                    );
                }
                Err(e) => error!("Cycle error: {}", e),
            }

            if self.stop_requested.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.next_wait(&cycle)) => {}
                _ = self.shutdown.notified() => {}
            }
        }

        self.stop_requested.store(false, Ordering::SeqCst);
        *self.is_running.write().await = false;
        info!("Meme trader stopped");
        Ok(())
    }

    /// Wait before the next cycle. Only a cycle that could not run at all
    /// backs off; skipped or failed pairs keep the regular poll interval.
    pub fn next_wait(&self, cycle: &Result<CycleReport, TraderError>) -> Duration {
        match cycle {
            Ok(_) => self.poll_interval,
            Err(_) => self.error_backoff,
        }
    }

    /// Stop the loop; a pending sleep is cut short
    pub async fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        *self.is_running.write().await = false;
        self.shutdown.notify_one();
        info!("Stop requested");
    }

    /// One pass over every trading pair
    pub async fn tick(&self) -> Result<CycleReport, TraderError> {
        let pairs = self.trading_pairs().await;
        if pairs.is_empty() {
            return Err(TraderError::NoTradingPairs);
        }

        let started_at = Utc::now();
        let mut tokens = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let report = self.process_pair(&pair).await;
            tokens.push(report);
        }

        Ok(CycleReport {
            started_at,
            finished_at: Utc::now(),
            tokens,
        })
    }

    async fn process_pair(&self, pair: &str) -> TokenReport {
        let report = |summary, outcome| TokenReport {
            pair: pair.to_string(),
            summary,
            outcome,
        };

        let profile = match self.registry.by_pair(pair) {
            Ok(profile) => profile,
            Err(e) => {
                error!(pair, error = %e, "No profile for trading pair");
                return report(None, TokenOutcome::Misconfigured(e));
            }
        };

        let summary = match self.aggregator.analyze_default(profile.symbol()).await {
            Ok(summary) => summary,
            Err(AnalysisError::Configuration(e)) => {
                return report(None, TokenOutcome::Misconfigured(e));
            }
            Err(e) => {
                warn!(pair, error = %e, "Skipping pair this cycle");
                return report(None, TokenOutcome::Unavailable(e.to_string()));
            }
        };

        let signal = self.engine.score(&summary);
        info!(pair, action = %signal.action, strength = signal.strength, "Signal: {}", signal);

        if !signal.is_actionable() {
            return report(Some(summary), TokenOutcome::Hold(signal));
        }

        let balances = match self.fetch_balances(profile, signal.action).await {
            Ok(balances) => balances,
            Err(e) => {
                error!(pair, error = %e, "Balance lookup failed, not trading");
                return report(Some(summary), TokenOutcome::Failed { signal, error: e });
            }
        };

        let outcome = match self.engine.size(&signal, profile, &balances) {
            SizingDecision::NoOp(reason) => {
                info!(pair, %reason, "No order");
                TokenOutcome::NoOp { signal, reason }
            }
            SizingDecision::Order(instruction) => {
                match self
                    .exchange
                    .place_market_order(&instruction.symbol, instruction.side, instruction.quantity)
                    .await
                {
                    Ok(order) => {
                        info!(
                            pair,
                            side = %order.side,
                            order_id = %order.order_id,
                            requested = instruction.quantity,
                            executed_qty = order.executed_qty,
                            quote_qty = order.quote_qty,
                            "Order placed"
                        );
                        TokenOutcome::Executed { signal, order }
                    }
                    Err(e) => {
                        error!(pair, side = %instruction.side, error = %e, "Order failed");
                        TokenOutcome::Failed { signal, error: e }
                    }
                }
            }
        };

        report(Some(summary), outcome)
    }

    /// Fetch only the balance the signal's side needs
    async fn fetch_balances(
        &self,
        profile: &TokenProfile,
        action: SignalAction,
    ) -> Result<BalanceSnapshot, ExchangeError> {
        let snapshot = match action {
            SignalAction::Buy => {
                BalanceSnapshot::new(self.exchange.get_free_balance(profile.quote_asset()).await?, 0.0)
            }
            SignalAction::Sell => {
                BalanceSnapshot::new(0.0, self.exchange.get_free_balance(profile.symbol()).await?)
            }
            SignalAction::Hold => BalanceSnapshot::default(),
        };
        debug!(
            symbol = profile.symbol(),
            quote_free = snapshot.quote_free,
            base_free = snapshot.base_free,
            "Balances"
        );
        Ok(snapshot)
    }

    /// Exchange pairs quoted in the trader's quote asset
    pub async fn available_pairs(&self) -> Result<BTreeSet<String>, TraderError> {
        let symbols = self.exchange.list_tradable_symbols().await?;
        Ok(symbols
            .into_iter()
            .filter(|s| s.len() > self.quote_asset.len() && s.ends_with(self.quote_asset.as_str()))
            .collect())
    }

    /// Add a pair by token symbol ("PEPE") or pair symbol ("PEPEUSDT").
    ///
    /// Returns `Ok(false)` when the pair is already traded.
    pub async fn add_trading_pair(&self, symbol: &str) -> Result<bool, TraderError> {
        let profile = self
            .registry
            .by_pair(symbol)
            .or_else(|_| self.registry.get(symbol))?;
        let pair = profile.pair_symbol();

        if self.pairs.read().await.contains(&pair) {
            debug!(pair = %pair, "Pair already traded");
            return Ok(false);
        }

        if !self.available_pairs().await?.contains(&pair) {
            warn!(pair = %pair, "Pair not listed, not adding");
            return Err(TraderError::PairNotListed(pair));
        }

        let mut pairs = self.pairs.write().await;
        if pairs.contains(&pair) {
            return Ok(false);
        }
        info!(pair = %pair, "Added trading pair");
        pairs.push(pair);
        Ok(true)
    }

    /// Remove a pair; returns whether it was present
    pub async fn remove_trading_pair(&self, pair: &str) -> bool {
        let pair = pair.to_uppercase();
        let mut pairs = self.pairs.write().await;
        let before = pairs.len();
        pairs.retain(|p| *p != pair);
        before != pairs.len()
    }
}

impl Clone for MemeTrader {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            aggregator: Arc::clone(&self.aggregator),
            engine: self.engine.clone(),
            exchange: Arc::clone(&self.exchange),
            quote_asset: self.quote_asset.clone(),
            pairs: Arc::clone(&self.pairs),
            is_running: Arc::clone(&self.is_running),
            stop_requested: Arc::clone(&self.stop_requested),
            shutdown: Arc::clone(&self.shutdown),
            poll_interval: self.poll_interval,
            error_backoff: self.error_backoff,
        }
    }
}
