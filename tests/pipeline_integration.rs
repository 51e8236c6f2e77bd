//! Trading Pipeline Integration Tests
//!
//! End-to-end runs of social data -> metrics -> signal -> order:
//! 1. Aggregator + DecisionEngine against the recording fakes
//! 2. MemeTrader cycles against the paper exchange
//! 3. Config file -> registry -> trader wiring
//!
//! All tests are deterministic (no real network calls).

use std::io::Write;
use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::{Duration, Utc};
use tempfile::NamedTempFile;

use meme_pulse::adapters::PaperExchange;
use meme_pulse::application::{MemeTrader, TokenOutcome};
use meme_pulse::config::load_config;
use meme_pulse::domain::{
    BalanceSnapshot, NoOpReason, OrderSide, Post, SignalAction, SizingDecision, TokenProfile,
    TokenRegistry,
};
use meme_pulse::ports::mocks::{FakeExchange, FakeSocialClient};
use meme_pulse::ports::ExchangeClient;
use meme_pulse::strategy::{
    AggregatorConfig, DecisionEngine, LexiconScorer, ScoringThresholds, SentimentScorer,
    SignalAggregator, SizingConfig, StrategyConfig,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Scores every post the same
struct ConstScorer(f64);

impl SentimentScorer for ConstScorer {
    fn polarity(&self, _text: &str) -> f64 {
        self.0
    }
}

fn posts(n: usize, likes: u64) -> Vec<Post> {
    (0..n)
        .map(|i| {
            Post::new(&format!("p{}", i), "such wow", "fan", Utc::now() - Duration::hours(1))
                .with_engagement(likes, 0)
        })
        .collect()
}

fn doge_registry() -> Arc<TokenRegistry> {
    let doge = TokenProfile::new("DOGE", ["$DOGE", "#dogecoin"], ["elonmusk", "dogecoin"]).unwrap();
    Arc::new(TokenRegistry::from_profiles([doge]).unwrap())
}

/// Search results large enough to clear the default volume threshold.
/// Each keyword returns 100 posts, 2 of them viral.
fn busy_social() -> FakeSocialClient {
    let mut page = posts(98, 10);
    page.extend(posts(2, 5000));
    let mut social = FakeSocialClient::new()
        .with_account("elonmusk", posts(1, 0))
        .with_account("dogecoin", posts(1, 0));
    for keyword in ["$DOGE", "#dogecoin"] {
        social = social.with_search(keyword, page.clone());
    }
    social
}

fn aggregator(
    social: FakeSocialClient,
    scorer: Arc<dyn SentimentScorer>,
    registry: Arc<TokenRegistry>,
) -> SignalAggregator {
    SignalAggregator::new(Arc::new(social), scorer, registry, AggregatorConfig::default())
}

// ============================================================================
// Aggregator + DecisionEngine
// ============================================================================

#[tokio::test]
async fn test_quiet_token_yields_zero_summary_and_noop() {
    let social = FakeSocialClient::new();
    let agg = aggregator(social.clone(), Arc::new(LexiconScorer::new()), doge_registry());
    let engine = DecisionEngine::default();

    let summary = agg.analyze_default("DOGE").await.unwrap();
    assert_eq!(summary.volume, 0);
    assert_eq!(summary.avg_sentiment, 0.0);
    assert_eq!(summary.viral_count, 0);
    assert_eq!(summary.influencer_mentions, 0);

    let signal = engine.score(&summary);
    assert_eq!(signal.strength, 0);
    assert_eq!(signal.action, SignalAction::Hold);

    let registry = doge_registry();
    let doge = registry.get("DOGE").unwrap();
    let decision = engine.size(&signal, doge, &BalanceSnapshot::new(500.0, 0.0));
    assert_eq!(decision, SizingDecision::NoOp(NoOpReason::NoAction));

    // Every keyword and account was queried once
    assert_eq!(
        social.get_calls(),
        vec!["search:$DOGE", "search:#dogecoin", "account:elonmusk", "account:dogecoin"]
    );
}

#[tokio::test]
async fn test_busy_token_fires_every_rule() {
    let agg = aggregator(busy_social(), Arc::new(ConstScorer(0.3)), doge_registry());
    let engine = DecisionEngine::default();

    let summary = agg.analyze_default("doge").await.unwrap();
    // Posts from both keyword searches are counted
    assert_eq!(summary.volume, 200);
    assert_eq!(summary.viral_count, 4);
    assert_eq!(summary.influencer_mentions, 2);
    assert_relative_eq!(summary.avg_sentiment, 0.3, epsilon = 1e-9);

    // Volume 200 is under the default 1000, so three rules fire
    let signal = engine.score(&summary);
    assert_eq!(signal.strength, 3);
    assert_eq!(signal.action, SignalAction::Buy);
    assert_eq!(
        signal.reasons,
        vec!["High positive sentiment", "Multiple viral tweets", "Key influencer activity"]
    );
}

#[tokio::test]
async fn test_unknown_token_is_configuration_error() {
    let agg = aggregator(FakeSocialClient::new(), Arc::new(LexiconScorer::new()), doge_registry());
    let err = agg.analyze_default("PEPE").await.unwrap_err();
    assert!(err.to_string().contains("PEPE"));
}

#[tokio::test]
async fn test_partial_outage_still_summarizes() {
    let social = busy_social().with_search_failure("#dogecoin", "503");
    let agg = aggregator(social, Arc::new(ConstScorer(0.0)), doge_registry());

    let summary = agg.analyze_default("DOGE").await.unwrap();
    assert_eq!(summary.volume, 100);
    assert_eq!(summary.viral_count, 2);
}

// ============================================================================
// MemeTrader against exchanges
// ============================================================================

#[tokio::test]
async fn test_trader_buys_on_paper_exchange() {
    let registry = doge_registry();
    let paper = Arc::new(PaperExchange::new("USDT", 500.0).with_price("DOGEUSDT", 0.2));
    let trader = MemeTrader::new(
        Arc::clone(&registry),
        aggregator(busy_social(), Arc::new(ConstScorer(0.3)), Arc::clone(&registry)),
        DecisionEngine::default(),
        paper.clone(),
    );

    let report = trader.tick().await.unwrap();
    let order = report.executed().next().expect("an order");
    assert_eq!(order.side, OrderSide::Buy);
    // 500 * 0.1 * 3 = 150, capped at 100
    assert_relative_eq!(order.quote_qty, 100.0);
    assert_relative_eq!(order.executed_qty, 500.0, epsilon = 1e-6);

    assert_relative_eq!(paper.get_free_balance("USDT").await.unwrap(), 400.0);
    assert_relative_eq!(paper.get_free_balance("DOGE").await.unwrap(), 500.0, epsilon = 1e-6);
}

#[tokio::test]
async fn test_trader_respects_minimum_balance() {
    let registry = doge_registry();
    let exchange = Arc::new(FakeExchange::new().with_balance("USDT", 20.0));
    let trader = MemeTrader::new(
        Arc::clone(&registry),
        aggregator(busy_social(), Arc::new(ConstScorer(0.3)), Arc::clone(&registry)),
        DecisionEngine::default(),
        exchange.clone(),
    );

    let report = trader.tick().await.unwrap();
    assert!(matches!(
        report.get("DOGEUSDT").unwrap().outcome,
        TokenOutcome::NoOp { reason: NoOpReason::InsufficientQuoteBalance { .. }, .. }
    ));
    assert!(exchange.get_orders().is_empty());
}

#[tokio::test]
async fn test_sell_band_liquidates_full_base_balance() {
    // A sell band at 0 makes a quiet token a sell signal
    let thresholds = ScoringThresholds {
        sell_strength: 0,
        ..ScoringThresholds::default()
    };
    let registry = doge_registry();
    let paper = Arc::new(
        PaperExchange::new("USDT", 0.0)
            .with_price("DOGEUSDT", 0.25)
            .with_balance("DOGE", 1234.5),
    );
    let trader = MemeTrader::new(
        Arc::clone(&registry),
        aggregator(FakeSocialClient::new(), Arc::new(ConstScorer(0.0)), Arc::clone(&registry)),
        DecisionEngine::new(thresholds, SizingConfig::default()),
        paper.clone(),
    );

    let report = trader.tick().await.unwrap();
    let order = report.executed().next().expect("a sell");
    assert_eq!(order.side, OrderSide::Sell);
    assert_relative_eq!(order.executed_qty, 1234.5);
    assert_relative_eq!(paper.get_free_balance("DOGE").await.unwrap(), 0.0);
    assert_relative_eq!(paper.get_free_balance("USDT").await.unwrap(), 308.625);
}

// ============================================================================
// Config wiring
// ============================================================================

#[tokio::test]
async fn test_config_file_drives_trader() {
    let content = r##"
[trading]
max_trade_amount = 40.0
min_trade_amount = 10.0

[scoring]
volume_threshold = 50

[[tokens]]
symbol = "DOGE"
keywords = ["$DOGE", "#dogecoin"]
tracked_accounts = ["elonmusk", "dogecoin"]
"##;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();

    let config = load_config(file.path()).unwrap();
    let strategy = StrategyConfig::from(&config);
    let registry = Arc::new(config.token_registry().unwrap());
    let exchange = Arc::new(FakeExchange::new().with_balance("USDT", 1000.0).with_symbols(&["DOGEUSDT"]));

    let trader = MemeTrader::new(
        Arc::clone(&registry),
        aggregator(busy_social(), Arc::new(ConstScorer(0.3)), Arc::clone(&registry)),
        DecisionEngine::new(strategy.scoring, strategy.sizing),
        exchange.clone(),
    )
    .with_poll_interval(config.trading.poll_interval());

    let report = trader.tick().await.unwrap();
    let doge = report.get("DOGEUSDT").unwrap();
    assert_eq!(doge.outcome.signal().unwrap().strength, 4);

    let orders = exchange.get_orders();
    assert_eq!(orders.len(), 1);
    assert_relative_eq!(orders[0].2, 40.0);
}
