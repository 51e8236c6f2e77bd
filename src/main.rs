//! Meme Pulse - social-signal meme token trader
//!
//! Binary entry point: loads configuration, wires adapters and runs the
//! selected command.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meme_pulse::adapters::binance::{BinanceClient, BinanceConfig};
use meme_pulse::adapters::cli::{self, AnalyzeCmd, BalanceCmd, Command, PairsCmd, RunCmd};
use meme_pulse::adapters::twitter::{TwitterClient, TwitterConfig};
use meme_pulse::adapters::PaperExchange;
use meme_pulse::application::{CycleReport, MemeTrader, TokenOutcome};
use meme_pulse::config::{load_config, Config, LoggingSection};
use meme_pulse::domain::TokenRegistry;
use meme_pulse::ports::{ExchangeClient, SocialMediaClient};
use meme_pulse::strategy::{
    DecisionEngine, LexiconScorer, SignalAggregator, StrategyConfig, MAX_LOOKBACK_HOURS,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();

    let config_path = shellexpand::tilde(&app.command.config_path().to_string_lossy()).to_string();
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(app.verbose, app.debug, &config.logging)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Analyze(cmd) => analyze_command(cmd, config).await,
        Command::Pairs(cmd) => pairs_command(cmd, config).await,
        Command::Balance(cmd) => balance_command(cmd, config).await,
    }
}

/// Console logging plus an optional daily-rolling file.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(verbose: bool, debug: bool, logging: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = if logging.log_to_file {
        let log_dir = shellexpand::tilde(&logging.log_dir).to_string();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir))?;
        let appender = tracing_appender::rolling::daily(&log_dir, &logging.log_file);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn build_social(config: &Config) -> Result<Arc<dyn SocialMediaClient>> {
    let bearer_token = config
        .social
        .get_bearer_token()
        .context("No Twitter bearer token: set TWITTER_BEARER_TOKEN or social.bearer_token")?;

    let client = TwitterClient::with_config(TwitterConfig {
        api_base_url: config.social.api_url.clone(),
        bearer_token,
        ..TwitterConfig::default()
    })
    .context("Failed to create Twitter client")?;

    Ok(Arc::new(client))
}

fn build_exchange(config: &Config, registry: &TokenRegistry, paper: bool) -> Result<Arc<dyn ExchangeClient>> {
    if paper {
        tracing::warn!("PAPER TRADING MODE - orders fill against an in-memory book");
        let mut exchange = PaperExchange::new(&config.trading.quote_asset, config.paper.starting_balance);
        for (pair, price) in &config.paper.prices {
            exchange = exchange.with_price(pair, *price);
        }
        for profile in registry.iter() {
            let pair = profile.pair_symbol();
            if !config.paper.prices.contains_key(&pair) {
                exchange = exchange.with_price(&pair, 1.0);
            }
        }
        return Ok(Arc::new(exchange));
    }

    let (Some(api_key), Some(api_secret)) = (config.exchange.get_api_key(), config.exchange.get_api_secret()) else {
        bail!(
            "Binance credentials missing: set BINANCE_API_KEY and BINANCE_API_SECRET \
             (or run with --paper)"
        );
    };

    let client = BinanceClient::with_config(BinanceConfig {
        api_base_url: config.exchange.api_url.clone(),
        api_key,
        api_secret,
        recv_window_ms: config.exchange.recv_window_ms,
        ..BinanceConfig::default()
    })
    .context("Failed to create Binance client")?;

    Ok(Arc::new(client))
}

fn build_aggregator(
    config: &Config,
    strategy: &StrategyConfig,
    registry: Arc<TokenRegistry>,
) -> Result<SignalAggregator> {
    Ok(SignalAggregator::new(
        build_social(config)?,
        Arc::new(LexiconScorer::new()),
        registry,
        strategy.aggregator.clone(),
    ))
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!("Starting meme-pulse...");

    let paper = cmd.paper || config.trading.paper;
    let strategy = StrategyConfig::from(&config);
    let registry = Arc::new(config.token_registry().context("Invalid token configuration")?);

    let aggregator = build_aggregator(&config, &strategy, Arc::clone(&registry))?;
    let exchange = build_exchange(&config, &registry, paper)?;
    let engine = DecisionEngine::new(strategy.scoring.clone(), strategy.sizing.clone());

    let trader = MemeTrader::new(Arc::clone(&registry), aggregator, engine, exchange)
        .with_quote_asset(&config.trading.quote_asset)
        .with_poll_interval(config.trading.poll_interval())
        .with_error_backoff(config.trading.error_backoff());

    // Warn about configured pairs the exchange does not list
    match trader.available_pairs().await {
        Ok(listed) => {
            for pair in trader.trading_pairs().await {
                if !listed.contains(&pair) {
                    tracing::warn!(pair = %pair, "Configured pair is not listed on the exchange");
                }
            }
        }
        Err(e) => tracing::warn!("Could not verify trading pairs: {}", e),
    }

    if cmd.once {
        let report = trader.tick().await.context("Cycle failed")?;
        print_report(&report);
        return Ok(());
    }

    // Setup Ctrl+C handler
    let handle = trader.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    trader.run().await?;
    tracing::info!("meme-pulse stopped");
    Ok(())
}

async fn analyze_command(cmd: AnalyzeCmd, config: Config) -> Result<()> {
    let strategy = StrategyConfig::from(&config);
    let registry = Arc::new(config.token_registry().context("Invalid token configuration")?);
    let aggregator = build_aggregator(&config, &strategy, registry)?;
    let engine = DecisionEngine::new(strategy.scoring.clone(), strategy.sizing.clone());

    let lookback = match cmd.hours {
        Some(hours) if !(1..=MAX_LOOKBACK_HOURS).contains(&hours) => {
            bail!("--hours must be 1-{}, got {}", MAX_LOOKBACK_HOURS, hours)
        }
        Some(hours) => chrono::Duration::hours(hours),
        None => strategy.aggregator.lookback(),
    };

    let summary = aggregator
        .analyze(&cmd.symbol, lookback)
        .await
        .with_context(|| format!("Failed to analyze {}", cmd.symbol))?;
    let signal = engine.score(&summary);

    println!("{} over the last {}h", cmd.symbol.to_uppercase(), lookback.num_hours());
    println!("  Volume:              {}", summary.volume);
    println!("  Avg sentiment:       {:.3}", summary.avg_sentiment);
    println!("  Viral posts:         {}", summary.viral_count);
    println!("  Influencer mentions: {}", summary.influencer_mentions);
    println!("  Signal:              {}", signal);

    for viral in summary.viral_posts.iter().take(5) {
        let text: String = viral.text.chars().take(80).collect();
        println!(
            "    [{} likes, {} reposts, {:+.2}] {}",
            viral.engagement.like_count, viral.engagement.repost_count, viral.sentiment, text
        );
    }

    Ok(())
}

async fn pairs_command(_cmd: PairsCmd, config: Config) -> Result<()> {
    let registry = config.token_registry().context("Invalid token configuration")?;
    let exchange = build_exchange(&config, &registry, config.trading.paper)?;
    let quote = config.trading.quote_asset.to_uppercase();

    let symbols = exchange
        .list_tradable_symbols()
        .await
        .context("Failed to list exchange symbols")?;

    let pairs: Vec<_> = symbols
        .into_iter()
        .filter(|s| s.len() > quote.len() && s.ends_with(quote.as_str()))
        .collect();

    println!("{} pairs quoted in {}:", pairs.len(), quote);
    for pair in pairs {
        let marker = if registry.by_pair(&pair).is_ok() { " *" } else { "" };
        println!("  {}{}", pair, marker);
    }

    Ok(())
}

async fn balance_command(cmd: BalanceCmd, config: Config) -> Result<()> {
    let registry = config.token_registry().context("Invalid token configuration")?;
    let exchange = build_exchange(&config, &registry, config.trading.paper)?;
    let asset = cmd.asset.to_uppercase();

    let free = exchange
        .get_free_balance(&asset)
        .await
        .with_context(|| format!("Failed to fetch {} balance", asset))?;

    println!("{}: {:.8} free", asset, free);
    Ok(())
}

fn print_report(report: &CycleReport) {
    println!(
        "Cycle {} ({} pairs, {} skipped, {} failed)",
        report.started_at.format("%Y-%m-%d %H:%M:%S"),
        report.tokens.len(),
        report.skipped(),
        report.failures()
    );
    for token in &report.tokens {
        let line = match &token.outcome {
            TokenOutcome::Misconfigured(e) => format!("misconfigured: {}", e),
            TokenOutcome::Unavailable(reason) => format!("skipped: {}", reason),
            TokenOutcome::Hold(signal) => format!("{}", signal),
            TokenOutcome::NoOp { signal, reason } => format!("{} -> no order ({})", signal, reason),
            TokenOutcome::Executed { signal, order } => format!(
                "{} -> {} {} filled {:.8} for {:.2} (order {})",
                signal, order.side, order.symbol, order.executed_qty, order.quote_qty, order.order_id
            ),
            TokenOutcome::Failed { signal, error } => format!("{} -> failed: {}", signal, error),
        };
        println!("  {:<12} {}", token.pair, line);
    }
}
