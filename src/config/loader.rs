//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section has
//! defaults, so a file only needs to name what it overrides.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{ConfigurationError, TokenProfile, TokenRegistry};
use crate::strategy::params::{AggregatorConfig, ScoringThresholds, SizingConfig, StrategyConfig};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trading: TradingSection,
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub social: SocialSection,
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub paper: PaperSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenSection>,
}

/// Trading loop and sizing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingSection {
    /// Hard cap on buy notional, in quote currency
    pub max_trade_amount: f64,
    /// Free quote balance must exceed this to buy
    pub min_trade_amount: f64,
    /// Share of free quote balance per unit of signal strength
    pub position_fraction: f64,
    pub quote_asset: String,
    /// Seconds between cycles
    pub poll_interval_secs: u64,
    /// Seconds to wait after a failed cycle
    pub error_backoff_secs: u64,
    /// Social lookback window in hours
    pub lookback_hours: i64,
    /// Use the in-memory paper exchange
    pub paper: bool,
}

impl Default for TradingSection {
    fn default() -> Self {
        Self {
            max_trade_amount: 100.0,
            min_trade_amount: 20.0,
            position_fraction: 0.1,
            quote_asset: "USDT".to_string(),
            poll_interval_secs: 300,
            error_backoff_secs: 60,
            lookback_hours: 24,
            paper: false,
        }
    }
}

impl TradingSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// Scoring rule thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub sentiment_threshold: f64,
    pub viral_count_threshold: usize,
    pub influencer_threshold: usize,
    pub volume_threshold: usize,
    pub buy_strength: i32,
    pub sell_strength: i32,
}

impl Default for ScoringSection {
    fn default() -> Self {
        let defaults = ScoringThresholds::default();
        Self {
            sentiment_threshold: defaults.sentiment,
            viral_count_threshold: defaults.viral_count,
            influencer_threshold: defaults.influencer_mentions,
            volume_threshold: defaults.volume,
            buy_strength: defaults.buy_strength,
            sell_strength: defaults.sell_strength,
        }
    }
}

/// Social API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialSection {
    pub api_url: String,
    /// Prefer TWITTER_BEARER_TOKEN in the environment
    pub bearer_token: Option<String>,
    /// Results requested per keyword search (10-100)
    pub max_results: u32,
    /// Likes or reposts above this make a post viral
    pub viral_engagement_threshold: u64,
}

impl Default for SocialSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.twitter.com/2".to_string(),
            bearer_token: None,
            max_results: 100,
            viral_engagement_threshold: 1000,
        }
    }
}

impl SocialSection {
    /// Bearer token with environment variable override
    /// Checks TWITTER_BEARER_TOKEN first, falls back to config value
    pub fn get_bearer_token(&self) -> Option<String> {
        env_or("TWITTER_BEARER_TOKEN", &self.bearer_token)
    }
}

/// Exchange API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeSection {
    pub api_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub recv_window_ms: u64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.binance.com".to_string(),
            api_key: None,
            api_secret: None,
            recv_window_ms: 5000,
        }
    }
}

impl ExchangeSection {
    /// Checks BINANCE_API_KEY first, falls back to config value
    pub fn get_api_key(&self) -> Option<String> {
        env_or("BINANCE_API_KEY", &self.api_key)
    }

    /// Checks BINANCE_API_SECRET first, falls back to config value
    pub fn get_api_secret(&self) -> Option<String> {
        env_or("BINANCE_API_SECRET", &self.api_secret)
    }
}

/// Paper exchange seed state
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaperSection {
    /// Starting quote balance
    pub starting_balance: f64,
    /// Reference fill price per pair; unlisted configured pairs fill at 1.0
    pub prices: BTreeMap<String, f64>,
}

impl Default for PaperSection {
    fn default() -> Self {
        Self {
            starting_balance: 1000.0,
            prices: BTreeMap::new(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file (in addition to stdout)
    pub log_to_file: bool,
    /// Directory for the rolling log file
    pub log_dir: String,
    /// Log file name prefix
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
            log_dir: "logs".to_string(),
            log_file: "trading_bot.log".to_string(),
        }
    }
}

/// One `[[tokens]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSection {
    pub symbol: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tracked_accounts: Vec<String>,
}

fn default_tokens() -> Vec<TokenSection> {
    TokenRegistry::with_defaults()
        .iter()
        .map(|p| TokenSection {
            symbol: p.symbol().to_string(),
            keywords: p.keywords().to_vec(),
            tracked_accounts: p.tracked_accounts().to_vec(),
        })
        .collect()
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.clone().filter(|v| !v.is_empty()))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigurationError> for ConfigError {
    fn from(e: ConfigurationError) -> Self {
        ConfigError::ValidationError(e.to_string())
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trading = &self.trading;

        if trading.max_trade_amount <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_trade_amount must be > 0, got {}",
                trading.max_trade_amount
            )));
        }

        if trading.min_trade_amount <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_trade_amount must be > 0, got {}",
                trading.min_trade_amount
            )));
        }

        if trading.min_trade_amount > trading.max_trade_amount {
            return Err(ConfigError::ValidationError(format!(
                "min_trade_amount ({}) cannot exceed max_trade_amount ({})",
                trading.min_trade_amount, trading.max_trade_amount
            )));
        }

        if trading.position_fraction <= 0.0 || trading.position_fraction > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "position_fraction must be in (0, 1], got {}",
                trading.position_fraction
            )));
        }

        if trading.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if trading.quote_asset.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "quote_asset cannot be empty".to_string(),
            ));
        }

        if self.tokens.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[tokens]] entry is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for token in &self.tokens {
            if !seen.insert(token.symbol.trim().to_uppercase()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate token symbol: {}",
                    token.symbol
                )));
            }
        }

        // Profile construction covers empty symbols and empty keyword/account lists
        self.token_registry()?;

        StrategyConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }

    /// Build the token registry from `[[tokens]]`, in file order
    pub fn token_registry(&self) -> Result<TokenRegistry, ConfigurationError> {
        let profiles = self
            .tokens
            .iter()
            .map(|t| {
                TokenProfile::new(&t.symbol, t.keywords.iter(), t.tracked_accounts.iter())
                    .map(|p| p.with_quote_asset(&self.trading.quote_asset))
            })
            .collect::<Result<Vec<_>, _>>()?;
        TokenRegistry::from_profiles(profiles)
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            aggregator: AggregatorConfig {
                max_results: config.social.max_results,
                viral_engagement_threshold: config.social.viral_engagement_threshold,
                lookback_hours: config.trading.lookback_hours,
            },
            scoring: ScoringThresholds {
                sentiment: config.scoring.sentiment_threshold,
                viral_count: config.scoring.viral_count_threshold,
                influencer_mentions: config.scoring.influencer_threshold,
                volume: config.scoring.volume_threshold,
                buy_strength: config.scoring.buy_strength,
                sell_strength: config.scoring.sell_strength,
            },
            sizing: SizingConfig {
                max_trade_amount: config.trading.max_trade_amount,
                min_trade_amount: config.trading.min_trade_amount,
                position_fraction: config.trading.position_fraction,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r##"
[trading]
max_trade_amount = 150.0
min_trade_amount = 25.0
position_fraction = 0.05
quote_asset = "USDT"
poll_interval_secs = 120
error_backoff_secs = 30
lookback_hours = 12

[scoring]
sentiment_threshold = 0.25
volume_threshold = 500

[social]
max_results = 50
viral_engagement_threshold = 2000

[paper]
starting_balance = 250.0
prices = { DOGEUSDT = 0.2 }

[logging]
level = "debug"
log_to_file = false

[[tokens]]
symbol = "pepe"
keywords = ["#pepe", "$PEPE"]
tracked_accounts = ["pepecoineth"]

[[tokens]]
symbol = "DOGE"
keywords = ["$DOGE"]
"##
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.trading.max_trade_amount, 150.0);
        assert_eq!(config.trading.poll_interval(), Duration::from_secs(120));
        assert_eq!(config.scoring.volume_threshold, 500);
        // Unset scoring fields keep their defaults
        assert_eq!(config.scoring.buy_strength, 3);
        assert_eq!(config.social.max_results, 50);
        assert_eq!(config.paper.prices.get("DOGEUSDT"), Some(&0.2));
        assert_eq!(config.tokens.len(), 2);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.trading.max_trade_amount, 100.0);
        assert_eq!(config.trading.min_trade_amount, 20.0);
        assert_eq!(config.trading.poll_interval_secs, 300);
        assert_eq!(config.trading.error_backoff_secs, 60);
        assert_eq!(config.logging.log_file, "trading_bot.log");

        let registry = config.token_registry().unwrap();
        assert_eq!(registry.symbols(), vec!["DOGE", "SHIB"]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("[trading\nmax_trade_amount = ");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let result = parse_config("[trading]\nmax_trade_amount = 10.0\nmin_trade_amount = 20.0\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_position_fraction() {
        let result = parse_config("[trading]\nposition_fraction = 1.5\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = parse_config("[trading]\npoll_interval_secs = 0\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_max_results_out_of_range() {
        let result = parse_config("[social]\nmax_results = 500\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        let content = r#"
[[tokens]]
symbol = "DOGE"
keywords = ["$DOGE"]

[[tokens]]
symbol = "doge"
keywords = ["doge coin"]
"#;
        let err = parse_config(content).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_token_without_sources_rejected() {
        let content = r#"
[[tokens]]
symbol = "BONK"
"#;
        let result = parse_config(content);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_token_registry_preserves_file_order() {
        let config = parse_config(&create_valid_config()).unwrap();
        let registry = config.token_registry().unwrap();

        assert_eq!(registry.symbols(), vec!["PEPE", "DOGE"]);
        assert_eq!(registry.get("pepe").unwrap().pair_symbol(), "PEPEUSDT");
        assert!(registry.get("DOGE").unwrap().tracked_accounts().is_empty());
    }

    #[test]
    fn test_config_to_strategy_config() {
        let config = parse_config(&create_valid_config()).unwrap();
        let strategy_config = StrategyConfig::from(&config);

        assert_eq!(strategy_config.aggregator.max_results, 50);
        assert_eq!(strategy_config.aggregator.viral_engagement_threshold, 2000);
        assert_eq!(strategy_config.aggregator.lookback_hours, 12);
        assert_eq!(strategy_config.scoring.sentiment, 0.25);
        assert_eq!(strategy_config.sizing.max_trade_amount, 150.0);
        assert_eq!(strategy_config.sizing.position_fraction, 0.05);
    }

    #[test]
    fn test_config_value_used_without_env() {
        let section = ExchangeSection {
            api_key: Some("from-file".to_string()),
            ..ExchangeSection::default()
        };
        // Only meaningful when the variable is not set in the test environment
        if std::env::var("BINANCE_API_KEY").is_err() {
            assert_eq!(section.get_api_key().as_deref(), Some("from-file"));
        }
        assert_eq!(env_or("MEME_PULSE_UNSET_TEST_VAR", &Some(String::new())), None);
    }
}
