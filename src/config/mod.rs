//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, TradingSection, ScoringSection, SocialSection, ExchangeSection,
    PaperSection, LoggingSection, TokenSection, load_config, parse_config,
};
