//! CLI Commands
//!
//! Argument definitions for the meme-pulse binary.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "config/default.toml";

/// Meme Pulse - social-signal meme token trader for Binance spot
#[derive(Parser, Debug)]
#[command(
    name = "meme-pulse",
    version = env!("CARGO_PKG_VERSION"),
    about = "Social-signal meme token trader for Binance spot",
    long_about = "Meme Pulse watches Twitter activity around meme tokens, scores it against \
                  sentiment, virality, influencer and volume rules, and places sized market \
                  orders on Binance when enough of them fire."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the trading loop
    Run(RunCmd),

    /// Analyze one token and print its metrics and signal (no order)
    Analyze(AnalyzeCmd),

    /// List exchange pairs for the configured quote asset
    Pairs(PairsCmd),

    /// Show the free balance of an asset
    Balance(BalanceCmd),
}

impl Command {
    /// Config file named by whichever command is running
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Run(cmd) => &cmd.config,
            Command::Analyze(cmd) => &cmd.config,
            Command::Pairs(cmd) => &cmd.config,
            Command::Balance(cmd) => &cmd.config,
        }
    }
}

/// Start trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Trade against the in-memory paper exchange
    #[arg(short, long)]
    pub paper: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

/// Analyze a single token
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Token symbol (e.g., DOGE)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Lookback window in hours, 1-168 (defaults to the configured value)
    #[arg(long, value_name = "HOURS", value_parser = clap::value_parser!(i64).range(1..=168))]
    pub hours: Option<i64>,
}

/// List tradable pairs
#[derive(Parser, Debug)]
pub struct PairsCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Show a free balance
#[derive(Parser, Debug)]
pub struct BalanceCmd {
    /// Asset symbol (e.g., USDT)
    #[arg(value_name = "ASSET")]
    pub asset: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_paper() {
        let app = CliApp::try_parse_from(["meme-pulse", "run", "--paper", "-c", "my.toml"]).unwrap();
        match app.command {
            Command::Run(cmd) => {
                assert!(cmd.paper);
                assert!(!cmd.once);
                assert_eq!(cmd.config, PathBuf::from("my.toml"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_with_global_flags() {
        let app = CliApp::try_parse_from(["meme-pulse", "analyze", "DOGE", "--hours", "6", "--debug"]).unwrap();
        assert!(app.debug);
        assert!(!app.verbose);
        match &app.command {
            Command::Analyze(cmd) => {
                assert_eq!(cmd.symbol, "DOGE");
                assert_eq!(cmd.hours, Some(6));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(app.command.config_path(), Path::new(DEFAULT_CONFIG));
    }

    #[test]
    fn test_analyze_hours_out_of_range_rejected() {
        for hours in ["0", "-3", "169", "10000000000"] {
            assert!(CliApp::try_parse_from(["meme-pulse", "analyze", "DOGE", "--hours", hours]).is_err());
        }
        assert!(CliApp::try_parse_from(["meme-pulse", "analyze", "DOGE", "--hours", "168"]).is_ok());
    }

    #[test]
    fn test_balance_requires_asset() {
        assert!(CliApp::try_parse_from(["meme-pulse", "balance"]).is_err());
        assert!(CliApp::try_parse_from(["meme-pulse", "-v", "balance", "USDT"]).is_ok());
    }
}
