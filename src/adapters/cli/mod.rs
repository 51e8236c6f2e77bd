//! CLI Adapter
//!
//! Command-line interface for the meme-pulse binary.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, RunCmd, AnalyzeCmd, PairsCmd, BalanceCmd};

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
