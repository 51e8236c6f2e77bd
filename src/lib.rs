//! Meme Pulse - Social-signal meme token trader
//!
//! Watches social-media activity around a fixed set of meme tokens and turns
//! it into market orders on a spot exchange.
//!
//! # Modules
//!
//! - `domain`: Core types (TokenProfile, Post, MetricsSummary, Signal, OrderInstruction)
//! - `ports`: Trait abstractions (ExchangeClient, SocialMediaClient) and test fakes
//! - `strategy`: Signal aggregation, scoring rules and position sizing
//! - `adapters`: External implementations (Twitter, Binance, paper exchange, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: The polling trader

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;

pub use application::{CycleReport, MemeTrader, TokenOutcome, TraderError};
