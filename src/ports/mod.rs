//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Spot exchange access (balances, market orders, symbol listing)
//! - Social-media retrieval (keyword search, account timelines)
//!
//! `mocks` holds recording fakes used by tests and dry runs.

pub mod exchange;
pub mod social;
pub mod mocks;

pub use exchange::{ExchangeClient, ExchangeError, OrderResult};
pub use social::{SocialMediaClient, SocialError};
