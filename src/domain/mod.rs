//! Domain Layer - Core types for the social-signal trader
//!
//! Pure data types with no I/O. All external interactions happen through the
//! ports layer.
//!
//! - `token`: TokenProfile and the symbol registry
//! - `post`: social-media posts and their engagement counters
//! - `metrics`: the per-token MetricsSummary
//! - `signal`: trading signal (action, strength, reasons)
//! - `order`: order instructions, balance snapshots, sizing outcomes

pub mod token;
pub mod post;
pub mod metrics;
pub mod signal;
pub mod order;

pub use token::{TokenProfile, TokenRegistry, ConfigurationError, DEFAULT_QUOTE_ASSET};
pub use post::{Post, Engagement};
pub use metrics::{MetricsSummary, ViralPost};
pub use signal::{Signal, SignalAction};
pub use order::{OrderInstruction, OrderSide, BalanceSnapshot, SizingDecision, NoOpReason};
