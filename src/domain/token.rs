//! Token Profiles
//!
//! A `TokenProfile` says what to search for and whom to watch for one token.
//! The `TokenRegistry` is the typed symbol -> profile mapping consulted before
//! every analysis.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quote asset used to form trading pairs when none is configured
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";

/// Token configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("No profile registered for token: {0}")]
    UnknownToken(String),

    #[error("Token already registered: {0}")]
    DuplicateToken(String),

    #[error("Invalid profile for {symbol}: {reason}")]
    InvalidProfile { symbol: String, reason: String },
}

/// Search keywords and tracked accounts for a single token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenProfile {
    symbol: String,
    quote_asset: String,
    keywords: Vec<String>,
    tracked_accounts: Vec<String>,
}

impl TokenProfile {
    /// Create a profile quoted in the default quote asset.
    ///
    /// The symbol is upper-cased; duplicate keywords and accounts are dropped
    /// while keeping first-seen order.
    pub fn new<K, A>(symbol: &str, keywords: K, tracked_accounts: A) -> Result<Self, ConfigurationError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(ConfigurationError::InvalidProfile {
                symbol,
                reason: "symbol cannot be empty".to_string(),
            });
        }

        let keywords = dedup(keywords);
        let tracked_accounts = dedup(tracked_accounts);

        if keywords.is_empty() && tracked_accounts.is_empty() {
            return Err(ConfigurationError::InvalidProfile {
                symbol,
                reason: "needs at least one keyword or tracked account".to_string(),
            });
        }

        Ok(Self {
            symbol,
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            keywords,
            tracked_accounts,
        })
    }

    /// Quote the token in a different asset (e.g. "USDC")
    pub fn with_quote_asset(mut self, quote_asset: &str) -> Self {
        self.quote_asset = normalize_symbol(quote_asset);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn tracked_accounts(&self) -> &[String] {
        &self.tracked_accounts
    }

    /// Exchange pair symbol, e.g. "DOGEUSDT"
    pub fn pair_symbol(&self) -> String {
        format!("{}{}", self.symbol, self.quote_asset)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn dedup<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item: String = item.into();
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Typed symbol -> profile mapping. Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    profiles: HashMap<String, TokenProfile>,
    order: Vec<String>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the DOGE and SHIB profiles
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for profile in default_profiles() {
            // Default profiles are distinct and non-empty.
            let _ = registry.register(profile);
        }
        registry
    }

    /// Build a registry from a list of profiles, rejecting duplicates
    pub fn from_profiles<I>(profiles: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = TokenProfile>,
    {
        let mut registry = Self::new();
        for profile in profiles {
            registry.register(profile)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, profile: TokenProfile) -> Result<(), ConfigurationError> {
        let symbol = profile.symbol().to_string();
        if self.profiles.contains_key(&symbol) {
            return Err(ConfigurationError::DuplicateToken(symbol));
        }
        self.order.push(symbol.clone());
        self.profiles.insert(symbol, profile);
        Ok(())
    }

    /// Look up a profile by symbol (case-insensitive)
    pub fn get(&self, symbol: &str) -> Result<&TokenProfile, ConfigurationError> {
        let key = normalize_symbol(symbol);
        self.profiles
            .get(&key)
            .ok_or(ConfigurationError::UnknownToken(key))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.profiles.contains_key(&normalize_symbol(symbol))
    }

    /// Find the profile whose pair symbol matches, e.g. "DOGEUSDT" -> DOGE
    pub fn by_pair(&self, pair: &str) -> Result<&TokenProfile, ConfigurationError> {
        let pair = normalize_symbol(pair);
        self.iter()
            .find(|p| p.pair_symbol() == pair)
            .ok_or(ConfigurationError::UnknownToken(pair))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenProfile> {
        self.order.iter().filter_map(|s| self.profiles.get(s))
    }

    pub fn symbols(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn default_profiles() -> Vec<TokenProfile> {
    let doge = TokenProfile::new(
        "DOGE",
        ["#dogecoin", "$DOGE", "doge coin"],
        ["elonmusk", "dogecoin"],
    );
    let shib = TokenProfile::new(
        "SHIB",
        ["#SHIB", "$SHIB", "shiba inu", "#SHIBARMY"],
        ["Shibtoken", "ShytoshiKusama"],
    );
    [doge, shib].into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_normalizes_symbol_and_dedups() {
        let profile = TokenProfile::new("doge ", ["$DOGE", "$DOGE", " #dogecoin"], ["elonmusk"]).unwrap();
        assert_eq!(profile.symbol(), "DOGE");
        assert_eq!(profile.keywords(), &["$DOGE".to_string(), "#dogecoin".to_string()]);
        assert_eq!(profile.pair_symbol(), "DOGEUSDT");
    }

    #[test]
    fn test_profile_requires_sources() {
        let empty: [&str; 0] = [];
        let err = TokenProfile::new("PEPE", empty, empty).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidProfile { .. }));
    }

    #[test]
    fn test_custom_quote_asset() {
        let profile = TokenProfile::new("BONK", ["$BONK"], ["bonk_inu"])
            .unwrap()
            .with_quote_asset("usdc");
        assert_eq!(profile.pair_symbol(), "BONKUSDC");
    }

    #[test]
    fn test_unknown_symbol_is_configuration_error() {
        let registry = TokenRegistry::with_defaults();
        assert_eq!(
            registry.get("FLOKI").unwrap_err(),
            ConfigurationError::UnknownToken("FLOKI".to_string())
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::with_defaults();
        assert_eq!(registry.get("doge").unwrap().symbol(), "DOGE");
        assert_eq!(registry.by_pair("shibusdt").unwrap().symbol(), "SHIB");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = TokenRegistry::with_defaults();
        let dup = TokenProfile::new("DOGE", ["doge"], ["x"]).unwrap();
        assert!(matches!(registry.register(dup), Err(ConfigurationError::DuplicateToken(_))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iteration_keeps_registration_order() {
        let registry = TokenRegistry::with_defaults();
        let symbols: Vec<&str> = registry.iter().map(|p| p.symbol()).collect();
        assert_eq!(symbols, vec!["DOGE", "SHIB"]);
    }
}
