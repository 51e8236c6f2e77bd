use std::fmt;
use serde::{Deserialize, Serialize};

/// What the decision engine wants to do with a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalAction {
    /// No trade
    Hold,
    Buy,
    Sell,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Hold => write!(f, "hold"),
            SignalAction::Buy => write!(f, "buy"),
            SignalAction::Sell => write!(f, "sell"),
        }
    }
}

/// Trading signal derived from a metrics summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    /// One increment per satisfied rule
    pub strength: i32,
    /// Names of the rules that fired, in evaluation order
    pub reasons: Vec<String>,
}

impl Signal {
    pub fn hold() -> Self {
        Self {
            action: SignalAction::Hold,
            strength: 0,
            reasons: Vec::new(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.action != SignalAction::Hold
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (strength {})", self.action, self.strength)?;
        if !self.reasons.is_empty() {
            write!(f, ": {}", self.reasons.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_is_not_actionable() {
        let signal = Signal::hold();
        assert!(!signal.is_actionable());
        assert_eq!(signal.to_string(), "hold (strength 0)");
    }

    #[test]
    fn test_display_lists_reasons() {
        let signal = Signal {
            action: SignalAction::Buy,
            strength: 3,
            reasons: vec![
                "High positive sentiment".to_string(),
                "Multiple viral tweets".to_string(),
                "Key influencer activity".to_string(),
            ],
        };
        assert!(signal.is_actionable());
        assert_eq!(
            signal.to_string(),
            "buy (strength 3): High positive sentiment, Multiple viral tweets, Key influencer activity"
        );
    }
}
