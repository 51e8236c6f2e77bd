//! Lexical Sentiment Scoring
//!
//! Deterministic polarity in [-1, 1] from a word list: each known word carries
//! a polarity, a preceding intensifier scales it, a preceding negation flips
//! and halves it, and the text's score is the mean over scored words. Text
//! with no known words scores 0.

use std::collections::HashMap;

/// Anything that turns a post body into a polarity in [-1, 1]
pub trait SentimentScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Words within this distance after a negation are negated
const NEGATION_SCOPE: usize = 3;

const WORDS: &[(&str, f64)] = &[
    // General
    ("good", 0.7),
    ("great", 0.8),
    ("awesome", 1.0),
    ("amazing", 0.6),
    ("excellent", 1.0),
    ("best", 1.0),
    ("love", 0.5),
    ("like", 0.2),
    ("happy", 0.8),
    ("nice", 0.6),
    ("strong", 0.4),
    ("win", 0.8),
    ("winning", 0.5),
    ("huge", 0.4),
    ("exciting", 0.3),
    ("incredible", 0.9),
    ("bad", -0.7),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("worst", -1.0),
    ("hate", -0.8),
    ("sad", -0.5),
    ("weak", -0.4),
    ("poor", -0.4),
    ("ugly", -0.7),
    ("lose", -0.5),
    ("losing", -0.5),
    ("lost", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("scary", -0.5),
    ("dead", -0.6),
    // Market slang
    ("bullish", 0.8),
    ("bull", 0.5),
    ("moon", 0.6),
    ("mooning", 0.8),
    ("pump", 0.4),
    ("pumping", 0.5),
    ("rally", 0.6),
    ("breakout", 0.5),
    ("gains", 0.6),
    ("profit", 0.5),
    ("hodl", 0.3),
    ("buy", 0.2),
    ("undervalued", 0.5),
    ("gem", 0.6),
    ("lambo", 0.6),
    ("ath", 0.5),
    ("bearish", -0.8),
    ("bear", -0.5),
    ("dump", -0.6),
    ("dumping", -0.7),
    ("crash", -0.8),
    ("crashing", -0.8),
    ("sell", -0.2),
    ("overvalued", -0.5),
    ("scam", -0.9),
    ("rug", -0.9),
    ("rugged", -1.0),
    ("fud", -0.5),
    ("rekt", -0.8),
    ("bagholder", -0.6),
    ("ponzi", -0.9),
];

const EMOJI: &[(char, f64)] = &[
    ('🚀', 0.8),
    ('🔥', 0.5),
    ('💎', 0.5),
    ('🌕', 0.6),
    ('📈', 0.6),
    ('💰', 0.5),
    ('😀', 0.6),
    ('😍', 0.8),
    ('📉', -0.6),
    ('💩', -0.7),
    ('😡', -0.8),
    ('😭', -0.6),
    ('🤡', -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("super", 1.4),
    ("mega", 1.4),
    ("absolutely", 1.5),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "isnt", "isn't", "wasnt", "wasn't",
    "aint", "ain't", "cant", "can't", "wont", "won't", "nothing", "without",
];

/// Word-list polarity scorer
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
    emoji: HashMap<char, f64>,
    intensifiers: HashMap<String, f64>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            words: WORDS.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
            emoji: EMOJI.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().map(|(w, m)| (w.to_string(), *m)).collect(),
        }
    }

    /// Add or override a word's polarity (clamped to [-1, 1])
    pub fn with_word(mut self, word: &str, polarity: f64) -> Self {
        self.words.insert(word.to_lowercase(), polarity.clamp(-1.0, 1.0));
        self
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|raw| {
                raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negated_for = 0usize;
        let mut intensity = 1.0;

        for token in Self::tokens(text) {
            if NEGATIONS.contains(&token.as_str()) {
                negated_for = NEGATION_SCOPE;
                continue;
            }
            if let Some(m) = self.intensifiers.get(&token) {
                intensity = *m;
                continue;
            }

            if let Some(p) = self.words.get(&token) {
                let mut score = p * intensity;
                if negated_for > 0 {
                    score *= -0.5;
                    negated_for = 0;
                }
                scores.push(score.clamp(-1.0, 1.0));
            } else {
                negated_for = negated_for.saturating_sub(1);
            }
            intensity = 1.0;
        }

        scores.extend(text.chars().filter_map(|c| self.emoji.get(&c).copied()));

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}
