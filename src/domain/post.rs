use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public engagement counters for a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub like_count: u64,
    pub repost_count: u64,
}

impl Engagement {
    pub fn new(like_count: u64, repost_count: u64) -> Self {
        Self { like_count, repost_count }
    }

    /// True when likes OR reposts are strictly above `threshold`
    pub fn exceeds(&self, threshold: u64) -> bool {
        self.like_count > threshold || self.repost_count > threshold
    }
}

/// A single social-media post. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub engagement: Engagement,
}

impl Post {
    pub fn new(id: &str, text: &str, author: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            author: author.to_string(),
            created_at,
            engagement: Engagement::default(),
        }
    }

    pub fn with_engagement(mut self, like_count: u64, repost_count: u64) -> Self {
        self.engagement = Engagement::new(like_count, repost_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_threshold_is_strict() {
        assert!(!Engagement::new(1000, 1000).exceeds(1000));
        assert!(Engagement::new(1001, 0).exceeds(1000));
        assert!(Engagement::new(0, 1001).exceeds(1000));
    }
}
