//! Alerting policy thresholds.
//!
//! These are policy values, not derived quantities. They live in one place
//! as named, overridable fields so callers never duplicate the numbers.

/// Thresholds driving the priority ladder and digest sentiment labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityPolicy {
    /// A sentiment score at or below this is critical on its own.
    pub critical_score: f32,
    /// A score at or below this is critical when combined with high engagement.
    pub critical_engaged_score: f32,
    /// A score at or below this is a warning.
    pub warning_score: f32,
    /// Combined engagement count (likes + shares + comments) considered "high".
    pub high_engagement: i64,
    /// Average daily score above this labels a digest "Positive".
    pub positive_label_score: f32,
    /// Average daily score below this labels a digest "Negative".
    pub negative_label_score: f32,
    /// Ratings at or below this (1-5 scale) short-circuit to critical.
    pub critical_rating: i32,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            critical_score: -0.5,
            critical_engaged_score: -0.3,
            warning_score: -0.2,
            high_engagement: 1000,
            positive_label_score: 0.2,
            negative_label_score: -0.2,
            critical_rating: 2,
        }
    }
}

impl PriorityPolicy {
    /// Maps an average sentiment score onto the digest label.
    #[must_use]
    pub fn sentiment_label(&self, avg_score: f32) -> &'static str {
        if avg_score > self.positive_label_score {
            "Positive"
        } else if avg_score < self.negative_label_score {
            "Negative"
        } else {
            "Neutral"
        }
    }
}
