//! Priority ladder: maps a classified item onto an alert priority.

use brandpulse_core::{Priority, PriorityPolicy, Sentiment};

use crate::types::SentimentAnalysis;

/// Walks the priority ladder for one classified item.
///
/// Rules are checked top-down, first match wins:
/// 1. A review rating at or below the critical rating is always critical,
///    regardless of what the model said about the text.
/// 2. A strongly negative score is critical on its own.
/// 3. A moderately negative score with high engagement is critical, because
///    reach amplifies damage.
/// 4. A mildly negative score, or a negative label at any score, is a warning.
/// 5. Everything else is informational.
#[must_use]
pub fn detect_priority(
    policy: &PriorityPolicy,
    analysis: &SentimentAnalysis,
    engagement: i64,
    rating: Option<i32>,
) -> Priority {
    if let Some(r) = rating {
        if r <= policy.critical_rating {
            return Priority::Critical;
        }
    }

    if analysis.score <= policy.critical_score {
        return Priority::Critical;
    }

    if analysis.score <= policy.critical_engaged_score && engagement > policy.high_engagement {
        return Priority::Critical;
    }

    if analysis.score <= policy.warning_score || analysis.sentiment == Sentiment::Negative {
        return Priority::Warning;
    }

    Priority::Info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(sentiment: Sentiment, score: f32) -> SentimentAnalysis {
        SentimentAnalysis {
            sentiment,
            score,
            confidence: 0.9,
            topics: vec![],
        }
    }

    fn policy() -> PriorityPolicy {
        PriorityPolicy::default()
    }

    #[test]
    fn low_rating_is_critical_even_when_text_reads_positive() {
        let a = analysis(Sentiment::Positive, 0.8);
        assert_eq!(
            detect_priority(&policy(), &a, 0, Some(1)),
            Priority::Critical
        );
        assert_eq!(
            detect_priority(&policy(), &a, 0, Some(2)),
            Priority::Critical
        );
    }

    #[test]
    fn rating_above_critical_cutoff_does_not_short_circuit() {
        let a = analysis(Sentiment::Positive, 0.8);
        assert_eq!(detect_priority(&policy(), &a, 0, Some(3)), Priority::Info);
    }

    #[test]
    fn strongly_negative_score_is_critical() {
        let a = analysis(Sentiment::Negative, -0.5);
        assert_eq!(detect_priority(&policy(), &a, 0, None), Priority::Critical);
    }

    #[test]
    fn moderate_negative_needs_high_engagement_for_critical() {
        let a = analysis(Sentiment::Negative, -0.3);
        assert_eq!(
            detect_priority(&policy(), &a, 1001, None),
            Priority::Critical
        );
        // At exactly the threshold, engagement is not "high".
        assert_eq!(
            detect_priority(&policy(), &a, 1000, None),
            Priority::Warning
        );
    }

    #[test]
    fn mild_negative_score_is_warning() {
        let a = analysis(Sentiment::Neutral, -0.2);
        assert_eq!(detect_priority(&policy(), &a, 0, None), Priority::Warning);
    }

    #[test]
    fn negative_label_is_warning_even_with_flat_score() {
        let a = analysis(Sentiment::Negative, 0.0);
        assert_eq!(detect_priority(&policy(), &a, 0, None), Priority::Warning);
    }

    #[test]
    fn neutral_and_positive_are_info() {
        assert_eq!(
            detect_priority(&policy(), &analysis(Sentiment::Neutral, 0.0), 5000, None),
            Priority::Info
        );
        assert_eq!(
            detect_priority(&policy(), &analysis(Sentiment::Positive, 0.7), 0, Some(5)),
            Priority::Info
        );
    }
}
