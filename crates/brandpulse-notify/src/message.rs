//! Channel-agnostic message content for alerts and digests.

use brandpulse_core::{truncate, Priority, Source};
use brandpulse_db::MentionRow;

/// Alert snippets are capped so channel payloads stay scannable.
const SNIPPET_CHARS: usize = 200;

/// The rendered facts of one immediate alert, before channel formatting.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub priority: Priority,
    pub brand_name: String,
    pub source_label: String,
    pub snippet: String,
    pub author: String,
    pub url: String,
}

impl AlertMessage {
    #[must_use]
    pub fn from_mention(brand_name: &str, mention: &MentionRow, priority: Priority) -> Self {
        let source_label = mention
            .source
            .parse::<Source>()
            .map_or_else(|_| mention.source.clone(), |s| s.display_name().to_string());

        Self {
            priority,
            brand_name: brand_name.to_string(),
            source_label,
            snippet: truncate(&mention.content, SNIPPET_CHARS),
            author: mention.author.clone(),
            url: mention.url.clone(),
        }
    }

    /// Plain-text rendering, used for the audit trail and as the fallback
    /// text on rich channels.
    #[must_use]
    pub fn plain_text(&self) -> String {
        format!(
            "{} {} mention of {} on {} by {}: \"{}\" {}",
            self.emoji(),
            self.priority.as_str().to_uppercase(),
            self.brand_name,
            self.source_label,
            self.author,
            self.snippet,
            self.url,
        )
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self.priority {
            Priority::Critical => "\u{1f6a8}",
            Priority::Warning => "\u{26a0}\u{fe0f}",
            Priority::Info => "\u{2139}\u{fe0f}",
        }
    }
}

/// The rendered facts of one daily digest, before channel formatting.
#[derive(Debug, Clone)]
pub struct DigestMessage {
    pub digest_date: chrono::NaiveDate,
    pub summary: String,
    pub mention_count: i64,
    pub review_count: i64,
    pub sentiment_label: String,
    /// Pre-rendered highlight lines, best first.
    pub highlights: Vec<String>,
}

impl DigestMessage {
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = format!(
            "Daily digest for {}: {} mentions, {} reviews, overall {} sentiment.\n{}",
            self.digest_date, self.mention_count, self.review_count, self.sentiment_label,
            self.summary,
        );
        for line in &self.highlights {
            out.push_str("\n- ");
            out.push_str(line);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandpulse_core::Sentiment;
    use chrono::Utc;

    fn mention(content: &str) -> MentionRow {
        MentionRow {
            id: 1,
            brand_id: 1,
            source: "trustpilot".to_string(),
            source_id: "tp-1".to_string(),
            title: None,
            content: content.to_string(),
            url: "https://www.trustpilot.com/review/acme#tp-1".to_string(),
            author: "Pat".to_string(),
            sentiment: Sentiment::Negative.as_str().to_string(),
            sentiment_score: -0.7,
            priority: Priority::Critical.as_str().to_string(),
            region: None,
            metadata: serde_json::json!({}),
            published_at: Utc::now(),
            alert_sent: false,
            digest_included: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn alert_text_carries_priority_source_and_author() {
        let msg = AlertMessage::from_mention("Acme", &mention("Billed twice"), Priority::Critical);
        let text = msg.plain_text();
        assert!(text.contains("CRITICAL"));
        assert!(text.contains("Trustpilot"));
        assert!(text.contains("Pat"));
        assert!(text.contains("Billed twice"));
    }

    #[test]
    fn long_content_is_cut_to_the_snippet_cap() {
        let long = "x".repeat(500);
        let msg = AlertMessage::from_mention("Acme", &mention(&long), Priority::Warning);
        assert_eq!(msg.snippet, format!("{}...", "x".repeat(200)));
    }
}
