//! Domain enums and the per-source metadata union.
//!
//! Enum values are stored as `TEXT` in Postgres; `as_str`/`parse` keep the
//! Rust side typed while the storage side stays plain strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Source, "source", {
    Trustpilot => "trustpilot",
    G2 => "g2",
    NewsApi => "newsapi",
    Reddit => "reddit",
    Youtube => "youtube",
    Twitter => "twitter",
});

impl Source {
    /// The fixed collector registry order. Review platforms first so rated
    /// content lands before the social sweep touches the classifier.
    pub const ALL: [Source; 6] = [
        Source::Trustpilot,
        Source::G2,
        Source::NewsApi,
        Source::Reddit,
        Source::Youtube,
        Source::Twitter,
    ];

    /// Human-readable name for notification rendering.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Source::Trustpilot => "Trustpilot",
            Source::G2 => "G2",
            Source::NewsApi => "News",
            Source::Reddit => "Reddit",
            Source::Youtube => "YouTube",
            Source::Twitter => "X/Twitter",
        }
    }
}

string_enum!(Sentiment, "sentiment", {
    Positive => "positive",
    Neutral => "neutral",
    Negative => "negative",
});

string_enum!(Priority, "priority", {
    Critical => "critical",
    Warning => "warning",
    Info => "info",
});

impl Priority {
    /// Immediate alerts are only ever evaluated for critical and warning;
    /// info-tier items surface through the daily digest alone.
    #[must_use]
    pub const fn is_alertable(self) -> bool {
        matches!(self, Priority::Critical | Priority::Warning)
    }
}

string_enum!(Channel, "channel", {
    Slack => "slack",
    Telegram => "telegram",
    Email => "email",
});

/// Source-specific facts attached to a mention, stored as JSONB.
///
/// Modeled as a tagged union rather than a free-form map so each source's
/// shape is checked at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MentionMetadata {
    Review {
        rating: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pros: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cons: Option<String>,
    },
    Social {
        engagement: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        comments: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subreddit: Option<String>,
    },
    News {
        publisher: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    Video {
        channel_title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thumbnail_url: Option<String>,
    },
}

impl MentionMetadata {
    /// Serializes to the JSONB value stored alongside the mention.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn source_round_trips_through_str() {
        for source in Source::ALL {
            assert_eq!(Source::from_str(source.as_str()).unwrap(), source);
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Source::from_str("myspace").is_err());
    }

    #[test]
    fn info_priority_is_not_alertable() {
        assert!(Priority::Critical.is_alertable());
        assert!(Priority::Warning.is_alertable());
        assert!(!Priority::Info.is_alertable());
    }

    #[test]
    fn review_metadata_serializes_with_kind_tag() {
        let meta = MentionMetadata::Review {
            rating: 1,
            pros: None,
            cons: Some("slow support".to_string()),
        };
        let json = meta.to_json();
        assert_eq!(json["kind"], "review");
        assert_eq!(json["rating"], 1);
        assert_eq!(json["cons"], "slow support");
        assert!(json.get("pros").is_none());
    }

    #[test]
    fn social_metadata_round_trips() {
        let meta = MentionMetadata::Social {
            engagement: 1200,
            comments: Some(34),
            subreddit: Some("fintech".to_string()),
        };
        let json = meta.to_json();
        let back: MentionMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
