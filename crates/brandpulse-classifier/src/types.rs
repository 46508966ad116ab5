//! Typed request and response shapes for the chat-completion API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brandpulse_core::Sentiment;

/// One classified piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// Score in `[-1.0, 1.0]`, negative is bad for the brand.
    pub score: f32,
    /// Model self-reported confidence in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Short topic tags the model extracted (e.g. "billing", "support").
    pub topics: Vec<String>,
}

impl SentimentAnalysis {
    /// The fallback used whenever classification cannot run: neutral with
    /// middling confidence, so it never trips an alert on its own.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
            confidence: 0.5,
            topics: Vec::new(),
        }
    }
}

/// The model's raw JSON answer to the sentiment prompt, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSentiment {
    pub sentiment: String,
    pub score: f32,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub topics: Vec<String>,
}

fn default_confidence() -> f32 {
    0.5
}

/// A social post returned by the model's live search.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub retweets: i64,
    #[serde(default)]
    pub replies: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseMessage {
    pub content: String,
}
