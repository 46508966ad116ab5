//! HTTP client for the chat-completion classifier API.
//!
//! Wraps `reqwest` with bearer auth, typed response deserialization, and the
//! prompt templates used for sentiment scoring, digest summaries, and live
//! social search. Sentiment classification is deliberately infallible at the
//! call site: any failure degrades to [`SentimentAnalysis::neutral`] so a
//! flaky model never stalls a collection run.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::warn;

use brandpulse_core::Sentiment;

use crate::error::ClassifierError;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, RawSentiment, SentimentAnalysis, SocialPost,
};

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

const SENTIMENT_SYSTEM_PROMPT: &str = "You are a brand-sentiment classifier. Respond with a single JSON object \
     and nothing else: {\"sentiment\": \"POSITIVE\"|\"NEUTRAL\"|\"NEGATIVE\", \
     \"score\": number in [-1,1], \"confidence\": number in [0,1], \
     \"topics\": [up to 3 short lowercase tags]}";

const SEARCH_SYSTEM_PROMPT: &str = "You search X (Twitter) for recent posts mentioning a brand. Respond with a \
     JSON array and nothing else. Each element: {\"id\": string, \"text\": string, \
     \"author\": string, \"url\": string or null, \"created_at\": RFC 3339 \
     timestamp, \"likes\": int, \"retweets\": int, \"replies\": int}";

/// Client for an OpenAI-compatible chat-completion API.
///
/// Use [`ClassifierClient::new`] for production or
/// [`ClassifierClient::with_base_url`] to point at a mock server in tests.
pub struct ClassifierClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl ClassifierClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ClassifierError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClassifierError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ClassifierError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Classifies one piece of text mentioning `brand`.
    ///
    /// Never fails: API, network, and parse errors all degrade to
    /// [`SentimentAnalysis::neutral`] with a warning logged, so one flaky
    /// response cannot abort an entire collection run.
    pub async fn analyze_sentiment(&self, brand: &str, text: &str) -> SentimentAnalysis {
        match self.try_analyze_sentiment(brand, text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(brand = %brand, error = %e, "sentiment classification failed, using neutral fallback");
                SentimentAnalysis::neutral()
            }
        }
    }

    /// Like [`ClassifierClient::analyze_sentiment`] but surfaces the error, for
    /// callers that have a better fallback than neutral (e.g. a star rating).
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Http`] on network failure or non-2xx status.
    /// - [`ClassifierError::Deserialize`] if the reply is not the expected JSON.
    /// - [`ClassifierError::ApiError`] for an unknown sentiment label.
    pub async fn try_analyze_sentiment(
        &self,
        brand: &str,
        text: &str,
    ) -> Result<SentimentAnalysis, ClassifierError> {
        let user = format!("Brand: {brand}\n\nText:\n{text}");
        let content = self.chat(SENTIMENT_SYSTEM_PROMPT, &user, None).await?;
        parse_sentiment(&content)
    }

    /// Produces a short prose summary for a daily digest.
    ///
    /// The caller supplies the counts, the overall sentiment label, and up to
    /// a handful of highlight snippets. Falls back to a template at the call
    /// site when this fails, so errors are surfaced rather than swallowed.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Http`] on network failure or non-2xx status.
    /// - [`ClassifierError::ApiError`] if the response has no choices.
    pub async fn generate_digest_summary(
        &self,
        mention_count: i64,
        review_count: i64,
        sentiment_label: &str,
        highlights: &[String],
    ) -> Result<String, ClassifierError> {
        let system = "You write a 2-3 sentence daily brand-monitoring digest for a busy \
             founder. Plain prose, no bullet points, no markdown.";
        let mut user = format!(
            "Yesterday: {mention_count} mentions, {review_count} reviews. \
             Overall sentiment: {sentiment_label}."
        );
        if !highlights.is_empty() {
            user.push_str("\nNotable items:\n");
            for h in highlights {
                user.push_str("- ");
                user.push_str(h);
                user.push('\n');
            }
        }

        let content = self.chat(system, &user, None).await?;
        Ok(content.trim().to_string())
    }

    /// Searches X for recent posts mentioning `brand` via the model's live
    /// search. Returns an empty list when the model finds nothing.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Http`] on network failure or non-2xx status.
    /// - [`ClassifierError::Deserialize`] if the reply is not the expected
    ///   JSON array.
    pub async fn search_social_posts(&self, brand: &str) -> Result<Vec<SocialPost>, ClassifierError> {
        let search = serde_json::json!({
            "mode": "on",
            "sources": [{"type": "x"}],
            "max_search_results": 20,
        });
        let user = format!("Find recent posts mentioning the brand \"{brand}\".");
        let content = self.chat(SEARCH_SYSTEM_PROMPT, &user, Some(search)).await?;

        let stripped = strip_code_fences(&content);
        serde_json::from_str(stripped).map_err(|e| ClassifierError::Deserialize {
            context: format!("search_social_posts(brand={brand})"),
            source: e,
        })
    }

    /// Sends one chat-completion request and returns the first choice's text.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        search_parameters: Option<serde_json::Value>,
    ) -> Result<String, ClassifierError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| ClassifierError::ApiError(format!("invalid endpoint URL: {e}")))?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: 0.2,
            search_parameters,
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ClassifierError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassifierError::ApiError("response contained no choices".to_string()))
    }
}

/// Deterministic sentiment for a star rating, used when the classifier is
/// unavailable or unconfigured. Ratings carry enough signal on their own:
/// 4-5 stars reads positive, 1-2 negative, 3 neutral.
#[must_use]
pub fn sentiment_from_rating(rating: i32) -> SentimentAnalysis {
    let (sentiment, score) = if rating >= 4 {
        (Sentiment::Positive, 0.5)
    } else if rating <= 2 {
        (Sentiment::Negative, -0.5)
    } else {
        (Sentiment::Neutral, 0.0)
    };

    SentimentAnalysis {
        sentiment,
        score,
        confidence: 0.6,
        topics: Vec::new(),
    }
}

/// Parses the model's sentiment reply, tolerating markdown code fences and
/// out-of-range numbers.
fn parse_sentiment(content: &str) -> Result<SentimentAnalysis, ClassifierError> {
    let stripped = strip_code_fences(content);
    let raw: RawSentiment =
        serde_json::from_str(stripped).map_err(|e| ClassifierError::Deserialize {
            context: "sentiment reply".to_string(),
            source: e,
        })?;

    // The prompt asks for uppercase labels; storage uses lowercase.
    let sentiment = raw
        .sentiment
        .to_lowercase()
        .parse::<Sentiment>()
        .map_err(|e| ClassifierError::ApiError(e.to_string()))?;

    Ok(SentimentAnalysis {
        sentiment,
        score: raw.score.clamp(-1.0, 1.0),
        confidence: raw.confidence.clamp(0.0, 1.0),
        topics: raw.topics,
    })
}

/// Strips a leading/trailing markdown code fence, with or without a language
/// tag. Models wrap JSON replies in fences often enough that this is part of
/// the wire format in practice.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
