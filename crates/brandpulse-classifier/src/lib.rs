//! Sentiment and priority classification backed by a chat-completion API.
//!
//! The [`ClassifierClient`] talks to an OpenAI-compatible endpoint for
//! sentiment scoring, digest prose, and live social search. Everything
//! downstream of the model is deterministic: the priority ladder in
//! [`detect_priority`] and the rating fallback in [`sentiment_from_rating`]
//! run without network access, so collection keeps working when the model
//! does not.

pub mod client;
pub mod error;
pub mod priority;
pub mod types;

pub use client::{sentiment_from_rating, ClassifierClient};
pub use error::ClassifierError;
pub use priority::detect_priority;
pub use types::{SentimentAnalysis, SocialPost};
