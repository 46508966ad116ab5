//! Shared classify-then-store path used by every source collector.
//!
//! Existence is checked before classification so already-stored items never
//! spend a model call. The insert itself still goes through the store-if-new
//! path, so a concurrent run racing on the same item degrades to a no-op.

use chrono::{DateTime, Utc};
use tracing::warn;

use brandpulse_classifier::{detect_priority, sentiment_from_rating, SentimentAnalysis};
use brandpulse_core::{extract_region, sanitize_text, MentionMetadata, Source};
use brandpulse_db::{
    insert_mention_if_new, insert_review_if_new, mention_exists, InsertOutcome, NewMention,
    NewReview,
};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;

/// One unstored item surfaced by a source, before classification.
#[derive(Debug, Clone)]
pub(crate) struct MentionCandidate {
    pub source: Source,
    pub source_id: String,
    pub title: Option<String>,
    pub content: String,
    pub url: String,
    pub author: String,
    /// Combined engagement count feeding the priority ladder.
    pub engagement: i64,
    /// Star rating for review sources; drives the rating short-circuit and
    /// the deterministic classifier fallback.
    pub rating: Option<i32>,
    pub metadata: MentionMetadata,
    pub published_at: DateTime<Utc>,
}

/// Classifies and stores one candidate. Returns `true` when a new row landed.
pub(crate) async fn ingest_mention(
    ctx: &CollectorContext,
    brand: &BrandTarget,
    candidate: MentionCandidate,
) -> Result<bool, CollectorError> {
    if mention_exists(&ctx.pool, candidate.source, &candidate.source_id).await? {
        return Ok(false);
    }

    let content = sanitize_text(&candidate.content);
    let analysis = classify(ctx, brand, &content, candidate.rating).await;
    let priority = detect_priority(&ctx.policy, &analysis, candidate.engagement, candidate.rating);
    let region = extract_region(&content).map(str::to_string);

    let outcome = insert_mention_if_new(
        &ctx.pool,
        &NewMention {
            brand_id: brand.brand_id,
            source: candidate.source,
            source_id: candidate.source_id,
            title: candidate.title,
            content,
            url: candidate.url,
            author: candidate.author,
            sentiment: analysis.sentiment,
            sentiment_score: analysis.score,
            priority,
            region,
            metadata: candidate.metadata,
            published_at: candidate.published_at,
        },
    )
    .await?;

    Ok(outcome == InsertOutcome::Inserted)
}

/// Stores a rated review in the reviews table, then ingests it as a mention
/// so it flows through alerting and digests like everything else.
pub(crate) async fn ingest_review(
    ctx: &CollectorContext,
    brand: &BrandTarget,
    candidate: MentionCandidate,
    pros: Option<String>,
    cons: Option<String>,
) -> Result<bool, CollectorError> {
    let rating = candidate.rating.unwrap_or(3);
    let content = sanitize_text(&candidate.content);

    insert_review_if_new(
        &ctx.pool,
        &NewReview {
            brand_id: brand.brand_id,
            source: candidate.source,
            source_id: candidate.source_id.clone(),
            rating,
            title: candidate.title.clone(),
            content: content.clone(),
            author: candidate.author.clone(),
            sentiment: sentiment_from_rating(rating).sentiment,
            region: extract_region(&content).map(str::to_string),
            pros,
            cons,
            url: candidate.url.clone(),
            published_at: candidate.published_at,
        },
    )
    .await?;

    ingest_mention(ctx, brand, candidate).await
}

/// Sentiment for one item: the model when it answers, a deterministic
/// fallback when it does not. Rated items fall back to the rating; unrated
/// items fall back to neutral.
async fn classify(
    ctx: &CollectorContext,
    brand: &BrandTarget,
    content: &str,
    rating: Option<i32>,
) -> SentimentAnalysis {
    match rating {
        Some(r) => match ctx.classifier.try_analyze_sentiment(&brand.name, content).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(brand = %brand.name, error = %e, "classifier failed, deriving sentiment from rating");
                sentiment_from_rating(r)
            }
        },
        None => ctx.classifier.analyze_sentiment(&brand.name, content).await,
    }
}
