//! Database operations for the `mentions` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use brandpulse_core::{MentionMetadata, Priority, Sentiment, Source};

use crate::{is_unique_violation, DbError};

/// A row from the `mentions` table. Enum columns stay strings at this layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MentionRow {
    pub id: i64,
    pub brand_id: i64,
    pub source: String,
    pub source_id: String,
    pub title: Option<String>,
    pub content: String,
    pub url: String,
    pub author: String,
    pub sentiment: String,
    pub sentiment_score: f32,
    pub priority: String,
    pub region: Option<String>,
    pub metadata: serde_json::Value,
    pub published_at: DateTime<Utc>,
    pub alert_sent: bool,
    pub digest_included: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new mention.
#[derive(Debug, Clone)]
pub struct NewMention {
    pub brand_id: i64,
    pub source: Source,
    pub source_id: String,
    pub title: Option<String>,
    pub content: String,
    pub url: String,
    pub author: String,
    pub sentiment: Sentiment,
    pub sentiment_score: f32,
    pub priority: Priority,
    pub region: Option<String>,
    pub metadata: MentionMetadata,
    pub published_at: DateTime<Utc>,
}

/// Outcome of a store-if-new insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

const MENTION_COLUMNS: &str = "id, brand_id, source, source_id, title, content, url, author, \
     sentiment, sentiment_score, priority, region, metadata, published_at, \
     alert_sent, digest_included, created_at";

/// Whether a mention with the given `(source, source_id)` pair exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn mention_exists(
    pool: &PgPool,
    source: Source,
    source_id: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM mentions WHERE source = $1 AND source_id = $2)",
    )
    .bind(source.as_str())
    .bind(source_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Inserts a mention unless one with the same `(source, source_id)` exists.
///
/// `ON CONFLICT DO NOTHING` plus the unique-violation mapping makes the
/// operation safe under concurrent runs: the second writer observes
/// [`InsertOutcome::AlreadyExists`], never a hard error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] for any failure other than the duplicate key.
pub async fn insert_mention_if_new(
    pool: &PgPool,
    mention: &NewMention,
) -> Result<InsertOutcome, DbError> {
    let result = sqlx::query(
        "INSERT INTO mentions \
             (brand_id, source, source_id, title, content, url, author, \
              sentiment, sentiment_score, priority, region, metadata, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (source, source_id) DO NOTHING",
    )
    .bind(mention.brand_id)
    .bind(mention.source.as_str())
    .bind(&mention.source_id)
    .bind(&mention.title)
    .bind(&mention.content)
    .bind(&mention.url)
    .bind(&mention.author)
    .bind(mention.sentiment.as_str())
    .bind(mention.sentiment_score)
    .bind(mention.priority.as_str())
    .bind(&mention.region)
    .bind(mention.metadata.to_json())
    .bind(mention.published_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(InsertOutcome::AlreadyExists),
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Mentions for a brand that are alert-eligible and not yet alerted.
///
/// Alert-eligible means critical or warning priority; info never alerts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unalerted_mentions(
    pool: &PgPool,
    brand_id: i64,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE brand_id = $1 AND alert_sent = FALSE AND priority IN ($2, $3) \
         ORDER BY created_at, id"
    ))
    .bind(brand_id)
    .bind(Priority::Critical.as_str())
    .bind(Priority::Warning.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mentions for a set of brands published within `[start, end]` (inclusive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mentions_by_brands_and_range(
    pool: &PgPool,
    brand_ids: &[i64],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE brand_id = ANY($1) AND published_at >= $2 AND published_at <= $3 \
         ORDER BY created_at, id"
    ))
    .bind(brand_ids)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Flags a mention as having had its immediate alert dispatched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the mention does not exist.
pub async fn mark_alert_sent(pool: &PgPool, mention_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE mentions SET alert_sent = TRUE WHERE id = $1")
        .bind(mention_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Flags a batch of mentions as included in a digest.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_digest_included(pool: &PgPool, mention_ids: &[i64]) -> Result<(), DbError> {
    if mention_ids.is_empty() {
        return Ok(());
    }

    sqlx::query("UPDATE mentions SET digest_included = TRUE WHERE id = ANY($1)")
        .bind(mention_ids)
        .execute(pool)
        .await?;

    Ok(())
}
