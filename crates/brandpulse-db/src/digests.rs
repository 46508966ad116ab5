//! Database operations for the `digests` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `digests` table: one per user per day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestRow {
    pub id: i64,
    pub user_id: Uuid,
    pub digest_date: NaiveDate,
    pub summary: String,
    pub mention_count: i32,
    pub review_count: i32,
    pub avg_sentiment: f32,
    pub sentiment_label: String,
    pub highlights: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields for writing one day's digest for a user.
#[derive(Debug, Clone)]
pub struct NewDigest {
    pub user_id: Uuid,
    pub digest_date: NaiveDate,
    pub summary: String,
    pub mention_count: i32,
    pub review_count: i32,
    pub avg_sentiment: f32,
    pub sentiment_label: String,
    pub highlights: serde_json::Value,
}

const DIGEST_COLUMNS: &str = "id, user_id, digest_date, summary, mention_count, review_count, \
     avg_sentiment, sentiment_label, highlights, created_at";

/// Writes the digest for `(user, date)`, replacing any earlier one.
///
/// A re-triggered digest run regenerates from the same source data, so
/// replacing keeps the one-logical-record-per-day invariant without
/// double rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_digest(pool: &PgPool, digest: &NewDigest) -> Result<DigestRow, DbError> {
    let row = sqlx::query_as::<_, DigestRow>(&format!(
        "INSERT INTO digests \
             (user_id, digest_date, summary, mention_count, review_count, \
              avg_sentiment, sentiment_label, highlights) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (user_id, digest_date) DO UPDATE SET \
             summary         = EXCLUDED.summary, \
             mention_count   = EXCLUDED.mention_count, \
             review_count    = EXCLUDED.review_count, \
             avg_sentiment   = EXCLUDED.avg_sentiment, \
             sentiment_label = EXCLUDED.sentiment_label, \
             highlights      = EXCLUDED.highlights \
         RETURNING {DIGEST_COLUMNS}"
    ))
    .bind(digest.user_id)
    .bind(digest.digest_date)
    .bind(&digest.summary)
    .bind(digest.mention_count)
    .bind(digest.review_count)
    .bind(digest.avg_sentiment)
    .bind(&digest.sentiment_label)
    .bind(&digest.highlights)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches the digest for `(user, date)`, if generated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_digest(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<DigestRow>, DbError> {
    let row = sqlx::query_as::<_, DigestRow>(&format!(
        "SELECT {DIGEST_COLUMNS} FROM digests WHERE user_id = $1 AND digest_date = $2"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
