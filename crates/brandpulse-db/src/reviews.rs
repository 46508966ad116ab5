//! Database operations for the `reviews` table.
//!
//! Reviews share the `(source, source_id)` uniqueness invariant with
//! mentions but live in their own table with independent identity; review
//! collectors write both a review and a companion mention.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use brandpulse_core::{Sentiment, Source};

use crate::{is_unique_violation, DbError, InsertOutcome};

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub brand_id: i64,
    pub source: String,
    pub source_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub author: String,
    pub sentiment: String,
    pub region: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub brand_id: i64,
    pub source: Source,
    pub source_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub author: String,
    pub sentiment: Sentiment,
    pub region: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

const REVIEW_COLUMNS: &str = "id, brand_id, source, source_id, rating, title, content, author, \
     sentiment, region, pros, cons, url, published_at, created_at";

/// Whether a review with the given `(source, source_id)` pair exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn review_exists(pool: &PgPool, source: Source, source_id: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM reviews WHERE source = $1 AND source_id = $2)",
    )
    .bind(source.as_str())
    .bind(source_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Inserts a review unless one with the same `(source, source_id)` exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] for any failure other than the duplicate key.
pub async fn insert_review_if_new(
    pool: &PgPool,
    review: &NewReview,
) -> Result<InsertOutcome, DbError> {
    let result = sqlx::query(
        "INSERT INTO reviews \
             (brand_id, source, source_id, rating, title, content, author, \
              sentiment, region, pros, cons, url, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (source, source_id) DO NOTHING",
    )
    .bind(review.brand_id)
    .bind(review.source.as_str())
    .bind(&review.source_id)
    .bind(review.rating)
    .bind(&review.title)
    .bind(&review.content)
    .bind(&review.author)
    .bind(review.sentiment.as_str())
    .bind(&review.region)
    .bind(&review.pros)
    .bind(&review.cons)
    .bind(&review.url)
    .bind(review.published_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Ok(InsertOutcome::AlreadyExists),
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Reviews for a set of brands published within `[start, end]` (inclusive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews_by_brands_and_range(
    pool: &PgPool,
    brand_ids: &[i64],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
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
