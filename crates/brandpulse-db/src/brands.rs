//! Database operations for the `brands` table.
//!
//! Brands are created by users through the settings surface (out of scope
//! here); the pipeline only ever reads them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub trustpilot_id: Option<String>,
    pub g2_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a brand (used by seeding and tests).
#[derive(Debug, Clone)]
pub struct NewBrand {
    pub user_id: Uuid,
    pub name: String,
    pub trustpilot_id: Option<String>,
    pub g2_slug: Option<String>,
}

const BRAND_COLUMNS: &str = "id, user_id, name, trustpilot_id, g2_slug, created_at";

/// Inserts a brand and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_brand(pool: &PgPool, brand: &NewBrand) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "INSERT INTO brands (user_id, name, trustpilot_id, g2_slug) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(brand.user_id)
    .bind(&brand.name)
    .bind(&brand.trustpilot_id)
    .bind(&brand.g2_slug)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a brand by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand exists with the given id.
pub async fn get_brand(pool: &PgPool, id: i64) -> Result<BrandRow, DbError> {
    sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns every brand together with its owning user id, in creation order.
///
/// This is the refresh run's work list: each row is one collector sweep.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands_with_users(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
