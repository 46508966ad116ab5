//! Database operations for the `alerts` audit table (append-only).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use brandpulse_core::{Channel, Priority};

use crate::DbError;

/// A row from the `alerts` table: one notification attempt.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub user_id: Uuid,
    pub priority: String,
    pub channel: String,
    pub message: String,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for recording one notification attempt.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: Uuid,
    pub priority: Priority,
    pub channel: Channel,
    pub message: String,
    pub delivered: bool,
}

/// Appends an alert audit row. Recorded for every attempt, delivered or not,
/// so repeated channel failures stay visible.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_alert(pool: &PgPool, alert: &NewAlert) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO alerts (user_id, priority, channel, message, delivered) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(alert.user_id)
    .bind(alert.priority.as_str())
    .bind(alert.channel.as_str())
    .bind(&alert.message)
    .bind(alert.delivered)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the most recent alerts for a user, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_alerts_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<AlertRow>, DbError> {
    let rows = sqlx::query_as::<_, AlertRow>(
        "SELECT id, user_id, priority, channel, message, delivered, created_at \
         FROM alerts \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
