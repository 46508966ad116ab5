//! Database operations for the `job_runs` table.
//!
//! One row per batch execution. Runs are created directly in `running`
//! (batch triggers start work immediately) and transition to `completed`
//! or `failed`. No lock is taken: a stale `running` row from a killed
//! process never blocks the next invocation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub const JOB_TYPE_REFRESH: &str = "refresh";
pub const JOB_TYPE_DIGEST: &str = "digest";

pub const STATUS_RUNNING: &str = "running";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// A row from the `job_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub job_type: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const JOB_RUN_COLUMNS: &str = "id, public_id, job_type, status, started_at, completed_at, \
     metadata, error_message, created_at";

/// Creates a new job run in `running` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_job_run(pool: &PgPool, job_type: &str) -> Result<JobRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, JobRunRow>(&format!(
        "INSERT INTO job_runs (public_id, job_type, status) \
         VALUES ($1, $2, '{STATUS_RUNNING}') \
         RETURNING {JOB_RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(job_type)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run `completed`, storing its summary metadata.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobRunTransition`] if the run is not `running`.
pub async fn complete_job_run(
    pool: &PgPool,
    id: i64,
    metadata: &serde_json::Value,
) -> Result<(), DbError> {
    let result = sqlx::query(&format!(
        "UPDATE job_runs \
         SET status = '{STATUS_COMPLETED}', completed_at = NOW(), metadata = $1 \
         WHERE id = $2 AND status = '{STATUS_RUNNING}'"
    ))
    .bind(metadata)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidJobRunTransition {
            id,
            expected_status: STATUS_RUNNING,
        });
    }

    Ok(())
}

/// Marks a run `failed` with the captured error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobRunTransition`] if the run is not `running`.
pub async fn fail_job_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(&format!(
        "UPDATE job_runs \
         SET status = '{STATUS_FAILED}', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = '{STATUS_RUNNING}'"
    ))
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidJobRunTransition {
            id,
            expected_status: STATUS_RUNNING,
        });
    }

    Ok(())
}

/// Fetches a run by its public UUID.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no run exists with that id.
pub async fn get_job_run_by_public_id(pool: &PgPool, public_id: Uuid) -> Result<JobRunRow, DbError> {
    sqlx::query_as::<_, JobRunRow>(&format!(
        "SELECT {JOB_RUN_COLUMNS} FROM job_runs WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_job_runs(pool: &PgPool, limit: i64) -> Result<Vec<JobRunRow>, DbError> {
    let rows = sqlx::query_as::<_, JobRunRow>(&format!(
        "SELECT {JOB_RUN_COLUMNS} FROM job_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most recent run of a given type, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_job_run(pool: &PgPool, job_type: &str) -> Result<Option<JobRunRow>, DbError> {
    let row = sqlx::query_as::<_, JobRunRow>(&format!(
        "SELECT {JOB_RUN_COLUMNS} FROM job_runs \
         WHERE job_type = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(job_type)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
