use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use brandpulse_db::job_runs::{JOB_TYPE_DIGEST, JOB_TYPE_REFRESH};
use brandpulse_jobs::{run_digest, run_refresh};

use crate::middleware::RequestId;
use crate::pipeline;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct JobRunItem {
    pub id: Uuid,
    pub job_type: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Value,
    pub error_message: Option<String>,
}

impl From<brandpulse_db::JobRunRow> for JobRunItem {
    fn from(row: brandpulse_db::JobRunRow) -> Self {
        Self {
            id: row.public_id,
            job_type: row.job_type,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            metadata: row.metadata,
            error_message: row.error_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatestRunQuery {
    pub job_type: Option<String>,
}

/// Outcome of a manually triggered batch. A failed run is still a handled
/// request: the trigger reports `success = false` rather than a 5xx, so
/// callers can distinguish "the job broke" from "the API broke".
#[derive(Debug, Serialize)]
pub(super) struct TriggerResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_run_id: Option<Uuid>,
    #[serde(flatten)]
    pub counts: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub(super) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<ApiResponse<Vec<JobRunItem>>>, ApiError> {
    let rows = brandpulse_db::list_job_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(JobRunItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn latest_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LatestRunQuery>,
) -> Result<Json<ApiResponse<JobRunItem>>, ApiError> {
    let job_type = match query.job_type.as_deref() {
        Some(t @ (JOB_TYPE_REFRESH | JOB_TYPE_DIGEST)) => t,
        Some(_) | None => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "job_type must be 'refresh' or 'digest'",
            ))
        }
    };

    let row = brandpulse_db::latest_job_run(&state.pool, job_type)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no {job_type} runs recorded yet"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: JobRunItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TriggerResult>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual refresh triggered");

    let ctx = pipeline::build_collector_context(state.pool.clone(), &state.config)
        .map_err(|e| map_setup_error(req_id.0.clone(), &e))?;
    let notifier = pipeline::build_notifier(&state.config)
        .map_err(|e| map_setup_error(req_id.0.clone(), &e))?;

    let data = match run_refresh(&ctx, &notifier).await {
        Ok(outcome) => TriggerResult {
            success: true,
            job_run_id: Some(outcome.public_id),
            counts: serde_json::json!({
                "brands_processed": outcome.brands_processed,
                "items_found": outcome.items_found,
                "items_new": outcome.items_new,
                "alerts_delivered": outcome.alerts_delivered,
            }),
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "manual refresh failed");
            failed_trigger(&e)
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trigger_digest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TriggerResult>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual digest triggered");

    let classifier = pipeline::build_classifier(&state.config)
        .map_err(|e| map_setup_error(req_id.0.clone(), &e))?;
    let notifier = pipeline::build_notifier(&state.config)
        .map_err(|e| map_setup_error(req_id.0.clone(), &e))?;

    let data = match run_digest(&state.pool, &classifier, &notifier).await {
        Ok(outcome) => TriggerResult {
            success: true,
            job_run_id: Some(outcome.public_id),
            counts: serde_json::json!({
                "users_processed": outcome.users_processed,
                "digests_generated": outcome.digests_generated,
            }),
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "manual digest failed");
            failed_trigger(&e)
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn failed_trigger(error: &brandpulse_jobs::JobError) -> TriggerResult {
    TriggerResult {
        success: false,
        job_run_id: None,
        counts: serde_json::json!({}),
        error: Some(error.to_string()),
    }
}

fn map_setup_error(request_id: String, error: &anyhow::Error) -> ApiError {
    tracing::error!(error = %error, "job pipeline setup failed");
    ApiError::new(request_id, "internal_error", "job pipeline setup failed")
}
