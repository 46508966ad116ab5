//! The refresh job: collect every brand, then dispatch pending alerts.

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use brandpulse_collectors::{run_all, BrandTarget, CollectorContext};
use brandpulse_db::{
    complete_job_run, create_job_run, fail_job_run, job_runs::JOB_TYPE_REFRESH,
    list_brands_with_users,
};
use brandpulse_notify::Notifier;

use crate::error::JobError;

/// Totals from one refresh run.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub public_id: Uuid,
    pub brands_processed: usize,
    pub items_found: usize,
    pub items_new: usize,
    pub alerts_delivered: usize,
}

/// Runs a full collection sweep: every brand, every source, then immediate
/// alerts for whatever landed at alertable priority.
///
/// Brands are isolated from each other the same way sources are isolated
/// within a brand; a failure is recorded in the run metadata and the sweep
/// continues. The job run transitions to `failed` only when the batch itself
/// cannot proceed (e.g. the brand listing fails).
///
/// # Errors
///
/// Returns [`JobError::Db`] when job-run bookkeeping or the brand listing
/// fails.
pub async fn run_refresh(
    ctx: &CollectorContext,
    notifier: &Notifier,
) -> Result<RefreshOutcome, JobError> {
    let run = create_job_run(&ctx.pool, JOB_TYPE_REFRESH).await?;
    info!(job_run = %run.public_id, "refresh job started");

    match refresh_all_brands(ctx, notifier).await {
        Ok((outcome_body, metadata)) => {
            complete_job_run(&ctx.pool, run.id, &metadata).await?;
            info!(
                job_run = %run.public_id,
                brands = outcome_body.brands_processed,
                found = outcome_body.items_found,
                new = outcome_body.items_new,
                "refresh job completed"
            );
            Ok(RefreshOutcome {
                public_id: run.public_id,
                ..outcome_body
            })
        }
        Err(e) => {
            fail_job_run(&ctx.pool, run.id, &e.to_string()).await?;
            Err(e)
        }
    }
}

async fn refresh_all_brands(
    ctx: &CollectorContext,
    notifier: &Notifier,
) -> Result<(RefreshOutcome, serde_json::Value), JobError> {
    let brands = list_brands_with_users(&ctx.pool).await?;

    let mut outcome = RefreshOutcome {
        public_id: Uuid::nil(),
        brands_processed: 0,
        items_found: 0,
        items_new: 0,
        alerts_delivered: 0,
    };
    let mut results = Vec::with_capacity(brands.len());

    for brand_row in &brands {
        let target = BrandTarget::from(brand_row);
        let summary = run_all(ctx, &target).await;

        outcome.items_found += summary.items_found();
        outcome.items_new += summary.items_new();

        let alerts = match notifier
            .process_unalerted_mentions(&ctx.pool, target.brand_id, &target.name, target.user_id)
            .await
        {
            Ok(stats) => stats.alerts_delivered,
            Err(e) => {
                warn!(brand = %target.name, error = %e, "alert dispatch failed");
                0
            }
        };
        outcome.alerts_delivered += alerts;
        outcome.brands_processed += 1;

        results.push(json!({
            "brand": target.name,
            "items_found": summary.items_found(),
            "items_new": summary.items_new(),
            "alerts_delivered": alerts,
            "sources": summary.reports,
        }));
    }

    let metadata = json!({
        "brands_processed": outcome.brands_processed,
        "items_found": outcome.items_found,
        "items_new": outcome.items_new,
        "alerts_delivered": outcome.alerts_delivered,
        "results": results,
    });

    Ok((outcome, metadata))
}
