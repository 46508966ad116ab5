//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring refresh and digest jobs.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::pipeline;

/// Builds and starts the background job scheduler.
///
/// Registers both recurring jobs and starts the scheduler. Returns the
/// running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<brandpulse_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, pool.clone(), Arc::clone(&config)).await?;
    register_digest_job(&scheduler, pool, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the collection sweep, every six hours on the hour (UTC).
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<brandpulse_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 */6 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting refresh run");
            run_scheduled_refresh(&pool, &config).await;
            tracing::info!("scheduler: refresh run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the daily digest, 06:00 UTC.
async fn register_digest_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<brandpulse_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 6 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting digest run");
            run_scheduled_digest(&pool, &config).await;
            tracing::info!("scheduler: digest run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_scheduled_refresh(pool: &PgPool, config: &brandpulse_core::AppConfig) {
    let ctx = match pipeline::build_collector_context(pool.clone(), config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: refresh setup failed");
            return;
        }
    };
    let notifier = match pipeline::build_notifier(config) {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: notifier setup failed");
            return;
        }
    };

    match brandpulse_jobs::run_refresh(&ctx, &notifier).await {
        Ok(outcome) => tracing::info!(
            job_run = %outcome.public_id,
            brands = outcome.brands_processed,
            new = outcome.items_new,
            alerts = outcome.alerts_delivered,
            "scheduler: refresh completed"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: refresh failed"),
    }
}

async fn run_scheduled_digest(pool: &PgPool, config: &brandpulse_core::AppConfig) {
    let classifier = match pipeline::build_classifier(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: classifier setup failed");
            return;
        }
    };
    let notifier = match pipeline::build_notifier(config) {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: notifier setup failed");
            return;
        }
    };

    match brandpulse_jobs::run_digest(pool, &classifier, &notifier).await {
        Ok(outcome) => tracing::info!(
            job_run = %outcome.public_id,
            users = outcome.users_processed,
            digests = outcome.digests_generated,
            "scheduler: digest completed"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: digest failed"),
    }
}
