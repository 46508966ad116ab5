use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brandpulse_classifier::ClassifierClient;
use brandpulse_collectors::{CollectorConfig, CollectorContext};
use brandpulse_core::AppConfig;
use brandpulse_notify::{ChannelConfig, Notifier};

#[derive(Debug, Parser)]
#[command(name = "brandpulse-cli")]
#[command(about = "BrandPulse command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full collection sweep and dispatch pending alerts.
    Refresh,
    /// Generate and deliver yesterday's digests.
    Digest,
    /// List recent job runs.
    Runs {
        /// Maximum number of runs to show.
        #[arg(long, default_value_t = 20)]
        limit: i64,
        /// Only show runs of this type (refresh or digest).
        #[arg(long)]
        job_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = brandpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = brandpulse_db::PoolConfig::from_app_config(&config);
    let pool = brandpulse_db::connect_pool(&config.database_url, pool_config).await?;
    brandpulse_db::run_migrations(&pool).await?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Refresh => run_refresh(pool, &config).await,
        Commands::Digest => run_digest(pool, &config).await,
        Commands::Runs { limit, job_type } => list_runs(pool, limit, job_type.as_deref()).await,
    }
}

async fn run_refresh(pool: sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let classifier = build_classifier(config)?;
    let ctx = CollectorContext::new(pool, classifier, CollectorConfig::from_app_config(config))?;
    let notifier = Notifier::new(ChannelConfig::from_app_config(config))?;

    let outcome = brandpulse_jobs::run_refresh(&ctx, &notifier).await?;
    println!(
        "refresh {} done: {} brands, {} found, {} new, {} alerts delivered",
        outcome.public_id,
        outcome.brands_processed,
        outcome.items_found,
        outcome.items_new,
        outcome.alerts_delivered
    );
    Ok(())
}

async fn run_digest(pool: sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let classifier = build_classifier(config)?;
    let notifier = Notifier::new(ChannelConfig::from_app_config(config))?;

    let outcome = brandpulse_jobs::run_digest(&pool, &classifier, &notifier).await?;
    println!(
        "digest {} done: {} users, {} digests generated",
        outcome.public_id, outcome.users_processed, outcome.digests_generated
    );
    Ok(())
}

async fn list_runs(
    pool: sqlx::PgPool,
    limit: i64,
    job_type: Option<&str>,
) -> anyhow::Result<()> {
    let runs = brandpulse_db::list_job_runs(&pool, limit.clamp(1, 200)).await?;

    let mut shown = 0;
    for run in runs
        .iter()
        .filter(|r| job_type.is_none_or(|t| r.job_type == t))
    {
        let completed = run
            .completed_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
        println!(
            "{}  {:<8}  {:<9}  started {}  completed {}{}",
            run.public_id,
            run.job_type,
            run.status,
            run.started_at.to_rfc3339(),
            completed,
            run.error_message
                .as_deref()
                .map(|e| format!("  error: {e}"))
                .unwrap_or_default()
        );
        shown += 1;
    }

    if shown == 0 {
        println!("no job runs recorded");
    }
    Ok(())
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<ClassifierClient> {
    if config.classifier_api_key.is_none() {
        tracing::warn!("classifier API key not set; sentiment will use fallbacks");
    }
    let classifier = ClassifierClient::with_base_url(
        config.classifier_api_key.as_deref().unwrap_or_default(),
        &config.classifier_model,
        config.classifier_timeout_secs,
        &config.classifier_base_url,
    )?;
    Ok(classifier)
}
