//! Wires the batch-job dependencies (classifier, collectors, notifier) from
//! application config. Used by both the HTTP triggers and the scheduler.

use sqlx::PgPool;

use brandpulse_classifier::ClassifierClient;
use brandpulse_collectors::{CollectorConfig, CollectorContext};
use brandpulse_core::AppConfig;
use brandpulse_notify::{ChannelConfig, Notifier};

/// Builds the model client from config.
///
/// A missing API key is tolerated: collection still runs and sentiment falls
/// back to the neutral/rating-derived paths.
pub fn build_classifier(config: &AppConfig) -> anyhow::Result<ClassifierClient> {
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

pub fn build_notifier(config: &AppConfig) -> anyhow::Result<Notifier> {
    Ok(Notifier::new(ChannelConfig::from_app_config(config))?)
}

pub fn build_collector_context(
    pool: PgPool,
    config: &AppConfig,
) -> anyhow::Result<CollectorContext> {
    let classifier = build_classifier(config)?;
    let ctx = CollectorContext::new(pool, classifier, CollectorConfig::from_app_config(config))?;
    Ok(ctx)
}
