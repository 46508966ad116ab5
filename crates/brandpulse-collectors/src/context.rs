//! Shared state threaded through every source collector.

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use brandpulse_classifier::ClassifierClient;
use brandpulse_core::{AppConfig, PriorityPolicy};
use brandpulse_db::BrandRow;

use crate::error::CollectorError;

/// One brand being collected: the row fields the collectors actually need.
#[derive(Debug, Clone)]
pub struct BrandTarget {
    pub brand_id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub trustpilot_id: Option<String>,
    pub g2_slug: Option<String>,
}

impl From<&BrandRow> for BrandTarget {
    fn from(row: &BrandRow) -> Self {
        Self {
            brand_id: row.id,
            user_id: row.user_id,
            name: row.name.clone(),
            trustpilot_id: row.trustpilot_id.clone(),
            g2_slug: row.g2_slug.clone(),
        }
    }
}

/// Endpoints, credentials, and pacing for the source collectors.
///
/// Base URLs are overridable so tests can point each collector at a mock
/// server. Pacing delays exist to stay under upstream rate limits; tests
/// zero them out.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub news_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub trustpilot_base_url: String,
    pub g2_base_url: String,
    pub news_base_url: String,
    pub reddit_base_url: String,
    pub youtube_base_url: String,
    /// Delay between classifier calls for rated review content.
    pub review_delay: Duration,
    /// Delay between classifier calls for feed content (news, videos).
    pub feed_delay: Duration,
    /// Delay between the per-subreddit search requests.
    pub subreddit_delay: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            user_agent: "brandpulse/0.1".to_string(),
            request_timeout_secs: 30,
            news_api_key: None,
            youtube_api_key: None,
            trustpilot_base_url: "https://www.trustpilot.com".to_string(),
            g2_base_url: "https://www.g2.com".to_string(),
            news_base_url: "https://newsapi.org".to_string(),
            reddit_base_url: "https://www.reddit.com".to_string(),
            youtube_base_url: "https://www.googleapis.com".to_string(),
            review_delay: Duration::from_millis(500),
            feed_delay: Duration::from_millis(200),
            subreddit_delay: Duration::from_secs(2),
        }
    }
}

impl CollectorConfig {
    /// Production config from the loaded application settings.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.collector_user_agent.clone(),
            request_timeout_secs: config.collector_request_timeout_secs,
            news_api_key: config.news_api_key.clone(),
            youtube_api_key: config.youtube_api_key.clone(),
            ..Self::default()
        }
    }

    /// Test config with no pacing and every endpoint pointed at `base_url`.
    #[must_use]
    pub fn for_mock_server(base_url: &str) -> Self {
        Self {
            news_api_key: Some("test-news-key".to_string()),
            youtube_api_key: Some("test-youtube-key".to_string()),
            trustpilot_base_url: base_url.to_string(),
            g2_base_url: base_url.to_string(),
            news_base_url: base_url.to_string(),
            reddit_base_url: base_url.to_string(),
            youtube_base_url: base_url.to_string(),
            review_delay: Duration::ZERO,
            feed_delay: Duration::ZERO,
            subreddit_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Everything a source collector needs: the pool, the classifier, one shared
/// HTTP client, endpoint config, and the alerting policy.
pub struct CollectorContext {
    pub pool: PgPool,
    pub classifier: ClassifierClient,
    pub http: reqwest::Client,
    pub config: CollectorConfig,
    pub policy: PriorityPolicy,
}

impl CollectorContext {
    /// Builds a context with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        pool: PgPool,
        classifier: ClassifierClient,
        config: CollectorConfig,
    ) -> Result<Self, CollectorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            pool,
            classifier,
            http,
            config,
            policy: PriorityPolicy::default(),
        })
    }

    /// Sleeps the configured pacing delay, if any.
    pub(crate) async fn pace(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
