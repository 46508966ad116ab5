//! The notification router: eligibility, delivery, audit, and bookkeeping.

use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use brandpulse_core::{AppConfig, Channel, Priority};
use brandpulse_db::{
    get_settings_for_user, insert_alert, list_unalerted_mentions, mark_alert_sent, MentionRow,
    NewAlert, NotificationSettingsRow,
};

use crate::channels::{email, slack, telegram};
use crate::eligibility::{alert_channels, digest_channels};
use crate::error::NotifyError;
use crate::message::{AlertMessage, DigestMessage};

/// Credentials and endpoints for the delivery channels.
///
/// Slack needs no global config: each user's webhook URL is its own
/// endpoint. Base URLs are overridable for tests.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_base_url: String,
    pub email_api_key: Option<String>,
    pub email_base_url: String,
    pub email_from: String,
    pub request_timeout_secs: u64,
}

impl ChannelConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            telegram_bot_token: config.telegram_bot_token.clone(),
            telegram_base_url: config.telegram_base_url.clone(),
            email_api_key: config.email_api_key.clone(),
            email_base_url: config.email_base_url.clone(),
            email_from: config.email_from.clone(),
            request_timeout_secs: 30,
        }
    }

    /// Test config with both APIs pointed at `base_url`.
    #[must_use]
    pub fn for_mock_server(base_url: &str) -> Self {
        Self {
            telegram_bot_token: Some("test-bot-token".to_string()),
            telegram_base_url: base_url.to_string(),
            email_api_key: Some("test-email-key".to_string()),
            email_base_url: base_url.to_string(),
            email_from: "BrandPulse <alerts@brandpulse.test>".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Counts from one alert-dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertStats {
    pub mentions_processed: usize,
    pub alerts_delivered: usize,
}

/// Routes alerts and digests to the configured channels.
pub struct Notifier {
    http: reqwest::Client,
    config: ChannelConfig,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(config: ChannelConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, config })
    }

    /// Dispatches immediate alerts for every pending mention of one brand.
    ///
    /// Each mention is marked alerted after processing, whether or not any
    /// channel accepted the delivery: a persistently failing webhook must not
    /// cause the same mention to be re-sent on every run. Every attempt is
    /// recorded in the alert audit trail with its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Db`] when reading or updating rows fails.
    /// Channel failures are recorded, not returned.
    pub async fn process_unalerted_mentions(
        &self,
        pool: &PgPool,
        brand_id: i64,
        brand_name: &str,
        user_id: Uuid,
    ) -> Result<AlertStats, NotifyError> {
        let mentions = list_unalerted_mentions(pool, brand_id).await?;
        let mut stats = AlertStats::default();
        if mentions.is_empty() {
            return Ok(stats);
        }

        let settings = get_settings_for_user(pool, user_id).await?;

        for mention in mentions {
            if let Some(settings) = settings.as_ref() {
                stats.alerts_delivered += self
                    .dispatch_one(pool, settings, brand_name, user_id, &mention)
                    .await?;
            } else {
                debug!(brand = %brand_name, "no notification settings, skipping delivery");
            }
            mark_alert_sent(pool, mention.id).await?;
            stats.mentions_processed += 1;
        }

        Ok(stats)
    }

    async fn dispatch_one(
        &self,
        pool: &PgPool,
        settings: &NotificationSettingsRow,
        brand_name: &str,
        user_id: Uuid,
        mention: &MentionRow,
    ) -> Result<usize, NotifyError> {
        let Ok(priority) = mention.priority.parse::<Priority>() else {
            warn!(priority = %mention.priority, "unknown priority on stored mention, skipping");
            return Ok(0);
        };

        let message = AlertMessage::from_mention(brand_name, mention, priority);
        let mut delivered_count = 0;

        for channel in alert_channels(settings, priority) {
            let result = self.deliver_alert(channel, settings, &message).await;
            let delivered = match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(channel = %channel, error = %e, "alert delivery failed");
                    false
                }
            };
            if delivered {
                delivered_count += 1;
            }

            insert_alert(
                pool,
                &NewAlert {
                    user_id,
                    priority,
                    channel,
                    message: message.plain_text(),
                    delivered,
                },
            )
            .await?;
        }

        Ok(delivered_count)
    }

    async fn deliver_alert(
        &self,
        channel: Channel,
        settings: &NotificationSettingsRow,
        message: &AlertMessage,
    ) -> Result<(), NotifyError> {
        match channel {
            Channel::Slack => {
                let webhook = settings
                    .slack_webhook
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("missing Slack webhook".to_string()))?;
                slack::send_alert(&self.http, webhook, message).await
            }
            Channel::Telegram => {
                let chat_id = settings
                    .telegram_chat_id
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("missing Telegram chat id".to_string()))?;
                let token = self
                    .config
                    .telegram_bot_token
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("Telegram bot token not configured".to_string()))?;
                telegram::send_alert(
                    &self.http,
                    &self.config.telegram_base_url,
                    token,
                    chat_id,
                    message,
                )
                .await
            }
            Channel::Email => {
                let to = settings
                    .email
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("missing email address".to_string()))?;
                let key = self
                    .config
                    .email_api_key
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("email API key not configured".to_string()))?;
                email::send_alert(
                    &self.http,
                    &self.config.email_base_url,
                    key,
                    &self.config.email_from,
                    to,
                    message,
                )
                .await
            }
        }
    }

    /// Sends the daily digest over the user's digest channels. Returns the
    /// number of channels that accepted delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Db`] when reading settings or writing audit
    /// rows fails. Channel failures are recorded, not returned.
    pub async fn send_digest(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        message: &DigestMessage,
    ) -> Result<usize, NotifyError> {
        let Some(settings) = get_settings_for_user(pool, user_id).await? else {
            debug!(user_id = %user_id, "no notification settings, skipping digest delivery");
            return Ok(0);
        };

        let mut delivered_count = 0;
        for channel in digest_channels(&settings) {
            let result = self.deliver_digest(channel, &settings, message).await;
            let delivered = match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(channel = %channel, error = %e, "digest delivery failed");
                    false
                }
            };
            if delivered {
                delivered_count += 1;
            }

            insert_alert(
                pool,
                &NewAlert {
                    user_id,
                    priority: Priority::Info,
                    channel,
                    message: message.plain_text(),
                    delivered,
                },
            )
            .await?;
        }

        Ok(delivered_count)
    }

    async fn deliver_digest(
        &self,
        channel: Channel,
        settings: &NotificationSettingsRow,
        message: &DigestMessage,
    ) -> Result<(), NotifyError> {
        match channel {
            Channel::Slack => {
                let webhook = settings
                    .slack_webhook
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("missing Slack webhook".to_string()))?;
                slack::send_digest(&self.http, webhook, message).await
            }
            Channel::Email => {
                let to = settings
                    .email
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("missing email address".to_string()))?;
                let key = self
                    .config
                    .email_api_key
                    .as_deref()
                    .ok_or_else(|| NotifyError::Api("email API key not configured".to_string()))?;
                email::send_digest(
                    &self.http,
                    &self.config.email_base_url,
                    key,
                    &self.config.email_from,
                    to,
                    message,
                )
                .await
            }
            Channel::Telegram => Err(NotifyError::Api(
                "digests are not delivered over Telegram".to_string(),
            )),
        }
    }
}
