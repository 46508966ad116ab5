//! Database operations for the `notification_settings` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `notification_settings` table: one per user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationSettingsRow {
    pub id: i64,
    pub user_id: Uuid,
    pub slack_webhook: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub email: Option<String>,
    pub critical_slack: bool,
    pub critical_telegram: bool,
    pub critical_email: bool,
    pub warning_slack: bool,
    pub warning_telegram: bool,
    pub warning_email: bool,
    pub digest_slack: bool,
    pub digest_email: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or replacing a user's settings.
#[derive(Debug, Clone)]
pub struct NewNotificationSettings {
    pub user_id: Uuid,
    pub slack_webhook: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub email: Option<String>,
    pub critical_slack: bool,
    pub critical_telegram: bool,
    pub critical_email: bool,
    pub warning_slack: bool,
    pub warning_telegram: bool,
    pub warning_email: bool,
    pub digest_slack: bool,
    pub digest_email: bool,
}

impl NewNotificationSettings {
    /// Settings with every channel endpoint unset and default toggles.
    #[must_use]
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            slack_webhook: None,
            telegram_chat_id: None,
            email: None,
            critical_slack: true,
            critical_telegram: true,
            critical_email: true,
            warning_slack: true,
            warning_telegram: false,
            warning_email: true,
            digest_slack: true,
            digest_email: true,
        }
    }
}

const SETTINGS_COLUMNS: &str = "id, user_id, slack_webhook, telegram_chat_id, email, \
     critical_slack, critical_telegram, critical_email, \
     warning_slack, warning_telegram, warning_email, \
     digest_slack, digest_email, created_at";

/// Fetches a user's notification settings, if configured.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_settings_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<NotificationSettingsRow>, DbError> {
    let row = sqlx::query_as::<_, NotificationSettingsRow>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM notification_settings WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates or replaces the settings row for a user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_settings(
    pool: &PgPool,
    settings: &NewNotificationSettings,
) -> Result<NotificationSettingsRow, DbError> {
    let row = sqlx::query_as::<_, NotificationSettingsRow>(&format!(
        "INSERT INTO notification_settings \
             (user_id, slack_webhook, telegram_chat_id, email, \
              critical_slack, critical_telegram, critical_email, \
              warning_slack, warning_telegram, warning_email, \
              digest_slack, digest_email) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (user_id) DO UPDATE SET \
             slack_webhook     = EXCLUDED.slack_webhook, \
             telegram_chat_id  = EXCLUDED.telegram_chat_id, \
             email             = EXCLUDED.email, \
             critical_slack    = EXCLUDED.critical_slack, \
             critical_telegram = EXCLUDED.critical_telegram, \
             critical_email    = EXCLUDED.critical_email, \
             warning_slack     = EXCLUDED.warning_slack, \
             warning_telegram  = EXCLUDED.warning_telegram, \
             warning_email     = EXCLUDED.warning_email, \
             digest_slack      = EXCLUDED.digest_slack, \
             digest_email      = EXCLUDED.digest_email \
         RETURNING {SETTINGS_COLUMNS}"
    ))
    .bind(settings.user_id)
    .bind(&settings.slack_webhook)
    .bind(&settings.telegram_chat_id)
    .bind(&settings.email)
    .bind(settings.critical_slack)
    .bind(settings.critical_telegram)
    .bind(settings.critical_email)
    .bind(settings.warning_slack)
    .bind(settings.warning_telegram)
    .bind(settings.warning_email)
    .bind(settings.digest_slack)
    .bind(settings.digest_email)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
