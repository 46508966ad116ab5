//! Channel eligibility: the toggle matrix crossed with configured endpoints.

use brandpulse_core::{Channel, Priority};
use brandpulse_db::NotificationSettingsRow;

/// Channels that should receive an immediate alert for `priority`.
///
/// A channel is eligible only when its toggle for the priority tier is on
/// AND its endpoint is configured. Info never alerts immediately; it reaches
/// users through the daily digest alone.
#[must_use]
pub fn alert_channels(settings: &NotificationSettingsRow, priority: Priority) -> Vec<Channel> {
    let toggles = match priority {
        Priority::Critical => [
            settings.critical_slack,
            settings.critical_telegram,
            settings.critical_email,
        ],
        Priority::Warning => [
            settings.warning_slack,
            settings.warning_telegram,
            settings.warning_email,
        ],
        Priority::Info => return Vec::new(),
    };

    let mut channels = Vec::new();
    if toggles[0] && settings.slack_webhook.is_some() {
        channels.push(Channel::Slack);
    }
    if toggles[1] && settings.telegram_chat_id.is_some() {
        channels.push(Channel::Telegram);
    }
    if toggles[2] && settings.email.is_some() {
        channels.push(Channel::Email);
    }
    channels
}

/// Channels that should receive the daily digest. Telegram has no digest
/// toggle; digests go out over Slack and email only.
#[must_use]
pub fn digest_channels(settings: &NotificationSettingsRow) -> Vec<Channel> {
    let mut channels = Vec::new();
    if settings.digest_slack && settings.slack_webhook.is_some() {
        channels.push(Channel::Slack);
    }
    if settings.digest_email && settings.email.is_some() {
        channels.push(Channel::Email);
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn settings() -> NotificationSettingsRow {
        NotificationSettingsRow {
            id: 1,
            user_id: Uuid::new_v4(),
            slack_webhook: Some("https://hooks.slack.example/T1/B1/x".to_string()),
            telegram_chat_id: Some("12345".to_string()),
            email: Some("founder@acme.test".to_string()),
            critical_slack: true,
            critical_telegram: true,
            critical_email: true,
            warning_slack: true,
            warning_telegram: false,
            warning_email: true,
            digest_slack: true,
            digest_email: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn critical_hits_every_configured_channel() {
        assert_eq!(
            alert_channels(&settings(), Priority::Critical),
            vec![Channel::Slack, Channel::Telegram, Channel::Email]
        );
    }

    #[test]
    fn warning_respects_the_telegram_default_off() {
        assert_eq!(
            alert_channels(&settings(), Priority::Warning),
            vec![Channel::Slack, Channel::Email]
        );
    }

    #[test]
    fn info_never_alerts_immediately() {
        assert!(alert_channels(&settings(), Priority::Info).is_empty());
    }

    #[test]
    fn toggled_on_but_unconfigured_channel_is_skipped() {
        let mut s = settings();
        s.slack_webhook = None;
        assert_eq!(
            alert_channels(&s, Priority::Critical),
            vec![Channel::Telegram, Channel::Email]
        );
    }

    #[test]
    fn digest_goes_to_slack_and_email_only() {
        assert_eq!(
            digest_channels(&settings()),
            vec![Channel::Slack, Channel::Email]
        );

        let mut s = settings();
        s.digest_slack = false;
        s.email = None;
        assert!(digest_channels(&s).is_empty());
    }
}
