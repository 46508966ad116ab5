//! Slack incoming-webhook adapter (Block Kit payloads).

use crate::error::NotifyError;
use crate::message::{AlertMessage, DigestMessage};

pub(crate) async fn send_alert(
    http: &reqwest::Client,
    webhook_url: &str,
    message: &AlertMessage,
) -> Result<(), NotifyError> {
    let payload = serde_json::json!({
        "text": message.plain_text(),
        "blocks": [
            {
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!(
                        "{} {} mention: {}",
                        message.emoji(),
                        message.priority.as_str().to_uppercase(),
                        message.brand_name
                    ),
                    "emoji": true
                }
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*{}* — {}\n>{}\n<{}|View original>",
                        message.source_label, message.author, message.snippet, message.url
                    )
                }
            }
        ]
    });

    post_webhook(http, webhook_url, &payload).await
}

pub(crate) async fn send_digest(
    http: &reqwest::Client,
    webhook_url: &str,
    message: &DigestMessage,
) -> Result<(), NotifyError> {
    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("\u{1f4ca} Daily digest — {}", message.digest_date),
                "emoji": true
            }
        }),
        serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "{} mentions, {} reviews, overall *{}* sentiment.\n{}",
                    message.mention_count,
                    message.review_count,
                    message.sentiment_label,
                    message.summary
                )
            }
        }),
    ];

    if !message.highlights.is_empty() {
        let lines: Vec<String> = message
            .highlights
            .iter()
            .map(|h| format!("• {h}"))
            .collect();
        blocks.push(serde_json::json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": lines.join("\n") }
        }));
    }

    let payload = serde_json::json!({
        "text": message.plain_text(),
        "blocks": blocks,
    });

    post_webhook(http, webhook_url, &payload).await
}

async fn post_webhook(
    http: &reqwest::Client,
    webhook_url: &str,
    payload: &serde_json::Value,
) -> Result<(), NotifyError> {
    let response = http.post(webhook_url).json(payload).send().await?;
    if !response.status().is_success() {
        return Err(NotifyError::Api(format!(
            "Slack webhook returned status {}",
            response.status()
        )));
    }
    Ok(())
}
