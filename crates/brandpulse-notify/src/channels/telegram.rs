//! Telegram Bot API adapter (MarkdownV2 messages).

use crate::error::NotifyError;
use crate::message::AlertMessage;

/// Every character MarkdownV2 treats as syntax and therefore requires a
/// backslash escape in literal text.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escapes literal text for Telegram's MarkdownV2 parse mode.
pub(crate) fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(crate) async fn send_alert(
    http: &reqwest::Client,
    base_url: &str,
    bot_token: &str,
    chat_id: &str,
    message: &AlertMessage,
) -> Result<(), NotifyError> {
    let text = format!(
        "{} *{} mention of {}*\n{} — {}\n_{}_\n{}",
        message.emoji(),
        escape_markdown_v2(&message.priority.as_str().to_uppercase()),
        escape_markdown_v2(&message.brand_name),
        escape_markdown_v2(&message.source_label),
        escape_markdown_v2(&message.author),
        escape_markdown_v2(&message.snippet),
        escape_markdown_v2(&message.url),
    );

    let url = format!("{}/bot{bot_token}/sendMessage", base_url.trim_end_matches('/'));
    let response = http
        .post(&url)
        .json(&serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "MarkdownV2",
            "disable_web_page_preview": true,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(NotifyError::Api(format!(
            "Telegram API returned status {}",
            response.status()
        )));
    }
    Ok(())
}
