//! Transactional email adapter (Resend-compatible API).

use crate::error::NotifyError;
use crate::message::{AlertMessage, DigestMessage};

pub(crate) async fn send_alert(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    from: &str,
    to: &str,
    message: &AlertMessage,
) -> Result<(), NotifyError> {
    let subject = format!(
        "{} {} mention of {} on {}",
        message.emoji(),
        message.priority.as_str().to_uppercase(),
        message.brand_name,
        message.source_label
    );
    let html = format!(
        "<h2>{} mention of {}</h2>\
         <p><strong>{}</strong> — {}</p>\
         <blockquote>{}</blockquote>\
         <p><a href=\"{}\">View original</a></p>",
        message.priority.as_str().to_uppercase(),
        html_escape(&message.brand_name),
        html_escape(&message.source_label),
        html_escape(&message.author),
        html_escape(&message.snippet),
        message.url,
    );

    send(http, base_url, api_key, from, to, &subject, &html).await
}

pub(crate) async fn send_digest(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    from: &str,
    to: &str,
    message: &DigestMessage,
) -> Result<(), NotifyError> {
    let subject = format!("Daily brand digest — {}", message.digest_date);
    let mut html = format!(
        "<h2>Daily digest for {}</h2>\
         <p>{} mentions, {} reviews, overall <strong>{}</strong> sentiment.</p>\
         <p>{}</p>",
        message.digest_date,
        message.mention_count,
        message.review_count,
        html_escape(&message.sentiment_label),
        html_escape(&message.summary),
    );
    if !message.highlights.is_empty() {
        html.push_str("<ul>");
        for line in &message.highlights {
            html.push_str("<li>");
            html.push_str(&html_escape(line));
            html.push_str("</li>");
        }
        html.push_str("</ul>");
    }

    send(http, base_url, api_key, from, to, &subject, &html).await
}

async fn send(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    from: &str,
    to: &str,
    subject: &str,
    html: &str,
) -> Result<(), NotifyError> {
    let url = format!("{}/emails", base_url.trim_end_matches('/'));
    let response = http
        .post(&url)
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "from": from,
            "to": [to],
            "subject": subject,
            "html": html,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(NotifyError::Api(format!(
            "email API returned status {}",
            response.status()
        )));
    }
    Ok(())
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
