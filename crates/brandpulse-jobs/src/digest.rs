//! The digest job: one summary per user covering the prior day.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use brandpulse_classifier::ClassifierClient;
use brandpulse_core::{truncate, PriorityPolicy, Source};
use brandpulse_db::{
    complete_job_run, create_job_run, fail_job_run, get_settings_for_user,
    job_runs::JOB_TYPE_DIGEST, list_brands_with_users, list_mentions_by_brands_and_range,
    list_reviews_by_brands_and_range, mark_digest_included, upsert_digest, BrandRow, MentionRow,
    NewDigest,
};
use brandpulse_notify::{DigestMessage, Notifier};

use crate::error::JobError;

const HIGHLIGHT_COUNT: usize = 5;
const NEEDS_ATTENTION_COUNT: usize = 3;
const HIGHLIGHT_SNIPPET_CHARS: usize = 120;

/// Totals from one digest run.
#[derive(Debug, Clone)]
pub struct DigestOutcome {
    pub public_id: Uuid,
    pub users_processed: usize,
    pub digests_generated: usize,
}

/// Generates and delivers yesterday's digest for every user with
/// notification settings and at least one brand.
///
/// Users are isolated: a failure for one is recorded in the run metadata and
/// the run continues. Re-running for the same day regenerates and replaces
/// each digest rather than duplicating it.
///
/// # Errors
///
/// Returns [`JobError::Db`] when job-run bookkeeping or the brand listing
/// fails.
pub async fn run_digest(
    pool: &PgPool,
    classifier: &ClassifierClient,
    notifier: &Notifier,
) -> Result<DigestOutcome, JobError> {
    let run = create_job_run(pool, JOB_TYPE_DIGEST).await?;
    info!(job_run = %run.public_id, "digest job started");

    match digest_all_users(pool, classifier, notifier).await {
        Ok((mut outcome, metadata)) => {
            complete_job_run(pool, run.id, &metadata).await?;
            info!(
                job_run = %run.public_id,
                users = outcome.users_processed,
                digests = outcome.digests_generated,
                "digest job completed"
            );
            outcome.public_id = run.public_id;
            Ok(outcome)
        }
        Err(e) => {
            fail_job_run(pool, run.id, &e.to_string()).await?;
            Err(e)
        }
    }
}

async fn digest_all_users(
    pool: &PgPool,
    classifier: &ClassifierClient,
    notifier: &Notifier,
) -> Result<(DigestOutcome, serde_json::Value), JobError> {
    let brands = list_brands_with_users(pool).await?;

    let mut by_user: BTreeMap<Uuid, Vec<&BrandRow>> = BTreeMap::new();
    for brand in &brands {
        by_user.entry(brand.user_id).or_default().push(brand);
    }

    let (start, end) = digest_window(Utc::now().date_naive());
    let digest_date = start.date_naive();

    let mut outcome = DigestOutcome {
        public_id: Uuid::nil(),
        users_processed: 0,
        digests_generated: 0,
    };

    let mut users_skipped = 0_usize;
    let mut results = Vec::with_capacity(by_user.len());

    for (user_id, user_brands) in &by_user {
        // Digests only go to users who set up notification delivery.
        if get_settings_for_user(pool, *user_id).await?.is_none() {
            debug!(user_id = %user_id, "no notification settings, skipping digest");
            users_skipped += 1;
            results.push(json!({
                "user_id": user_id.to_string(),
                "status": "skipped",
            }));
            continue;
        }

        outcome.users_processed += 1;
        match digest_one_user(
            pool, classifier, notifier, *user_id, user_brands, digest_date, start, end,
        )
        .await
        {
            Ok(true) => {
                outcome.digests_generated += 1;
                results.push(json!({
                    "user_id": user_id.to_string(),
                    "status": "generated",
                }));
            }
            Ok(false) => {
                results.push(json!({
                    "user_id": user_id.to_string(),
                    "status": "empty",
                }));
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "digest generation failed for user");
                results.push(json!({
                    "user_id": user_id.to_string(),
                    "status": "failed",
                    "error": e.to_string(),
                }));
            }
        }
    }

    let metadata = json!({
        "digest_date": digest_date,
        "users_processed": outcome.users_processed,
        "users_skipped": users_skipped,
        "digests_generated": outcome.digests_generated,
        "results": results,
    });

    Ok((outcome, metadata))
}

#[allow(clippy::too_many_arguments)]
async fn digest_one_user(
    pool: &PgPool,
    classifier: &ClassifierClient,
    notifier: &Notifier,
    user_id: Uuid,
    brands: &[&BrandRow],
    digest_date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<bool, JobError> {
    let brand_ids: Vec<i64> = brands.iter().map(|b| b.id).collect();

    let mentions = list_mentions_by_brands_and_range(pool, &brand_ids, start, end).await?;
    let reviews = list_reviews_by_brands_and_range(pool, &brand_ids, start, end).await?;

    if mentions.is_empty() && reviews.is_empty() {
        debug!(user_id = %user_id, "nothing published yesterday, skipping digest");
        return Ok(false);
    }

    // Reviews are double-stored as mentions so they flow through alerting;
    // keep the counts disjoint here.
    let mention_count = i64::try_from(
        mentions
            .iter()
            .filter(|m| !is_review_source(&m.source))
            .count(),
    )
    .unwrap_or(i64::MAX);
    let review_count = i64::try_from(reviews.len()).unwrap_or(i64::MAX);

    let avg_sentiment = average_score(&mentions);
    let policy = PriorityPolicy::default();
    let sentiment_label = policy.sentiment_label(avg_sentiment).to_string();

    let (highlights_json, highlight_lines) = build_highlights(&mentions);

    let summary = match classifier
        .generate_digest_summary(mention_count, review_count, &sentiment_label, &highlight_lines)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "summary generation failed, using template");
            template_summary(mention_count, review_count, &sentiment_label)
        }
    };

    upsert_digest(
        pool,
        &NewDigest {
            user_id,
            digest_date,
            summary: summary.clone(),
            mention_count: clamp_count(mention_count),
            review_count: clamp_count(review_count),
            avg_sentiment,
            sentiment_label: sentiment_label.clone(),
            highlights: serde_json::Value::Array(highlights_json),
        },
    )
    .await?;

    notifier
        .send_digest(
            pool,
            user_id,
            &DigestMessage {
                digest_date,
                summary,
                mention_count,
                review_count,
                sentiment_label,
                highlights: highlight_lines,
            },
        )
        .await?;

    let mention_ids: Vec<i64> = mentions.iter().map(|m| m.id).collect();
    mark_digest_included(pool, &mention_ids).await?;

    Ok(true)
}

/// The digest window covers the full prior day, both bounds inclusive.
fn digest_window(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let yesterday = today.pred_opt().unwrap_or(today);
    let start = yesterday
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let end = yesterday
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    (start, end)
}

fn is_review_source(source: &str) -> bool {
    matches!(
        source.parse::<Source>(),
        Ok(Source::Trustpilot | Source::G2)
    )
}

fn average_score(mentions: &[MentionRow]) -> f32 {
    if mentions.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = mentions.len() as f32;
    mentions.iter().map(|m| m.sentiment_score).sum::<f32>() / denom
}

/// Picks the day's standouts in arrival order: the first positive items as
/// highlights and the first alert-tier items as needs-attention.
fn build_highlights(mentions: &[MentionRow]) -> (Vec<serde_json::Value>, Vec<String>) {
    let mut json_entries = Vec::new();
    let mut lines = Vec::new();

    for mention in mentions
        .iter()
        .filter(|m| m.sentiment == "positive")
        .take(HIGHLIGHT_COUNT)
    {
        json_entries.push(entry_json("highlight", mention));
        lines.push(entry_line(mention));
    }

    for mention in mentions
        .iter()
        .filter(|m| m.priority == "critical" || m.priority == "warning")
        .take(NEEDS_ATTENTION_COUNT)
    {
        json_entries.push(entry_json("needs_attention", mention));
        lines.push(format!("Needs attention: {}", entry_line(mention)));
    }

    (json_entries, lines)
}

fn entry_json(kind: &str, mention: &MentionRow) -> serde_json::Value {
    json!({
        "kind": kind,
        "source": mention.source,
        "title": mention.title,
        "url": mention.url,
        "sentiment_score": mention.sentiment_score,
        "priority": mention.priority,
    })
}

fn entry_line(mention: &MentionRow) -> String {
    let text = mention.title.as_deref().unwrap_or(&mention.content);
    format!("{} ({})", truncate(text, HIGHLIGHT_SNIPPET_CHARS), mention.source)
}

fn template_summary(mention_count: i64, review_count: i64, sentiment_label: &str) -> String {
    format!(
        "Yesterday you had {mention_count} mentions and {review_count} reviews. \
         Overall sentiment was {sentiment_label}."
    )
}

fn clamp_count(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
