//! G2 review collector (public product-page structured data).

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use brandpulse_core::{MentionMetadata, Source};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::ingest::{ingest_review, MentionCandidate};
use crate::jsonld::extract_reviews;
use crate::report::SourceStats;
use crate::util::{encode_path_segment, sha256_hex};

pub(crate) async fn collect(
    ctx: &CollectorContext,
    brand: &BrandTarget,
) -> Result<SourceStats, CollectorError> {
    let Some(g2_slug) = brand.g2_slug.as_deref() else {
        tracing::debug!(brand = %brand.name, "no G2 slug configured, skipping");
        return Ok(SourceStats::default());
    };

    let page_url = format!(
        "{}/products/{}/reviews",
        ctx.config.g2_base_url,
        encode_path_segment(g2_slug)
    );
    let response = ctx.http.get(&page_url).send().await?;
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CollectorError::RateLimited);
    }
    let html = response.error_for_status()?.text().await?;

    let mut stats = SourceStats::default();
    for review in extract_reviews(&html) {
        let native_id = review
            .id
            .clone()
            .unwrap_or_else(|| sha256_hex(&format!("{}:{}", review.author, review.body)));
        let (pros, cons) = split_pros_cons(&review.body);

        let candidate = MentionCandidate {
            source: Source::G2,
            source_id: native_id.clone(),
            title: review.title.clone(),
            content: review.body.clone(),
            url: format!("{page_url}#{native_id}"),
            author: review.author.clone(),
            engagement: 0,
            rating: Some(review.rating),
            metadata: MentionMetadata::Review {
                rating: review.rating,
                pros: pros.clone(),
                cons: cons.clone(),
            },
            published_at: review.published_at.unwrap_or_else(Utc::now),
        };

        match ingest_review(ctx, brand, candidate, pros, cons).await {
            Ok(inserted) => {
                stats.record(inserted);
                if inserted {
                    ctx.pace(ctx.config.review_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(brand = %brand.name, error = %e, "review ingestion failed");
                stats.record_failure(&e);
            }
        }
    }

    Ok(stats)
}

fn likes_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?i)what do you like best").expect("valid likes marker regex"))
}

fn dislikes_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?i)what do you dislike").expect("valid dislikes marker regex"))
}

/// G2 review bodies concatenate the "What do you like best?" and "What do
/// you dislike?" answers. Split them back out when the markers survive.
///
/// The markers are matched case-insensitively on the body itself; lowercasing
/// a copy first would shift byte offsets for characters whose lowercase form
/// has a different length.
fn split_pros_cons(body: &str) -> (Option<String>, Option<String>) {
    let (Some(likes), Some(dislikes)) = (likes_marker().find(body), dislikes_marker().find(body))
    else {
        return (None, None);
    };
    if likes.start() >= dislikes.start() {
        return (None, None);
    }

    let pros_raw = &body[likes.start()..dislikes.start()];
    let cons_raw = &body[dislikes.start()..];

    (clean_answer(pros_raw), clean_answer(cons_raw))
}

/// Drops the question prefix, keeping just the answer text.
fn clean_answer(section: &str) -> Option<String> {
    let answer = section
        .split_once('?')
        .map_or(section, |(_, rest)| rest)
        .trim()
        .to_string();
    (!answer.is_empty()).then_some(answer)
}
