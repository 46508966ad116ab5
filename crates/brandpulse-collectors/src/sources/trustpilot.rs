//! Trustpilot review collector (public review-page structured data).

use chrono::Utc;

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
    let page_slug = brand
        .trustpilot_id
        .clone()
        .unwrap_or_else(|| name_slug(&brand.name));

    let page_url = format!(
        "{}/review/{}",
        ctx.config.trustpilot_base_url,
        encode_path_segment(&page_slug)
    );
    let response = ctx.http.get(&page_url).send().await?;
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CollectorError::RateLimited);
    }
    let html = response.error_for_status()?.text().await?;

    let mut stats = SourceStats::default();
    for review in extract_reviews(&html) {
        // Trustpilot gives stable review ids in its structured data; the
        // body digest covers pages that omit them.
        let native_id = review
            .id
            .clone()
            .unwrap_or_else(|| sha256_hex(&format!("{}:{}", review.author, review.body)));

        let candidate = MentionCandidate {
            source: Source::Trustpilot,
            source_id: native_id.clone(),
            title: review.title.clone(),
            content: review.body.clone(),
            url: format!("{page_url}#{native_id}"),
            author: review.author.clone(),
            engagement: 0,
            rating: Some(review.rating),
            metadata: MentionMetadata::Review {
                rating: review.rating,
                pros: None,
                cons: None,
            },
            published_at: review.published_at.unwrap_or_else(Utc::now),
        };

        match ingest_review(ctx, brand, candidate, None, None).await {
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

/// Trustpilot pages are keyed by company domain when one is configured;
/// otherwise the lowercased, whitespace-free brand name usually resolves.
fn name_slug(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
