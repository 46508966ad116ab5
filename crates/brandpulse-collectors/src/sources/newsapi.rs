//! NewsAPI article collector.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use brandpulse_core::{MentionMetadata, Source};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::ingest::{ingest_mention, MentionCandidate};
use crate::report::SourceStats;
use crate::util::sha256_hex;

const PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    source: ArticleSource,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: String,
    url_to_image: Option<String>,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub(crate) async fn collect(
    ctx: &CollectorContext,
    brand: &BrandTarget,
) -> Result<SourceStats, CollectorError> {
    let Some(api_key) = ctx.config.news_api_key.as_deref() else {
        tracing::debug!(brand = %brand.name, "no NewsAPI key configured, skipping");
        return Ok(SourceStats::default());
    };

    let url = format!("{}/v2/everything", ctx.config.news_base_url);
    let response = ctx
        .http
        .get(&url)
        .header("X-Api-Key", api_key)
        .query(&[
            ("q", format!("\"{}\"", brand.name)),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
        ])
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CollectorError::RateLimited);
    }
    let parsed: NewsResponse = response.error_for_status()?.json().await?;

    if parsed.status != "ok" {
        return Err(CollectorError::Api(
            parsed.message.unwrap_or_else(|| "NewsAPI returned a non-ok status".to_string()),
        ));
    }

    let mut stats = SourceStats::default();
    for article in parsed.articles {
        let Some(title) = article.title.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let content = match &article.description {
            Some(description) if !description.trim().is_empty() => {
                format!("{title}. {description}")
            }
            _ => title.clone(),
        };

        let candidate = MentionCandidate {
            source: Source::NewsApi,
            // Articles carry no native id; the URL digest is the identity.
            source_id: sha256_hex(&article.url),
            title: Some(title),
            content,
            url: article.url,
            author: article.author.unwrap_or_else(|| "Unknown".to_string()),
            engagement: 0,
            rating: None,
            metadata: MentionMetadata::News {
                publisher: article
                    .source
                    .name
                    .unwrap_or_else(|| "Unknown".to_string()),
                image_url: article.url_to_image,
            },
            published_at: article.published_at,
        };

        match ingest_mention(ctx, brand, candidate).await {
            Ok(inserted) => {
                stats.record(inserted);
                if inserted {
                    ctx.pace(ctx.config.feed_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(brand = %brand.name, error = %e, "article ingestion failed");
                stats.record_failure(&e);
            }
        }
    }

    Ok(stats)
}
