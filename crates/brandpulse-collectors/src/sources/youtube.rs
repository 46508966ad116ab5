//! YouTube video collector (Data API v3 search).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use brandpulse_core::{MentionMetadata, Source};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::ingest::{ingest_mention, MentionCandidate};
use crate::report::SourceStats;

const MAX_RESULTS: u32 = 20;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    published_at: DateTime<Utc>,
    channel_title: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

pub(crate) async fn collect(
    ctx: &CollectorContext,
    brand: &BrandTarget,
) -> Result<SourceStats, CollectorError> {
    let Some(api_key) = ctx.config.youtube_api_key.as_deref() else {
        tracing::debug!(brand = %brand.name, "no YouTube key configured, skipping");
        return Ok(SourceStats::default());
    };

    let url = format!("{}/youtube/v3/search", ctx.config.youtube_base_url);
    let response = ctx
        .http
        .get(&url)
        .query(&[
            ("part", "snippet".to_string()),
            ("q", format!("\"{}\"", brand.name)),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            ("maxResults", MAX_RESULTS.to_string()),
            ("key", api_key.to_string()),
        ])
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CollectorError::RateLimited);
    }
    let parsed: SearchResponse = response.error_for_status()?.json().await?;

    let mut stats = SourceStats::default();
    for item in parsed.items {
        let Some(video_id) = item.id.video_id else {
            continue;
        };
        let snippet = item.snippet;
        let content = if snippet.description.trim().is_empty() {
            snippet.title.clone()
        } else {
            format!("{}. {}", snippet.title, snippet.description)
        };

        let candidate = MentionCandidate {
            source: Source::Youtube,
            source_id: video_id.clone(),
            title: Some(snippet.title),
            content,
            url: format!("https://www.youtube.com/watch?v={video_id}"),
            author: snippet.channel_title.clone(),
            engagement: 0,
            rating: None,
            metadata: MentionMetadata::Video {
                channel_title: snippet.channel_title,
                thumbnail_url: snippet.thumbnails.high.map(|t| t.url),
            },
            published_at: snippet.published_at,
        };

        match ingest_mention(ctx, brand, candidate).await {
            Ok(inserted) => {
                stats.record(inserted);
                if inserted {
                    ctx.pace(ctx.config.feed_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(brand = %brand.name, error = %e, "video ingestion failed");
                stats.record_failure(&e);
            }
        }
    }

    Ok(stats)
}
