//! Reddit mention collector (public search endpoint, no OAuth).

use chrono::DateTime;
use serde::Deserialize;

use brandpulse_core::{MentionMetadata, Source};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::ingest::{ingest_mention, MentionCandidate};
use crate::report::SourceStats;

const SEARCH_LIMIT: u32 = 25;

/// Communities where SaaS brand chatter concentrates. The sweep checks the
/// first few on top of the sitewide search.
const SUBREDDITS: &[&str] = &["technology", "startups", "smallbusiness", "Entrepreneur", "SaaS"];
const SUBREDDIT_SWEEP: usize = 3;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
    author: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    created_utc: f64,
    subreddit: String,
}

pub(crate) async fn collect(
    ctx: &CollectorContext,
    brand: &BrandTarget,
) -> Result<SourceStats, CollectorError> {
    let mut stats = SourceStats::default();

    let global_url = format!("{}/search.json", ctx.config.reddit_base_url);
    let posts = fetch_posts(ctx, &global_url, &brand.name, false).await?;
    ingest_posts(ctx, brand, posts, &mut stats).await;

    // Sitewide search misses posts in smaller communities; sweep a few of
    // them directly. Duplicates fall out at the existence check.
    for subreddit in SUBREDDITS.iter().take(SUBREDDIT_SWEEP) {
        ctx.pace(ctx.config.subreddit_delay).await;
        let url = format!("{}/r/{subreddit}/search.json", ctx.config.reddit_base_url);
        let posts = fetch_posts(ctx, &url, &brand.name, true).await?;
        ingest_posts(ctx, brand, posts, &mut stats).await;
    }

    Ok(stats)
}

async fn fetch_posts(
    ctx: &CollectorContext,
    url: &str,
    brand_name: &str,
    restrict_to_subreddit: bool,
) -> Result<Vec<PostData>, CollectorError> {
    let mut query = vec![
        ("q", format!("\"{brand_name}\"")),
        ("sort", "new".to_string()),
        ("t", "week".to_string()),
        ("limit", SEARCH_LIMIT.to_string()),
        ("raw_json", "1".to_string()),
    ];
    if restrict_to_subreddit {
        query.push(("restrict_sr", "1".to_string()));
    }

    let response = ctx.http.get(url).query(&query).send().await?;

    // Reddit throttles unauthenticated clients aggressively. Back off and
    // let the next scheduled run pick these posts up.
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CollectorError::RateLimited);
    }

    let listing: Listing = response.error_for_status()?.json().await?;
    Ok(listing.data.children.into_iter().map(|p| p.data).collect())
}

async fn ingest_posts(
    ctx: &CollectorContext,
    brand: &BrandTarget,
    posts: Vec<PostData>,
    stats: &mut SourceStats,
) {
    for data in posts {
        let engagement = data.score + data.num_comments;
        let content = if data.selftext.trim().is_empty() {
            data.title.clone()
        } else {
            format!("{}. {}", data.title, data.selftext)
        };

        #[allow(clippy::cast_possible_truncation)]
        let Some(published_at) = DateTime::from_timestamp(data.created_utc as i64, 0) else {
            stats.record_failure(&CollectorError::Parse(format!(
                "bad created_utc: {}",
                data.created_utc
            )));
            continue;
        };

        let candidate = MentionCandidate {
            source: Source::Reddit,
            source_id: data.id,
            title: Some(data.title),
            content,
            url: format!("https://www.reddit.com{}", data.permalink),
            author: format!("u/{}", data.author),
            engagement,
            rating: None,
            metadata: MentionMetadata::Social {
                engagement,
                comments: Some(data.num_comments),
                subreddit: Some(data.subreddit),
            },
            published_at,
        };

        match ingest_mention(ctx, brand, candidate).await {
            Ok(inserted) => {
                stats.record(inserted);
                if inserted {
                    ctx.pace(ctx.config.review_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(brand = %brand.name, error = %e, "post ingestion failed");
                stats.record_failure(&e);
            }
        }
    }
}
