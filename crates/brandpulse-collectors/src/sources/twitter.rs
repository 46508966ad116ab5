//! X/Twitter mention collector, backed by the classifier's live search.
//!
//! There is no direct API integration here: the chat model searches X and
//! returns structured posts, which then flow through the normal ingest path.

use brandpulse_core::{MentionMetadata, Source};

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::ingest::{ingest_mention, MentionCandidate};
use crate::report::SourceStats;

pub(crate) async fn collect(
    ctx: &CollectorContext,
    brand: &BrandTarget,
) -> Result<SourceStats, CollectorError> {
    let posts = ctx.classifier.search_social_posts(&brand.name).await?;

    let mut stats = SourceStats::default();
    for post in posts {
        // Retweets weigh double: a reshare puts the post in front of a whole
        // new audience, a like does not.
        let engagement = post.likes + 2 * post.retweets + post.replies;
        let url = post
            .url
            .clone()
            .unwrap_or_else(|| format!("https://x.com/i/status/{}", post.id));

        let candidate = MentionCandidate {
            source: Source::Twitter,
            source_id: post.id,
            title: None,
            content: post.text,
            url,
            author: post.author,
            engagement,
            rating: None,
            metadata: MentionMetadata::Social {
                engagement,
                comments: Some(post.replies),
                subreddit: None,
            },
            published_at: post.created_at,
        };

        match ingest_mention(ctx, brand, candidate).await {
            Ok(inserted) => {
                stats.record(inserted);
                if inserted {
                    ctx.pace(ctx.config.feed_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(brand = %brand.name, error = %e, "post ingestion failed");
                stats.record_failure(&e);
            }
        }
    }

    Ok(stats)
}
