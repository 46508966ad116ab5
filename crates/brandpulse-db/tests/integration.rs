//! Gateway integration tests against a real Postgres schema.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use brandpulse_core::{MentionMetadata, Priority, Sentiment, Source};
use brandpulse_db::{
    create_brand, create_job_run, insert_mention_if_new, insert_review_if_new,
    list_mentions_by_brands_and_range, list_unalerted_mentions, mark_alert_sent,
    mark_digest_included, mention_exists, upsert_digest, DbError, InsertOutcome, NewBrand,
    NewDigest, NewMention, NewReview,
};

async fn seed_brand(pool: &sqlx::PgPool, name: &str) -> brandpulse_db::BrandRow {
    create_brand(
        pool,
        &NewBrand {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            trustpilot_id: None,
            g2_slug: None,
        },
    )
    .await
    .expect("seed brand")
}

fn make_mention(brand_id: i64, source_id: &str, priority: Priority) -> NewMention {
    NewMention {
        brand_id,
        source: Source::Reddit,
        source_id: source_id.to_string(),
        title: Some("a post".to_string()),
        content: "post body".to_string(),
        url: format!("https://reddit.com/comments/{source_id}"),
        author: "poster".to_string(),
        sentiment: Sentiment::Negative,
        sentiment_score: -0.4,
        priority,
        region: None,
        metadata: MentionMetadata::Social {
            engagement: 10,
            comments: Some(2),
            subreddit: Some("fintech".to_string()),
        },
        published_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_insert_for_same_source_pair_is_a_noop(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;
    let mention = make_mention(brand.id, "abc123", Priority::Info);

    let first = insert_mention_if_new(&pool, &mention).await.expect("first insert");
    assert_eq!(first, InsertOutcome::Inserted);

    // Same (source, source_id), different content — must not overwrite.
    let mut replay = mention.clone();
    replay.content = "different body".to_string();
    let second = insert_mention_if_new(&pool, &replay).await.expect("second insert");
    assert_eq!(second, InsertOutcome::AlreadyExists);

    let stored: String =
        sqlx::query_scalar("SELECT content FROM mentions WHERE source_id = 'abc123'")
            .fetch_one(&pool)
            .await
            .expect("fetch content");
    assert_eq!(stored, "post body");
}

#[sqlx::test(migrations = "../../migrations")]
async fn mention_exists_reflects_inserts(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;

    assert!(!mention_exists(&pool, Source::Reddit, "xyz").await.unwrap());
    insert_mention_if_new(&pool, &make_mention(brand.id, "xyz", Priority::Info))
        .await
        .unwrap();
    assert!(mention_exists(&pool, Source::Reddit, "xyz").await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn review_uniqueness_is_independent_of_mentions(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;

    // A mention and a review may share a source_id; the tables have
    // independent identity.
    insert_mention_if_new(&pool, &make_mention(brand.id, "shared-id", Priority::Info))
        .await
        .unwrap();

    let review = NewReview {
        brand_id: brand.id,
        source: Source::Reddit,
        source_id: "shared-id".to_string(),
        rating: 1,
        title: None,
        content: "terrible support".to_string(),
        author: "reviewer".to_string(),
        sentiment: Sentiment::Negative,
        region: None,
        pros: None,
        cons: None,
        url: "https://example.com/r/1".to_string(),
        published_at: Utc::now(),
    };

    assert_eq!(
        insert_review_if_new(&pool, &review).await.unwrap(),
        InsertOutcome::Inserted
    );
    assert_eq!(
        insert_review_if_new(&pool, &review).await.unwrap(),
        InsertOutcome::AlreadyExists
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn unalerted_list_excludes_info_and_already_sent(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;

    insert_mention_if_new(&pool, &make_mention(brand.id, "crit-1", Priority::Critical))
        .await
        .unwrap();
    insert_mention_if_new(&pool, &make_mention(brand.id, "warn-1", Priority::Warning))
        .await
        .unwrap();
    insert_mention_if_new(&pool, &make_mention(brand.id, "info-1", Priority::Info))
        .await
        .unwrap();

    let pending = list_unalerted_mentions(&pool, brand.id).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|m| m.priority != "info"));

    mark_alert_sent(&pool, pending[0].id).await.unwrap();
    let remaining = list_unalerted_mentions(&pool, brand.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn date_range_bounds_are_inclusive(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;

    let end_of_day = Utc.with_ymd_and_hms(2025, 6, 10, 23, 59, 59).unwrap();
    let next_midnight = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();

    let mut inside = make_mention(brand.id, "inside", Priority::Info);
    inside.published_at = end_of_day;
    insert_mention_if_new(&pool, &inside).await.unwrap();

    let mut outside = make_mention(brand.id, "outside", Priority::Info);
    outside.published_at = next_midnight;
    insert_mention_if_new(&pool, &outside).await.unwrap();

    let start = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
    let end = next_midnight - Duration::milliseconds(1);

    let rows = list_mentions_by_brands_and_range(&pool, &[brand.id], start, end)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_id, "inside");
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_digest_included_updates_batch(pool: sqlx::PgPool) {
    let brand = seed_brand(&pool, "Acme").await;
    insert_mention_if_new(&pool, &make_mention(brand.id, "d-1", Priority::Info))
        .await
        .unwrap();
    insert_mention_if_new(&pool, &make_mention(brand.id, "d-2", Priority::Info))
        .await
        .unwrap();

    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM mentions ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    mark_digest_included(&pool, &ids).await.unwrap();

    let flagged: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM mentions WHERE digest_included = TRUE")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(flagged, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn job_run_lifecycle_transitions(pool: sqlx::PgPool) {
    let run = create_job_run(&pool, brandpulse_db::job_runs::JOB_TYPE_REFRESH)
        .await
        .unwrap();
    assert_eq!(run.status, "running");
    assert!(run.completed_at.is_none());

    brandpulse_db::complete_job_run(&pool, run.id, &serde_json::json!({"items_new": 3}))
        .await
        .unwrap();

    // Completing twice is an invalid transition.
    let err = brandpulse_db::complete_job_run(&pool, run.id, &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidJobRunTransition { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_job_run_records_error(pool: sqlx::PgPool) {
    let run = create_job_run(&pool, brandpulse_db::job_runs::JOB_TYPE_DIGEST)
        .await
        .unwrap();
    brandpulse_db::fail_job_run(&pool, run.id, "classifier unreachable")
        .await
        .unwrap();

    let stored = brandpulse_db::get_job_run_by_public_id(&pool, run.public_id)
        .await
        .unwrap();
    assert_eq!(stored.status, "failed");
    assert_eq!(stored.error_message.as_deref(), Some("classifier unreachable"));
    assert!(stored.completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn digest_upsert_replaces_same_day_row(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

    let first = NewDigest {
        user_id,
        digest_date: date,
        summary: "first pass".to_string(),
        mention_count: 2,
        review_count: 0,
        avg_sentiment: 0.1,
        sentiment_label: "Neutral".to_string(),
        highlights: serde_json::json!([]),
    };
    upsert_digest(&pool, &first).await.unwrap();

    let mut second = first.clone();
    second.summary = "second pass".to_string();
    second.mention_count = 3;
    upsert_digest(&pool, &second).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM digests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let stored = brandpulse_db::get_digest(&pool, user_id, date)
        .await
        .unwrap()
        .expect("digest exists");
    assert_eq!(stored.summary, "second pass");
    assert_eq!(stored.mention_count, 3);
}
