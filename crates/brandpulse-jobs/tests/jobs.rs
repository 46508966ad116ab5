//! Batch-job integration tests: mocked upstreams, real Postgres schema.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brandpulse_classifier::ClassifierClient;
use brandpulse_collectors::{CollectorConfig, CollectorContext};
use brandpulse_core::{MentionMetadata, Priority, Sentiment, Source};
use brandpulse_db::{
    create_brand, insert_mention_if_new, insert_review_if_new, latest_job_run, upsert_settings,
    NewBrand, NewMention, NewNotificationSettings, NewReview,
};
use brandpulse_jobs::{run_digest, run_refresh};
use brandpulse_notify::{ChannelConfig, Notifier};

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
}

async fn seed_user_with_brand(pool: &sqlx::PgPool, server: &MockServer) -> (Uuid, i64) {
    let user_id = Uuid::new_v4();
    let brand = create_brand(
        pool,
        &NewBrand {
            user_id,
            name: "Acme".to_string(),
            trustpilot_id: None,
            g2_slug: None,
        },
    )
    .await
    .expect("seed brand");

    let mut settings = NewNotificationSettings::for_user(user_id);
    settings.slack_webhook = Some(format!("{}/slack-hook", server.uri()));
    settings.telegram_chat_id = Some("424242".to_string());
    settings.email = Some("founder@acme.test".to_string());
    upsert_settings(pool, &settings).await.expect("seed settings");

    (user_id, brand.id)
}

async fn mount_channel_mocks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/slack-hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bottest-bot-token/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "em_1"})))
        .mount(server)
        .await;
}

async fn mount_quiet_feeds(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/review/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^(/r/[^/]+)?/search\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"data": {"children": []}}),
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .mount(server)
        .await;
}

fn make_ctx(pool: sqlx::PgPool, server: &MockServer) -> CollectorContext {
    let classifier = ClassifierClient::with_base_url("test-key", "grok-beta", 30, &server.uri())
        .expect("classifier");
    CollectorContext::new(pool, classifier, CollectorConfig::for_mock_server(&server.uri()))
        .expect("context")
}

fn make_notifier(server: &MockServer) -> Notifier {
    Notifier::new(ChannelConfig::for_mock_server(&server.uri())).expect("notifier")
}

#[sqlx::test(migrations = "../../migrations")]
async fn refresh_collects_classifies_and_alerts(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_channel_mocks(&server).await;
    mount_quiet_feeds(&server).await;

    // Live social search finds nothing; sentiment calls come back strongly
    // negative so the article lands at critical.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(
            serde_json::json!({"search_parameters": {"mode": "on"}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("[]")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "{\"sentiment\": \"NEGATIVE\", \"score\": -0.8, \"confidence\": 0.9, \"topics\": [\"outage\"]}",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "articles": [
                {
                    "source": { "name": "TechDaily" },
                    "author": "Jo Writer",
                    "title": "Acme outage enters second day",
                    "description": "Users report total downtime.",
                    "url": "https://technews.example.com/acme-outage",
                    "urlToImage": null,
                    "publishedAt": "2025-06-10T08:00:00Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let (user_id, _brand_id) = seed_user_with_brand(&pool, &server).await;
    let ctx = make_ctx(pool.clone(), &server);
    let notifier = make_notifier(&server);

    let outcome = run_refresh(&ctx, &notifier).await.expect("refresh run");

    assert_eq!(outcome.brands_processed, 1);
    assert_eq!(outcome.items_new, 1);
    assert_eq!(outcome.alerts_delivered, 3);

    let run = latest_job_run(&pool, "refresh")
        .await
        .expect("query")
        .expect("run exists");
    assert_eq!(run.status, "completed");
    assert_eq!(run.metadata["brands_processed"], 1);
    assert_eq!(run.metadata["items_new"], 1);

    let (priority, alert_sent): (String, bool) =
        sqlx::query_as("SELECT priority, alert_sent FROM mentions")
            .fetch_one(&pool)
            .await
            .expect("mention");
    assert_eq!(priority, "critical");
    assert!(alert_sent);

    let audited: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(audited, 3);
}

fn yesterday_noon() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .pred_opt()
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
}

async fn seed_yesterdays_activity(pool: &sqlx::PgPool, brand_id: i64) {
    let published_at = yesterday_noon();

    for (source_id, score, sentiment, priority) in [
        ("pos-1", 0.6_f32, Sentiment::Positive, Priority::Info),
        ("neg-1", -0.7_f32, Sentiment::Negative, Priority::Critical),
    ] {
        insert_mention_if_new(
            pool,
            &NewMention {
                brand_id,
                source: Source::Reddit,
                source_id: source_id.to_string(),
                title: Some(format!("thread {source_id}")),
                content: "body".to_string(),
                url: format!("https://reddit.com/comments/{source_id}"),
                author: "u/poster".to_string(),
                sentiment,
                sentiment_score: score,
                priority,
                region: None,
                metadata: MentionMetadata::Social {
                    engagement: 10,
                    comments: None,
                    subreddit: None,
                },
                published_at,
            },
        )
        .await
        .expect("seed mention");
    }

    insert_review_if_new(
        pool,
        &NewReview {
            brand_id,
            source: Source::Trustpilot,
            source_id: "tp-1".to_string(),
            rating: 2,
            title: None,
            content: "not great".to_string(),
            author: "Pat".to_string(),
            sentiment: Sentiment::Negative,
            region: None,
            pros: None,
            cons: None,
            url: "https://www.trustpilot.com/review/acme#tp-1".to_string(),
            published_at,
        },
    )
    .await
    .expect("seed review");
}

#[sqlx::test(migrations = "../../migrations")]
async fn digest_falls_back_to_template_when_model_is_down(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_channel_mocks(&server).await;

    // Summary generation fails; the deterministic template takes over.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (user_id, brand_id) = seed_user_with_brand(&pool, &server).await;
    seed_yesterdays_activity(&pool, brand_id).await;

    let classifier = ClassifierClient::with_base_url("test-key", "grok-beta", 30, &server.uri())
        .expect("classifier");
    let notifier = make_notifier(&server);

    let outcome = run_digest(&pool, &classifier, &notifier)
        .await
        .expect("digest run");
    assert_eq!(outcome.users_processed, 1);
    assert_eq!(outcome.digests_generated, 1);

    let (summary, mention_count, review_count, label): (String, i32, i32, String) = sqlx::query_as(
        "SELECT summary, mention_count, review_count, sentiment_label FROM digests WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .expect("digest row");

    assert_eq!(mention_count, 2);
    assert_eq!(review_count, 1);
    assert_eq!(label, "Neutral");
    assert_eq!(
        summary,
        "Yesterday you had 2 mentions and 1 reviews. Overall sentiment was Neutral."
    );

    let included: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM mentions WHERE digest_included = TRUE")
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(included, 2);

    let run = latest_job_run(&pool, "digest")
        .await
        .expect("query")
        .expect("run exists");
    assert_eq!(run.status, "completed");
    assert_eq!(run.metadata["digests_generated"], 1);
    assert_eq!(run.metadata["results"][0]["status"], "generated");
}

#[sqlx::test(migrations = "../../migrations")]
async fn digest_skips_users_without_notification_settings(pool: sqlx::PgPool) {
    let server = MockServer::start().await;

    // A brand with yesterday's activity, but its owner never configured
    // notification delivery.
    let user_id = Uuid::new_v4();
    let brand = create_brand(
        &pool,
        &NewBrand {
            user_id,
            name: "Acme".to_string(),
            trustpilot_id: None,
            g2_slug: None,
        },
    )
    .await
    .expect("seed brand");
    seed_yesterdays_activity(&pool, brand.id).await;

    let classifier = ClassifierClient::with_base_url("test-key", "grok-beta", 30, &server.uri())
        .expect("classifier");
    let notifier = make_notifier(&server);

    let outcome = run_digest(&pool, &classifier, &notifier)
        .await
        .expect("digest run");
    assert_eq!(outcome.users_processed, 0);
    assert_eq!(outcome.digests_generated, 0);

    let digests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM digests")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(digests, 0);

    let run = latest_job_run(&pool, "digest")
        .await
        .expect("query")
        .expect("run exists");
    assert_eq!(run.status, "completed");
    assert_eq!(run.metadata["users_skipped"], 1);
    assert_eq!(run.metadata["results"][0]["status"], "skipped");
}

#[sqlx::test(migrations = "../../migrations")]
async fn digest_skips_users_with_no_activity(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let (_user_id, _brand_id) = seed_user_with_brand(&pool, &server).await;

    let classifier = ClassifierClient::with_base_url("test-key", "grok-beta", 30, &server.uri())
        .expect("classifier");
    let notifier = make_notifier(&server);

    let outcome = run_digest(&pool, &classifier, &notifier)
        .await
        .expect("digest run");
    assert_eq!(outcome.users_processed, 1);
    assert_eq!(outcome.digests_generated, 0);

    let digests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM digests")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(digests, 0);
}
