use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use koromap::gateway::{GraphApiClient, SignalSource};
use koromap::types::{Level, SignalBucket, VolumeLevel};

fn feed_item(reactions: u64, comments: u64) -> serde_json::Value {
    json!({
        "id": "post",
        "reactions": { "summary": { "total_count": reactions } },
        "comments": { "summary": { "total_count": comments } },
    })
}

#[tokio::test]
async fn successful_fetch_buckets_engagement() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "p1"}, {"id": "p2"}, {"id": "p3"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [feed_item(25, 8), feed_item(5, 4)]
        })))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    let bucket = client.fetch_signals("token", 14).await;

    // reactions 30, comments 12, posts 3 → total 45.
    assert_eq!(bucket.activity_volume, VolumeLevel::Moderate);
    assert_eq!(bucket.reaction_count, Level::High);
    assert_eq!(bucket.comment_count, Level::High);
    assert_eq!(bucket.post_count, Level::Medium);
}

#[tokio::test]
async fn failed_posts_fetch_degrades_to_default_bucket() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/posts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    let bucket = client.fetch_signals("token", 14).await;
    assert_eq!(bucket, SignalBucket::default());
}

#[tokio::test]
async fn malformed_posts_payload_degrades_to_default_bucket() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    let bucket = client.fetch_signals("token", 14).await;
    assert_eq!(bucket, SignalBucket::default());
}

#[tokio::test]
async fn failed_feed_fetch_keeps_post_count_only() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "p1"}, {"id": "p2"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    let counts = client.fetch_engagement("token", 14).await.unwrap();
    assert_eq!(counts.posts, 2);
    assert_eq!(counts.reactions, 0);
    assert_eq!(counts.comments, 0);
}

#[tokio::test]
async fn verify_access_token_returns_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12345",
            "name": "Hanako"
        })))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    let user = client.verify_access_token("token").await.unwrap();
    assert_eq!(user.id, "12345");
    assert_eq!(user.name, "Hanako");
}

#[tokio::test]
async fn verify_access_token_rejects_bad_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = GraphApiClient::with_base_url(server.uri());
    assert!(client.verify_access_token("bad").await.is_err());
}
