use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::Value;
use theme_insights::{
    api::{router, AppState},
    data::{
        comments::{Sentiment, ThemeKey, ThemeKind},
        store::{Insight, InsightCache, InsightTable},
    },
};
use tower::ServiceExt;

fn seeded(dir: &tempfile::TempDir) -> AppState {
    let path = dir.path().join("theme_insights.json");
    let mut insight = Insight::default();
    insight.set(
        Sentiment::Negative,
        "Rosters change weekly.".into(),
        vec!["Freeze rosters 4 weeks ahead".into()],
    );
    let mut table = InsightTable::new();
    table.insert(&ThemeKey::new(ThemeKind::Sub, "fifo"), insight);
    table.write(&path).unwrap();
    AppState {
        cache: Arc::new(InsightCache::new(path)),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn lookup_by_type_and_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(seeded(&dir));

    let response = app
        .oneshot(post_json(
            "/theme-insights",
            r#"{"theme_type":"sub_theme","theme_name":"fifo"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["found"], true);
    assert_eq!(json["key"], "sub_theme_fifo");
    assert_eq!(json["negative_summary"], "Rosters change weekly.");
    assert_eq!(json["positive_summary"], "");
}

#[tokio::test]
async fn unknown_theme_answers_with_empty_insight() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(seeded(&dir));

    let response = app
        .oneshot(post_json(
            "/theme-insights",
            r#"{"theme_type":"base_theme","theme_name":"Nope"}"#,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["found"], false);
    assert_eq!(json["negative_recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn bad_theme_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(seeded(&dir))
        .oneshot(post_json(
            "/theme-insights",
            r#"{"theme_type":"topic","theme_name":"fifo"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn key_route_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let state = seeded(&dir);

    let hit = router(state.clone())
        .oneshot(Request::get("/theme-insights/sub_theme_fifo").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(hit.status(), StatusCode::OK);

    let miss = router(state)
        .oneshot(Request::get("/theme-insights/sub_theme_FIFO").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_picks_up_a_new_run() {
    let dir = tempfile::tempdir().unwrap();
    let state = seeded(&dir);
    assert_eq!(state.cache.table().len(), 1);

    let mut table = InsightTable::new();
    table.insert(&ThemeKey::new(ThemeKind::Base, "Pay"), Insight::default());
    table.insert(&ThemeKey::new(ThemeKind::Base, "Safety"), Insight::default());
    table.write(state.cache.path()).unwrap();

    let response = router(state.clone())
        .oneshot(post_json("/theme-insights/reload", ""))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["entries"], 2);
    assert!(state.cache.lookup(&ThemeKey::new(ThemeKind::Sub, "fifo")).is_empty());
}
