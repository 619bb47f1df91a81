use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::auth::AppState;
use server::routes;
use service::auth::verifier::mock::StaticTokenVerifier;
use service::storage::Storage;

const TOKEN: &str = "editor-token";

async fn build_app() -> anyhow::Result<Router> {
    let storage = Storage::in_memory().await?;
    let verifier = StaticTokenVerifier::default().allow(TOKEN, "editor").forbid("reader-token", "read only");
    Ok(routes::build_router(AppState::new(storage, Arc::new(verifier)), CorsLayer::very_permissive()))
}

async fn send_as(app: &Router, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = resp.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    send_as(app, method, uri, body, Some(TOKEN)).await
}

async fn get(app: &Router, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    send_as(app, Method::GET, uri, None, None).await
}

#[tokio::test]
async fn mood_disorders_scenario() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, topic) = send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(topic["data"]["id"], 1);

    let (status, condition) =
        send(&app, Method::POST, "/api/v1/conditions", Some(json!({"name": "Sample Condition", "topic_id": 1}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(condition["data"]["id"], 1);

    let phase = json!({"position": 1, "title": "Intake", "details": "First visit", "condition_id": 1});
    let (status, _) = send(&app, Method::POST, "/api/v1/phases", Some(phase)).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/api/v1/conditions/1?expand=phases").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["name"], "Sample Condition");
    let phases = body["data"]["phases"].as_array().cloned().unwrap_or_default();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0]["position"], 1);
    assert_eq!(phases[0]["title"], "Intake");
    assert!(body.get("meta").is_none());
    assert!(body["data"].get("indicators").is_none());
    Ok(())
}

#[tokio::test]
async fn reads_are_public_and_writes_need_a_token() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = send_as(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "A"})), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "Unauthorized");

    let (status, _) = send_as(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "A"})), Some("bogus")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_as(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "A"})), Some("reader-token")).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "Forbidden");

    let (status, body) = get(&app, "/api/v1/topics").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn pagination_envelope_and_bounds() -> anyhow::Result<()> {
    let app = build_app().await?;
    for i in 1..=25 {
        let (status, _) = send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": format!("topic {i:02}")}))).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/v1/topics?page=2&page_size=10").await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"].as_array().map(|a| a.iter().filter_map(|t| t["id"].as_i64()).collect()).unwrap_or_default();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
    assert_eq!(body["meta"], json!({"page": 2, "page_size": 10, "total": 25, "total_pages": 3}));

    let (status, body) = get(&app, "/api/v1/topics?page=99").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 25);

    let (_, body) = get(&app, "/api/v1/topics?page_size=500").await?;
    assert_eq!(body["meta"]["page_size"], 100);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(25));

    let (status, body) = get(&app, "/api/v1/topics?page=0").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "ValidationError");
    assert!(body["error"]["fields"]["page"].is_string());

    let (status, _) = get(&app, "/api/v1/topics?page=abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/api/v1/topics?sort=-title&page_size=1").await?;
    assert_eq!(body["data"][0]["title"], "topic 25");

    let (status, body) = get(&app, "/api/v1/topics?sort=nope").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["sort"].is_string());
    Ok(())
}

#[tokio::test]
async fn largest_page_number_returns_an_empty_page() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;

    let (status, body) = get(&app, "/api/v1/topics?page=18446744073709551615&page_size=100").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["page"], json!(u64::MAX));
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["total_pages"], 1);

    let (status, body) = get(&app, "/api/v1/conditions?page=18446744073709551615").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn sort_without_a_field_is_rejected() -> anyhow::Result<()> {
    let app = build_app().await?;
    for uri in ["/api/v1/topics?sort=-", "/api/v1/phases?sort=", "/api/v1/indicators?sort=%20-"] {
        let (status, body) = get(&app, uri).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["kind"], "ValidationError");
        assert!(body["error"]["fields"]["sort"].is_string(), "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn unrouted_method_gets_the_error_envelope() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;

    let (status, body) = send(&app, Method::POST, "/api/v1/topics/1", Some(json!({"title": "again"}))).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["kind"], "MethodNotAllowed");
    assert!(body["error"]["message"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/v1/conditions/1/indicators/1", None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["kind"], "MethodNotAllowed");

    let (status, body) = send(&app, Method::DELETE, "/health", None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["kind"], "MethodNotAllowed");
    Ok(())
}

#[tokio::test]
async fn validation_duplicate_and_foreign_key_errors() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "   "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "ValidationError");
    assert!(body["error"]["fields"]["title"].is_string());

    let (status, body) = send(&app, Method::POST, "/api/v1/topics", Some(json!({"summary": "no title"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["body"].is_string());

    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;
    let (status, body) = send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "DuplicateKey");
    let (_, list) = get(&app, "/api/v1/topics").await?;
    assert_eq!(list["meta"]["total"], 1);

    let (status, body) =
        send(&app, Method::POST, "/api/v1/conditions", Some(json!({"name": "Orphan", "topic_id": 999}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "ForeignKeyViolation");
    assert!(body["error"]["fields"]["topic_id"].is_string());
    let (_, list) = get(&app, "/api/v1/conditions").await?;
    assert_eq!(list["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn retrieve_errors() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;

    let (status, body) = get(&app, "/api/v1/topics/42").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");

    let (status, body) = get(&app, "/api/v1/topics/1?expand=phases").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["expand"].is_string());

    let (status, _) = get(&app, "/api/v1/topics/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/v1/nothing-here").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");
    Ok(())
}

#[tokio::test]
async fn indicator_links_and_expansion() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders"}))).await?;
    for label in ["fatigue", "insomnia", "unrelated"] {
        send(&app, Method::POST, "/api/v1/indicators", Some(json!({"label": label}))).await?;
    }
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/conditions",
        Some(json!({"name": "Sample", "topic_id": 1, "indicator_ids": [2]})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::PUT, "/api/v1/conditions/1/indicators/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::PUT, "/api/v1/conditions/1/indicators/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/v1/conditions/1?expand=indicators,topic").await?;
    let labels: Vec<&str> = body["data"]["indicators"]
        .as_array()
        .map(|a| a.iter().filter_map(|i| i["label"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(labels, vec!["fatigue", "insomnia"]);
    assert_eq!(body["data"]["topic"]["title"], "Mood Disorders");

    let (_, body) = get(&app, "/api/v1/indicators?condition_id=1").await?;
    assert_eq!(body["meta"]["total"], 2);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/conditions/1/indicators/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/conditions/1/indicators/1", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn replace_patch_and_delete_policy() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, Method::POST, "/api/v1/topics", Some(json!({"title": "Mood Disorders", "summary": "s"}))).await?;
    send(&app, Method::POST, "/api/v1/groups", Some(json!({"label": "Chronic"}))).await?;
    send(&app, Method::POST, "/api/v1/conditions", Some(json!({"name": "Sample", "topic_id": 1, "group_id": 1}))).await?;

    let (status, body) = send(&app, Method::PATCH, "/api/v1/topics/1", Some(json!({"summary": null}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], Value::Null);
    assert_eq!(body["data"]["title"], "Mood Disorders");

    let (status, body) = send(&app, Method::PUT, "/api/v1/topics/1", Some(json!({"title": "Mood"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Mood");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/topics/1", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "Conflict");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/groups/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/api/v1/conditions/1?expand=group").await?;
    assert_eq!(body["data"]["group_id"], Value::Null);
    assert_eq!(body["data"]["group"], Value::Null);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/conditions/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/topics/1", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, "/api/v1/topics/1").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn health_metrics_and_docs() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = get(&app, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = get(&app, "/api-docs/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/v1/conditions/{id}").is_some());

    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.into_body().collect().await?.to_bytes().to_vec())?;
    assert!(text.contains("catalog_requests_total"));
    Ok(())
}
