use axum::extract::{Query, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use bindoc_test::TestApp;
use serde_json::{json, Value};
use std::collections::HashMap;

fn app() -> TestApp {
    let router = Router::new()
        .route(
            "/echo",
            post(|Json(body): Json<Value>| async move { Json(body) }),
        )
        .route(
            "/query",
            get(|Query(params): Query<HashMap<String, String>>| async move { Json(params) }),
        )
        .route(
            "/header",
            get(|req: Request| async move {
                req.headers()
                    .get("x-name")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string()
            }),
        );
    TestApp::new(router)
}

#[tokio::test]
async fn posts_json() {
    app()
        .post("/echo")
        .json(&json!({"users": [{"name": "alice"}]}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("users[0].name", "alice")
        .assert_json_path("users.len()", 1);
}

#[tokio::test]
async fn encodes_query_params() {
    let resp = app()
        .get("/query")
        .query("q", "a b&c")
        .query("page", 2)
        .send()
        .await
        .assert_ok();
    assert_eq!(resp.json_path::<String>("q"), "a b&c");
    assert_eq!(resp.json_path::<String>("page"), "2");
}

#[tokio::test]
async fn sends_headers() {
    app()
        .get("/header")
        .header("x-name", "bob")
        .send()
        .await
        .assert_ok()
        .assert_body_contains("bob")
        .assert_content_type("text/plain");
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    app().get("/nope").send().await.assert_not_found();
}
