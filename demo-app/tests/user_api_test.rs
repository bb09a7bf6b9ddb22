use bindoc::DocSettings;
use bindoc_test::TestApp;
use demo_app::state::AppState;
use demo_app::{build_api, build_app};
use serde_json::{json, Value};

fn app() -> TestApp {
    let settings = DocSettings::default().with_title("User Service API");
    TestApp::new(build_app(settings, AppState::default()))
}

#[tokio::test]
async fn create_user_applies_class_default_then_validates_username() {
    app()
        .post("/api/users")
        .json(&json!({}))
        .send()
        .await
        .assert_bad_request()
        .assert_json_path("error", "'username' is required");
}

#[tokio::test]
async fn create_user_succeeds_with_default_class() {
    app()
        .post("/api/users")
        .query("email", "carol@example.com")
        .json(&json!({"username": "carol", "password": "secret"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("code", 0)
        .assert_json_path("data.username", "carol")
        .assert_json_path("data.class", "2")
        .assert_json_path("data.email", "carol@example.com");
}

#[tokio::test]
async fn body_class_wins_over_default() {
    app()
        .post("/api/users")
        .json(&json!({"username": "dave", "class": "3"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.class", "3");
}

#[tokio::test]
async fn ad_hoc_checks_run_before_validation() {
    app()
        .post("/api/users")
        .json(&json!({"class": "5"}))
        .send()
        .await
        .assert_bad_request()
        .assert_json_path("error", "class value should be one of [1 2 3]");
}

#[tokio::test]
async fn query_values_are_validated() {
    app()
        .post("/api/users")
        .query("email", "not-an-email")
        .json(&json!({"username": "erin"}))
        .send()
        .await
        .assert_bad_request()
        .assert_json_path("error", "'email' is not a valid email address");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    app()
        .post("/api/users")
        .body("{not json")
        .send()
        .await
        .assert_bad_request()
        .assert_json_path_fn("error", |v| {
            v.as_str().is_some_and(|s| s.starts_with("json unmarshal error"))
        });
}

#[tokio::test]
async fn get_user_binds_path_parameter() {
    app()
        .get("/api/users/alice")
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.username", "alice")
        .assert_json_path("data.email", "alice@example.com");
}

#[tokio::test]
async fn get_unknown_user_reports_in_envelope() {
    app()
        .get("/api/users/zoe")
        .send()
        .await
        .assert_ok()
        .assert_json_path("code", 404)
        .assert_json_path("data", Value::Null);
}

#[tokio::test]
async fn invalid_query_scalar_is_a_conversion_error() {
    app()
        .get("/api/users/alice")
        .query("level", "high")
        .send()
        .await
        .assert_bad_request()
        .assert_json_path_fn("error", |v| {
            v.as_str()
                .is_some_and(|s| s.starts_with("bind field 'level'") && s.ends_with(":high"))
        });
}

#[tokio::test]
async fn header_fields_are_bound() {
    app()
        .get("/api/users/docs/readme")
        .header("x-ttl", "100s")
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.doc_name", "readme")
        .assert_json_path("data.ttl", "100s");
}

#[tokio::test]
async fn list_users_uses_query_default_and_limit() {
    let app = app();
    app.get("/api/users")
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.len()", 2);
    app.get("/api/users")
        .query("limit", 1)
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.len()", 1)
        .assert_json_path("data[0].username", "alice");
}

#[tokio::test]
async fn schema_flag_returns_endpoint_record() {
    app()
        .get("/api/users/alice")
        .query("get_schema", "true")
        .send()
        .await
        .assert_ok()
        .assert_json_path("title", "get_user")
        .assert_json_path("method", "GET")
        .assert_json_path("route", "/api/users/:username")
        .assert_json_path("request_schema.properties.username.location", "path")
        .assert_json_path("request_schema.properties.level.default", "1");
}

#[tokio::test]
async fn unexported_templates_are_served_but_not_listed() {
    let app = app();
    app.get("/sapi/users/bob")
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.username", "bob");

    let resp = app.get("/apischema").send().await.assert_ok();
    let records: Vec<Value> = resp.json();
    let routes: Vec<&str> = records
        .iter()
        .filter_map(|r| r["route"].as_str())
        .collect();
    assert_eq!(records.len(), 4);
    assert!(routes.contains(&"/api/users/docs/:doc_name"));
    assert!(!routes.iter().any(|r| r.starts_with("/sapi")));
}

#[tokio::test]
async fn serves_markdown_and_html_documents() {
    let app = app();
    let md = app
        .get("/apidoc.md")
        .send()
        .await
        .assert_ok()
        .assert_content_type("text/plain")
        .text();
    assert!(md.starts_with("# User Service API"));
    assert!(md.contains("`POST /api/users`"));
    assert!(md.contains("GET /api/users/user01?class=class1&level=1"));
    assert!(!md.contains("/sapi/users"));

    app.get("/apidoc.html")
        .send()
        .await
        .assert_ok()
        .assert_content_type("text/html")
        .assert_body_contains("User Service API");
}

#[test]
fn registry_keeps_registration_order() {
    let (api, _) = build_api(DocSettings::default());
    let titles: Vec<String> = api
        .endpoints()
        .iter()
        .map(|e| e.title.clone())
        .collect();
    assert_eq!(
        titles,
        vec!["create_user", "get_user", "get doc", "get user", "create user", "list users"]
    );
}
