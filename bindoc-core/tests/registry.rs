use axum::response::IntoResponse;
use bindoc_core::prelude::*;
use bindoc_core::{error_response, BindError, DocSettings, Validation};
use bindoc_test::TestApp;
use http::StatusCode;
use serde_json::Value;

#[derive(Debug, Default, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
struct CreateUser {
    #[api(example = "user01", desc = "login name")]
    #[validate(custom(function = "bindoc_core::rules::required"))]
    username: String,
    #[api(enums = "1,2,3", default = "2", example = "3")]
    class: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
struct GetUser {
    #[api(path, example = "alice")]
    username: String,
}

#[derive(Debug, Default, Serialize, ApiSchema)]
struct UserView {
    username: String,
    class: Option<String>,
}

async fn create_user(_ctx: ApiContext<()>, req: CreateUser) -> UserView {
    UserView {
        username: req.username,
        class: req.class,
    }
}

async fn get_user(ctx: ApiContext<()>, req: GetUser) -> UserView {
    UserView {
        username: req.username,
        class: ctx.uri().query().map(str::to_string),
    }
}

fn build(settings: DocSettings) -> (ApiGroup, TestApp) {
    let mut router = ApiRouter::new();
    let mut api = ApiGroup::new().with_settings(settings);
    {
        let mut v1 = router.group("/api");
        let mut users = v1.group("users");
        api.register(
            &mut users,
            Method::POST,
            "",
            create_user,
            EndpointOptions::new().with_title("Create user"),
        );
        api.register(
            &mut users,
            Method::GET,
            "/:username",
            get_user,
            EndpointOptions::new(),
        );
        api.register(
            &mut users,
            Method::PUT,
            "/:username",
            create_user,
            EndpointOptions::new()
                .unexported()
                .with_err_handler(|err: BindError| {
                    error_response(StatusCode::UNPROCESSABLE_ENTITY, err.message())
                        .into_response()
                }),
        );
    }
    api.doc_routes(&mut router);
    (api, TestApp::new(router.into_router()))
}

#[tokio::test]
async fn create_user_defaults_class_and_fails_on_username() {
    let (_, app) = build(DocSettings::default());
    app.post("/api/users")
        .body("{}")
        .send()
        .await
        .assert_bad_request()
        .assert_json_path("error", "'username' is required");

    app.post("/api/users")
        .body(r#"{"username": "bob"}"#)
        .send()
        .await
        .assert_ok()
        .assert_json_path("class", "2");
}

#[tokio::test]
async fn path_parameters_reach_the_handler() {
    let (_, app) = build(DocSettings::default());
    app.get("/api/users/alice")
        .send()
        .await
        .assert_ok()
        .assert_json_path("username", "alice");
}

#[tokio::test]
async fn custom_error_handler_replaces_default() {
    let (_, app) = build(DocSettings::default());
    app.put("/api/users/alice")
        .body("{}")
        .send()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_path("error", "'username' is required");
}

#[tokio::test]
async fn schema_flag_is_configurable() {
    let (_, app) = build(DocSettings::default().with_schema_flag("schema"));
    app.get("/api/users/alice")
        .query("schema", "1")
        .send()
        .await
        .assert_ok()
        .assert_json_path("title", "GET /api/users/:username")
        .assert_json_path("request_schema.properties.username.example", "alice");

    // the default flag is now an ordinary query parameter
    app.get("/api/users/alice")
        .query("get_schema", "true")
        .send()
        .await
        .assert_ok()
        .assert_json_path("username", "alice");
}

#[tokio::test]
async fn documents_list_exported_endpoints_only() {
    let (api, app) = build(DocSettings::default().with_title("Users"));
    assert_eq!(api.endpoints().len(), 3);
    assert_eq!(api.exported().len(), 2);

    let md = app.get("/apidoc.md").send().await.assert_ok().text();
    assert!(md.starts_with("# Users"));
    assert!(md.contains("## Create user"));
    assert!(md.contains("`GET /api/users/:username`"));
    assert!(md.contains("GET /api/users/alice"));
    assert!(!md.contains("PUT"));

    let schemas: Vec<Value> = app.get("/apischema").send().await.assert_ok().json();
    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0]["route"], "/api/users");
    assert_eq!(schemas[0]["request_schema"]["properties"]["class"]["default"], "2");
}

#[tokio::test]
async fn document_paths_follow_settings() {
    let mut settings = DocSettings::default();
    settings.html_path = "/docs/index.html".to_string();
    let (_, app) = build(settings);
    app.get("/docs/index.html")
        .send()
        .await
        .assert_ok()
        .assert_content_type("text/html");
    app.get("/apidoc.html").send().await.assert_not_found();
}

struct Templates;

impl ApiProvider<()> for Templates {
    fn templates(&self) -> Vec<ApiTemplate<()>> {
        vec![
            ApiTemplate::new("get_user", Method::GET, "/t/users/:username", get_user)
                .with_title("template get"),
            ApiTemplate::new("create_user", Method::POST, "/t/users", create_user),
        ]
    }
}

#[tokio::test]
async fn register_all_filters_by_name() {
    let mut router = ApiRouter::new();
    let mut api = ApiGroup::new();
    let registered = api.register_all(
        &mut router,
        &Templates,
        |name| name.starts_with("get"),
        EndpointOptions::new(),
    );
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].title, "template get");
    assert_eq!(registered[0].route, "/t/users/:username");

    let app = TestApp::new(router.into_router());
    app.get("/t/users/zed")
        .send()
        .await
        .assert_ok()
        .assert_json_path("username", "zed");
    app.post("/t/users").send().await.assert_not_found();
}

#[test]
#[should_panic(expected = "has no handler to register")]
fn register_all_without_matches_panics() {
    let mut router: ApiRouter = ApiRouter::new();
    let mut api = ApiGroup::new();
    api.register_all(&mut router, &Templates, |_| false, EndpointOptions::new());
}

#[test]
fn register_template_prefers_template_metadata() {
    let mut router: ApiRouter = ApiRouter::new();
    let mut api = ApiGroup::new();
    let endpoint = api.register_template(
        &mut router,
        ApiTemplate::new("get_user", Method::GET, "/users/:username", get_user)
            .with_title("from template")
            .with_description("looked up by name"),
        EndpointOptions::new().with_title("from options"),
    );
    assert_eq!(endpoint.title, "from template");
    assert_eq!(endpoint.description, "looked up by name");
    assert_eq!(
        endpoint.request_schema.description.as_deref(),
        Some("looked up by name")
    );
}

#[test]
fn register_with_doc_sets_title_and_description() {
    let mut router: ApiRouter = ApiRouter::new();
    let mut api = ApiGroup::new();
    let endpoint = api.register_with_doc(
        &mut router,
        Method::POST,
        "/users",
        create_user,
        "Create",
        "Creates a user",
    );
    assert_eq!(endpoint.title, "Create");
    assert_eq!(endpoint.method, "POST");
    assert!(api.generate_markdown().contains("Creates a user"));
}

#[tokio::test]
async fn bodies_over_the_limit_are_rejected() {
    let (_, app) = build(DocSettings::default().with_body_limit(64));
    let oversized = format!(r#"{{"username": "{}"}}"#, "x".repeat(128));
    app.post("/api/users")
        .body(oversized)
        .send()
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_json_path("error", "request body exceeds the limit of 64 bytes");

    app.post("/api/users")
        .body(r#"{"username": "bob"}"#)
        .send()
        .await
        .assert_ok();
}

#[tokio::test]
async fn default_body_limit_applies() {
    let (_, app) = build(DocSettings::default());
    app.post("/api/users")
        .body(vec![b' '; 5 * 1024 * 1024])
        .send()
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[derive(Debug, Default, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
struct Signup {
    #[api(query = "user_name")]
    #[validate(length(min = 3))]
    username: String,
    #[validate(email)]
    email: String,
}

async fn signup(_ctx: ApiContext<()>, req: Signup) -> UserView {
    UserView {
        username: req.username,
        class: None,
    }
}

#[tokio::test]
async fn group_validation_engine_formats_error_bodies() {
    let mut router = ApiRouter::new();
    let mut api = ApiGroup::new().with_validation(Validation::new().with_separator("; "));
    api.register(
        &mut router,
        Method::POST,
        "/signup",
        signup,
        EndpointOptions::new(),
    );
    let app = TestApp::new(router.into_router());
    app.post("/signup")
        .query("user_name", "al")
        .body(r#"{"email": "nope"}"#)
        .send()
        .await
        .assert_bad_request()
        .assert_json_path(
            "error",
            "'email' is not a valid email address; 'user_name' length must be greater or eq than '3'",
        );
}
