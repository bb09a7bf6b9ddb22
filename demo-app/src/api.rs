use bindoc::prelude::*;

use crate::models::{
    ApiResponse, CreateUserRequest, DocumentRequest, DocumentResponse, GetUserRequest, User,
};
use crate::state::AppState;

pub async fn create_user(
    ctx: ApiContext<AppState>,
    req: CreateUserRequest,
) -> ApiResponse<User> {
    let user = User {
        username: req.username,
        email: req.email.unwrap_or_default(),
        class: req.class.unwrap_or_default(),
        children: req.children,
    };
    tracing::info!(username = %user.username, "Creating user");
    ApiResponse::ok(ctx.state.users.save(user).await)
}

pub async fn get_user(ctx: ApiContext<AppState>, req: GetUserRequest) -> ApiResponse<User> {
    match ctx.state.users.get(&req.username).await {
        Some(user) => ApiResponse::ok(user),
        None => ApiResponse::error(404, format!("user '{}' not found", req.username)),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
pub struct ListUsersRequest {
    #[api(query, default = 10, example = 2, desc = "maximum number of users")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
}

pub async fn list_users(
    ctx: ApiContext<AppState>,
    req: ListUsersRequest,
) -> ApiResponse<Vec<User>> {
    let mut users = ctx.state.users.list().await;
    users.truncate(req.limit);
    ApiResponse::ok(users)
}

pub async fn get_document(
    _ctx: ApiContext<AppState>,
    req: DocumentRequest,
) -> ApiResponse<DocumentResponse> {
    ApiResponse::ok(DocumentResponse {
        doc_name: req.doc_name,
        ttl: req.ttl,
    })
}

/// User routes declared as a table, registered with `ApiGroup::register_all`.
pub struct UserTemplates;

impl ApiProvider<AppState> for UserTemplates {
    fn templates(&self) -> Vec<ApiTemplate<AppState>> {
        vec![
            ApiTemplate::new("get_user", Method::GET, "/sapi/users/:username", get_user)
                .with_title("get user")
                .with_description("Look a user up by name"),
            ApiTemplate::new("create_user", Method::POST, "/sapi/users", create_user)
                .with_title("create user")
                .with_description("Create or replace a user"),
            ApiTemplate::new("list_users", Method::GET, "/sapi/users", list_users)
                .with_title("list users"),
        ]
    }
}
