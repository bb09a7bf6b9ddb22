use bindoc::prelude::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ApiSchema)]
#[serde(default)]
pub struct User {
    #[api(desc = "login name", example = "user01")]
    pub username: String,
    #[api(desc = "contact address", example = "user01@example.com")]
    pub email: String,
    #[api(enums = "1,2,3,4,5,6", desc = "class of the user")]
    pub class: String,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ApiSchema)]
#[serde(default)]
pub struct Child {
    #[api(desc = "name of the child")]
    pub name: String,
    pub age: i32,
    #[api(example = 1.1, default = 1.4, desc = "points of the child")]
    pub point: f32,
}

/// Envelope of every response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ApiSchema)]
pub struct ApiResponse<T> {
    #[api(desc = "response code, 0 indicates success")]
    pub code: i32,
    #[serde(rename = "err_msg")]
    #[api(example = "-", desc = "response error message")]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
#[api(checks)]
pub struct CreateUserRequest {
    #[api(required, example = "user01", desc = "username for creating a new user")]
    #[validate(custom(function = "bindoc::rules::required"))]
    pub username: String,
    #[api(example = "12345678", desc = "password for creating a new user")]
    #[validate(length(max = 64))]
    pub password: String,
    #[api(enums = "1,2,3,4,5,6", example = "3", default = "2", desc = "class for creating a new user")]
    pub class: Option<String>,
    #[api(desc = "children of the new user")]
    pub children: Vec<Child>,
    #[api(query, example = "user01@example.com", desc = "email of the user")]
    #[validate(email)]
    pub email: Option<String>,
}

impl FieldChecks for CreateUserRequest {
    fn checks<'a>(&'a self, ctx: &CheckCtx) -> Checks<'a> {
        vec![
            ctx.max_length("username", &self.username, 32),
            ctx.str_in("class", self.class.as_deref().unwrap_or_default(), &["1", "2", "3"]),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
pub struct GetUserRequest {
    #[api(path, example = "user01", desc = "user to look up")]
    #[validate(length(min = 1))]
    pub username: String,
    #[api(query, example = "class1")]
    pub class: Option<String>,
    #[api(query, default = 1, example = 1, desc = "detail level")]
    pub level: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ApiSchema, Bind)]
#[serde(default)]
pub struct DocumentRequest {
    #[api(path, example = "doc01", desc = "document name")]
    pub doc_name: String,
    #[api(header = "x-ttl", example = "100s", desc = "requested ttl")]
    pub ttl: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ApiSchema)]
pub struct DocumentResponse {
    pub doc_name: String,
    pub ttl: Option<String>,
}
