//! Declarative request binding, validation and API documentation for Axum.
//!
//! Request and response types derive [`ApiSchema`] and [`Bind`]; an
//! [`ApiGroup`] registers typed handlers on an [`ApiRouter`], records one
//! [`Endpoint`] per route and renders Markdown and HTML documents from them.
//!
//! ```ignore
//! use bindoc::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize, Validate, ApiSchema, Bind)]
//! #[serde(default)]
//! struct GetUser {
//!     #[api(path, desc = "user name", example = "alice")]
//!     #[validate(length(min = 1))]
//!     username: String,
//! }
//!
//! #[derive(Debug, Default, Serialize, ApiSchema)]
//! struct User {
//!     username: String,
//! }
//!
//! async fn get_user(_ctx: ApiContext<()>, req: GetUser) -> User {
//!     User { username: req.username }
//! }
//!
//! let mut router = ApiRouter::new();
//! let mut api = ApiGroup::new();
//! api.register(&mut router, Method::GET, "/users/:username", get_user, EndpointOptions::new());
//! api.doc_routes(&mut router);
//! let app: axum::Router = router.into_router();
//! ```

// Generated code refers to `::bindoc::...` when this crate is a dependency.
extern crate self as bindoc;

pub use bindoc_core::*;
