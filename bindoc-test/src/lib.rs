//! In-process HTTP client for exercising bindoc routers in tests.

mod app;
mod json_path;

pub use app::{TestApp, TestRequest, TestResponse};
pub use json_path::{resolve_path, tokenize_path, PathToken};
