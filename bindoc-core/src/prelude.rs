//! Everything a service needs to declare and register endpoints.
//!
//! ```ignore
//! use bindoc::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize, Validate, ApiSchema, Bind)]
//! struct GetUser {
//!     #[api(path, desc = "user name", example = "alice")]
//!     username: String,
//! }
//! ```

pub use bindoc_macros::{ApiSchema, Bind};

pub use crate::bind::{Bind, BindError};
pub use crate::checks::{CheckCtx, CheckError, Checks, FieldChecks};
pub use crate::config::{AppConfig, DocSettings};
pub use crate::handler::ApiContext;
pub use crate::registry::{ApiGroup, ApiProvider, ApiTemplate, Endpoint, EndpointOptions};
pub use crate::router::{ApiRouter, BasicRouter};
pub use crate::schema::ApiSchema;

pub use http::Method;
pub use serde::{Deserialize, Serialize};
pub use validator::Validate;
