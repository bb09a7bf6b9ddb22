// Lets the derive output (`::bindoc_core::...`) resolve inside this crate's
// own tests.
extern crate self as bindoc_core;

pub mod bind;
pub mod checks;
pub mod config;
pub mod document;
pub mod error;
pub mod example;
pub mod handler;
pub mod layers;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod rules;
pub mod schema;
pub mod validation;

pub use bind::{bind_request, Bind, BindError, FromParam, ParamParseError, ParamSource};
pub use checks::{CheckCtx, CheckError, Checks, FieldChecks};
pub use config::{
    AppConfig, ConfigError, ConfigValue, DocSettings, FromConfigValue, DEFAULT_BODY_LIMIT,
};
pub use document::{render_document, DocError, DocFormat, FieldDoc};
pub use error::error_response;
pub use handler::{ApiContext, ApiHandler, ErrHandler};
pub use layers::{catch_panic_layer, default_trace, init_tracing};
pub use registry::{ApiGroup, ApiProvider, ApiTemplate, Endpoint, EndpointOptions};
pub use router::{ApiRouter, BasicRouter, RouteGroup};
pub use schema::{ApiSchema, FieldMeta, Location, Schema, SchemaKind};
pub use validation::{FieldViolation, Validation, Violations};

pub use bindoc_macros::{ApiSchema, Bind};

// Re-exported for generated code and downstream derives.
pub use axum;
pub use http;
pub use validator;
