//! Typed handlers and the axum wrapper that binds their requests.

use crate::bind::{bind_request, parse_bool, Bind, BindError, ParamSource};
use crate::registry::Endpoint;
use crate::validation::Validation;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Json;
use http::request::Parts;
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as _;
use std::future::Future;
use std::sync::Arc;
use validator::Validate;

/// Request context handed to a typed handler next to the bound request.
pub struct ApiContext<S> {
    pub state: S,
    pub parts: Parts,
}

impl<S> ApiContext<S> {
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &http::Extensions {
        &self.parts.extensions
    }
}

/// A typed endpoint handler: `async fn(ApiContext<S>, Req) -> Resp`.
///
/// Implemented for every matching async function or closure; `Req` and
/// `Resp` are inferred from its signature.
pub trait ApiHandler<S, Req, Resp>: Clone + Send + Sync + 'static {
    type Future: Future<Output = Resp> + Send + 'static;

    fn call(&self, ctx: ApiContext<S>, req: Req) -> Self::Future;
}

impl<F, Fut, S, Req, Resp> ApiHandler<S, Req, Resp> for F
where
    F: Fn(ApiContext<S>, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Resp> + Send + 'static,
{
    type Future = Fut;

    fn call(&self, ctx: ApiContext<S>, req: Req) -> Self::Future {
        self(ctx, req)
    }
}

/// Custom rendering of binding failures.
pub type ErrHandler = Arc<dyn Fn(BindError) -> Response + Send + Sync>;

/// Default failure rendering: `400 {"error": message}`.
pub fn default_err_handler(err: BindError) -> Response {
    err.into_response()
}

/// Method filter for a registered method.
///
/// # Panics
///
/// On a method axum cannot route.
pub(crate) fn method_filter(method: &Method) -> MethodFilter {
    MethodFilter::try_from(method.clone())
        .unwrap_or_else(|_| panic!("unsupported HTTP method '{method}'"))
}

/// Wrap a typed handler into an axum method router.
///
/// Per request: answer the schema flag with the endpoint record, otherwise
/// read at most `body_limit` bytes of body, bind the request, call the
/// handler and write its response as 200 JSON. Binding failures go to the
/// endpoint's error handler.
pub(crate) fn wrap_handler<S, H, Req, Resp>(
    method: &Method,
    endpoint: Arc<Endpoint>,
    validation: Arc<Validation>,
    schema_flag: Arc<str>,
    body_limit: usize,
    handler: H,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
    H: ApiHandler<S, Req, Resp>,
    Req: Bind + DeserializeOwned + Default + Validate + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    on(
        method_filter(method),
        move |State(state): State<S>, request: Request| {
            let endpoint = endpoint.clone();
            let validation = validation.clone();
            let schema_flag = schema_flag.clone();
            let handler = handler.clone();
            async move {
                let (mut parts, body) = request.into_parts();

                if schema_requested(&parts, &schema_flag) {
                    tracing::debug!(route = %endpoint.route, "Serving endpoint schema");
                    return (StatusCode::OK, Json(&*endpoint)).into_response();
                }

                let source = ParamSource::from_parts(&mut parts, &state).await;
                let bound = read_body(body, body_limit)
                    .await
                    .and_then(|bytes| bind_request::<Req>(&bytes, &source, &validation));

                match bound {
                    Ok(req) => {
                        let ctx = ApiContext { state, parts };
                        let resp = handler.call(ctx, req).await;
                        (StatusCode::OK, Json(resp)).into_response()
                    }
                    Err(err) => {
                        tracing::debug!(
                            route = %endpoint.route,
                            error = %err,
                            "Request binding failed"
                        );
                        match &endpoint.err_handler {
                            Some(custom) => custom(err),
                            None => default_err_handler(err),
                        }
                    }
                }
            }
        },
    )
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, BindError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let too_large = err
            .source()
            .is_some_and(|source| source.is::<LengthLimitError>());
        if too_large {
            BindError::BodyTooLarge(limit)
        } else {
            BindError::Read(err.to_string())
        }
    })
}

fn schema_requested(parts: &Parts, flag: &str) -> bool {
    let Some(query) = parts.uri.query() else {
        return false;
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == flag)
        .and_then(|(_, v)| parse_bool(&v))
        .unwrap_or(false)
}
