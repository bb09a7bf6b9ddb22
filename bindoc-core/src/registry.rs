//! API registry: typed endpoint registration, endpoint records and the
//! document endpoints built from them.
//!
//! ```ignore
//! let mut api = ApiGroup::new();
//! let mut router = ApiRouter::new();
//! api.register(
//!     &mut router,
//!     Method::POST,
//!     "/users",
//!     create_user,
//!     EndpointOptions::new().with_title("Create user"),
//! );
//! api.doc_routes(&mut router);
//! let app = router.into_router().with_state(state);
//! ```

use crate::bind::{Bind, BindError};
use crate::config::DocSettings;
use crate::document::{generate_html, generate_markdown, DocFormat};
use crate::handler::{wrap_handler, ApiHandler, ErrHandler};
use crate::router::{join_paths, BasicRouter};
use crate::schema::{ApiSchema, Schema};
use crate::validation::Validation;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::Json;
use http::header::CONTENT_TYPE;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use validator::Validate;

/// Registered endpoint: route, method, metadata and both schemas.
#[derive(Serialize)]
pub struct Endpoint {
    pub title: String,
    pub route: String,
    pub method: String,
    pub description: String,
    pub request_schema: Schema,
    pub response_schema: Schema,
    #[serde(skip)]
    pub err_handler: Option<ErrHandler>,
    /// Listed in documents and the all-schemas endpoint.
    #[serde(skip)]
    pub exported: bool,
}

impl Endpoint {
    pub fn new(
        method: impl Into<String>,
        route: impl Into<String>,
        request_schema: Schema,
        response_schema: Schema,
    ) -> Self {
        Self {
            title: String::new(),
            route: route.into(),
            method: method.into(),
            description: String::new(),
            request_schema,
            response_schema,
            err_handler: None,
            exported: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("title", &self.title)
            .field("method", &self.method)
            .field("route", &self.route)
            .field("exported", &self.exported)
            .field("custom_err_handler", &self.err_handler.is_some())
            .finish()
    }
}

/// Per-registration options.
#[derive(Clone)]
pub struct EndpointOptions {
    title: Option<String>,
    description: Option<String>,
    err_handler: Option<ErrHandler>,
    exported: bool,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointOptions {
    pub fn new() -> Self {
        Self {
            title: None,
            description: None,
            err_handler: None,
            exported: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render binding failures with `handler` instead of the default
    /// `400 {"error": ...}`.
    pub fn with_err_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(BindError) -> Response + Send + Sync + 'static,
    {
        self.err_handler = Some(Arc::new(handler));
        self
    }

    /// Serve the endpoint but leave it out of documents and schema listings.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Fill title and description from a template where not set here.
    fn or_template(mut self, title: &str, description: &str) -> Self {
        if self.title.is_none() && !title.is_empty() {
            self.title = Some(title.to_string());
        }
        if self.description.is_none() && !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

type RegisterFn<S> = Box<
    dyn FnOnce(&mut ApiGroup, &mut dyn BasicRouter<S>, Method, &str, EndpointOptions) -> Arc<Endpoint>
        + Send,
>;

/// A route declared as data: metadata plus a typed handler.
pub struct ApiTemplate<S> {
    /// Operation name matched by [`ApiGroup::register_all`] predicates.
    pub name: String,
    pub title: String,
    pub description: String,
    pub method: Method,
    pub path: String,
    register: RegisterFn<S>,
}

impl<S> ApiTemplate<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new<H, Req, Resp>(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: H,
    ) -> Self
    where
        H: ApiHandler<S, Req, Resp>,
        Req: ApiSchema + Bind + DeserializeOwned + Default + Validate + Send + 'static,
        Resp: ApiSchema + Serialize + Send + 'static,
    {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
            method,
            path: path.into(),
            register: Box::new(
                move |group: &mut ApiGroup,
                      router: &mut dyn BasicRouter<S>,
                      method: Method,
                      path: &str,
                      options: EndpointOptions| {
                    group.register(router, method, path, handler, options)
                },
            ),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<S> fmt::Debug for ApiTemplate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTemplate")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// A table of [`ApiTemplate`]s, registered together with
/// [`ApiGroup::register_all`].
pub trait ApiProvider<S> {
    fn templates(&self) -> Vec<ApiTemplate<S>>;
}

/// Ordered catalog of registered endpoints.
pub struct ApiGroup {
    endpoints: Vec<Arc<Endpoint>>,
    validation: Arc<Validation>,
    settings: DocSettings,
}

impl Default for ApiGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiGroup {
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            validation: Arc::new(Validation::new()),
            settings: DocSettings::default(),
        }
    }

    /// Document paths, title and schema flag. Applies to routes registered
    /// afterwards.
    pub fn with_settings(mut self, settings: DocSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validation engine for routes registered afterwards.
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = Arc::new(validation);
        self
    }

    pub fn settings(&self) -> &DocSettings {
        &self.settings
    }

    /// Every registered endpoint, in registration order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Endpoints that appear in documents.
    pub fn exported(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints.iter().filter(|e| e.exported).cloned().collect()
    }

    /// Register a typed handler at `route`, relative to the router's base
    /// path.
    ///
    /// # Panics
    ///
    /// On a schema collision in `Req` or `Resp`, or on a method axum cannot
    /// route.
    pub fn register<S, R, H, Req, Resp>(
        &mut self,
        router: &mut R,
        method: Method,
        route: &str,
        handler: H,
        options: EndpointOptions,
    ) -> Arc<Endpoint>
    where
        S: Clone + Send + Sync + 'static,
        R: BasicRouter<S> + ?Sized,
        H: ApiHandler<S, Req, Resp>,
        Req: ApiSchema + Bind + DeserializeOwned + Default + Validate + Send + 'static,
        Resp: ApiSchema + Serialize + Send + 'static,
    {
        let full_route = join_paths(router.base_path(), route);
        let description = options.description.unwrap_or_default();
        let mut request_schema = Req::api_schema();
        if !description.is_empty() {
            request_schema.description = Some(description.clone());
        }

        let endpoint = Arc::new(Endpoint {
            title: options
                .title
                .unwrap_or_else(|| format!("{method} {full_route}")),
            route: full_route,
            method: method.to_string(),
            description,
            request_schema,
            response_schema: Resp::api_schema(),
            err_handler: options.err_handler,
            exported: options.exported,
        });

        let service = wrap_handler(
            &method,
            endpoint.clone(),
            self.validation.clone(),
            Arc::from(self.settings.schema_flag.as_str()),
            self.settings.body_limit,
            handler,
        );
        router.handle(method, route, service);

        tracing::info!(
            method = %endpoint.method,
            route = %endpoint.route,
            title = %endpoint.title,
            "Registered API endpoint"
        );
        self.endpoints.push(endpoint.clone());
        endpoint
    }

    /// [`register`](Self::register) with a title and description.
    pub fn register_with_doc<S, R, H, Req, Resp>(
        &mut self,
        router: &mut R,
        method: Method,
        route: &str,
        handler: H,
        title: &str,
        description: &str,
    ) -> Arc<Endpoint>
    where
        S: Clone + Send + Sync + 'static,
        R: BasicRouter<S> + ?Sized,
        H: ApiHandler<S, Req, Resp>,
        Req: ApiSchema + Bind + DeserializeOwned + Default + Validate + Send + 'static,
        Resp: ApiSchema + Serialize + Send + 'static,
    {
        let options = EndpointOptions::new()
            .with_title(title)
            .with_description(description);
        self.register(router, method, route, handler, options)
    }

    /// Register one template. Its title and description take precedence
    /// over `options`.
    pub fn register_template<S, R>(
        &mut self,
        router: &mut R,
        template: ApiTemplate<S>,
        mut options: EndpointOptions,
    ) -> Arc<Endpoint>
    where
        S: Clone + Send + Sync + 'static,
        R: BasicRouter<S>,
    {
        if !template.title.is_empty() {
            options.title = Some(template.title.clone());
        }
        if !template.description.is_empty() {
            options.description = Some(template.description.clone());
        }
        (template.register)(self, &mut *router, template.method, &template.path, options)
    }

    /// Register every template of `provider` whose name passes `include`.
    /// `options` apply to each of them and win over template metadata.
    ///
    /// # Panics
    ///
    /// When no template matches.
    pub fn register_all<S, R, P, F>(
        &mut self,
        router: &mut R,
        provider: &P,
        include: F,
        options: EndpointOptions,
    ) -> Vec<Arc<Endpoint>>
    where
        S: Clone + Send + Sync + 'static,
        R: BasicRouter<S>,
        P: ApiProvider<S>,
        F: Fn(&str) -> bool,
    {
        let mut registered = Vec::new();
        for template in provider.templates() {
            if !include(&template.name) {
                continue;
            }
            let options = options
                .clone()
                .or_template(&template.title, &template.description);
            let endpoint =
                (template.register)(self, &mut *router, template.method, &template.path, options);
            registered.push(endpoint);
        }

        if registered.is_empty() {
            panic!(
                "{} has no handler to register",
                std::any::type_name::<P>()
            );
        }
        registered
    }

    /// Markdown document of the exported endpoints.
    pub fn generate_markdown(&self) -> String {
        generate_markdown(&self.settings.title, &self.exported())
    }

    /// HTML document of the exported endpoints.
    pub fn generate_html(&self) -> String {
        generate_html(&self.settings.title, &self.exported())
    }

    /// Serves the Markdown document of the endpoints registered so far.
    pub fn markdown_handler<S>(&self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        document_handler(DocFormat::Markdown, self.generate_markdown())
    }

    /// Serves the HTML document of the endpoints registered so far.
    pub fn html_handler<S>(&self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        document_handler(DocFormat::Html, self.generate_html())
    }

    /// Serves the records of every exported endpoint as a JSON array.
    pub fn schemas_handler<S>(&self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let exported = self.exported();
        let records: Vec<&Endpoint> = exported.iter().map(|e| e.as_ref()).collect();
        let body = serde_json::to_value(&records)
            .unwrap_or_else(|err| panic!("endpoint records are not serializable: {err}"));
        get(move || {
            let body = body.clone();
            async move { Json(body).into_response() }
        })
    }

    /// Mount the Markdown, HTML and all-schemas endpoints at the configured
    /// paths. Call after every endpoint is registered.
    pub fn doc_routes<S, R>(&self, router: &mut R)
    where
        S: Clone + Send + Sync + 'static,
        R: BasicRouter<S> + ?Sized,
    {
        router.handle(Method::GET, &self.settings.markdown_path, self.markdown_handler());
        router.handle(Method::GET, &self.settings.html_path, self.html_handler());
        router.handle(Method::GET, &self.settings.schemas_path, self.schemas_handler());
    }
}

fn document_handler<S>(format: DocFormat, document: String) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move || {
        let document = document.clone();
        async move { ([(CONTENT_TYPE, format.content_type())], document).into_response() }
    })
}
