//! Router seam between the registry and axum.
//!
//! Routes are declared with gin-style templates (`/users/:id`,
//! `/files/*path`) so the same string can be documented and matched;
//! [`to_axum_path`] converts them to axum's `{id}` / `{*path}` syntax.

use axum::routing::MethodRouter;
use axum::Router;
use http::Method;

/// A place handlers can be mounted under a base path.
pub trait BasicRouter<S> {
    /// Absolute path this router mounts relative routes under.
    fn base_path(&self) -> &str;

    /// Mount `handler` for `method` at `path`, relative to
    /// [`base_path`](Self::base_path).
    fn handle(&mut self, method: Method, path: &str, handler: MethodRouter<S>);
}

/// Root router wrapping an [`axum::Router`].
pub struct ApiRouter<S = ()> {
    inner: Router<S>,
}

impl<S> Default for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Router::new(),
        }
    }

    /// Wrap an existing router, e.g. one carrying middleware.
    pub fn from_router(inner: Router<S>) -> Self {
        Self { inner }
    }

    /// A sub-router mounting everything under `base`.
    pub fn group(&mut self, base: &str) -> RouteGroup<'_, S> {
        RouteGroup {
            base: join_paths("/", base),
            router: self,
        }
    }

    /// Mount a plain axum handler, outside the registry.
    pub fn route(&mut self, path: &str, handler: MethodRouter<S>) {
        let inner = std::mem::take(&mut self.inner);
        self.inner = inner.route(&to_axum_path(path), handler);
    }

    pub fn into_router(self) -> Router<S> {
        self.inner
    }
}

impl<S> BasicRouter<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn base_path(&self) -> &str {
        "/"
    }

    fn handle(&mut self, method: Method, path: &str, handler: MethodRouter<S>) {
        tracing::debug!(%method, path, "Mounting route");
        self.route(&join_paths("/", path), handler);
    }
}

/// Routes mounted under a common base path of an [`ApiRouter`].
pub struct RouteGroup<'r, S> {
    base: String,
    router: &'r mut ApiRouter<S>,
}

impl<S> RouteGroup<'_, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// A nested group under this one.
    pub fn group(&mut self, base: &str) -> RouteGroup<'_, S> {
        RouteGroup {
            base: join_paths(&self.base, base),
            router: &mut *self.router,
        }
    }
}

impl<S> BasicRouter<S> for RouteGroup<'_, S>
where
    S: Clone + Send + Sync + 'static,
{
    fn base_path(&self) -> &str {
        &self.base
    }

    fn handle(&mut self, method: Method, path: &str, handler: MethodRouter<S>) {
        let full = join_paths(&self.base, path);
        self.router.handle(method, &full, handler);
    }
}

/// Join a base path and a relative route, cleaning the result. A trailing
/// slash on `relative` is kept.
pub fn join_paths(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    let mut joined = clean_path(&format!("{base}/{relative}"));
    if relative.ends_with('/') && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Lexical path cleaning: collapse repeated slashes, drop `.` segments and
/// resolve `..` against the preceding segment. Never climbs above the root.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

/// Convert `:name` / `*name` segments to axum's `{name}` / `{*name}`.
pub fn to_axum_path(route: &str) -> String {
    route
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
