use axum::extract::{FromRequestParts, RawPathParams};
use http::request::Parts;
use http::HeaderMap;

/// The non-body values of one request, as seen by the binder.
///
/// Lookups return `None` when the parameter is absent; the binder treats
/// that the same as an empty value.
#[derive(Debug, Clone, Default)]
pub struct ParamSource {
    path: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
}

impl ParamSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect path params, query pairs and headers from request parts.
    ///
    /// Path params come from the matched axum route; outside a matched route
    /// there are none.
    pub async fn from_parts<S: Send + Sync>(parts: &mut Parts, state: &S) -> Self {
        let path = match RawPathParams::from_request_parts(parts, state).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };
        Self {
            path,
            query: parse_query_string(parts.uri.query()),
            headers: parts.headers.clone(),
        }
    }

    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        find(&self.path, name)
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        find(&self.query, name)
    }

    /// First value of a header; non UTF-8 values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn find<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Parse a query string into key-value pairs.
pub fn parse_query_string(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}
