//! Markdown and HTML API documents.
//!
//! Each exported endpoint becomes an [`ApiDoc`] (field tables plus example
//! request and response) which is rendered through the embedded
//! `templates/doc.md` or `templates/doc.html` minijinja template.

use crate::registry::Endpoint;
use crate::schema::{Location, Schema, SchemaKind};
use minijinja::{context, Environment};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const MARKDOWN_TEMPLATE: &str = include_str!("../templates/doc.md");
const HTML_TEMPLATE: &str = include_str!("../templates/doc.html");

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "API Documentation";

/// Output format of a rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Markdown,
    Html,
}

impl DocFormat {
    fn template_name(self) -> &'static str {
        // the `.html` suffix turns on minijinja's HTML auto-escaping
        match self {
            DocFormat::Markdown => "doc.md",
            DocFormat::Html => "doc.html",
        }
    }

    fn template_source(self) -> &'static str {
        match self {
            DocFormat::Markdown => MARKDOWN_TEMPLATE,
            DocFormat::Html => HTML_TEMPLATE,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocFormat::Markdown => "text/plain; charset=utf-8",
            DocFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// Template failure while rendering a document.
#[derive(Debug)]
pub enum DocError {
    Template(minijinja::Error),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::Template(err) => write!(f, "document template error: {err}"),
        }
    }
}

impl std::error::Error for DocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocError::Template(err) => Some(err),
        }
    }
}

impl From<minijinja::Error> for DocError {
    fn from(err: minijinja::Error) -> Self {
        DocError::Template(err)
    }
}

/// One documented field, addressed by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDoc {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Allowed values joined with `,`.
    #[serde(rename = "enum")]
    pub enum_values: String,
    pub required: bool,
    pub description: String,
    pub location: String,
    pub default: String,
    /// Raw validation rules.
    pub binding: String,
}

impl Schema {
    /// Flatten this schema into documented fields.
    ///
    /// Path fields come first, then query fields, then the rest, each group
    /// sorted by field path.
    pub fn field_docs(&self) -> Vec<FieldDoc> {
        let mut docs = Vec::new();
        collect_docs(self, "", &mut docs);
        docs.sort_by(|a, b| {
            location_rank(&a.location)
                .cmp(&location_rank(&b.location))
                .then_with(|| a.field.cmp(&b.field))
        });
        docs
    }
}

fn location_rank(location: &str) -> u8 {
    if location == Location::Path.as_str() {
        0
    } else if location == Location::Query.as_str() {
        1
    } else {
        2
    }
}

fn collect_docs(schema: &Schema, path: &str, out: &mut Vec<FieldDoc>) {
    // objects at the root or directly inside an array have no row of their own
    let container = schema.kind == SchemaKind::Object && (path.is_empty() || path.ends_with("[]"));
    if !container {
        out.push(FieldDoc {
            field: path.to_string(),
            kind: schema.kind.as_str().to_string(),
            enum_values: schema.enum_values.join(","),
            required: schema.required,
            description: schema.description.clone().unwrap_or_default(),
            location: schema
                .location
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
            default: schema.default.clone().unwrap_or_default(),
            binding: schema.rules.clone().unwrap_or_default(),
        });
    }

    for (name, child) in &schema.properties {
        let child_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        collect_docs(child, &child_path, out);
    }
    if let Some(items) = schema.items.as_deref() {
        collect_docs(items, &format!("{path}[]"), out);
    }
}

/// Documentation record for one endpoint, as seen by the templates.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDoc {
    pub id: String,
    pub title: String,
    pub method: String,
    pub route: String,
    pub description: String,
    pub req: Vec<FieldDoc>,
    pub res: Vec<FieldDoc>,
    pub req_example: String,
    pub res_example: String,
}

impl ApiDoc {
    pub fn new(endpoint: &Endpoint) -> Self {
        Self {
            id: anchor(&endpoint.method, &endpoint.route),
            title: endpoint.title.clone(),
            method: endpoint.method.clone(),
            route: endpoint.route.clone(),
            description: endpoint.description.clone(),
            req: endpoint.request_schema.field_docs(),
            res: endpoint.response_schema.field_docs(),
            req_example: example_request(endpoint),
            res_example: endpoint.response_schema.example_json(),
        }
    }
}

/// `"<METHOD> <path>[?query]\n\n<body>"`, the body left out when it is `{}`.
pub fn example_request(endpoint: &Endpoint) -> String {
    let schema = &endpoint.request_schema;
    let mut out = format!("{} {}", endpoint.method, schema.example_path(&endpoint.route));
    let query = schema.example_query();
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }
    out.push_str("\n\n");
    let body = schema.example_json();
    if body != "{}" {
        out.push_str(&body);
    }
    out
}

fn anchor(method: &str, route: &str) -> String {
    let mut id = String::with_capacity(method.len() + route.len() + 1);
    for c in method.chars().chain(std::iter::once('-')).chain(route.chars()) {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_end_matches('-').to_string()
}

/// Render the given endpoints with the default title.
pub fn render_document(endpoints: &[Arc<Endpoint>], format: DocFormat) -> Result<String, DocError> {
    render_titled(DEFAULT_TITLE, endpoints, format)
}

/// Render the given endpoints under `title`.
pub fn render_titled(
    title: &str,
    endpoints: &[Arc<Endpoint>],
    format: DocFormat,
) -> Result<String, DocError> {
    if endpoints.is_empty() {
        tracing::warn!(title, "Generating API document without any endpoint");
    }
    let apis: Vec<ApiDoc> = endpoints.iter().map(|e| ApiDoc::new(e)).collect();

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template(format.template_name(), format.template_source())?;
    let template = env.get_template(format.template_name())?;
    Ok(template.render(context! { title => title, apis => apis })?)
}

/// Markdown document.
///
/// # Panics
///
/// If the embedded template fails to render.
pub fn generate_markdown(title: &str, endpoints: &[Arc<Endpoint>]) -> String {
    render_titled(title, endpoints, DocFormat::Markdown)
        .unwrap_or_else(|err| panic!("markdown generation failed: {err}"))
}

/// HTML document.
///
/// # Panics
///
/// If the embedded template fails to render.
pub fn generate_html(title: &str, endpoints: &[Arc<Endpoint>]) -> String {
    render_titled(title, endpoints, DocFormat::Html)
        .unwrap_or_else(|err| panic!("html generation failed: {err}"))
}
