//! Example payloads synthesized from a [`Schema`].
//!
//! Examples come from the declared `example`, then `default`, then the first
//! enum value, parsed into the node's JSON kind. Nothing is templated: the
//! example request line of a document is assembled from
//! [`Schema::example_path`], [`Schema::example_query`] and
//! [`Schema::example_json`].

use crate::bind::parse_bool;
use crate::schema::{Location, Schema, SchemaKind};
use serde_json::{Map, Value};

/// Example value that removes a property from the generated body.
pub const OMIT_EXAMPLE: &str = "-";

impl Schema {
    /// Example JSON value for this node.
    ///
    /// Objects only include children carried by the body; path, query and
    /// header fields show up in the request line instead.
    pub fn example(&self) -> Value {
        match self.kind {
            SchemaKind::Object => {
                let mut map = Map::new();
                for (name, child) in &self.properties {
                    if matches!(
                        child.location,
                        Some(Location::Path | Location::Query | Location::Header)
                    ) {
                        continue;
                    }
                    let value = child.example();
                    if value.as_str() == Some(OMIT_EXAMPLE) {
                        continue;
                    }
                    map.insert(name.clone(), value);
                }
                Value::Object(map)
            }
            SchemaKind::Array => {
                let Some(items) = self.items.as_deref() else {
                    return Value::Array(Vec::new());
                };
                let literal = self.example_literal();
                if literal.is_empty() {
                    return Value::Array(vec![items.example()]);
                }
                Value::Array(
                    literal
                        .split(',')
                        .map(|piece| scalar_value(items.kind, piece))
                        .collect(),
                )
            }
            kind => scalar_value(kind, self.example_literal()),
        }
    }

    /// Indented JSON of [`example`](Self::example).
    pub fn example_json(&self) -> String {
        serde_json::to_string_pretty(&self.example()).unwrap_or_default()
    }

    /// `name=example` pairs of the direct query properties, sorted and joined
    /// with `&`. Properties without a usable example are left out.
    pub fn example_query(&self) -> String {
        let mut pairs: Vec<String> = self
            .properties
            .iter()
            .filter(|(_, child)| child.location == Some(Location::Query))
            .filter_map(|(name, child)| {
                let literal = child.example_literal();
                if literal.is_empty() || literal == OMIT_EXAMPLE {
                    None
                } else {
                    Some(format!("{name}={literal}"))
                }
            })
            .collect();
        pairs.sort();
        pairs.join("&")
    }

    /// Replace every `:name` / `*name` segment of `route` with the example of
    /// the property of the same name, found breadth-first. A parameter with no
    /// matching property, or no example, is replaced by its own name.
    pub fn example_path(&self, route: &str) -> String {
        let params = parse_path_params(route);
        if params.is_empty() {
            return route.to_string();
        }

        let mut out = String::with_capacity(route.len());
        let mut cursor = 0;
        for param in params {
            out.push_str(&route[cursor..param.start]);
            let mut found: Option<&Schema> = None;
            self.walk(|name, child| {
                if name == param.name {
                    found = Some(child);
                    return false;
                }
                true
            });
            let literal = found.map(Schema::example_literal).unwrap_or("");
            out.push_str(if literal.is_empty() { param.name } else { literal });
            cursor = param.end;
        }
        out.push_str(&route[cursor..]);
        out
    }
}

fn scalar_value(kind: SchemaKind, literal: &str) -> Value {
    match kind {
        SchemaKind::Integer => Value::from(literal.trim().parse::<i64>().unwrap_or(0)),
        SchemaKind::Number => Value::from(literal.trim().parse::<f64>().unwrap_or(0.0)),
        SchemaKind::Boolean => Value::Bool(parse_bool(literal.trim()).unwrap_or(false)),
        _ => Value::String(literal.to_string()),
    }
}

/// A `:name` or `*name` token in a route template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathParam<'a> {
    pub name: &'a str,
    /// Byte offset of the `:` / `*` marker.
    pub start: usize,
    /// Byte offset just past the name.
    pub end: usize,
    pub wildcard: bool,
}

/// Named parameters of a route template, left to right. A token runs from
/// its marker to the next `/` or the end of the route.
pub fn parse_path_params(route: &str) -> Vec<PathParam<'_>> {
    let mut params = Vec::new();
    let bytes = route.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let marker = bytes[i];
        if marker != b':' && marker != b'*' {
            i += 1;
            continue;
        }
        let start = i;
        let end = route[start..]
            .find('/')
            .map(|offset| start + offset)
            .unwrap_or(route.len());
        params.push(PathParam {
            name: &route[start + 1..end],
            start,
            end,
            wildcard: marker == b'*',
        });
        i = end;
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldMeta;
    use serde_json::json;

    fn field(schema: Schema, location: Location, example: Option<&'static str>) -> Schema {
        schema.with_field(FieldMeta {
            location,
            example,
            ..FieldMeta::default()
        })
    }

    #[test]
    fn scalar_examples() {
        assert_eq!(Schema::string().example(), json!(""));
        assert_eq!(Schema::integer().example(), json!(0));
        assert_eq!(Schema::boolean().example(), json!(false));

        let mut port = Schema::integer();
        port.default = Some("8080".into());
        assert_eq!(port.example(), json!(8080));

        let mut bad = Schema::integer();
        bad.example = Some("many".into());
        assert_eq!(bad.example(), json!(0));

        let mut class = Schema::string();
        class.enum_values = vec!["1".into(), "2".into()];
        assert_eq!(class.example(), json!("1"));

        let mut ratio = Schema::number();
        ratio.example = Some("0.5".into());
        assert_eq!(ratio.example(), json!(0.5));
    }

    #[test]
    fn array_examples() {
        let tags = Schema::array(Schema::string());
        assert_eq!(tags.example(), json!([""]));

        let mut ids = Schema::array(Schema::integer());
        ids.example = Some("1,2,x".into());
        assert_eq!(ids.example(), json!([1, 2, 0]));
    }

    #[test]
    fn object_example_skips_request_line_fields_and_sentinel() {
        let mut root = Schema::object();
        root.insert_property("id", field(Schema::integer(), Location::Path, Some("42")));
        root.insert_property("page", field(Schema::integer(), Location::Query, Some("2")));
        root.insert_property("hidden", field(Schema::string(), Location::Body, Some("-")));
        root.insert_property("name", field(Schema::string(), Location::Body, Some("bob")));
        root.insert_property("meta", Schema::object());
        assert_eq!(root.example(), json!({"name": "bob", "meta": {}}));
    }

    #[test]
    fn query_example_is_sorted() {
        let mut root = Schema::object();
        root.insert_property("size", field(Schema::integer(), Location::Query, Some("10")));
        root.insert_property("page", field(Schema::integer(), Location::Query, Some("2")));
        root.insert_property("sort", field(Schema::string(), Location::Query, Some("-")));
        root.insert_property("q", field(Schema::string(), Location::Query, None));
        root.insert_property("name", field(Schema::string(), Location::Body, Some("bob")));
        assert_eq!(root.example_query(), "page=2&size=10");
    }

    #[test]
    fn path_example_substitutes_tokens() {
        let mut root = Schema::object();
        root.insert_property("id", field(Schema::integer(), Location::Path, Some("42")));
        root.insert_property("rest", field(Schema::string(), Location::Path, None));
        assert_eq!(
            root.example_path("/users/:id/items/*rest"),
            "/users/42/items/rest"
        );
        assert_eq!(root.example_path("/static"), "/static");
        assert_eq!(root.example_path("/x/:missing"), "/x/missing");
    }

    #[test]
    fn path_example_searches_breadth_first() {
        let mut inner = Schema::object();
        inner.insert_property("id", field(Schema::integer(), Location::Path, Some("7")));
        let mut root = Schema::object();
        root.insert_property("a", inner);
        root.insert_property("id", field(Schema::integer(), Location::Path, Some("1")));
        assert_eq!(root.example_path("/:id"), "/1");
    }

    #[test]
    fn substituted_example_is_not_rescanned() {
        let mut root = Schema::object();
        root.insert_property("a", field(Schema::string(), Location::Path, Some(":b")));
        root.insert_property("b", field(Schema::string(), Location::Path, Some("x")));
        assert_eq!(root.example_path("/:a/:b"), "/:b/x");
    }

    #[test]
    fn path_params_are_parsed() {
        let params = parse_path_params("/users/:id/files/*path");
        let names: Vec<_> = params.iter().map(|p| (p.name, p.wildcard)).collect();
        assert_eq!(names, vec![("id", false), ("path", true)]);
        assert_eq!(params[0].start, 7);
        assert_eq!(params[0].end, 10);
    }
}
