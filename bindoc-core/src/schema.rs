//! Schema model and the [`ApiSchema`] trait that builds it.
//!
//! A [`Schema`] describes one type position of a request or response: its
//! kind, children, constraints and the field metadata declared with
//! `#[api(...)]`. Struct schemas are produced by `#[derive(ApiSchema)]`;
//! the impls below cover the scalar, optional, sequence and map shapes.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The JSON kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
        }
    }

    /// Kinds that accept an enum tag.
    fn takes_enum(&self) -> bool {
        matches!(
            self,
            SchemaKind::String | SchemaKind::Integer | SchemaKind::Number
        )
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field's value comes from in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Header,
    /// The JSON body. Serialized as `json`.
    #[serde(rename = "json")]
    Body,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
            Location::Body => "json",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a location string is not one of
/// `path`, `query`, `header` or `json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLocation(pub String);

impl fmt::Display for InvalidLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid location: {}", self.0)
    }
}

impl std::error::Error for InvalidLocation {}

impl FromStr for Location {
    type Err = InvalidLocation;

    /// An empty string is the body, matching an undeclared location.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Location::Path),
            "query" => Ok(Location::Query),
            "header" => Ok(Location::Header),
            "" | "json" => Ok(Location::Body),
            other => Err(InvalidLocation(other.to_string())),
        }
    }
}

/// Structural description of one type position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(rename = "binding", skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

/// Per-field metadata attached by `#[derive(ApiSchema)]`.
///
/// Borrowed from string literals in the generated code; [`Schema::with_field`]
/// copies what it keeps.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta<'a> {
    pub location: Location,
    pub description: Option<&'a str>,
    pub example: Option<&'a str>,
    pub default: Option<&'a str>,
    pub required: bool,
    /// Raw contents of the field's `#[validate(...)]` attributes.
    pub rules: Option<&'a str>,
    pub enum_values: &'a [&'a str],
    pub max_length: Option<usize>,
}

impl Default for FieldMeta<'_> {
    fn default() -> Self {
        Self {
            location: Location::Body,
            description: None,
            example: None,
            default: None,
            required: false,
            rules: None,
            enum_values: &[],
            max_length: None,
        }
    }
}

/// Marker searched for in a rule string to derive `required`.
const REQUIRED_MARKER: &str = "required";

impl Schema {
    fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            enum_values: Vec::new(),
            max_length: None,
            items: None,
            location: None,
            description: None,
            example: None,
            default: None,
            required: false,
            rules: None,
        }
    }

    /// An object node with no properties yet. Also the opaque map schema.
    pub fn object() -> Self {
        Self::of_kind(SchemaKind::Object)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_kind(SchemaKind::Array)
        }
    }

    pub fn string() -> Self {
        Self::of_kind(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::of_kind(SchemaKind::Integer)
    }

    pub fn number() -> Self {
        Self::of_kind(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of_kind(SchemaKind::Boolean)
    }

    /// Attach the metadata declared on a struct field.
    ///
    /// Enum values land on scalar leaves; on an array they go to its items.
    pub fn with_field(mut self, meta: FieldMeta<'_>) -> Self {
        if !meta.enum_values.is_empty() {
            self.apply_enum(meta.enum_values);
        }
        if meta.max_length.is_some() {
            self.max_length = meta.max_length;
        }
        self.location = Some(meta.location);
        self.description = non_empty(meta.description);
        self.example = non_empty(meta.example);
        self.default = non_empty(meta.default);
        self.rules = meta.rules.map(str::to_string);
        self.required =
            meta.required || meta.rules.is_some_and(|r| r.contains(REQUIRED_MARKER));
        self
    }

    fn apply_enum(&mut self, values: &[&str]) {
        if self.kind.takes_enum() {
            self.enum_values = values.iter().map(|v| v.to_string()).collect();
        } else if let Some(items) = self.items.as_mut() {
            items.apply_enum(values);
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a named property, failing if the key is already taken.
    pub fn try_insert_property(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return Err(SchemaError::DuplicateProperty(name));
        }
        self.properties.insert(name, schema);
        Ok(())
    }

    /// Merge the properties of an inline (flattened) schema into this one.
    pub fn try_flatten(&mut self, inline: Schema) -> Result<(), SchemaError> {
        if inline.kind != SchemaKind::Object {
            return Err(SchemaError::InlineNotObject(inline.kind));
        }
        for (name, schema) in inline.properties {
            self.try_insert_property(name, schema)?;
        }
        Ok(())
    }

    /// [`try_insert_property`](Self::try_insert_property) for generated code.
    ///
    /// # Panics
    ///
    /// On a duplicate key. Schemas come from static type declarations, so a
    /// collision is a mis-declared contract and must stop registration.
    pub fn insert_property(&mut self, name: impl Into<String>, schema: Schema) {
        if let Err(err) = self.try_insert_property(name, schema) {
            panic!("schema configuration error: {err}");
        }
    }

    /// [`try_flatten`](Self::try_flatten) for generated code.
    ///
    /// # Panics
    ///
    /// On a duplicate key or a non-object inline field.
    pub fn flatten(&mut self, inline: Schema) {
        if let Err(err) = self.try_flatten(inline) {
            panic!("schema configuration error: {err}");
        }
    }

    /// First available example literal: example, then default, then the
    /// first enum value. Empty when none is declared.
    pub fn example_literal(&self) -> &str {
        self.example
            .as_deref()
            .or(self.default.as_deref())
            .or(self.enum_values.first().map(String::as_str))
            .unwrap_or("")
    }

    /// Visit properties breadth-first: all direct properties of a node before
    /// any of their children. Stops as soon as `f` returns `false`.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(&'a str, &'a Schema) -> bool) {
        let mut queue: VecDeque<&'a Schema> = VecDeque::new();
        queue.push_back(self);
        while let Some(node) = queue.pop_front() {
            for (name, child) in &node.properties {
                if !f(name, child) {
                    return;
                }
                queue.push_back(child);
            }
            if let Some(items) = node.items.as_deref() {
                queue.push_back(items);
            }
        }
    }

    /// Direct property lookup.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Configuration errors found while assembling a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    DuplicateProperty(String),
    InlineNotObject(SchemaKind),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateProperty(name) => {
                write!(f, "property '{name}' is declared more than once")
            }
            SchemaError::InlineNotObject(kind) => {
                write!(f, "inline field must be an object, got {kind}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Types that can describe their own shape as a [`Schema`].
///
/// Derive it for request and response structs with `#[derive(ApiSchema)]`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no API schema",
    label = "unsupported type in a request or response declaration",
    note = "supported: strings, integers, floats, bool, Option<T>, Box<T>, Vec<T>, sets, maps, and structs deriving `ApiSchema`"
)]
pub trait ApiSchema {
    fn api_schema() -> Schema;
}

macro_rules! scalar_schema {
    ($ctor:ident => $($ty:ty),* $(,)?) => {
        $(
            impl ApiSchema for $ty {
                fn api_schema() -> Schema {
                    Schema::$ctor()
                }
            }
        )*
    };
}

scalar_schema!(string => String, str, char);
scalar_schema!(integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
scalar_schema!(number => f32, f64);
scalar_schema!(boolean => bool);

impl<T: ApiSchema + ?Sized> ApiSchema for &T {
    fn api_schema() -> Schema {
        T::api_schema()
    }
}

impl<T: ApiSchema> ApiSchema for Option<T> {
    fn api_schema() -> Schema {
        T::api_schema()
    }
}

impl<T: ApiSchema + ?Sized> ApiSchema for Box<T> {
    fn api_schema() -> Schema {
        T::api_schema()
    }
}

impl<T: ApiSchema + ?Sized> ApiSchema for Arc<T> {
    fn api_schema() -> Schema {
        T::api_schema()
    }
}

macro_rules! sequence_schema {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: ApiSchema> ApiSchema for $ty<T> {
                fn api_schema() -> Schema {
                    Schema::array(T::api_schema())
                }
            }
        )*
    };
}

sequence_schema!(Vec, VecDeque, HashSet, BTreeSet);

impl<T: ApiSchema> ApiSchema for [T] {
    fn api_schema() -> Schema {
        Schema::array(T::api_schema())
    }
}

impl<T: ApiSchema, const N: usize> ApiSchema for [T; N] {
    fn api_schema() -> Schema {
        Schema::array(T::api_schema())
    }
}

impl<K, V, H> ApiSchema for HashMap<K, V, H> {
    fn api_schema() -> Schema {
        Schema::object()
    }
}

impl<K, V> ApiSchema for BTreeMap<K, V> {
    fn api_schema() -> Schema {
        Schema::object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(rules: Option<&'static str>, required: bool) -> Schema {
        String::api_schema().with_field(FieldMeta {
            rules,
            required,
            ..FieldMeta::default()
        })
    }

    #[test]
    fn required_from_explicit_flag() {
        assert!(field(None, true).required);
    }

    #[test]
    fn required_from_rule_marker() {
        assert!(field(Some("required, email"), false).required);
        assert!(field(Some("custom(function = \"rules::required\")"), false).required);
    }

    #[test]
    fn required_from_both() {
        assert!(field(Some("required"), true).required);
    }

    #[test]
    fn not_required_without_flag_or_marker() {
        let schema = field(Some("email"), false);
        assert!(!schema.required);
        assert_eq!(schema.rules.as_deref(), Some("email"));
        assert!(!field(None, false).required);
    }

    #[test]
    fn option_and_box_are_transparent() {
        assert_eq!(Option::<i32>::api_schema(), i32::api_schema());
        assert_eq!(Box::<bool>::api_schema().kind, SchemaKind::Boolean);
    }

    #[test]
    fn sequences_and_maps() {
        let arr = Vec::<f64>::api_schema();
        assert_eq!(arr.kind, SchemaKind::Array);
        assert_eq!(arr.items.unwrap().kind, SchemaKind::Number);

        let map = HashMap::<String, i32>::api_schema();
        assert_eq!(map.kind, SchemaKind::Object);
        assert!(map.properties.is_empty());
    }

    #[test]
    fn enum_applies_to_scalars_and_array_items() {
        let meta = FieldMeta {
            enum_values: &["a", "b"],
            ..FieldMeta::default()
        };
        assert_eq!(String::api_schema().with_field(meta).enum_values, vec!["a", "b"]);
        assert!(bool::api_schema().with_field(meta).enum_values.is_empty());

        let arr = Vec::<String>::api_schema().with_field(meta);
        assert!(arr.enum_values.is_empty());
        assert_eq!(arr.items.unwrap().enum_values, vec!["a", "b"]);
    }

    #[test]
    fn empty_literals_are_dropped() {
        let schema = String::api_schema().with_field(FieldMeta {
            example: Some(""),
            default: Some("x"),
            ..FieldMeta::default()
        });
        assert_eq!(schema.example, None);
        assert_eq!(schema.default.as_deref(), Some("x"));
        assert_eq!(schema.example_literal(), "x");
    }

    #[test]
    fn flatten_merges_properties() {
        let mut inner = Schema::object();
        inner.insert_property("a", Schema::string());
        inner.insert_property("b", Schema::integer());

        let mut outer = Schema::object();
        outer.insert_property("c", Schema::boolean());
        outer.flatten(inner);

        let keys: Vec<_> = outer.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn flatten_collision_is_an_error() {
        let mut inner = Schema::object();
        inner.insert_property("a", Schema::string());
        let mut outer = Schema::object();
        outer.insert_property("a", Schema::integer());

        assert_eq!(
            outer.try_flatten(inner),
            Err(SchemaError::DuplicateProperty("a".into()))
        );
    }

    #[test]
    #[should_panic(expected = "declared more than once")]
    fn duplicate_property_panics() {
        let mut outer = Schema::object();
        outer.insert_property("a", Schema::string());
        outer.insert_property("a", Schema::string());
    }

    #[test]
    fn flatten_rejects_scalars() {
        let mut outer = Schema::object();
        assert_eq!(
            outer.try_flatten(Schema::string()),
            Err(SchemaError::InlineNotObject(SchemaKind::String))
        );
    }

    #[test]
    fn walk_is_breadth_first() {
        let mut child = Schema::object();
        child.insert_property("id", Schema::string().with_field(FieldMeta {
            example: Some("deep"),
            ..FieldMeta::default()
        }));
        let mut root = Schema::object();
        root.insert_property("a_child", child);
        root.insert_property("id", Schema::string().with_field(FieldMeta {
            example: Some("shallow"),
            ..FieldMeta::default()
        }));

        let mut found = None;
        root.walk(|name, node| {
            if name == "id" {
                found = node.example.clone();
                return false;
            }
            true
        });
        assert_eq!(found.as_deref(), Some("shallow"));
    }

    #[test]
    fn walk_lends_nodes_for_the_schema_lifetime() {
        let mut child = Schema::object();
        child.insert_property("zip", Schema::string());
        let mut root = Schema::object();
        root.insert_property("address", child);

        let mut visited: Vec<(&str, &Schema)> = Vec::new();
        root.walk(|name, node| {
            visited.push((name, node));
            true
        });
        let names: Vec<&str> = visited.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["address", "zip"]);
        assert_eq!(visited[1].1.kind, SchemaKind::String);
    }

    #[test]
    fn location_parsing() {
        assert_eq!("path".parse::<Location>(), Ok(Location::Path));
        assert_eq!("".parse::<Location>(), Ok(Location::Body));
        assert_eq!("json".parse::<Location>(), Ok(Location::Body));
        assert_eq!(
            "cookie".parse::<Location>(),
            Err(InvalidLocation("cookie".into()))
        );
    }

    #[test]
    fn serializes_like_json_schema() {
        let mut root = Schema::object();
        root.insert_property(
            "name",
            Schema::string().with_field(FieldMeta {
                location: Location::Query,
                required: true,
                ..FieldMeta::default()
            }),
        );
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["name"]["type"], "string");
        assert_eq!(json["properties"]["name"]["location"], "query");
        assert_eq!(json["properties"]["name"]["required"], true);
        assert!(json.get("items").is_none());
        assert!(json["properties"]["name"].get("enum").is_none());
    }
}
