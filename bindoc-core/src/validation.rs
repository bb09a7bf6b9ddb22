//! Declarative validation through the `validator` crate.
//!
//! [`Validation`] runs `validator::Validate` on a bound request and flattens
//! the nested error tree into an ordered list of [`FieldViolation`]s, which
//! [`format_violation`] turns into user-facing messages.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Dotted path of the failing field (`child.name`, `items[0].id`).
    pub field: String,
    /// Rule code reported by the validator (`required`, `length`, `email`...).
    pub rule: String,
    pub params: BTreeMap<String, Value>,
    /// Custom message attached to the rule, if any.
    pub message: Option<String>,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            params: BTreeMap::new(),
            message: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Rule parameters as `key=value` pairs, without the offending value.
    pub fn param(&self) -> String {
        self.params
            .iter()
            .filter(|(k, _)| k.as_str() != "value")
            .map(|(k, v)| format!("{k}={}", display_value(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn get(&self, name: &str) -> Option<String> {
        self.params.get(name).map(display_value)
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_violation(self))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// The violations of one request with their aggregated message.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations {
    items: Vec<FieldViolation>,
    message: String,
}

impl Violations {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.items
    }
}

impl Deref for Violations {
    type Target = [FieldViolation];

    fn deref(&self) -> &[FieldViolation] {
        &self.items
    }
}

/// Shared handle on the declarative validation engine.
///
/// Built once by [`ApiGroup::new`](crate::registry::ApiGroup::new) and shared
/// by every registered handler.
#[derive(Debug, Clone)]
pub struct Validation {
    separator: String,
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}

impl Validation {
    pub fn new() -> Self {
        Self {
            separator: ",".to_string(),
        }
    }

    /// Separator used by [`join`](Self::join) when aggregating messages.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Run the struct's declarative rules.
    pub fn validate<T: Validate>(&self, value: &T) -> Result<(), Vec<FieldViolation>> {
        value.validate().map_err(|errors| flatten_errors(&errors))
    }

    /// Run the struct's declarative rules, report each field under
    /// `rename(rust_path)` and aggregate the messages.
    pub fn validate_named<T, F>(&self, value: &T, rename: F) -> Result<(), Violations>
    where
        T: Validate,
        F: Fn(&str) -> String,
    {
        value
            .validate()
            .map_err(|errors| self.aggregate(flatten_named(&errors, rename)))
    }

    /// Format and join `violations` once, keeping both.
    pub fn aggregate(&self, violations: Vec<FieldViolation>) -> Violations {
        Violations {
            message: self.join(&violations),
            items: violations,
        }
    }

    /// Aggregate the formatted violations into one message.
    pub fn join(&self, violations: &[FieldViolation]) -> String {
        violations
            .iter()
            .map(format_violation)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// Flatten a `validator` error tree into violations ordered by field path.
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<FieldViolation> {
    flatten_named(errors, str::to_string)
}

/// [`flatten_errors`], with every field path passed through `rename`.
pub fn flatten_named<F>(errors: &ValidationErrors, rename: F) -> Vec<FieldViolation>
where
    F: Fn(&str) -> String,
{
    let mut out = Vec::new();
    collect("", errors, &mut out);
    for violation in &mut out {
        violation.field = rename(&violation.field);
    }
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    let mut entries: Vec<(String, &ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, kind) in entries {
        // struct-level (`__all__`) errors belong to the enclosing field
        let path = match (prefix.is_empty(), field == "__all__") {
            (true, _) => field,
            (false, true) => prefix.to_string(),
            (false, false) => format!("{prefix}.{field}"),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| to_violation(&path, error)));
            }
            ValidationErrorsKind::Struct(nested) => collect(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn to_violation(field: &str, error: &ValidationError) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        rule: error.code.to_string(),
        params: error
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        message: error.message.as_ref().map(|m| m.to_string()),
    }
}

/// Human-readable message for one violation.
pub fn format_violation(v: &FieldViolation) -> String {
    let field = &v.field;
    let param = |name: &str| v.get(name).unwrap_or_default();
    match v.rule.as_str() {
        "required" => format!("'{field}' is required"),
        "length" => bounds(field, "length", v),
        "range" => bounds(field, "value", v),
        "max" => format!("'{field}' must be less or eq than '{}'", param("value")),
        "min" => format!("'{field}' must be greater or eq than '{}'", param("value")),
        "gt" => format!("'{field}' must be greater than '{}'", param("value")),
        "lt" => format!("'{field}' must be less than '{}'", param("value")),
        "gte" => format!("'{field}' must be greater than or equal '{}'", param("value")),
        "lte" => format!("'{field}' must be less than or equal '{}'", param("value")),
        "email" => format!("'{field}' is not a valid email address"),
        "url" => format!("'{field}' must be a valid url"),
        "oneof" => format!("'{field}' must be oneof '{}'", param("values")),
        "startswith" => format!("'{field}' must startswith '{}'", param("prefix")),
        "endswith" => format!("'{field}' must endswith '{}'", param("suffix")),
        "contains" => format!("'{field}' must contains '{}'", param("needle")),
        "does_not_contain" | "excludes" => {
            format!("'{field}' must excludes '{}'", param("needle"))
        }
        "must_match" => format!("'{field}' must match '{}'", param("other")),
        "regex" => format!("'{field}' does not match the expected format"),
        "uuid" | "ip" | "ipv4" | "ipv6" | "credit_card" => {
            format!("'{field}' must be valid {}", v.rule)
        }
        rule if rule.starts_with("required") => format!("'{field}' is required"),
        rule => match &v.message {
            Some(message) => format!("'{field}' {message}"),
            None => format!("'{field}' failed on the '{rule}' rule"),
        },
    }
}

/// Messages for `length` and `range` rules, which carry their bounds as
/// `min`/`max`/`equal`/`exclusive_*` params.
fn bounds(field: &str, what: &str, v: &FieldViolation) -> String {
    if let Some(equal) = v.get("equal") {
        return format!("'{field}' {what} must be eq '{equal}'");
    }
    let mut parts = Vec::new();
    if let Some(min) = v.get("min") {
        parts.push(format!("greater or eq than '{min}'"));
    }
    if let Some(min) = v.get("exclusive_min") {
        parts.push(format!("greater than '{min}'"));
    }
    if let Some(max) = v.get("max") {
        parts.push(format!("less or eq than '{max}'"));
    }
    if let Some(max) = v.get("exclusive_max") {
        parts.push(format!("less than '{max}'"));
    }
    if parts.is_empty() {
        return format!("'{field}' {what} is out of range");
    }
    format!("'{field}' {what} must be {}", parts.join(" and "))
}
