//! Field-location binder.
//!
//! [`bind_request`] decodes the JSON body, then lets the derived
//! [`Bind::bind_fields`] walk the struct and pull path, query and header
//! values (or declared defaults) into their fields, then runs ad hoc checks
//! and declarative validation.

mod param;
mod source;

pub use param::{parse_bool, FromParam, ParamParseError};
pub use source::{parse_query_string, ParamSource};

use crate::checks::{run_checks, CheckError, Checks};
use crate::validation::{Validation, Violations};
use serde::de::DeserializeOwned;
use std::fmt;
use validator::Validate;

/// Populate a value's fields from the non-body parts of a request.
///
/// Implemented by `#[derive(Bind)]`. Body fields are only touched when they
/// are `Option`s the JSON body left unset and a default is declared.
pub trait Bind {
    fn bind_fields(&mut self, source: &ParamSource) -> Result<(), BindError>;

    /// Public name of the field at a validator path: `size` becomes
    /// `page_size` for a field bound from `?page_size=`. Unknown paths are
    /// returned unchanged.
    fn field_path(path: &str) -> String {
        path.to_string()
    }

    /// Ad hoc checks, run after binding. Empty unless the type is declared
    /// with `#[api(checks)]`.
    fn checks(&self) -> Checks<'_> {
        Vec::new()
    }
}

impl<T: Bind> Bind for Box<T> {
    fn bind_fields(&mut self, source: &ParamSource) -> Result<(), BindError> {
        (**self).bind_fields(source)
    }

    fn field_path(path: &str) -> String {
        T::field_path(path)
    }

    fn checks(&self) -> Checks<'_> {
        (**self).checks()
    }
}

/// Errors raised while binding one request. All of them are the caller's
/// fault and map to `400 Bad Request`.
#[derive(Debug)]
pub enum BindError {
    /// The body could not be read.
    Read(String),
    /// The body is larger than the configured limit, in bytes.
    BodyTooLarge(usize),
    /// The body is not valid JSON for the target type.
    Body(serde_json::Error),
    /// A raw path/query/header/default value did not convert.
    Conversion {
        field: String,
        value: String,
        source: ParamParseError,
    },
    /// An ad hoc check failed.
    Check(CheckError),
    /// Declarative rules failed.
    Validation(Violations),
}

impl BindError {
    /// Message for the `{"error": ...}` body. Validation violations are
    /// formatted per rule and joined with the engine's separator.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Read(msg) => write!(f, "read body error: {msg}"),
            BindError::BodyTooLarge(limit) => {
                write!(f, "request body exceeds the limit of {limit} bytes")
            }
            BindError::Body(err) => write!(f, "json unmarshal error: {err}"),
            BindError::Conversion {
                field,
                value,
                source,
            } => write!(f, "bind field '{field}': {source} :{value}"),
            BindError::Check(err) => write!(f, "{err}"),
            BindError::Validation(violations) => f.write_str(violations.message()),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Body(err) => Some(err),
            BindError::Conversion { source, .. } => Some(source),
            BindError::Check(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CheckError> for BindError {
    fn from(err: CheckError) -> Self {
        BindError::Check(err)
    }
}

/// Split a validator path into its leading field, that field's index
/// suffix and the rest: `items[0].id` gives `("items", "[0]", Some("id"))`.
pub fn split_field_path(path: &str) -> (&str, &str, Option<&str>) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let (field, index) = head.split_at(head.find('[').unwrap_or(head.len()));
    (field, index, rest)
}

/// Inverse of [`split_field_path`] under a new leading name.
pub fn join_field_path(name: &str, index: &str, rest: Option<&str>) -> String {
    match rest {
        Some(rest) => format!("{name}{index}.{rest}"),
        None => format!("{name}{index}"),
    }
}

/// Bind one raw value into a field.
///
/// An empty or absent `raw` falls back to `default`; when that is empty too
/// the field keeps its current value.
pub fn bind_value<T: FromParam>(
    target: &mut T,
    raw: Option<&str>,
    default: Option<&str>,
    field: &str,
) -> Result<(), BindError> {
    let raw = match raw.filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => match default.filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => return Ok(()),
        },
    };
    *target = T::from_param(raw).map_err(|source| BindError::Conversion {
        field: field.to_string(),
        value: raw.to_string(),
        source,
    })?;
    Ok(())
}

/// Apply a declared default to an optional body field the body left unset.
pub fn bind_body_default<T: FromParam>(
    target: &mut Option<T>,
    default: Option<&str>,
    field: &str,
) -> Result<(), BindError> {
    if target.is_some() {
        return Ok(());
    }
    bind_value(target, None, default, field)
}

/// Run the full binding pipeline for one request.
///
/// 1. Decode a non-empty body as JSON (a failure is kept for later).
/// 2. Bind path, query, header and default values.
/// 3. Report the body decode failure, if any.
/// 4. Run ad hoc checks, first failure wins.
/// 5. Run declarative validation, naming fields by [`Bind::field_path`].
pub fn bind_request<T>(
    body: &[u8],
    source: &ParamSource,
    validation: &Validation,
) -> Result<T, BindError>
where
    T: Bind + DeserializeOwned + Default + Validate,
{
    let mut decode_error = None;
    let mut target = if body.is_empty() {
        T::default()
    } else {
        match serde_json::from_slice::<T>(body) {
            Ok(value) => value,
            Err(err) => {
                decode_error = Some(err);
                T::default()
            }
        }
    };

    target.bind_fields(source)?;

    if let Some(err) = decode_error {
        return Err(BindError::Body(err));
    }

    run_checks(target.checks())?;

    validation
        .validate_named(&target, T::field_path)
        .map_err(BindError::Validation)?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckCtx, FieldChecks};
    use serde::Deserialize;
    use validator::{ValidationError, ValidationErrors};

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Manual {
        id: u32,
        class: Option<String>,
        name: String,
        verbose: bool,
    }

    impl Bind for Manual {
        fn bind_fields(&mut self, source: &ParamSource) -> Result<(), BindError> {
            bind_value(&mut self.id, source.path("id"), None, "id")?;
            bind_value(&mut self.verbose, source.query("verbose"), Some("true"), "verbose")?;
            bind_body_default(&mut self.class, Some("2"), "class")?;
            Ok(())
        }

        fn checks(&self) -> Checks<'_> {
            FieldChecks::checks(self, &CheckCtx)
        }
    }

    impl FieldChecks for Manual {
        fn checks<'a>(&'a self, ctx: &CheckCtx) -> Checks<'a> {
            vec![ctx.max_length("name", &self.name, 5)]
        }
    }

    impl Validate for Manual {
        fn validate(&self) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            if self.name.is_empty() {
                errors.add("name", ValidationError::new("required"));
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(errors)
            }
        }
    }

    #[test]
    fn binds_path_query_and_defaults() {
        let source = ParamSource::new().with_path("id", "7");
        let bound: Manual =
            bind_request(br#"{"name":"bob"}"#, &source, &Validation::new()).unwrap();
        assert_eq!(bound.id, 7);
        assert!(bound.verbose);
        assert_eq!(bound.class.as_deref(), Some("2"));
        assert_eq!(bound.name, "bob");
    }

    #[test]
    fn body_value_is_not_overridden_by_default() {
        let bound: Manual = bind_request(
            br#"{"name":"bob","class":"3"}"#,
            &ParamSource::new(),
            &Validation::new(),
        )
        .unwrap();
        assert_eq!(bound.class.as_deref(), Some("3"));
    }

    #[test]
    fn explicit_false_is_not_replaced_by_default() {
        let source = ParamSource::new().with_query("verbose", "false");
        let bound: Manual =
            bind_request(br#"{"name":"bob"}"#, &source, &Validation::new()).unwrap();
        assert!(!bound.verbose);
    }

    #[test]
    fn field_paths_split_and_join() {
        assert_eq!(split_field_path("size"), ("size", "", None));
        assert_eq!(split_field_path("items[0].id"), ("items", "[0]", Some("id")));
        assert_eq!(split_field_path("owner.address.zip"), ("owner", "", Some("address.zip")));
        assert_eq!(join_field_path("page_size", "", None), "page_size");
        assert_eq!(join_field_path("entries", "[2]", Some("id")), "entries[2].id");
    }

    #[test]
    fn explicit_zero_is_not_replaced_by_default() {
        let mut port = 1u16;
        bind_value(&mut port, Some("0"), Some("8080"), "port").unwrap();
        assert_eq!(port, 0);
    }

    #[test]
    fn empty_without_default_keeps_value() {
        let mut port = 1u16;
        bind_value(&mut port, Some(""), None, "port").unwrap();
        bind_value(&mut port, None, Some(""), "port").unwrap();
        assert_eq!(port, 1);
    }

    #[test]
    fn conversion_error_keeps_raw_value() {
        let source = ParamSource::new().with_path("id", "abc");
        let err = bind_request::<Manual>(br#"{"name":"bob"}"#, &source, &Validation::new())
            .unwrap_err();
        match &err {
            BindError::Conversion { field, value, .. } => {
                assert_eq!(field, "id");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.message().ends_with(":abc"));
    }

    #[test]
    fn invalid_body_is_reported_after_binding() {
        let err = bind_request::<Manual>(b"{not json", &ParamSource::new(), &Validation::new())
            .unwrap_err();
        assert!(matches!(err, BindError::Body(_)));
        assert!(err.message().starts_with("json unmarshal error"));

        // a binding failure on the same request wins
        let source = ParamSource::new().with_path("id", "x");
        let err = bind_request::<Manual>(b"{not json", &source, &Validation::new()).unwrap_err();
        assert!(matches!(err, BindError::Conversion { .. }));
    }

    #[test]
    fn checks_run_before_validation() {
        let err = bind_request::<Manual>(
            br#"{"name":"too long name"}"#,
            &ParamSource::new(),
            &Validation::new(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "name length should be less or equal than 5");
    }

    #[test]
    fn validation_errors_are_formatted() {
        let err = bind_request::<Manual>(b"", &ParamSource::new(), &Validation::new()).unwrap_err();
        assert!(matches!(err, BindError::Validation(_)));
        assert_eq!(err.message(), "'name' is required");
    }
}
