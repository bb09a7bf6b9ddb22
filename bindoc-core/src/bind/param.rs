use std::fmt;
use std::sync::Arc;

/// Error produced when a raw path/query/header string cannot be converted
/// into the field's scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamParseError {
    pub expected: &'static str,
    pub reason: String,
}

impl fmt::Display for ParamParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.expected, self.reason)
    }
}

impl std::error::Error for ParamParseError {}

/// Conversion from a raw request string into a field value.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be bound from a path, query or header value",
    label = "not a scalar field type",
    note = "built-in types: String, integers, floats, bool, char, Option<T>, Box<T>, Arc<T>. Mark nested structs as body fields instead."
)]
pub trait FromParam: Sized {
    fn from_param(raw: &str) -> Result<Self, ParamParseError>;
}

impl FromParam for String {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        Ok(raw.to_string())
    }
}

impl FromParam for Arc<str> {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        Ok(Arc::from(raw))
    }
}

impl FromParam for char {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ParamParseError {
                expected: "char",
                reason: "expected exactly one character".to_string(),
            }),
        }
    }
}

macro_rules! numeric_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(raw: &str) -> Result<Self, ParamParseError> {
                    raw.parse::<$ty>().map_err(|e| ParamParseError {
                        expected: stringify!($ty),
                        reason: e.to_string(),
                    })
                }
            }
        )*
    };
}

numeric_param!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl FromParam for bool {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        parse_bool(raw).ok_or_else(|| ParamParseError {
            expected: "bool",
            reason: format!("'{raw}' is not a boolean"),
        })
    }
}

/// An optional field is allocated when a value is bound to it.
impl<T: FromParam> FromParam for Option<T> {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        T::from_param(raw).map(Some)
    }
}

impl<T: FromParam> FromParam for Arc<T> {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        T::from_param(raw).map(Arc::new)
    }
}

impl<T: FromParam> FromParam for Box<T> {
    fn from_param(raw: &str) -> Result<Self, ParamParseError> {
        T::from_param(raw).map(Box::new)
    }
}

/// Boolean spellings accepted in path, query and header values.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
