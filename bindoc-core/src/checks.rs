//! Ad hoc, per-type checks that run before declarative validation.
//!
//! A request type opts in with `#[api(checks)]` and an impl of
//! [`FieldChecks`]. The returned checks run in order and the first failure
//! is reported as-is.
//!
//! ```ignore
//! #[derive(Default, Deserialize, Validate, ApiSchema, Bind)]
//! #[api(checks)]
//! struct CreateUser { password: String }
//!
//! impl FieldChecks for CreateUser {
//!     fn checks<'a>(&'a self, ctx: &CheckCtx) -> Checks<'a> {
//!         vec![
//!             ctx.not_empty("password", &self.password),
//!             ctx.min_length("password", &self.password, 8),
//!         ]
//!     }
//! }
//! ```

use std::fmt;

/// Failure of an ad hoc check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError(pub String);

impl CheckError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CheckError {}

/// A deferred check borrowing from the value it inspects.
pub type Check<'a> = Box<dyn FnOnce() -> Result<(), CheckError> + 'a>;

/// Ordered checks for one value.
pub type Checks<'a> = Vec<Check<'a>>;

/// Hook implemented by request types declared with `#[api(checks)]`.
pub trait FieldChecks {
    fn checks<'a>(&'a self, ctx: &CheckCtx) -> Checks<'a>;
}

/// Run checks in order, stopping at the first failure.
pub fn run_checks(checks: Checks<'_>) -> Result<(), CheckError> {
    for check in checks {
        check()?;
    }
    Ok(())
}

/// Builder for the common checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckCtx;

impl CheckCtx {
    /// Wrap an arbitrary closure.
    pub fn custom<'a>(
        &self,
        f: impl FnOnce() -> Result<(), CheckError> + 'a,
    ) -> Check<'a> {
        Box::new(f)
    }

    pub fn maximum<'a>(&self, name: &'a str, max: i64, v: i64) -> Check<'a> {
        Box::new(move || {
            if v > max {
                return Err(CheckError(format!(
                    "{name} value should be less or equal than {max}"
                )));
            }
            Ok(())
        })
    }

    pub fn minimum<'a>(&self, name: &'a str, min: i64, v: i64) -> Check<'a> {
        Box::new(move || {
            if v < min {
                return Err(CheckError(format!(
                    "{name} value should be greater or equal than {min}"
                )));
            }
            Ok(())
        })
    }

    pub fn not_empty<'a>(&self, name: &'a str, v: &'a str) -> Check<'a> {
        Box::new(move || {
            if v.is_empty() {
                return Err(CheckError(format!("{name} value should not be empty")));
            }
            Ok(())
        })
    }

    pub fn str_in<'a>(&self, name: &'a str, v: &'a str, allowed: &'a [&'a str]) -> Check<'a> {
        Box::new(move || {
            if allowed.contains(&v) {
                return Ok(());
            }
            Err(CheckError(format!(
                "{name} value should be one of [{}]",
                allowed.join(" ")
            )))
        })
    }

    pub fn int_in<'a>(&self, name: &'a str, v: i64, allowed: &'a [i64]) -> Check<'a> {
        Box::new(move || {
            if allowed.contains(&v) {
                return Ok(());
            }
            let listed: Vec<String> = allowed.iter().map(i64::to_string).collect();
            Err(CheckError(format!(
                "{name} value should be one of [{}]",
                listed.join(" ")
            )))
        })
    }

    pub fn less_than<'a>(&self, name: &'a str, v: i64, bound: i64) -> Check<'a> {
        Box::new(move || {
            if v >= bound {
                return Err(CheckError(format!("{name} value should be less than {bound}")));
            }
            Ok(())
        })
    }

    pub fn greater_than<'a>(&self, name: &'a str, v: i64, bound: i64) -> Check<'a> {
        Box::new(move || {
            if v <= bound {
                return Err(CheckError(format!(
                    "{name} value should be greater than {bound}"
                )));
            }
            Ok(())
        })
    }

    /// Length in characters.
    pub fn max_length<'a>(&self, name: &'a str, v: &'a str, max: usize) -> Check<'a> {
        Box::new(move || {
            if v.chars().count() > max {
                return Err(CheckError(format!(
                    "{name} length should be less or equal than {max}"
                )));
            }
            Ok(())
        })
    }

    pub fn min_length<'a>(&self, name: &'a str, v: &'a str, min: usize) -> Check<'a> {
        Box::new(move || {
            if v.chars().count() < min {
                return Err(CheckError(format!(
                    "{name} length should be large or equal than {min}"
                )));
            }
            Ok(())
        })
    }
}
