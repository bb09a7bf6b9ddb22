//! Custom rules for `#[validate(custom(function = ...))]`.

use validator::ValidationError;

/// Values that can be empty.
pub trait HasLength {
    fn is_blank(&self) -> bool;
}

impl HasLength for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl HasLength for str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> HasLength for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, H> HasLength for std::collections::HashMap<K, V, H> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> HasLength for std::collections::BTreeMap<K, V> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Fails with the `required` code on an empty string or collection.
///
/// `validator`'s own `required` only looks at `Option`s:
///
/// ```ignore
/// #[validate(custom(function = "bindoc::rules::required"))]
/// username: String,
/// ```
pub fn required<T: HasLength + ?Sized>(value: &T) -> Result<(), ValidationError> {
    if value.is_blank() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}
