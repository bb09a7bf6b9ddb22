//! Syntax-level classification of field types.
//!
//! Derives only see tokens, so the shape of a field is decided from the last
//! path segment of its type. `#[api(scalar)]` overrides the guess for
//! user types that convert from a single string.

use syn::{GenericArgument, PathArguments, Type};

/// How the binder treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Converted from one raw string.
    Scalar,
    /// `Option` of a scalar.
    OptionScalar,
    /// A struct deriving `Bind`, walked recursively.
    Nested,
    /// `Option` of a nested struct, walked when present.
    OptionNested,
    /// Sequences, maps and JSON values: decoded from the body only.
    Opaque,
}

impl Shape {
    pub fn is_scalar(self) -> bool {
        matches!(self, Shape::Scalar | Shape::OptionScalar)
    }
}

const SCALARS: &[&str] = &[
    "String", "str", "char", "bool", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64",
];

const OPAQUE: &[&str] = &[
    "Vec", "VecDeque", "HashSet", "BTreeSet", "HashMap", "BTreeMap", "Value",
];

pub fn shape_of(ty: &Type, force_scalar: bool) -> Shape {
    let ty = unwrap_box(ty);
    // shared values convert from a string but cannot be bound in place
    if let Some(inner) = unwrap_generic(ty, "Arc") {
        let shape = shape_of(inner, force_scalar);
        return if shape.is_scalar() { shape } else { Shape::Opaque };
    }
    if let Some(inner) = unwrap_generic(ty, "Option") {
        return match shape_of(inner, force_scalar) {
            Shape::Scalar | Shape::OptionScalar => Shape::OptionScalar,
            Shape::Nested | Shape::OptionNested => Shape::OptionNested,
            Shape::Opaque => Shape::Opaque,
        };
    }
    if force_scalar {
        return Shape::Scalar;
    }
    match ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => {
                let name = segment.ident.to_string();
                if SCALARS.contains(&name.as_str()) {
                    Shape::Scalar
                } else if OPAQUE.contains(&name.as_str()) {
                    Shape::Opaque
                } else {
                    Shape::Nested
                }
            }
            None => Shape::Opaque,
        },
        Type::Reference(reference) => shape_of(&reference.elem, false),
        Type::Paren(paren) => shape_of(&paren.elem, false),
        _ => Shape::Opaque,
    }
}

fn unwrap_box(ty: &Type) -> &Type {
    match unwrap_generic(ty, "Box") {
        Some(inner) => unwrap_box(inner),
        None => ty,
    }
}

/// The type implementing `Bind` behind a nested field: `Option<Address>`
/// gives `Address`, `Box<Address>` stays as is.
pub fn bind_target(ty: &Type) -> &Type {
    unwrap_generic(ty, "Option").unwrap_or(ty)
}

/// `T` of `Wrapper<T>`, matched on the last path segment.
pub fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
