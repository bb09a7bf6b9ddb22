extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod attrs;
pub(crate) mod bind_derive;
pub(crate) mod crate_path;
pub(crate) mod schema_derive;
pub(crate) mod types;

/// Derive `ApiSchema`: a documentation schema built from the struct's fields.
///
/// # Field attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[api(path)]`, `#[api(path = "name")]` | Bound from the route template |
/// | `#[api(query)]`, `#[api(query = "name")]` | Bound from the query string |
/// | `#[api(header)]`, `#[api(header = "name")]` | Bound from a request header |
/// | `#[api(json)]` | JSON body field (the default) |
/// | `#[api(desc = "...")]` | Description (falls back to `///` docs) |
/// | `#[api(example = ...)]` | Example literal; `"-"` omits the field from examples |
/// | `#[api(default = ...)]` | Used when no value is supplied |
/// | `#[api(required)]` | Marks the field required in the documents |
/// | `#[api(enums = "a,b,c")]` | Allowed values |
/// | `#[api(max_length = N)]` | Documented maximum length |
/// | `#[api(inline)]` / `#[serde(flatten)]` | Merge the nested struct's fields into this one |
/// | `#[api(scalar)]` | Treat a user type as a single value (requires `FromParam`) |
/// | `#[api(skip)]` / `#[serde(skip)]` | Leave the field out |
///
/// Names follow `#[api(query = "...")]` and friends first, then
/// `#[serde(rename)]`, then `#[serde(rename_all)]`. The contents of
/// `#[validate(...)]` are recorded verbatim; a rule mentioning `required`
/// marks the field required.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Deserialize, Validate, ApiSchema, Bind)]
/// #[serde(default)]
/// pub struct GetUser {
///     #[api(path, desc = "user name", example = "alice")]
///     #[validate(length(min = 1))]
///     pub username: String,
///     #[api(query, default = 10)]
///     pub limit: Option<u32>,
/// }
/// ```
#[proc_macro_derive(ApiSchema, attributes(api))]
pub fn derive_api_schema(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    schema_derive::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `Bind`: copies path, query and header values into the fields
/// declared at those locations, applies defaults and recurses into nested
/// structs.
///
/// Accepts the same `#[api(...)]` attributes as [`ApiSchema`](derive@ApiSchema).
/// A container-level `#[api(checks)]` runs the type's `FieldChecks` before
/// declarative validation.
///
/// Non-`Option` path, query and header fields need `#[serde(default)]` on the
/// struct or the field, since the JSON body is decoded before they are bound.
/// The generated `field_path` reports validation failures under the same
/// public names the fields are bound and documented with.
#[proc_macro_derive(Bind, attributes(api))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    bind_derive::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
