use crate::attrs::{self, ContainerAttrs, FieldAttrs, Location};
use crate::crate_path::bindoc_core_path;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// Named fields of a struct with their parsed attributes, or the compile
/// error for any other item.
pub fn struct_fields(
    input: &DeriveInput,
    derive: &str,
) -> syn::Result<Vec<(syn::Field, FieldAttrs)>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} can only be derived for structs"),
        ));
    };
    match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| Ok((field.clone(), attrs::parse_field(field)?)))
            .collect(),
        Fields::Unit => Ok(Vec::new()),
        Fields::Unnamed(_) => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} requires named fields"),
        )),
    }
}

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let krate = bindoc_core_path();
    let container = attrs::parse_container(&input.attrs)?;
    let fields = struct_fields(&input, "ApiSchema")?;

    let inserts = fields
        .iter()
        .filter(|(_, attrs)| !attrs.skip)
        .map(|(field, attrs)| field_schema(&krate, &container, field, attrs));

    let name = &input.ident;
    let description = doc_description(&input.attrs);
    let description = match description {
        Some(text) => quote! { __root = __root.with_description(#text); },
        None => quote! {},
    };
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(#krate::schema::ApiSchema));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::schema::ApiSchema for #name #ty_generics #where_clause {
            fn api_schema() -> #krate::schema::Schema {
                let mut __root = #krate::schema::Schema::object();
                #(#inserts)*
                #description
                __root
            }
        }
    })
}

fn field_schema(
    krate: &TokenStream,
    container: &ContainerAttrs,
    field: &syn::Field,
    attrs: &FieldAttrs,
) -> TokenStream {
    let ty = &field.ty;
    if attrs.inline {
        return quote! {
            __root.flatten(<#ty as #krate::schema::ApiSchema>::api_schema());
        };
    }

    let name = attrs.name(container);
    let location = match attrs.location {
        Location::Path => quote!(Path),
        Location::Query => quote!(Query),
        Location::Header => quote!(Header),
        Location::Body => quote!(Body),
    };
    let description = attrs
        .description
        .clone()
        .or_else(|| doc_description(&field.attrs));
    let description = opt_str(description.as_deref());
    let example = opt_str(attrs.example.as_deref());
    let default = opt_str(attrs.default.as_deref());
    let rules = opt_str(attrs.rules.as_deref());
    let required = attrs.required;
    let enums = &attrs.enums;
    let max_length = match attrs.max_length {
        Some(n) => quote!(::core::option::Option::Some(#n)),
        None => quote!(::core::option::Option::None),
    };

    quote! {
        __root.insert_property(
            #name,
            <#ty as #krate::schema::ApiSchema>::api_schema().with_field(
                #krate::schema::FieldMeta {
                    location: #krate::schema::Location::#location,
                    description: #description,
                    example: #example,
                    default: #default,
                    required: #required,
                    rules: #rules,
                    enum_values: &[#(#enums),*],
                    max_length: #max_length,
                },
            ),
        );
    }
}

fn opt_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(s) => quote!(::core::option::Option::Some(#s)),
        None => quote!(::core::option::Option::None),
    }
}

/// `///` doc lines, trimmed and joined with spaces.
fn doc_description(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn rejects_enums_and_tuple_structs() {
        let input: DeriveInput = parse_quote! { enum Kind { A, B } };
        assert!(expand(input).is_err());
        let input: DeriveInput = parse_quote! { struct Id(u32); };
        assert!(expand(input).is_err());
    }

    #[test]
    fn unit_structs_are_empty_objects() {
        let input: DeriveInput = parse_quote! { struct Empty; };
        let tokens = expand(input).unwrap().to_string();
        assert!(tokens.contains("Schema :: object"));
        assert!(!tokens.contains("insert_property"));
    }

    #[test]
    fn skips_and_flattens() {
        let input: DeriveInput = parse_quote! {
            struct Req {
                #[api(inline)]
                base: Base,
                #[api(skip)]
                cache: u8,
                #[api(query = "q", desc = "search")]
                term: String,
            }
        };
        let tokens = expand(input).unwrap().to_string();
        assert!(tokens.contains("flatten"));
        assert!(!tokens.contains("\"cache\""));
        assert!(tokens.contains("\"q\""));
        assert!(tokens.contains("Location :: Query"));
    }

    #[test]
    fn type_parameters_get_schema_bounds() {
        let input: DeriveInput = parse_quote! {
            struct Resp<T> {
                data: Option<T>,
            }
        };
        let tokens = expand(input).unwrap().to_string();
        assert!(tokens.contains("impl < T :"));
        assert!(tokens.contains("schema :: ApiSchema > "));
    }

    #[test]
    fn doc_comments_become_descriptions() {
        let attrs: Vec<syn::Attribute> = vec![
            parse_quote!(#[doc = " First line."]),
            parse_quote!(#[doc = ""]),
            parse_quote!(#[doc = " Second."]),
        ];
        assert_eq!(doc_description(&attrs).as_deref(), Some("First line. Second."));
    }
}
