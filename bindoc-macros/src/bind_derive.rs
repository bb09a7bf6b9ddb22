use crate::attrs::{self, ContainerAttrs, FieldAttrs, Location};
use crate::crate_path::bindoc_core_path;
use crate::schema_derive::struct_fields;
use crate::types::{bind_target, shape_of, unwrap_generic, Shape};
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let krate = bindoc_core_path();
    let container = attrs::parse_container(&input.attrs)?;
    let fields = struct_fields(&input, "Bind")?;

    let bound: Vec<_> = fields.iter().filter(|(_, attrs)| !attrs.skip).collect();
    let binds = bound
        .iter()
        .map(|(field, attrs)| field_bind(&krate, &container, field, attrs))
        .collect::<syn::Result<Vec<_>>>()?;
    let paths = bound
        .iter()
        .map(|(field, attrs)| field_path_arm(&krate, &container, field, attrs));

    let checks = if container.checks {
        quote! {
            fn checks(&self) -> #krate::checks::Checks<'_> {
                #krate::checks::FieldChecks::checks(self, &#krate::checks::CheckCtx)
            }
        }
    } else {
        quote! {}
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #krate::bind::Bind for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind_fields(
                &mut self,
                source: &#krate::bind::ParamSource,
            ) -> ::core::result::Result<(), #krate::bind::BindError> {
                #(#binds)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn field_path(path: &str) -> ::std::string::String {
                let (field, index, rest) = #krate::bind::split_field_path(path);
                match field {
                    #(#paths)*
                    _ => ::std::string::String::from(path),
                }
            }

            #checks
        }
    })
}

fn field_bind(
    krate: &TokenStream,
    container: &ContainerAttrs,
    field: &syn::Field,
    attrs: &FieldAttrs,
) -> syn::Result<TokenStream> {
    let ident = &attrs.ident;
    let shape = shape_of(&field.ty, attrs.scalar);
    let name = attrs.name(container);
    let default = match &attrs.default {
        Some(d) => quote!(::core::option::Option::Some(#d)),
        None => quote!(::core::option::Option::None),
    };

    if attrs.inline {
        return Ok(quote! {
            #krate::bind::Bind::bind_fields(&mut self.#ident, source)?;
        });
    }

    let lookup = match attrs.location {
        Location::Path => quote!(path),
        Location::Query => quote!(query),
        Location::Header => quote!(header),
        Location::Body => {
            return Ok(match shape {
                Shape::Nested => quote! {
                    #krate::bind::Bind::bind_fields(&mut self.#ident, source)?;
                },
                Shape::OptionNested => quote! {
                    if let ::core::option::Option::Some(inner) = self.#ident.as_mut() {
                        #krate::bind::Bind::bind_fields(inner, source)?;
                    }
                },
                Shape::OptionScalar
                    if attrs.default.is_some() && unwrap_generic(&field.ty, "Option").is_some() =>
                {
                    quote! {
                        #krate::bind::bind_body_default(&mut self.#ident, #default, #name)?;
                    }
                }
                _ => quote! {},
            });
        }
    };

    if shape == Shape::Scalar && !container.serde_default && !attrs.serde_default {
        return Err(syn::Error::new_spanned(
            &attrs.ident,
            format!(
                "field `{ident}` is bound from `{lookup}` and may be absent from the body; \
                 add `#[serde(default)]` to the struct or the field"
            ),
        ));
    }

    if !shape.is_scalar() {
        return Err(syn::Error::new_spanned(
            &field.ty,
            format!(
                "field `{ident}` is declared at `{lookup}` but its type is not a scalar; \
                 use `#[api(scalar)]` for types implementing FromParam"
            ),
        ));
    }

    Ok(quote! {
        #krate::bind::bind_value(&mut self.#ident, source.#lookup(#name), #default, #name)?;
    })
}

/// Match arm of the derived `field_path`, mapping the validator's name of a
/// field to its public one.
fn field_path_arm(
    krate: &TokenStream,
    container: &ContainerAttrs,
    field: &syn::Field,
    attrs: &FieldAttrs,
) -> TokenStream {
    let rust_name = attrs.field_name();
    let name = attrs.name(container);
    let target = bind_target(&field.ty);

    if attrs.inline {
        return quote! {
            #rust_name => match rest {
                ::core::option::Option::Some(rest) => {
                    <#target as #krate::bind::Bind>::field_path(rest)
                }
                ::core::option::Option::None => ::std::string::String::from(path),
            },
        };
    }

    match shape_of(&field.ty, attrs.scalar) {
        Shape::Nested | Shape::OptionNested if attrs.location == Location::Body => quote! {
            #rust_name => {
                let rest = rest.map(<#target as #krate::bind::Bind>::field_path);
                #krate::bind::join_field_path(#name, index, rest.as_deref())
            }
        },
        _ => quote! {
            #rust_name => #krate::bind::join_field_path(#name, index, rest),
        },
    }
}
