//! Crate path resolution for generated code.
//!
//! Generated code targets `::bindoc` when the user depends on the facade and
//! `::bindoc_core` otherwise.

use proc_macro2::{Span, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Path prefix for `bindoc_core` items.
///
/// Both crates declare `extern crate self as ...`, so the absolute path also
/// works from inside them.
pub fn bindoc_core_path() -> TokenStream {
    if let Ok(found) = crate_name("bindoc") {
        match found {
            FoundCrate::Itself => quote!(::bindoc),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, Span::call_site());
                quote!(::#ident)
            }
        }
    } else if let Ok(found) = crate_name("bindoc-core") {
        match found {
            FoundCrate::Itself => quote!(::bindoc_core),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, Span::call_site());
                quote!(::#ident)
            }
        }
    } else {
        quote!(::bindoc_core)
    }
}
