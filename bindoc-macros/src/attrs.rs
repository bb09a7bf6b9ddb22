//! Parsing of `#[api(...)]`, `#[serde(...)]` and `#[validate(...)]` on
//! request and response structs.

use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Field, Ident, Lit, LitStr, Meta, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Header,
    Body,
}

impl Location {
    fn keyword(self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
            Location::Body => "json",
        }
    }
}

/// Container-level options.
#[derive(Default)]
pub struct ContainerAttrs {
    /// Run `FieldChecks` before declarative validation.
    pub checks: bool,
    pub rename_all: Option<RenameRule>,
    /// `#[serde(default)]`: absent body fields take `Default` values.
    pub serde_default: bool,
}

/// Everything declared on one field.
pub struct FieldAttrs {
    pub ident: Ident,
    pub location: Location,
    /// Explicit name from `path = "..."` and friends.
    pub location_name: Option<String>,
    pub serde_rename: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub default: Option<String>,
    pub required: bool,
    pub enums: Vec<String>,
    pub max_length: Option<usize>,
    pub inline: bool,
    pub scalar: bool,
    pub skip: bool,
    /// Field-level `#[serde(default)]` or `#[serde(default = "...")]`.
    pub serde_default: bool,
    /// Raw `#[validate(...)]` contents.
    pub rules: Option<String>,
}

impl FieldAttrs {
    /// The Rust field name without a raw-identifier prefix, as reported by
    /// the validator.
    pub fn field_name(&self) -> String {
        let ident = self.ident.to_string();
        match ident.strip_prefix("r#") {
            Some(stripped) => stripped.to_string(),
            None => ident,
        }
    }

    /// Property key and lookup name: explicit location name, then serde
    /// rename, then the (container-renamed) field name.
    pub fn name(&self, container: &ContainerAttrs) -> String {
        if let Some(name) = &self.location_name {
            return name.clone();
        }
        if let Some(name) = &self.serde_rename {
            return name.clone();
        }
        let ident = self.field_name();
        match container.rename_all {
            Some(rule) => rule.apply(&ident),
            None => ident,
        }
    }
}

pub fn parse_container(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("api") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("checks") {
                    out.checks = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `checks`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            for meta in serde_metas(attr)? {
                if meta.path().is_ident("default") {
                    out.serde_default = true;
                }
                if let Meta::NameValue(nv) = &meta {
                    if nv.path.is_ident("rename_all") {
                        let value = expr_string(&nv.value).ok_or_else(|| {
                            syn::Error::new_spanned(&nv.value, "expected a string")
                        })?;
                        out.rename_all = Some(RenameRule::parse(&value).ok_or_else(|| {
                            syn::Error::new_spanned(&nv.value, "unknown rename_all rule")
                        })?);
                    }
                }
            }
        }
    }
    Ok(out)
}

pub fn parse_field(field: &Field) -> syn::Result<FieldAttrs> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let mut out = FieldAttrs {
        ident,
        location: Location::Body,
        location_name: None,
        serde_rename: None,
        description: None,
        example: None,
        default: None,
        required: false,
        enums: Vec::new(),
        max_length: None,
        inline: false,
        scalar: false,
        skip: false,
        serde_default: false,
        rules: None,
    };
    let mut location_seen = false;
    let mut rules: Vec<String> = Vec::new();

    for attr in &field.attrs {
        if attr.path().is_ident("api") {
            attr.parse_nested_meta(|meta| {
                let location = if meta.path.is_ident("path") {
                    Some(Location::Path)
                } else if meta.path.is_ident("query") {
                    Some(Location::Query)
                } else if meta.path.is_ident("header") {
                    Some(Location::Header)
                } else if meta.path.is_ident("json") || meta.path.is_ident("body") {
                    Some(Location::Body)
                } else {
                    None
                };
                if let Some(location) = location {
                    if location_seen {
                        return Err(meta.error("a field has a single location"));
                    }
                    location_seen = true;
                    out.location = location;
                    if meta.input.peek(Token![=]) {
                        let name: LitStr = meta.value()?.parse()?;
                        if name.value().is_empty() {
                            return Err(syn::Error::new_spanned(name, "empty parameter name"));
                        }
                        out.location_name = Some(name.value());
                    }
                    return Ok(());
                }

                if meta.path.is_ident("desc") || meta.path.is_ident("description") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.description = Some(lit.value());
                } else if meta.path.is_ident("example") {
                    out.example = Some(lit_string(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("default") {
                    out.default = Some(lit_string(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("required") {
                    out.required = if meta.input.peek(Token![=]) {
                        let lit: syn::LitBool = meta.value()?.parse()?;
                        lit.value
                    } else {
                        true
                    };
                } else if meta.path.is_ident("enums") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.enums = lit
                        .value()
                        .split(',')
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect();
                } else if meta.path.is_ident("max_length") {
                    let lit: syn::LitInt = meta.value()?.parse()?;
                    out.max_length = Some(lit.base10_parse()?);
                } else if meta.path.is_ident("inline") {
                    out.inline = true;
                } else if meta.path.is_ident("scalar") {
                    out.scalar = true;
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else {
                    return Err(meta.error(
                        "unknown api attribute, expected one of: path, query, header, json, desc, \
                         example, default, required, enums, max_length, inline, scalar, skip",
                    ));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            for meta in serde_metas(attr)? {
                match &meta {
                    Meta::Path(path) if path.is_ident("flatten") => out.inline = true,
                    meta if meta.path().is_ident("default") => out.serde_default = true,
                    Meta::Path(path)
                        if path.is_ident("skip") || path.is_ident("skip_deserializing") =>
                    {
                        out.skip = true
                    }
                    Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                        out.serde_rename = expr_string(&nv.value);
                    }
                    Meta::List(list) if list.path.is_ident("rename") => {
                        // rename(serialize = "..", deserialize = "..")
                        let inner = list.parse_args_with(
                            Punctuated::<Meta, Token![,]>::parse_terminated,
                        )?;
                        for item in inner {
                            if let Meta::NameValue(nv) = item {
                                if nv.path.is_ident("deserialize") {
                                    out.serde_rename = expr_string(&nv.value);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        } else if attr.path().is_ident("validate") {
            let list = attr.meta.require_list()?;
            rules.push(normalize_tokens(&list.tokens.to_string()));
        }
    }

    if !rules.is_empty() {
        out.rules = Some(rules.join(", "));
    }
    if out.inline && location_seen && out.location != Location::Body {
        return Err(syn::Error::new_spanned(
            &out.ident,
            format!(
                "inline fields cannot be declared at `{}`",
                out.location.keyword()
            ),
        ));
    }
    Ok(out)
}

fn serde_metas(attr: &Attribute) -> syn::Result<Punctuated<Meta, Token![,]>> {
    attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
}

fn expr_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s.value()),
        _ => None,
    }
}

/// Literal as written, strings unquoted: `8080`, `true`, `"bob"` -> `bob`.
fn lit_string(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Int(i) => Ok(i.base10_digits().to_string()),
        Lit::Float(f) => Ok(f.base10_digits().to_string()),
        Lit::Bool(b) => Ok(b.value.to_string()),
        Lit::Char(c) => Ok(c.value().to_string()),
        other => Err(syn::Error::new_spanned(other, "expected a string, number or bool")),
    }
}

/// Tidy the spacing of stringified tokens: `length (min = 1 , max = 5)`
/// becomes `length(min = 1, max = 5)`.
pub fn normalize_tokens(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            let drop = matches!(next, Some(',' | ')' | '(' | ':' | '.'))
                || matches!(prev, Some('(' | ':' | '.'));
            if drop {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// `#[serde(rename_all = "...")]` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        })
    }

    /// Apply to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
            RenameRule::Pascal | RenameRule::Camel => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == RenameRule::Pascal;
                for c in field.chars() {
                    if c == '_' {
                        upper = true;
                    } else if upper {
                        out.push(c.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(f: Field) -> FieldAttrs {
        parse_field(&f).unwrap()
    }

    #[test]
    fn location_name_wins_over_serde_rename() {
        let f = field(parse_quote! {
            #[serde(rename = "json_name")]
            #[api(query = "custom_name")]
            name: String
        });
        assert_eq!(f.location, Location::Query);
        assert_eq!(f.name(&ContainerAttrs::default()), "custom_name");
    }

    #[test]
    fn serde_rename_wins_over_ident() {
        let f = field(parse_quote! {
            #[serde(rename = "userName")]
            #[api(path)]
            user_name: String
        });
        assert_eq!(f.name(&ContainerAttrs::default()), "userName");
    }

    #[test]
    fn rename_all_applies_to_idents() {
        let f = field(parse_quote! { user_name: String });
        let container = ContainerAttrs {
            rename_all: Some(RenameRule::Camel),
            ..ContainerAttrs::default()
        };
        assert_eq!(f.name(&container), "userName");
    }

    #[test]
    fn metadata_is_collected() {
        let f = field(parse_quote! {
            #[api(desc = "class", enums = "1, 2,3", default = 2, example = "3", max_length = 1)]
            #[validate(length(min = 1))]
            #[validate(required)]
            class: Option<String>
        });
        assert_eq!(f.location, Location::Body);
        assert_eq!(f.enums, vec!["1", "2", "3"]);
        assert_eq!(f.default.as_deref(), Some("2"));
        assert_eq!(f.max_length, Some(1));
        assert_eq!(f.rules.as_deref(), Some("length(min = 1), required"));
    }

    #[test]
    fn serde_flatten_and_skip() {
        assert!(field(parse_quote! { #[serde(flatten)] base: Base }).inline);
        assert!(field(parse_quote! { #[serde(skip)] cache: u8 }).skip);
        assert!(field(parse_quote! { #[serde(default, skip_deserializing)] cache: u8 }).skip);
    }

    #[test]
    fn serde_default_is_tracked() {
        assert!(field(parse_quote! { #[serde(default)] id: u32 }).serde_default);
        assert!(field(parse_quote! { #[serde(default = "one")] id: u32 }).serde_default);
        assert!(!field(parse_quote! { id: u32 }).serde_default);

        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(default, rename_all = "camelCase")])];
        let container = parse_container(&attrs).unwrap();
        assert!(container.serde_default);
        assert_eq!(container.rename_all, Some(RenameRule::Camel));
    }

    #[test]
    fn raw_identifiers_are_unprefixed() {
        let f = field(parse_quote! { r#type: String });
        assert_eq!(f.field_name(), "type");
        assert_eq!(f.name(&ContainerAttrs::default()), "type");
    }

    #[test]
    fn rejects_two_locations() {
        let f: Field = parse_quote! { #[api(path, query)] id: u32 };
        assert!(parse_field(&f).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let f: Field = parse_quote! { #[api(loc = "path")] id: u32 };
        assert!(parse_field(&f).is_err());
    }

    #[test]
    fn normalizes_rule_tokens() {
        assert_eq!(
            normalize_tokens("length (min = 1 , max = 5)"),
            "length(min = 1, max = 5)"
        );
        assert_eq!(
            normalize_tokens("custom (function = \"bindoc :: rules :: required\")"),
            "custom(function = \"bindoc::rules::required\")"
        );
    }
}
