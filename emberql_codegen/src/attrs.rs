//! Parsing of the `#[emberql(...)]` helper attribute and doc-comment
//! descriptions, the way `juniper_codegen::common::parse::attr` parses
//! `#[graphql(...)]`. Kept deliberately smaller than the teacher's own
//! attribute parser (no `SpanContainer` merge-tracking) since emberql has a
//! single helper attribute rather than the teacher's many macro-specific
//! ones.

use proc_macro2::Ident;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, Meta, Token};

/// Container-level attributes: `#[emberql(name = "...", description = "...",
/// implements(A, B))]` (spec.md §4.3, §6).
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub implements: Vec<Ident>,
    /// Interface-side declaration of its own implementers (spec.md §4.4 step
    /// 3): `#[emberql(implementers(A, B))]`. Rust has no reflection over
    /// "every type implementing trait T", so an interface names its
    /// implementers itself rather than discovering them.
    pub implementers: Vec<Ident>,
    /// Marks that a companion `#[resolvers]` block exists for this type, the
    /// way the teacher's `ComplexObject` is a distinct opt-in from
    /// `SimpleObject` rather than something layered on after the fact. When
    /// set, the derive leaves `impl ResolverFields` to the `#[resolvers]`
    /// macro instead of supplying the empty default itself.
    pub complex: bool,
}

/// Field-level attributes: `#[emberql(name = "...", description = "...",
/// deprecated = "...", default = ..., skip)]` (spec.md §4.1 rules 1-2, §6;
/// `default` carries a query/mutation-root data field's literal default,
/// spec.md §4.4 step 1, and is not limited to `Option<T>` fields -- a
/// non-null field can declare one too, e.g. `greeting: String! = "Hello
/// world!"` in spec.md §8 scenario 1).
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<String>,
    pub default: Option<Expr>,
    pub skip: bool,
}

/// Method-level attributes for `#[resolvers]`-block methods: `#[emberql(name
/// = "...", description = "...", deprecated = "...")]` (spec.md §6 "field,
/// subscription (method form)").
#[derive(Debug, Default)]
pub struct MethodAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<String>,
}

struct RawArg {
    path: Ident,
    value: Option<Expr>,
    nested: Vec<Ident>,
}

impl Parse for RawArg {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let path: Ident = input.parse()?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value: Expr = input.parse()?;
            Ok(RawArg {
                path,
                value: Some(value),
                nested: Vec::new(),
            })
        } else if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            let idents: Punctuated<Ident, Token![,]> = content.parse_terminated(Ident::parse, Token![,])?;
            Ok(RawArg {
                path,
                value: None,
                nested: idents.into_iter().collect(),
            })
        } else {
            Ok(RawArg {
                path,
                value: None,
                nested: Vec::new(),
            })
        }
    }
}

fn expr_to_string(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_raw_args(attrs: &[Attribute]) -> syn::Result<Vec<RawArg>> {
    let mut out = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("emberql") {
            continue;
        }
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(attr, "expected `#[emberql(...)]`"));
        };
        let parsed: Punctuated<RawArg, Token![,]> =
            list.parse_args_with(Punctuated::parse_terminated)?;
        out.extend(parsed);
    }
    Ok(out)
}

/// Extracts the leading `///` doc comment block as a single description
/// string, the way the teacher falls back to doc comments when no explicit
/// `description` argument is supplied (spec.md §6: a description "may be
/// specified either with the attribute's argument, or with a regular Rust
/// doc comment", SPEC_FULL.md §3).
pub fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(lit) = &nv.value {
                if let Lit::Str(s) = &lit.lit {
                    lines.push(s.value().trim().to_string());
                }
            }
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

impl ContainerAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = ContainerAttrs::default();
        for arg in parse_raw_args(attrs)? {
            let key = arg.path.to_string();
            match key.as_str() {
                "name" => {
                    let value = arg
                        .value
                        .ok_or_else(|| syn::Error::new_spanned(&arg.path, "`name` expects a value"))?;
                    out.name = Some(expr_to_string(&value)?);
                }
                "description" => {
                    let value = arg.value.ok_or_else(|| {
                        syn::Error::new_spanned(&arg.path, "`description` expects a value")
                    })?;
                    out.description = Some(expr_to_string(&value)?);
                }
                "implements" => out.implements = arg.nested,
                "implementers" => out.implementers = arg.nested,
                "complex" => out.complex = true,
                other => {
                    return Err(syn::Error::new_spanned(
                        &arg.path,
                        format!("unknown `emberql` argument `{other}`"),
                    ));
                }
            }
        }
        out.description = out.description.or_else(|| doc_comment(attrs));
        Ok(out)
    }
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = FieldAttrs::default();
        for arg in parse_raw_args(attrs)? {
            let key = arg.path.to_string();
            match key.as_str() {
                "name" => {
                    let value = arg
                        .value
                        .ok_or_else(|| syn::Error::new_spanned(&arg.path, "`name` expects a value"))?;
                    out.name = Some(expr_to_string(&value)?);
                }
                "description" => {
                    let value = arg.value.ok_or_else(|| {
                        syn::Error::new_spanned(&arg.path, "`description` expects a value")
                    })?;
                    out.description = Some(expr_to_string(&value)?);
                }
                "deprecated" => {
                    out.deprecated = Some(match arg.value {
                        Some(value) => expr_to_string(&value)?,
                        None => String::new(),
                    });
                }
                "default" => {
                    out.default = Some(arg.value.ok_or_else(|| {
                        syn::Error::new_spanned(&arg.path, "`default` expects a value")
                    })?);
                }
                "skip" => out.skip = true,
                other => {
                    return Err(syn::Error::new_spanned(
                        &arg.path,
                        format!("unknown `emberql` argument `{other}`"),
                    ));
                }
            }
        }
        out.description = out.description.or_else(|| doc_comment(attrs));
        Ok(out)
    }
}

impl MethodAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let field = FieldAttrs::from_attrs(attrs)?;
        Ok(MethodAttrs {
            name: field.name,
            description: field.description,
            deprecated: field.deprecated,
        })
    }
}
