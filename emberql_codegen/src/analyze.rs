//! The annotation analyzer (spec.md §4.1): turns a `syn::Type` into tokens
//! that build a `emberql::TypeSpec` at runtime. Grounded on
//! `juniper_codegen/src/common/field/mod.rs`'s type-position handling, but
//! emits code rather than a value directly, since macro expansion only sees
//! syntax — the actual `TypeSpec` (and whether a referenced type compiled as
//! an object, input, interface, or union) is only known once the other
//! type's generated `GqlTypeSpec` impl runs, at binary-runtime.
//!
//! Recognized shapes, in the order spec.md §4.1 lists them, minus the two
//! framework-marker rules (`Hidden`, a description wrapper) which are
//! handled earlier, by [`crate::attrs::FieldAttrs`] rather than here:
//! `Option<T>` (nullable wrapper), `Vec<T>` (list), a built-in scalar or
//! `emberql`-decorated type (leaf, via `GqlTypeSpec`). Type aliases (spec.md
//! §4.1 rule 9) are not dereferenced: a proc macro only sees the alias's
//! path, not its target, without a second pass over the crate's items, so
//! this analyzer requires field/argument/return positions to name the
//! concrete type directly.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

// NOTE: duplicated from the `emberql` crate's `spec::BUILTIN_SCALARS` --
// `emberql_codegen` cannot depend on `emberql` (the dependency runs the
// other way), so the fixed scalar-name list is kept in sync by hand.
const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

fn single_generic_arg(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    })
}

/// Peels one `Option<T>` layer, if present.
pub fn peel_option(ty: &Type) -> Option<Type> {
    single_generic_arg(ty, "Option")
}

/// Peels one `Vec<T>` layer, if present.
pub fn peel_vec(ty: &Type) -> Option<Type> {
    single_generic_arg(ty, "Vec")
}

/// Peels an `impl Stream<Item = T>` subscription return position down to
/// `T` (spec.md §4.1 rule 5). Returns `None` for any other shape, including
/// a plain field/resolver return type.
pub fn peel_stream_item(ty: &Type) -> Option<Type> {
    let Type::ImplTrait(impl_trait) = ty else {
        return None;
    };
    for bound in &impl_trait.bounds {
        let syn::TypeParamBound::Trait(trait_bound) = bound else {
            continue;
        };
        let Some(segment) = trait_bound.path.segments.last() else {
            continue;
        };
        if segment.ident != "Stream" {
            continue;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            continue;
        };
        for arg in &args.args {
            if let GenericArgument::AssocType(binding) = arg {
                if binding.ident == "Item" {
                    return Some(binding.ty.clone());
                }
            }
        }
    }
    None
}

/// Builds the tokens for `emberql::TypeSpec::gql_type_spec` over `ty`,
/// threading nullability outward through `Option`/`Vec` wrappers exactly as
/// spec.md §4.1 rules 3-4 describe. `outer_nullable` is the nullability
/// applied at the leaf once no further `Option` wrapper is found; an
/// encountered `Option<T>` always forces nullable regardless of it.
pub fn type_spec_tokens(ty: &Type, outer_nullable: bool) -> TokenStream {
    if let Some(inner) = peel_option(ty) {
        return type_spec_tokens(&inner, true);
    }
    if let Some(inner) = peel_vec(ty) {
        let element = type_spec_tokens(&inner, false);
        return quote! {
            ::emberql::TypeSpec::List {
                element: ::std::boxed::Box::new(#element),
                nullable: #outer_nullable,
            }
        };
    }
    quote! {
        <#ty as ::emberql::GqlTypeSpec>::gql_type_spec(#outer_nullable)
    }
}

/// The referenced user-class type name, if `ty` (after peeling `Option`/
/// `Vec`) is anything other than a built-in scalar — used to populate
/// `CompiledType::refs`/`CompiledResolverField::referenced_types` (spec.md
/// §4.4). Best-effort: it is the bare last path segment's identifier,
/// filtered against the five scalar names textually, since the analyzer
/// cannot yet know (at macro-expansion time) whether that identifier will
/// turn out to be a registered class.
pub fn referenced_type_name(ty: &Type) -> Option<String> {
    if let Some(inner) = peel_option(ty) {
        return referenced_type_name(&inner);
    }
    if let Some(inner) = peel_vec(ty) {
        return referenced_type_name(&inner);
    }
    let Type::Path(path) = ty else { return None };
    let ident = &path.path.segments.last()?.ident;
    let name = ident.to_string();
    if BUILTIN_SCALARS.contains(&name.as_str()) {
        None
    } else {
        Some(name)
    }
}
