//! Proc-macro entry points for `emberql`: the annotation analyzer (§4.1),
//! resolver compiler (§4.2), and type compiler (§4.3) live in their own
//! modules; this crate root only parses the incoming `TokenStream` and
//! converts a `syn::Error` into a compile error the way
//! `juniper_codegen::lib`'s own `#[proc_macro_derive]` entry points do
//! (without the teacher's `proc_macro_error` diagnostics machinery -- a
//! single helper attribute doesn't need it).

mod analyze;
mod attrs;
mod rename;
mod resolver;
mod type_compile;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

/// `#[derive(Object)]` (spec.md §4.3 kind `object`): a GraphQL object type
/// backed by a plain Rust struct's data fields, optionally extended with
/// resolver methods via a companion `#[resolvers]` impl block.
#[proc_macro_derive(Object, attributes(emberql))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    type_compile::derive_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(InputObject)]` (spec.md §4.3 kind `input`): a GraphQL input
/// object, decoded from and re-encoded to the engine's argument value domain
/// via `InputCoerce`.
#[proc_macro_derive(InputObject, attributes(emberql))]
pub fn derive_input_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    type_compile::derive_input_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(Interface)]` (spec.md §4.3 kind `interface`).
#[proc_macro_derive(Interface, attributes(emberql))]
pub fn derive_interface(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    type_compile::derive_interface(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(Subscription)]` (spec.md §4.3 kind `subscription`).
#[proc_macro_derive(Subscription, attributes(emberql))]
pub fn derive_subscription(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    type_compile::derive_subscription(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(Union)]` (spec.md §4.1 rule 6): an enum of single-field tuple
/// variants, each wrapping a compiled object type.
#[proc_macro_derive(Union, attributes(emberql))]
pub fn derive_union(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    type_compile::derive_union(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[resolvers]` (spec.md §4.3 step 3): marks an `impl Type { .. }` block
/// whose methods become `@field`-kind resolvers, merged into `Type`'s
/// `CompiledType` by its `#[derive(Object)]`/`#[derive(Interface)]`
/// companion. Requires `#[emberql(complex)]` on the type's own derive so the
/// two macros agree on who supplies `impl ResolverFields`.
#[proc_macro_attribute]
pub fn resolvers(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item_impl = parse_macro_input!(input as ItemImpl);
    type_compile::resolvers_attr(&item_impl)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[subscription_resolvers]` (spec.md §4.3 step 3, subscription form):
/// marks an `impl Type { .. }` block whose methods become `@subscription`-
/// kind resolvers for a `#[derive(Subscription)]` type.
#[proc_macro_attribute]
pub fn subscription_resolvers(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item_impl = parse_macro_input!(input as ItemImpl);
    type_compile::subscription_resolvers_attr(&item_impl)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
