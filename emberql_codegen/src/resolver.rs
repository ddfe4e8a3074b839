//! The resolver compiler (spec.md §4.2): turns one `impl` method into a
//! `CompiledResolverField` literal, expressed as generated code rather than
//! a value built here, since the adapter closure has to capture the user's
//! own method at its call site. Grounded on
//! `juniper_codegen/src/graphql_object/derive.rs`'s per-method field
//! building and `juniper_codegen/src/graphql_subscription/mod.rs`'s
//! subscription-specific handling.
//!
//! Sync demotion (spec.md §4.2 step 6) is grounded on `syn::visit`, the same
//! crate feature `juniper_codegen` enables (`syn = { features = ["visit"]
//! }`) for its own AST walks.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::visit::Visit;
use syn::{FnArg, ImplItemFn, Pat, PatType, Type};

use crate::analyze::{self, referenced_type_name};
use crate::attrs::MethodAttrs;
use crate::rename::to_camel_case;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Field,
    Subscription,
}

struct ContextParam {
    call_index: usize,
    inner_ty: Type,
}

struct ArgParam {
    call_index: usize,
    gql_name: String,
    rust_ty: Type,
    optional: bool,
}

/// Detects whether an `async fn`'s body ever suspends (spec.md §4.2 step 6:
/// "await / async-for / async-with ... skipping nested function/class/
/// lambda bodies"). Rust has no `async for`/`async with`; the equivalent
/// suspension points are `.await` expressions and nested `async` blocks.
struct SuspensionVisitor {
    suspends: bool,
}

impl<'ast> Visit<'ast> for SuspensionVisitor {
    fn visit_expr_await(&mut self, _node: &'ast syn::ExprAwait) {
        self.suspends = true;
    }

    fn visit_expr_async(&mut self, _node: &'ast syn::ExprAsync) {
        self.suspends = true;
    }

    // A nested `fn`/`impl`/`struct`/closure defines its own scope; its body
    // is not part of this method's execution and must not be walked.
    fn visit_item(&mut self, _node: &'ast syn::Item) {}

    fn visit_expr_closure(&mut self, _node: &'ast syn::ExprClosure) {}
}

fn body_provably_never_suspends(method: &ImplItemFn) -> bool {
    let mut visitor = SuspensionVisitor { suspends: false };
    visitor.visit_block(&method.block);
    !visitor.suspends
}

fn single_generic_arg(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    })
}

fn pat_ident(pat: &Pat) -> syn::Result<syn::Ident> {
    match pat {
        Pat::Ident(ident) => Ok(ident.ident.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a simple parameter name")),
    }
}

/// Scalar leaf kinds the decoder knows how to pull directly out of a
/// `serde_json::Value` (spec.md §4.6). Anything else is assumed to be a
/// `#[derive(InputObject)]` type implementing `InputCoerce`.
fn scalar_decode_fn(ty: &Type) -> Option<TokenStream> {
    let Type::Path(path) = ty else { return None };
    let ident = &path.path.segments.last()?.ident;
    match ident.to_string().as_str() {
        "String" => Some(quote!(::emberql::value::string_from_value)),
        "i64" | "i32" => Some(quote!(::emberql::value::int_from_value)),
        "f64" | "f32" => Some(quote!(::emberql::value::float_from_value)),
        "bool" => Some(quote!(::emberql::value::bool_from_value)),
        "Id" => Some(quote!(::emberql::value::id_from_value)),
        _ => None,
    }
}

fn is_narrowing_int(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.path.is_ident("i32"))
}

fn is_narrowing_float(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.path.is_ident("f32"))
}

fn is_id_type(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.path.is_ident("Id"))
}

/// Builds an expression of type `Result<#ty, ::emberql::ResolverError>` that
/// decodes `#value` (a `&serde_json::Value`) into `ty` (spec.md §4.2 step 4,
/// §4.6).
fn decode_expr(ty: &Type, value: &TokenStream) -> TokenStream {
    if let Some(inner) = single_generic_arg(ty, "Option") {
        let inner_decode = decode_expr(&inner, value);
        return quote! {
            if #value.is_null() { Ok(None) } else { (#inner_decode).map(Some) }
        };
    }
    if let Some(inner) = single_generic_arg(ty, "Vec") {
        let inner_decode = decode_expr(&inner, &quote!(__item));
        return quote! {
            match #value.as_array() {
                Some(__arr) => __arr
                    .iter()
                    .map(|__item| -> Result<_, ::emberql::ResolverError> { #inner_decode })
                    .collect::<Result<Vec<_>, ::emberql::ResolverError>>(),
                None => Err(::emberql::ResolverError::TypeMismatch { expected: "a list".to_string() }),
            }
        };
    }
    if let Some(decode_fn) = scalar_decode_fn(ty) {
        let call = quote!(#decode_fn(#value));
        return if is_id_type(ty) {
            quote!(#call.map(::emberql::Id))
        } else if is_narrowing_int(ty) {
            quote! {
                (#call).and_then(|__v: i64| <i32 as ::std::convert::TryFrom<i64>>::try_from(__v).map_err(|_| {
                    ::emberql::ResolverError::TypeMismatch { expected: "Int in range for a 32-bit host value".to_string() }
                }))
            }
        } else if is_narrowing_float(ty) {
            quote!((#call).map(|__v: f64| __v as f32))
        } else {
            call
        };
    }
    quote!(<#ty as ::emberql::InputCoerce>::from_coerced(#value))
}

/// Builds the expression assigned to one field of a `#[derive(InputObject)]`
/// struct literal inside `InputCoerce::from_coerced` (spec.md §4.2 step 4,
/// §8 round-trip law): reads the named key off the decoded JSON object and
/// decodes it via [`decode_expr`], treating a missing key the same as an
/// explicit JSON null (caught by the `Option<T>` branch, or rejected by a
/// scalar decoder for a required field).
pub fn decode_input_field_expr(ty: &Type, gql_name: &str) -> TokenStream {
    let decode = decode_expr(ty, &quote!(&__raw));
    quote! {
        {
            let __raw = __obj.get(#gql_name).cloned().unwrap_or(serde_json::Value::Null);
            (#decode)?
        }
    }
}

/// The inverse of [`decode_input_field_expr`]: encodes one field's current
/// value back into `serde_json::Value` for `InputCoerce::to_coerced`.
pub fn encode_field_expr(ty: &Type, value: &TokenStream) -> TokenStream {
    if let Some(inner) = single_generic_arg(ty, "Option") {
        let inner_encode = encode_field_expr(&inner, &quote!(__v));
        return quote! {
            match #value {
                Some(__v) => #inner_encode,
                None => serde_json::Value::Null,
            }
        };
    }
    if let Some(inner) = single_generic_arg(ty, "Vec") {
        let inner_encode = encode_field_expr(&inner, &quote!(__item));
        return quote! {
            serde_json::Value::Array(#value.iter().map(|__item| #inner_encode).collect())
        };
    }
    if is_id_type(ty) {
        return quote!(serde_json::Value::String(#value.0.clone()));
    }
    if scalar_decode_fn(ty).is_some() {
        return quote!(serde_json::json!(#value));
    }
    quote!(::emberql::InputCoerce::to_coerced(#value))
}

/// Classifies and compiles one method into a `CompiledResolverField`
/// literal (spec.md §4.2).
pub fn compile_method(self_ty: &Type, method: &ImplItemFn, kind: MethodKind) -> syn::Result<TokenStream> {
    let attrs = MethodAttrs::from_attrs(&method.attrs)?;
    let method_ident = &method.sig.ident;
    let rust_name = method_ident.to_string();
    let gql_name = attrs.name.clone().unwrap_or_else(|| to_camel_case(&rust_name));

    let mut inputs = method.sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(_)) => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "a resolver method's first parameter must be `&self`",
            ))
        }
    }

    let mut context_params = Vec::new();
    let mut arg_params = Vec::new();
    let mut call_args: Vec<TokenStream> = Vec::new();

    for (index, input) in inputs.enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = input else {
            return Err(syn::Error::new_spanned(input, "unsupported parameter form"));
        };
        if let Some(inner_ty) = single_generic_arg(ty, "Context") {
            context_params.push(ContextParam {
                call_index: index,
                inner_ty,
            });
            let slot = format_ident!("__ctx_{index}");
            call_args.push(quote!(#slot));
        } else {
            let ident = pat_ident(pat)?;
            let gql_arg_name = to_camel_case(&ident.to_string());
            let optional = single_generic_arg(ty, "Option").is_some();
            arg_params.push(ArgParam {
                call_index: index,
                gql_name: gql_arg_name,
                rust_ty: (**ty).clone(),
                optional,
            });
            let slot = format_ident!("__arg_{index}");
            call_args.push(quote!(#slot));
        }
    }

    let needs_context = !context_params.is_empty();

    let arg_spec_tokens: Vec<TokenStream> = arg_params
        .iter()
        .map(|arg| {
            let name = &arg.gql_name;
            let type_spec = analyze::type_spec_tokens(&arg.rust_ty, arg.optional);
            if arg.optional {
                quote! {
                    ::emberql::ArgSpec::with_default(#name, #type_spec, serde_json::Value::Null)
                }
            } else {
                quote! {
                    ::emberql::ArgSpec::required(#name, #type_spec)
                }
            }
        })
        .collect();

    // `on_error` turns a `ResolverError` expression into the statement that
    // exits the enclosing adapter closure early with it -- the two adapter
    // kinds (`AdapterOutcome` vs. a boxed error stream) return differently
    // shaped early-exit expressions for the same decode failure.
    let build_decode_stmts = |on_error: &dyn Fn(TokenStream) -> TokenStream| -> Vec<TokenStream> {
        arg_params
            .iter()
            .map(|arg| {
                let slot = format_ident!("__arg_{}", arg.call_index);
                let name = &arg.gql_name;
                let decode = decode_expr(&arg.rust_ty, &quote!(__raw));
                let missing_err = on_error(quote! {
                    ::emberql::ResolverError::ArgumentCoercion {
                        name: #name.to_string(),
                        detail: "missing required argument".to_string(),
                    }
                });
                let decode_err = on_error(quote!(__e));
                quote! {
                    let #slot = match __kwargs.get(#name) {
                        Some(__raw) => match #decode {
                            Ok(__v) => __v,
                            Err(__e) => #decode_err,
                        },
                        None => #missing_err,
                    };
                }
            })
            .collect()
    };

    let build_context_stmts = |on_error: &dyn Fn(TokenStream) -> TokenStream| -> Vec<TokenStream> {
        context_params
            .iter()
            .map(|ctx| {
                let slot = format_ident!("__ctx_{}", ctx.call_index);
                let inner_ty = &ctx.inner_ty;
                let missing_err = on_error(quote! {
                    ::emberql::ResolverError::message(
                        "resolver requires per-request context that was not supplied"
                    )
                });
                quote! {
                    let #slot = match __ctx.and_then(|__c| ::emberql::context::extract::<#inner_ty>(__c)) {
                        Some(__v) => ::emberql::Context::new(__v.clone(), __selection.cloned().unwrap_or_default()),
                        None => #missing_err,
                    };
                }
            })
            .collect()
    };

    let ready_err = |e: TokenStream| -> TokenStream {
        quote!(return ::emberql::compiled::AdapterOutcome::Ready(Err(#e)))
    };
    let stream_err = |e: TokenStream| -> TokenStream {
        quote! {
            return ::std::boxed::Box::pin(::futures::stream::once(::futures::future::ready(Err(#e))))
        }
    };

    let referenced: Vec<String> = arg_params
        .iter()
        .filter_map(|a| referenced_type_name(&a.rust_ty))
        .collect();

    let description = attrs.description.clone();
    let description_tokens = match &description {
        Some(d) => quote!(Some(#d.to_string())),
        None => quote!(None),
    };
    let deprecated_tokens = match &attrs.deprecated {
        Some(d) => quote!(Some(#d.to_string())),
        None => quote!(None),
    };

    match kind {
        MethodKind::Field => {
            let output_ty = match &method.sig.output {
                syn::ReturnType::Type(_, ty) => (**ty).clone(),
                syn::ReturnType::Default => {
                    return Err(syn::Error::new_spanned(
                        &method.sig,
                        "a resolver method is missing a return type annotation",
                    ))
                }
            };
            let (value_ty, is_result) = unwrap_result(&output_ty);
            let return_type_tokens = analyze::type_spec_tokens(&value_ty, false);
            let referenced_return = referenced_type_name(&value_ty);
            let mut all_refs = referenced.clone();
            all_refs.extend(referenced_return);

            let is_async = method.sig.asyncness.is_some();
            let demoted = is_async && body_provably_never_suspends(method);

            let decode_stmts = build_decode_stmts(&ready_err);
            let context_stmts = build_context_stmts(&ready_err);

            let invoke = quote!(__instance.#method_ident(#(#call_args),*));
            let convert = if is_result {
                quote!(__result.map(::emberql::IntoResolvedValue::into_resolved_value).map_err(::std::convert::Into::into))
            } else {
                quote!(Ok(::emberql::IntoResolvedValue::into_resolved_value(__result)))
            };

            let body = if is_async && !demoted {
                quote! {
                    #(#decode_stmts)*
                    #(#context_stmts)*
                    let __parent = __parent.clone();
                    ::emberql::compiled::AdapterOutcome::Pending(::std::boxed::Box::pin(async move {
                        let __instance = __parent
                            .downcast_ref::<#self_ty>()
                            .ok_or_else(|| ::emberql::ResolverError::message("parent type mismatch"))?;
                        let __result = #invoke.await;
                        #convert
                    }))
                }
            } else if demoted {
                quote! {
                    #(#decode_stmts)*
                    #(#context_stmts)*
                    let __outcome = (|| {
                        let __instance = __parent
                            .downcast_ref::<#self_ty>()
                            .ok_or_else(|| ::emberql::ResolverError::message("parent type mismatch"))?;
                        let __result = ::futures::executor::block_on(#invoke);
                        #convert
                    })();
                    ::emberql::compiled::AdapterOutcome::Ready(__outcome)
                }
            } else {
                quote! {
                    #(#decode_stmts)*
                    #(#context_stmts)*
                    let __outcome = (|| {
                        let __instance = __parent
                            .downcast_ref::<#self_ty>()
                            .ok_or_else(|| ::emberql::ResolverError::message("parent type mismatch"))?;
                        let __result = #invoke;
                        #convert
                    })();
                    ::emberql::compiled::AdapterOutcome::Ready(__outcome)
                }
            };

            let final_is_async = is_async && !demoted;

            Ok(quote! {
                ::emberql::CompiledResolverField {
                    kind: ::emberql::compiled::ResolverKind::Field,
                    name: #gql_name.to_string(),
                    description: #description_tokens,
                    deprecation_reason: #deprecated_tokens,
                    needs_context: #needs_context,
                    is_async: #final_is_async,
                    is_async_gen: false,
                    return_type_spec: #return_type_tokens,
                    args: vec![#(#arg_spec_tokens),*],
                    referenced_types: vec![#(#all_refs.to_string()),*],
                    adapter: ::emberql::compiled::ResolverAdapter::Field(::std::sync::Arc::new(
                        move |__parent: &::emberql::compiled::Parent,
                              __ctx: Option<&::emberql::compiled::RequestContext>,
                              __selection: Option<&::emberql::Graph>,
                              __kwargs: &::emberql::compiled::KwArgs| {
                            #body
                        }
                    )),
                }
            })
        }
        MethodKind::Subscription => {
            if method.sig.asyncness.is_some() {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "a subscription resolver must return `impl Stream<Item = T>` directly rather than being an `async fn`",
                ));
            }
            let output_ty = match &method.sig.output {
                syn::ReturnType::Type(_, ty) => (**ty).clone(),
                syn::ReturnType::Default => {
                    return Err(syn::Error::new_spanned(
                        &method.sig,
                        "a subscription resolver is missing a return type annotation",
                    ))
                }
            };
            let item_ty = analyze::peel_stream_item(&output_ty).ok_or_else(|| {
                syn::Error::new_spanned(
                    &method.sig,
                    "a subscription resolver must return `impl Stream<Item = T>`",
                )
            })?;
            let (value_ty, is_result) = unwrap_result(&item_ty);
            let return_type_tokens = analyze::type_spec_tokens(&value_ty, false);
            let referenced_return = referenced_type_name(&value_ty);
            let mut all_refs = referenced.clone();
            all_refs.extend(referenced_return);

            let invoke = quote!(__instance.#method_ident(#(#call_args),*));
            let map_item = if is_result {
                quote!(|__item| __item.map(::emberql::IntoResolvedValue::into_resolved_value).map_err(::std::convert::Into::into))
            } else {
                quote!(|__item| Ok(::emberql::IntoResolvedValue::into_resolved_value(__item)))
            };

            let decode_stmts = build_decode_stmts(&stream_err);
            let context_stmts = build_context_stmts(&stream_err);

            let body = quote! {
                #(#decode_stmts)*
                #(#context_stmts)*
                let __instance = match __parent.downcast_ref::<#self_ty>() {
                    Some(v) => v,
                    None => {
                        return ::std::boxed::Box::pin(::futures::stream::once(::futures::future::ready(
                            Err(::emberql::ResolverError::message("parent type mismatch"))
                        )));
                    }
                };
                let __stream = #invoke;
                ::std::boxed::Box::pin(::futures::StreamExt::map(__stream, #map_item))
            };

            Ok(quote! {
                ::emberql::CompiledResolverField {
                    kind: ::emberql::compiled::ResolverKind::Subscription,
                    name: #gql_name.to_string(),
                    description: #description_tokens,
                    deprecation_reason: #deprecated_tokens,
                    needs_context: #needs_context,
                    is_async: false,
                    is_async_gen: true,
                    return_type_spec: #return_type_tokens,
                    args: vec![#(#arg_spec_tokens),*],
                    referenced_types: vec![#(#all_refs.to_string()),*],
                    adapter: ::emberql::compiled::ResolverAdapter::Subscription(::std::sync::Arc::new(
                        move |__parent: &::emberql::compiled::Parent,
                              __ctx: Option<&::emberql::compiled::RequestContext>,
                              __selection: Option<&::emberql::Graph>,
                              __kwargs: &::emberql::compiled::KwArgs| {
                            #body
                        }
                    )),
                }
            })
        }
    }
}

/// Unwraps a `Result<T, E>` return type down to `T`, reporting whether the
/// unwrap happened (spec.md §7 tier 3: "any error raised from a resolver...
/// is caught at the field boundary").
fn unwrap_result(ty: &Type) -> (Type, bool) {
    let Type::Path(path) = ty else { return (ty.clone(), false) };
    let Some(segment) = path.path.segments.last() else {
        return (ty.clone(), false);
    };
    if segment.ident != "Result" {
        return (ty.clone(), false);
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return (ty.clone(), false);
    };
    let ok_ty = args.args.iter().find_map(|a| match a {
        syn::GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    });
    match ok_ty {
        Some(t) => (t, true),
        None => (ty.clone(), false),
    }
}
