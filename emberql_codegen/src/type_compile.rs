//! The type compiler (spec.md §4.3): walks a decorated struct/enum and its
//! companion `impl` block into the `Compiled`/`ObjectAttributes`/
//! `GqlTypeSpec`/`IntoResolvedValue` impls described in
//! `emberql::traits`/`emberql::compiled`. Grounded on
//! `juniper_codegen/src/derive_object.rs`'s struct-field walk and
//! `juniper_codegen/src/graphql_interface/mod.rs`'s implementer-registration
//! approach, adapted to runtime `OnceLock`s instead of the teacher's
//! const-generic trait objects, since spec.md's interface default-resolver
//! inheritance (§8) has to run after every implementer in the binary has had
//! a chance to register, which only a runtime step can guarantee.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, Ident, ItemImpl, Type};

use crate::analyze;
use crate::attrs::{ContainerAttrs, FieldAttrs};
use crate::rename::to_camel_case;
use crate::resolver::{compile_method, MethodKind};

struct CompiledField {
    gql_name: String,
    rust_ident: Ident,
    ty: Type,
    description: Option<String>,
    deprecated: Option<String>,
    default: Option<Expr>,
}

fn named_fields(input: &DeriveInput, derive_name: &str) -> syn::Result<Vec<CompiledField>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            format!("`#[derive({derive_name})]` only applies to structs"),
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            format!("`#[derive({derive_name})]` requires named fields"),
        ));
    };
    let mut out = Vec::new();
    for field in &fields.named {
        let attrs = FieldAttrs::from_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let rust_ident = field.ident.clone().expect("named field has an identifier");
        let gql_name = attrs
            .name
            .clone()
            .unwrap_or_else(|| to_camel_case(&rust_ident.to_string()));
        out.push(CompiledField {
            gql_name,
            rust_ident,
            ty: field.ty.clone(),
            description: attrs.description,
            deprecated: attrs.deprecated,
            default: attrs.default,
        });
    }
    Ok(out)
}

fn description_tokens(description: &Option<String>) -> TokenStream {
    match description {
        Some(d) => quote!(Some(#d.to_string())),
        None => quote!(None),
    }
}

fn attribute_match_arms(fields: &[CompiledField]) -> TokenStream {
    let arms = fields.iter().map(|f| {
        let gql_name = &f.gql_name;
        let ident = &f.rust_ident;
        quote! {
            #gql_name => Some(::emberql::IntoResolvedValue::into_resolved_value(self.#ident.clone())),
        }
    });
    quote! {
        match name {
            #(#arms)*
            _ => None,
        }
    }
}

/// Builds the `(has_default, default_value)` token pair shared by data and
/// input fields (spec.md §3 `ArgSpec`/`CompiledDataField`/`CompiledInputField`
/// all carry this pair the same way). An explicit `#[emberql(default = ...)]`
/// takes priority over the `Option<T>`-implies-null-default rule, since a
/// non-null field can still declare a literal default (spec.md §8 scenario 1:
/// `greeting: String! = "Hello world!"`).
fn default_tokens(default: &Option<Expr>, is_option: bool) -> (TokenStream, TokenStream) {
    match default {
        Some(expr) => (
            quote!(true),
            quote!(Some(serde_json::to_value(#expr).unwrap_or(serde_json::Value::Null))),
        ),
        None if is_option => (quote!(true), quote!(Some(serde_json::Value::Null))),
        None => (quote!(false), quote!(None)),
    }
}

fn data_field_tokens(fields: &[CompiledField]) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|f| {
            let gql_name = &f.gql_name;
            let is_option = analyze::peel_option(&f.ty).is_some();
            let type_spec = analyze::type_spec_tokens(&f.ty, is_option);
            let description = description_tokens(&f.description);
            let deprecated = match &f.deprecated {
                Some(d) => quote!(Some(#d.to_string())),
                None => quote!(None),
            };
            let referenced = analyze::referenced_type_name(&f.ty);
            let (has_default, default_value) = default_tokens(&f.default, is_option);
            quote! {
                ::emberql::compiled::ObjectFieldSpec::Data(::emberql::CompiledDataField {
                    name: #gql_name.to_string(),
                    type_spec: #type_spec,
                    has_default: #has_default,
                    default_value: #default_value,
                    description: #description,
                    deprecation_reason: #deprecated,
                    referenced_types: vec![#(#referenced.to_string()),*],
                })
            }
        })
        .collect()
}

fn input_field_tokens(fields: &[CompiledField]) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|f| {
            let gql_name = &f.gql_name;
            let is_option = analyze::peel_option(&f.ty).is_some();
            let type_spec = analyze::type_spec_tokens(&f.ty, is_option);
            let description = description_tokens(&f.description);
            let referenced = analyze::referenced_type_name(&f.ty);
            let (has_default, default_value) = default_tokens(&f.default, is_option);
            quote! {
                ::emberql::CompiledInputField {
                    name: #gql_name.to_string(),
                    type_spec: #type_spec,
                    has_default: #has_default,
                    default_value: #default_value,
                    description: #description,
                    referenced_types: vec![#(#referenced.to_string()),*],
                }
            }
        })
        .collect()
}

fn own_refs(fields: &[CompiledField]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|f| analyze::referenced_type_name(&f.ty))
        .collect()
}

/// `#[derive(Object)]` (spec.md §4.3 kind `object`).
pub fn derive_object(input: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());
    let fields = named_fields(input, "Object")?;

    let attribute_arms = attribute_match_arms(&fields);
    let data_fields = data_field_tokens(&fields);
    let refs = own_refs(&fields);
    let implements: Vec<&Ident> = attrs.implements.iter().collect();
    let implements_names: Vec<String> = implements.iter().map(|i| i.to_string()).collect();
    let description = description_tokens(&attrs.description);

    let resolver_fields_impl = if attrs.complex {
        quote!()
    } else {
        quote! {
            impl ::emberql::ResolverFields for #ident {}
        }
    };

    let merge_blocks = implements.iter().map(|iface| {
        quote! {
            {
                let __iface = <#iface as ::emberql::Compiled>::compiled();
                for __f in &__iface.object_fields {
                    if !object_fields.iter().any(|__existing| {
                        ::emberql::compiled::ObjectFieldSpec::name(__existing) == ::emberql::compiled::ObjectFieldSpec::name(__f)
                    }) {
                        object_fields.push(__f.clone());
                    }
                }
            }
        }
    });

    Ok(quote! {
        impl ::emberql::ObjectAttributes for #ident {
            fn attribute(&self, name: &str) -> Option<::emberql::ResolvedValue> {
                #attribute_arms
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl ::emberql::traits::GqlTypeSpec for #ident {
            fn gql_type_spec(nullable: bool) -> ::emberql::TypeSpec {
                ::emberql::TypeSpec::Named {
                    name: #type_name.to_string(),
                    nullable,
                }
            }
        }

        impl ::emberql::IntoResolvedValue for #ident {
            fn into_resolved_value(self) -> ::emberql::ResolvedValue {
                ::emberql::ResolvedValue::object(#type_name, ::std::sync::Arc::new(self))
            }
        }

        impl ::emberql::ObjectType for #ident {}

        #resolver_fields_impl

        impl ::emberql::Compiled for #ident {
            fn compiled() -> &'static ::emberql::CompiledType {
                static __CELL: ::std::sync::OnceLock<::emberql::CompiledType> = ::std::sync::OnceLock::new();
                __CELL.get_or_init(|| {
                    let mut object_fields: Vec<::emberql::compiled::ObjectFieldSpec> = vec![#(#data_fields),*];
                    object_fields.extend(
                        <#ident as ::emberql::ResolverFields>::resolver_fields()
                            .into_iter()
                            .map(::emberql::compiled::ObjectFieldSpec::Resolver),
                    );
                    #(#merge_blocks)*

                    let mut refs: Vec<String> = vec![#(#refs.to_string()),*];
                    refs.extend(vec![#(#implements_names.to_string()),*]);
                    for __f in &object_fields {
                        refs.extend(::emberql::compiled::ObjectFieldSpec::referenced_types(__f).iter().cloned());
                    }

                    ::emberql::CompiledType {
                        kind: ::emberql::compiled::TypeKind::Object,
                        name: #type_name.to_string(),
                        description: #description,
                        object_fields,
                        input_fields: Vec::new(),
                        subscription_fields: Vec::new(),
                        implements: vec![#(#implements_names.to_string()),*],
                        refs,
                        possible_members: Vec::new(),
                    }
                })
            }
        }
    })
}

/// `#[derive(InputObject)]` (spec.md §4.3 kind `input`).
pub fn derive_input_object(input: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());
    let fields = named_fields(input, "InputObject")?;
    let description = description_tokens(&attrs.description);
    let input_fields = input_field_tokens(&fields);
    let refs = own_refs(&fields);

    let from_coerced_fields = fields.iter().map(|f| {
        let ident = &f.rust_ident;
        let decode = crate::resolver::decode_input_field_expr(&f.ty, &f.gql_name);
        quote! {
            #ident: #decode,
        }
    });

    let to_coerced_fields = fields.iter().map(|f| {
        let ident = &f.rust_ident;
        let gql_name = &f.gql_name;
        let encode = crate::resolver::encode_field_expr(&f.ty, &quote!(&self.#ident));
        quote! {
            #gql_name: #encode,
        }
    });

    Ok(quote! {
        impl ::emberql::traits::GqlTypeSpec for #ident {
            fn gql_type_spec(nullable: bool) -> ::emberql::TypeSpec {
                ::emberql::TypeSpec::Named {
                    name: #type_name.to_string(),
                    nullable,
                }
            }
        }

        impl ::emberql::InputCoerce for #ident {
            fn from_coerced(value: &serde_json::Value) -> Result<Self, ::emberql::ResolverError> {
                let __obj = value.as_object().ok_or_else(|| ::emberql::ResolverError::TypeMismatch {
                    expected: "an input object".to_string(),
                })?;
                Ok(#ident {
                    #(#from_coerced_fields)*
                })
            }

            fn to_coerced(&self) -> serde_json::Value {
                serde_json::json!({ #(#to_coerced_fields),* })
            }
        }

        impl ::emberql::InputType for #ident {}

        impl ::emberql::Compiled for #ident {
            fn compiled() -> &'static ::emberql::CompiledType {
                static __CELL: ::std::sync::OnceLock<::emberql::CompiledType> = ::std::sync::OnceLock::new();
                __CELL.get_or_init(|| ::emberql::CompiledType {
                    kind: ::emberql::compiled::TypeKind::Input,
                    name: #type_name.to_string(),
                    description: #description,
                    object_fields: Vec::new(),
                    input_fields: vec![#(#input_fields),*],
                    subscription_fields: Vec::new(),
                    implements: Vec::new(),
                    refs: vec![#(#refs.to_string()),*],
                    possible_members: Vec::new(),
                })
            }
        }
    })
}

/// `#[derive(Interface)]` (spec.md §4.3 kind `interface`). Interfaces carry
/// the same data-field shape as objects; `implementers()` is populated by a
/// process-lifetime registry each implementing object's `#[emberql(implements(..))]`
/// feeds on first access, rather than enumerated up front, since Rust has no
/// reflection over "every type implementing trait T" (spec.md §4.4 step 3
/// note).
pub fn derive_interface(input: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::from_attrs(&input.attrs)?;
    if attrs.complex {
        return Err(syn::Error::new_spanned(
            input,
            "interface types may not declare resolver methods -- a method-resolver field \
             inherited by an implementer would dispatch against the interface's own struct \
             rather than the concrete implementer, which always fails at runtime; declare the \
             field as plain interface data instead, or have every implementer override it with \
             its own `#[resolvers]` method",
        ));
    }
    let ident = &input.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());
    let fields = named_fields(input, "Interface")?;

    let attribute_arms = attribute_match_arms(&fields);
    let data_fields = data_field_tokens(&fields);
    let refs = own_refs(&fields);
    let description = description_tokens(&attrs.description);
    let implementer_idents: Vec<&Ident> = attrs.implementers.iter().collect();

    let resolver_fields_impl = quote! {
        impl ::emberql::ResolverFields for #ident {}
    };

    Ok(quote! {
        impl ::emberql::ObjectAttributes for #ident {
            fn attribute(&self, name: &str) -> Option<::emberql::ResolvedValue> {
                #attribute_arms
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl ::emberql::traits::GqlTypeSpec for #ident {
            fn gql_type_spec(nullable: bool) -> ::emberql::TypeSpec {
                ::emberql::TypeSpec::Named {
                    name: #type_name.to_string(),
                    nullable,
                }
            }
        }

        impl ::emberql::IntoResolvedValue for #ident {
            fn into_resolved_value(self) -> ::emberql::ResolvedValue {
                ::emberql::ResolvedValue::object(#type_name, ::std::sync::Arc::new(self))
            }
        }

        #resolver_fields_impl

        impl ::emberql::InterfaceType for #ident {
            fn implementers() -> Vec<&'static ::emberql::CompiledType> {
                vec![#(<#implementer_idents as ::emberql::Compiled>::compiled()),*]
            }
        }

        impl ::emberql::Compiled for #ident {
            fn compiled() -> &'static ::emberql::CompiledType {
                static __CELL: ::std::sync::OnceLock<::emberql::CompiledType> = ::std::sync::OnceLock::new();
                __CELL.get_or_init(|| {
                    let mut object_fields: Vec<::emberql::compiled::ObjectFieldSpec> = vec![#(#data_fields),*];
                    object_fields.extend(
                        <#ident as ::emberql::ResolverFields>::resolver_fields()
                            .into_iter()
                            .map(::emberql::compiled::ObjectFieldSpec::Resolver),
                    );
                    let mut refs: Vec<String> = vec![#(#refs.to_string()),*];
                    for __f in &object_fields {
                        refs.extend(::emberql::compiled::ObjectFieldSpec::referenced_types(__f).iter().cloned());
                    }
                    ::emberql::CompiledType {
                        kind: ::emberql::compiled::TypeKind::Interface,
                        name: #type_name.to_string(),
                        description: #description,
                        object_fields,
                        input_fields: Vec::new(),
                        subscription_fields: Vec::new(),
                        implements: Vec::new(),
                        refs,
                        possible_members: Vec::new(),
                    }
                })
            }
        }
    })
}

/// `#[derive(Subscription)]` (spec.md §4.3 kind `subscription`). A
/// subscription-kind struct carries no data fields of its own (spec.md §4.3
/// step "subscription: declares only `@subscription` methods") -- enforced
/// here syntactically rather than deferred to a runtime
/// `SchemaBuildError::SubscriptionKindMismatch`, since the struct's shape is
/// fully known at macro-expansion time. It still implements
/// `ObjectAttributes` (with an always-`None` attribute read) despite having
/// no data fields: `schema::Schema::new`'s root-instance parameter needs an
/// `Arc<dyn ObjectAttributes>` for every supplied root, subscription
/// included, so a `#[subscription_resolvers]` method's `self` downcast has
/// something to resolve against at the subscription root (spec.md §4.4 step
/// 1 applies to every root kind, not only queries).
pub fn derive_subscription(input: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "`#[derive(Subscription)]` only applies to structs",
        ));
    };
    let has_fields = match &data.fields {
        Fields::Named(f) => !f.named.is_empty(),
        Fields::Unnamed(f) => !f.unnamed.is_empty(),
        Fields::Unit => false,
    };
    if has_fields {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "subscription types may not declare data fields, only `#[subscription_resolvers]` methods",
        ));
    }

    let description = description_tokens(&attrs.description);

    Ok(quote! {
        impl ::emberql::ObjectAttributes for #ident {
            fn attribute(&self, _name: &str) -> Option<::emberql::ResolvedValue> {
                None
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl ::emberql::SubscriptionType for #ident {}

        impl ::emberql::Compiled for #ident {
            fn compiled() -> &'static ::emberql::CompiledType {
                static __CELL: ::std::sync::OnceLock<::emberql::CompiledType> = ::std::sync::OnceLock::new();
                __CELL.get_or_init(|| {
                    let subscription_fields = <#ident as ::emberql::traits::SubscriptionFields>::subscription_fields();
                    let mut refs: Vec<String> = Vec::new();
                    for __f in &subscription_fields {
                        refs.extend(__f.referenced_types.iter().cloned());
                    }
                    ::emberql::CompiledType {
                        kind: ::emberql::compiled::TypeKind::Subscription,
                        name: #type_name.to_string(),
                        description: #description,
                        object_fields: Vec::new(),
                        input_fields: Vec::new(),
                        subscription_fields,
                        implements: Vec::new(),
                        refs,
                        possible_members: Vec::new(),
                    }
                })
            }
        }
    })
}

/// `#[derive(Union)]` (spec.md §4.1 rule 6): applies to an enum whose every
/// variant wraps exactly one compiled object type, e.g. `enum SearchResult {
/// User(User), Post(Post) }`.
pub fn derive_union(input: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());
    let description = description_tokens(&attrs.description);

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "`#[derive(Union)]` only applies to enums",
        ));
    };

    let mut member_names = Vec::new();
    let mut into_arms = Vec::new();
    for variant in &data.variants {
        let Fields::Unnamed(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "a union variant must wrap exactly one member type, e.g. `User(User)`",
            ));
        };
        if fields.unnamed.len() != 1 {
            return Err(syn::Error::new_spanned(
                variant,
                "a union variant must wrap exactly one member type",
            ));
        }
        let member_ty = &fields.unnamed.first().expect("checked len == 1").ty;
        let variant_ident = &variant.ident;
        member_names.push(quote!(<#member_ty as ::emberql::traits::GqlTypeSpec>::gql_type_spec(false).inner_name().to_string()));
        into_arms.push(quote! {
            #ident::#variant_ident(__inner) => ::emberql::IntoResolvedValue::into_resolved_value(__inner),
        });
    }

    Ok(quote! {
        impl ::emberql::traits::GqlTypeSpec for #ident {
            fn gql_type_spec(nullable: bool) -> ::emberql::TypeSpec {
                ::emberql::TypeSpec::Union {
                    name: #type_name.to_string(),
                    members: ::emberql::spec::union_members(vec![#(#member_names),*]),
                    description: #description,
                    nullable,
                }
            }
        }

        impl ::emberql::IntoResolvedValue for #ident {
            fn into_resolved_value(self) -> ::emberql::ResolvedValue {
                match self {
                    #(#into_arms)*
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_with_resolvers_attribute_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            #[emberql(complex, implementers(A, B))]
            struct Letter {
                letter: String,
            }
        };
        let err = derive_interface(&input).expect_err("complex interfaces must be rejected");
        assert!(err.to_string().contains("may not declare resolver methods"));
    }

    #[test]
    fn plain_interface_compiles() {
        let input: DeriveInput = syn::parse_quote! {
            #[emberql(implementers(A, B))]
            struct Letter {
                letter: String,
            }
        };
        assert!(derive_interface(&input).is_ok());
    }
}

/// `#[resolvers]` (spec.md §4.3 step 3): the companion attribute macro over
/// an `impl Type { .. }` block, generating `impl ResolverFields for Type`.
pub fn resolvers_attr(item_impl: &ItemImpl) -> syn::Result<TokenStream> {
    let self_ty = &*item_impl.self_ty;
    let mut field_tokens = Vec::new();
    for item in &item_impl.items {
        if let syn::ImplItem::Fn(method) = item {
            field_tokens.push(compile_method(self_ty, method, MethodKind::Field)?);
        }
    }
    Ok(quote! {
        #item_impl

        impl ::emberql::ResolverFields for #self_ty {
            fn resolver_fields() -> Vec<::emberql::CompiledResolverField> {
                vec![#(#field_tokens),*]
            }
        }
    })
}

/// `#[subscription_resolvers]` (spec.md §4.3 step 3, subscription form):
/// generates `impl SubscriptionFields for Type`, the subscription analogue
/// of `ResolverFields`.
pub fn subscription_resolvers_attr(item_impl: &ItemImpl) -> syn::Result<TokenStream> {
    let self_ty = &*item_impl.self_ty;
    let mut field_tokens = Vec::new();
    for item in &item_impl.items {
        if let syn::ImplItem::Fn(method) = item {
            field_tokens.push(compile_method(self_ty, method, MethodKind::Subscription)?);
        }
    }
    Ok(quote! {
        #item_impl

        impl ::emberql::traits::SubscriptionFields for #self_ty {
            fn subscription_fields() -> Vec<::emberql::CompiledResolverField> {
                vec![#(#field_tokens),*]
            }
        }
    })
}
