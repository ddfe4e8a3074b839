//! Engine registration (spec.md §4.5): decodes a [`SchemaBundle`] into
//! `async_graphql::dynamic` builder calls. This is the only module that
//! constructs the external engine's own schema objects; everything upstream
//! of it (analyzer, resolver compiler, type compiler, schema-graph builder)
//! is engine-agnostic.

use async_graphql::dynamic::{
    Field, InputObject, InputValue, Interface, InterfaceField, Object, Schema as DynSchema,
    SchemaBuilder, Subscription, SubscriptionField, TypeRef, Union,
};
use async_graphql::Value;

use crate::bundle::SchemaBundle;
use crate::compiled::{CompiledResolverField, CompiledType, ObjectFieldSpec, Parent, TypeKind};
use crate::dispatch::{
    async_field_resolver, data_field_resolver, root_data_field_resolver,
    subscription_field_resolver, sync_field_resolver, FieldAdapterHandle,
};
use crate::error::SchemaBuildError;
use crate::spec::TypeSpec;

/// Translates a [`TypeSpec`] into the engine's own `TypeRef` (spec.md §4.5,
/// §4.6). List/non-null wrapping mirrors [`TypeSpec`]'s own nesting exactly.
pub fn type_ref(spec: &TypeSpec) -> TypeRef {
    let base = match spec {
        TypeSpec::Named { name, .. } => TypeRef::named(name.clone()),
        TypeSpec::Union { name, .. } => TypeRef::named(name.clone()),
        TypeSpec::List { element, .. } => TypeRef::List(Box::new(type_ref(element))),
    };
    if spec.nullable() {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn default_as_value(raw: &serde_json::Value) -> Value {
    Value::from_json(raw.clone()).unwrap_or(Value::Null)
}

/// Registers one `object`/`interface`-kind type's field list onto an engine
/// `Object` or `Interface` builder. Shared because spec.md §4.5 registers
/// object and interface fields "exactly as in the object case". `root_parent`
/// is `Some` only when `ty` is the query/mutation/subscription root: the
/// engine leaves `ctx.parent_value` null for root-level fields (spec.md §4.4
/// step 1, "queries have no parent to read from"), so the root class's own
/// compiled instance is supplied directly instead, for both data-field reads
/// and resolver-method `self` dispatch (see `crate::dispatch::resolve_parent`).
fn register_object_field(mut object: Object, field: &ObjectFieldSpec, root_parent: Option<Parent>) -> Object {
    match field {
        ObjectFieldSpec::Data(data) => {
            let data = data.clone();
            let data_static: &'static _ = Box::leak(Box::new(data));
            let is_root = root_parent.is_some();
            let mut gql_field = Field::new(data_static.name.clone(), type_ref(&data_static.type_spec), {
                move |ctx| {
                    if is_root {
                        root_data_field_resolver(data_static, ctx)
                    } else {
                        data_field_resolver(data_static, ctx)
                    }
                }
            });
            if let Some(desc) = &data_static.description {
                gql_field = gql_field.description(desc.clone());
            }
            if let Some(reason) = &data_static.deprecation_reason {
                gql_field = gql_field.deprecation(Some(reason.clone()));
            }
            object = object.field(gql_field);
        }
        ObjectFieldSpec::Resolver(resolver) => {
            object = object.field(resolver_object_field(resolver, root_parent));
        }
    }
    object
}

fn resolver_object_field(resolver: &CompiledResolverField, root_parent: Option<Parent>) -> Field {
    let resolver_static: &'static CompiledResolverField = Box::leak(Box::new(resolver.clone()));
    let adapter = FieldAdapterHandle::new(resolver_static.adapter.clone());
    let is_async = resolver_static.is_async;

    let mut gql_field = Field::new(
        resolver_static.name.clone(),
        type_ref(&resolver_static.return_type_spec),
        move |ctx| {
            let adapter = adapter.clone();
            let root = root_parent.clone();
            if is_async {
                async_field_resolver(resolver_static, adapter, root, ctx)
            } else {
                sync_field_resolver(resolver_static, adapter, root, ctx)
            }
        },
    );
    for arg in &resolver_static.args {
        let mut input = InputValue::new(arg.name.clone(), type_ref(&arg.type_spec));
        if let Some(default) = &arg.default_value {
            input = input.default_value(default_as_value(default));
        }
        gql_field = gql_field.argument(input);
    }
    if let Some(desc) = &resolver_static.description {
        gql_field = gql_field.description(desc.clone());
    }
    if let Some(reason) = &resolver_static.deprecation_reason {
        gql_field = gql_field.deprecation(Some(reason.clone()));
    }
    gql_field
}

fn register_interface_field(mut iface: Interface, field: &ObjectFieldSpec) -> Interface {
    let (name, type_spec, description) = match field {
        ObjectFieldSpec::Data(d) => (d.name.clone(), d.type_spec.clone(), d.description.clone()),
        ObjectFieldSpec::Resolver(r) => (
            r.name.clone(),
            r.return_type_spec.clone(),
            r.description.clone(),
        ),
    };
    let mut iface_field = InterfaceField::new(name, type_ref(&type_spec));
    if let Some(desc) = description {
        iface_field = iface_field.description(desc);
    }
    if let ObjectFieldSpec::Resolver(r) = field {
        for arg in &r.args {
            iface_field = iface_field.argument(InputValue::new(arg.name.clone(), type_ref(&arg.type_spec)));
        }
    }
    iface = iface.field(iface_field);
    iface
}

fn register_type(
    mut builder: SchemaBuilder,
    ty: &'static CompiledType,
    root_parent: Option<Parent>,
) -> Result<SchemaBuilder, SchemaBuildError> {
    match ty.kind {
        TypeKind::Object => {
            let mut object = Object::new(ty.name.clone());
            if let Some(desc) = &ty.description {
                object = object.description(desc.clone());
            }
            for field in &ty.object_fields {
                object = register_object_field(object, field, root_parent.clone());
            }
            for iface in &ty.implements {
                object = object.implement(iface.clone());
            }
            builder = builder.register(object);
        }
        TypeKind::Input => {
            let mut input = InputObject::new(ty.name.clone());
            if let Some(desc) = &ty.description {
                input = input.description(desc.clone());
            }
            for field in &ty.input_fields {
                let mut value = InputValue::new(field.name.clone(), type_ref(&field.type_spec));
                if let Some(default) = &field.default_value {
                    value = value.default_value(default_as_value(default));
                }
                if let Some(desc) = &field.description {
                    value = value.description(desc.clone());
                }
                input = input.field(value);
            }
            builder = builder.register(input);
        }
        TypeKind::Interface => {
            let mut iface = Interface::new(ty.name.clone());
            if let Some(desc) = &ty.description {
                iface = iface.description(desc.clone());
            }
            for field in &ty.object_fields {
                iface = register_interface_field(iface, field);
            }
            builder = builder.register(iface);
        }
        TypeKind::Subscription => {
            let mut subscription = Subscription::new(ty.name.clone());
            if let Some(desc) = &ty.description {
                subscription = subscription.description(desc.clone());
            }
            for field in &ty.subscription_fields {
                let field_static: &'static CompiledResolverField =
                    Box::leak(Box::new(field.clone()));
                let adapter = FieldAdapterHandle::new(field_static.adapter.clone());
                let sub_root = root_parent.clone();
                let mut sub_field = SubscriptionField::new(
                    field_static.name.clone(),
                    type_ref(&field_static.return_type_spec),
                    move |ctx| {
                        let adapter = adapter.clone();
                        let root = sub_root.clone();
                        subscription_field_resolver(field_static, adapter, root, ctx)
                    },
                );
                for arg in &field_static.args {
                    sub_field =
                        sub_field.argument(InputValue::new(arg.name.clone(), type_ref(&arg.type_spec)));
                }
                if let Some(desc) = &field_static.description {
                    sub_field = sub_field.description(desc.clone());
                }
                subscription = subscription.field(sub_field);
            }
            builder = builder.register(subscription);
        }
        TypeKind::Union => {
            // Handled separately via `bundle.unions`; a `CompiledType` with
            // kind `Union` never appears in `bundle.types` (spec.md §4.4
            // step 5: "Append compiled unions at the end").
        }
    }
    Ok(builder)
}

/// Builds the engine's immutable schema object from a [`SchemaBundle`]
/// (spec.md §4.5). Built-in scalars (`String`, `Int`, `Float`, `Boolean`,
/// `ID`) are provided by the engine itself and never registered here.
///
/// `query_parent`/`mutation_parent`/`subscription_parent` are the caller's
/// own root class instances, wrapped by `crate::schema::Schema::new`. They
/// stand in for `ctx.parent_value` only on the matching root type's fields;
/// every other type still dispatches from the engine-supplied parent handle.
pub fn build_schema(
    bundle: &SchemaBundle,
    query_parent: Parent,
    mutation_parent: Option<Parent>,
    subscription_parent: Option<Parent>,
) -> Result<DynSchema, SchemaBuildError> {
    let mut builder = DynSchema::build(
        bundle.query_name.clone(),
        bundle.mutation_name.clone(),
        bundle.subscription_name.clone(),
    );

    for ty in &bundle.types {
        let root_parent = if ty.name == bundle.query_name {
            Some(query_parent.clone())
        } else if bundle.mutation_name.as_deref() == Some(ty.name.as_str()) {
            mutation_parent.clone()
        } else if bundle.subscription_name.as_deref() == Some(ty.name.as_str()) {
            subscription_parent.clone()
        } else {
            None
        };
        builder = register_type(builder, ty, root_parent)?;
    }

    for union in &bundle.unions {
        let mut u = Union::new(union.name.clone());
        if let Some(desc) = &union.description {
            u = u.description(desc.clone());
        }
        for member in &union.members {
            u = u.possible_type(member.clone());
        }
        builder = builder.register(u);
    }

    builder
        .finish()
        .map_err(|e| SchemaBuildError::UnregisteredRoot {
            name: format!("schema finalize failed: {e}"),
        })
}
