//! The schema-graph builder (spec.md §4.4): turns a `(query, mutation?,
//! subscription?)` triple of root classes into a [`SchemaBundle`] by BFS
//! traversal of `refs`, automatic interface-implementer discovery, and union
//! registration/deduplication.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::compiled::{CompiledType, ObjectFieldSpec, TypeKind};
use crate::error::SchemaBuildError;
use crate::spec::TypeSpec;


/// A compiled union registration, deduplicated by name across the whole
/// graph walk (spec.md §4.4 step 4).
#[derive(Debug, Clone)]
pub struct CompiledUnion {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

/// The assembled schema graph (spec.md §3). `types` and `unions` are both in
/// BFS discovery order — "a public guarantee for SDL output tests" (spec.md
/// §4.4 step 5).
#[derive(Debug, Clone)]
pub struct SchemaBundle {
    pub query_name: String,
    pub mutation_name: Option<String>,
    pub subscription_name: Option<String>,
    pub types: Vec<&'static CompiledType>,
    pub unions: Vec<CompiledUnion>,
}

struct Builder {
    visited: HashSet<String>,
    queue: VecDeque<&'static CompiledType>,
    types: Vec<&'static CompiledType>,
    unions: IndexMap<String, CompiledUnion>,
}

impl Builder {
    fn new() -> Self {
        Builder {
            visited: HashSet::new(),
            queue: VecDeque::new(),
            types: Vec::new(),
            unions: IndexMap::new(),
        }
    }

    fn enqueue(&mut self, ty: &'static CompiledType) {
        if self.visited.insert(ty.name.clone()) {
            self.queue.push_back(ty);
        }
    }

    /// Registers a `TypeSpec::Union` encountered at some field/argument
    /// position, the first time this union name is seen, and enqueues each
    /// of its member type names via `resolve` so they reach `types` the same
    /// way any other referenced class does (spec.md §4.4 step 4: "register
    /// the union type and its member types"). A bare `TypeSpec::Union`'s
    /// members are only ever known by name at this point -- the enum that
    /// produced it carries no `Compiled` impl of its own -- so `resolve` is
    /// the only way to turn "A"/"B" back into the `&'static CompiledType`s
    /// the schema actually needs to register as GraphQL object types.
    fn register_union_from_spec(
        &mut self,
        spec: &TypeSpec,
        resolve: &impl Fn(&str) -> Option<&'static CompiledType>,
    ) -> Result<(), SchemaBuildError> {
        match spec {
            TypeSpec::Union {
                name,
                members,
                description,
                ..
            } => {
                let candidate = CompiledUnion {
                    name: name.clone(),
                    description: description.clone(),
                    members: members.iter().cloned().collect(),
                };
                match self.unions.get(name) {
                    None => {
                        for member in &candidate.members {
                            if let Some(member_ty) = resolve(member) {
                                self.enqueue(member_ty);
                            }
                        }
                        self.unions.insert(name.clone(), candidate);
                    }
                    Some(existing) => {
                        if existing.members != candidate.members
                            || existing.description != candidate.description
                        {
                            return Err(SchemaBuildError::UnionConflict { name: name.clone() });
                        }
                    }
                }
                Ok(())
            }
            TypeSpec::List { element, .. } => self.register_union_from_spec(element, resolve),
            TypeSpec::Named { .. } => Ok(()),
        }
    }

    fn walk_type_specs(
        &mut self,
        ty: &CompiledType,
        resolve: &impl Fn(&str) -> Option<&'static CompiledType>,
    ) -> Result<(), SchemaBuildError> {
        for field in &ty.object_fields {
            match field {
                ObjectFieldSpec::Data(d) => self.register_union_from_spec(&d.type_spec, resolve)?,
                ObjectFieldSpec::Resolver(r) => {
                    self.register_union_from_spec(&r.return_type_spec, resolve)?;
                    for arg in &r.args {
                        self.register_union_from_spec(&arg.type_spec, resolve)?;
                    }
                }
            }
        }
        for field in &ty.subscription_fields {
            self.register_union_from_spec(&field.return_type_spec, resolve)?;
            for arg in &field.args {
                self.register_union_from_spec(&arg.type_spec, resolve)?;
            }
        }
        for field in &ty.input_fields {
            if field.type_spec.contains_union() {
                return Err(SchemaBuildError::UnionInInputPosition {
                    class: ty.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Builds a [`SchemaBundle`] from root classes (spec.md §4.4).
///
/// `resolve` maps a referenced type *name* (from some `CompiledType::refs`)
/// back to its `&'static CompiledType` — supplied by the generated
/// per-class registry rather than a single global map, since each class
/// only ever registers itself (spec.md §9: "Global mutable registries ->
/// segregated into per-class compiled metadata"). `implementers_of` maps an
/// interface type name to every subclass that compiled against it (spec.md
/// §4.4 step 3); the public [`Compiled`]/[`InterfaceType`] traits give
/// callers a type-safe way to build these closures (see `engine::build_schema`).
pub fn build_bundle(
    query: &'static CompiledType,
    mutation: Option<&'static CompiledType>,
    subscription: Option<&'static CompiledType>,
    resolve: impl Fn(&str) -> Option<&'static CompiledType>,
    implementers_of: impl Fn(&str) -> Vec<&'static CompiledType>,
) -> Result<SchemaBundle, SchemaBuildError> {
    if query.kind != TypeKind::Object {
        return Err(SchemaBuildError::UnregisteredRoot {
            name: query.name.clone(),
        });
    }
    for field in &query.object_fields {
        if let ObjectFieldSpec::Data(d) = field {
            if !d.has_default {
                return Err(SchemaBuildError::QueryRootFieldMissingDefault {
                    class: query.name.clone(),
                    field: d.name.clone(),
                });
            }
        }
    }

    let mut b = Builder::new();
    b.enqueue(query);
    if let Some(m) = mutation {
        b.enqueue(m);
    }
    if let Some(s) = subscription {
        b.enqueue(s);
    }

    while let Some(ty) = b.queue.pop_front() {
        b.walk_type_specs(ty, &resolve)?;
        b.types.push(ty);

        if ty.kind == TypeKind::Interface {
            for implementer in implementers_of(&ty.name) {
                b.enqueue(implementer);
            }
        }

        for ref_name in ty.refs.clone() {
            if let Some(referenced) = resolve(&ref_name) {
                b.enqueue(referenced);
            }
        }
    }

    Ok(SchemaBundle {
        query_name: query.name.clone(),
        mutation_name: mutation.map(|m| m.name.clone()),
        subscription_name: subscription.map(|s| s.name.clone()),
        types: b.types,
        unions: b.unions.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::CompiledDataField;

    fn data_field(name: &str, type_spec: TypeSpec, has_default: bool) -> ObjectFieldSpec {
        ObjectFieldSpec::Data(CompiledDataField {
            name: name.to_string(),
            type_spec,
            has_default,
            default_value: None,
            description: None,
            deprecation_reason: None,
            referenced_types: Vec::new(),
        })
    }

    fn named(name: &str, nullable: bool) -> TypeSpec {
        TypeSpec::Named {
            name: name.to_string(),
            nullable,
        }
    }

    fn leak(ty: CompiledType) -> &'static CompiledType {
        Box::leak(Box::new(ty))
    }

    #[test]
    fn query_root_without_default_errors() {
        let query = leak(CompiledType {
            kind: TypeKind::Object,
            name: "Query".into(),
            description: None,
            object_fields: vec![data_field("greeting", named("String", false), false)],
            input_fields: vec![],
            subscription_fields: vec![],
            implements: vec![],
            refs: vec![],
            possible_members: vec![],
        });
        let err = build_bundle(query, None, None, |_| None, |_| vec![]).unwrap_err();
        assert!(matches!(
            err,
            SchemaBuildError::QueryRootFieldMissingDefault { .. }
        ));
    }

    #[test]
    fn query_root_with_default_builds() {
        let query = leak(CompiledType {
            kind: TypeKind::Object,
            name: "Query".into(),
            description: None,
            object_fields: vec![data_field("greeting", named("String", false), true)],
            input_fields: vec![],
            subscription_fields: vec![],
            implements: vec![],
            refs: vec![],
            possible_members: vec![],
        });
        let bundle = build_bundle(query, None, None, |_| None, |_| vec![]).unwrap();
        assert_eq!(bundle.types.len(), 1);
        assert_eq!(bundle.query_name, "Query");
    }

    #[test]
    fn union_conflict_is_detected() {
        let mut b = Builder::new();
        let a = TypeSpec::Union {
            name: "AB".into(),
            members: indexmap::IndexSet::from(["A".to_string(), "B".to_string()]),
            description: None,
            nullable: false,
        };
        let c = TypeSpec::Union {
            name: "AB".into(),
            members: indexmap::IndexSet::from(["A".to_string(), "C".to_string()]),
            description: None,
            nullable: false,
        };
        let resolve = |_: &str| None;
        b.register_union_from_spec(&a, &resolve).unwrap();
        let err = b.register_union_from_spec(&c, &resolve).unwrap_err();
        assert!(matches!(err, SchemaBuildError::UnionConflict { .. }));
    }

    #[test]
    fn union_members_are_enqueued_via_resolve() {
        let a_ty = leak(CompiledType {
            kind: TypeKind::Object,
            name: "A".into(),
            description: None,
            object_fields: vec![data_field("a", named("Int", false), true)],
            input_fields: vec![],
            subscription_fields: vec![],
            implements: vec![],
            refs: vec![],
            possible_members: vec![],
        });
        let b_ty = leak(CompiledType {
            kind: TypeKind::Object,
            name: "B".into(),
            description: None,
            object_fields: vec![data_field("b", named("Int", false), true)],
            input_fields: vec![],
            subscription_fields: vec![],
            implements: vec![],
            refs: vec![],
            possible_members: vec![],
        });
        let union_spec = TypeSpec::Union {
            name: "NamedAB".into(),
            members: indexmap::IndexSet::from(["A".to_string(), "B".to_string()]),
            description: None,
            nullable: false,
        };
        let resolver_field = crate::compiled::CompiledResolverField {
            kind: crate::compiled::ResolverKind::Field,
            name: "named".into(),
            description: None,
            deprecation_reason: None,
            adapter: crate::compiled::ResolverAdapter::Field(std::sync::Arc::new(|_, _, _, _| {
                crate::compiled::AdapterOutcome::Ready(Ok(crate::compiled::ResolvedValue::Null))
            })),
            needs_context: false,
            is_async: false,
            is_async_gen: false,
            return_type_spec: union_spec,
            args: vec![],
            referenced_types: vec!["NamedAB".to_string()],
        };
        let query = leak(CompiledType {
            kind: TypeKind::Object,
            name: "Query".into(),
            description: None,
            object_fields: vec![ObjectFieldSpec::Resolver(resolver_field)],
            input_fields: vec![],
            subscription_fields: vec![],
            implements: vec![],
            refs: vec!["NamedAB".to_string()],
            possible_members: vec![],
        });

        let resolve = |name: &str| match name {
            "A" => Some(a_ty),
            "B" => Some(b_ty),
            _ => None,
        };
        let bundle = build_bundle(query, None, None, resolve, |_| vec![]).unwrap();

        let names: Vec<&str> = bundle.types.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"A"));
        assert!(names.contains(&"B"));
        assert_eq!(bundle.unions.len(), 1);
        assert_eq!(bundle.unions[0].name, "NamedAB");
    }
}
