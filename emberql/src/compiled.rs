//! The frozen, per-class schema metadata emitted by the resolver compiler
//! (§4.2) and type compiler (§4.3): [`CompiledResolverField`],
//! [`CompiledDataField`], [`CompiledInputField`], and [`CompiledType`]
//! itself (spec.md §3).
//!
//! Everything here is created once, at class-decoration time (i.e. at
//! `emberql_codegen` macro-expansion time, materialized as a `static
//! OnceLock` the generated code populates on first access), and is shared by
//! reference across any number of schemas for the remainder of the process.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::error::ResolverError;
use crate::lookahead::Graph;
use crate::spec::{ArgSpec, TypeSpec};

/// The kind of GraphQL type a [`CompiledType`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Input,
    Subscription,
    Interface,
    Union,
}

/// Type-erased per-request state, handed to resolvers that declare a
/// `Context<T>` parameter (spec.md §4.2 step 2, §6 GLOSSARY). Wraps an `Arc`
/// rather than a `Box` because the same underlying value is shared, by
/// reference, across every field resolved over the lifetime of one request
/// (spec.md §4.2 step 2: "all receive the same per-request state") -- this is
/// also the exact type `Schema::execute`'s caller-supplied `context` argument
/// already arrives as, so building one here never rewraps it a second time.
pub struct RequestContext(Arc<dyn Any + Send + Sync>);

impl RequestContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        RequestContext(Arc::new(value))
    }

    /// Wraps an already-erased `Arc` directly, without boxing it again --
    /// the form the engine's per-request data channel hands back.
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        RequestContext(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// Implemented by every `#[derive(Object)]`/`#[derive(Interface)]` output so
/// the runtime-dispatch closures (`crate::dispatch`) can read a named data
/// field off an arbitrary compiled type without knowing its concrete Rust
/// struct (shape A, spec.md §4.6.A), and so shape B/C adapters can still
/// recover the concrete struct behind a parent handle via `as_any`.
pub trait ObjectAttributes: Any + Send + Sync {
    /// Reads a pre-interned data-field attribute by name (spec.md §4.6.A:
    /// "snapshots the parent's attribute by a pre-interned field name").
    /// Returns `None` for a missing attribute, converted to the engine's
    /// null value by the caller.
    fn attribute(&self, name: &str) -> Option<ResolvedValue>;

    /// `GraphQL __typename` of the concrete implementer behind this handle,
    /// used to route interface/union fields (spec.md §4.6).
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// The type-erased parent instance a field resolves against: any compiled
/// object/interface/subscription-owner type, reachable either as attribute
/// data (via [`ObjectAttributes::attribute`]) or, after a downcast to its
/// concrete Rust type, as the receiver of a resolver method.
#[derive(Clone)]
pub struct Parent(Arc<dyn ObjectAttributes>);

impl Parent {
    pub fn new(value: Arc<dyn ObjectAttributes>) -> Self {
        Parent(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    pub fn attributes(&self) -> &dyn ObjectAttributes {
        self.0.as_ref()
    }

    pub fn handle(&self) -> Arc<dyn ObjectAttributes> {
        self.0.clone()
    }
}

/// Coerced, defaulted resolver arguments, keyed by GraphQL argument name.
pub type KwArgs = HashMap<String, serde_json::Value>;

/// A resolver's result, in a form independent of any particular execution
/// engine. [`crate::dispatch`] is the only module that knows how to turn
/// this into the engine's own value domain.
#[derive(Clone)]
pub enum ResolvedValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<ResolvedValue>),
    /// A non-scalar object, tagged with its concrete GraphQL type name so
    /// union/interface fields can be routed to the right implementer
    /// (spec.md §4.6).
    Object {
        type_name: String,
        handle: Arc<dyn ObjectAttributes>,
    },
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Null => write!(f, "Null"),
            ResolvedValue::String(s) => write!(f, "String({s:?})"),
            ResolvedValue::Int(i) => write!(f, "Int({i})"),
            ResolvedValue::Float(v) => write!(f, "Float({v})"),
            ResolvedValue::Boolean(b) => write!(f, "Boolean({b})"),
            ResolvedValue::List(items) => write!(f, "List({items:?})"),
            ResolvedValue::Object { type_name, .. } => write!(f, "Object({type_name})"),
        }
    }
}

impl ResolvedValue {
    pub fn object(type_name: impl Into<String>, handle: Arc<dyn ObjectAttributes>) -> Self {
        ResolvedValue::Object {
            type_name: type_name.into(),
            handle,
        }
    }
}

/// Converts a resolver method's own return value into [`ResolvedValue`],
/// the engine-agnostic result domain (spec.md §4.6). Every eligible type
/// gets a concrete impl (scalars here, `Option`/`Vec` by recursing, and one
/// generated impl per `#[derive(Object)]`/`#[derive(Interface)]`/
/// `#[derive(Union)]` type) rather than a blanket impl, for the same
/// coherence reason [`crate::traits::GqlTypeSpec`] documents.
pub trait IntoResolvedValue {
    fn into_resolved_value(self) -> ResolvedValue;
}

macro_rules! scalar_into_resolved {
    ($ty:ty => $variant:ident) => {
        impl IntoResolvedValue for $ty {
            fn into_resolved_value(self) -> ResolvedValue {
                ResolvedValue::$variant(self)
            }
        }
    };
}

scalar_into_resolved!(String => String);
scalar_into_resolved!(i64 => Int);
scalar_into_resolved!(f64 => Float);
scalar_into_resolved!(bool => Boolean);

impl IntoResolvedValue for i32 {
    fn into_resolved_value(self) -> ResolvedValue {
        ResolvedValue::Int(i64::from(self))
    }
}

impl IntoResolvedValue for f32 {
    fn into_resolved_value(self) -> ResolvedValue {
        ResolvedValue::Float(f64::from(self))
    }
}

impl<T: IntoResolvedValue> IntoResolvedValue for Option<T> {
    fn into_resolved_value(self) -> ResolvedValue {
        match self {
            Some(v) => v.into_resolved_value(),
            None => ResolvedValue::Null,
        }
    }
}

impl<T: IntoResolvedValue> IntoResolvedValue for Vec<T> {
    fn into_resolved_value(self) -> ResolvedValue {
        ResolvedValue::List(self.into_iter().map(IntoResolvedValue::into_resolved_value).collect())
    }
}

impl IntoResolvedValue for crate::traits::Id {
    fn into_resolved_value(self) -> ResolvedValue {
        ResolvedValue::String(self.0)
    }
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parent(..)")
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestContext(..)")
    }
}

/// The outcome of invoking a [`CompiledResolverField`]'s adapter: either an
/// immediately-available result (the synchronous dispatch path, §4.6.B) or a
/// pending future (the asynchronous dispatch path, §4.6.C).
pub enum AdapterOutcome {
    Ready(Result<ResolvedValue, ResolverError>),
    Pending(BoxFuture<'static, Result<ResolvedValue, ResolverError>>),
}

/// The outcome of invoking a subscription field's adapter: a stream of
/// results, one per emitted item (spec.md §4.6, §5).
pub type SubscriptionOutcome = BoxStream<'static, Result<ResolvedValue, ResolverError>>;

/// The single uniform callable the resolver compiler produces for a
/// field-kind resolver (spec.md §3, §4.2). Hides the resolver's actual
/// parameter pattern (positional parent, zero-or-more `Context<T>`
/// parameters in any position, remaining parameters as GraphQL arguments)
/// behind `(parent, context_or_none, selection, kwargs) -> result`. The
/// selection graph (spec.md §4.7) is threaded alongside the request context
/// rather than folded into it, since a field with no `Context<T>` parameter
/// never builds one at all -- building the graph eagerly on every field
/// dispatch, needed or not, would undercut the "copy only what's asked for"
/// reasoning behind `lookahead::MAX_DEPTH`.
pub type FieldAdapter = Arc<
    dyn Fn(&Parent, Option<&RequestContext>, Option<&Graph>, &KwArgs) -> AdapterOutcome
        + Send
        + Sync,
>;

/// The uniform callable for a subscription-kind resolver. Subscriptions are
/// always async generators (spec.md §4.2 step 6: "Subscription resolvers are
/// never demoted"), so there is no synchronous variant.
pub type SubscriptionAdapter = Arc<
    dyn Fn(&Parent, Option<&RequestContext>, Option<&Graph>, &KwArgs) -> SubscriptionOutcome
        + Send
        + Sync,
>;

/// A compiled resolver-backed field (spec.md §3).
#[derive(Clone)]
pub struct CompiledResolverField {
    pub kind: ResolverKind,
    pub name: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub adapter: ResolverAdapter,
    pub needs_context: bool,
    pub is_async: bool,
    pub is_async_gen: bool,
    pub return_type_spec: TypeSpec,
    pub args: Vec<ArgSpec>,
    pub referenced_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    Field,
    Subscription,
}

#[derive(Clone)]
pub enum ResolverAdapter {
    Field(FieldAdapter),
    Subscription(SubscriptionAdapter),
}

impl fmt::Debug for CompiledResolverField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledResolverField")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("needs_context", &self.needs_context)
            .field("is_async", &self.is_async)
            .field("is_async_gen", &self.is_async_gen)
            .field("return_type_spec", &self.return_type_spec)
            .field("args", &self.args.len())
            .finish()
    }
}

/// A compiled data field (spec.md §3): its resolver is implicitly an
/// attribute read (§4.6.A).
#[derive(Debug, Clone)]
pub struct CompiledDataField {
    pub name: String,
    pub type_spec: TypeSpec,
    pub has_default: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub referenced_types: Vec<String>,
}

/// A compiled input field (spec.md §3). Identical shape to
/// [`CompiledDataField`] but used only in input-object contexts, and
/// forbidden from carrying a resolver.
#[derive(Debug, Clone)]
pub struct CompiledInputField {
    pub name: String,
    pub type_spec: TypeSpec,
    pub has_default: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
    pub referenced_types: Vec<String>,
}

/// One field of an `object`/`interface`-kind type: either a plain data field
/// (attribute read) or a resolver method (spec.md §4.3 step 4: "object: any
/// mix of data fields and `@field` methods").
#[derive(Debug, Clone)]
pub enum ObjectFieldSpec {
    Data(CompiledDataField),
    Resolver(CompiledResolverField),
}

impl ObjectFieldSpec {
    pub fn name(&self) -> &str {
        match self {
            ObjectFieldSpec::Data(d) => &d.name,
            ObjectFieldSpec::Resolver(r) => &r.name,
        }
    }

    pub fn referenced_types(&self) -> &[String] {
        match self {
            ObjectFieldSpec::Data(d) => &d.referenced_types,
            ObjectFieldSpec::Resolver(r) => &r.referenced_types,
        }
    }
}

/// The immutable per-class schema artifact (spec.md §3). Exactly one of
/// `object_fields`, `input_fields`, `subscription_fields` is non-empty, per
/// `kind`.
#[derive(Debug, Clone)]
pub struct CompiledType {
    pub kind: TypeKind,
    pub name: String,
    pub description: Option<String>,
    pub object_fields: Vec<ObjectFieldSpec>,
    pub input_fields: Vec<CompiledInputField>,
    pub subscription_fields: Vec<CompiledResolverField>,
    /// Names of interface base types this type implements.
    pub implements: Vec<String>,
    /// Transitive set of user-class type names mentioned anywhere in this
    /// type's resolvers and data fields. Seeds the schema-graph walk
    /// (spec.md §4.4).
    pub refs: Vec<String>,
    /// Populated only for `TypeKind::Union`: the ordered set of possible
    /// member type names.
    pub possible_members: Vec<String>,
}

impl CompiledType {
    pub fn object_field(&self, name: &str) -> Option<&ObjectFieldSpec> {
        self.object_fields.iter().find(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dog;

    impl ObjectAttributes for Dog {
        fn attribute(&self, _name: &str) -> Option<ResolvedValue> {
            None
        }

        fn type_name(&self) -> &'static str {
            "Dog"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn resolved_value_object_tags_concrete_type() {
        let v = ResolvedValue::object("Dog", Arc::new(Dog));
        match v {
            ResolvedValue::Object { type_name, handle } => {
                assert_eq!(type_name, "Dog");
                assert!(handle.as_any().downcast_ref::<Dog>().is_some());
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn request_context_roundtrips_by_type() {
        let ctx = RequestContext::new(42i32);
        assert_eq!(ctx.downcast_ref::<i32>(), Some(&42));
        assert_eq!(ctx.downcast_ref::<String>(), None);
    }
}
