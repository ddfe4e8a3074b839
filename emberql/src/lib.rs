//! emberql: a high-throughput GraphQL server library with a
//! decorator-driven schema API over a native execution engine.
//!
//! User code decorates plain structs and `impl` blocks with
//! `#[derive(Object)]`, `#[derive(InputObject)]`, `#[derive(Interface)]`,
//! `#[derive(Subscription)]`, and the companion `#[resolvers]` attribute
//! macro (re-exported from `emberql_codegen`). Those macros populate a
//! frozen [`compiled::CompiledType`] per class, once, the first time
//! `<C as traits::Compiled>::compiled()` runs. [`schema::Schema::new`] walks
//! the query/mutation/subscription roots into a [`bundle::SchemaBundle`] and
//! hands it to [`engine::build_schema`], which is the only place this crate
//! touches `async_graphql::dynamic` directly.
//!
//! See `README.md` for a worked example.

pub mod bundle;
pub mod coerce;
pub mod compiled;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lookahead;
pub mod markers;
pub mod schema;
pub mod spec;
pub mod traits;
pub mod value;

pub use bundle::{CompiledUnion, SchemaBundle};
pub use compiled::{
    CompiledDataField, CompiledInputField, CompiledResolverField, CompiledType, IntoResolvedValue,
    ObjectAttributes, RequestContext, ResolvedValue, TypeKind,
};
pub use context::extract;
pub use coerce::InputCoerce;
pub use error::{ResolverError, SchemaBuildError};
pub use lookahead::Graph;
pub use markers::Context;
pub use schema::{ExecutionOutcome, OperationError, OperationResult, Schema, SchemaOptions, SubscriptionStream};
pub use spec::{ArgSpec, TypeSpec};
pub use traits::{
    Compiled, GqlTypeSpec, Id, InputType, InterfaceType, ObjectType, ResolverFields,
    SubscriptionFields, SubscriptionType,
};

pub use emberql_codegen::{
    resolvers, subscription_resolvers, InputObject, Interface, Object, Subscription, Union,
};
