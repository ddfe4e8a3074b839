//! The public schema entry point (spec.md §6): `Schema`, `SchemaOptions`,
//! `OperationResult`, and `SubscriptionStream`. Everything above this module
//! is engine-agnostic; `Schema` is where a [`crate::bundle::SchemaBundle`]
//! finally becomes a live, queryable object backed by
//! `async_graphql::dynamic::Schema`.

use std::any::Any;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use async_graphql::parser::types::{DocumentOperations, OperationType};
use futures::Stream;
use serde::Serialize;

use crate::bundle::{build_bundle, SchemaBundle};
use crate::compiled::{CompiledType, ObjectAttributes, Parent};
use crate::engine::build_schema;
use crate::error::SchemaBuildError;

/// Construction-time knobs for a [`Schema`] (spec.md §6 lists none beyond the
/// three root classes; this is the ambient-stack carry-over SPEC_FULL.md §2
/// names — introspection and a recursion-depth limit, the way the teacher's
/// `juniper::EmptySubscription`/`Context` builders expose theirs).
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Whether the built schema answers `__schema`/`__type` introspection
    /// queries. Defaults to `true`.
    pub introspection: bool,
    /// Caps selection-set recursion during execution, mirroring
    /// `async_graphql`'s own `.limit_depth(..)`. `None` leaves the engine's
    /// default in place.
    pub max_query_depth: Option<usize>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        SchemaOptions {
            introspection: true,
            max_query_depth: None,
        }
    }
}

/// A single GraphQL-over-JSON error entry (spec.md §6: "`message`, `path`,
/// `locations`, optional `extensions`").
#[derive(Debug, Clone, Serialize)]
pub struct OperationError {
    pub message: String,
    pub path: Vec<serde_json::Value>,
    pub locations: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl From<async_graphql::ServerError> for OperationError {
    fn from(err: async_graphql::ServerError) -> Self {
        let path = err
            .path
            .iter()
            .map(|segment| match segment {
                async_graphql::PathSegment::Field(name) => serde_json::Value::String(name.clone()),
                async_graphql::PathSegment::Index(i) => {
                    serde_json::Value::Number((*i as u64).into())
                }
            })
            .collect();
        let locations = err
            .locations
            .iter()
            .map(|loc| serde_json::json!({"line": loc.line, "column": loc.column}))
            .collect();
        OperationError {
            message: err.message,
            path,
            locations,
            extensions: err
                .extensions
                .map(|ext| serde_json::to_value(ext).unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// The result of a single query or mutation operation (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    pub data: serde_json::Value,
    pub errors: Vec<OperationError>,
    pub extensions: serde_json::Value,
}

impl From<async_graphql::Response> for OperationResult {
    fn from(response: async_graphql::Response) -> Self {
        OperationResult {
            data: response
                .data
                .into_json()
                .unwrap_or(serde_json::Value::Null),
            errors: response.errors.into_iter().map(OperationError::from).collect(),
            extensions: serde_json::to_value(&response.extensions)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

/// An asynchronous iterator of [`OperationResult`]s produced by a
/// subscription operation (spec.md §6). `close` drops the underlying engine
/// stream, which in turn drops the user's async-generator future — "closing
/// the stream within a finite number of items closes the underlying
/// generator exactly once" (spec.md §8).
pub struct SubscriptionStream {
    inner: Option<Pin<Box<dyn Stream<Item = async_graphql::Response> + Send>>>,
}

impl SubscriptionStream {
    fn new(inner: Pin<Box<dyn Stream<Item = async_graphql::Response> + Send>>) -> Self {
        SubscriptionStream { inner: Some(inner) }
    }

    /// Closes the stream. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        self.inner = None;
    }
}

impl Stream for SubscriptionStream {
    type Item = OperationResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            None => Poll::Ready(None),
            Some(stream) => stream.as_mut().poll_next(cx).map(|opt| opt.map(OperationResult::from)),
        }
    }
}

/// Either outcome of [`Schema::execute`] (spec.md §6: "returns either an
/// `OperationResult` ... or a `SubscriptionStream`").
pub enum ExecutionOutcome {
    Operation(OperationResult),
    Subscription(SubscriptionStream),
}

/// The built, immutable schema (spec.md §6). Construction is eager and
/// fails fast on an unregistered root.
pub struct Schema {
    inner: async_graphql::dynamic::Schema,
    bundle: SchemaBundle,
}

impl Schema {
    /// Builds the engine schema from the three root classes (spec.md §6).
    ///
    /// `query_instance`/`mutation_instance`/`subscription_instance` are the
    /// caller's own root class values (e.g. `Arc::new(Query) as Arc<dyn
    /// ObjectAttributes>`), not just their compiled type metadata: the query
    /// and mutation roots "have no parent to read from" at dispatch time
    /// (spec.md §4.4 step 1) -- `async_graphql::dynamic` leaves
    /// `ctx.parent_value` null for root-level fields -- so root data-field
    /// reads and resolver-method `self` dispatch both need a real instance
    /// supplied up front instead, mirroring how `juniper::RootNode::new`
    /// takes root *values* rather than bare types.
    ///
    /// `resolve`/`implementers_of` are the same schema-graph-builder
    /// closures `crate::bundle::build_bundle` takes; generated `Compiled`/
    /// `InterfaceType` impls give callers a type-safe way to build them (see
    /// the crate's top-level `schema!`-style convenience, when present, or
    /// build them by hand from a handful of `Compiled::compiled()` calls).
    pub fn new(
        query: &'static CompiledType,
        mutation: Option<&'static CompiledType>,
        subscription: Option<&'static CompiledType>,
        query_instance: Arc<dyn ObjectAttributes>,
        mutation_instance: Option<Arc<dyn ObjectAttributes>>,
        subscription_instance: Option<Arc<dyn ObjectAttributes>>,
        resolve: impl Fn(&str) -> Option<&'static CompiledType>,
        implementers_of: impl Fn(&str) -> Vec<&'static CompiledType>,
    ) -> Result<Self, SchemaBuildError> {
        Self::with_options(
            query,
            mutation,
            subscription,
            query_instance,
            mutation_instance,
            subscription_instance,
            resolve,
            implementers_of,
            SchemaOptions::default(),
        )
    }

    #[allow(clippy::too_many_arguments, reason = "mirrors juniper's own RootNode::new arity")]
    pub fn with_options(
        query: &'static CompiledType,
        mutation: Option<&'static CompiledType>,
        subscription: Option<&'static CompiledType>,
        query_instance: Arc<dyn ObjectAttributes>,
        mutation_instance: Option<Arc<dyn ObjectAttributes>>,
        subscription_instance: Option<Arc<dyn ObjectAttributes>>,
        resolve: impl Fn(&str) -> Option<&'static CompiledType>,
        implementers_of: impl Fn(&str) -> Vec<&'static CompiledType>,
        options: SchemaOptions,
    ) -> Result<Self, SchemaBuildError> {
        let bundle = build_bundle(query, mutation, subscription, resolve, implementers_of)?;
        let mut inner = build_schema(
            &bundle,
            Parent::new(query_instance),
            mutation_instance.map(Parent::new),
            subscription_instance.map(Parent::new),
        )?;
        if !options.introspection {
            inner = inner.disable_introspection();
        }
        if let Some(depth) = options.max_query_depth {
            inner = inner.limit_depth(depth);
        }
        tracing::info!(
            query = %bundle.query_name,
            mutation = ?bundle.mutation_name,
            subscription = ?bundle.subscription_name,
            types = bundle.types.len(),
            "schema built"
        );
        Ok(Schema { inner, bundle })
    }

    /// The GraphQL SDL produced by the engine for this schema (spec.md §6:
    /// "deterministic across runs for a given input").
    pub fn sdl(&self) -> String {
        self.inner.sdl()
    }

    /// The assembled schema graph this `Schema` was built from, mostly
    /// useful for tests asserting on discovery order (spec.md §4.4 step 5).
    pub fn bundle(&self) -> &SchemaBundle {
        &self.bundle
    }

    /// One entry point for queries, mutations, and subscriptions (spec.md
    /// §6). Parses the query engine-side, inspects the selected operation's
    /// kind, and routes to `execute` or `execute_stream` accordingly.
    pub async fn execute(
        &self,
        query: impl Into<String>,
        variables: Option<serde_json::Value>,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> ExecutionOutcome {
        let query = query.into();
        let mut request = async_graphql::Request::new(query.clone());
        if let Some(vars) = variables {
            request = request.variables(async_graphql::Variables::from_json(vars));
        }
        if let Some(ctx) = context {
            request = request.data(ctx);
        }

        if is_subscription(&query) {
            let stream = self.inner.execute_stream(request);
            ExecutionOutcome::Subscription(SubscriptionStream::new(Box::pin(stream)))
        } else {
            let response = self.inner.execute(request).await;
            ExecutionOutcome::Operation(OperationResult::from(response))
        }
    }
}

/// Detects whether `query` selects a subscription operation (spec.md §6:
/// "detects the operation kind"). A malformed query is never classified as a
/// subscription; the engine's own parse error surfaces through `execute`'s
/// normal request-preparation error path (spec.md §7 tier 2) instead.
fn is_subscription(query: &str) -> bool {
    let document = match async_graphql::parser::parse_query(query) {
        Ok(doc) => doc,
        Err(_) => return false,
    };
    match document.operations {
        DocumentOperations::Single(op) => op.node.ty == OperationType::Subscription,
        DocumentOperations::Multiple(ops) => ops
            .values()
            .any(|op| op.node.ty == OperationType::Subscription),
    }
}
