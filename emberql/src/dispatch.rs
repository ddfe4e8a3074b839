//! Runtime dispatch (spec.md §4.6): the performance-critical centerpiece.
//! Builds the `async_graphql::dynamic` field-resolution closure for each
//! compiled field, choosing among the three shapes spec.md §4.6 names:
//!
//! - **A. Pure attribute read** — [`data_field_resolver`]. No future is ever
//!   allocated; the closure returns an already-resolved `FieldFuture`.
//! - **B. Synchronous resolver call** — [`sync_field_resolver`]. One
//!   argument-building + invocation + conversion pass, still returned as an
//!   already-resolved `FieldFuture`.
//! - **C. Asynchronous resolver call** — [`async_field_resolver`]. The
//!   adapter's future is bridged into the engine's own `FieldFuture::new`.
//!
//! Subscriptions get their own entry point, [`subscription_field_resolver`],
//! which bridges a [`SubscriptionOutcome`] stream into an
//! `async_graphql::dynamic::SubscriptionFieldFuture`.
//!
//! Shapes B and C, plus [`subscription_field_resolver`], take an optional
//! `root` parent supplied by `crate::engine::register_type`: the
//! query/mutation/subscription root has no engine-side parent value to read
//! off `ctx.parent_value`, so its own compiled instance stands in instead
//! (see [`resolve_parent`]).

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, ResolverContext, SubscriptionFieldFuture};
use futures::StreamExt;

use crate::compiled::{
    AdapterOutcome, CompiledDataField, CompiledResolverField, KwArgs, ObjectAttributes, Parent,
    RequestContext, ResolverAdapter,
};
use crate::context::from_engine_context;
use crate::lookahead::Graph;
use crate::value::{resolved_value_from_json, to_field_value};

/// A cloneable handle over a [`CompiledResolverField`]'s adapter, captured
/// by the per-field closures registered in [`crate::engine`].
#[derive(Clone)]
pub struct FieldAdapterHandle(ResolverAdapter);

impl FieldAdapterHandle {
    pub fn new(adapter: ResolverAdapter) -> Self {
        FieldAdapterHandle(adapter)
    }

    fn call_field(
        &self,
        parent: &Parent,
        ctx: Option<&RequestContext>,
        selection: Option<&Graph>,
        kwargs: &KwArgs,
    ) -> AdapterOutcome {
        match &self.0 {
            ResolverAdapter::Field(f) => f(parent, ctx, selection, kwargs),
            ResolverAdapter::Subscription(_) => {
                AdapterOutcome::Ready(Err(crate::error::ResolverError::message(
                    "a subscription adapter cannot be dispatched as a field",
                )))
            }
        }
    }

    fn call_subscription(
        &self,
        parent: &Parent,
        ctx: Option<&RequestContext>,
        selection: Option<&Graph>,
        kwargs: &KwArgs,
    ) -> Option<crate::compiled::SubscriptionOutcome> {
        match &self.0 {
            ResolverAdapter::Subscription(f) => Some(f(parent, ctx, selection, kwargs)),
            ResolverAdapter::Field(_) => None,
        }
    }
}

/// Downcasts the engine's own opaque parent handle back into our
/// engine-agnostic [`Parent`] (spec.md §4.6: "Named non-scalar object types
/// are returned to the engine as owned, type-tagged opaque handles").
fn parent_from_ctx(ctx: &ResolverContext<'_>) -> async_graphql::Result<Parent> {
    ctx.parent_value
        .downcast_ref::<Arc<dyn ObjectAttributes>>()
        .map(|handle| Parent::new(handle.clone()))
        .ok_or_else(|| async_graphql::Error::new("parent value is not an emberql object handle"))
}

/// Resolves the parent handle a field dispatches against. A field belonging
/// to the query/mutation/subscription root has no engine-side parent value
/// at all (spec.md §4.4 step 1: "queries have no parent to read from") --
/// `async_graphql::dynamic` leaves `ctx.parent_value` null for root fields --
/// so root registration (`crate::engine::register_type`) supplies the root
/// class's own instance directly instead, bypassing `ctx.parent_value`
/// entirely. Everywhere else, the parent is the engine-supplied value.
fn resolve_parent(root: Option<&Parent>, ctx: &ResolverContext<'_>) -> async_graphql::Result<Parent> {
    match root {
        Some(parent) => Ok(parent.clone()),
        None => parent_from_ctx(ctx),
    }
}

/// Shape A: a pre-interned attribute read (spec.md §4.6.A). No adapter, no
/// future, no per-request context lookup.
pub fn data_field_resolver<'a>(
    field: &'static CompiledDataField,
    ctx: ResolverContext<'a>,
) -> FieldFuture<'a> {
    FieldFuture::new(async move {
        let parent = parent_from_ctx(&ctx)?;
        let value = parent
            .attributes()
            .attribute(&field.name)
            .unwrap_or(crate::compiled::ResolvedValue::Null);
        let field_value = to_field_value(value, &field.type_spec)?;
        Ok(Some(field_value))
    })
}

/// Shape A for a query/mutation-root data field (spec.md §4.4 step 1: "the
/// query root, verify that every data field declares a default ... queries
/// have no parent to read from"). Never touches `ctx.parent_value` -- the
/// field's value is its own compiled default, not an attribute read.
pub fn root_data_field_resolver<'a>(
    field: &'static CompiledDataField,
    _ctx: ResolverContext<'a>,
) -> FieldFuture<'a> {
    FieldFuture::new(async move {
        let value = field
            .default_value
            .as_ref()
            .map(resolved_value_from_json)
            .unwrap_or(crate::compiled::ResolvedValue::Null);
        let field_value = to_field_value(value, &field.type_spec)?;
        Ok(Some(field_value))
    })
}

/// Builds arguments and optional context for either dispatch shape (B or
/// C), shared so argument coercion and default application happen once,
/// before the resolver is entered (spec.md §5: "occur before the resolver
/// is entered").
fn build_kwargs(field: &CompiledResolverField, ctx: &ResolverContext<'_>) -> KwArgs {
    let mut kwargs = KwArgs::new();
    for arg in &field.args {
        let coerced = ctx
            .args
            .get(&arg.name)
            .and_then(|accessor| accessor.deserialize::<serde_json::Value>().ok());
        match coerced.or_else(|| arg.default_value.clone()) {
            Some(value) => {
                kwargs.insert(arg.name.clone(), value);
            }
            None => {}
        }
    }
    kwargs
}

fn build_request_context(
    field: &CompiledResolverField,
    ctx: &ResolverContext<'_>,
) -> Option<RequestContext> {
    if !field.needs_context {
        return None;
    }
    from_engine_context(ctx.ctx)
}

/// Builds the eagerly-copied selection-set snapshot beneath the current
/// field (spec.md §4.7), only when some `Context<T>` parameter will actually
/// receive it -- a field that never declares context can never observe it
/// either, so there is no reason to walk the selection set for one.
fn build_selection_graph(field: &CompiledResolverField, ctx: &ResolverContext<'_>) -> Option<Graph> {
    if !field.needs_context {
        return None;
    }
    Some(Graph::from_selection(&ctx.ctx.field()))
}

/// Shape B: a synchronous resolver call (spec.md §4.6.B). "A single
/// host-runtime attachment brackets the whole call" collapses, in a native
/// Rust target, to a single non-yielding call with no `.await` inside it —
/// the whole body below runs to completion before the `async move` block
/// ever suspends.
pub fn sync_field_resolver<'a>(
    field: &'static CompiledResolverField,
    adapter: FieldAdapterHandle,
    root: Option<Parent>,
    ctx: ResolverContext<'a>,
) -> FieldFuture<'a> {
    FieldFuture::new(async move {
        let parent = resolve_parent(root.as_ref(), &ctx)?;
        let request_ctx = build_request_context(field, &ctx);
        let selection = build_selection_graph(field, &ctx);
        let kwargs = build_kwargs(field, &ctx);

        let resolved = match adapter.call_field(&parent, request_ctx.as_ref(), selection.as_ref(), &kwargs) {
            AdapterOutcome::Ready(result) => result?,
            AdapterOutcome::Pending(_) => {
                return Err(async_graphql::Error::new(
                    "resolver classified synchronous returned a pending future",
                ));
            }
        };
        Ok(Some(to_field_value(resolved, &field.return_type_spec)?))
    })
}

/// Shape C: an asynchronous resolver call (spec.md §4.6.C). The adapter's
/// future is awaited inside the engine's own `FieldFuture`, so the engine's
/// executor drives suspension rather than a bespoke bridge — the "convert
/// the returned awaitable into an engine-side future" step of spec.md §4.6
/// is just `.await` here, since both sides already speak Rust futures.
pub fn async_field_resolver<'a>(
    field: &'static CompiledResolverField,
    adapter: FieldAdapterHandle,
    root: Option<Parent>,
    ctx: ResolverContext<'a>,
) -> FieldFuture<'a> {
    FieldFuture::new(async move {
        let parent = resolve_parent(root.as_ref(), &ctx)?;
        let request_ctx = build_request_context(field, &ctx);
        let selection = build_selection_graph(field, &ctx);
        let kwargs = build_kwargs(field, &ctx);

        let resolved = match adapter.call_field(&parent, request_ctx.as_ref(), selection.as_ref(), &kwargs) {
            AdapterOutcome::Ready(result) => result?,
            AdapterOutcome::Pending(future) => future.await?,
        };
        Ok(Some(to_field_value(resolved, &field.return_type_spec)?))
    })
}

/// Converts an async-generator subscription resolver into the engine's own
/// stream type (spec.md §4.6: "convert the generator into an engine-side
/// stream that polls the next item per engine demand"). A host error mid
/// stream is surfaced as a GraphQL error and completes the stream; per
/// spec.md §4.6 "Ordering guarantees", the stream is never polled
/// concurrently with itself — `StreamExt::map` below preserves strict
/// sequential polling.
pub fn subscription_field_resolver<'a>(
    field: &'static CompiledResolverField,
    adapter: FieldAdapterHandle,
    root: Option<Parent>,
    ctx: ResolverContext<'a>,
) -> SubscriptionFieldFuture<'a> {
    SubscriptionFieldFuture::new(async move {
        let parent = resolve_parent(root.as_ref(), &ctx)?;
        let request_ctx = build_request_context(field, &ctx);
        let selection = build_selection_graph(field, &ctx);
        let kwargs = build_kwargs(field, &ctx);

        let stream = adapter
            .call_subscription(&parent, request_ctx.as_ref(), selection.as_ref(), &kwargs)
            .ok_or_else(|| async_graphql::Error::new("field adapter is not a subscription"))?;

        let return_type = field.return_type_spec.clone();
        let mapped = stream.map(move |item| {
            let value = item?;
            to_field_value(value, &return_type).map_err(async_graphql::Error::from)
        });
        Ok(mapped)
    })
}
