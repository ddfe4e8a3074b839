//! Per-request context plumbing (spec.md §3 "Lifecycles", §4.2 step 2, §5).
//!
//! A resolver opts into receiving the caller-supplied per-request value by
//! declaring a parameter whose type is (or is wrapped in) [`Context<T>`]; any
//! number of such parameters may appear, in any position, and all receive
//! the same underlying value (spec.md §4.2 step 2). The per-request value
//! itself is exclusive to one request and is dropped at request end (spec.md
//! §3 Lifecycles).

use std::any::Any;
use std::sync::Arc;

use crate::compiled::RequestContext;

/// Fetches the per-request state for `T` out of a type-erased
/// [`RequestContext`], the way a resolver's generated prologue would.
/// Returns `None` if the caller never supplied a value of this type — which
/// the resolver compiler treats as a schema-build-time error rather than a
/// runtime one, since `needs_context` is known before the first request.
pub fn extract<T: Any + Send + Sync>(ctx: &RequestContext) -> Option<&T> {
    ctx.downcast_ref::<T>()
}

/// Bridges the engine's own per-request data (`async_graphql::Context`'s
/// `data::<T>()`) into our [`RequestContext`] wrapper at dispatch time
/// (spec.md §4.6.B/C step "fetches the per-request state from the engine's
/// request-data channel"). `Schema::execute` always registers the caller's
/// state under the exact type `Arc<dyn Any + Send + Sync>` (it never knows
/// the concrete type either), so this fetches that one type and wraps the
/// `Arc` directly rather than boxing it a second time.
pub fn from_engine_context(ctx: &async_graphql::Context<'_>) -> Option<RequestContext> {
    ctx.data::<Arc<dyn Any + Send + Sync>>()
        .ok()
        .map(|arc| RequestContext::from_arc(arc.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_round_trips() {
        let ctx = RequestContext::new(String::from("caller state"));
        assert_eq!(extract::<String>(&ctx), Some(&"caller state".to_string()));
        assert_eq!(extract::<i32>(&ctx), None);
    }
}
