//! Framework marker types recognized by the annotation analyzer and resolver
//! compiler (spec.md §4.1, §4.2, §6). These are ordinary Rust types; the
//! analyzer recognizes them by name when it walks a field or parameter
//! annotation.
//!
//! `Hidden`/per-field description/union-naming (the rest of spec.md §6) are
//! instead carried by the `#[emberql(...)]` helper attribute
//! (`emberql_codegen::attrs`), so only `Context<T>` -- which users name
//! directly in a resolver signature rather than attach as an attribute --
//! lives here.

use crate::lookahead::Graph;

/// Carries per-request state into a resolver parameter, together with the
/// selection set beneath the current field (spec.md §4.2 step 2, §4.7:
/// "resolvers that declare a context parameter receive, in addition to the
/// user state, a graph object"). `Context<T>` is the only way a resolver
/// opts into receiving the caller-supplied request value.
///
/// A context parameter is identified structurally, never by the identifier
/// `context` alone — an unrelated parameter named `context` is ordinary.
#[derive(Debug, Clone)]
pub struct Context<T> {
    state: T,
    selection: Graph,
}

impl<T> Context<T> {
    pub fn new(state: T, selection: Graph) -> Self {
        Context { state, selection }
    }

    /// The caller-supplied per-request value.
    pub fn get(&self) -> &T {
        &self.state
    }

    /// The selection set beneath the current field (spec.md §4.7).
    pub fn selection(&self) -> &Graph {
        &self.selection
    }
}

impl<T> std::ops::Deref for Context<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_state_and_selection() {
        let ctx = Context::new(42i32, Graph::empty());
        assert_eq!(*ctx.get(), 42);
        assert!(!ctx.selection().exists("anything"));
    }
}
