//! Abstract-selection introspection (spec.md §4.7): an owned snapshot of the
//! selection set beneath the current field, handed to resolvers that
//! request it alongside a `Context<T>` parameter.
//!
//! Unlike the teacher's own `juniper::executor::look_ahead::LookAheadSelection<'a>`
//! (which borrows the query AST), spec.md §4.7 requires this to be built by
//! *eagerly copying* the engine's lookahead handle at resolver-dispatch time
//! — "never by borrowing engine state" — so resolvers can hold onto it
//! without a lifetime tied to the in-flight request.

use std::collections::HashMap;

/// Bounds worst-case copying when eagerly snapshotting a selection set
/// (spec.md §4.7).
pub const MAX_DEPTH: usize = 32;

/// An owned snapshot of a selection subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    children: HashMap<String, Graph>,
}

impl Graph {
    /// An empty graph: `field()` on it always returns another empty graph,
    /// `exists()` is always `false` (spec.md §4.7: "`field(name) -> Graph`
    /// returns an empty graph for missing names").
    pub fn empty() -> Self {
        Graph::default()
    }

    /// Builds an owned graph from the engine's lookahead handle, stopping at
    /// [`MAX_DEPTH`].
    pub fn from_selection(field: &async_graphql::SelectionField<'_>) -> Self {
        Self::from_selection_at_depth(field, 0)
    }

    fn from_selection_at_depth(field: &async_graphql::SelectionField<'_>, depth: usize) -> Self {
        if depth >= MAX_DEPTH {
            return Graph::empty();
        }
        let mut children = HashMap::new();
        for child in field.selection_set() {
            let entry = children
                .entry(child.name().to_string())
                .or_insert_with(Graph::empty);
            let nested = Self::from_selection_at_depth(&child, depth + 1);
            entry.merge(nested);
        }
        Graph { children }
    }

    /// Merges another graph's children into this one (used when the same
    /// field name is selected more than once, e.g. via fragment spreads).
    fn merge(&mut self, other: Graph) {
        for (name, child) in other.children {
            self.children
                .entry(name)
                .and_modify(|existing| existing.merge(child.clone()))
                .or_insert(child);
        }
    }

    /// Returns the subgraph beneath `name`, or an empty graph if `name` was
    /// not selected anywhere in this subtree.
    pub fn field(&self, name: &str) -> Graph {
        self.children.get(name).cloned().unwrap_or_default()
    }

    /// Whether `name` appears anywhere in this subtree, at the immediate
    /// child level.
    pub fn exists(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_no_fields() {
        let g = Graph::empty();
        assert!(!g.exists("anything"));
        assert_eq!(g.field("anything"), Graph::empty());
    }

    #[test]
    fn merge_combines_children() {
        let mut a = Graph {
            children: HashMap::from([("x".to_string(), Graph::empty())]),
        };
        let b = Graph {
            children: HashMap::from([("y".to_string(), Graph::empty())]),
        };
        a.merge(b);
        assert!(a.exists("x"));
        assert!(a.exists("y"));
    }
}
