//! spec.md §4.2 step 2 / §6: a resolver that declares a `Context<T>`
//! parameter, reading both the caller-supplied per-request state and the
//! selection-set graph (§4.7) that comes bundled with it.

use std::sync::Arc;

use emberql::{resolvers, Context, Object, ObjectAttributes, Schema};
use pretty_assertions::assert_eq;

#[derive(Clone)]
struct AppState {
    tag: String,
}

#[derive(Object, Clone)]
struct Stats {
    followers: i64,
}

#[derive(Object)]
struct Profile {
    name: String,
    stats: Stats,
}

#[derive(Object)]
#[emberql(complex)]
struct Query {}

#[resolvers]
impl Query {
    fn profile(&self, ctx: Context<AppState>) -> Profile {
        let wants_followers = ctx.selection().field("stats").exists("followers");
        Profile {
            name: ctx.get().tag.clone(),
            stats: Stats {
                followers: if wants_followers { 42 } else { 0 },
            },
        }
    }
}

fn resolve(name: &str) -> Option<&'static emberql::CompiledType> {
    match name {
        "Profile" => Some(Profile::compiled()),
        "Stats" => Some(Stats::compiled()),
        _ => None,
    }
}

fn build_schema() -> Schema {
    let query: Arc<dyn ObjectAttributes> = Arc::new(Query {});
    Schema::new(
        Query::compiled(),
        None,
        None,
        query,
        None,
        None,
        resolve,
        |_| Vec::new(),
    )
    .expect("schema builds")
}

fn app_state(tag: &str) -> Arc<dyn std::any::Any + Send + Sync> {
    Arc::new(AppState { tag: tag.to_string() })
}

#[tokio::test]
async fn reads_caller_state_and_requested_selection() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(
            "{ profile { name stats { followers } } }",
            None,
            Some(app_state("agent")),
        )
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"profile": {"name": "agent", "stats": {"followers": 42}}})
    );
}

#[tokio::test]
async fn selection_graph_reflects_fields_actually_requested() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute("{ profile { name } }", None, Some(app_state("agent")))
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"profile": {"name": "agent"}})
    );
}

#[tokio::test]
async fn missing_context_surfaces_as_a_field_error() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute("{ profile { name } }", None, None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0]
        .message
        .contains("per-request context that was not supplied"));
}
