//! spec.md §8 scenario 1: a plain data field declaring a literal default.

use std::sync::Arc;

use emberql::{Object, ObjectAttributes, Schema};
use pretty_assertions::assert_eq;

#[derive(Object)]
struct Query {
    #[emberql(default = "Hello world!")]
    greeting: String,
}

fn build_schema() -> Schema {
    let query: Arc<dyn ObjectAttributes> = Arc::new(Query {
        greeting: String::new(),
    });
    Schema::new(
        Query::compiled(),
        None,
        None,
        query,
        None,
        None,
        |_| None,
        |_| Vec::new(),
    )
    .expect("schema builds")
}

#[tokio::test]
async fn greeting_resolves_from_its_declared_default() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) =
        schema.execute("{ greeting }", None, None).await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.data, serde_json::json!({"greeting": "Hello world!"}));
}

#[test]
fn query_root_without_a_default_is_rejected_at_schema_build() {
    #[derive(Object)]
    struct BareQuery {
        greeting: String,
    }

    let query: Arc<dyn ObjectAttributes> = Arc::new(BareQuery {
        greeting: String::new(),
    });
    let err = Schema::new(
        BareQuery::compiled(),
        None,
        None,
        query,
        None,
        None,
        |_| None,
        |_| Vec::new(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        emberql::SchemaBuildError::QueryRootFieldMissingDefault { .. }
    ));
}
