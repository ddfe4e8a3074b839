//! spec.md §8 scenario 2: a resolver field with a required argument and an
//! optional one.

use std::sync::Arc;

use emberql::{resolvers, Object, ObjectAttributes, Schema};
use pretty_assertions::assert_eq;

#[derive(Object)]
#[emberql(complex)]
struct Query {}

#[resolvers]
impl Query {
    fn hello(&self, name: String, title: Option<String>) -> String {
        match title {
            Some(title) => format!("Hello {title} {name}!"),
            None => format!("Hello {name}!"),
        }
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
        |_| None,
        |_| Vec::new(),
    )
    .expect("schema builds")
}

#[tokio::test]
async fn required_argument_alone() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(r#"{ hello(name: "Gromit") }"#, None, None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.data, serde_json::json!({"hello": "Hello Gromit!"}));
}

#[tokio::test]
async fn required_and_optional_argument() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(r#"{ hello(name: "Gromit", title: "Mr.") }"#, None, None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"hello": "Hello Mr. Gromit!"})
    );
}
