//! spec.md §8 scenario 5: a resolver field returning a union of object
//! types, selected by inline fragment.

use std::sync::Arc;

use emberql::{resolvers, Object, ObjectAttributes, Schema, Union};
use pretty_assertions::assert_eq;

#[derive(Object)]
struct A {
    a: i64,
}

#[derive(Object)]
struct B {
    b: i64,
}

#[derive(Union)]
enum NamedAB {
    A(A),
    B(B),
}

#[derive(Object)]
#[emberql(complex)]
struct Query {}

#[resolvers]
impl Query {
    // GraphQL's `type` is a reserved word in Rust and has no per-argument
    // rename attribute here, so the argument is named `kind` instead of
    // spec.md's literal `type`.
    fn named(&self, kind: String) -> NamedAB {
        if kind == "A" {
            NamedAB::A(A { a: 1 })
        } else {
            NamedAB::B(B { b: 2 })
        }
    }
}

fn resolve(name: &str) -> Option<&'static emberql::CompiledType> {
    match name {
        "A" => Some(A::compiled()),
        "B" => Some(B::compiled()),
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

#[tokio::test]
async fn selecting_the_a_member() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(
            r#"{ named(kind: "A") { ... on A { a } ... on B { b } } }"#,
            None,
            None,
        )
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.data, serde_json::json!({"named": {"a": 1}}));
}

#[tokio::test]
async fn selecting_the_b_member() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(
            r#"{ named(kind: "B") { ... on A { a } ... on B { b } } }"#,
            None,
            None,
        )
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.data, serde_json::json!({"named": {"b": 2}}));
}

#[test]
fn both_members_appear_in_the_sdl() {
    let schema = build_schema();
    let sdl = schema.sdl();
    assert!(sdl.contains("union NamedAB = A | B") || sdl.contains("union NamedAB ="));
    assert!(sdl.contains("type A"));
    assert!(sdl.contains("type B"));
}
