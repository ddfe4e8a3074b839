//! spec.md §8 scenario 6: an interface field whose concrete return type
//! varies per invocation, dispatched by `__typename`.
//!
//! The codegen has no dedicated "interface value" wrapper the way
//! `#[derive(Union)]` gives enums one (spec.md §4.1 rule 6) -- an interface's
//! implementer set is open-ended, declared on the interface side via
//! `#[emberql(implementers(..))]` rather than enumerated as variants. A
//! resolver that wants to return *different* implementers from the same
//! field therefore reaches for the same escape hatch a plain object field
//! would: hand-write `GqlTypeSpec`/`IntoResolvedValue` for a small handle
//! type that tags the engine value with whichever concrete implementer was
//! actually constructed, the way `derive_union`'s generated match arms
//! forward into the chosen variant's own `IntoResolvedValue` impl.

use std::sync::Arc;

use emberql::{resolvers, GqlTypeSpec, Interface, IntoResolvedValue, Object, ObjectAttributes, ResolvedValue, Schema, TypeSpec};
use pretty_assertions::assert_eq;

#[derive(Object)]
#[emberql(implements(Letter))]
struct A {
    letter: String,
}

#[derive(Object)]
#[emberql(implements(Letter))]
struct B {
    letter: String,
}

#[derive(Interface)]
#[emberql(implementers(A, B))]
struct Letter {
    letter: String,
}

/// Hand-written handle tagging a concrete implementer's own attribute
/// reader with the GraphQL field's declared interface type ("Letter"),
/// without pinning the Rust return type to either `A` or `B`.
struct LetterHandle(Arc<dyn ObjectAttributes>);

impl GqlTypeSpec for LetterHandle {
    fn gql_type_spec(nullable: bool) -> TypeSpec {
        TypeSpec::Named {
            name: "Letter".to_string(),
            nullable,
        }
    }
}

impl IntoResolvedValue for LetterHandle {
    fn into_resolved_value(self) -> ResolvedValue {
        let type_name = self.0.type_name().to_string();
        ResolvedValue::object(type_name, self.0)
    }
}

#[derive(Object)]
#[emberql(complex)]
struct Query {}

#[resolvers]
impl Query {
    // GraphQL's `type` is a reserved word in Rust and has no per-argument
    // rename attribute here, so the argument is named `kind` instead of
    // spec.md's literal `type`.
    fn common(&self, kind: String) -> LetterHandle {
        let handle: Arc<dyn ObjectAttributes> = if kind == "A" {
            Arc::new(A {
                letter: "A".to_string(),
            })
        } else {
            Arc::new(B {
                letter: "B".to_string(),
            })
        };
        LetterHandle(handle)
    }
}

fn resolve(name: &str) -> Option<&'static emberql::CompiledType> {
    match name {
        "LetterHandle" => Some(Letter::compiled()),
        "A" => Some(A::compiled()),
        "B" => Some(B::compiled()),
        _ => None,
    }
}

fn implementers_of(name: &str) -> Vec<&'static emberql::CompiledType> {
    if name == "Letter" {
        <Letter as emberql::InterfaceType>::implementers()
    } else {
        Vec::new()
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
        implementers_of,
    )
    .expect("schema builds")
}

#[tokio::test]
async fn common_dispatches_to_the_a_implementer() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(r#"{ common(kind: "A") { letter } }"#, None, None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"common": {"letter": "A"}})
    );
}

#[tokio::test]
async fn common_dispatches_to_the_b_implementer() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(r#"{ common(kind: "B") { letter } }"#, None, None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"common": {"letter": "B"}})
    );
}

#[test]
fn the_sdl_declares_both_implementers() {
    let schema = build_schema();
    let sdl = schema.sdl();
    assert!(sdl.contains("interface Letter"));
    assert!(sdl.contains("type A implements Letter"));
    assert!(sdl.contains("type B implements Letter"));
}
