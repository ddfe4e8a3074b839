//! spec.md §8 scenario 3: a mutation taking a nested input object.

use std::sync::Arc;

use emberql::{resolvers, InputObject, Object, ObjectAttributes, Schema};
use pretty_assertions::assert_eq;

#[derive(Object)]
struct Query {
    #[emberql(default = "Hello world!")]
    greeting: String,
}

#[derive(InputObject)]
struct AddUserInput {
    name: String,
    title: Option<String>,
}

#[derive(Object)]
struct User {
    greeting: String,
}

#[derive(Object)]
#[emberql(complex)]
struct Mutation {}

#[resolvers]
impl Mutation {
    fn add_user(&self, input: AddUserInput) -> User {
        let title = input
            .title
            .map(|t| format!("{t} "))
            .unwrap_or_default();
        User {
            greeting: format!("Hello {title}{}.", input.name),
        }
    }
}

fn resolve(name: &str) -> Option<&'static emberql::CompiledType> {
    match name {
        "AddUserInput" => Some(AddUserInput::compiled()),
        "User" => Some(User::compiled()),
        _ => None,
    }
}

fn build_schema() -> Schema {
    let query: Arc<dyn ObjectAttributes> = Arc::new(Query {
        greeting: String::new(),
    });
    let mutation: Arc<dyn ObjectAttributes> = Arc::new(Mutation {});
    Schema::new(
        Query::compiled(),
        Some(Mutation::compiled()),
        None,
        query,
        Some(mutation),
        None,
        resolve,
        |_| Vec::new(),
    )
    .expect("schema builds")
}

#[tokio::test]
async fn add_user_resolves_nested_input_fields() {
    let schema = build_schema();
    let mutation = r#"
        mutation AddUser($name: String!, $title: String) {
            addUser(input: { name: $name, title: $title }) {
                greeting
            }
        }
    "#;
    let variables = serde_json::json!({"name": "Gromit", "title": "Mr."});

    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(mutation, Some(variables), None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"addUser": {"greeting": "Hello Mr. Gromit."}})
    );
}

#[tokio::test]
async fn add_user_without_the_optional_title() {
    let schema = build_schema();
    let mutation = r#"
        mutation AddUser($name: String!) {
            addUser(input: { name: $name }) {
                greeting
            }
        }
    "#;
    let variables = serde_json::json!({"name": "Gromit"});

    let emberql::ExecutionOutcome::Operation(result) = schema
        .execute(mutation, Some(variables), None)
        .await
    else {
        panic!("expected an operation result");
    };

    assert_eq!(result.errors.len(), 0);
    assert_eq!(
        result.data,
        serde_json::json!({"addUser": {"greeting": "Hello Gromit."}})
    );
}
