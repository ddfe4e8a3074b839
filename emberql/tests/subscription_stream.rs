//! spec.md §8 scenario 4: a subscription generator yielding a fixed number
//! of items, then terminating.

use std::sync::Arc;

use emberql::{subscription_resolvers, Object, ObjectAttributes, Schema, Subscription};
use futures::{Stream, StreamExt};
use pretty_assertions::assert_eq;

#[derive(Object)]
struct Query {
    #[emberql(default = "Hello world!")]
    greeting: String,
}

#[derive(Subscription)]
struct SubscriptionRoot;

#[subscription_resolvers]
impl SubscriptionRoot {
    fn counter(&self, limit: i64) -> impl Stream<Item = i64> {
        futures::stream::iter(0..limit)
    }
}

fn build_schema() -> Schema {
    let query: Arc<dyn ObjectAttributes> = Arc::new(Query {
        greeting: String::new(),
    });
    let subscription: Arc<dyn ObjectAttributes> = Arc::new(SubscriptionRoot);
    Schema::new(
        Query::compiled(),
        None,
        Some(SubscriptionRoot::compiled()),
        query,
        None,
        Some(subscription),
        |_| None,
        |_| Vec::new(),
    )
    .expect("schema builds")
}

#[tokio::test]
async fn counter_emits_three_items_then_terminates() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Subscription(mut stream) = schema
        .execute("subscription { counter(limit: 3) }", None, None)
        .await
    else {
        panic!("expected a subscription stream");
    };

    let mut payloads = Vec::new();
    while let Some(item) = stream.next().await {
        assert_eq!(item.errors.len(), 0);
        payloads.push(item.data);
    }

    assert_eq!(
        payloads,
        vec![
            serde_json::json!({"counter": 0}),
            serde_json::json!({"counter": 1}),
            serde_json::json!({"counter": 2}),
        ]
    );
}

#[tokio::test]
async fn counter_with_limit_zero_terminates_immediately() {
    let schema = build_schema();
    let emberql::ExecutionOutcome::Subscription(mut stream) = schema
        .execute("subscription { counter(limit: 0) }", None, None)
        .await
    else {
        panic!("expected a subscription stream");
    };

    assert!(stream.next().await.is_none());
}
