use std::sync::Arc;

use super::TopicRegistry;
use super::topic::Topic;
use crate::client::{Client, ClientId, Outbound};
use crate::utils::error::{DeliveryError, RegistryError};
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn register(registry: &TopicRegistry) -> (ClientId, UnboundedReceiver<Outbound>) {
    let (tx, rx) = mpsc::unbounded_channel::<Outbound>();
    let client = Client::new("127.0.0.1:5000".parse().unwrap(), tx);
    let id = client.id;
    registry.add_client(client);
    (id, rx)
}

fn pushes(rx: &mut UnboundedReceiver<Outbound>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        match msg {
            Outbound::Push(text) => out.push(text),
            other => panic!("Expected a push, got {other:?}"),
        }
    }
    out
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("test_topic");
    assert_eq!(topic.name, "test_topic");
    assert!(topic.subscribers.is_empty());
}

#[test]
fn test_topic_subscribe_is_idempotent() {
    let mut topic = Topic::new("test_topic");
    let id = ClientId::new();
    assert!(topic.subscribe(id));
    assert!(!topic.subscribe(id));
    assert_eq!(topic.subscribers.len(), 1);
}

#[test]
fn test_topic_unsubscribe() {
    let mut topic = Topic::new("test_topic");
    let id = ClientId::new();
    topic.subscribe(id);
    assert!(topic.unsubscribe(&id));
    assert!(!topic.unsubscribe(&id));
    assert!(topic.is_empty());
}

#[test]
fn test_registry_new() {
    let registry = TopicRegistry::new();
    assert_eq!(registry.client_count(), 0);
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_register_and_remove_client() {
    let registry = TopicRegistry::new();
    let (id, _rx) = register(&registry);
    assert_eq!(registry.client_count(), 1);

    assert!(registry.remove_client(&id));
    assert_eq!(registry.client_count(), 0);
}

#[test]
fn test_add_client_twice_is_noop() {
    let registry = TopicRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel::<Outbound>();
    let client = Client::new("127.0.0.1:5000".parse().unwrap(), tx);
    registry.add_client(client.clone());
    registry.add_client(client);
    assert_eq!(registry.client_count(), 1);
}

#[test]
fn test_remove_absent_client_is_silent() {
    let registry = TopicRegistry::new();
    assert!(!registry.remove_client(&ClientId::new()));

    let (id, _rx) = register(&registry);
    assert!(registry.remove_client(&id));
    assert!(!registry.remove_client(&id));
}

#[test]
fn test_subscribe_and_unsubscribe() {
    let registry = TopicRegistry::new();
    let (id, _rx) = register(&registry);

    assert_eq!(registry.subscribe("test_topic", id), Ok(true));
    assert_eq!(registry.subscribers("test_topic"), vec![id]);

    assert!(registry.unsubscribe("test_topic", &id));
    assert!(registry.subscribers("test_topic").is_empty());
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_resubscribe_is_noop() {
    let registry = TopicRegistry::new();
    let (id, _rx) = register(&registry);

    assert_eq!(registry.subscribe("news", id), Ok(true));
    assert_eq!(registry.subscribe("news", id), Ok(false));
    assert_eq!(registry.subscribers("news"), vec![id]);
}

#[test]
fn test_subscribe_unknown_client_is_rejected() {
    let registry = TopicRegistry::new();
    let stranger = ClientId::new();
    assert_eq!(
        registry.subscribe("news", stranger),
        Err(RegistryError::UnknownClient(stranger))
    );
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_unsubscribe_when_absent_is_noop() {
    let registry = TopicRegistry::new();
    let (a, _rx_a) = register(&registry);
    let (b, _rx_b) = register(&registry);

    assert!(!registry.unsubscribe("missing", &a));

    registry.subscribe("news", b).unwrap();
    assert!(!registry.unsubscribe("news", &a));
    assert_eq!(registry.subscribers("news"), vec![b]);
}

#[test]
fn test_membership_follows_program_order() {
    let registry = TopicRegistry::new();
    let (id, _rx) = register(&registry);

    registry.subscribe("t", id).unwrap();
    registry.subscribe("t", id).unwrap();
    registry.unsubscribe("t", &id);
    assert!(registry.subscribers("t").is_empty());

    registry.unsubscribe("t", &id);
    registry.subscribe("t", id).unwrap();
    assert_eq!(registry.subscribers("t"), vec![id]);
}

#[test]
fn test_remove_client_drops_every_subscription() {
    let registry = TopicRegistry::new();
    let (a, _rx_a) = register(&registry);
    let (b, _rx_b) = register(&registry);

    registry.subscribe("news", a).unwrap();
    registry.subscribe("sports", a).unwrap();
    registry.subscribe("news", b).unwrap();

    registry.remove_client(&a);
    assert_eq!(registry.subscribers("news"), vec![b]);
    assert!(registry.subscribers("sports").is_empty());
    assert_eq!(registry.topic_count(), 1);
}

#[test]
fn test_list_connected_clients_is_a_snapshot() {
    let registry = TopicRegistry::new();
    let (a, _rx_a) = register(&registry);
    let (b, _rx_b) = register(&registry);

    let snapshot = registry.list_connected_clients();
    registry.remove_client(&a);

    let ids: Vec<ClientId> = snapshot.iter().map(|info| info.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a) && ids.contains(&b));
    assert_eq!(registry.list_connected_clients().len(), 1);
}

#[test]
fn test_fan_out_excludes_publisher() {
    let registry = TopicRegistry::new();
    let (publisher, mut rx_pub) = register(&registry);
    let (subscriber, mut rx_sub) = register(&registry);
    registry.subscribe("news", publisher).unwrap();
    registry.subscribe("news", subscriber).unwrap();

    let outcomes = registry.fan_out("news", "hello", &publisher);
    assert_eq!(outcomes, vec![(subscriber, Ok(()))]);

    assert_eq!(pushes(&mut rx_sub), vec!["hello".to_string()]);
    assert!(pushes(&mut rx_pub).is_empty());
}

#[test]
fn test_fan_out_to_nonexistent_topic() {
    let registry = TopicRegistry::new();
    let (id, _rx) = register(&registry);
    assert!(registry.fan_out("nonexistent_topic", "hello", &id).is_empty());
}

#[test]
fn test_fan_out_never_reaches_removed_client() {
    let registry = TopicRegistry::new();
    let (publisher, _rx_pub) = register(&registry);
    let (gone, mut rx_gone) = register(&registry);
    registry.subscribe("news", gone).unwrap();
    registry.subscribe("sports", gone).unwrap();

    registry.remove_client(&gone);

    assert!(registry.fan_out("news", "hello", &publisher).is_empty());
    assert!(registry.fan_out("sports", "hello", &publisher).is_empty());
    assert!(pushes(&mut rx_gone).is_empty());
}

#[test]
fn test_fan_out_to_closed_channel_reports_and_removes() {
    let registry = TopicRegistry::new();
    let (publisher, _rx_pub) = register(&registry);
    let (dead, rx_dead) = register(&registry);
    let (alive, mut rx_alive) = register(&registry);
    registry.subscribe("news", dead).unwrap();
    registry.subscribe("news", alive).unwrap();

    // Drop the receiver to close the channel
    drop(rx_dead);

    let mut outcomes = registry.fan_out("news", "hello", &publisher);
    outcomes.sort_by_key(|(id, _)| *id == alive);
    assert_eq!(
        outcomes,
        vec![
            (dead, Err(DeliveryError::SubscriberUnreachable(dead))),
            (alive, Ok(())),
        ]
    );

    assert_eq!(pushes(&mut rx_alive), vec!["hello".to_string()]);
    assert_eq!(registry.subscribers("news"), vec![alive]);
    assert_eq!(registry.client_count(), 2);
}

#[test]
fn test_fan_out_preserves_publish_order() {
    let registry = TopicRegistry::new();
    let (publisher, _rx_pub) = register(&registry);
    let (subscriber, mut rx_sub) = register(&registry);
    registry.subscribe("news", subscriber).unwrap();

    for n in 0..5 {
        registry.fan_out("news", &format!("msg {n}"), &publisher);
    }

    let expected: Vec<String> = (0..5).map(|n| format!("msg {n}")).collect();
    assert_eq!(pushes(&mut rx_sub), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_subscribes_are_not_lost() {
    let registry = Arc::new(TopicRegistry::new());
    let mut receivers = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..32 {
        let (id, rx) = register(&registry);
        ids.push(id);
        receivers.push(rx);
    }

    let tasks = ids.iter().map(|id| {
        let registry = registry.clone();
        let id = *id;
        tokio::spawn(async move { registry.subscribe("t", id) })
    });
    for outcome in futures::future::join_all(tasks).await {
        assert_eq!(outcome.unwrap(), Ok(true));
    }

    let mut subscribers = registry.subscribers("t");
    subscribers.sort();
    ids.sort();
    assert_eq!(subscribers, ids);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_remove_and_subscribe_keep_invariants() {
    let registry = Arc::new(TopicRegistry::new());
    let mut receivers = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..16 {
        let (id, rx) = register(&registry);
        ids.push(id);
        receivers.push(rx);
    }

    let tasks = ids.iter().enumerate().map(|(n, id)| {
        let registry = registry.clone();
        let id = *id;
        tokio::spawn(async move {
            for topic in ["a", "b", "c"] {
                let _ = registry.subscribe(topic, id);
            }
            if n % 2 == 0 {
                registry.remove_client(&id);
            }
        })
    });
    futures::future::join_all(tasks).await;

    let connected: Vec<ClientId> = registry
        .list_connected_clients()
        .iter()
        .map(|info| info.id)
        .collect();
    assert_eq!(connected.len(), 8);
    for topic in ["a", "b", "c"] {
        let subscribers = registry.subscribers(topic);
        assert_eq!(subscribers.len(), 8);
        assert!(subscribers.iter().all(|id| connected.contains(id)));
    }
}
