mod support;

use std::fs;
use std::sync::Arc;

use arbrelay::adapter::outbound::store::JsonFileBackend;
use arbrelay::application::SubscriberStore;
use arbrelay::domain::{BroadcastReport, DeliveryOutcome};
use arbrelay::port::inbound::subscription::SubscriptionControl;
use tempfile::TempDir;

use support::{id, ids};

fn open(dir: &TempDir) -> SubscriberStore {
    let backend = JsonFileBackend::new(dir.path().join("subscribers.json"));
    SubscriberStore::open(Arc::new(backend))
}

#[test]
fn subscribers_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let store = open(&dir);
    assert!(store.is_empty());
    store.add(id(111));
    store.add(id(-1001234567));
    drop(store);

    let reopened = open(&dir);
    assert_eq!(reopened.all(), ids(&[-1001234567, 111]));
}

#[test]
fn final_set_is_net_of_adds_and_removes() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    assert!(store.add(id(1)));
    assert!(store.add(id(2)));
    assert!(!store.add(id(1)));
    assert!(store.remove(id(1)));
    assert!(!store.remove(id(9)));
    assert!(store.add(id(3)));
    drop(store);

    assert_eq!(open(&dir).all(), ids(&[2, 3]));
}

#[test]
fn corrupt_file_opens_empty_and_is_replaced_on_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subscribers.json");
    fs::write(&path, "{not json").unwrap();

    let store = open(&dir);
    assert!(store.is_empty());

    store.add(id(5));
    drop(store);
    assert_eq!(open(&dir).all(), ids(&[5]));
}

#[test]
fn pruned_subscribers_are_persisted() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    for raw in [1, 2, 3] {
        store.add(id(raw));
    }

    let report = BroadcastReport::new(vec![
        (id(1), DeliveryOutcome::Delivered),
        (
            id(2),
            DeliveryOutcome::PermanentFailure {
                reason: "recipient blocked the bot".into(),
            },
        ),
        (
            id(3),
            DeliveryOutcome::SoftFailure {
                reason: "network error".into(),
            },
        ),
    ]);
    assert_eq!(store.apply_outcomes(&report), ids(&[2]));
    drop(store);

    assert_eq!(open(&dir).all(), ids(&[1, 3]));
}

#[test]
fn subscription_control_reports_changes() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    assert!(store.subscribe(id(42)));
    assert!(!store.subscribe(id(42)));
    assert!(store.is_subscribed(id(42)));
    assert_eq!(store.subscriber_count(), 1);
    assert!(store.unsubscribe(id(42)));
    assert!(!store.is_subscribed(id(42)));
}

#[test]
fn legacy_bare_array_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("subscribers.json"), "[111, 222]").unwrap();

    assert_eq!(open(&dir).all(), ids(&[111, 222]));
}
