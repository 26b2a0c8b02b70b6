//! Handler for the `subscribers` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{config, output};
use crate::application::SubscriberStore;
use crate::domain::SubscriberId;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_persistence;

fn open(config_path: &Path) -> Result<SubscriberStore> {
    let config = config::load(config_path)?;
    if config.store.ephemeral {
        output::warning("Store is ephemeral; changes will not be persisted");
    }
    Ok(SubscriberStore::open(build_persistence(&config)))
}

/// Execute `subscribers list`.
pub fn execute_list(config_path: &Path) -> Result<()> {
    let store = open(config_path)?;
    let mut subscribers = store.all();
    subscribers.sort();

    if output::is_json() {
        output::json_output(json!({
            "command": "subscribers.list",
            "count": subscribers.len(),
            "subscribers": subscribers,
        }));
        return Ok(());
    }

    output::section("Subscribers");
    output::field("Count", subscribers.len());
    for subscriber in &subscribers {
        output::note(&subscriber.to_string());
    }
    Ok(())
}

/// Execute `subscribers add`.
pub fn execute_add(config_path: &Path, chat_id: i64) -> Result<()> {
    let store = open(config_path)?;
    let subscriber = SubscriberId::new(chat_id);
    let added = store.add(subscriber);
    store.flush();

    report("subscribers.add", subscriber, added, "Added", "Already subscribed");
    Ok(())
}

/// Execute `subscribers remove`.
pub fn execute_remove(config_path: &Path, chat_id: i64) -> Result<()> {
    let store = open(config_path)?;
    let subscriber = SubscriberId::new(chat_id);
    let removed = store.remove(subscriber);
    store.flush();

    report("subscribers.remove", subscriber, removed, "Removed", "Not subscribed");
    Ok(())
}

fn report(command: &str, subscriber: SubscriberId, changed: bool, done: &str, noop: &str) {
    if output::is_json() {
        output::json_output(json!({
            "command": command,
            "chat_id": subscriber,
            "changed": changed,
        }));
        return;
    }

    if changed {
        output::success(&format!("{done} {}", output::highlight(subscriber)));
    } else {
        output::note(&format!("{noop}: {subscriber}"));
    }
}
