//! Handler for the `publish` command.

use std::time::Duration;

use serde_json::json;

use crate::adapter::inbound::cli::command::PublishArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::redis::publisher;
use crate::adapter::outbound::redis::settings::DEFAULT_CHANNEL;
use crate::error::Result;

/// Execute `publish`.
pub async fn execute(args: &PublishArgs) -> Result<()> {
    let config = config::load(&args.config)?;
    let channel = args
        .channel
        .clone()
        .or_else(|| config.bus.channels.first().cloned())
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

    let payloads: Vec<String> = if args.samples {
        publisher::sample_opportunities()
            .iter()
            .map(serde_json::Value::to_string)
            .collect()
    } else {
        let payload = args.payload.clone().unwrap_or_default();
        if serde_json::from_str::<serde_json::Value>(&payload).is_err() {
            output::warning("Payload is not valid JSON; the relay will drop it");
        }
        vec![payload]
    };

    output::section("Publish");
    output::field("Channel", &channel);

    let interval = Duration::from_secs(args.interval);
    let mut unheard = false;
    for (index, payload) in payloads.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(interval).await;
        }
        let receivers = publisher::publish(&config.bus, &channel, payload).await?;
        unheard |= receivers == 0;

        if output::is_json() {
            output::json_output(json!({
                "command": "publish",
                "channel": channel,
                "receivers": receivers,
                "payload": payload,
            }));
        } else {
            output::success(&format!(
                "Published to {} subscriber(s): {}",
                receivers,
                output::highlight(payload)
            ));
        }
    }

    if unheard {
        output::hint("nobody is subscribed to this channel; start `arbrelay run` first");
    }
    Ok(())
}
