//! One-shot Redis commands used by the CLI.

use std::time::Duration;

use tokio::time::timeout;

use super::settings::RedisSettings;
use crate::error::{Error, Result};

async fn open(settings: &RedisSettings) -> Result<redis::aio::MultiplexedConnection> {
    let client = redis::Client::open(settings.connection_info())?;
    let limit = Duration::from_millis(settings.connect_timeout_ms);
    timeout(limit, client.get_multiplexed_async_connection())
        .await
        .map_err(|_| {
            Error::Connection(format!(
                "timed out connecting to {} after {limit:?}",
                settings.display_url()
            ))
        })?
        .map_err(Error::from)
}

/// Round-trip a `PING` to the server.
pub async fn ping(settings: &RedisSettings) -> Result<String> {
    let mut conn = open(settings).await?;
    let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(reply)
}

/// Publish `payload` on `channel`. Returns how many clients received it.
pub async fn publish(settings: &RedisSettings, channel: &str, payload: &str) -> Result<i64> {
    let mut conn = open(settings).await?;
    let receivers: i64 = redis::cmd("PUBLISH")
        .arg(channel)
        .arg(payload)
        .query_async(&mut conn)
        .await?;
    Ok(receivers)
}

/// Sample opportunities for exercising a running relay end to end.
#[must_use]
pub fn sample_opportunities() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "exchange_buy": "Binance",
            "exchange_sell": "Coinbase",
            "symbol": "BTC/USDT",
            "buy_price": 50000.00,
            "sell_price": 50500.00,
            "profit_usd": 500.00,
            "profit_percentage": 1.0,
        }),
        serde_json::json!({
            "exchange_buy": "Kraken",
            "exchange_sell": "Bitfinex",
            "symbol": "ETH/USDT",
            "buy_price": 3000.00,
            "sell_price": 3045.00,
            "profit_usd": 45.00,
            "profit_percentage": 1.5,
        }),
        serde_json::json!({
            "exchange_buy": "Bybit",
            "exchange_sell": "OKX",
            "symbol": "SOL/USDT",
            "buy_price": 100.00,
            "sell_price": 102.50,
            "profit_usd": 2.50,
            "profit_percentage": 2.5,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_distinct_objects() {
        let samples = sample_opportunities();
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(serde_json::Value::is_object));
        assert_ne!(samples[0], samples[1]);
    }

    #[tokio::test]
    async fn test_ping_unreachable_server() {
        let settings = RedisSettings {
            host: "127.0.0.1".into(),
            port: 1,
            connect_timeout_ms: 500,
            ..Default::default()
        };
        assert!(ping(&settings).await.is_err());
    }
}
