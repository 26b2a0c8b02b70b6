//! Subscriber store location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::adapter::inbound::cli::paths;

/// Where the subscriber list is persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file holding the subscriber list.
    #[serde(default = "paths::default_subscribers")]
    pub path: PathBuf,
    /// Keep subscribers in memory only; nothing is read or written.
    #[serde(default)]
    pub ephemeral: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: paths::default_subscribers(),
            ephemeral: false,
        }
    }
}
