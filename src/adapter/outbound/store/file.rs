//! JSON file subscriber persistence.
//!
//! The whole list is rewritten on every save using write-to-temp-then-rename,
//! so a crash mid-write leaves the previous file intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SubscriberId;
use crate::error::{Error, Result};
use crate::port::outbound::persistence::SubscriberPersistence;

/// Current file format version.
const FILE_VERSION: u32 = 1;

/// On-disk layout.
#[derive(Debug, Serialize, Deserialize)]
struct SubscriberFile {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    subscribers: Vec<SubscriberId>,
}

/// Accepts the versioned layout and a bare array of chat ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFormat {
    Versioned(SubscriberFile),
    Bare(Vec<SubscriberId>),
}

/// Stores subscribers in a JSON file.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this backend reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubscriberPersistence for JsonFileBackend {
    fn load(&self) -> Result<Vec<SubscriberId>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<StoredFormat>(&content) {
            Ok(StoredFormat::Versioned(file)) if file.version > FILE_VERSION => Err(Error::Store(
                format!("unsupported subscriber file version {}", file.version),
            )),
            Ok(StoredFormat::Versioned(file)) => Ok(file.subscribers),
            Ok(StoredFormat::Bare(subscribers)) => Ok(subscribers),
            Err(e) => Err(Error::Store(format!("corrupt subscriber file: {e}"))),
        }
    }

    #[allow(clippy::result_large_err)]
    fn save(&self, subscribers: &[SubscriberId]) -> Result<()> {
        let json = serde_json::to_string_pretty(&SubscriberFile {
            version: FILE_VERSION,
            updated_at: Some(Utc::now()),
            subscribers: subscribers.to_vec(),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(raw: i64) -> SubscriberId {
        SubscriberId::new(raw)
    }

    fn backend(dir: &TempDir) -> JsonFileBackend {
        JsonFileBackend::new(dir.path().join("subscribers.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(backend(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);

        backend.save(&[id(111), id(-1002233)]).unwrap();

        assert_eq!(backend.load().unwrap(), vec![id(111), id(-1002233)]);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        backend.save(&[id(42)]).unwrap();

        let raw = fs::read_to_string(backend.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["subscribers"], serde_json::json!([42]));
        assert!(value["updated_at"].is_string());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        backend.save(&[id(1)]).unwrap();

        assert!(!backend.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/state/subscribers.json"));

        backend.save(&[id(7)]).unwrap();
        assert_eq!(backend.load().unwrap(), vec![id(7)]);
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        fs::write(backend.path(), "[5, 6]").unwrap();

        assert_eq!(backend.load().unwrap(), vec![id(5), id(6)]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        fs::write(backend.path(), "{\"version\": 1, \"subscri").unwrap();

        assert!(matches!(backend.load(), Err(Error::Store(_))));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        fs::write(backend.path(), r#"{"version": 2, "subscribers": [1]}"#).unwrap();

        assert!(backend.load().is_err());
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        fs::write(backend.path(), "  \n").unwrap();

        assert!(backend.load().unwrap().is_empty());
    }
}
