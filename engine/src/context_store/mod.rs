//! Context Store
//!
//! Flat-file store for per-user context. Each key owns two files under the
//! base directory:
//!
//! - `<key>_historico.txt` - the raw text, UTF-8
//! - `<key>_metadata.json` - optional metadata, stamped with `timestamp` and
//!   `file_size` at save time
//!
//! The two writes are not atomic as a pair. There is no versioning and no
//! protection against concurrent writers.

use sdk::errors::EngineError;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const TEXT_SUFFIX: &str = "_historico.txt";
const METADATA_SUFFIX: &str = "_metadata.json";

/// One stored context as reported by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    /// File name of the text blob
    pub name: String,
    /// Size of the text blob in bytes
    pub size: u64,
    pub location: PathBuf,
}

impl ContextEntry {
    /// Size formatted in kilobytes, e.g. `1.50 KB`
    pub fn display_size(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

#[derive(Debug, Clone)]
pub struct ContextStore {
    base_dir: PathBuf,
}

impl ContextStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed
    pub async fn open(base_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn text_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}", key, TEXT_SUFFIX))
    }

    pub fn metadata_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}", key, METADATA_SUFFIX))
    }

    /// Save `text` under `key`, overwriting any previous value.
    ///
    /// When `metadata` is given it is written next to the text with
    /// `timestamp` (RFC 3339, local time) and `file_size` (bytes) added.
    pub async fn save(
        &self,
        key: &str,
        text: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<PathBuf, EngineError> {
        validate_key(key)?;
        fs::create_dir_all(&self.base_dir).await?;

        let path = self.text_path(key);
        fs::write(&path, text).await?;

        if let Some(mut metadata) = metadata {
            metadata.insert(
                "timestamp".to_string(),
                Value::String(chrono::Local::now().to_rfc3339()),
            );
            metadata.insert("file_size".to_string(), Value::from(text.len()));

            let json = serde_json::to_string_pretty(&Value::Object(metadata))?;
            fs::write(self.metadata_path(key), json).await?;
        }

        info!("Context saved: {}", path.display());
        Ok(path)
    }

    /// Load the text saved under `key`
    pub async fn load(&self, key: &str) -> Result<String, EngineError> {
        validate_key(key)?;
        let path = self.text_path(key);

        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::ContextNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load the metadata sidecar for `key`, if one was written
    pub async fn load_metadata(&self, key: &str) -> Result<Option<Value>, EngineError> {
        validate_key(key)?;

        match fs::read_to_string(self.metadata_path(key)).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All stored texts, sorted by file name
    pub async fn list(&self) -> Result<Vec<ContextEntry>, EngineError> {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut contexts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(TEXT_SUFFIX) {
                continue;
            }

            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }

            contexts.push(ContextEntry {
                name,
                size: meta.len(),
                location: entry.path(),
            });
        }

        contexts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(contexts)
    }

    /// Remove the text and metadata for `key`.
    ///
    /// Returns `true` if at least one file was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, EngineError> {
        validate_key(key)?;

        let mut removed = Vec::new();
        for path in [self.text_path(key), self.metadata_path(key)] {
            match fs::remove_file(&path).await {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if removed.is_empty() {
            debug!("No context files found for {}", key);
            Ok(false)
        } else {
            info!("Removed {} context file(s) for {}", removed.len(), key);
            Ok(true)
        }
    }

    /// Save an arbitrary named context file (a log, a source file, ...).
    ///
    /// `name` may contain subdirectories but must stay inside the base directory.
    pub async fn save_file(&self, name: &str, content: &str) -> Result<PathBuf, EngineError> {
        let relative = Path::new(name);
        let is_contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_contained {
            return Err(EngineError::InvalidContextKey(name.to_string()));
        }

        let path = self.base_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;

        info!("Context file saved: {}", path.display());
        Ok(path)
    }
}

/// Keys become file name prefixes, so they must be plain names.
fn validate_key(key: &str) -> Result<(), EngineError> {
    let invalid = key.is_empty() || key.contains(['/', '\\']) || key.contains("..");
    if invalid {
        return Err(EngineError::InvalidContextKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("usuario_123").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }

    #[test]
    fn test_display_size() {
        let entry = ContextEntry {
            name: "u1_historico.txt".to_string(),
            size: 1536,
            location: PathBuf::from("u1_historico.txt"),
        };
        assert_eq!(entry.display_size(), "1.50 KB");
    }

    #[tokio::test]
    async fn test_paths_follow_naming_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContextStore::open(dir.path()).await.unwrap();

        assert_eq!(store.text_path("u1"), dir.path().join("u1_historico.txt"));
        assert_eq!(store.metadata_path("u1"), dir.path().join("u1_metadata.json"));
    }
}
