//! # JSON Documents
//!
//! Every entity lives in one pretty-printed JSON file inside the data
//! directory. A [`JsonDocument`] reads the whole file, hands back a value,
//! and writes the whole value back.
//!
//! ## Read Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  file state     │ load() (strict)          │ load_or_empty() (lenient) │
//! │─────────────────┼──────────────────────────┼───────────────────────────│
//! │  missing        │ T::default()             │ T::default()              │
//! │  valid JSON     │ parsed value             │ parsed value              │
//! │  corrupt        │ Err(StoreError::Corrupt) │ warn! + T::default()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Anything that writes back uses the strict read, so a corrupt file is
//! never replaced by an empty collection.
//!
//! ## Atomic Writes
//! ```text
//!   value ──► .inventario.json.<uuid>.tmp ──rename──► inventario.json
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A typed JSON file.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonDocument {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Strict read: a missing file is an empty document, a corrupt one is
    /// an error.
    pub async fn load(&self) -> StoreResult<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Document missing, using default");
                return Ok(T::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        // An empty file is treated like a missing one
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }

        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&self.path, e))
    }

    /// Lenient read for display paths: any failure degrades to an empty
    /// document.
    pub async fn load_or_empty(&self) -> T {
        match self.load().await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable document, continuing with empty data");
                T::default()
            }
        }
    }

    /// Writes the whole document (4-space indent) via temp file + rename.
    pub async fn save(&self, value: &T) -> StoreResult<()> {
        let bytes = to_pretty_json(value)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Document saved");
        Ok(())
    }

    /// Strict read, apply `f`, write back only if `f` succeeded.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let product = store.products().update(|catalog| {
    ///     caja_core::inventory::restock(catalog, "A1", 10, &update, today).cloned()
    /// }).await?;
    /// ```
    pub async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut value = self.load().await?;
        let result = f(&mut value)?;
        self.save(&value).await?;
        Ok(result)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Store, StoreConfig};

    /// A document in a fresh directory; the directory goes away with the store.
    async fn doc(name: &str) -> (JsonDocument<Vec<String>>, Store) {
        let store = Store::open(StoreConfig::temporary().initialize(false))
            .await
            .unwrap();
        (JsonDocument::new(store.file(name)), store)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (doc, _store) = doc("missing.json").await;
        assert!(!doc.exists().await);
        assert!(doc.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_uses_four_space_indent() {
        let (doc, _store) = doc("items.json").await;
        doc.save(&vec!["a".to_string(), "b".to_string()]).await.unwrap();

        let text = std::fs::read_to_string(doc.path()).unwrap();
        assert!(text.contains("\n    \"a\""));
        assert_eq!(doc.load().await.unwrap(), vec!["a", "b"]);

        // No temp files left behind
        let dir = doc.path().parent().unwrap();
        let leftovers = std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_strict_vs_lenient() {
        let (doc, _store) = doc("broken.json").await;
        std::fs::write(doc.path(), "{ not json").unwrap();

        assert!(matches!(doc.load().await, Err(StoreError::Corrupt { .. })));
        assert!(doc.load_or_empty().await.is_empty());

        // A failed update must leave the file untouched
        let result: StoreResult<()> = doc
            .update(|v| {
                v.push("x".to_string());
                Ok(())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(doc.path()).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_update_skips_write_when_closure_fails() {
        let (doc, _store) = doc("guarded.json").await;
        doc.save(&vec!["keep".to_string()]).await.unwrap();

        let result: StoreResult<()> = doc
            .update(|v| {
                v.clear();
                Err(StoreError::duplicate("item", "keep"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(doc.load().await.unwrap(), vec!["keep"]);
    }
}
