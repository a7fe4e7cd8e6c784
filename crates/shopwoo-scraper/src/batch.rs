//! Numbered batch files holding crawled product pages.
//!
//! Each file is one crawled page, named `shopify_products_NNN.json` and
//! shaped `{"products": [...]}`. Records are stored exactly as the
//! storefront returned them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScraperError;

const FILE_PREFIX: &str = "shopify_products_";
const FILE_SUFFIX: &str = ".json";

#[derive(Serialize)]
struct BatchFileRef<'a> {
    products: &'a [Value],
}

#[derive(Deserialize)]
struct BatchFile {
    #[serde(default)]
    products: Vec<Value>,
}

/// A directory of batch files.
#[derive(Debug, Clone)]
pub struct BatchStore {
    dir: PathBuf,
}

impl BatchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the batch file for `index` (1-based, zero-padded to three digits).
    #[must_use]
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{index:03}{FILE_SUFFIX}"))
    }

    /// Writes one batch, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the directory or file cannot be written.
    pub async fn save(&self, index: usize, products: &[Value]) -> Result<PathBuf, ScraperError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ScraperError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(index);
        let json = serde_json::to_vec_pretty(&BatchFileRef { products }).map_err(|source| {
            ScraperError::Deserialize {
                context: format!("encoding batch {index}"),
                source,
            }
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ScraperError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Lists existing batch files in index order.
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the directory exists but cannot be read.
    pub async fn list(&self) -> Result<Vec<PathBuf>, ScraperError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ScraperError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut batches: Vec<(usize, PathBuf)> = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| ScraperError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if let Some(index) = batch_index(&path) {
                batches.push((index, path));
            }
        }
        batches.sort_by_key(|(index, _)| *index);
        Ok(batches.into_iter().map(|(_, path)| path).collect())
    }

    /// Reads the raw product records from one batch file.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the file cannot be read, or
    /// [`ScraperError::Deserialize`] if it is not a batch document.
    pub async fn load(path: &Path) -> Result<Vec<Value>, ScraperError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ScraperError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let batch: BatchFile =
            serde_json::from_slice(&bytes).map_err(|source| ScraperError::Deserialize {
                context: format!("batch file {}", path.display()),
                source,
            })?;
        Ok(batch.products)
    }
}

/// Parses `NNN` out of `shopify_products_NNN.json`.
fn batch_index(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("shopwoo-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn path_for_pads_index() {
        let store = BatchStore::new("/tmp/export");
        assert_eq!(
            store.path_for(7),
            PathBuf::from("/tmp/export/shopify_products_007.json")
        );
        assert_eq!(
            store.path_for(1234),
            PathBuf::from("/tmp/export/shopify_products_1234.json")
        );
    }

    #[test]
    fn batch_index_ignores_foreign_files() {
        assert_eq!(batch_index(Path::new("a/shopify_products_012.json")), Some(12));
        assert_eq!(batch_index(Path::new("a/notes.json")), None);
        assert_eq!(batch_index(Path::new("a/shopify_products_x.json")), None);
    }

    #[tokio::test]
    async fn saved_batches_list_in_index_order_and_reload() {
        let dir = scratch_dir("batches");
        let store = BatchStore::new(&dir);

        store.save(10, &[json!({"id": 10})]).await.unwrap();
        store.save(2, &[json!({"id": 2}), json!({"id": 3})]).await.unwrap();
        tokio::fs::write(dir.join("README.txt"), b"not a batch")
            .await
            .unwrap();

        let files = store.list().await.unwrap();
        assert_eq!(files, vec![store.path_for(2), store.path_for(10)]);

        let products = BatchStore::load(&files[0]).await.unwrap();
        assert_eq!(products, vec![json!({"id": 2}), json!({"id": 3})]);

        let raw = tokio::fs::read_to_string(&files[1]).await.unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc, json!({"products": [{"id": 10}]}));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn list_of_missing_directory_is_empty() {
        let store = BatchStore::new(scratch_dir("missing"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_rejects_non_batch_document() {
        let dir = scratch_dir("bad");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("shopify_products_001.json");
        tokio::fs::write(&path, b"[1, 2, 3]").await.unwrap();

        let err = BatchStore::load(&path).await.unwrap_err();
        assert!(matches!(err, ScraperError::Deserialize { .. }), "got {err:?}");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
