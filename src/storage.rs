//! Persistence of the stage handoff artifact and the harvest outputs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::model::OpportunityId;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Input file not found: {} (run the identifier collector first)", .path.display())]
    MissingInput { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered identifiers handed from the collector to the detail harvester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierBatch(pub Vec<OpportunityId>);

impl IdentifierBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpportunityId> {
        self.0.iter()
    }
}

impl From<Vec<OpportunityId>> for IdentifierBatch {
    fn from(ids: Vec<OpportunityId>) -> Self {
        Self(ids)
    }
}

impl<S: Into<OpportunityId>> FromIterator<S> for IdentifierBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Any medium that can hold an [`IdentifierBatch`] between stages.
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    async fn save(&self, batch: &IdentifierBatch) -> Result<(), StorageError>;

    async fn load(&self) -> Result<IdentifierBatch, StorageError>;
}

/// Stores the batch as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IdentifierStore for JsonFileStore {
    async fn save(&self, batch: &IdentifierBatch) -> Result<(), StorageError> {
        write_json(&self.path, batch).await?;
        info!(count = batch.len(), path = %self.path.display(), "Saved opportunity ids");
        Ok(())
    }

    async fn load(&self) -> Result<IdentifierBatch, StorageError> {
        let exists = fs::try_exists(&self.path).await.map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        if !exists {
            return Err(StorageError::MissingInput {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

/// Writes `value` as pretty JSON, creating the parent directory if absent.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).await.map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_creates_directory_and_round_trips_order() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/ids.json"));
        let batch: IdentifierBatch = ["300", "100", "200"].into_iter().collect();

        store.save(&batch).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["300", "100", "200"]);
        assert_eq!(store.load().await.unwrap(), batch);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails_fast() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StorageError::MissingInput { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
    }
}
