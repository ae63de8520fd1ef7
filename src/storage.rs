// SPDX-License-Identifier: MPL-2.0

//! Persisted local state
//!
//! The state directory holds three files:
//! - `session.json`: id of the last orthomosaic
//! - `origin.json`: reference point metadata of the last orthomosaic
//! - `orthomosaic.png`: last downloaded orthomosaic image
//!
//! The image is written and read under the same name.

use crate::constants::{ORIGIN_FILE_NAME, ORTHOMOSAIC_FILE_NAME, SESSION_FILE_NAME};
use crate::errors::{AppError, AppResult};
use crate::orthomosaic::OrthomosaicMetadata;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    orthomosaic_id: Option<String>,
}

/// File-backed store rooted at the state directory
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn origin_path(&self) -> PathBuf {
        self.dir.join(ORIGIN_FILE_NAME)
    }

    pub fn orthomosaic_path(&self) -> PathBuf {
        self.dir.join(ORTHOMOSAIC_FILE_NAME)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }

    /// Load the session; missing files yield an empty session
    pub async fn load_session(&self) -> AppResult<Session> {
        let file: SessionFile = read_json(&self.session_path()).await?.unwrap_or_default();
        let metadata = self.load_origin().await?;
        let orthomosaic_id = file
            .orthomosaic_id
            .or_else(|| metadata.as_ref().map(|m| m.id.clone()));
        // origin.json may describe an older orthomosaic than session.json
        let orthomosaic_metadata = metadata.filter(|m| orthomosaic_id.as_deref() == Some(m.id.as_str()));
        Ok(Session {
            orthomosaic_id,
            orthomosaic_metadata,
        })
    }

    /// Persist the session; origin metadata is only written when known
    pub async fn save_session(&self, session: &Session) -> AppResult<()> {
        let file = SessionFile {
            orthomosaic_id: session.orthomosaic_id.clone(),
        };
        write_json(&self.dir, &self.session_path(), &file).await?;
        if let Some(metadata) = &session.orthomosaic_metadata {
            self.save_origin(metadata).await?;
        }
        Ok(())
    }

    pub async fn load_origin(&self) -> AppResult<Option<OrthomosaicMetadata>> {
        read_json(&self.origin_path()).await
    }

    pub async fn save_origin(&self, metadata: &OrthomosaicMetadata) -> AppResult<()> {
        write_json(&self.dir, &self.origin_path(), metadata).await
    }

    /// Write the downloaded orthomosaic, returning its path
    pub async fn save_orthomosaic(&self, image_bytes: &[u8]) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.orthomosaic_path();
        tokio::fs::write(&path, image_bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), size = image_bytes.len(), "Saved orthomosaic");
        Ok(path)
    }

    pub async fn load_orthomosaic(&self) -> AppResult<Option<Vec<u8>>> {
        let path = self.orthomosaic_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> AppResult<Option<T>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };
    let value = serde_json::from_str(&text)
        .map_err(|e| AppError::Storage(format!("Invalid {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Loaded state file");
    Ok(Some(value))
}

async fn write_json<T: Serialize>(dir: &Path, path: &Path, value: &T) -> AppResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Wrote state file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> StateStore {
        StateStore::new(std::env::temp_dir().join(format!("ortho-state-{}", uuid::Uuid::new_v4())))
    }

    fn metadata() -> OrthomosaicMetadata {
        OrthomosaicMetadata {
            id: "orthomosaic_5".to_string(),
            x_m: 10.0,
            y_m: 20.0,
            x_m_per_pixel: 0.05,
            y_m_per_pixel: 0.05,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = temp_store();
        assert_eq!(store.load_session().await.unwrap(), Session::default());
        assert_eq!(store.load_orthomosaic().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let store = temp_store();
        let session = Session {
            orthomosaic_id: Some("orthomosaic_5".to_string()),
            orthomosaic_metadata: Some(metadata()),
        };
        store.save_session(&session).await.unwrap();

        assert_eq!(store.load_session().await.unwrap(), session);
        assert_eq!(store.load_origin().await.unwrap(), Some(metadata()));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_stale_origin_ignored() {
        let store = temp_store();
        store.save_origin(&metadata()).await.unwrap();
        let session = Session {
            orthomosaic_id: Some("orthomosaic_6".to_string()),
            orthomosaic_metadata: None,
        };
        store.save_session(&session).await.unwrap();

        assert_eq!(store.load_session().await.unwrap(), session);
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_orthomosaic_written_and_read_under_same_name() {
        let store = temp_store();
        let path = store.save_orthomosaic(b"\x89PNG").await.unwrap();

        assert_eq!(path.file_name().unwrap(), "orthomosaic.png");
        assert_eq!(store.load_orthomosaic().await.unwrap(), Some(b"\x89PNG".to_vec()));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_corrupt_origin_reported() {
        let store = temp_store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.origin_path(), "{").unwrap();
        assert!(matches!(store.load_origin().await, Err(AppError::Storage(_))));
        let _ = std::fs::remove_dir_all(store.dir());
    }
}
