//! Reads and updates the profile directory on disk

use crate::config::ProfilesConfig;
use crate::error::{AppError, AppResult};
use crate::profiles::types::{Profile, ProfileFile, ProfileIndex, ProfileNode};
use serde_yml::{Mapping, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "profiles.yaml";
const PROFILE_SUBDIR: &str = "profiles";

/// Profile directory: `profiles.yaml` plus `profiles/<file>` subscriptions
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store for the configured directory, if any
    pub fn from_config(config: &ProfilesConfig) -> Option<Self> {
        config.dir.as_ref().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Absolute path of a subscription file, as the daemon should load it
    pub fn profile_path(&self, file: &str) -> PathBuf {
        self.dir.join(PROFILE_SUBDIR).join(file)
    }

    pub async fn load_index(&self) -> AppResult<ProfileIndex> {
        let path = self.index_path();
        let content = read(&path).await?;
        serde_yml::from_str(&content).map_err(|source| AppError::ProfileFormat {
            path: path.display().to_string(),
            source,
        })
    }

    /// Remote profiles in index order
    pub async fn profiles(&self) -> AppResult<Vec<Profile>> {
        Ok(self.load_index().await?.remote_profiles())
    }

    /// Nodes declared by a profile's subscription file
    ///
    /// A profile without a file, or whose file is missing, has no nodes.
    pub async fn nodes(&self, profile: &Profile) -> AppResult<Vec<ProfileNode>> {
        let Some(file) = profile.file.as_deref() else {
            return Ok(Vec::new());
        };
        let path = self.profile_path(file);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    profile = %profile.name,
                    path = %path.display(),
                    "Subscription file missing"
                );
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(AppError::ProfileIo {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        let parsed: ProfileFile =
            serde_yml::from_str(&content).map_err(|source| AppError::ProfileFormat {
                path: path.display().to_string(),
                source,
            })?;
        Ok(parsed.real_nodes())
    }

    /// Point the index's `current` at `uid`, keeping every other key
    pub async fn set_current(&self, uid: &str) -> AppResult<()> {
        let path = self.index_path();
        let display = path.display().to_string();
        let content = read(&path).await?;

        let mut index: Mapping =
            serde_yml::from_str(&content).map_err(|source| AppError::ProfileFormat {
                path: display.clone(),
                source,
            })?;
        index.insert(
            Value::String("current".to_string()),
            Value::String(uid.to_string()),
        );
        let updated = serde_yml::to_string(&index).map_err(|source| AppError::ProfileFormat {
            path: display.clone(),
            source,
        })?;

        tokio::fs::write(&path, updated)
            .await
            .map_err(|source| AppError::ProfileIo {
                path: display,
                source,
            })?;
        tracing::info!(uid = %uid, "Active profile recorded in index");
        Ok(())
    }
}

async fn read(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::ProfileIo {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INDEX: &str = "current: r1\nchain: []\nitems:\n  - uid: r1\n    type: remote\n    name: Home\n    file: r1.yaml\n  - uid: r2\n    type: remote\n    name: Work\n    file: r2.yaml\n";

    fn store_with_index() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join(INDEX_FILE), INDEX).unwrap();
        std::fs::create_dir(dir.path().join(PROFILE_SUBDIR)).unwrap();
        let store = ProfileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_profiles_read_from_index() {
        let (_dir, store) = store_with_index();
        let profiles = store.profiles().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].active);
        assert_eq!(profiles[1].name, "Work");
    }

    #[tokio::test]
    async fn test_missing_index_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        let err = store.profiles().await.unwrap_err();
        assert!(matches!(err, AppError::ProfileIo { .. }));
        assert!(err.to_string().contains(INDEX_FILE));
    }

    #[tokio::test]
    async fn test_missing_subscription_file_has_no_nodes() {
        let (_dir, store) = store_with_index();
        let profiles = store.profiles().await.unwrap();
        assert!(store.nodes(&profiles[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_subscription_file_is_format_error() {
        let (dir, store) = store_with_index();
        std::fs::write(dir.path().join(PROFILE_SUBDIR).join("r1.yaml"), "proxies: [").unwrap();
        let profiles = store.profiles().await.unwrap();
        let err = store.nodes(&profiles[0]).await.unwrap_err();
        assert!(matches!(err, AppError::ProfileFormat { .. }));
    }

    #[tokio::test]
    async fn test_set_current_keeps_other_keys() {
        let (dir, store) = store_with_index();
        store.set_current("r2").await.unwrap();

        let profiles = store.profiles().await.unwrap();
        assert!(!profiles[0].active);
        assert!(profiles[1].active);

        let raw = std::fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert!(raw.contains("chain"));
    }

    #[test]
    fn test_profile_path_is_under_subdir() {
        let store = ProfileStore::new("/data/verge");
        assert_eq!(
            store.profile_path("r1.yaml"),
            PathBuf::from("/data/verge/profiles/r1.yaml")
        );
        assert_eq!(store.dir(), Path::new("/data/verge"));
    }
}
