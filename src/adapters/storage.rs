use crate::domain::ports::KeyValueStore;
use crate::utils::error::{QsineError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One `<key>.json` file per key under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", file_stem(key)))
    }
}

/// "@user_allergens" -> "user_allergens"
fn file_stem(key: &str) -> String {
    key.trim_start_matches('@')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn storage_error(key: &str, e: std::io::Error) -> QsineError {
    QsineError::storage(format!("{}: {}", key, e))
}

impl KeyValueStore for LocalStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(key, e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.path_for(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(key, e))?;
        }

        // 先寫暫存檔再改名，避免寫到一半留下壞掉的值
        let tmp_path = full_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|e| storage_error(key, e))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &full_path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                tracing::warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(storage_error(key, e));
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(key, e)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_stem_sanitizes_key() {
        assert_eq!(file_stem("@user_allergens"), "user_allergens");
        assert_eq!(file_stem("a/b c"), "a_b_c");
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("@user_allergens").await.unwrap(), None);

        storage.set_item("@user_allergens", r#"["milk"]"#).await.unwrap();
        assert!(dir.path().join("nested/user_allergens.json").exists());
        assert_eq!(
            storage.get_item("@user_allergens").await.unwrap().as_deref(),
            Some(r#"["milk"]"#)
        );

        storage.set_item("@user_allergens", "[]").await.unwrap();
        assert_eq!(
            storage.get_item("@user_allergens").await.unwrap().as_deref(),
            Some("[]")
        );

        storage.remove_item("@user_allergens").await.unwrap();
        storage.remove_item("@user_allergens").await.unwrap();
        assert_eq!(storage.get_item("@user_allergens").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let target = storage.path_for("@user_allergens");

        // 目標位置被非空目錄佔住，改名一定失敗
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = storage.set_item("@user_allergens", "[]").await.unwrap_err();
        assert!(matches!(err, QsineError::Storage { .. }));
        assert!(!target.with_extension("json.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        tokio_test::block_on(async {
            tokio_test::assert_ok!(storage.set_item("k", "v").await);
            assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v"));

            // clones share the same map
            let clone = storage.clone();
            tokio_test::assert_ok!(clone.remove_item("k").await);
            assert_eq!(storage.get_item("k").await.unwrap(), None);
        });
    }
}
