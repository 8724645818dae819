//! Directory-backed store, one file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::{debug, warn};

use crate::{KvError, KvStore};

/// Key-Value store that keeps each value in its own file.
///
/// File names are the URL-safe base64 encoding of the key, so any key string
/// is usable. Writes land in a temporary sibling file that is then renamed
/// over the target, so readers see either the old value or the new one.
/// Temporary files left behind by an interrupted write are removed on open.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, KvError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| KvError::OpenError(format!("{}: {}", dir.display(), e)))?;

        let swept = sweep_temp_files(&dir).await?;
        debug!(dir = %dir.display(), swept, "opened file store");
        Ok(Self {
            dir,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Directory holding the store's files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(URL_SAFE_NO_PAD.encode(key))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.tmp", URL_SAFE_NO_PAD.encode(key), n))
    }
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

async fn sweep_temp_files(dir: &Path) -> Result<usize, KvError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut swept = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_temp_file) {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => swept += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(KvError::Io(e)),
        }
    }
    if swept > 0 {
        warn!(dir = %dir.display(), swept, "removed temp files from interrupted writes");
    }
    Ok(swept)
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KvError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        let tmp = self.tmp_path_for(key);
        if let Err(e) = tokio::fs::write(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(KvError::Io(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, self.path_for(key)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(KvError::Io(e));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KvError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }
}
