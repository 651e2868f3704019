use crate::error::OisstError;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "oisst_rs_cache";

pub fn get_cache_dir() -> Result<PathBuf, OisstError> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or(OisstError::CacheDirResolution)
}

pub async fn ensure_cache_dir_exists(path: &Path) -> Result<(), OisstError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(OisstError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "cache path exists but is not a directory",
                    ),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| OisstError::CacheDirCreation(path.to_path_buf(), e))?;
            Ok(())
        }
        Err(e) => Err(OisstError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("cache");
        ensure_cache_dir_exists(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn rejects_file_at_cache_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::write(&target, b"not a directory").unwrap();
        let err = ensure_cache_dir_exists(&target).await.unwrap_err();
        assert!(matches!(err, OisstError::CacheDirCreation(..)));
    }
}
