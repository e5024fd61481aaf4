use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Errors raised by an [`ArtifactStore`]
///
/// These never leave the store module: the cache logs and swallows them.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("artifact encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("artifact {found} stored under {expected}")]
    KeyMismatch { expected: String, found: String },

    #[error("artifact I/O task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Key → serialized document storage
pub trait ArtifactStore: Send + Sync {
    /// Returns `None` when nothing is stored under `name`
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the artifact; readers see the old or the new bytes, never a mix
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn exists(&self, name: &str) -> bool;

    /// Deletes the artifact; removing a missing artifact is not an error
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// Stores each artifact as `<root>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    root: PathBuf,
}

impl FileArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(name)).map_err(|e| e.error)?;

        tracing::debug!(artifact = %name, bytes = bytes.len(), "Artifact written");
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
