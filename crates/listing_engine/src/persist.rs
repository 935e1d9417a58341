use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use listing_core::SeenListings;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("state file {path:?} is not a JSON list of keys: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ensure the directory holding the state file exists; create if missing.
pub fn ensure_state_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::StateDir(format!("{dir:?} is not a directory")));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::StateDir(e.to_string()))?;
    }
    Ok(())
}

/// Replaces a file's content by writing a sibling temp file and renaming it over the
/// target, so readers see either the old or the new content.
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn write(&self, content: &str) -> Result<(), StoreError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_state_dir(&dir)?;

        let io_err = |source: io::Error| StoreError::Io {
            path: self.target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        tmp.persist(&self.target).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Persisted set of already-notified listing keys.
pub trait DedupStore: Send + Sync {
    /// Reads the full set; a store that does not exist yet is created empty.
    fn load(&self) -> Result<SeenListings, StoreError>;
    /// Overwrites the persisted set.
    fn save(&self, seen: &SeenListings) -> Result<(), StoreError>;
}

/// Dedup store kept as a pretty-printed JSON array of key strings.
pub struct JsonDedupStore {
    path: PathBuf,
    writer: AtomicFileWriter,
}

impl JsonDedupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            writer: AtomicFileWriter::new(path.clone()),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DedupStore for JsonDedupStore {
    fn load(&self) -> Result<SeenListings, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let empty = SeenListings::new();
                self.save(&empty)?;
                engine_info!("Created empty listing state at {:?}", self.path);
                return Ok(empty);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let entries: Vec<String> =
            serde_json::from_str(&content).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        Ok(SeenListings::from_entries(entries))
    }

    fn save(&self, seen: &SeenListings) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(seen.entries()).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        self.writer.write(&content)
    }
}
