//! The canonical record store: a JSON array of employee objects.
//!
//! The store is read whole and written whole. Writes go through
//! [`write_atomic`]: the bytes land in a temp file next to the destination
//! and are renamed over it, so a crash mid-write leaves either the old file
//! or the new one, never a truncated mix. The same helper writes credential
//! images and the credential ledger.
//!
//! Only one process is expected to touch a store at a time. There is no
//! locking.

use crate::types::Employee;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store file not found: {0}")]
    MissingSource(PathBuf),
    #[error("Store {path} is not a JSON array of employee objects: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load the full record sequence, in file order.
///
/// Fails with [`StoreError::MissingSource`] when the file does not exist and
/// [`StoreError::MalformedJson`] when the content is not an array of objects.
/// Field contents are not validated.
pub fn load(path: &Path) -> Result<Vec<Employee>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::MissingSource(path.to_path_buf())
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the store if it exists. A missing file is a first import, not an error.
pub fn load_optional(path: &Path) -> Result<Option<Vec<Employee>>, StoreError> {
    match load(path) {
        Ok(records) => Ok(Some(records)),
        Err(StoreError::MissingSource(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Serialize the full record set to `path`, replacing it atomically.
pub fn save(path: &Path, records: &[Employee]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    write_atomic(path, json.as_bytes()).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), records = records.len(), "store saved");
    Ok(())
}

/// Write `bytes` to `path` via a sibling temp file and an atomic rename.
///
/// The parent directory must exist. On any failure the temp file is removed
/// and `path` is untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    staged(path, bytes)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_atomic`], but fails with `AlreadyExists` instead of
/// replacing a file that is already at `path`.
pub fn write_new_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    staged(path, bytes)?
        .persist_noclobber(path)
        .map_err(|e| e.error)?;
    Ok(())
}

/// Temp file in the destination's directory holding `bytes`, flushed to disk.
fn staged(path: &Path, bytes: &[u8]) -> io::Result<tempfile::NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
