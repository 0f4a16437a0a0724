//! Destination storage for normalized images.
//!
//! The pipeline hands finished bytes to a [`Store`] and gets back a URL; it
//! knows nothing about where the bytes end up. [`DirStore`] is the
//! filesystem implementation used by the CLI.
//!
//! ## Keys
//!
//! Keys are **content-addressed**: the first 16 hex digits of the SHA-256
//! of the bytes, plus an extension derived from the content type. Storing the
//! same image twice writes the same file and returns the same URL.
//!
//! ## Writes
//!
//! [`DirStore`] writes into a temporary file in the target directory and
//! renames it into place, so a key path only ever holds a complete image.
//! An existing file is reused only when its contents match; anything else
//! (a leftover from an interrupted run) is replaced.

use crate::imaging::Format;
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Hex digits of the content hash used in a key.
const KEY_HASH_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Capability: persist bytes and return a URL they can be read back from.
pub trait Store: Sync {
    fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, StoreError>;
}

/// Compute the content-addressed key for `bytes`.
pub fn object_key(bytes: &[u8], content_type: &str) -> Result<String, StoreError> {
    let format = Format::from_content_type(content_type)
        .ok_or_else(|| StoreError::UnsupportedContentType(content_type.to_string()))?;
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{}.{}", &hex[..KEY_HASH_LEN], format.extension()))
}

/// [`Store`] writing into a local directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
    base_url: Option<String>,
}

impl DirStore {
    /// Store into `dir`. URLs are `{base_url}/{key}` when a base URL is
    /// given, `file://` URLs otherwise.
    pub fn new(dir: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_for(&self, key: &str, path: &Path) -> String {
        match &self.base_url {
            Some(base) => format!("{base}/{key}"),
            None => {
                let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
                format!("file://{}", abs.display())
            }
        }
    }
}

impl Store for DirStore {
    fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, StoreError> {
        let key = object_key(bytes, content_type)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&key);
        if !holds(&path, bytes)? {
            write_atomic(&self.dir, &path, bytes)?;
        }
        Ok(self.url_for(&key, &path))
    }
}

/// Whether `path` already holds exactly `bytes`.
fn holds(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() != bytes.len() as u64 => Ok(false),
        Ok(_) => Ok(std::fs::read(path)? == bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
