//! Document loading.
//!
//! A [`DocumentLoader`] turns a path into a parsed clip document and reports a
//! [`ContentKey`] for the bytes it read, so caches can be invalidated by content
//! rather than by path or timestamp.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::Hasher;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::error::ClipError;
use crate::Result;

/// Identity of a document's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentKey {
    digest: u64,
    len: u64,
}

impl ContentKey {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        hasher.write(bytes);
        Self {
            digest: hasher.finish(),
            len: bytes.len() as u64,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A parsed document plus the key of the bytes it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDocument {
    pub key: ContentKey,
    pub document: serde_json::Value,
}

/// Source of clip documents.
///
/// Reading and parsing are separate so callers can key on the bytes and only
/// parse content they have not seen.
pub trait DocumentLoader: Send + Sync {
    /// Raw bytes of the document currently stored at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Parse bytes returned by [`DocumentLoader::read`].
    fn parse(&self, bytes: &[u8]) -> Result<serde_json::Value>;

    /// Content key of the document currently stored at `path`.
    fn fingerprint(&self, path: &Path) -> Result<ContentKey> {
        Ok(ContentKey::of(&self.read(path)?))
    }

    /// Read and parse the document at `path`.
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let bytes = self.read(path)?;
        Ok(LoadedDocument {
            key: ContentKey::of(&bytes),
            document: self.parse(&bytes)?,
        })
    }
}

/// Reads clip documents stored as JSON files.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFileLoader;

impl JsonFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for JsonFileLoader {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ClipError::DocumentNotFound {
                path: path.display().to_string(),
            },
            _ => ClipError::from(err),
        })
    }

    fn parse(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        let document = serde_json::from_slice(bytes)?;
        debug!("parsed clip document ({} bytes)", bytes.len());
        Ok(document)
    }
}
