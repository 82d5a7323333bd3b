//! Loading asset documents from disk.

use std::path::{Path, PathBuf};

use avatarlib_anim::model::AssetDocument;
use avatarlib_anim::AnimError;
use thiserror::Error;

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum InputError {
    /// File could not be read.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a valid asset document.
    #[error("invalid asset document '{path}': {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: AnimError,
    },
}

/// A document together with the hash of the file it came from.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: AssetDocument,
    /// BLAKE3 hash of the file content (hex string).
    pub source_hash: String,
}

impl LoadedDocument {
    /// First 16 hex digits of the source hash, for status lines.
    pub fn short_hash(&self) -> &str {
        &self.source_hash[..16]
    }
}

/// Reads and parses the asset document at `path`.
pub fn load_document(path: &Path) -> Result<LoadedDocument, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let source_hash = blake3::hash(content.as_bytes()).to_hex().to_string();

    let document = AssetDocument::from_json(&content).map_err(|e| InputError::Document {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(LoadedDocument {
        document,
        source_hash,
    })
}
