//! CLI command implementations

pub mod inspect;
pub mod merge;
pub mod rebase;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use avatarlib_anim::model::AssetDocument;

/// Writes `document` to `path`, creating parent directories.
fn write_document(document: &AssetDocument, path: &Path) -> Result<()> {
    let json = document.to_json_pretty()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))
}
