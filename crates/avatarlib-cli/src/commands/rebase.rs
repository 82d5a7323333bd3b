//! Rebase command implementation
//!
//! Moves every curve binding of a clip document below a hierarchy path.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use avatarlib_anim::model::AssetDocument;
use avatarlib_anim::rebase::ClipRebaser;
use colored::Colorize;

use super::write_document;
use crate::input::load_document;

/// Run the rebase command
///
/// # Arguments
/// * `input` - Path to a clip document
/// * `rebase_path` - Hierarchy path to move the bindings below
/// * `output` - Path of the rebased clip document
pub fn run(input: &str, rebase_path: &str, output: &str) -> Result<ExitCode> {
    println!("{} {}", "Rebasing:".cyan().bold(), input);

    let loaded = load_document(Path::new(input))
        .with_context(|| format!("Failed to load document: {}", input))?;
    let rebased = rebase_document(loaded.document, rebase_path, &ClipRebaser::default())?;
    write_document(&rebased, Path::new(output))?;

    let clip = rebased.objects.clip(rebased.root)?;
    println!(
        "{} {} ({} bindings) -> {}",
        "Rebased:".green().bold(),
        clip.name,
        clip.binding_count(),
        output
    );
    Ok(ExitCode::SUCCESS)
}

/// Rebases the clip at the root of `document` below `rebase_path`.
///
/// Proxy clips and an empty path leave the clip unchanged.
pub fn rebase_document(
    document: AssetDocument,
    rebase_path: &str,
    rebaser: &ClipRebaser,
) -> Result<AssetDocument> {
    let (mut arena, root) = document.into_parts();
    arena
        .clip(root)
        .context("Document root is not an animation clip")?;
    let rebased = rebaser.rebase_clip(&mut arena, root, rebase_path)?;
    Ok(AssetDocument::extract(&arena, rebased)?)
}
