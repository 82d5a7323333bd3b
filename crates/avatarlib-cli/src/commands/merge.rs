//! Merge command implementation
//!
//! Merges the controller documents listed in a plan file into one controller
//! document.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use avatarlib_anim::merger::Merger;
use avatarlib_anim::model::ObjectArena;
use colored::Colorize;
use serde::Serialize;

use crate::input::load_document;
use crate::plan::MergePlan;
use crate::store::JsonFileStore;

/// Outcome of a merge, printed by the command.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub controller_name: String,
    pub layers: Vec<String>,
    pub parameters: Vec<String>,
    pub sources: Vec<SourceSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub rebase_path: String,
    /// BLAKE3 hash of the source file content (hex string).
    pub source_hash: String,
}

/// Run the merge command
///
/// # Arguments
/// * `plan_path` - Path to the merge plan file
/// * `output` - Optional output path overriding the plan's
/// * `json_output` - Whether to print the summary as JSON
///
/// # Returns
/// Exit code: 0 on success
pub fn run(plan_path: &str, output: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let mut plan = MergePlan::from_file(Path::new(plan_path))?;
    if let Some(output) = output {
        plan.output = PathBuf::from(output);
    }

    if !json_output {
        println!("{} {}", "Merging:".cyan().bold(), plan_path);
    }

    let summary = merge_plan(&plan)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for source in &summary.sources {
            let rebase = if source.rebase_path.is_empty() {
                "(no rebase)".to_string()
            } else {
                source.rebase_path.clone()
            };
            println!(
                "  {} {} -> {} ({})",
                "Source:".dimmed(),
                source.path.display(),
                rebase,
                &source.source_hash[..16]
            );
        }
        println!(
            "{} {} layers, {} parameters",
            "Merged:".green().bold(),
            summary.layers.len(),
            summary.parameters.len()
        );
        println!("{} {}", "Output:".dimmed(), summary.output.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Merges every source of `plan` and writes the result to `plan.output`.
pub fn merge_plan(plan: &MergePlan) -> Result<MergeSummary> {
    let mut arena = ObjectArena::new();
    let mut roots = Vec::with_capacity(plan.sources.len());
    let mut sources = Vec::with_capacity(plan.sources.len());

    for source in &plan.sources {
        let loaded = load_document(&source.path)
            .with_context(|| format!("Failed to load source: {}", source.path.display()))?;
        sources.push(SourceSummary {
            path: source.path.clone(),
            rebase_path: source.rebase_path.clone(),
            source_hash: loaded.source_hash,
        });
        let (objects, root) = loaded.document.into_parts();
        let remap = arena.absorb(objects);
        roots.push(remap.apply(root));
    }

    let config = plan.merge_config();
    let controller_name = config.controller_name.clone();
    let mut merger = Merger::with_store(&mut arena, JsonFileStore::new(), &plan.output, config)
        .context("Failed to create merged controller")?;

    for (source, root) in plan.sources.iter().zip(roots) {
        merger
            .add_graph(&source.rebase_path, root, source.write_defaults)
            .with_context(|| format!("Failed to merge source: {}", source.path.display()))?;
    }
    merger
        .merge()
        .with_context(|| format!("Failed to write: {}", plan.output.display()))?;

    Ok(MergeSummary {
        output: plan.output.clone(),
        controller_name,
        layers: merger.layers().iter().map(|l| l.name.clone()).collect(),
        parameters: merger.parameters().iter().map(|p| p.name.clone()).collect(),
        sources,
    })
}
