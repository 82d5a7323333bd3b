//! Inspect command implementation
//!
//! Summarizes the controller in an asset document.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use avatarlib_anim::model::AssetDocument;
use avatarlib_anim::walk_states;
use colored::Colorize;
use serde::Serialize;

use crate::input::load_document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub default_weight: f32,
    pub synced_layer_index: i32,
    /// States reachable from the layer's own state machine.
    pub state_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub parameter_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSummary {
    pub name: String,
    pub layers: Vec<LayerSummary>,
    pub parameters: Vec<ParameterSummary>,
}

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to a controller document
/// * `json_output` - Whether to print the summary as JSON
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    let loaded = load_document(Path::new(input))
        .with_context(|| format!("Failed to load document: {}", input))?;
    let summary = summarize(&loaded.document)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Controller:".cyan().bold(), summary.name);
    println!("{} {}", "Source:".dimmed(), loaded.short_hash());

    println!("{} ({})", "Layers".bold(), summary.layers.len());
    for (index, layer) in summary.layers.iter().enumerate() {
        let synced = if layer.synced_layer_index >= 0 {
            format!(" synced to {}", layer.synced_layer_index)
        } else {
            String::new()
        };
        println!(
            "  {:>2} {} weight {:.2}, {} states{}",
            index,
            layer.name,
            layer.default_weight,
            layer.state_count,
            synced.yellow()
        );
    }

    println!("{} ({})", "Parameters".bold(), summary.parameters.len());
    for parameter in &summary.parameters {
        println!("  {} {}", parameter.name, parameter.parameter_type.dimmed());
    }

    Ok(ExitCode::SUCCESS)
}

/// Summarizes the controller at the root of `document`.
pub fn summarize(document: &AssetDocument) -> Result<ControllerSummary> {
    let arena = &document.objects;
    let controller = arena
        .controller(document.root)
        .context("Document root is not an animator controller")?;

    let layers = controller
        .layers
        .iter()
        .map(|layer| LayerSummary {
            name: layer.name.clone(),
            default_weight: layer.default_weight,
            synced_layer_index: layer.synced_layer_index,
            state_count: layer
                .state_machine
                .map_or(0, |machine| walk_states(arena, machine).count()),
        })
        .collect();

    let parameters = controller
        .parameters
        .iter()
        .map(|parameter| ParameterSummary {
            name: parameter.name.clone(),
            parameter_type: parameter.parameter_type.to_string(),
        })
        .collect();

    Ok(ControllerSummary {
        name: controller.name.clone(),
        layers,
        parameters,
    })
}
