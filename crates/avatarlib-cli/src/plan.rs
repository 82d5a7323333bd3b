//! Merge plan files.
//!
//! A plan lists the controller documents to merge, in order, with the path
//! each one's clips are rebased below:
//!
//! ```json
//! {
//!   "controller_name": "FX",
//!   "output": "out/merged.json",
//!   "sources": [
//!     { "path": "avatar_fx.json" },
//!     { "path": "hat_fx.json", "rebase_path": "Hat", "write_defaults": "off" }
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the directory holding the plan file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use avatarlib_anim::merger::{MergeConfig, WriteDefaultsMode};
use serde::{Deserialize, Serialize};

/// One controller document to merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanSource {
    pub path: PathBuf,
    #[serde(default)]
    pub rebase_path: String,
    #[serde(default)]
    pub write_defaults: WriteDefaultsMode,
}

/// A merge plan file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergePlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_marker: Option<String>,
    pub output: PathBuf,
    pub sources: Vec<PlanSource>,
}

impl MergePlan {
    /// Parses a plan from JSON without resolving paths.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid merge plan")
    }

    /// Reads the plan at `path` and resolves its relative paths.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read merge plan: {}", path.display()))?;
        let mut plan = Self::from_json(&content)
            .with_context(|| format!("Failed to parse merge plan: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        plan.resolve_paths(base);
        Ok(plan)
    }

    /// Makes every relative path in the plan relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.output = resolve(base, &self.output);
        for source in &mut self.sources {
            source.path = resolve(base, &source.path);
        }
    }

    /// Merge configuration described by the plan.
    pub fn merge_config(&self) -> MergeConfig {
        let mut config = MergeConfig::default();
        if let Some(name) = &self.controller_name {
            config.controller_name = name.clone();
        }
        if let Some(marker) = &self.proxy_marker {
            config = config.proxy_marker(marker.clone());
        }
        config
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_defaults() {
        let plan = MergePlan::from_json(
            r#"{ "output": "merged.json", "sources": [ { "path": "a.json" } ] }"#,
        )
        .unwrap();
        assert_eq!(plan.sources[0].rebase_path, "");
        assert_eq!(plan.sources[0].write_defaults, WriteDefaultsMode::DoNothing);

        let config = plan.merge_config();
        assert_eq!(config, MergeConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = MergePlan::from_json(
            r#"{ "output": "m.json", "sources": [], "extra": true }"#,
        );
        assert!(result.is_err());

        let result = MergePlan::from_json(
            r#"{ "output": "m.json", "sources": [ { "path": "a.json", "rebase": "Hat" } ] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_paths_resolve_against_plan_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let plan_path = tmp.path().join("plan.json");
        std::fs::write(
            &plan_path,
            r#"{
                "controller_name": "FX",
                "proxy_marker": "/Proxy/",
                "output": "out/merged.json",
                "sources": [ { "path": "hat.json", "rebase_path": "Hat", "write_defaults": "on" } ]
            }"#,
        )
        .unwrap();

        let plan = MergePlan::from_file(&plan_path).unwrap();
        assert_eq!(plan.output, tmp.path().join("out/merged.json"));
        assert_eq!(plan.sources[0].path, tmp.path().join("hat.json"));
        assert_eq!(plan.sources[0].write_defaults, WriteDefaultsMode::On);

        let config = plan.merge_config();
        assert_eq!(config.controller_name, "FX");
        assert_eq!(config.proxy_marker, "/Proxy/");
    }
}
