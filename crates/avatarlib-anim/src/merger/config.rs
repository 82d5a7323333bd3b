//! Merge configuration.

use serde::{Deserialize, Serialize};

use crate::rebase::{ClipRebaser, PROXY_ANIMATION_MARKER, REBASED_CLIP_SUFFIX};

/// Default name of the merged controller.
pub const DEFAULT_CONTROLLER_NAME: &str = "Merged";

/// What to do with the write defaults flag of copied states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDefaultsMode {
    /// Keep each state's flag.
    #[default]
    DoNothing,
    /// Force the flag on.
    On,
    /// Force the flag off.
    Off,
}

impl WriteDefaultsMode {
    /// Returns the forced value, or `None` to keep the state's own.
    pub fn forced_value(self) -> Option<bool> {
        match self {
            WriteDefaultsMode::DoNothing => None,
            WriteDefaultsMode::On => Some(true),
            WriteDefaultsMode::Off => Some(false),
        }
    }
}

/// Configuration for a [`Merger`](super::Merger).
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Name of the merged controller.
    pub controller_name: String,
    /// Asset path fragment identifying proxy clips.
    pub proxy_marker: String,
    /// Suffix appended to rebased clip names.
    pub rebased_clip_suffix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            controller_name: DEFAULT_CONTROLLER_NAME.to_string(),
            proxy_marker: PROXY_ANIMATION_MARKER.to_string(),
            rebased_clip_suffix: REBASED_CLIP_SUFFIX.to_string(),
        }
    }
}

impl MergeConfig {
    /// Creates a new config with the given controller name.
    pub fn with_controller_name(name: impl Into<String>) -> Self {
        Self {
            controller_name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the proxy clip marker.
    pub fn proxy_marker(mut self, marker: impl Into<String>) -> Self {
        self.proxy_marker = marker.into();
        self
    }

    /// Sets the rebased clip name suffix.
    pub fn rebased_clip_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.rebased_clip_suffix = suffix.into();
        self
    }

    pub(crate) fn rebaser(&self) -> ClipRebaser {
        ClipRebaser::new(self.proxy_marker.clone(), self.rebased_clip_suffix.clone())
    }
}
