//! Curve path rebasing for animation clips.
//!
//! Rebasing moves every binding of a clip below a new hierarchy path, so a
//! clip authored against an accessory's own root can drive the same accessory
//! once it is parented under an avatar.

use tracing::debug;

use crate::copy::CopyHook;
use crate::error::AnimResult;
use crate::model::{AnimationClip, AssetObject, CurveBinding, ObjectArena, ObjectId};
use crate::store::AssetSink;

/// Path fragment identifying the platform's shared proxy clips.
pub const PROXY_ANIMATION_MARKER: &str = "/Animation/ProxyAnim/proxy";

/// Suffix appended to the names of rebased clips.
pub const REBASED_CLIP_SUFFIX: &str = "_Rebase";

/// Returns the binding path after moving it below `rebase_path`.
///
/// An empty binding path addresses the rebase target itself.
pub fn rebase_curve_path(binding: &CurveBinding, rebase_path: &str) -> String {
    if rebase_path.is_empty() {
        binding.path.clone()
    } else if binding.path.is_empty() {
        rebase_path.to_string()
    } else {
        format!("{}/{}", rebase_path, binding.path)
    }
}

/// Rebases clips, leaving proxy clips alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRebaser {
    proxy_marker: String,
    name_suffix: String,
}

impl Default for ClipRebaser {
    fn default() -> Self {
        Self {
            proxy_marker: PROXY_ANIMATION_MARKER.to_string(),
            name_suffix: REBASED_CLIP_SUFFIX.to_string(),
        }
    }
}

impl ClipRebaser {
    pub fn new(proxy_marker: impl Into<String>, name_suffix: impl Into<String>) -> Self {
        Self {
            proxy_marker: proxy_marker.into(),
            name_suffix: name_suffix.into(),
        }
    }

    pub fn proxy_marker(&self) -> &str {
        &self.proxy_marker
    }

    /// Returns true if `clip` is a shared proxy clip that must never be copied.
    pub fn is_proxy(&self, clip: &AnimationClip) -> bool {
        !self.proxy_marker.is_empty()
            && clip
                .asset_path
                .as_deref()
                .is_some_and(|path| path.contains(&self.proxy_marker))
    }

    /// Builds the rebased version of `clip` without touching any arena.
    pub fn rebased(&self, clip: &AnimationClip, rebase_path: &str) -> AnimationClip {
        let mut rebased = AnimationClip::new(format!("{}{}", clip.name, self.name_suffix));
        rebased.frame_rate = clip.frame_rate;
        rebased.legacy = clip.legacy;
        rebased.local_bounds = clip.local_bounds;
        rebased.wrap_mode = clip.wrap_mode;
        rebased.settings = clip.settings.clone();

        for entry in &clip.curves {
            let mut binding = entry.binding.clone();
            binding.path = rebase_curve_path(&entry.binding, rebase_path);
            rebased.set_curve(binding, entry.curve.clone());
        }
        for entry in &clip.object_reference_curves {
            let mut binding = entry.binding.clone();
            binding.path = rebase_curve_path(&entry.binding, rebase_path);
            rebased.set_object_reference_curve(binding, entry.keys.clone());
        }
        rebased
    }

    /// Rebases the clip behind `clip_id` below `rebase_path`.
    ///
    /// Returns `clip_id` itself when the path is empty or the clip is a proxy;
    /// otherwise stores a new clip and returns its handle.
    pub fn rebase_clip(
        &self,
        arena: &mut ObjectArena,
        clip_id: ObjectId,
        rebase_path: &str,
    ) -> AnimResult<ObjectId> {
        let clip = arena.clip(clip_id)?;
        if rebase_path.is_empty() || self.is_proxy(clip) {
            return Ok(clip_id);
        }
        let rebased = self.rebased(clip, rebase_path);
        debug!(clip = %rebased.name, rebase_path, "rebased clip");
        Ok(arena.insert(rebased))
    }
}

/// Rebases the clip behind `clip_id` with `rebaser`'s settings.
pub fn rebase_clip(
    arena: &mut ObjectArena,
    clip_id: ObjectId,
    rebase_path: &str,
    rebaser: &ClipRebaser,
) -> AnimResult<ObjectId> {
    rebaser.rebase_clip(arena, clip_id, rebase_path)
}

/// Copy hook that rebases every clip reached during a copy.
pub struct RebaseHook<'r> {
    rebaser: &'r ClipRebaser,
    rebase_path: &'r str,
}

impl<'r> RebaseHook<'r> {
    pub fn new(rebaser: &'r ClipRebaser, rebase_path: &'r str) -> Self {
        Self {
            rebaser,
            rebase_path,
        }
    }
}

impl CopyHook for RebaseHook<'_> {
    fn override_copy(
        &mut self,
        arena: &mut ObjectArena,
        sink: &mut dyn AssetSink,
        original: ObjectId,
    ) -> AnimResult<Option<ObjectId>> {
        if !matches!(arena.object(original)?, AssetObject::Clip(_)) {
            return Ok(None);
        }
        let rebased = self.rebaser.rebase_clip(arena, original, self.rebase_path)?;
        if rebased != original {
            sink.register(rebased)?;
        }
        Ok(Some(rebased))
    }
}
