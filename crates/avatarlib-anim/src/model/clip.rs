//! Motion types: animation clips, their curves, and blend trees.

use serde::{Deserialize, Serialize};

use super::object::ObjectId;

// =============================================================================
// Curves
// =============================================================================

/// A single keyframe of a float curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// A float curve. Keyframe evaluation is left to the host editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationCurve {
    pub keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// A flat curve holding `value` between `time_start` and `time_end`.
    ///
    /// When both times are equal the curve has a single key.
    pub fn constant(time_start: f32, time_end: f32, value: f32) -> Self {
        if time_start == time_end {
            return Self::new(vec![Keyframe::new(time_start, value)]);
        }
        Self::new(vec![
            Keyframe::new(time_start, value),
            Keyframe::new(time_end, value),
        ])
    }

    /// A straight line from `(time_start, value_start)` to `(time_end, value_end)`.
    pub fn linear(time_start: f32, value_start: f32, time_end: f32, value_end: f32) -> Self {
        if time_start == time_end {
            return Self::new(vec![Keyframe::new(time_start, value_start)]);
        }
        let slope = (value_end - value_start) / (time_end - time_start);
        Self::new(vec![
            Keyframe {
                time: time_start,
                value: value_start,
                in_tangent: slope,
                out_tangent: slope,
            },
            Keyframe {
                time: time_end,
                value: value_end,
                in_tangent: slope,
                out_tangent: slope,
            },
        ])
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the curve has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A keyframe of an object reference curve (e.g. material swaps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReferenceKeyframe {
    pub time: f32,
    pub value: Option<ObjectId>,
}

/// The component type a curve binding animates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingType {
    /// The animator on the root object. Bindings of this type with an empty
    /// path address the animated root itself.
    Animator,
    GameObject,
    Transform,
    SkinnedMeshRenderer,
    /// Any other component, by type name.
    Component(String),
}

impl BindingType {
    /// Returns the component type name.
    pub fn type_name(&self) -> &str {
        match self {
            BindingType::Animator => "Animator",
            BindingType::GameObject => "GameObject",
            BindingType::Transform => "Transform",
            BindingType::SkinnedMeshRenderer => "SkinnedMeshRenderer",
            BindingType::Component(name) => name,
        }
    }
}

/// Identifies one animated property: hierarchy path, component type, property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveBinding {
    pub path: String,
    pub binding_type: BindingType,
    pub property_name: String,
}

impl CurveBinding {
    pub fn new(
        path: impl Into<String>,
        binding_type: BindingType,
        property_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            binding_type,
            property_name: property_name.into(),
        }
    }
}

/// A float curve attached to a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveEntry {
    pub binding: CurveBinding,
    pub curve: AnimationCurve,
}

/// An object reference curve attached to a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReferenceCurveEntry {
    pub binding: CurveBinding,
    pub keys: Vec<ObjectReferenceKeyframe>,
}

// =============================================================================
// Clip
// =============================================================================

/// Wrap mode of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    Default,
    Once,
    Loop,
    PingPong,
    ClampForever,
}

/// Local bounds of the animated content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub center: [f32; 3],
    pub extent: [f32; 3],
}

/// Import/loop settings of a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSettings {
    #[serde(default)]
    pub loop_time: bool,
    #[serde(default)]
    pub loop_blend: bool,
    #[serde(default)]
    pub cycle_offset: f32,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub start_time: f32,
    #[serde(default)]
    pub stop_time: f32,
    #[serde(default)]
    pub keep_original_position_y: bool,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            loop_time: false,
            loop_blend: false,
            cycle_offset: 0.0,
            mirror: false,
            start_time: 0.0,
            stop_time: 1.0,
            keep_original_position_y: false,
        }
    }
}

fn default_frame_rate() -> f32 {
    60.0
}

/// An animation clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Where the clip is stored, if it is a saved asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path: Option<String>,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default)]
    pub legacy: bool,
    #[serde(default)]
    pub local_bounds: Bounds,
    #[serde(default)]
    pub wrap_mode: WrapMode,
    #[serde(default)]
    pub settings: ClipSettings,
    #[serde(default)]
    pub curves: Vec<CurveEntry>,
    #[serde(default)]
    pub object_reference_curves: Vec<ObjectReferenceCurveEntry>,
}

impl AnimationClip {
    /// Creates an empty clip.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_path: None,
            frame_rate: default_frame_rate(),
            legacy: false,
            local_bounds: Bounds::default(),
            wrap_mode: WrapMode::Default,
            settings: ClipSettings::default(),
            curves: Vec::new(),
            object_reference_curves: Vec::new(),
        }
    }

    /// Sets the asset path.
    pub fn with_asset_path(mut self, path: impl Into<String>) -> Self {
        self.asset_path = Some(path.into());
        self
    }

    /// Sets (or replaces) the float curve for `binding`.
    pub fn set_curve(&mut self, binding: CurveBinding, curve: AnimationCurve) {
        match self.curves.iter_mut().find(|entry| entry.binding == binding) {
            Some(entry) => entry.curve = curve,
            None => self.curves.push(CurveEntry { binding, curve }),
        }
    }

    /// Returns the float curve for `binding`.
    pub fn curve(&self, binding: &CurveBinding) -> Option<&AnimationCurve> {
        self.curves
            .iter()
            .find(|entry| &entry.binding == binding)
            .map(|entry| &entry.curve)
    }

    /// Sets (or replaces) the object reference curve for `binding`.
    pub fn set_object_reference_curve(
        &mut self,
        binding: CurveBinding,
        keys: Vec<ObjectReferenceKeyframe>,
    ) {
        match self
            .object_reference_curves
            .iter_mut()
            .find(|entry| entry.binding == binding)
        {
            Some(entry) => entry.keys = keys,
            None => self
                .object_reference_curves
                .push(ObjectReferenceCurveEntry { binding, keys }),
        }
    }

    /// Returns the object reference curve for `binding`.
    pub fn object_reference_curve(
        &self,
        binding: &CurveBinding,
    ) -> Option<&[ObjectReferenceKeyframe]> {
        self.object_reference_curves
            .iter()
            .find(|entry| &entry.binding == binding)
            .map(|entry| entry.keys.as_slice())
    }

    /// Total number of bindings, float and object reference.
    pub fn binding_count(&self) -> usize {
        self.curves.len() + self.object_reference_curves.len()
    }

    /// Iterates over every binding, float curves first.
    pub fn bindings(&self) -> impl Iterator<Item = &CurveBinding> {
        self.curves
            .iter()
            .map(|entry| &entry.binding)
            .chain(self.object_reference_curves.iter().map(|entry| &entry.binding))
    }

    /// Length of the clip in seconds, from its last key.
    pub fn length(&self) -> f32 {
        let float_end = self
            .curves
            .iter()
            .flat_map(|entry| entry.curve.keys.iter().map(|k| k.time));
        let reference_end = self
            .object_reference_curves
            .iter()
            .flat_map(|entry| entry.keys.iter().map(|k| k.time));
        float_end.chain(reference_end).fold(0.0, f32::max)
    }
}

// =============================================================================
// Blend Tree
// =============================================================================

/// Blend tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendTreeType {
    #[default]
    Simple1D,
    SimpleDirectional2D,
    FreeformDirectional2D,
    FreeformCartesian2D,
    Direct,
}

/// A motion inside a blend tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildMotion {
    pub motion: Option<ObjectId>,
    #[serde(default)]
    pub threshold: f32,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    #[serde(default)]
    pub cycle_offset: f32,
    #[serde(default)]
    pub direct_blend_parameter: String,
    #[serde(default)]
    pub mirror: bool,
}

fn default_time_scale() -> f32 {
    1.0
}

impl ChildMotion {
    pub fn new(motion: ObjectId, threshold: f32) -> Self {
        Self {
            motion: Some(motion),
            threshold,
            position: [0.0, 0.0],
            time_scale: 1.0,
            cycle_offset: 0.0,
            direct_blend_parameter: String::new(),
            mirror: false,
        }
    }
}

/// A blend tree motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendTree {
    pub name: String,
    #[serde(default)]
    pub blend_type: BlendTreeType,
    #[serde(default)]
    pub blend_parameter: String,
    #[serde(default)]
    pub blend_parameter_y: String,
    #[serde(default)]
    pub children: Vec<ChildMotion>,
}

impl BlendTree {
    pub fn new(name: impl Into<String>, blend_parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blend_type: BlendTreeType::Simple1D,
            blend_parameter: blend_parameter.into(),
            blend_parameter_y: String::new(),
            children: Vec::new(),
        }
    }

    /// Adds a child motion at the given threshold.
    pub fn with_child(mut self, motion: ObjectId, threshold: f32) -> Self {
        self.children.push(ChildMotion::new(motion, threshold));
        self
    }
}
