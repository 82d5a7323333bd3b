//! Animator controllers, their parameters and layers.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::object::ObjectId;
use crate::error::AnimResult;

// =============================================================================
// Parameters
// =============================================================================

/// Type of an animator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Bool,
    Int,
    Float,
    Trigger,
}

impl ParameterType {
    /// Returns the type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Bool => "bool",
            ParameterType::Int => "int",
            ParameterType::Float => "float",
            ParameterType::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An animator parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub default_bool: bool,
    #[serde(default)]
    pub default_int: i32,
    #[serde(default)]
    pub default_float: f32,
}

impl Parameter {
    fn with_type(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            parameter_type,
            default_bool: false,
            default_int: 0,
            default_float: 0.0,
        }
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self {
            default_bool: default,
            ..Self::with_type(name, ParameterType::Bool)
        }
    }

    pub fn int(name: impl Into<String>, default: i32) -> Self {
        Self {
            default_int: default,
            ..Self::with_type(name, ParameterType::Int)
        }
    }

    pub fn float(name: impl Into<String>, default: f32) -> Self {
        Self {
            default_float: default,
            ..Self::with_type(name, ParameterType::Float)
        }
    }

    pub fn trigger(name: impl Into<String>) -> Self {
        Self::with_type(name, ParameterType::Trigger)
    }
}

// =============================================================================
// Layers
// =============================================================================

/// How a layer combines with the layers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendingMode {
    #[default]
    Override,
    Additive,
}

/// Per-state overrides of a synced layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOverride {
    pub state: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<ObjectId>,
    #[serde(default)]
    pub behaviours: Vec<ObjectId>,
}

fn default_synced_layer_index() -> i32 {
    -1
}

/// One independently weighted layer of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub default_weight: f32,
    #[serde(default)]
    pub blending_mode: BlendingMode,
    #[serde(default)]
    pub ik_pass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_mask: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine: Option<ObjectId>,
    /// Index of the layer this one is synced to, `-1` for none.
    #[serde(default = "default_synced_layer_index")]
    pub synced_layer_index: i32,
    #[serde(default)]
    pub synced_layer_affects_timing: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<StateOverride>,
}

impl Layer {
    /// Creates an unsynced layer driven by `state_machine`.
    pub fn new(name: impl Into<String>, state_machine: Option<ObjectId>) -> Self {
        Self {
            name: name.into(),
            default_weight: 0.0,
            blending_mode: BlendingMode::Override,
            ik_pass: false,
            avatar_mask: None,
            state_machine,
            synced_layer_index: -1,
            synced_layer_affects_timing: false,
            overrides: Vec::new(),
        }
    }

    /// Sets the default weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.default_weight = weight;
        self
    }

    /// Syncs this layer to the layer at `index`.
    pub fn synced_to(mut self, index: i32) -> Self {
        self.synced_layer_index = index;
        self
    }

    /// Returns true if the layer declares a synced base layer.
    pub fn is_synced(&self) -> bool {
        self.synced_layer_index >= 0
    }

    fn override_entry(&self, state: ObjectId) -> Option<&StateOverride> {
        self.overrides.iter().find(|entry| entry.state == state)
    }

    fn override_entry_mut(&mut self, state: ObjectId) -> &mut StateOverride {
        let position = match self.overrides.iter().position(|entry| entry.state == state) {
            Some(position) => position,
            None => {
                self.overrides.push(StateOverride {
                    state,
                    motion: None,
                    behaviours: Vec::new(),
                });
                self.overrides.len() - 1
            }
        };
        &mut self.overrides[position]
    }

    /// Returns the override motion of `state`.
    pub fn override_motion(&self, state: ObjectId) -> Option<ObjectId> {
        self.override_entry(state).and_then(|entry| entry.motion)
    }

    /// Sets the override motion of `state`.
    pub fn set_override_motion(&mut self, state: ObjectId, motion: Option<ObjectId>) {
        self.override_entry_mut(state).motion = motion;
    }

    /// Returns the override behaviours of `state`.
    pub fn override_behaviours(&self, state: ObjectId) -> &[ObjectId] {
        self.override_entry(state)
            .map(|entry| entry.behaviours.as_slice())
            .unwrap_or(&[])
    }

    /// Sets the override behaviours of `state`.
    pub fn set_override_behaviours(&mut self, state: ObjectId, behaviours: Vec<ObjectId>) {
        self.override_entry_mut(state).behaviours = behaviours;
    }
}

// =============================================================================
// Controller
// =============================================================================

/// An animator controller: parameters plus an ordered list of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorController {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl AnimatorController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Appends a layer.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Returns the parameter named `name`.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns true if a parameter with this name and type exists.
    pub fn has_parameter(&self, name: &str, parameter_type: ParameterType) -> bool {
        self.parameters
            .iter()
            .any(|p| p.name == name && p.parameter_type == parameter_type)
    }

    /// Returns the layer named `name`.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Removes every layer whose name matches `regex`. Returns how many were removed.
    pub fn remove_layers_matching(&mut self, regex: &Regex) -> usize {
        let before = self.layers.len();
        self.layers.retain(|layer| !regex.is_match(&layer.name));
        before - self.layers.len()
    }

    /// Removes every parameter whose name matches `regex`. Returns how many were removed.
    pub fn remove_parameters_matching(&mut self, regex: &Regex) -> usize {
        let before = self.parameters.len();
        self.parameters.retain(|p| !regex.is_match(&p.name));
        before - self.parameters.len()
    }

    /// Compiles `pattern` and removes matching layers.
    pub fn remove_layers(&mut self, pattern: &str) -> AnimResult<usize> {
        let regex = Regex::new(pattern)?;
        Ok(self.remove_layers_matching(&regex))
    }

    /// Compiles `pattern` and removes matching parameters.
    pub fn remove_parameters(&mut self, pattern: &str) -> AnimResult<usize> {
        let regex = Regex::new(pattern)?;
        Ok(self.remove_parameters_matching(&regex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AnimatorController {
        let mut controller = AnimatorController::new("FX");
        controller.add_parameter(Parameter::float("Speed", 0.0));
        controller.add_parameter(Parameter::bool("AL_Hat", false));
        controller.add_parameter(Parameter::int("AL_Outfit", 0));
        controller.add_layer(Layer::new("Base", None));
        controller.add_layer(Layer::new("AL_Hat", None));
        controller.add_layer(Layer::new("AL_Outfit", None));
        controller
    }

    #[test]
    fn test_has_parameter_checks_type() {
        let controller = controller();
        assert!(controller.has_parameter("Speed", ParameterType::Float));
        assert!(!controller.has_parameter("Speed", ParameterType::Int));
        assert!(!controller.has_parameter("Missing", ParameterType::Float));
    }

    #[test]
    fn test_remove_by_pattern() {
        let mut controller = controller();
        assert_eq!(controller.remove_layers("^AL_").unwrap(), 2);
        assert_eq!(controller.remove_parameters("^AL_").unwrap(), 2);
        assert_eq!(controller.layers.len(), 1);
        assert_eq!(controller.parameters[0].name, "Speed");
    }

    #[test]
    fn test_remove_with_invalid_pattern() {
        let mut controller = controller();
        let err = controller.remove_layers("(").unwrap_err();
        assert_eq!(err.code(), "ANIM_007");
        assert_eq!(controller.layers.len(), 3);
    }

    #[test]
    fn test_layer_overrides_by_state() {
        let mut layer = Layer::new("Gesture", None).synced_to(0);
        assert!(layer.is_synced());
        assert_eq!(layer.override_motion(ObjectId(1)), None);

        layer.set_override_motion(ObjectId(1), Some(ObjectId(10)));
        layer.set_override_behaviours(ObjectId(1), vec![ObjectId(11)]);
        layer.set_override_motion(ObjectId(1), Some(ObjectId(12)));

        assert_eq!(layer.overrides.len(), 1);
        assert_eq!(layer.override_motion(ObjectId(1)), Some(ObjectId(12)));
        assert_eq!(layer.override_behaviours(ObjectId(1)), &[ObjectId(11)]);
        assert!(layer.override_behaviours(ObjectId(2)).is_empty());
    }
}
