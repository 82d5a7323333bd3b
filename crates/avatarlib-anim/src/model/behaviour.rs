//! State machine behaviours.
//!
//! Platform behaviours are opaque tagged data, except the layer control
//! behaviour whose layer index has to follow layers as they move.

use serde::{Deserialize, Serialize};

/// The playable layer a layer control behaviour addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendablePlayable {
    #[default]
    Action,
    Fx,
    Gestures,
    Additive,
}

/// A behaviour attached to a state or state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Behaviour {
    /// Blends the weight of another layer by absolute index.
    LayerControl {
        #[serde(default)]
        playable: BlendablePlayable,
        layer: i32,
        #[serde(default)]
        goal_weight: f32,
        #[serde(default)]
        blend_duration: f32,
        #[serde(default)]
        debug_string: String,
    },
    /// Any other behaviour, carried through untouched.
    Opaque {
        type_name: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl Behaviour {
    /// Creates a layer control behaviour targeting `layer`.
    pub fn layer_control(playable: BlendablePlayable, layer: i32, goal_weight: f32) -> Self {
        Behaviour::LayerControl {
            playable,
            layer,
            goal_weight,
            blend_duration: 0.0,
            debug_string: String::new(),
        }
    }

    /// Creates an opaque behaviour.
    pub fn opaque(type_name: impl Into<String>, data: serde_json::Value) -> Self {
        Behaviour::Opaque {
            type_name: type_name.into(),
            data,
        }
    }

    /// Returns the behaviour's type name.
    pub fn type_name(&self) -> &str {
        match self {
            Behaviour::LayerControl { .. } => "VRCAnimatorLayerControl",
            Behaviour::Opaque { type_name, .. } => type_name,
        }
    }

    /// Returns the layer index of a layer control behaviour.
    pub fn controlled_layer(&self) -> Option<i32> {
        match self {
            Behaviour::LayerControl { layer, .. } => Some(*layer),
            Behaviour::Opaque { .. } => None,
        }
    }

    /// Points a layer control behaviour at `index`. Returns false for other
    /// behaviours.
    pub fn retarget_layer(&mut self, index: i32) -> bool {
        match self {
            Behaviour::LayerControl { layer, .. } => {
                *layer = index;
                true
            }
            Behaviour::Opaque { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retarget_only_layer_control() {
        let mut control = Behaviour::layer_control(BlendablePlayable::Fx, 0, 1.0);
        assert!(control.retarget_layer(3));
        assert_eq!(control.controlled_layer(), Some(3));

        let mut opaque = Behaviour::opaque("VRCAvatarParameterDriver", serde_json::json!({}));
        assert!(!opaque.retarget_layer(3));
        assert_eq!(opaque.controlled_layer(), None);
    }

    #[test]
    fn test_behaviour_json_shape() {
        let json = serde_json::to_value(Behaviour::layer_control(BlendablePlayable::Fx, 2, 1.0))
            .unwrap();
        assert_eq!(json["type"], "layer_control");
        assert_eq!(json["playable"], "fx");
        assert_eq!(json["layer"], 2);
    }
}
