//! Object handles and the closed set of object kinds stored in an arena.

use serde::{Deserialize, Serialize};

use super::behaviour::Behaviour;
use super::clip::{AnimationClip, BlendTree};
use super::controller::AnimatorController;
use super::state_machine::{AnimatorState, StateMachine, Transition};

/// Handle of an object stored in an [`ObjectArena`](super::ObjectArena).
///
/// Two handles are equal exactly when they name the same object, which is the
/// identity the deep-copy cache is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Returns the slot index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag of an [`AssetObject`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Controller,
    StateMachine,
    State,
    Transition,
    Behaviour,
    Clip,
    BlendTree,
    External,
    Unsupported,
}

impl ObjectKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Controller => "controller",
            ObjectKind::StateMachine => "state_machine",
            ObjectKind::State => "state",
            ObjectKind::Transition => "transition",
            ObjectKind::Behaviour => "behaviour",
            ObjectKind::Clip => "clip",
            ObjectKind::BlendTree => "blend_tree",
            ObjectKind::External => "external",
            ObjectKind::Unsupported => "unsupported",
        }
    }

    /// Returns true for motion kinds (clips and blend trees).
    pub fn is_motion(&self) -> bool {
        matches!(self, ObjectKind::Clip | ObjectKind::BlendTree)
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform resources that are shared by reference and never copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalKind {
    Script,
    ScriptableObject,
    Texture,
    Material,
    AvatarMask,
}

/// An immutable platform asset referenced from the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAsset {
    pub kind: ExternalKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path: Option<String>,
}

impl ExternalAsset {
    pub fn new(kind: ExternalKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            asset_path: None,
        }
    }
}

/// An object of a type the graph model does not understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedAsset {
    pub type_name: String,
    #[serde(default)]
    pub name: String,
}

/// Every object an arena can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetObject {
    Controller(AnimatorController),
    StateMachine(StateMachine),
    State(AnimatorState),
    Transition(Transition),
    Behaviour(Behaviour),
    Clip(AnimationClip),
    BlendTree(BlendTree),
    External(ExternalAsset),
    Unsupported(UnsupportedAsset),
}

fn push_ref<'a>(refs: &mut Vec<&'a mut ObjectId>, slot: &'a mut Option<ObjectId>) {
    if let Some(id) = slot.as_mut() {
        refs.push(id);
    }
}

impl AssetObject {
    /// Returns the kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            AssetObject::Controller(_) => ObjectKind::Controller,
            AssetObject::StateMachine(_) => ObjectKind::StateMachine,
            AssetObject::State(_) => ObjectKind::State,
            AssetObject::Transition(_) => ObjectKind::Transition,
            AssetObject::Behaviour(_) => ObjectKind::Behaviour,
            AssetObject::Clip(_) => ObjectKind::Clip,
            AssetObject::BlendTree(_) => ObjectKind::BlendTree,
            AssetObject::External(_) => ObjectKind::External,
            AssetObject::Unsupported(_) => ObjectKind::Unsupported,
        }
    }

    /// Returns the display name of this object.
    pub fn name(&self) -> &str {
        match self {
            AssetObject::Controller(c) => &c.name,
            AssetObject::StateMachine(m) => &m.name,
            AssetObject::State(s) => &s.name,
            AssetObject::Transition(t) => &t.name,
            AssetObject::Behaviour(b) => b.type_name(),
            AssetObject::Clip(c) => &c.name,
            AssetObject::BlendTree(b) => &b.name,
            AssetObject::External(e) => &e.name,
            AssetObject::Unsupported(u) => &u.name,
        }
    }

    /// Returns every object-valued field of this object, in a stable order.
    ///
    /// String fields (parameter names, paths, tags) are never references.
    pub fn object_refs_mut(&mut self) -> Vec<&mut ObjectId> {
        let mut refs = Vec::new();
        match self {
            AssetObject::Controller(controller) => {
                for layer in &mut controller.layers {
                    push_ref(&mut refs, &mut layer.avatar_mask);
                    push_ref(&mut refs, &mut layer.state_machine);
                    for entry in &mut layer.overrides {
                        refs.push(&mut entry.state);
                        push_ref(&mut refs, &mut entry.motion);
                        refs.extend(entry.behaviours.iter_mut());
                    }
                }
            }
            AssetObject::StateMachine(machine) => {
                for child in &mut machine.states {
                    push_ref(&mut refs, &mut child.state);
                }
                for child in &mut machine.state_machines {
                    push_ref(&mut refs, &mut child.state_machine);
                }
                push_ref(&mut refs, &mut machine.default_state);
                refs.extend(machine.any_state_transitions.iter_mut());
                refs.extend(machine.entry_transitions.iter_mut());
                refs.extend(machine.behaviours.iter_mut());
            }
            AssetObject::State(state) => {
                push_ref(&mut refs, &mut state.motion);
                refs.extend(state.behaviours.iter_mut());
                refs.extend(state.transitions.iter_mut());
            }
            AssetObject::Transition(transition) => {
                push_ref(&mut refs, &mut transition.destination_state);
                push_ref(&mut refs, &mut transition.destination_state_machine);
            }
            AssetObject::Clip(clip) => {
                for entry in &mut clip.object_reference_curves {
                    for key in &mut entry.keys {
                        push_ref(&mut refs, &mut key.value);
                    }
                }
            }
            AssetObject::BlendTree(tree) => {
                for child in &mut tree.children {
                    push_ref(&mut refs, &mut child.motion);
                }
            }
            AssetObject::Behaviour(_) | AssetObject::External(_) | AssetObject::Unsupported(_) => {}
        }
        refs
    }

    /// Returns the handles this object references, in the order of
    /// [`object_refs_mut`](Self::object_refs_mut).
    pub fn object_refs(&self) -> Vec<ObjectId> {
        self.clone().object_refs_mut().into_iter().map(|id| *id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildState, StateMachine};

    #[test]
    fn test_state_machine_refs_skip_empty_slots() {
        let mut machine = StateMachine::new("Base");
        machine.states.push(ChildState {
            state: Some(ObjectId(3)),
            position: [0.0, 0.0, 0.0],
        });
        machine.states.push(ChildState {
            state: None,
            position: [0.0, 0.0, 0.0],
        });
        machine.default_state = Some(ObjectId(3));
        machine.any_state_transitions.push(ObjectId(7));

        let object = AssetObject::StateMachine(machine);
        assert_eq!(
            object.object_refs(),
            vec![ObjectId(3), ObjectId(3), ObjectId(7)]
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ObjectKind::StateMachine.as_str(), "state_machine");
        assert!(ObjectKind::Clip.is_motion());
        assert!(!ObjectKind::State.is_motion());
        assert_eq!(ObjectId(12).to_string(), "#12");
    }
}
