//! The object arena every graph lives in.

use serde::{Deserialize, Serialize};

use super::behaviour::Behaviour;
use super::clip::{AnimationClip, BlendTree};
use super::controller::AnimatorController;
use super::object::{AssetObject, ObjectId, ObjectKind};
use super::state_machine::{AnimatorState, ChildState, ChildStateMachine, StateMachine, Transition};
use crate::error::{AnimError, AnimResult};

/// Handle translation produced by [`ObjectArena::absorb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRemap {
    offset: u32,
}

impl IdRemap {
    /// Maps a handle of the absorbed arena to its handle in the target arena.
    pub fn apply(&self, id: ObjectId) -> ObjectId {
        ObjectId(id.0 + self.offset)
    }
}

/// A `Vec`-backed store of graph objects addressed by [`ObjectId`].
///
/// Objects are never removed, so a handle stays valid for the arena's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectArena {
    objects: Vec<AssetObject>,
}

macro_rules! typed_accessors {
    ($($get:ident, $get_mut:ident, $variant:ident, $ty:ty, $kind:ident;)*) => {
        $(
            #[doc = concat!("Returns the `", stringify!($variant), "` behind `id`.")]
            pub fn $get(&self, id: ObjectId) -> AnimResult<&$ty> {
                match self.object(id)? {
                    AssetObject::$variant(inner) => Ok(inner),
                    other => Err(AnimError::wrong_kind(id, ObjectKind::$kind, other.kind())),
                }
            }

            #[doc = concat!("Returns the `", stringify!($variant), "` behind `id` mutably.")]
            pub fn $get_mut(&mut self, id: ObjectId) -> AnimResult<&mut $ty> {
                match self.object_mut(id)? {
                    AssetObject::$variant(inner) => Ok(inner),
                    other => Err(AnimError::wrong_kind(id, ObjectKind::$kind, other.kind())),
                }
            }
        )*
    };
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena from objects laid out by handle index.
    pub fn from_objects(objects: Vec<AssetObject>) -> Self {
        Self { objects }
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stores `object` and returns its handle.
    pub fn insert(&mut self, object: impl Into<AssetObject>) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object.into());
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&AssetObject> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut AssetObject> {
        self.objects.get_mut(id.index())
    }

    /// Like [`get`](Self::get), but a dangling handle is an error.
    pub fn object(&self, id: ObjectId) -> AnimResult<&AssetObject> {
        self.get(id).ok_or(AnimError::MissingObject { id })
    }

    /// Like [`get_mut`](Self::get_mut), but a dangling handle is an error.
    pub fn object_mut(&mut self, id: ObjectId) -> AnimResult<&mut AssetObject> {
        self.get_mut(id).ok_or(AnimError::MissingObject { id })
    }

    /// Replaces the object behind `id`.
    pub fn replace(&mut self, id: ObjectId, object: AssetObject) -> AnimResult<()> {
        *self.object_mut(id)? = object;
        Ok(())
    }

    /// Iterates over `(handle, object)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &AssetObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjectId(index as u32), object))
    }

    typed_accessors! {
        controller, controller_mut, Controller, AnimatorController, Controller;
        state_machine, state_machine_mut, StateMachine, StateMachine, StateMachine;
        state, state_mut, State, AnimatorState, State;
        transition, transition_mut, Transition, Transition, Transition;
        behaviour, behaviour_mut, Behaviour, Behaviour, Behaviour;
        clip, clip_mut, Clip, AnimationClip, Clip;
        blend_tree, blend_tree_mut, BlendTree, BlendTree, BlendTree;
    }

    /// Appends every object of `other`, rewriting its internal handles.
    pub fn absorb(&mut self, other: ObjectArena) -> IdRemap {
        let remap = IdRemap {
            offset: self.objects.len() as u32,
        };
        for mut object in other.objects {
            for slot in object.object_refs_mut() {
                *slot = remap.apply(*slot);
            }
            self.objects.push(object);
        }
        remap
    }

    // =========================================================================
    // Graph building
    // =========================================================================

    /// Stores `state` and places it in `machine` at `position`.
    pub fn add_state(
        &mut self,
        machine: ObjectId,
        state: AnimatorState,
        position: [f32; 3],
    ) -> AnimResult<ObjectId> {
        self.state_machine(machine)?;
        let id = self.insert(state);
        self.state_machine_mut(machine)?.states.push(ChildState {
            state: Some(id),
            position,
        });
        Ok(id)
    }

    /// Stores `child` and nests it inside `machine`.
    pub fn add_child_state_machine(
        &mut self,
        machine: ObjectId,
        child: StateMachine,
        position: [f32; 3],
    ) -> AnimResult<ObjectId> {
        self.state_machine(machine)?;
        let id = self.insert(child);
        self.state_machine_mut(machine)?
            .state_machines
            .push(ChildStateMachine {
                state_machine: Some(id),
                position,
            });
        Ok(id)
    }

    /// Adds an AnyState transition from `machine` into `destination`.
    pub fn add_any_state_transition(
        &mut self,
        machine: ObjectId,
        destination: ObjectId,
    ) -> AnimResult<ObjectId> {
        self.state_machine(machine)?;
        let id = self.insert(Transition::to_state(destination));
        self.state_machine_mut(machine)?.any_state_transitions.push(id);
        Ok(id)
    }

    /// Adds a transition from state `source` into state `destination`.
    pub fn add_state_transition(
        &mut self,
        source: ObjectId,
        destination: ObjectId,
    ) -> AnimResult<ObjectId> {
        self.state(source)?;
        let id = self.insert(Transition::to_state(destination));
        self.state_mut(source)?.transitions.push(id);
        Ok(id)
    }

    /// Attaches a new behaviour to state `state`.
    pub fn add_state_behaviour(&mut self, state: ObjectId, behaviour: Behaviour) -> AnimResult<ObjectId> {
        self.state(state)?;
        let id = self.insert(behaviour);
        self.state_mut(state)?.behaviours.push(id);
        Ok(id)
    }
}

macro_rules! into_asset_object {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AssetObject {
                fn from(value: $ty) -> Self {
                    AssetObject::$variant(value)
                }
            }
        )*
    };
}

into_asset_object! {
    AnimatorController => Controller,
    StateMachine => StateMachine,
    AnimatorState => State,
    Transition => Transition,
    Behaviour => Behaviour,
    AnimationClip => Clip,
    BlendTree => BlendTree,
    super::object::ExternalAsset => External,
    super::object::UnsupportedAsset => Unsupported,
}
