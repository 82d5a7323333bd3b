//! Cache-consistent deep copy of graph objects.
//!
//! A copy walks every object-valued field of the original, copying each
//! reachable object at most once per [`CopyCache`]. Platform assets are shared
//! rather than copied, and a [`CopyHook`] may substitute its own replacement
//! for any object before the generic copy runs.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{AnimError, AnimResult};
use crate::model::{AssetObject, ObjectArena, ObjectId};
use crate::store::AssetSink;

/// Maps original handles to their copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyCache {
    copies: HashMap<ObjectId, ObjectId>,
}

impl CopyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the copy of `original`, if one was made.
    pub fn get(&self, original: ObjectId) -> Option<ObjectId> {
        self.copies.get(&original).copied()
    }

    pub fn contains(&self, original: ObjectId) -> bool {
        self.copies.contains_key(&original)
    }

    pub fn insert(&mut self, original: ObjectId, copy: ObjectId) {
        self.copies.insert(original, copy);
    }

    /// Number of originals with a copy.
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

/// Substitutes a replacement for an object about to be copied.
pub trait CopyHook {
    /// Returns `Some(replacement)` to use instead of a generic copy of
    /// `original`, or `None` to let the copier proceed.
    fn override_copy(
        &mut self,
        arena: &mut ObjectArena,
        sink: &mut dyn AssetSink,
        original: ObjectId,
    ) -> AnimResult<Option<ObjectId>>;
}

/// Hook that never overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl CopyHook for NoHook {
    fn override_copy(
        &mut self,
        _arena: &mut ObjectArena,
        _sink: &mut dyn AssetSink,
        _original: ObjectId,
    ) -> AnimResult<Option<ObjectId>> {
        Ok(None)
    }
}

impl<F> CopyHook for F
where
    F: FnMut(&mut ObjectArena, &mut dyn AssetSink, ObjectId) -> AnimResult<Option<ObjectId>>,
{
    fn override_copy(
        &mut self,
        arena: &mut ObjectArena,
        sink: &mut dyn AssetSink,
        original: ObjectId,
    ) -> AnimResult<Option<ObjectId>> {
        self(arena, sink, original)
    }
}

/// Deep copier bound to one arena, cache, hook and sink.
pub struct DeepCopier<'a> {
    arena: &'a mut ObjectArena,
    cache: &'a mut CopyCache,
    hook: &'a mut dyn CopyHook,
    sink: &'a mut dyn AssetSink,
    created: Vec<ObjectId>,
}

impl<'a> DeepCopier<'a> {
    pub fn new(
        arena: &'a mut ObjectArena,
        cache: &'a mut CopyCache,
        hook: &'a mut dyn CopyHook,
        sink: &'a mut dyn AssetSink,
    ) -> Self {
        Self {
            arena,
            cache,
            hook,
            sink,
            created: Vec::new(),
        }
    }

    pub fn arena(&self) -> &ObjectArena {
        self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ObjectArena {
        self.arena
    }

    /// Returns the objects constructed by this copier since the last call,
    /// in construction order. Hook replacements are not included.
    pub fn take_created(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.created)
    }

    /// Copies `None` to `None` and anything else through [`copy`](Self::copy).
    pub fn copy_opt(&mut self, original: Option<ObjectId>) -> AnimResult<Option<ObjectId>> {
        original.map(|id| self.copy(id)).transpose()
    }

    /// Deep-copies `original` and returns the handle of its copy.
    ///
    /// External assets come back unchanged. Unsupported objects abort the
    /// copy with [`AnimError::UnknownType`].
    pub fn copy(&mut self, original: ObjectId) -> AnimResult<ObjectId> {
        match self.arena.object(original)? {
            AssetObject::External(_) => return Ok(original),
            AssetObject::Unsupported(unsupported) => {
                return Err(AnimError::unknown_type(unsupported.type_name.clone()));
            }
            _ => {}
        }

        if let Some(copy) = self.cache.get(original) {
            return Ok(copy);
        }

        if let Some(replacement) = self.hook.override_copy(self.arena, self.sink, original)? {
            self.cache.insert(original, replacement);
            return Ok(replacement);
        }

        let mut object = self.arena.object(original)?.clone();
        let copy = self.arena.insert(object.clone());
        // Cached before recursing so cycles resolve to this copy.
        self.cache.insert(original, copy);
        self.sink.register(copy)?;
        self.created.push(copy);
        trace!(%original, %copy, kind = %object.kind(), "copied object");

        let children = object.object_refs();
        let mut copies = Vec::with_capacity(children.len());
        for child in children {
            copies.push(self.copy(child)?);
        }
        for (slot, child_copy) in object.object_refs_mut().into_iter().zip(copies) {
            *slot = child_copy;
        }
        self.arena.replace(copy, object)?;

        Ok(copy)
    }
}

/// Deep-copies `original` with a fresh cache and no hook.
pub fn deep_copy(arena: &mut ObjectArena, original: ObjectId) -> AnimResult<ObjectId> {
    let mut cache = CopyCache::new();
    let mut sink = crate::store::Discard;
    DeepCopier::new(arena, &mut cache, &mut NoHook, &mut sink).copy(original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnimationClip, AnimatorState, Behaviour, BlendablePlayable, ExternalAsset, ExternalKind,
        StateMachine, UnsupportedAsset,
    };
    use crate::store::{AssetStore, ContainerSink, MemoryStore};
    use std::path::Path;

    fn cyclic_machine(arena: &mut ObjectArena) -> (ObjectId, ObjectId, ObjectId) {
        let root = arena.insert(StateMachine::new("Root"));
        let child = arena
            .add_child_state_machine(root, StateMachine::new("Child"), [0.0; 3])
            .unwrap();
        // The child refers back to its parent.
        arena.state_machine_mut(child).unwrap().state_machines.push(
            crate::model::ChildStateMachine {
                state_machine: Some(root),
                position: [0.0; 3],
            },
        );
        let idle = arena.add_state(root, AnimatorState::new("Idle"), [0.0; 3]).unwrap();
        let wave = arena.add_state(child, AnimatorState::new("Wave"), [0.0; 3]).unwrap();
        arena.add_state_transition(idle, wave).unwrap();
        arena.add_state_transition(wave, idle).unwrap();
        arena.add_any_state_transition(root, idle).unwrap();
        (root, idle, wave)
    }

    #[test]
    fn test_cycle_copies_each_object_once() {
        let mut arena = ObjectArena::new();
        let (root, idle, wave) = cyclic_machine(&mut arena);
        let original_count = arena.len();

        let mut cache = CopyCache::new();
        let mut sink = crate::store::Discard;
        let copy = DeepCopier::new(&mut arena, &mut cache, &mut NoHook, &mut sink)
            .copy(root)
            .unwrap();

        // root, child, idle, wave, two state transitions, one any-state transition
        assert_eq!(original_count, 7);
        assert_eq!(cache.len(), original_count);
        assert_eq!(arena.len(), original_count * 2);

        let copied_idle = cache.get(idle).unwrap();
        let copied_wave = cache.get(wave).unwrap();
        let back = arena.state(copied_wave).unwrap().transitions[0];
        assert_eq!(
            arena.transition(back).unwrap().destination_state,
            Some(copied_idle)
        );

        let copied_child = arena.state_machine(copy).unwrap().state_machines[0]
            .state_machine
            .unwrap();
        let loop_back = arena.state_machine(copied_child).unwrap().state_machines[0]
            .state_machine;
        assert_eq!(loop_back, Some(copy));
    }

    #[test]
    fn test_shared_object_copied_once() {
        let mut arena = ObjectArena::new();
        let clip = arena.insert(AnimationClip::new("Shared"));
        let machine = arena.insert(StateMachine::new("Base"));
        for name in ["A", "B"] {
            let mut state = AnimatorState::new(name);
            state.motion = Some(clip);
            arena.add_state(machine, state, [0.0; 3]).unwrap();
        }

        let copy = deep_copy(&mut arena, machine).unwrap();
        let states: Vec<_> = arena.state_machine(copy).unwrap().state_ids().collect();
        let motions: Vec<_> = states
            .iter()
            .map(|s| arena.state(*s).unwrap().motion.unwrap())
            .collect();
        assert_eq!(motions[0], motions[1]);
        assert_ne!(motions[0], clip);
    }

    #[test]
    fn test_external_assets_are_shared() {
        let mut arena = ObjectArena::new();
        let script = arena.insert(ExternalAsset::new(ExternalKind::Script, "Driver"));
        assert_eq!(deep_copy(&mut arena, script).unwrap(), script);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_unsupported_object_aborts() {
        let mut arena = ObjectArena::new();
        let particles = arena.insert(UnsupportedAsset {
            type_name: "ParticleSystem".to_string(),
            name: "Sparkles".to_string(),
        });
        let mut state = AnimatorState::new("Sparkle");
        state.motion = Some(particles);
        let state = arena.insert(state);

        let err = deep_copy(&mut arena, state).unwrap_err();
        assert!(matches!(err, AnimError::UnknownType { ref type_name } if type_name == "ParticleSystem"));
    }

    #[test]
    fn test_hook_replacement_is_cached() {
        let mut arena = ObjectArena::new();
        let clip = arena.insert(AnimationClip::new("Idle"));
        let replacement = arena.insert(AnimationClip::new("Replacement"));
        let mut state = AnimatorState::new("Idle");
        state.motion = Some(clip);
        let state = arena.insert(state);

        let mut calls = 0;
        let mut hook = |arena: &mut ObjectArena,
                        _sink: &mut dyn AssetSink,
                        id: ObjectId|
         -> AnimResult<Option<ObjectId>> {
            calls += 1;
            Ok(arena.clip(id).ok().map(|_| replacement))
        };
        let mut cache = CopyCache::new();
        let mut sink = crate::store::Discard;
        let mut copier = DeepCopier::new(&mut arena, &mut cache, &mut hook, &mut sink);
        let copy = copier.copy(state).unwrap();
        copier.copy(clip).unwrap();

        assert_eq!(arena.state(copy).unwrap().motion, Some(replacement));
        assert_eq!(cache.get(clip), Some(replacement));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_created_objects_registered_with_sink() {
        let mut arena = ObjectArena::new();
        let state = arena.insert(AnimatorState::new("Idle"));
        arena
            .add_state_behaviour(state, Behaviour::layer_control(BlendablePlayable::Fx, 0, 1.0))
            .unwrap();

        let mut store = MemoryStore::new();
        let handle = store
            .create_container(Path::new("Copy.controller"), state)
            .unwrap();
        let mut cache = CopyCache::new();
        let mut sink = ContainerSink::new(&mut store, Some(handle));
        let mut hook = NoHook;
        let mut copier = DeepCopier::new(&mut arena, &mut cache, &mut hook, &mut sink);
        let copy = copier.copy(state).unwrap();
        let created = copier.take_created();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0], copy);
        assert_eq!(store.container(handle).unwrap().objects[1..], created[..]);
    }

    #[test]
    fn test_copy_opt_none() {
        let mut arena = ObjectArena::new();
        let mut cache = CopyCache::new();
        let mut sink = crate::store::Discard;
        let mut hook = NoHook;
        let mut copier = DeepCopier::new(&mut arena, &mut cache, &mut hook, &mut sink);
        assert_eq!(copier.copy_opt(None).unwrap(), None);
    }
}
