//! Unit tests for the merger.

use std::path::Path;

use pretty_assertions::assert_eq;

use super::*;
use crate::model::{
    AnimationClip, AnimationCurve, AnimatorState, Behaviour, BindingType, BlendablePlayable,
    ChildStateMachine, CurveBinding, ParameterType, StateMachine,
};
use crate::store::MemoryStore;

/// Adds a controller with one single-state layer per name.
fn controller_with_layers(arena: &mut ObjectArena, name: &str, layers: &[&str]) -> ObjectId {
    let mut controller = AnimatorController::new(name);
    for layer_name in layers {
        let machine = arena.insert(StateMachine::new(*layer_name));
        let state = arena
            .add_state(machine, AnimatorState::new("Idle"), [0.0; 3])
            .unwrap();
        arena.state_machine_mut(machine).unwrap().default_state = Some(state);
        controller.add_layer(Layer::new(*layer_name, Some(machine)).with_weight(0.5));
    }
    arena.insert(controller)
}

fn layer_names(merger: &Merger<'_>) -> Vec<String> {
    merger.layers().iter().map(|l| l.name.clone()).collect()
}

#[test]
fn test_first_layer_weight_forced() {
    let mut arena = ObjectArena::new();
    let source = controller_with_layers(&mut arena, "Hat", &["Base", "Toggle"]);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", source, WriteDefaultsMode::DoNothing).unwrap();

    assert_eq!(merger.layers()[0].default_weight, 1.0);
    assert_eq!(merger.layers()[1].default_weight, 0.5);
}

#[test]
fn test_duplicate_names_get_counter_suffix() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base", "Hat"]);
    let second = controller_with_layers(&mut arena, "B", &["Base"]);
    let third = controller_with_layers(&mut arena, "C", &["Base", "Base_1"]);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", third, WriteDefaultsMode::DoNothing).unwrap();

    assert_eq!(
        layer_names(&merger),
        vec!["Base", "Hat", "Base_1", "Base_2", "Base_1_1"]
    );
}

#[test]
fn test_dedup_skips_taken_candidates() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base", "Base_1"]);
    let second = controller_with_layers(&mut arena, "B", &["Base"]);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();

    assert_eq!(layer_names(&merger), vec!["Base", "Base_1", "Base_2"]);
}

#[test]
fn test_same_parameter_kept_once() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Base"]);
    arena
        .controller_mut(first)
        .unwrap()
        .add_parameter(Parameter::float("Speed", 1.0));
    arena
        .controller_mut(second)
        .unwrap()
        .add_parameter(Parameter::float("Speed", 2.0));

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();

    assert_eq!(merger.parameters().len(), 1);
    assert_eq!(merger.parameters()[0].default_float, 1.0);
}

#[test]
fn test_conflict_commits_nothing() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Base"]);
    arena
        .controller_mut(first)
        .unwrap()
        .add_parameter(Parameter::float("Speed", 0.0));
    {
        let controller = arena.controller_mut(second).unwrap();
        controller.add_parameter(Parameter::bool("Hat", false));
        controller.add_parameter(Parameter::int("Speed", 0));
    }

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    let err = merger
        .add_graph("", second, WriteDefaultsMode::DoNothing)
        .unwrap_err();

    assert!(matches!(
        err,
        AnimError::ParameterTypeConflict {
            existing: ParameterType::Float,
            incoming: ParameterType::Int,
            ..
        }
    ));
    assert_eq!(merger.parameters().len(), 1);
    assert_eq!(layer_names(&merger), vec!["Base"]);

    // The failed call did not consume a dedup counter.
    let third = controller_with_layers(merger.arena, "C", &["Base"]);
    merger.add_graph("", third, WriteDefaultsMode::DoNothing).unwrap();
    assert_eq!(layer_names(&merger), vec!["Base", "Base_1"]);
}

#[test]
fn test_write_defaults_forced_in_nested_machines() {
    let mut arena = ObjectArena::new();
    let root = arena.insert(StateMachine::new("Root"));
    let nested = arena
        .add_child_state_machine(root, StateMachine::new("Nested"), [0.0; 3])
        .unwrap();
    let mut outer = AnimatorState::new("Outer");
    outer.write_default_values = true;
    arena.add_state(root, outer, [0.0; 3]).unwrap();
    arena
        .add_state(nested, AnimatorState::new("Inner"), [0.0; 3])
        .unwrap();
    let mut controller = AnimatorController::new("Source");
    controller.add_layer(Layer::new("Base", Some(root)));
    let source = arena.insert(controller);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", source, WriteDefaultsMode::Off).unwrap();
    let copy = merger.layers()[0].state_machine.unwrap();

    let states: Vec<ObjectId> = walk_states(merger.arena(), copy).collect();
    assert_eq!(states.len(), 2);
    for state in states {
        assert!(!merger.arena().state(state).unwrap().write_default_values);
    }
    // Source states are untouched.
    let originals: Vec<ObjectId> = walk_states(&arena, root).collect();
    assert!(arena.state(originals[0]).unwrap().write_default_values);
}

#[test]
fn test_shared_machine_copied_once_per_rebase_path() {
    let mut arena = ObjectArena::new();
    let shared = arena.insert(StateMachine::new("Shared"));
    arena
        .add_state(shared, AnimatorState::new("Idle"), [0.0; 3])
        .unwrap();
    let mut controller = AnimatorController::new("Source");
    for name in ["Left", "Right"] {
        let root = arena.insert(StateMachine::new(name));
        arena.state_machine_mut(root).unwrap().state_machines.push(ChildStateMachine {
            state_machine: Some(shared),
            position: [0.0; 3],
        });
        controller.add_layer(Layer::new(name, Some(root)));
    }
    let source = arena.insert(controller);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("Avatar", source, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("Other", source, WriteDefaultsMode::DoNothing).unwrap();

    let nested = |merger: &Merger<'_>, index: usize| {
        let machine = merger.layers()[index].state_machine.unwrap();
        merger.arena().state_machine(machine).unwrap().state_machines[0]
            .state_machine
            .unwrap()
    };
    assert_eq!(nested(&merger, 0), nested(&merger, 1));
    assert_ne!(nested(&merger, 0), nested(&merger, 2));
    assert_ne!(nested(&merger, 0), shared);
}

#[test]
fn test_layer_control_points_at_accumulated_index() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base", "Hat"]);
    let second = controller_with_layers(&mut arena, "B", &["Base", "Gesture"]);

    let gesture_machine = arena.controller(second).unwrap().layers[1]
        .state_machine
        .unwrap();
    let state = arena.state_machine(gesture_machine).unwrap().default_state.unwrap();
    let original_behaviour = arena
        .add_state_behaviour(state, Behaviour::layer_control(BlendablePlayable::Fx, 1, 1.0))
        .unwrap();

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();

    let machine = merger.layers()[3].state_machine.unwrap();
    let copied_state = merger.arena().state_machine(machine).unwrap().default_state.unwrap();
    let behaviour = merger.arena().state(copied_state).unwrap().behaviours[0];
    assert_ne!(behaviour, original_behaviour);
    assert_eq!(
        merger.arena().behaviour(behaviour).unwrap().controlled_layer(),
        Some(3)
    );
    assert_eq!(
        arena.behaviour(original_behaviour).unwrap().controlled_layer(),
        Some(1)
    );
}

#[test]
fn test_out_of_range_synced_index_kept() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Base", "Synced"]);
    arena.controller_mut(second).unwrap().layers[1].synced_layer_index = 5;

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();

    assert_eq!(merger.layers()[2].synced_layer_index, 5);
    assert!(merger.layers()[2].overrides.is_empty());
}

#[test]
fn test_synced_index_shifted_by_committed_layers() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Base", "Synced"]);
    let (base_machine, clip) = {
        let clip = arena.insert(AnimationClip::new("Override"));
        let controller = arena.controller_mut(second).unwrap();
        controller.layers[1].synced_layer_index = 0;
        (controller.layers[0].state_machine.unwrap(), clip)
    };
    let base_state = arena.state_machine(base_machine).unwrap().default_state.unwrap();
    arena.controller_mut(second).unwrap().layers[1].set_override_motion(base_state, Some(clip));

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();

    let synced = &merger.layers()[2];
    assert_eq!(synced.synced_layer_index, 1);

    let copied_base = merger.layers()[1].state_machine.unwrap();
    let copied_state = merger.arena().state_machine(copied_base).unwrap().default_state.unwrap();
    assert_ne!(copied_state, base_state);
    // Empty rebase path shares the clip.
    assert_eq!(synced.override_motion(copied_state), Some(clip));
}

#[test]
fn test_synced_override_behaviours_copied_and_motion_rebased() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Base", "Synced"]);
    let mut override_clip = AnimationClip::new("Override");
    override_clip.set_curve(
        CurveBinding::new("Body", BindingType::GameObject, "m_IsActive"),
        AnimationCurve::constant(0.0, 0.0, 1.0),
    );
    let clip = arena.insert(override_clip);
    let behaviour = arena.insert(Behaviour::layer_control(BlendablePlayable::Fx, 1, 1.0));
    let base_machine = {
        let controller = arena.controller_mut(second).unwrap();
        controller.layers[1].synced_layer_index = 0;
        controller.layers[0].state_machine.unwrap()
    };
    let base_state = arena.state_machine(base_machine).unwrap().default_state.unwrap();
    let synced_layer = &mut arena.controller_mut(second).unwrap().layers[1];
    synced_layer.set_override_motion(base_state, Some(clip));
    synced_layer.set_override_behaviours(base_state, vec![behaviour]);

    let mut merger = Merger::new(&mut arena);
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    merger.add_graph("Avatar", second, WriteDefaultsMode::DoNothing).unwrap();

    let synced = &merger.layers()[2];
    let copied_base = merger.layers()[1].state_machine.unwrap();
    let copied_state = merger.arena().state_machine(copied_base).unwrap().default_state.unwrap();

    let copies = synced.override_behaviours(copied_state);
    assert_eq!(copies.len(), 1);
    assert_ne!(copies[0], behaviour);
    assert_eq!(
        merger.arena().behaviour(copies[0]).unwrap().controlled_layer(),
        Some(2)
    );

    let motion = synced.override_motion(copied_state).unwrap();
    assert_ne!(motion, clip);
    let rebased = merger.arena().clip(motion).unwrap();
    assert_eq!(rebased.name, "Override_Rebase");
    let paths: Vec<_> = rebased.bindings().map(|b| b.path.as_str()).collect();
    assert_eq!(paths, vec!["Avatar/Body"]);

    assert_eq!(arena.behaviour(behaviour).unwrap().controlled_layer(), Some(1));
    assert_eq!(arena.clip(clip).unwrap().name, "Override");
}

#[test]
fn test_merge_is_repeatable() {
    let mut arena = ObjectArena::new();
    let first = controller_with_layers(&mut arena, "A", &["Base"]);
    let second = controller_with_layers(&mut arena, "B", &["Extra"]);

    let mut merger = Merger::with_config(&mut arena, MergeConfig::with_controller_name("FX"));
    merger.add_graph("", first, WriteDefaultsMode::DoNothing).unwrap();
    let merged = merger.merge().unwrap();
    assert_eq!(merger.merge().unwrap(), merged);

    merger.add_graph("", second, WriteDefaultsMode::DoNothing).unwrap();
    assert_eq!(merger.merge().unwrap(), merged);

    let controller = arena.controller(merged).unwrap();
    assert_eq!(controller.name, "FX");
    assert_eq!(controller.layers.len(), 2);
}

#[test]
fn test_store_receives_copies_and_saves() {
    let mut arena = ObjectArena::new();
    let source = controller_with_layers(&mut arena, "A", &["Base"]);

    let mut merger = Merger::with_store(
        &mut arena,
        MemoryStore::new(),
        Path::new("Assets/Merged.controller"),
        MergeConfig::default(),
    )
    .unwrap();
    merger.add_graph("", source, WriteDefaultsMode::DoNothing).unwrap();
    let merged = merger.merge().unwrap();
    let store = merger.into_store();

    let container = &store.containers()[0];
    assert_eq!(container.root, merged);
    // merged controller, state machine, state
    assert_eq!(container.objects.len(), 3);
    assert_eq!(store.save_count(), 1);
}
