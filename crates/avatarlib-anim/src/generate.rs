//! Layer generators for common toggle and selector layers.
//!
//! Every generator checks its parameter before creating anything, then adds a
//! new full-weight layer to the controller and returns its state machine.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{AnimError, AnimResult};
use crate::model::{
    AnimatorState, ConditionMode, Layer, ObjectArena, ObjectId, ParameterType, StateMachine,
    Transition,
};

/// Shared options of the layer generators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerOptions<'r> {
    /// Write defaults flag of every generated state.
    pub write_defaults: bool,
    /// State whose playback fields are copied onto every generated state.
    pub reference_state: Option<&'r AnimatorState>,
    /// Transition whose fields, conditions included, are copied onto every
    /// generated transition.
    pub reference_transition: Option<&'r Transition>,
}

impl<'r> LayerOptions<'r> {
    pub fn new(write_defaults: bool) -> Self {
        Self {
            write_defaults,
            ..Default::default()
        }
    }

    pub fn reference_state(mut self, state: &'r AnimatorState) -> Self {
        self.reference_state = Some(state);
        self
    }

    pub fn reference_transition(mut self, transition: &'r Transition) -> Self {
        self.reference_transition = Some(transition);
        self
    }

    fn state(&self, name: impl Into<String>, motion: Option<ObjectId>) -> AnimatorState {
        let mut state = AnimatorState::new(name);
        match self.reference_state {
            Some(reference) => state.copy_fields_from(reference),
            None => state.reset_fields(),
        }
        state.write_default_values = self.write_defaults;
        state.motion = motion;
        state
    }

    /// Adds an AnyState transition into `state` with one condition on top of
    /// the reference transition's.
    fn any_state_transition(
        &self,
        arena: &mut ObjectArena,
        machine: ObjectId,
        state: ObjectId,
        mode: ConditionMode,
        threshold: f32,
        parameter: &str,
    ) -> AnimResult<ObjectId> {
        let id = arena.add_any_state_transition(machine, state)?;
        let transition = arena.transition_mut(id)?;
        match self.reference_transition {
            Some(reference) => transition.copy_fields_from(reference),
            None => transition.reset_fields(),
        }
        transition.add_condition(mode, threshold, parameter);
        Ok(id)
    }
}

fn require_parameter(
    arena: &ObjectArena,
    controller: ObjectId,
    parameter: &str,
    parameter_type: ParameterType,
) -> AnimResult<()> {
    if arena
        .controller(controller)?
        .has_parameter(parameter, parameter_type)
    {
        Ok(())
    } else {
        Err(AnimError::parameter_not_found(parameter, parameter_type))
    }
}

fn motion_name(arena: &ObjectArena, motion: Option<ObjectId>, fallback: &str) -> AnimResult<String> {
    match motion {
        Some(id) => Ok(arena.object(id)?.name().to_string()),
        None => Ok(fallback.to_string()),
    }
}

fn push_layer(
    arena: &mut ObjectArena,
    controller: ObjectId,
    layer_name: &str,
    machine: ObjectId,
) -> AnimResult<()> {
    let layer = Layer::new(layer_name, Some(machine)).with_weight(1.0);
    arena.controller_mut(controller)?.add_layer(layer);
    debug!(layer = layer_name, "generated layer");
    Ok(())
}

/// Generates an `AnyState --(parameter == value)--> state` selector layer.
///
/// `pairs` maps each value of the `Int` parameter to the motion to play; the
/// state for value 0 is the default state.
pub fn generate_any_state_layer(
    arena: &mut ObjectArena,
    controller: ObjectId,
    layer_name: &str,
    parameter: &str,
    pairs: &BTreeMap<i32, ObjectId>,
    options: LayerOptions<'_>,
) -> AnimResult<ObjectId> {
    require_parameter(arena, controller, parameter, ParameterType::Int)?;
    if !pairs.contains_key(&0) {
        return Err(AnimError::missing_default_state(layer_name));
    }

    let names = pairs
        .values()
        .map(|motion| motion_name(arena, Some(*motion), layer_name))
        .collect::<AnimResult<Vec<_>>>()?;

    let machine = arena.insert(StateMachine::new(layer_name));
    for ((value, motion), name) in pairs.iter().zip(names) {
        let position = [370.0, 20.0 - 100.0 * *value as f32, 0.0];
        let state = arena.add_state(machine, options.state(name, Some(*motion)), position)?;
        if *value == 0 {
            arena.state_machine_mut(machine)?.default_state = Some(state);
        }
        options.any_state_transition(
            arena,
            machine,
            state,
            ConditionMode::Equals,
            *value as f32,
            parameter,
        )?;
    }

    push_layer(arena, controller, layer_name, machine)?;
    Ok(machine)
}

/// Generates an on/off layer driven by a `Bool` parameter.
///
/// The off state is the default. With `inverted`, the off state plays while
/// the parameter is true. `off_motion` may be `None` when write defaults
/// restore the off pose.
#[allow(clippy::too_many_arguments)]
pub fn generate_toggle_layer(
    arena: &mut ObjectArena,
    controller: ObjectId,
    layer_name: &str,
    parameter: &str,
    off_motion: Option<ObjectId>,
    on_motion: ObjectId,
    inverted: bool,
    options: LayerOptions<'_>,
) -> AnimResult<ObjectId> {
    require_parameter(arena, controller, parameter, ParameterType::Bool)?;

    let off_name = motion_name(arena, off_motion, "Off")?;
    let on_name = motion_name(arena, Some(on_motion), "On")?;
    let machine = arena.insert(StateMachine::new(layer_name));
    let off = arena.add_state(machine, options.state(off_name, off_motion), [370.0, 20.0, 0.0])?;
    let on = arena.add_state(
        machine,
        options.state(on_name, Some(on_motion)),
        [370.0, -80.0, 0.0],
    )?;
    arena.state_machine_mut(machine)?.default_state = Some(off);

    let (off_mode, on_mode) = if inverted {
        (ConditionMode::If, ConditionMode::IfNot)
    } else {
        (ConditionMode::IfNot, ConditionMode::If)
    };
    options.any_state_transition(arena, machine, off, off_mode, 0.0, parameter)?;
    options.any_state_transition(arena, machine, on, on_mode, 0.0, parameter)?;

    push_layer(arena, controller, layer_name, machine)?;
    Ok(machine)
}

/// Generates a layer with one state whose playback time follows a `Float`
/// parameter.
pub fn generate_motion_time_layer(
    arena: &mut ObjectArena,
    controller: ObjectId,
    layer_name: &str,
    parameter: &str,
    motion: ObjectId,
    options: LayerOptions<'_>,
) -> AnimResult<ObjectId> {
    require_parameter(arena, controller, parameter, ParameterType::Float)?;

    let name = motion_name(arena, Some(motion), layer_name)?;
    let machine = arena.insert(StateMachine::new(layer_name));
    let mut state = options.state(name, Some(motion));
    state.time_parameter = parameter.to_string();
    state.time_parameter_active = true;
    let state = arena.add_state(machine, state, [370.0, 20.0, 0.0])?;
    arena.state_machine_mut(machine)?.default_state = Some(state);

    push_layer(arena, controller, layer_name, machine)?;
    Ok(machine)
}
