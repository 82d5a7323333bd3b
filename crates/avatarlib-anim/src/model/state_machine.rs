//! State machines, states and transitions.

use serde::{Deserialize, Serialize};

use super::object::ObjectId;

/// A state placed inside a state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildState {
    /// `None` marks a corrupted or missing slot.
    pub state: Option<ObjectId>,
    #[serde(default)]
    pub position: [f32; 3],
}

/// A nested state machine placed inside a state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildStateMachine {
    pub state_machine: Option<ObjectId>,
    #[serde(default)]
    pub position: [f32; 3],
}

/// A directed graph of states and transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachine {
    pub name: String,
    #[serde(default)]
    pub states: Vec<ChildState>,
    #[serde(default)]
    pub state_machines: Vec<ChildStateMachine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_state: Option<ObjectId>,
    #[serde(default)]
    pub any_state_transitions: Vec<ObjectId>,
    #[serde(default)]
    pub entry_transitions: Vec<ObjectId>,
    #[serde(default)]
    pub behaviours: Vec<ObjectId>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            state_machines: Vec::new(),
            default_state: None,
            any_state_transitions: Vec::new(),
            entry_transitions: Vec::new(),
            behaviours: Vec::new(),
        }
    }

    /// Iterates over the occupied state slots in declared order.
    pub fn state_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.states.iter().filter_map(|child| child.state)
    }

    /// Iterates over the occupied child machine slots in declared order.
    pub fn child_machine_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.state_machines
            .iter()
            .filter_map(|child| child.state_machine)
    }
}

/// A node of a state machine playing one motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorState {
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<ObjectId>,
    #[serde(default)]
    pub behaviours: Vec<ObjectId>,
    #[serde(default)]
    pub transitions: Vec<ObjectId>,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub speed_parameter: String,
    #[serde(default)]
    pub speed_parameter_active: bool,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub mirror_parameter: String,
    #[serde(default)]
    pub mirror_parameter_active: bool,
    #[serde(default)]
    pub cycle_offset: f32,
    #[serde(default)]
    pub cycle_offset_parameter: String,
    #[serde(default)]
    pub cycle_offset_parameter_active: bool,
    #[serde(default)]
    pub time_parameter: String,
    #[serde(default)]
    pub time_parameter_active: bool,
    #[serde(default)]
    pub ik_on_feet: bool,
    #[serde(default = "default_write_default_values")]
    pub write_default_values: bool,
}

fn default_speed() -> f32 {
    1.0
}

fn default_write_default_values() -> bool {
    true
}

impl AnimatorState {
    /// Creates a state with default playback settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            motion: None,
            behaviours: Vec::new(),
            transitions: Vec::new(),
            speed: 1.0,
            speed_parameter: String::new(),
            speed_parameter_active: false,
            mirror: false,
            mirror_parameter: String::new(),
            mirror_parameter_active: false,
            cycle_offset: 0.0,
            cycle_offset_parameter: String::new(),
            cycle_offset_parameter_active: false,
            time_parameter: String::new(),
            time_parameter_active: false,
            ik_on_feet: false,
            write_default_values: true,
        }
    }

    /// Copies playback fields and behaviours from `reference`.
    ///
    /// The name, motion, transitions and write defaults flag are left alone.
    /// Behaviour handles are shared with the reference, not copied.
    pub fn copy_fields_from(&mut self, reference: &AnimatorState) {
        self.behaviours = reference.behaviours.clone();
        self.cycle_offset = reference.cycle_offset;
        self.cycle_offset_parameter = reference.cycle_offset_parameter.clone();
        self.cycle_offset_parameter_active = reference.cycle_offset_parameter_active;
        self.ik_on_feet = reference.ik_on_feet;
        self.mirror = reference.mirror;
        self.mirror_parameter = reference.mirror_parameter.clone();
        self.mirror_parameter_active = reference.mirror_parameter_active;
        self.speed = reference.speed;
        self.speed_parameter = reference.speed_parameter.clone();
        self.speed_parameter_active = reference.speed_parameter_active;
        self.time_parameter = reference.time_parameter.clone();
        self.time_parameter_active = reference.time_parameter_active;
    }

    /// Resets the fields covered by [`copy_fields_from`](Self::copy_fields_from).
    pub fn reset_fields(&mut self) {
        self.copy_fields_from(&AnimatorState::new(""));
    }
}

/// How a transition condition compares its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    If,
    IfNot,
    Greater,
    Less,
    Equals,
    NotEqual,
}

/// A single transition condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub mode: ConditionMode,
    #[serde(default)]
    pub threshold: f32,
    pub parameter: String,
}

impl Condition {
    pub fn new(mode: ConditionMode, threshold: f32, parameter: impl Into<String>) -> Self {
        Self {
            mode,
            threshold,
            parameter: parameter.into(),
        }
    }
}

/// Which transitions may interrupt a running transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionSource {
    #[default]
    None,
    Source,
    Destination,
    SourceThenDestination,
    DestinationThenSource,
}

/// A state or AnyState transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_state: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_state_machine: Option<ObjectId>,
    #[serde(default)]
    pub is_exit: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub solo: bool,
    #[serde(default)]
    pub has_exit_time: bool,
    #[serde(default)]
    pub exit_time: f32,
    #[serde(default)]
    pub has_fixed_duration: bool,
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub offset: f32,
    #[serde(default)]
    pub interruption_source: InterruptionSource,
    #[serde(default)]
    pub ordered_interruption: bool,
    #[serde(default)]
    pub can_transition_to_self: bool,
}

impl Transition {
    /// Creates a transition with the editor's defaults.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            conditions: Vec::new(),
            destination_state: None,
            destination_state_machine: None,
            is_exit: false,
            mute: false,
            solo: false,
            has_exit_time: true,
            exit_time: 0.0,
            has_fixed_duration: true,
            duration: 0.0,
            offset: 0.0,
            interruption_source: InterruptionSource::None,
            ordered_interruption: true,
            can_transition_to_self: true,
        }
    }

    /// Creates a transition into `state`.
    pub fn to_state(state: ObjectId) -> Self {
        Self {
            destination_state: Some(state),
            ..Self::new()
        }
    }

    /// Appends a condition.
    pub fn add_condition(&mut self, mode: ConditionMode, threshold: f32, parameter: impl Into<String>) {
        self.conditions.push(Condition::new(mode, threshold, parameter));
    }

    /// Copies every field except the name and destinations, conditions included.
    pub fn copy_fields_from(&mut self, reference: &Transition) {
        self.can_transition_to_self = reference.can_transition_to_self;
        self.duration = reference.duration;
        self.exit_time = reference.exit_time;
        self.has_exit_time = reference.has_exit_time;
        self.has_fixed_duration = reference.has_fixed_duration;
        self.interruption_source = reference.interruption_source;
        self.is_exit = reference.is_exit;
        self.mute = reference.mute;
        self.offset = reference.offset;
        self.ordered_interruption = reference.ordered_interruption;
        self.solo = reference.solo;
        self.conditions = reference.conditions.clone();
    }

    /// Resets the fields covered by [`copy_fields_from`](Self::copy_fields_from).
    ///
    /// The interruption source is kept.
    pub fn reset_fields(&mut self) {
        let interruption_source = self.interruption_source;
        self.copy_fields_from(&Transition::new());
        self.interruption_source = interruption_source;
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new()
    }
}
