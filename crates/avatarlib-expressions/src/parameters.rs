//! Expression parameters and the synced parameter budget.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExprError, ExprResult};

/// Total synced parameter cost an avatar may use, in bits.
pub const MAX_PARAMETER_COST: u32 = 256;

/// Value type of an expression parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Float,
    Bool,
}

impl ValueType {
    /// Bits used by one parameter of this type.
    pub fn cost(self) -> u32 {
        match self {
            ValueType::Int | ValueType::Float => 8,
            ValueType::Bool => 1,
        }
    }
}

/// A single expression parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameter {
    pub name: String,
    pub value_type: ValueType,
    #[serde(default)]
    pub default_value: f32,
    #[serde(default = "default_true")]
    pub saved: bool,
    #[serde(default = "default_true")]
    pub network_synced: bool,
}

fn default_true() -> bool {
    true
}

impl ExpressionParameter {
    /// A saved, network synced parameter.
    pub fn new(name: impl Into<String>, value_type: ValueType, default_value: f32) -> Self {
        Self {
            name: name.into(),
            value_type,
            default_value,
            saved: true,
            network_synced: true,
        }
    }

    pub fn cost(&self) -> u32 {
        self.value_type.cost()
    }
}

/// Sums the cost of `parameters`.
pub fn parameters_cost<'p>(parameters: impl IntoIterator<Item = &'p ExpressionParameter>) -> u32 {
    parameters.into_iter().map(ExpressionParameter::cost).sum()
}

/// The expression parameter list of an avatar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameters {
    #[serde(default)]
    pub parameters: Vec<ExpressionParameter>,
}

impl ExpressionParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(&self, name: &str) -> Option<&ExpressionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn total_cost(&self) -> u32 {
        parameters_cost(&self.parameters)
    }

    /// Budget left after adding `new`. Negative when `new` does not fit.
    pub fn remaining_cost(&self, new: &[ExpressionParameter]) -> i64 {
        i64::from(MAX_PARAMETER_COST) - i64::from(self.total_cost()) - i64::from(parameters_cost(new))
    }

    /// Appends `new`, or nothing at all if the budget would be exceeded.
    pub fn add_parameters(&mut self, new: Vec<ExpressionParameter>) -> ExprResult<()> {
        let current = self.total_cost();
        let requested = current + parameters_cost(&new);
        if requested > MAX_PARAMETER_COST {
            return Err(ExprError::parameter_overflow(
                current,
                requested,
                MAX_PARAMETER_COST,
            ));
        }
        debug!(added = new.len(), cost = requested, "added expression parameters");
        self.parameters.extend(new);
        Ok(())
    }

    /// Removes every parameter whose name matches `pattern`.
    pub fn remove_parameters_matching(&mut self, pattern: &Regex) -> usize {
        let before = self.parameters.len();
        self.parameters.retain(|p| !pattern.is_match(&p.name));
        before - self.parameters.len()
    }

    /// Compiles `pattern` and removes every matching parameter.
    pub fn remove_parameters(&mut self, pattern: &str) -> ExprResult<usize> {
        let pattern = Regex::new(pattern)?;
        Ok(self.remove_parameters_matching(&pattern))
    }
}
