//! Error types for graph operations.

use thiserror::Error;

use crate::model::{ObjectId, ObjectKind, ParameterType};
use crate::store::StoreError;

/// Result type for graph operations.
pub type AnimResult<T> = Result<T, AnimError>;

/// Errors that can occur while copying, merging or generating graphs.
#[derive(Debug, Error)]
pub enum AnimError {
    /// Deep copy met an object outside the graph model.
    #[error("Cannot copy object of unknown type '{type_name}'")]
    UnknownType { type_name: String },

    /// The same parameter name was declared with two types.
    #[error("Parameter '{parameter}' already exists as {existing}, cannot merge it as {incoming}")]
    ParameterTypeConflict {
        parameter: String,
        existing: ParameterType,
        incoming: ParameterType,
    },

    /// An any-state layer was requested without a motion for value 0.
    #[error("No default state value (0) was provided for layer '{layer}'; a motion for value 0 is required")]
    MissingDefaultState { layer: String },

    /// A layer generator referenced a parameter the controller lacks.
    #[error("Parameter '{parameter}' of type {expected} does not exist on the controller")]
    ParameterNotFound {
        parameter: String,
        expected: ParameterType,
    },

    /// A handle does not name any object.
    #[error("Object {id} does not exist")]
    MissingObject { id: ObjectId },

    /// A handle names an object of another kind.
    #[error("Object {id} is a {found}, expected {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// A name filter failed to compile.
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The asset store rejected a write.
    #[error("Asset store error: {0}")]
    Store(#[from] StoreError),

    /// An asset document could not be parsed.
    #[error("Failed to parse asset document: {0}")]
    ParseDocument(#[source] serde_json::Error),

    /// An asset document could not be serialized.
    #[error("Failed to serialize asset document: {0}")]
    SerializeDocument(#[source] serde_json::Error),
}

impl AnimError {
    /// Creates a new unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Creates a new parameter type conflict error.
    pub fn parameter_type_conflict(
        parameter: impl Into<String>,
        existing: ParameterType,
        incoming: ParameterType,
    ) -> Self {
        Self::ParameterTypeConflict {
            parameter: parameter.into(),
            existing,
            incoming,
        }
    }

    /// Creates a new missing default state error.
    pub fn missing_default_state(layer: impl Into<String>) -> Self {
        Self::MissingDefaultState {
            layer: layer.into(),
        }
    }

    /// Creates a new parameter not found error.
    pub fn parameter_not_found(parameter: impl Into<String>, expected: ParameterType) -> Self {
        Self::ParameterNotFound {
            parameter: parameter.into(),
            expected,
        }
    }

    /// Creates a new wrong kind error.
    pub fn wrong_kind(id: ObjectId, expected: ObjectKind, found: ObjectKind) -> Self {
        Self::WrongKind {
            id,
            expected,
            found,
        }
    }

    /// Returns a stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AnimError::UnknownType { .. } => "ANIM_001",
            AnimError::ParameterTypeConflict { .. } => "ANIM_002",
            AnimError::MissingDefaultState { .. } => "ANIM_003",
            AnimError::ParameterNotFound { .. } => "ANIM_004",
            AnimError::MissingObject { .. } => "ANIM_005",
            AnimError::WrongKind { .. } => "ANIM_006",
            AnimError::InvalidPattern(_) => "ANIM_007",
            AnimError::Store(_) => "ANIM_008",
            AnimError::ParseDocument(_) => "ANIM_009",
            AnimError::SerializeDocument(_) => "ANIM_010",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_both_types() {
        let err = AnimError::parameter_type_conflict("Speed", ParameterType::Float, ParameterType::Int);
        let message = err.to_string();
        assert!(message.contains("Speed"));
        assert!(message.contains("float"));
        assert!(message.contains("int"));
        assert_eq!(err.code(), "ANIM_002");
    }

    #[test]
    fn test_unknown_type_message() {
        let err = AnimError::unknown_type("ParticleSystem");
        assert_eq!(
            err.to_string(),
            "Cannot copy object of unknown type 'ParticleSystem'"
        );
    }
}
