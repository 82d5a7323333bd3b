//! Error types for expression menus and parameters.

use thiserror::Error;

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors raised when a menu or parameter list would exceed platform limits.
#[derive(Debug, Error)]
pub enum ExprError {
    /// The menu already holds the maximum number of controls.
    #[error("Cannot add more controls ({control}) to the current menu with {count} controls already!")]
    MenuOverflow { control: String, count: usize },

    /// The synced parameter budget would be exceeded.
    #[error(
        "Cannot add {} bits of synced parameters! {current}/{max} -> {requested}/{max} which exceeds {} bits of data! Try removing some parameters before proceeding!",
        .requested - .current,
        .requested - .max
    )]
    ParameterOverflow {
        current: u32,
        requested: u32,
        max: u32,
    },

    /// `end_sub_menu` was called without a matching `begin_sub_menu`.
    #[error("There is no parent menu to end, was begin_sub_menu called?")]
    NoParentMenu,

    /// `build` was called while a sub-menu was still open.
    #[error("Sub-menu '{name}' was never ended")]
    UnclosedSubMenu { name: String },

    /// A name filter failed to compile.
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ExprError {
    /// Creates a new menu overflow error.
    pub fn menu_overflow(control: impl Into<String>, count: usize) -> Self {
        Self::MenuOverflow {
            control: control.into(),
            count,
        }
    }

    /// Creates a new parameter overflow error.
    pub fn parameter_overflow(current: u32, requested: u32, max: u32) -> Self {
        Self::ParameterOverflow {
            current,
            requested,
            max,
        }
    }

    /// Returns the error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::MenuOverflow { .. } => "EXPR_001",
            ExprError::ParameterOverflow { .. } => "EXPR_002",
            ExprError::NoParentMenu => "EXPR_003",
            ExprError::UnclosedSubMenu { .. } => "EXPR_004",
            ExprError::InvalidPattern(_) => "EXPR_005",
        }
    }
}
