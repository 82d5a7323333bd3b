//! AvatarLib Expressions
//!
//! Expression menus and expression parameters for avatars, with the
//! platform's capacity limits enforced on every addition:
//!
//! - a menu page holds at most [`MAX_CONTROLS`] controls
//! - synced parameters may use at most [`MAX_PARAMETER_COST`] bits
//!
//! Additions that would exceed a limit fail and leave the target unchanged.

pub mod builder;
pub mod error;
pub mod menu;
pub mod parameters;

pub use builder::MenuBuilder;
pub use error::{ExprError, ExprResult};
pub use menu::{
    add_sub_menu, create_sub_menu, create_sub_menu_with, remove_controls,
    remove_controls_matching, Control, ControlParameter, ControlType, ExpressionsMenu, Label,
    MAX_CONTROLS,
};
pub use parameters::{
    parameters_cost, ExpressionParameter, ExpressionParameters, ValueType, MAX_PARAMETER_COST,
};
