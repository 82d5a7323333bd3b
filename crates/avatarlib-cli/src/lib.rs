//! AvatarLib CLI library.
//!
//! Command implementations for the `avatarlib` binary, plus the plan file
//! format, document loading and the JSON file asset store they share.

pub mod commands;
pub mod input;
pub mod logging;
pub mod plan;
pub mod store;
