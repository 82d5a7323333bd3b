//! AvatarLib Animator Graphs
//!
//! This crate models avatar animator controllers as serialized editor data and
//! merges several of them into one.
//!
//! # Overview
//!
//! - **[`model`]** - Controllers, layers, state machines, states, transitions,
//!   behaviours and motions, stored in an [`ObjectArena`](model::ObjectArena)
//!   and addressed by [`ObjectId`](model::ObjectId) handles
//! - **[`copy`]** - Cache-consistent deep copy with an injectable override hook
//! - **[`rebase`]** - Moves clip curve bindings below a new hierarchy path
//! - **[`walker`]** - Cycle-safe traversal of nested state machines
//! - **[`merger`]** - Accumulates layers and parameters of many controllers
//! - **[`generate`]** / **[`clip_utils`]** - Builders for common toggle layers and clips
//! - **[`store`]** - Persistence seam for hosts that save assets
//!
//! # Merging
//!
//! Each source controller is added with a rebase path. Its layers are deep
//! copied, every clip reached from them is rebased below that path (proxy
//! clips excepted), duplicate layer names get a `_N` suffix, synced layers
//! are reattached to their copied base layer and layer control behaviours are
//! pointed at their new absolute layer index.
//!
//! ```
//! use avatarlib_anim::merger::{Merger, WriteDefaultsMode};
//! use avatarlib_anim::model::{AnimatorController, Layer, ObjectArena, Parameter, StateMachine};
//!
//! let mut arena = ObjectArena::new();
//! let mut sources = Vec::new();
//! for name in ["Hat", "Glasses"] {
//!     let machine = arena.insert(StateMachine::new(name));
//!     let mut controller = AnimatorController::new(name);
//!     controller.add_parameter(Parameter::float("Speed", 1.0));
//!     controller.add_layer(Layer::new("Base", Some(machine)));
//!     sources.push(arena.insert(controller));
//! }
//!
//! let mut merger = Merger::new(&mut arena);
//! for source in sources {
//!     merger.add_graph("Avatar", source, WriteDefaultsMode::On).unwrap();
//! }
//! let merged = merger.merge().unwrap();
//!
//! let controller = arena.controller(merged).unwrap();
//! assert_eq!(controller.parameters.len(), 1);
//! assert_eq!(controller.layers[1].name, "Base_1");
//! ```

pub mod clip_utils;
pub mod copy;
pub mod error;
pub mod generate;
pub mod merger;
pub mod model;
pub mod rebase;
pub mod store;
pub mod walker;

pub use copy::{deep_copy, CopyCache, CopyHook, DeepCopier, NoHook};
pub use error::{AnimError, AnimResult};
pub use generate::{
    generate_any_state_layer, generate_motion_time_layer, generate_toggle_layer, LayerOptions,
};
pub use merger::{MergeConfig, Merger, WriteDefaultsMode};
pub use rebase::{rebase_clip, rebase_curve_path, ClipRebaser, RebaseHook};
pub use store::{AssetSink, AssetStore, ContainerHandle, MemoryStore, NullStore, StoreError};
pub use walker::{walk_state_machines, walk_states, StateWalker};
