//! In-memory animator graph model.
//!
//! Every graph object lives in an [`ObjectArena`] and is addressed by an
//! [`ObjectId`]. Object-valued fields hold handles; string fields never do.

mod arena;
mod behaviour;
mod clip;
mod controller;
mod document;
mod object;
mod state_machine;

pub use arena::{IdRemap, ObjectArena};
pub use behaviour::{BlendablePlayable, Behaviour};
pub use clip::{
    AnimationClip, AnimationCurve, BindingType, BlendTree, BlendTreeType, Bounds, ChildMotion,
    ClipSettings, CurveBinding, CurveEntry, Keyframe, ObjectReferenceCurveEntry,
    ObjectReferenceKeyframe, WrapMode,
};
pub use controller::{
    AnimatorController, BlendingMode, Layer, Parameter, ParameterType, StateOverride,
};
pub use document::AssetDocument;
pub use object::{AssetObject, ExternalAsset, ExternalKind, ObjectId, ObjectKind, UnsupportedAsset};
pub use state_machine::{
    AnimatorState, ChildState, ChildStateMachine, Condition, ConditionMode, InterruptionSource,
    StateMachine, Transition,
};
