//! Core reactive runtime and hook registry for lookout.

pub mod hooks;
pub mod reactive;

// Re-export reactive types for convenience
pub use reactive::{Effect, Signal, batch, untracked};

// Re-export hooks for ergonomic state management
pub use hooks::{
    Component, HookMeta, RefHandle, use_effect_cleanup, use_memo, use_ref, use_signal,
};
