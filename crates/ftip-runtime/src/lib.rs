#![forbid(unsafe_code)]

//! ftip Runtime
//!
//! A small, deterministic host that drives component lifecycle callbacks the
//! way a UI framework's commit phase does.
//!
//! # Key Components
//!
//! - [`Host`] - Component tree with post-order (child-before-parent) commits
//! - [`Component`] - Trait for anything that wants commit/unmount callbacks
//! - [`CommitHandle`] - Request another commit (the state-change re-render)
//! - [`EffectSlot`] - Dependency-keyed effect with a returned cleanup
//! - [`MutableBox`] - Mutable cell that survives commits without requesting one
//! - [`Memo`] - Value computed at most once per owner
//!
//! # Role in ftip
//! `ftip` coordinates a shared overlay across many components. It relies on
//! two guarantees from this crate: within one commit every descendant's
//! callback runs before its ancestor's, and cleanups run before the next
//! callback of the same effect or on permanent removal.

pub mod cell;
pub mod effect;
pub mod host;

pub use cell::{Memo, MutableBox};
pub use effect::{Cleanup, EffectSlot};
pub use host::{CommitCx, CommitHandle, CommitReport, Component, Host, MAX_CASCADE, NodeId};
