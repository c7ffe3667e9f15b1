#![forbid(unsafe_code)]

//! Core types for ftip singleton overlays.
//!
//! # Key Components
//!
//! - [`PropMap`] - JSON-like configuration map handed to the overlay engine
//! - [`merge_preserve_nested`] - Recursive merge that keeps nested settings
//!   alive across repeated updates
//! - [`ClassList`] - Seam for the overlay root element's class tokens
//! - [`SingletonOptions`] - Caller-facing configuration (`disabled`, `overrides`)
//! - [`SingletonError`] - Non-fatal diagnostics and their degradation actions
//!
//! # Role in ftip
//! `ftip-core` owns the data model only. It knows nothing about overlay
//! engines, lifecycles, or hosts; those live in `ftip` and `ftip-runtime`.

pub mod class_list;
pub mod error;
pub mod options;
pub mod props;

pub use class_list::{ClassAction, ClassList, ClassSet, apply_class_tokens, class_tokens};
pub use error::{DegradationAction, OptionsError, SingletonError, report};
pub use options::SingletonOptions;
pub use props::{
    CLASS_NAME_KEY, CONTENT_KEY, OVERRIDES_KEY, POSITIONING_KEY, PropMap, merge_preserve_nested,
    merge_value,
};
