#![forbid(unsafe_code)]

//! Test harness and reference fixtures for ftip.
//!
//! - [`RecordingEngine`] - in-memory overlay engine that logs every call and
//!   runs plugin hooks the way a real engine does
//! - [`MockTarget`] - target instance with a controllable destroyed flag
//! - [`capture_diagnostics`] - run a closure under a tracing capture layer

pub mod diagnostics;
pub mod recording;
pub mod target;

pub use diagnostics::{CapturedEvent, CapturedSpan, Capture, capture_diagnostics};
pub use recording::{EngineCall, ROOT_CLASS, RecordingEngine, RecordingHandle};
pub use target::{MockTarget, ids};
