#![forbid(unsafe_code)]

//! ftip error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Nothing reaches the caller as `Err`** from coordinator or binding
//!    operations. Every condition maps to a [`DegradationAction`] and the
//!    group keeps running.
//! 2. **Diagnostics are development-only.** [`report`] emits through
//!    `tracing` when `debug_assertions` are enabled and is silent otherwise.
//! 3. **Loading errors are ordinary errors.** [`OptionsError`] is returned from
//!    the file/string loaders on `SingletonOptions`.

use std::fmt;

// ── Singleton diagnostics ───────────────────────────────────────────────

/// Non-fatal conditions detected while coordinating a singleton group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonError {
    /// The creation commit arrived and no source binding was attached.
    MissingSource,
    /// A class-name setting was configured while a custom render override
    /// owns the overlay content.
    ClassNameWithCustomRender,
}

/// What the coordinator does instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Skip overlay creation; the group stays inert until remounted.
    SkipCreation,
    /// Ignore the offending setting and carry on.
    IgnoreSetting,
}

impl SingletonError {
    /// Determine the graceful degradation action for this condition.
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::MissingSource => DegradationAction::SkipCreation,
            Self::ClassNameWithCustomRender => DegradationAction::IgnoreSetting,
        }
    }

    /// Short label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingSource => "missing_source",
            Self::ClassNameWithCustomRender => "class_name_with_custom_render",
        }
    }

    /// Every singleton condition is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

impl fmt::Display for SingletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource => write!(
                f,
                "the singleton source binding was never bound to an overlay content element; \
                 remount the group after binding it"
            ),
            Self::ClassNameWithCustomRender => write!(
                f,
                "cannot use the `className` setting together with a custom render override; \
                 place the class on the element you are rendering"
            ),
        }
    }
}

impl std::error::Error for SingletonError {}

/// Emit a development diagnostic for `err`.
///
/// Compiled to a no-op in release builds.
pub fn report(err: &SingletonError) {
    #[cfg(debug_assertions)]
    match err.degradation() {
        DegradationAction::SkipCreation => tracing::error!(
            target: "ftip.diagnostic",
            error_type = err.error_type(),
            "{err}"
        ),
        DegradationAction::IgnoreSetting => tracing::warn!(
            target: "ftip.diagnostic",
            error_type = err.error_type(),
            "{err}"
        ),
    }
    #[cfg(not(debug_assertions))]
    let _ = err;
}

// ── Options loading ─────────────────────────────────────────────────────

/// Errors from loading [`SingletonOptions`](crate::SingletonOptions).
#[derive(Debug)]
pub enum OptionsError {
    /// Reading the file failed.
    Io(std::io::Error),
    /// TOML parse or shape error.
    #[cfg(feature = "options-config")]
    Toml(toml::de::Error),
    /// JSON parse or shape error.
    Json(serde_json::Error),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "options I/O: {err}"),
            #[cfg(feature = "options-config")]
            Self::Toml(err) => write!(f, "options TOML: {err}"),
            Self::Json(err) => write!(f, "options JSON: {err}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            #[cfg(feature = "options-config")]
            Self::Toml(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for OptionsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for OptionsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
