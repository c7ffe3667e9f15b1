#![forbid(unsafe_code)]

//! Effects with returned cleanups.
//!
//! An [`EffectSlot`] remembers the dependencies it last ran with and the
//! cleanup its last run returned. Running it again with different
//! dependencies first runs that cleanup. [`EffectSlot::cleanup`] is what a
//! component calls on unmount.

/// Cleanup returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

/// One effect and its pending cleanup.
pub struct EffectSlot<D> {
    deps: Option<D>,
    cleanup: Option<Cleanup>,
    runs: u64,
}

impl<D> std::fmt::Debug for EffectSlot<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSlot")
            .field("runs", &self.runs)
            .field("has_deps", &self.deps.is_some())
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}

impl<D> Default for EffectSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> EffectSlot<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            deps: None,
            cleanup: None,
            runs: 0,
        }
    }

    /// Run the pending cleanup, if any.
    pub fn cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }

    /// How many times the effect body has run.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    #[must_use]
    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }
}

impl<D: PartialEq> EffectSlot<D> {
    /// Run the effect if `deps` differ from the last run.
    ///
    /// Returns `true` when the effect body ran.
    pub fn run(&mut self, deps: D, effect: impl FnOnce() -> Option<Cleanup>) -> bool {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }
        self.cleanup();
        self.deps = Some(deps);
        self.cleanup = effect();
        self.runs += 1;
        true
    }
}
