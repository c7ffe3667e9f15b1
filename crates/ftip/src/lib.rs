#![forbid(unsafe_code)]

//! ftip: one shared floating overlay for many trigger targets.
//!
//! A singleton group has one [`Coordinator`] that owns the overlay, one
//! source binding that supplies the baseline configuration, and any number
//! of target bindings, each bringing its own content. Whichever target is
//! active, the overlay shows that target's content; an open overlay follows
//! content changes without a hide/show cycle.
//!
//! ftip does not position or render anything. It drives an
//! [`OverlayEngine`] supplied by the caller.
//!
//! # Example
//!
//! ```ignore
//! let group = ftip::singleton(engine, SingletonOptions::new());
//! let root = host.mount(None, group.component());
//! host.mount(Some(root), group.source_component(source_data));
//! host.mount(Some(root), group.target_component(button, content));
//! host.flush();
//! ```

pub mod bindings;
pub mod class_sync;
pub mod components;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod plugin;
pub mod state;

#[cfg(test)]
mod test_engine;

// --- Re-exports -----------------------------------------------------------

pub use bindings::{SourceBinding, TargetBinding};
pub use class_sync::ClassSync;
pub use components::{SingletonComponent, SourceComponent, TargetComponent};
pub use config::{OverlayConfig, RenderPath, merge_config};
pub use coordinator::{CommitOutcome, Coordinator, Lifecycle, UpdatePhase};
pub use engine::{OverlayEngine, OverlayHandle, OverlayState, TargetInstance};
pub use plugin::{OverlayView, Plugin};
pub use state::{
    ContentSetter, Group, GroupState, LivePositioning, RegistrationEntry, SourceData,
};

pub use ftip_core::{PropMap, SingletonError, SingletonOptions};
pub use ftip_runtime::MutableBox;

// --- Facade ---------------------------------------------------------------

/// A singleton group: its coordinator and both bindings.
pub struct Singleton<E: OverlayEngine> {
    coordinator: MutableBox<Coordinator<E>>,
    source: SourceBinding<E>,
    target: TargetBinding<E>,
}

impl<E: OverlayEngine> Clone for Singleton<E> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

impl<E: OverlayEngine> std::fmt::Debug for Singleton<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Singleton")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Create a singleton group driving `engine`.
pub fn singleton<E: OverlayEngine>(engine: E, options: SingletonOptions) -> Singleton<E> {
    let coordinator = Coordinator::new(engine, options);
    let (source, target) = coordinator.bindings();
    Singleton {
        coordinator: MutableBox::new(coordinator),
        source,
        target,
    }
}

impl<E: OverlayEngine> Singleton<E> {
    #[must_use]
    pub fn coordinator(&self) -> &MutableBox<Coordinator<E>> {
        &self.coordinator
    }

    /// Binding for the one element that owns the overlay's configuration.
    #[must_use]
    pub fn source(&self) -> &SourceBinding<E> {
        &self.source
    }

    /// Binding for trigger targets.
    #[must_use]
    pub fn target(&self) -> &TargetBinding<E> {
        &self.target
    }

    /// Host component for the coordinator. Mounts it.
    #[must_use]
    pub fn component(&self) -> SingletonComponent<E> {
        SingletonComponent::new(self.coordinator.clone())
    }

    #[must_use]
    pub fn source_component(
        &self,
        data: MutableBox<SourceData<E::Content>>,
    ) -> SourceComponent<E> {
        SourceComponent::new(self.source.clone(), data)
    }

    #[must_use]
    pub fn target_component(
        &self,
        instance: E::Instance,
        content: MutableBox<E::Content>,
    ) -> TargetComponent<E> {
        TargetComponent::new(self.target.clone(), instance, content)
    }

    /// Replace the options; see [`Coordinator::set_options`].
    pub fn set_options(&self, options: SingletonOptions) {
        self.coordinator.update(|c| c.set_options(options));
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.coordinator.with(Coordinator::lifecycle)
    }
}
