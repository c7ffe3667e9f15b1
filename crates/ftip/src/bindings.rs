#![forbid(unsafe_code)]

//! Source and target bindings.
//!
//! Both bindings are thin handles onto the coordinator's [`Group`]. They are
//! created once per coordinator and cloned freely into host components.
//!
//! # Content hand-off
//!
//! When a target re-registers while the overlay is shown for it, the new
//! content is pushed through the source's content setter immediately, so an
//! open overlay follows content changes without hiding. The setter runs with
//! no borrow of the group held and may re-enter it.

use tracing::{debug, trace};

use crate::engine::{OverlayEngine, OverlayHandle};
use crate::state::{Group, RegistrationEntry, SourceData};

/// Binds the overlay's baseline configuration into a group.
pub struct SourceBinding<E: OverlayEngine> {
    group: Group<E>,
}

impl<E: OverlayEngine> Clone for SourceBinding<E> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
        }
    }
}

impl<E: OverlayEngine> std::fmt::Debug for SourceBinding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBinding")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<E: OverlayEngine> SourceBinding<E> {
    pub(crate) fn new(group: Group<E>) -> Self {
        Self { group }
    }

    /// Set the group's source configuration, replacing any previous one.
    pub fn bind(&self, data: SourceData<E::Content>) {
        self.group.update(|g| g.set_source(data));
        trace!(target: "ftip.singleton", "source bound");
    }

    /// Clear the source configuration. A live overlay is left alone; updates
    /// are skipped until a source binds again.
    pub fn unbind(&self) {
        if self.group.update(|g| g.clear_source()) {
            debug!(target: "ftip.singleton", "source unbound");
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.group.with(|g| g.source().is_some())
    }
}

/// Registers trigger targets into a group.
pub struct TargetBinding<E: OverlayEngine> {
    group: Group<E>,
}

impl<E: OverlayEngine> Clone for TargetBinding<E> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
        }
    }
}

impl<E: OverlayEngine> std::fmt::Debug for TargetBinding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetBinding")
            .field("registered", &self.group.with(|g| g.targets().len()))
            .finish()
    }
}

impl<E: OverlayEngine> TargetBinding<E> {
    pub(crate) fn new(group: Group<E>) -> Self {
        Self { group }
    }

    /// Register or refresh a target.
    ///
    /// The entry moves to the tail of the registration order. Returns `true`
    /// when the content was handed off to the shown overlay.
    pub fn register(&self, entry: RegistrationEntry<E::Instance, E::Content>) -> bool {
        let hand_off = self.group.update(|g| {
            let setter = g
                .source()
                .filter(|_| g.is_active(&entry.instance))
                .map(|s| (s.set_content.clone(), entry.content.clone()));
            g.upsert_target(entry);
            setter
        });

        let handed_off = match hand_off {
            Some((set_content, content)) => {
                debug!(target: "ftip.singleton", "content hand-off to active target");
                set_content(content);
                true
            }
            None => false,
        };

        let pushed = self.push_instances();
        trace!(target: "ftip.singleton", pushed, handed_off, "target registered");
        handed_off
    }

    /// Remove a target. Returns `true` if it was registered.
    pub fn unregister(&self, instance: &E::Instance) -> bool {
        let removed = self.group.update(|g| g.remove_target(instance));
        self.push_instances();
        trace!(target: "ftip.singleton", removed, "target unregistered");
        removed
    }

    /// Registered instances in registration order.
    #[must_use]
    pub fn registered(&self) -> Vec<E::Instance> {
        self.group.with(|g| g.target_instances())
    }

    fn push_instances(&self) -> bool {
        let Some((mut handle, instances)) = self.group.update(|g| g.take_live_overlay()) else {
            return false;
        };
        handle.set_instances(instances);
        self.group.update(|g| g.set_overlay(handle));
        true
    }
}
