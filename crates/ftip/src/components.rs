#![forbid(unsafe_code)]

//! Host components for a singleton group.
//!
//! Mount targets and the source as descendants of the [`SingletonComponent`]
//! so their callbacks run before the coordinator's in every commit.

use ftip_runtime::{Cleanup, CommitCx, Component, EffectSlot, MutableBox};
use tracing::trace;

use crate::bindings::{SourceBinding, TargetBinding};
use crate::coordinator::{CommitOutcome, Coordinator};
use crate::engine::OverlayEngine;
use crate::state::{RegistrationEntry, SourceData};

/// Drives a [`Coordinator`] from host commits.
pub struct SingletonComponent<E: OverlayEngine> {
    coordinator: MutableBox<Coordinator<E>>,
}

impl<E: OverlayEngine> SingletonComponent<E> {
    /// Mounts the coordinator.
    pub fn new(coordinator: MutableBox<Coordinator<E>>) -> Self {
        coordinator.update(Coordinator::mount);
        Self { coordinator }
    }
}

impl<E: OverlayEngine> Component for SingletonComponent<E> {
    fn name(&self) -> &'static str {
        "singleton"
    }

    fn on_commit(&mut self, cx: &mut CommitCx) {
        let outcome = self.coordinator.update(Coordinator::on_commit);
        trace!(target: "ftip.singleton", commit = cx.commit(), outcome = ?outcome, "singleton commit");
        if outcome == CommitOutcome::RequestCommit {
            cx.request_commit();
        }
    }

    fn on_unmount(&mut self) {
        self.coordinator.update(Coordinator::teardown);
    }
}

/// Binds the current source data on every commit.
pub struct SourceComponent<E: OverlayEngine> {
    binding: SourceBinding<E>,
    data: MutableBox<SourceData<E::Content>>,
    mount: EffectSlot<()>,
}

impl<E: OverlayEngine> SourceComponent<E> {
    pub fn new(binding: SourceBinding<E>, data: MutableBox<SourceData<E::Content>>) -> Self {
        Self {
            binding,
            data,
            mount: EffectSlot::new(),
        }
    }
}

impl<E: OverlayEngine + 'static> Component for SourceComponent<E> {
    fn name(&self) -> &'static str {
        "singleton-source"
    }

    fn on_commit(&mut self, _cx: &mut CommitCx) {
        let binding = self.binding.clone();
        self.mount.run((), || {
            let unbind: Cleanup = Box::new(move || binding.unbind());
            Some(unbind)
        });
        self.binding.bind(self.data.get());
    }

    fn on_unmount(&mut self) {
        self.mount.cleanup();
    }
}

/// Registers one target on every commit with its current content.
pub struct TargetComponent<E: OverlayEngine> {
    binding: TargetBinding<E>,
    instance: E::Instance,
    content: MutableBox<E::Content>,
    mount: EffectSlot<()>,
}

impl<E: OverlayEngine> TargetComponent<E> {
    pub fn new(
        binding: TargetBinding<E>,
        instance: E::Instance,
        content: MutableBox<E::Content>,
    ) -> Self {
        Self {
            binding,
            instance,
            content,
            mount: EffectSlot::new(),
        }
    }

    #[must_use]
    pub fn instance(&self) -> &E::Instance {
        &self.instance
    }
}

impl<E: OverlayEngine + 'static> Component for TargetComponent<E> {
    fn name(&self) -> &'static str {
        "singleton-target"
    }

    fn on_commit(&mut self, _cx: &mut CommitCx) {
        let binding = self.binding.clone();
        let instance = self.instance.clone();
        self.mount.run((), || {
            let unregister: Cleanup = Box::new(move || {
                binding.unregister(&instance);
            });
            Some(unregister)
        });
        self.binding
            .register(RegistrationEntry::new(self.instance.clone(), self.content.get()));
    }

    fn on_unmount(&mut self) {
        self.mount.cleanup();
    }
}
