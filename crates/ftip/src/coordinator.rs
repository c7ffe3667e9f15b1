#![forbid(unsafe_code)]

//! The singleton coordinator: lifecycle state machine and update
//! reconciliation.
//!
//! # Lifecycle
//!
//! ```text
//! Unmounted ──mount──▶ AwaitingFirstCommit ──commit──▶ Mounted ──commit──▶ Created
//!                                                         │
//!                                                         └──(no source)──▶ Inert
//! Created | Inert | Mounted | AwaitingFirstCommit ──teardown──▶ Destroyed ──mount──▶ …
//! ```
//!
//! The first commit after mount only flips the mounted marker and asks the
//! host for another commit. Creation happens on the second commit, after
//! every target nested under the coordinator has registered during the
//! first one.
//!
//! The update pass that runs in the creation commit is suppressed: creation
//! already applied the full configuration. Every later commit reconciles.
//!
//! # Invariants
//!
//! 1. At most one overlay is created per mount.
//! 2. Creation never happens on the first commit after mount.
//! 3. An overlay is created only when a source is bound.
//! 4. `options.disabled` is applied after creation and after every
//!    reconciliation.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No source at the creation commit | [`SingletonError::MissingSource`] reported, group stays [`Lifecycle::Inert`] until remounted |
//! | Source unbound after creation | Reconciliation skipped; overlay kept |
//! | Targets destroyed out of order | Pruned at teardown |
//!
//! Engine calls run with the overlay taken out of the group and no group
//! borrow held, so plugin hooks may use the bindings. While a hook runs the
//! group reports no overlay.

use std::rc::Rc;

use ftip_core::{SingletonError, SingletonOptions, report};
use ftip_runtime::Memo;
use tracing::{debug, trace};

use crate::bindings::{SourceBinding, TargetBinding};
use crate::class_sync::ClassSync;
use crate::config::merge_config;
use crate::engine::{OverlayEngine, OverlayHandle};
use crate::plugin::Plugin;
use crate::state::{Group, GroupState};

/// Where a coordinator is in its mount cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Unmounted,
    AwaitingFirstCommit,
    /// Mounted marker set; creation runs on the next commit.
    Mounted,
    Created,
    /// The creation commit passed without a source.
    Inert,
    Destroyed,
}

impl Lifecycle {
    /// Whether the coordinator is between mount and teardown.
    #[must_use]
    pub const fn is_mounted(self) -> bool {
        !matches!(self, Self::Unmounted | Self::Destroyed)
    }
}

/// Distinguishes the update pass of the creation commit from later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePhase {
    #[default]
    JustCreated,
    Steady,
}

/// What one commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Not mounted.
    Idle,
    /// First commit after mount; the host must commit again.
    RequestCommit,
    Created,
    CreationSkipped(SingletonError),
    /// Configuration and target list pushed into the overlay.
    Reconciled,
    /// No overlay or no source.
    Skipped,
}

/// Owns one singleton group and its overlay.
pub struct Coordinator<E: OverlayEngine> {
    engine: E,
    group: Group<E>,
    options: SingletonOptions,
    lifecycle: Lifecycle,
    phase: UpdatePhase,
    class_sync: Rc<dyn Plugin>,
    bindings: Memo<(SourceBinding<E>, TargetBinding<E>)>,
}

impl<E: OverlayEngine> std::fmt::Debug for Coordinator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("lifecycle", &self.lifecycle)
            .field("phase", &self.phase)
            .field("options", &self.options)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

impl<E: OverlayEngine> Coordinator<E> {
    pub fn new(engine: E, options: SingletonOptions) -> Self {
        Self {
            engine,
            group: Group::new(GroupState::new()),
            options,
            lifecycle: Lifecycle::Unmounted,
            phase: UpdatePhase::JustCreated,
            class_sync: Rc::new(ClassSync),
            bindings: Memo::new(),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    #[must_use]
    pub fn options(&self) -> &SingletonOptions {
        &self.options
    }

    #[must_use]
    pub fn group(&self) -> &Group<E> {
        &self.group
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The source and target bindings. Built once; later calls return
    /// handles onto the same group.
    #[must_use]
    pub fn bindings(&self) -> (SourceBinding<E>, TargetBinding<E>) {
        self.bindings
            .get_or_init(|| {
                (
                    SourceBinding::new(self.group.clone()),
                    TargetBinding::new(self.group.clone()),
                )
            })
            .clone()
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Start a mount cycle. No-op while already mounted.
    pub fn mount(&mut self) {
        if self.lifecycle.is_mounted() {
            return;
        }
        debug!(target: "ftip.singleton", from = ?self.lifecycle, "mount");
        self.lifecycle = Lifecycle::AwaitingFirstCommit;
        self.phase = UpdatePhase::JustCreated;
    }

    /// Run the coordinator's part of one host commit.
    pub fn on_commit(&mut self) -> CommitOutcome {
        match self.lifecycle {
            Lifecycle::Unmounted | Lifecycle::Destroyed => CommitOutcome::Idle,
            Lifecycle::AwaitingFirstCommit => {
                self.lifecycle = Lifecycle::Mounted;
                trace!(target: "ftip.singleton", "mounted marker set");
                CommitOutcome::RequestCommit
            }
            Lifecycle::Mounted => {
                let outcome = self.create();
                self.update_pass();
                outcome
            }
            Lifecycle::Created | Lifecycle::Inert => self.update_pass(),
        }
    }

    /// Destroy the overlay and prune destroyed targets.
    pub fn teardown(&mut self) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        let handle = self.group.update(GroupState::take_overlay);
        let destroyed = handle.is_some();
        if let Some(mut handle) = handle {
            handle.destroy();
        }
        let pruned = self.group.update(GroupState::prune_destroyed);
        debug!(
            target: "ftip.singleton",
            from = ?self.lifecycle,
            destroyed,
            pruned,
            "teardown"
        );
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Replace the options. Applied by the next reconciling commit.
    pub fn set_options(&mut self, options: SingletonOptions) {
        debug!(
            target: "ftip.singleton",
            disabled = options.disabled,
            overrides = options.overrides.len(),
            "options replaced"
        );
        self.options = options;
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn create(&mut self) -> CommitOutcome {
        let config = self.group.with(|g| {
            g.source()
                .map(|s| s.creation_config(&self.options, Rc::clone(&self.class_sync)))
        });
        let Some(config) = config else {
            let err = SingletonError::MissingSource;
            report(&err);
            self.lifecycle = Lifecycle::Inert;
            return CommitOutcome::CreationSkipped(err);
        };

        let targets = self.group.with(GroupState::target_instances);
        let count = targets.len();
        let mut handle = self.engine.create(targets, config);
        if self.options.disabled {
            handle.disable();
        }
        self.group.update(|g| g.set_overlay(handle));
        self.lifecycle = Lifecycle::Created;
        debug!(
            target: "ftip.singleton",
            targets = count,
            disabled = self.options.disabled,
            "overlay created"
        );
        CommitOutcome::Created
    }

    fn update_pass(&mut self) -> CommitOutcome {
        match self.phase {
            UpdatePhase::JustCreated => {
                self.phase = UpdatePhase::Steady;
                trace!(target: "ftip.singleton", "update suppressed after creation");
                CommitOutcome::Skipped
            }
            UpdatePhase::Steady => self.reconcile(),
        }
    }

    fn reconcile(&mut self) -> CommitOutcome {
        let options = &self.options;
        let taken = self.group.update(|g| {
            let update = g.source().map(|s| s.update_config(options))?;
            let handle = g.take_overlay()?;
            Some((handle, update))
        });
        let Some((mut handle, update)) = taken else {
            trace!(target: "ftip.singleton", "reconcile skipped");
            return CommitOutcome::Skipped;
        };

        let merged = merge_config(&handle.props(), update);
        handle.set_props(merged);
        handle.set_instances(self.group.with(GroupState::target_instances));
        if options.disabled {
            handle.disable();
        } else {
            handle.enable();
        }
        self.group.update(|g| g.set_overlay(handle));

        trace!(target: "ftip.singleton", disabled = options.disabled, "reconciled");
        CommitOutcome::Reconciled
    }
}
