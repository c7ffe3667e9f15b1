#![forbid(unsafe_code)]

//! Registration state shared by a coordinator and its bindings.
//!
//! # Invariants
//!
//! 1. `targets` holds at most one entry per target instance.
//! 2. `targets` is in registration order; re-registering moves an entry to
//!    the tail.
//! 3. Every instance list pushed to the overlay mirrors `targets` in order.
//! 4. An overlay handle exists only if a source was bound when it was created.
//! 5. Engine calls run on a handle taken out of the group, never under a
//!    group borrow, so plugin hooks may read or drive the bindings.

use std::rc::Rc;

use ftip_core::PropMap;
use ftip_core::props::{CONTENT_KEY, OVERRIDES_KEY, POSITIONING_KEY};
use ftip_core::SingletonOptions;
use ftip_runtime::MutableBox;
use serde_json::Value;

use crate::config::OverlayConfig;
use crate::engine::{OverlayEngine, OverlayHandle, TargetInstance};
use crate::plugin::Plugin;

/// One registered target and the content it wants shown.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationEntry<I, C> {
    pub instance: I,
    pub content: C,
}

impl<I, C> RegistrationEntry<I, C> {
    #[must_use]
    pub fn new(instance: I, content: C) -> Self {
        Self { instance, content }
    }
}

/// Callback that replaces the content of the shared overlay.
pub type ContentSetter<C> = Rc<dyn Fn(C)>;

/// Reads the source's own live positioning options.
pub type LivePositioning = Rc<dyn Fn() -> Option<Value>>;

/// Baseline configuration supplied by the source binding.
pub struct SourceData<C> {
    pub props: OverlayConfig<C>,
    pub set_content: ContentSetter<C>,
    /// When present, creation takes `popperOptions` from here instead of
    /// from `props`.
    pub live_positioning: Option<LivePositioning>,
}

impl<C: Clone> Clone for SourceData<C> {
    fn clone(&self) -> Self {
        Self {
            props: self.props.clone(),
            set_content: Rc::clone(&self.set_content),
            live_positioning: self.live_positioning.clone(),
        }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for SourceData<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceData")
            .field("props", &self.props)
            .field("live_positioning", &self.live_positioning.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Clone> SourceData<C> {
    pub fn new(props: OverlayConfig<C>, set_content: impl Fn(C) + 'static) -> Self {
        Self {
            props,
            set_content: Rc::new(set_content),
            live_positioning: None,
        }
    }

    #[must_use]
    pub fn with_live_positioning(mut self, read: impl Fn() -> Option<Value> + 'static) -> Self {
        self.live_positioning = Some(Rc::new(read));
        self
    }

    /// Configuration for overlay creation.
    ///
    /// Source props, positioning from the live view, the overrides list, and
    /// `class_sync` installed ahead of the source's own plugins.
    #[must_use]
    pub fn creation_config(
        &self,
        options: &SingletonOptions,
        class_sync: Rc<dyn Plugin>,
    ) -> OverlayConfig<C> {
        let mut config = self.props.clone();
        if let Some(read) = &self.live_positioning {
            match read() {
                Some(positioning) => {
                    config.props.insert(POSITIONING_KEY.into(), positioning);
                }
                None => {
                    config.props.remove(POSITIONING_KEY);
                }
            }
        }
        config
            .props
            .insert(OVERRIDES_KEY.into(), options.overrides_value());
        let mut plugins = Vec::with_capacity(self.props.plugins.len() + 1);
        plugins.push(class_sync);
        plugins.extend(self.props.plugins.iter().cloned());
        config.plugins = plugins;
        config
    }

    /// Group-level update: source props without content, plus overrides.
    #[must_use]
    pub fn update_config(&self, options: &SingletonOptions) -> OverlayConfig<C> {
        let mut props: PropMap = self.props.props.clone();
        props.remove(CONTENT_KEY);
        props.insert(OVERRIDES_KEY.into(), options.overrides_value());
        OverlayConfig {
            props,
            content: None,
            plugins: Vec::new(),
            render: self.props.render.clone(),
        }
    }
}

/// Mutable state of one singleton group.
pub struct GroupState<E: OverlayEngine> {
    targets: Vec<RegistrationEntry<E::Instance, E::Content>>,
    overlay: Option<E::Handle>,
    source: Option<SourceData<E::Content>>,
}

/// Shared handle to a [`GroupState`].
pub type Group<E> = MutableBox<GroupState<E>>;

impl<E: OverlayEngine> Default for GroupState<E> {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            overlay: None,
            source: None,
        }
    }
}

impl<E: OverlayEngine> std::fmt::Debug for GroupState<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupState")
            .field("targets", &self.targets.len())
            .field("has_overlay", &self.overlay.is_some())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl<E: OverlayEngine> GroupState<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered targets in registration order.
    #[must_use]
    pub fn targets(&self) -> &[RegistrationEntry<E::Instance, E::Content>] {
        &self.targets
    }

    /// Target instances in registration order.
    #[must_use]
    pub fn target_instances(&self) -> Vec<E::Instance> {
        self.targets.iter().map(|e| e.instance.clone()).collect()
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&E::Handle> {
        self.overlay.as_ref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&SourceData<E::Content>> {
        self.source.as_ref()
    }

    /// Whether an overlay exists and has not been destroyed.
    #[must_use]
    pub fn has_live_overlay(&self) -> bool {
        self.overlay.as_ref().is_some_and(|h| !h.state().is_destroyed)
    }

    /// Insert `entry`, dropping any previous entry for the same instance, at
    /// the tail.
    pub(crate) fn upsert_target(&mut self, entry: RegistrationEntry<E::Instance, E::Content>) {
        self.targets.retain(|e| e.instance != entry.instance);
        self.targets.push(entry);
    }

    /// Returns `true` if an entry was removed.
    pub(crate) fn remove_target(&mut self, instance: &E::Instance) -> bool {
        let before = self.targets.len();
        self.targets.retain(|e| e.instance != *instance);
        self.targets.len() != before
    }

    /// Drop entries whose instance the engine reports destroyed.
    pub(crate) fn prune_destroyed(&mut self) -> usize {
        let before = self.targets.len();
        self.targets.retain(|e| !e.instance.is_destroyed());
        before - self.targets.len()
    }

    /// Take the overlay out for an instance push, with the list to push.
    ///
    /// `None` when there is no overlay or it was destroyed. The caller puts
    /// the handle back with [`set_overlay`](Self::set_overlay).
    pub(crate) fn take_live_overlay(&mut self) -> Option<(E::Handle, Vec<E::Instance>)> {
        if !self.has_live_overlay() {
            return None;
        }
        let instances = self.target_instances();
        self.overlay.take().map(|handle| (handle, instances))
    }

    /// Whether the overlay is shown and currently represents `instance`.
    pub(crate) fn is_active(&self, instance: &E::Instance) -> bool {
        self.overlay.as_ref().is_some_and(|h| {
            let state = h.state();
            state.is_mounted && state.active_instance.as_ref() == Some(instance)
        })
    }

    pub(crate) fn set_overlay(&mut self, handle: E::Handle) {
        self.overlay = Some(handle);
    }

    pub(crate) fn take_overlay(&mut self) -> Option<E::Handle> {
        self.overlay.take()
    }

    pub(crate) fn set_source(&mut self, data: SourceData<E::Content>) {
        self.source = Some(data);
    }

    pub(crate) fn clear_source(&mut self) -> bool {
        self.source.take().is_some()
    }
}
