#![forbid(unsafe_code)]

//! The overlay engine seam.
//!
//! ftip never positions, shows, or renders anything itself. It drives an
//! [`OverlayEngine`] that creates one overlay for a list of target instances
//! and hands back an [`OverlayHandle`] for later updates.
//!
//! # Engine contract
//!
//! - [`OverlayEngine::create`] calls [`Plugin::on_create`](crate::Plugin::on_create)
//!   for each configured plugin, in order, before returning.
//! - [`OverlayHandle::set_props`] calls `on_before_update` with the previous
//!   configuration visible, installs the new configuration, then calls
//!   `on_after_update`.
//! - A new overlay is enabled.

use crate::config::OverlayConfig;

/// Opaque identity of one trigger target.
///
/// Two instances are the same target when they compare equal.
pub trait TargetInstance: Clone + PartialEq + 'static {
    /// Whether the engine has already torn this target down.
    fn is_destroyed(&self) -> bool;
}

/// Snapshot of a live overlay's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState<I> {
    /// The overlay is currently shown.
    pub is_mounted: bool,
    pub is_destroyed: bool,
    pub is_enabled: bool,
    /// The target the overlay currently represents.
    pub active_instance: Option<I>,
}

/// A live overlay created by an [`OverlayEngine`].
pub trait OverlayHandle {
    type Instance: TargetInstance;
    type Content;

    /// Replace the list of targets that can trigger the overlay.
    fn set_instances(&mut self, targets: Vec<Self::Instance>);

    /// Replace the live configuration.
    fn set_props(&mut self, config: OverlayConfig<Self::Content>);

    /// Snapshot of the live configuration.
    fn props(&self) -> OverlayConfig<Self::Content>;

    fn enable(&mut self);

    fn disable(&mut self);

    fn destroy(&mut self);

    fn state(&self) -> OverlayState<Self::Instance>;
}

/// Factory for singleton overlays.
pub trait OverlayEngine {
    type Instance: TargetInstance;
    type Content: Clone + 'static;
    type Handle: OverlayHandle<Instance = Self::Instance, Content = Self::Content>;

    /// Create one overlay shared by `targets`.
    fn create(
        &mut self,
        targets: Vec<Self::Instance>,
        config: OverlayConfig<Self::Content>,
    ) -> Self::Handle;
}
