#![forbid(unsafe_code)]

//! Lifecycle hook bundles attached to a live overlay.
//!
//! Plugins extend the overlay engine without subclassing it. The engine calls
//! every plugin in list order:
//!
//! - [`Plugin::on_create`] once, after the overlay exists;
//! - [`Plugin::on_before_update`] at the start of each `set_props`, while the
//!   previous configuration is still visible;
//! - [`Plugin::on_after_update`] once the new configuration is in place.
//!
//! All hooks default to no-ops.

use ftip_core::ClassList;
use ftip_core::props::PropMap;

use crate::config::RenderPath;

/// What a plugin can see and touch of a live overlay.
pub trait OverlayView {
    /// Current plain settings.
    fn props(&self) -> &PropMap;
    /// Current render path.
    fn render_path(&self) -> &RenderPath;
    /// Class list of the overlay's rendered root element.
    fn root_classes(&mut self) -> &mut dyn ClassList;
}

/// A tagged bundle of overlay lifecycle hooks.
pub trait Plugin {
    fn name(&self) -> &'static str;

    fn on_create(&self, _overlay: &mut dyn OverlayView) {}

    fn on_before_update(&self, _overlay: &mut dyn OverlayView) {}

    fn on_after_update(&self, _overlay: &mut dyn OverlayView) {}
}
