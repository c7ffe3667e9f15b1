#![forbid(unsafe_code)]

//! Keeps the `className` setting applied to the overlay root element.
//!
//! The engine may rebuild the overlay's content subtree on every update, so
//! the tokens are removed right before an update and re-added right after it.
//! A custom render override owns its own classes: the setting is ignored
//! and a diagnostic is reported instead.

use ftip_core::props::CLASS_NAME_KEY;
use ftip_core::{ClassAction, SingletonError, apply_class_tokens, report};

use crate::plugin::{OverlayView, Plugin};

/// The class-sync plugin. Always installed first on a singleton overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassSync;

impl ClassSync {
    pub const NAME: &'static str = "className";
}

impl Plugin for ClassSync {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_create(&self, overlay: &mut dyn OverlayView) {
        add(overlay);
    }

    fn on_before_update(&self, overlay: &mut dyn OverlayView) {
        if !overlay.render_path().is_default() {
            return;
        }
        if let Some(class_name) = class_name(overlay) {
            apply_class_tokens(overlay.root_classes(), ClassAction::Remove, &class_name);
        }
    }

    fn on_after_update(&self, overlay: &mut dyn OverlayView) {
        add(overlay);
    }
}

fn class_name(overlay: &dyn OverlayView) -> Option<String> {
    overlay
        .props()
        .get(CLASS_NAME_KEY)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn add(overlay: &mut dyn OverlayView) {
    let Some(class_name) = class_name(overlay) else {
        return;
    };
    if !overlay.render_path().is_default() {
        report(&SingletonError::ClassNameWithCustomRender);
        return;
    }
    tracing::trace!(target: "ftip.singleton", class_name = %class_name, "class sync add");
    apply_class_tokens(overlay.root_classes(), ClassAction::Add, &class_name);
}
