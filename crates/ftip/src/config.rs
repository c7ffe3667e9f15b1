#![forbid(unsafe_code)]

//! Overlay configuration and its update merge.
//!
//! [`OverlayConfig`] is what the overlay engine receives at creation and on
//! every `set_props`. It splits into the JSON-like settings map plus the
//! pieces that are not plain data: per-overlay content, the plugin list, and
//! the render path.
//!
//! [`merge_config`] applies an update on top of the live configuration:
//!
//! | Field     | Rule |
//! |-----------|------|
//! | `props`   | [`merge_preserve_nested`] |
//! | `content` | `None` keeps the live content |
//! | `plugins` | installed at creation; the live list is kept |
//! | `render`  | function-typed, always taken from the update |

use std::any::Any;
use std::rc::Rc;

use ftip_core::props::{CLASS_NAME_KEY, PropMap, merge_preserve_nested};
use serde_json::Value;

use crate::plugin::Plugin;

/// Which renderer produces the overlay's content subtree.
#[derive(Clone, Default)]
pub enum RenderPath {
    /// The engine's built-in content renderer.
    #[default]
    Default,
    /// A caller-supplied render override. The payload is opaque to ftip and
    /// interpreted by the engine.
    Custom(Rc<dyn Any>),
}

impl RenderPath {
    /// Wrap a custom render override.
    #[must_use]
    pub fn custom<T: Any>(render: T) -> Self {
        Self::Custom(Rc::new(render))
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl std::fmt::Debug for RenderPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<render>").finish(),
        }
    }
}

/// Full configuration of one overlay.
pub struct OverlayConfig<C> {
    /// Plain settings (placement, delays, `className`, `popperOptions`, ...).
    pub props: PropMap,
    /// Content rendered by the overlay, if set at this level.
    pub content: Option<C>,
    /// Lifecycle hook bundles, in invocation order.
    pub plugins: Vec<Rc<dyn Plugin>>,
    pub render: RenderPath,
}

impl<C: Clone> Clone for OverlayConfig<C> {
    fn clone(&self) -> Self {
        Self {
            props: self.props.clone(),
            content: self.content.clone(),
            plugins: self.plugins.clone(),
            render: self.render.clone(),
        }
    }
}

impl<C> Default for OverlayConfig<C> {
    fn default() -> Self {
        Self {
            props: PropMap::new(),
            content: None,
            plugins: Vec::new(),
            render: RenderPath::Default,
        }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for OverlayConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayConfig")
            .field("props", &self.props)
            .field("content", &self.content)
            .field("plugins", &self.plugin_names())
            .field("render", &self.render)
            .finish()
    }
}

impl<C> OverlayConfig<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing settings map.
    #[must_use]
    pub fn from_props(props: PropMap) -> Self {
        Self {
            props,
            ..Self::default()
        }
    }

    /// Set one plain setting.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: C) -> Self {
        self.content = Some(content);
        self
    }

    /// Append a plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Rc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    #[must_use]
    pub fn with_render(mut self, render: RenderPath) -> Self {
        self.render = render;
        self
    }

    /// The `className` setting, when it is a string.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.props.get(CLASS_NAME_KEY).and_then(Value::as_str)
    }

    /// Plugin names in invocation order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

/// Apply `incoming` on top of the live configuration `existing`.
#[must_use]
pub fn merge_config<C: Clone>(
    existing: &OverlayConfig<C>,
    incoming: OverlayConfig<C>,
) -> OverlayConfig<C> {
    OverlayConfig {
        props: merge_preserve_nested(&existing.props, incoming.props),
        content: incoming.content.or_else(|| existing.content.clone()),
        plugins: existing.plugins.clone(),
        render: incoming.render,
    }
}
