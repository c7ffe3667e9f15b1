#![forbid(unsafe_code)]

//! In-memory overlay engine that records every call.
//!
//! # Design
//!
//! The engine and every handle it creates share one call log, so a test can
//! keep a clone of the engine and read the log after the engine has moved
//! into a coordinator. Handles share their state with clones the same way.
//!
//! Plugin hooks run on the engine contract:
//!
//! - `create` runs `on_create` for each plugin in order;
//! - `set_props` runs `on_before_update` with the old configuration visible,
//!   swaps the configuration, then runs `on_after_update`.
//!
//! The root element starts with the class `engine-box`.

use std::cell::RefCell;
use std::rc::Rc;

use ftip::{OverlayConfig, OverlayEngine, OverlayHandle, OverlayState, OverlayView, RenderPath};
use ftip_core::{ClassList, ClassSet, PropMap};
use tracing::trace;

use crate::target::{MockTarget, ids};

/// Class present on every recording overlay's root element.
pub const ROOT_CLASS: &str = "engine-box";

/// One engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create {
        targets: Vec<u32>,
        props: PropMap,
        plugins: Vec<&'static str>,
    },
    SetInstances(Vec<u32>),
    SetProps(PropMap),
    Enable,
    Disable,
    Destroy,
}

impl EngineCall {
    /// Whether this call pushed configuration or targets into the overlay.
    #[must_use]
    pub fn is_push(&self) -> bool {
        matches!(self, Self::SetInstances(_) | Self::SetProps(_))
    }
}

type CallLog = Rc<RefCell<Vec<EngineCall>>>;

struct HandleState<C> {
    config: OverlayConfig<C>,
    classes: ClassSet,
    instances: Vec<MockTarget>,
    mounted: bool,
    destroyed: bool,
    enabled: bool,
    active: Option<MockTarget>,
}

struct View<'a, C>(&'a mut HandleState<C>);

impl<C> OverlayView for View<'_, C> {
    fn props(&self) -> &PropMap {
        &self.0.config.props
    }

    fn render_path(&self) -> &RenderPath {
        &self.0.config.render
    }

    fn root_classes(&mut self) -> &mut dyn ClassList {
        &mut self.0.classes
    }
}

/// A live recording overlay.
pub struct RecordingHandle<C = String> {
    state: Rc<RefCell<HandleState<C>>>,
    log: CallLog,
}

impl<C> Clone for RecordingHandle<C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            log: Rc::clone(&self.log),
        }
    }
}

impl<C> std::fmt::Debug for RecordingHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RecordingHandle")
            .field("instances", &ids(&state.instances))
            .field("mounted", &state.mounted)
            .field("destroyed", &state.destroyed)
            .field("enabled", &state.enabled)
            .finish_non_exhaustive()
    }
}

impl<C: Clone> RecordingHandle<C> {
    fn record(&self, call: EngineCall) {
        trace!(target: "ftip.harness", call = ?call, "engine call");
        self.log.borrow_mut().push(call);
    }

    // ── Test controls ──────────────────────────────────────────────────

    /// Show the overlay for `target`, as a trigger event would.
    pub fn show(&self, target: &MockTarget) {
        let mut state = self.state.borrow_mut();
        state.mounted = true;
        state.active = Some(target.clone());
    }

    pub fn hide(&self) {
        self.state.borrow_mut().mounted = false;
    }

    /// Root element classes, in insertion order.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.iter().map(str::to_owned).collect()
    }

    /// Live content.
    #[must_use]
    pub fn content(&self) -> Option<C> {
        self.state.borrow().config.content.clone()
    }

    /// Ids of the targets last pushed (or given at creation).
    #[must_use]
    pub fn instance_ids(&self) -> Vec<u32> {
        ids(&self.state.borrow().instances)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

impl<C: Clone> OverlayHandle for RecordingHandle<C> {
    type Instance = MockTarget;
    type Content = C;

    fn set_instances(&mut self, targets: Vec<MockTarget>) {
        self.record(EngineCall::SetInstances(ids(&targets)));
        self.state.borrow_mut().instances = targets;
    }

    fn set_props(&mut self, config: OverlayConfig<C>) {
        self.record(EngineCall::SetProps(config.props.clone()));
        let mut state = self.state.borrow_mut();
        let plugins = state.config.plugins.clone();
        for plugin in &plugins {
            plugin.on_before_update(&mut View(&mut *state));
        }
        state.config = config;
        for plugin in &plugins {
            plugin.on_after_update(&mut View(&mut *state));
        }
    }

    fn props(&self) -> OverlayConfig<C> {
        self.state.borrow().config.clone()
    }

    fn enable(&mut self) {
        self.record(EngineCall::Enable);
        self.state.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        self.record(EngineCall::Disable);
        self.state.borrow_mut().enabled = false;
    }

    fn destroy(&mut self) {
        self.record(EngineCall::Destroy);
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.mounted = false;
        state.active = None;
    }

    fn state(&self) -> OverlayState<MockTarget> {
        let state = self.state.borrow();
        OverlayState {
            is_mounted: state.mounted,
            is_destroyed: state.destroyed,
            is_enabled: state.enabled,
            active_instance: state.active.clone(),
        }
    }
}

/// Overlay engine that records calls into a shared log.
pub struct RecordingEngine<C = String> {
    log: CallLog,
    handles: Rc<RefCell<Vec<RecordingHandle<C>>>>,
}

impl<C> Clone for RecordingEngine<C> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
            handles: Rc::clone(&self.handles),
        }
    }
}

impl<C> Default for RecordingEngine<C> {
    fn default() -> Self {
        Self {
            log: Rc::default(),
            handles: Rc::default(),
        }
    }
}

impl<C> std::fmt::Debug for RecordingEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingEngine")
            .field("calls", &self.log.borrow().len())
            .field("handles", &self.handles.borrow().len())
            .finish()
    }
}

impl<C: Clone> RecordingEngine<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.borrow().clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<EngineCall> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Number of logged calls matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Number of overlays created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.handles.borrow().len()
    }

    /// The most recently created overlay.
    #[must_use]
    pub fn last_handle(&self) -> Option<RecordingHandle<C>> {
        self.handles.borrow().last().cloned()
    }
}

impl<C: Clone + 'static> OverlayEngine for RecordingEngine<C> {
    type Instance = MockTarget;
    type Content = C;
    type Handle = RecordingHandle<C>;

    fn create(&mut self, targets: Vec<MockTarget>, config: OverlayConfig<C>) -> RecordingHandle<C> {
        let call = EngineCall::Create {
            targets: ids(&targets),
            props: config.props.clone(),
            plugins: config.plugin_names(),
        };
        trace!(target: "ftip.harness", call = ?call, "engine call");
        self.log.borrow_mut().push(call);

        let plugins = config.plugins.clone();
        let mut state = HandleState {
            config,
            classes: [ROOT_CLASS].into_iter().collect(),
            instances: targets,
            mounted: false,
            destroyed: false,
            enabled: true,
            active: None,
        };
        for plugin in &plugins {
            plugin.on_create(&mut View(&mut state));
        }

        let handle = RecordingHandle {
            state: Rc::new(RefCell::new(state)),
            log: Rc::clone(&self.log),
        };
        self.handles.borrow_mut().push(handle.clone());
        handle
    }
}
