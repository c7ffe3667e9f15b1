//! In-crate stub engine for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ftip_core::{ClassList, ClassSet, PropMap};

use crate::config::{OverlayConfig, RenderPath};
use crate::engine::{OverlayEngine, OverlayHandle, OverlayState, TargetInstance};
use crate::plugin::OverlayView;

#[derive(Debug, Clone)]
pub(crate) struct StubTarget {
    pub id: u32,
    pub destroyed: Rc<Cell<bool>>,
}

impl StubTarget {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            destroyed: Rc::new(Cell::new(false)),
        }
    }
}

impl PartialEq for StubTarget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl TargetInstance for StubTarget {
    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

#[derive(Default)]
struct Inner {
    config: OverlayConfig<String>,
    created_with: Vec<StubTarget>,
    pushed: Vec<Vec<StubTarget>>,
    classes: ClassSet,
    set_props: usize,
    enables: usize,
    disables: usize,
    enabled: bool,
    destroyed: bool,
    mounted: bool,
    active: Option<StubTarget>,
}

struct View<'a>(&'a mut Inner);

impl OverlayView for View<'_> {
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

#[derive(Clone, Default)]
pub(crate) struct StubHandle {
    inner: Rc<RefCell<Inner>>,
}

impl StubHandle {
    pub fn show(&self, target: &StubTarget) {
        let mut inner = self.inner.borrow_mut();
        inner.mounted = true;
        inner.active = Some(target.clone());
    }

    pub fn pushed(&self) -> Vec<Vec<StubTarget>> {
        self.inner.borrow().pushed.clone()
    }

    pub fn created_with(&self) -> Vec<StubTarget> {
        self.inner.borrow().created_with.clone()
    }

    pub fn live_props(&self) -> OverlayConfig<String> {
        self.inner.borrow().config.clone()
    }

    pub fn set_props_calls(&self) -> usize {
        self.inner.borrow().set_props
    }

    pub fn enable_calls(&self) -> usize {
        self.inner.borrow().enables
    }

    pub fn disable_calls(&self) -> usize {
        self.inner.borrow().disables
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }
}

impl OverlayHandle for StubHandle {
    type Instance = StubTarget;
    type Content = String;

    fn set_instances(&mut self, targets: Vec<StubTarget>) {
        self.inner.borrow_mut().pushed.push(targets);
    }

    fn set_props(&mut self, config: OverlayConfig<String>) {
        let mut inner = self.inner.borrow_mut();
        let plugins = inner.config.plugins.clone();
        for plugin in &plugins {
            plugin.on_before_update(&mut View(&mut *inner));
        }
        inner.config = config;
        inner.set_props += 1;
        for plugin in &plugins {
            plugin.on_after_update(&mut View(&mut *inner));
        }
    }

    fn props(&self) -> OverlayConfig<String> {
        self.inner.borrow().config.clone()
    }

    fn enable(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.enables += 1;
        inner.enabled = true;
    }

    fn disable(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.disables += 1;
        inner.enabled = false;
    }

    fn destroy(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.destroyed = true;
        inner.mounted = false;
    }

    fn state(&self) -> OverlayState<StubTarget> {
        let inner = self.inner.borrow();
        OverlayState {
            is_mounted: inner.mounted,
            is_destroyed: inner.destroyed,
            is_enabled: inner.enabled,
            active_instance: inner.active.clone(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct StubEngine {
    created: Rc<RefCell<Vec<StubHandle>>>,
}

impl StubEngine {
    pub fn handles(&self) -> Vec<StubHandle> {
        self.created.borrow().clone()
    }
}

impl OverlayEngine for StubEngine {
    type Instance = StubTarget;
    type Content = String;
    type Handle = StubHandle;

    fn create(&mut self, targets: Vec<StubTarget>, config: OverlayConfig<String>) -> StubHandle {
        let handle = StubHandle::default();
        {
            let mut inner = handle.inner.borrow_mut();
            inner.created_with = targets;
            inner.config = config;
            inner.enabled = true;
            let plugins = inner.config.plugins.clone();
            for plugin in &plugins {
                plugin.on_create(&mut View(&mut *inner));
            }
        }
        self.created.borrow_mut().push(handle.clone());
        handle
    }
}
