#![forbid(unsafe_code)]

//! E2E test for the singleton lifecycle driven through a host.
//!
//! Covers:
//! 1. Creation happens on the second commit, never the first
//! 2. The creation commit pushes nothing after `create`
//! 3. Later commits reconcile: props, targets, then enable/disable
//! 4. `disabled` applies after creation and after every update
//! 5. Preserve-nested merge across updates; overrides replace
//! 6. Teardown destroys the overlay and prunes destroyed targets
//! 7. Missing source: diagnostic, inert group, remount retry
//! 8. Plugin update hooks may read the group through its bindings
//!
//! Run:
//!   cargo test -p ftip --test e2e_singleton_lifecycle

use std::cell::RefCell;
use std::rc::Rc;

use ftip::{
    Lifecycle, MutableBox, OverlayConfig, OverlayHandle, OverlayView, Plugin, RegistrationEntry,
    Singleton, SingletonOptions, SourceData, TargetBinding, singleton,
};
use ftip_harness::{EngineCall, MockTarget, RecordingEngine, RecordingHandle, capture_diagnostics};
use ftip_runtime::{CommitReport, Host, NodeId};
use serde_json::json;

// ============================================================================
// Rig
// ============================================================================

struct Rig {
    host: Host,
    engine: RecordingEngine,
    group: Singleton<RecordingEngine>,
    root: NodeId,
    source: MutableBox<SourceData<String>>,
    source_node: Option<NodeId>,
    shown: Rc<RefCell<Vec<String>>>,
}

impl Rig {
    fn new(options: SingletonOptions) -> Self {
        let engine = RecordingEngine::new();
        let group = singleton(engine.clone(), options);
        let mut host = Host::new();
        let root = host.mount(None, group.component());
        let shown = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&shown);
        let source = MutableBox::new(SourceData::new(OverlayConfig::new(), move |c: String| {
            sink.borrow_mut().push(c);
        }));
        Self {
            host,
            engine,
            group,
            root,
            source,
            source_node: None,
            shown,
        }
    }

    fn with_source(mut self, config: OverlayConfig<String>) -> Self {
        self.source.update(|d| d.props = config);
        let node = self
            .host
            .mount(Some(self.root), self.group.source_component(self.source.clone()));
        self.source_node = Some(node);
        self
    }

    fn add_target(&mut self, id: u32, content: &str) -> (NodeId, MockTarget, MutableBox<String>) {
        let target = MockTarget::new(id);
        let content = MutableBox::new(content.to_string());
        let node = self.host.mount(
            Some(self.root),
            self.group.target_component(target.clone(), content.clone()),
        );
        (node, target, content)
    }

    fn flush(&mut self) -> Vec<CommitReport> {
        self.host.flush()
    }

    fn commit(&mut self) -> Vec<CommitReport> {
        self.host.commit_handle().request();
        self.host.flush()
    }

    fn handle(&self) -> RecordingHandle {
        self.engine.last_handle().expect("overlay created")
    }
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn creation_happens_on_second_commit() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    rig.add_target(2, "two");

    let first = rig.host.commit();
    assert!(first.requested_commit);
    assert_eq!(rig.engine.created(), 0);
    assert_eq!(rig.group.lifecycle(), Lifecycle::Mounted);

    rig.host.commit();
    assert_eq!(rig.engine.created(), 1);
    assert_eq!(rig.group.lifecycle(), Lifecycle::Created);
    match &rig.engine.calls()[0] {
        EngineCall::Create { targets, plugins, props } => {
            assert_eq!(targets, &vec![1, 2]);
            assert_eq!(plugins.first(), Some(&"className"));
            assert_eq!(props.get("overrides"), Some(&json!([])));
        }
        other => panic!("expected create, got {other:?}"),
    }
}

#[test]
fn flush_settles_after_two_commits() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    let reports = rig.flush();
    assert_eq!(reports.len(), 2);
    assert!(!reports[1].requested_commit);
}

#[test]
fn creation_commit_pushes_nothing_after_create() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    rig.flush();

    let calls = rig.engine.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], EngineCall::Create { .. }));
}

#[test]
fn steady_commit_reconciles_in_order() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    rig.add_target(2, "two");
    rig.flush();
    rig.engine.take_calls();

    rig.commit();
    let calls = rig.engine.take_calls();
    // Each target re-registers (moving to the tail), then the coordinator
    // reconciles.
    assert_eq!(
        calls,
        vec![
            EngineCall::SetInstances(vec![2, 1]),
            EngineCall::SetInstances(vec![1, 2]),
            EngineCall::SetProps(calls_props(&calls)),
            EngineCall::SetInstances(vec![1, 2]),
            EngineCall::Enable,
        ]
    );
}

fn calls_props(calls: &[EngineCall]) -> ftip::PropMap {
    calls
        .iter()
        .find_map(|c| match c {
            EngineCall::SetProps(props) => Some(props.clone()),
            _ => None,
        })
        .expect("a SetProps call")
}

// ============================================================================
// Disabled
// ============================================================================

#[test]
fn disabled_applies_after_creation_and_every_update() {
    let mut rig = Rig::new(SingletonOptions::new().disabled(true))
        .with_source(OverlayConfig::new().with_prop("placement", "top"));
    rig.add_target(1, "one");
    rig.flush();
    assert_eq!(rig.engine.count(|c| matches!(c, EngineCall::Disable)), 1);
    assert!(!rig.handle().is_enabled());

    for _ in 0..3 {
        rig.commit();
    }
    assert_eq!(rig.engine.count(|c| matches!(c, EngineCall::Disable)), 4);
    assert_eq!(rig.engine.count(|c| matches!(c, EngineCall::Enable)), 0);
    assert!(!rig.handle().is_enabled());
}

#[test]
fn set_options_takes_effect_next_commit() {
    let mut rig = Rig::new(SingletonOptions::new().disabled(true)).with_source(OverlayConfig::new());
    rig.flush();
    rig.group.set_options(SingletonOptions::new());
    assert!(!rig.handle().is_enabled());

    rig.commit();
    assert!(rig.handle().is_enabled());
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn nested_settings_survive_updates() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(
        OverlayConfig::new()
            .with_prop("popperOptions", json!({"strategy": "fixed", "placement": "top"}))
            .with_content("baseline".to_string()),
    );
    rig.flush();

    rig.source.update(|d| {
        d.props = OverlayConfig::new()
            .with_prop("popperOptions", json!({"placement": "bottom"}))
            .with_prop("content", "group-level")
            .with_content("ignored".to_string());
    });
    rig.commit();

    let live = rig.handle().props();
    assert_eq!(
        live.props.get("popperOptions"),
        Some(&json!({"strategy": "fixed", "placement": "bottom"}))
    );
    assert!(!live.props.contains_key("content"));
    assert_eq!(rig.handle().content().as_deref(), Some("baseline"));
}

#[test]
fn overrides_list_replaces_on_update() {
    let mut override_a = ftip::PropMap::new();
    override_a.insert("placement".into(), json!("top"));
    let mut rig = Rig::new(SingletonOptions::new().with_override(override_a))
        .with_source(OverlayConfig::new());
    rig.flush();
    assert_eq!(
        rig.handle().props().props.get("overrides"),
        Some(&json!([{"placement": "top"}]))
    );

    let mut override_b = ftip::PropMap::new();
    override_b.insert("delay".into(), json!(5));
    rig.group.set_options(SingletonOptions::new().with_override(override_b));
    rig.commit();
    assert_eq!(
        rig.handle().props().props.get("overrides"),
        Some(&json!([{"delay": 5}]))
    );
}

#[test]
fn live_positioning_seeds_creation() {
    let rig = Rig::new(SingletonOptions::new());
    rig.source.update(|d| {
        let live = d.clone().with_live_positioning(|| Some(json!({"strategy": "absolute"})));
        *d = live;
    });
    let mut rig = rig.with_source(
        OverlayConfig::new().with_prop("popperOptions", json!({"strategy": "stale"})),
    );
    rig.flush();
    assert_eq!(
        rig.handle().props().props.get("popperOptions"),
        Some(&json!({"strategy": "absolute"}))
    );
}

// ============================================================================
// Registration through the host
// ============================================================================

#[test]
fn late_target_is_pushed_immediately() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    rig.flush();
    rig.engine.take_calls();

    rig.add_target(2, "two");
    rig.flush();
    let calls = rig.engine.take_calls();
    let joined = calls
        .iter()
        .position(|c| c == &EngineCall::SetInstances(vec![1, 2]))
        .expect("new target pushed");
    let reconciled = calls
        .iter()
        .position(|c| matches!(c, EngineCall::SetProps(_)))
        .expect("reconcile ran");
    assert!(joined < reconciled);
    assert_eq!(rig.handle().instance_ids(), vec![1, 2]);
}

#[test]
fn unmounted_target_leaves_the_overlay() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    let (first, _, _) = rig.add_target(1, "one");
    rig.add_target(2, "two");
    rig.flush();

    rig.host.unmount(first);
    assert_eq!(rig.handle().instance_ids(), vec![2]);
    rig.commit();
    assert_eq!(rig.handle().instance_ids(), vec![2]);
}

#[test]
fn reregistration_moves_to_tail() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    let (_, a, _) = rig.add_target(1, "one");
    rig.add_target(2, "two");
    rig.add_target(3, "three");
    rig.flush();

    rig.group
        .target()
        .register(RegistrationEntry::new(a, "again".to_string()));
    assert_eq!(rig.handle().instance_ids(), vec![2, 3, 1]);
    let ids: Vec<u32> = rig.group.target().registered().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn unbound_source_suppresses_reconcile() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.flush();
    let node = rig.source_node.expect("source mounted");
    rig.host.unmount(node);
    rig.engine.take_calls();

    rig.commit();
    assert!(rig.engine.calls().is_empty());
    assert!(!rig.handle().is_destroyed());
}

struct RegistryReader {
    targets: TargetBinding<RecordingEngine>,
    seen: Rc<RefCell<Vec<Vec<u32>>>>,
}

impl Plugin for RegistryReader {
    fn name(&self) -> &'static str {
        "registry-reader"
    }

    fn on_after_update(&self, _overlay: &mut dyn OverlayView) {
        let ids = self.targets.registered().iter().map(|t| t.id).collect();
        self.seen.borrow_mut().push(ids);
    }
}

#[test]
fn update_hooks_can_read_bindings() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let rig = Rig::new(SingletonOptions::new());
    let reader = RegistryReader {
        targets: rig.group.target().clone(),
        seen: Rc::clone(&seen),
    };
    let mut rig = rig.with_source(OverlayConfig::new().with_plugin(Rc::new(reader)));
    rig.add_target(1, "one");
    rig.add_target(2, "two");
    rig.flush();
    assert!(seen.borrow().is_empty());

    let reports = rig.commit();
    assert_eq!(reports.len(), 1);
    assert_eq!(*seen.borrow(), vec![vec![1, 2]]);
    assert_eq!(rig.handle().instance_ids(), vec![1, 2]);
    assert!(rig.group.coordinator().with(|c| c.group().with(|g| g.overlay().is_some())));
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn teardown_destroys_and_prunes() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    let (a, b) = (MockTarget::new(1), MockTarget::new(2));
    rig.group
        .target()
        .register(RegistrationEntry::new(a.clone(), String::new()));
    rig.group
        .target()
        .register(RegistrationEntry::new(b.clone(), String::new()));
    rig.flush();

    a.destroy();
    rig.host.unmount(rig.root);

    assert!(rig.handle().is_destroyed());
    assert_eq!(rig.engine.count(|c| matches!(c, EngineCall::Destroy)), 1);
    assert_eq!(rig.group.target().registered(), vec![b]);
    assert_eq!(rig.group.lifecycle(), Lifecycle::Destroyed);
    assert!(
        rig.group
            .coordinator()
            .with(|c| c.group().with(|g| g.overlay().is_none()))
    );
}

#[test]
fn hand_off_is_not_attempted_after_teardown() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    let a = MockTarget::new(1);
    rig.flush();
    rig.handle().show(&a);
    rig.host.unmount(rig.root);

    rig.group
        .target()
        .register(RegistrationEntry::new(a, "late".to_string()));
    assert!(rig.shown.borrow().is_empty());
}

// ============================================================================
// Missing source
// ============================================================================

#[test]
fn missing_source_reports_and_stays_inert() {
    let mut rig = Rig::new(SingletonOptions::new());
    rig.add_target(1, "one");

    let (_, capture) = capture_diagnostics(|| rig.flush());
    assert_eq!(rig.engine.created(), 0);
    assert_eq!(rig.group.lifecycle(), Lifecycle::Inert);
    if cfg!(debug_assertions) {
        assert_eq!(capture.count_error_type("missing_source"), 1);
        assert_eq!(capture.diagnostics()[0].level, tracing::Level::ERROR);
    }

    // A source binding late is not picked up by the passed creation commit.
    let mut rig = rig.with_source(OverlayConfig::new());
    rig.flush();
    rig.commit();
    assert_eq!(rig.engine.created(), 0);
}

#[test]
fn remount_retries_creation() {
    let mut rig = Rig::new(SingletonOptions::new());
    rig.flush();
    assert_eq!(rig.group.lifecycle(), Lifecycle::Inert);
    rig.host.unmount(rig.root);

    rig.root = rig.host.mount(None, rig.group.component());
    let mut rig = rig.with_source(OverlayConfig::new());
    rig.flush();
    assert_eq!(rig.group.lifecycle(), Lifecycle::Created);
    assert_eq!(rig.engine.created(), 1);
}

// ============================================================================
// Tracing
// ============================================================================

#[test]
fn every_commit_opens_a_span() {
    let mut rig = Rig::new(SingletonOptions::new()).with_source(OverlayConfig::new());
    rig.add_target(1, "one");
    let (reports, capture) = capture_diagnostics(|| rig.flush());
    assert_eq!(capture.spans_named("ftip.commit").len(), reports.len());
    assert!(
        capture
            .events_for("ftip.singleton")
            .iter()
            .any(|e| e.message() == "overlay created")
    );
}
