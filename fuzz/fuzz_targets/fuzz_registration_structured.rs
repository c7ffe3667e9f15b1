#![no_main]

use arbitrary::Arbitrary;
use ftip::{MutableBox, OverlayConfig, RegistrationEntry, SingletonOptions, SourceData, singleton};
use ftip_harness::{EngineCall, MockTarget, RecordingEngine};
use ftip_runtime::Host;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Register(u8),
    Unregister(u8),
    Commit,
    Show(u8),
    Hide,
    Disable(bool),
    DestroyTarget(u8),
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let engine = RecordingEngine::new();
    let group = singleton(engine.clone(), SingletonOptions::new());
    let data = MutableBox::new(SourceData::new(OverlayConfig::new(), |_: String| {}));
    let mut host = Host::new();
    let root = host.mount(None, group.component());
    host.mount(Some(root), group.source_component(data));
    host.flush();

    let mut targets: Vec<MockTarget> = Vec::new();
    let mut model: Vec<u8> = Vec::new();
    for op in ops {
        match op {
            Op::Register(id) => {
                let target = targets
                    .iter()
                    .find(|t| t.id == u32::from(id % 8))
                    .cloned()
                    .unwrap_or_else(|| {
                        let t = MockTarget::new(u32::from(id % 8));
                        targets.push(t.clone());
                        t
                    });
                group.target().register(RegistrationEntry::new(target, String::new()));
                model.retain(|x| *x != id % 8);
                model.push(id % 8);
            }
            Op::Unregister(id) => {
                group.target().unregister(&MockTarget::new(u32::from(id % 8)));
                model.retain(|x| *x != id % 8);
            }
            Op::Commit => {
                host.commit_handle().request();
                host.flush();
            }
            Op::Show(id) => {
                if let Some(handle) = engine.last_handle() {
                    handle.show(&MockTarget::new(u32::from(id % 8)));
                }
            }
            Op::Hide => {
                if let Some(handle) = engine.last_handle() {
                    handle.hide();
                }
            }
            Op::Disable(disabled) => group.set_options(SingletonOptions::new().disabled(disabled)),
            Op::DestroyTarget(id) => {
                if let Some(t) = targets.iter().find(|t| t.id == u32::from(id % 8)) {
                    t.destroy();
                }
            }
        }

        let expected: Vec<u32> = model.iter().map(|x| u32::from(*x)).collect();
        for call in engine.take_calls() {
            if let EngineCall::SetInstances(ids) = call {
                assert_eq!(ids, expected, "pushed list must mirror registration order");
            }
        }
    }

    host.unmount(root);
    let survivors = group.target().registered();
    assert!(survivors.iter().all(|t| !ftip::TargetInstance::is_destroyed(t)));
    assert_eq!(engine.created(), 1);
});
