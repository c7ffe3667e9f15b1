#![no_main]

use ftip_core::{PropMap, merge_preserve_nested};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Two JSON objects separated by a NUL byte.
    let Some(split) = data.iter().position(|b| *b == 0) else {
        return;
    };
    if data.len() > 4096 {
        return;
    }
    let Ok(Value::Object(existing)) = serde_json::from_slice::<Value>(&data[..split]) else {
        return;
    };
    let Ok(Value::Object(incoming)) = serde_json::from_slice::<Value>(&data[split + 1..]) else {
        return;
    };
    let existing: PropMap = existing;
    let incoming: PropMap = incoming;

    let merged = merge_preserve_nested(&existing, incoming.clone());

    for (key, value) in &incoming {
        let got = merged.get(key).expect("incoming key kept");
        if !value.is_object() {
            assert_eq!(got, value, "non-object value must replace");
        }
    }
    for (key, value) in &existing {
        if !incoming.contains_key(key) {
            assert_eq!(merged.get(key), Some(value), "existing-only key must survive");
        }
    }

    // Applying the same update again changes nothing.
    let again = merge_preserve_nested(&merged, incoming);
    assert_eq!(again, merged);
});
