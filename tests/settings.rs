//! Settings store properties through the request-layer API.

use std::sync::Arc;
use std::thread;

use serde_json::{Map, Value, json};

use ledmatrix::api::Api;
use ledmatrix::command;
use ledmatrix::settings::{Mode, ScrollDirection, Settings, SettingsStore};

fn api() -> Api {
    let (sender, _queue) = command::queue();
    Api::new(Arc::new(SettingsStore::default()), sender)
}

fn obj(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn test_update_touches_only_named_fields() {
    let api = api();
    let before = api.read_settings();
    let after = api.update_settings(&obj(json!({"scroll_direction": "bottom_to_top"}))).unwrap();
    assert_eq!(
        after,
        Settings {
            scroll_direction: ScrollDirection::BottomToTop,
            ..before
        }
    );
    assert_eq!(api.read_settings(), after);
}

#[test]
fn test_out_of_domain_value_changes_nothing() {
    let api = api();
    api.update_settings(&obj(json!({"contrast": 40, "status_message": "hi"}))).unwrap();
    let before = serde_json::to_string(&api.read_settings()).unwrap();

    for bad in [
        json!({"contrast": 300}),
        json!({"mode": "off", "contrast": -1}),
        json!({"scroll_delay": 0.01, "scroll_direction": "sideways"}),
        json!({"scroll_delay": 1.5}),
        json!({"status_message": 5}),
        json!({"brightness": 3}),
    ] {
        let err = api.update_settings(&obj(bad.clone())).unwrap_err();
        assert!(!err.field.is_empty(), "{bad} rejected without a field");
        assert_eq!(serde_json::to_string(&api.read_settings()).unwrap(), before, "{bad}");
    }
}

#[test]
fn test_contrast_300_is_rejected() {
    let api = api();
    let err = api.update_settings(&obj(json!({"contrast": 300}))).unwrap_err();
    assert_eq!(err.field, "contrast");
    assert_eq!(api.read_settings().contrast, 255);
}

#[test]
fn test_status_message_can_be_cleared() {
    let api = api();
    api.update_settings(&obj(json!({"status_message": "21°C"}))).unwrap();
    assert_eq!(api.read_settings().status_message.as_deref(), Some("21°C"));
    api.update_settings(&obj(json!({"status_message": null}))).unwrap();
    assert_eq!(api.read_settings().status_message, None);
}

#[test]
fn test_concurrent_updates_never_tear() {
    let store = Arc::new(SettingsStore::default());
    let (sender, _queue) = command::queue();
    let api = Api::new(store.clone(), sender);

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let api = api.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let (mode, contrast) = if i % 2 == 0 { ("off", 10) } else { ("time", 200) };
                    api.update_settings(&obj(json!({"mode": mode, "contrast": contrast})))
                        .unwrap();
                }
            })
        })
        .collect();

    for _ in 0..500 {
        let s = store.read();
        match s.mode {
            Mode::Off => assert_eq!(s.contrast, 10),
            Mode::Time => assert!(s.contrast == 200 || s.contrast == 255),
        }
    }
    for w in writers {
        w.join().unwrap();
    }
}

#[test]
fn test_settings_wire_shape() {
    insta::assert_snapshot!(
        serde_json::to_string(&Settings::default()).unwrap(),
        @r#"{"scroll_delay":0.05,"contrast":255,"mode":"time","scroll_direction":"left_to_right","status_message":null}"#
    );
}
