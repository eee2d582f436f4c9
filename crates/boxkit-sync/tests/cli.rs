//! `boxkit` binary end to end

use boxkit_test_utils::{box_with_parsnip, record, sample_box, WEEK_ONE_PROPERTIES};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn boxkit(args: &[&std::ffi::OsStr]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_boxkit"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn reconcile_prints_properties_and_messages() {
    let dir = TempDir::new().unwrap();
    let state = write(&dir, "state.json", WEEK_ONE_PROPERTIES);
    let catalog = write(&dir, "box.json", &serde_json::to_string(&box_with_parsnip()).unwrap());

    let out = boxkit(&["reconcile".as_ref(), "--state".as_ref(), state.as_os_str(), "--box".as_ref(), catalog.as_os_str()]);

    assert_eq!(out["properties"]["Swapped Items"], "Parsnip 1kg");
    assert_eq!(out["properties"]["Removed Items"], "Beetroot 1kg");
    let messages = out["messages"].as_array().unwrap();
    assert!(messages
        .iter()
        .any(|m| m == "Swapped Parsnip 1kg for your removed item Beetroot 1kg"));
}

#[test]
fn config_file_changes_the_tolerance() {
    let dir = TempDir::new().unwrap();
    let state = write(&dir, "state.json", WEEK_ONE_PROPERTIES);
    let catalog = write(&dir, "box.json", &serde_json::to_string(&box_with_parsnip()).unwrap());
    let config = write(&dir, "boxkit.toml", "swap_price_tolerance = 0\n");

    let out = boxkit(&[
        "reconcile".as_ref(),
        "--state".as_ref(),
        state.as_os_str(),
        "--box".as_ref(),
        catalog.as_os_str(),
        "--config".as_ref(),
        config.as_os_str(),
    ]);

    assert_eq!(out["properties"]["Swapped Items"], "");
    assert_eq!(out["properties"]["Removed Items"], "");
}

#[test]
fn classify_prints_action_queue() {
    let dir = TempDir::new().unwrap();
    let state = write(&dir, "state.json", WEEK_ONE_PROPERTIES);
    let catalog = write(&dir, "box.json", &serde_json::to_string(&sample_box()).unwrap());
    let records = vec![record("r1", "Carrots 1kg", 1), record("r2", "Cabbage Green", 2)];
    let billing = write(&dir, "billing.json", &serde_json::to_string(&records).unwrap());

    let out = boxkit(&[
        "classify".as_ref(),
        "--state".as_ref(),
        state.as_os_str(),
        "--box".as_ref(),
        catalog.as_os_str(),
        "--billing".as_ref(),
        billing.as_os_str(),
    ]);

    let actions = out.as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["kind"], "unsubscribed_extra");
    assert_eq!(actions[0]["items"][0]["title"], "Silverbeet");
    assert_eq!(actions[0]["items"][0]["expected"], 1);
}
