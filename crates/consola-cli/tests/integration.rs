//! Integration tests for the consola binary: project creation, inspection,
//! composition, and validation over real project directories.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `consola` binary built by cargo.
fn consola_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_consola"))
}

fn init_project(root: &Path) {
    let output = consola_bin()
        .arg("init")
        .arg(root)
        .output()
        .expect("failed to run consola init");
    assert!(output.status.success(), "consola init failed");
}

#[test]
fn init_creates_a_broadcast_project() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("FridayShow");

    let output = consola_bin()
        .arg("init")
        .arg(&root)
        .output()
        .expect("failed to run consola init");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created project 'FridayShow'"));
    assert!(stdout.contains("9 nodes"));
    assert!(root.join("graph.json").is_file());
    assert!(root.join("snapshots").is_dir());
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Show");
    init_project(&root);

    let output = consola_bin().arg("init").arg(&root).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "got: {stderr}");
}

#[test]
fn init_empty_starts_with_no_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Blank");

    let output = consola_bin()
        .args(["init", "--empty"])
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 nodes"));
}

#[test]
fn inspect_lists_the_broadcast_graph() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Show");
    init_project(&root);

    let output = consola_bin().arg("inspect").arg(&root).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nodes (9):"));
    assert!(stdout.contains("broadcast_bus"));
    assert!(stdout.contains("monitor_output"));
    assert!(stdout.contains("band_group[0] -> broadcast_bus[0]"));
}

#[test]
fn read_only_commands_refuse_missing_projects() {
    let dir = tempfile::tempdir().unwrap();
    let ghost = dir.path().join("Nothing");

    for command in ["inspect", "layout", "compose", "validate"] {
        let output = consola_bin().arg(command).arg(&ghost).output().unwrap();
        assert!(!output.status.success(), "{command} should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no project at"), "{command} said: {stderr}");
        // A typo'd path must not leave a skeleton behind.
        assert!(!ghost.exists(), "{command} created {}", ghost.display());
    }
}

#[test]
fn layout_places_the_pinned_columns() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Show");
    init_project(&root);

    let output = consola_bin()
        .args(["layout", "--computed"])
        .arg(&root)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Layout v"));
    // The groups sit in the leftmost column, the monitor output rightmost.
    assert!(stdout.contains("(0.00, 0.20)  band_group"));
    assert!(stdout.contains("(1.00, 0.50)  monitor_output"));
    assert!(stdout.contains("broadcast_bus -> broadcast_output"));
}

#[test]
fn compose_reports_the_flattened_graph() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Show");
    init_project(&root);

    let output = consola_bin().arg("compose").arg(&root).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // No micro views yet: the composite mirrors the macro graph.
    assert!(stdout.contains("Composite: 9 nodes, 18 connections (from 9 macro nodes)"));
    assert!(stdout.contains("broadcast_bus"));
}

#[test]
fn validate_passes_a_fresh_project() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Show");
    init_project(&root);

    let output = consola_bin().arg("validate").arg(&root).output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("OK: 9 macro nodes"));
}

#[test]
fn validate_catches_a_dangling_connection() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Edited");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("graph.json"),
        r#"{
            "name": "Edited",
            "graph": {
                "nodes": [
                    {"id": "channel_1", "type": "Channel", "inputs": 2, "outputs": 2}
                ],
                "connections": [
                    {"from": "channel_1", "fromChannel": 0, "to": "ghost_bus", "toChannel": 0}
                ]
            }
        }"#,
    )
    .unwrap();

    let output = consola_bin().arg("validate").arg(&root).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unknown node 'ghost_bus'"), "got: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("problem(s) found"), "got: {stderr}");
}

#[test]
fn validate_catches_an_out_of_range_channel() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Edited");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("graph.json"),
        r#"{
            "name": "Edited",
            "graph": {
                "nodes": [
                    {"id": "mono", "type": "Utility", "inputs": 1, "outputs": 1},
                    {"id": "bus", "type": "GroupBus", "inputs": 2, "outputs": 2}
                ],
                "connections": [
                    {"from": "mono", "fromChannel": 1, "to": "bus", "toChannel": 0}
                ]
            }
        }"#,
    )
    .unwrap();

    let output = consola_bin().arg("validate").arg(&root).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("exceeds source output count 1"), "got: {stdout}");
}
