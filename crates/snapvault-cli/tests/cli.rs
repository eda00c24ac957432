use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn snapvault() -> Command {
    Command::cargo_bin("snapvault").unwrap()
}

fn project(temp: &TempDir) -> PathBuf {
    let doc = temp.path().join("Scene.blend");
    fs::write(&doc, b"BLEND-BYTES").unwrap();
    doc
}

fn commit(doc: &Path, note: &str) {
    snapvault()
        .args(["commit"])
        .arg(doc)
        .args(["--note", note, "--no-prune"])
        .assert()
        .success();
}

#[test]
fn commit_twice_lists_newest_first() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);

    commit(&doc, "Initial");
    commit(&doc, "v2");

    let root = temp.path().join(".Scene_history");
    assert!(root.join("manifest.json").exists());
    assert!(root.join("v001/snapshot.blend_snapshot").exists());
    assert!(root.join("v002/snapshot.blend_snapshot").exists());

    let output = snapvault()
        .args(["list"])
        .arg(&doc)
        .args(["--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let versions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(versions[0]["id"], "v002");
    assert_eq!(versions[1]["id"], "v001");
    assert_eq!(versions[1]["note"], "Initial");

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["schema_version"], 1);
    assert!(manifest["project_uuid"].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn checkout_enters_snapshot_mode_and_guards() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    commit(&doc, "Initial");

    let output = snapvault()
        .args(["checkout"])
        .arg(&doc)
        .args(["v001"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let snapshot = PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
    assert!(snapshot.ends_with("v001/snapshot.blend_snapshot"));
    assert!(snapshot.exists());

    snapvault()
        .args(["status"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("checked-out snapshot"));

    // committing from a snapshot is refused
    snapvault()
        .args(["commit"])
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("snapshot"));

    snapvault()
        .args(["parent"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Scene.blend"));
}

#[test]
fn restore_overwrites_parent_with_backup() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    commit(&doc, "Initial");

    // the live document moves on
    fs::write(&doc, b"NEWER-WORK").unwrap();

    let snapshot = temp
        .path()
        .join(".Scene_history/v001/snapshot.blend_snapshot");
    snapvault()
        .args(["restore"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));

    assert_eq!(fs::read(&doc).unwrap(), b"BLEND-BYTES");
    let backup = fs::read_dir(temp.path().join(".Scene_history"))
        .unwrap()
        .flatten()
        .find(|e| e.file_name().to_string_lossy().ends_with(".bak"))
        .expect("backup exists");
    assert_eq!(fs::read(backup.path()).unwrap(), b"NEWER-WORK");
}

#[test]
fn fork_creates_new_live_document() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    commit(&doc, "Initial");

    let snapshot = temp
        .path()
        .join(".Scene_history/v001/snapshot.blend_snapshot");
    snapvault()
        .args(["fork"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Scene_v001.blend"));

    let fork = temp.path().join("Scene_v001.blend");
    assert_eq!(fs::read(&fork).unwrap(), b"BLEND-BYTES");
    assert!(
        temp.path()
            .join(".Scene_v001_history/manifest.json")
            .exists()
    );
}

#[test]
fn locked_versions_survive_prune() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    for note in ["1", "2", "3"] {
        commit(&doc, note);
    }

    snapvault()
        .args(["lock"])
        .arg(&doc)
        .args(["v001"])
        .assert()
        .success();

    snapvault()
        .args(["prune"])
        .arg(&doc)
        .args(["--max-keep", "1"])
        .assert()
        .success();

    let root = temp.path().join(".Scene_history");
    assert!(root.join("v001").exists());
    assert!(!root.join("v002").exists());
    assert!(root.join("v003").exists());
}

#[test]
fn delete_refuses_traversal_ids() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    commit(&doc, "Initial");
    let sibling = temp.path().join("etc");
    fs::create_dir(&sibling).unwrap();

    snapvault()
        .args(["delete"])
        .arg(&doc)
        .args(["../etc", "--no-trash"])
        .assert()
        .failure();
    assert!(sibling.exists());
    assert!(temp.path().join(".Scene_history/v001").exists());
}

#[test]
fn delete_removes_version() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);
    commit(&doc, "Initial");

    snapvault()
        .args(["delete"])
        .arg(&doc)
        .args(["v001", "--no-trash"])
        .assert()
        .success();
    assert!(!temp.path().join(".Scene_history/v001").exists());
}

#[test]
fn link_adopts_external_history() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);

    let incoming = temp.path().join("old_history");
    fs::create_dir_all(&incoming).unwrap();
    fs::write(
        incoming.join("manifest.json"),
        r#"{"schema_version": 1, "project_uuid": "old", "parent_file": "/old.blend", "versions": []}"#,
    )
    .unwrap();

    snapvault()
        .args(["link"])
        .arg(&doc)
        .arg(&incoming)
        .assert()
        .success();

    let manifest =
        fs::read_to_string(temp.path().join(".Scene_history/manifest.json")).unwrap();
    assert!(manifest.contains("Scene.blend"));
    assert!(!incoming.exists());
}

#[test]
fn autosave_tick_creates_and_then_skips() {
    let temp = TempDir::new().unwrap();
    let doc = project(&temp);

    snapvault()
        .args(["autosave-tick"])
        .arg(&doc)
        .args(["--interval", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Autosaved"));
    assert!(
        temp.path()
            .join(".Scene_history/autosave/snapshot.blend_snapshot")
            .exists()
    );

    // immediately ticking again is within the interval
    snapvault()
        .args(["autosave-tick"])
        .arg(&doc)
        .args(["--interval", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped"));
}

#[test]
fn missing_document_is_an_error() {
    let temp = TempDir::new().unwrap();
    snapvault()
        .args(["list"])
        .arg(temp.path().join("ghost.blend"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such document"));
}
