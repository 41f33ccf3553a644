use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn profiles(store: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("swbase"));
    cmd.env_remove("RUST_LOG")
        .arg("profiles")
        .args(args)
        .arg("--store")
        .arg(store);
    cmd
}

fn read_store(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read store")).expect("parse store")
}

#[test]
fn list_seeds_default_profile_when_store_is_missing() {
    let dir = tempdir().expect("tempdir");
    let store: PathBuf = dir.path().join("profiles.json");

    profiles(&store, &["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic-office"))
        .stdout(predicate::str::contains("mgmt=vlan10"));
    assert!(!store.exists());
}

#[test]
fn profile_and_vlan_lifecycle() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("profiles.json");

    profiles(&store, &["create", "branch", "--mgmt-id", "100", "--mgmt-network", "10.1.0.0/24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created profile branch"));

    let json = read_store(&store);
    assert_eq!(json[0]["name"], "basic-office");
    assert_eq!(json[1]["vlans"]["mgmt"]["id"], 100);
    assert_eq!(json[1]["vlans"]["mgmt"]["network"], "10.1.0.0");

    profiles(
        &store,
        &[
            "add-vlan",
            "branch",
            "--id", "20",
            "--name", "Staff Data",
            "--network", "10.20.0.0/24",
            "--purpose", "access-default",
        ],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("Added VLAN staff-data-20 to profile branch"));

    profiles(
        &store,
        &[
            "add-vlan",
            "branch",
            "--id", "30",
            "--name", "Printers",
            "--network", "10.30.0.0/24",
            "--purpose", "printer",
        ],
    )
    .assert()
    .success();

    profiles(&store, &["edit-vlan", "branch", "staff-data-20", "--id", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staff-data-20 -> staff-data-21"));

    // Edited entries keep their position.
    let raw = fs::read_to_string(&store).expect("read store");
    let staff = raw.find("\"staff-data-21\"").expect("staff key");
    let printers = raw.find("\"printers-30\"").expect("printers key");
    assert!(staff < printers);
    assert!(!raw.contains("staff-data-20"));

    profiles(&store, &["edit-vlan", "branch", "mgmt", "--svi-host", "5"])
        .assert()
        .success();
    assert_eq!(read_store(&store)[1]["vlans"]["mgmt"]["svi_host"], 5);

    profiles(&store, &["show", "branch"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- printers-30: vlan 30 Printers 10.30.0.0/24 purpose=printer",
        ));

    profiles(&store, &["remove-vlan", "branch", "printers-30"])
        .assert()
        .success();

    profiles(&store, &["remove-vlan", "branch", "mgmt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be removed"));

    profiles(&store, &["delete", "branch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted profile branch"));
    assert_eq!(read_store(&store).as_array().expect("list").len(), 1);
}

#[test]
fn invalid_vlan_reports_every_field() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("profiles.json");

    profiles(
        &store,
        &[
            "add-vlan",
            "basic-office",
            "--id", "5000",
            "--name", " ",
            "--network", "10.0.300.0/40",
        ],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("id: must be 1-4094"))
    .stderr(predicate::str::contains("name: must not be empty"))
    .stderr(predicate::str::contains("prefix: must be 0-32"));
    assert!(!store.exists());
}

#[test]
fn duplicate_vlan_id_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("profiles.json");

    profiles(
        &store,
        &[
            "add-vlan",
            "basic-office",
            "--id", "10",
            "--name", "DUP",
            "--network", "10.10.0.0/24",
        ],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains(
        "VLAN id 10 used by both 'mgmt' and 'dup-10'",
    ));
    assert!(!store.exists());
}

#[test]
fn corrupt_store_is_served_read_only() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("profiles.json");
    fs::write(&store, "[{\"name\": ").expect("write");

    profiles(&store, &["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic-office"))
        .stderr(predicate::str::contains("corrupt"));

    profiles(&store, &["create", "lab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
    assert_eq!(fs::read_to_string(&store).expect("read"), "[{\"name\": ");
}

#[test]
fn list_json_round_trips_store_contents() {
    let store = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures/office-profiles.json");
    let output = profiles(&store, &["list", "--format", "json"])
        .output()
        .expect("list output");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json[1]["name"], "legacy-lab");
    // Legacy `net` keys are written back as `network`.
    assert_eq!(json[1]["vlans"]["mgmt"]["network"], "10.99.0.0");
}
