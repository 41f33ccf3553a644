use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn swbase() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("swbase"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn copy_store(dir: &Path) -> PathBuf {
    let store = dir.join("profiles.json");
    fs::copy(fixture("fixtures/office-profiles.json"), &store).expect("copy store");
    store
}

#[test]
fn generate_office_matches_golden_file() {
    let dir = tempdir().expect("tempdir");
    swbase()
        .arg("generate")
        .arg("--store")
        .arg(fixture("fixtures/office-profiles.json"))
        .args(["--profile", "office", "--model", "24P"])
        .args(["--enable", "logging-ntp"])
        .args(["--timestamp", "2024-05-01T08:30:00Z"])
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("SW-ACCESS-01-baseline.cfg"))
        .stdout(predicate::str::contains("profile=office vlans=MGMT,DATA,PRINT,VOICE,GUEST"))
        .stdout(predicate::str::contains("- printer (1): FastEthernet0/24"));

    let written =
        fs::read_to_string(dir.path().join("SW-ACCESS-01-baseline.cfg")).expect("read output");
    let expected = fs::read_to_string(fixture("fixtures/office-24p.cfg")).expect("read golden");
    assert_eq!(written, expected);
}

#[test]
fn params_file_and_flags_are_layered() {
    let dir = tempdir().expect("tempdir");
    let store = copy_store(dir.path());
    let params = dir.path().join("floor2.toml");
    fs::write(
        &params,
        r#"
profile = "office"
hostname = "SW-FLOOR2"
model = "48P"
uplinks = 4
without_vlans = ["guest-50"]

[features]
snmp_template = true
"#,
    )
    .expect("write params");

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .arg("--params")
        .arg(&params)
        .args(["--hostname", "SW-FLOOR2-A", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hostname SW-FLOOR2-A"))
        .stdout(predicate::str::contains("! Model: 48P"))
        .stdout(predicate::str::contains(
            "interface range GigabitEthernet0/1 - 2, FastEthernet0/46 - 47",
        ))
        .stdout(predicate::str::contains("snmp-server group NETOPS v3 priv"))
        .stdout(predicate::str::contains(" switchport trunk allowed vlan 10,20,30,40\n"))
        .stdout(predicate::str::contains("Guest VLAN").not());

    assert!(!dir.path().join("SW-FLOOR2-A-baseline.cfg").exists());
}

#[test]
fn refuses_to_overwrite_profile_store() {
    let dir = tempdir().expect("tempdir");
    let store = copy_store(dir.path());
    let before = fs::read_to_string(&store).expect("read store");

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .arg("--output")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    assert_eq!(fs::read_to_string(&store).expect("read store"), before);
}

#[test]
fn invalid_parameters_name_the_field() {
    let dir = tempdir().expect("tempdir");
    let store = copy_store(dir.path());

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--uplinks", "40", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid uplinks"));

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--profile", "office", "--vlan", "cameras-60", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no VLAN 'cameras-60'"));

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--profile", "missing", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile 'missing' not found"));
}

#[test]
fn missing_store_uses_default_profile_without_writing_it() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("profiles.json");

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .arg("--out-dir")
        .arg(dir.path())
        .args(["--hostname", "SW-LOBBY"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("SW-LOBBY-baseline.cfg")).expect("read");
    assert!(written.contains("! Profile: basic-office | VLANs included: MGMT"));
    assert!(written.contains(" ip address 192.168.10.2 255.255.255.0"));
    assert!(!store.exists());
}

#[test]
fn embeds_public_key_or_warns() {
    let dir = tempdir().expect("tempdir");
    let store = copy_store(dir.path());
    let key = dir.path().join("id_ed25519.pub");
    fs::write(&key, "ssh-ed25519 AAAAC3Nza netops@laptop\n").expect("write key");

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--enable", "embed-ssh-key", "--ssh-username", "netops", "--stdout"])
        .arg("--ssh-pubkey")
        .arg(&key)
        .assert()
        .success()
        .stdout(predicate::str::contains(" username netops\n  key-string\n   ssh-ed25519 AAAAC3Nza netops@laptop"));

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--enable", "embed-ssh-key", "--stdout"])
        .arg("--ssh-pubkey")
        .arg(dir.path().join("absent.pub"))
        .assert()
        .success()
        .stdout(predicate::str::contains("! WARNING: could not read public key"))
        .stdout(predicate::str::contains("ip ssh pubkey-chain").not());
}

#[test]
fn access_vlan_flag_overrides_profile_default() {
    let dir = tempdir().expect("tempdir");
    let store = copy_store(dir.path());

    swbase()
        .arg("generate")
        .arg("--store")
        .arg(&store)
        .args(["--profile", "office", "--access-vlan", "40", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            " description *** ACCESS-PORTS ***\n switchport mode access\n switchport access vlan 40\n",
        ))
        .stdout(predicate::str::contains(" switchport access vlan 20\n").not())
        .stdout(predicate::str::contains(" switchport access vlan 30\n"));
}
