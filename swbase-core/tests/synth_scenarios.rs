use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use swbase_core::{
    plan_ports, render_text, synthesize, DeviceParams, Feature, FeatureSet, KeySource,
    PlanRequest, Profile, SwitchModel, Synthesis, VlanSelection, MGMT_KEY,
};

struct NoKey;

impl KeySource for NoKey {
    fn read_key(&self, path: &Path) -> Result<String, String> {
        Err(format!("{}: not available", path.display()))
    }
}

fn fixture_path(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(path)
}

fn load_profile(name: &str) -> Profile {
    let raw = fs::read_to_string(fixture_path("fixtures/office-profiles.json")).expect("read fixture");
    let profiles: Vec<Profile> = serde_json::from_str(&raw).expect("parse fixture");
    profiles
        .into_iter()
        .find(|p| p.name == name)
        .expect("profile in fixture")
}

fn stamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
}

fn request_for(model: SwitchModel, uplinks: i64, printers: i64) -> PlanRequest {
    let defaults = model.defaults();
    PlanRequest::new(
        model.base_ports(),
        defaults.base_prefix,
        i64::from(defaults.extra_slots),
        defaults.extra_prefix,
        uplinks,
        printers,
    )
}

fn office_params() -> DeviceParams {
    DeviceParams {
        syslog_server: Some("192.168.10.10".to_string()),
        ntp_server: Some("192.168.10.11".to_string()),
        ..DeviceParams::default()
    }
}

fn run(
    profile: &Profile,
    selection: &VlanSelection,
    features: FeatureSet,
    params: &DeviceParams,
    request: &PlanRequest,
    model: &str,
) -> Vec<String> {
    let plan = plan_ports(request);
    synthesize(
        &Synthesis {
            params,
            features,
            profile,
            selection,
            model,
            request,
            plan: &plan,
            access_vlan_override: None,
            generated_at: stamp(),
        },
        &NoKey,
    )
    .expect("synthesize")
}

#[test]
fn office_24p_matches_golden_file() {
    let profile = load_profile("office");
    let selection = VlanSelection::all(&profile);
    let request = request_for(SwitchModel::P24, 2, 1);
    let lines = run(
        &profile,
        &selection,
        FeatureSet::default().with(Feature::LoggingNtp, true),
        &office_params(),
        &request,
        SwitchModel::P24.as_str(),
    );

    let expected = fs::read_to_string(fixture_path("fixtures/office-24p.cfg")).expect("golden");
    assert_eq!(render_text(&lines), expected.trim_end());
}

#[test]
fn output_is_deterministic_for_fixed_inputs() {
    let profile = load_profile("office");
    let selection = VlanSelection::all(&profile);
    let request = request_for(SwitchModel::P48, 4, 2);
    let features = FeatureSet::all();
    let params = office_params();

    let first = run(&profile, &selection, features, &params, &request, "48P");
    let second = run(&profile, &selection, features, &params, &request, "48P");
    assert_eq!(first, second);
}

#[test]
fn scenario_b_uplinks_spill_into_base_block() {
    let profile = load_profile("office");
    let selection = VlanSelection::all(&profile);
    let request = request_for(SwitchModel::P24, 4, 1);
    let lines = run(
        &profile,
        &selection,
        FeatureSet::default(),
        &DeviceParams::default(),
        &request,
        "24P",
    );

    assert!(lines.contains(&"interface range FastEthernet0/1 - 21".to_string()));
    assert!(lines
        .contains(&"interface range GigabitEthernet0/1 - 2, FastEthernet0/22 - 23".to_string()));
    assert!(lines.contains(&"interface FastEthernet0/24".to_string()));
    assert!(lines.contains(&" switchport trunk allowed vlan 10,20,30,40,50".to_string()));
}

#[test]
fn scenario_c_management_only() {
    let profile = load_profile("legacy-lab");
    let selection = VlanSelection::new();
    let request = request_for(SwitchModel::P16, 0, 0);
    let lines = run(
        &profile,
        &selection,
        FeatureSet::none(),
        &DeviceParams::default(),
        &request,
        "16P",
    );

    assert!(lines.contains(&"vlan 99".to_string()));
    assert!(lines.contains(&" ip address 10.99.0.5 255.255.255.192".to_string()));
    assert!(lines.contains(&"ip default-gateway 10.99.0.1".to_string()));
    assert!(lines.contains(&"interface range FastEthernet0/1 - 16".to_string()));
    // No access-default VLAN chosen, so ports stay in the switch default VLAN.
    assert!(!lines.iter().any(|l| l.starts_with(" switchport access vlan")));
    assert!(!lines.iter().any(|l| l.contains("UPLINK")));
    assert!(!lines.iter().any(|l| l.starts_with("lldp") || l.starts_with("ip dhcp snooping")));
}

#[test]
fn management_vlan_is_always_rendered() {
    let profile = load_profile("office");
    let mut selection = VlanSelection::all(&profile);
    selection.set(MGMT_KEY, false);
    for key in ["data-20", "print-30", "voice-40", "guest-50"] {
        selection.set(key, false);
    }
    let request = request_for(SwitchModel::P24, 2, 0);
    let lines = run(
        &profile,
        &selection,
        FeatureSet::default(),
        &DeviceParams::default(),
        &request,
        "24P",
    );

    assert!(lines.contains(&"vlan 10".to_string()));
    assert!(lines.contains(&"interface Vlan10".to_string()));
    assert!(lines.contains(&" switchport trunk allowed vlan 10".to_string()));
    assert!(lines.contains(&"ip dhcp snooping vlan 10".to_string()));
}

#[test]
fn voice_and_guest_hints_follow_selection() {
    let profile = load_profile("office");
    let mut selection = VlanSelection::all(&profile);
    selection.set("guest-50", false);
    let request = request_for(SwitchModel::P24, 2, 0);
    let lines = run(
        &profile,
        &selection,
        FeatureSet::default(),
        &DeviceParams::default(),
        &request,
        "24P",
    );

    assert!(lines.contains(&"!   switchport voice vlan 40".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("! Guest VLAN")));
}
