//! Rendering of the baseline configuration statements.
//!
//! Block order is fixed: header, identity and services, VLAN declarations,
//! management SVI and gateway, remote-access bootstrap, optional global
//! feature blocks, access range, uplink trunk range, printer ports, advisory
//! hints, SNMP template, SSH public key, and the final save.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::addr::{address_to_u32, host_address, mask_from_prefix, AddressError};
use crate::features::FeatureSet;
use crate::keys::KeySource;
use crate::ports::{join_ranges, PlanRequest, PortPlan};
use crate::profile::{ModelError, Profile};
use crate::selection::VlanSelection;
use crate::vlan::{Purpose, Vlan};

const RULE: &str = "! ======================================================";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%MZ";

/// Errors that stop synthesis before any statement is produced.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("management VLAN address: {0}")]
    Address(#[from] AddressError),
}

/// Free-form device parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceParams {
    pub hostname: String,
    pub domain: String,
    pub ssh_key_bits: u32,
    #[serde(default)]
    pub syslog_server: Option<String>,
    #[serde(default)]
    pub ntp_server: Option<String>,
    pub ssh_username: String,
    #[serde(default)]
    pub ssh_pubkey_path: Option<PathBuf>,
    /// Overrides the management VLAN's `svi_host` offset.
    #[serde(default)]
    pub mgmt_svi_host: Option<u32>,
    /// Overrides the management VLAN's `gw_host` offset.
    #[serde(default)]
    pub mgmt_gw_host: Option<u32>,
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self {
            hostname: "SW-ACCESS-01".to_string(),
            domain: "corp.local".to_string(),
            ssh_key_bits: 2048,
            syslog_server: None,
            ntp_server: None,
            ssh_username: "admin".to_string(),
            ssh_pubkey_path: None,
            mgmt_svi_host: None,
            mgmt_gw_host: None,
        }
    }
}

/// Everything one synthesis call reads.
#[derive(Debug, Clone)]
pub struct Synthesis<'a> {
    pub params: &'a DeviceParams,
    pub features: FeatureSet,
    pub profile: &'a Profile,
    pub selection: &'a VlanSelection,
    /// Model label for the header, e.g. `24P`.
    pub model: &'a str,
    pub request: &'a PlanRequest,
    pub plan: &'a PortPlan,
    pub access_vlan_override: Option<u16>,
    pub generated_at: DateTime<Utc>,
}

struct Emitter {
    lines: Vec<String>,
}

impl Emitter {
    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn bang(&mut self) {
        self.emit("!");
    }
}

/// Render the configuration statements for `input`.
///
/// The profile is re-validated first; on error nothing is rendered.
pub fn synthesize(input: &Synthesis<'_>, keys: &dyn KeySource) -> Result<Vec<String>, SynthError> {
    input.profile.validate()?;
    let mgmt = input
        .profile
        .management()
        .ok_or_else(|| ModelError::MissingManagement(input.profile.name.clone()))?;
    let mgmt_addr = ManagementAddressing::resolve(mgmt, input.params)?;

    let chosen: Vec<&Vlan> = input
        .selection
        .chosen_vlans(input.profile)
        .map(|(_, v)| v)
        .collect();
    let purpose = |p: Purpose| {
        input
            .profile
            .find_purpose(p, |k| input.selection.is_chosen(k))
    };
    let access_vid = input
        .access_vlan_override
        .or_else(|| purpose(Purpose::AccessDefault).map(|v| v.id));
    let printer = purpose(Purpose::Printer);
    let voice = purpose(Purpose::Voice);
    let guest = purpose(Purpose::Guest);

    debug!(
        "synthesizing {} with {} VLANs, access vlan {:?}",
        input.params.hostname,
        chosen.len(),
        access_vid
    );

    let mut out = Emitter { lines: Vec::new() };
    emit_header(&mut out, input, &chosen);
    emit_identity(&mut out, input.params);
    emit_vlans(&mut out, &chosen);
    emit_management(&mut out, mgmt, &mgmt_addr);
    emit_remote_access(&mut out, input.params);

    let features = &input.features;
    if features.logging_ntp {
        emit_logging(&mut out, input.params);
    }
    if features.lldp {
        out.emit("lldp run");
        out.bang();
    }
    if features.stp_hardening {
        out.emit("spanning-tree mode pvst");
        out.emit("spanning-tree portfast default");
        out.emit("spanning-tree bpduguard default");
        out.bang();
    }
    if features.dhcp_snooping {
        emit_dhcp_snooping(&mut out, &chosen);
    }

    emit_access_ports(&mut out, input.plan, features, access_vid);
    emit_uplinks(&mut out, input.plan, features, &chosen);
    if let Some(printer) = printer {
        emit_printer_ports(&mut out, input.plan, printer.id);
    }
    emit_hints(&mut out, &input.request.base_prefix, voice, guest);

    if features.snmp_template {
        out.emit("snmp-server group NETOPS v3 priv");
        out.emit(
            "snmp-server user netops NETOPS v3 auth sha CHANGEME-Auth priv aes 128 CHANGEME-Priv",
        );
        out.emit("snmp-server contact NetOps");
        out.emit("snmp-server location CHANGE-ME");
        out.bang();
    }
    if features.embed_ssh_key {
        emit_pubkey(&mut out, input.params, keys);
    }

    out.emit("do write memory");
    out.bang();
    Ok(out.lines)
}

/// Join rendered statements into the file payload.
pub fn render_text(lines: &[String]) -> String {
    lines.join("\n")
}

/// Resolved management SVI address, mask and gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementAddressing {
    pub svi_address: String,
    pub mask: String,
    pub gateway: String,
}

impl ManagementAddressing {
    pub fn resolve(mgmt: &Vlan, params: &DeviceParams) -> Result<Self, AddressError> {
        let network = address_to_u32(&mgmt.network)?;
        let mask = mask_from_prefix(mgmt.prefix)?;
        let svi = params.mgmt_svi_host.or(mgmt.svi_host).unwrap_or(2);
        let gw = params.mgmt_gw_host.or(mgmt.gw_host).unwrap_or(1);
        Ok(Self {
            svi_address: host_address(network, svi),
            mask,
            gateway: host_address(network, gw),
        })
    }
}

fn emit_header(out: &mut Emitter, input: &Synthesis<'_>, chosen: &[&Vlan]) {
    let req = input.request;
    let names: Vec<&str> = chosen.iter().map(|v| v.name.as_str()).collect();
    out.emit(RULE);
    out.emit(format!(
        "! Baseline template generated {}",
        input.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.emit(format!(
        "! Model: {} | Base: {} @ {} | Extra uplinks: {} @ {}",
        input.model,
        req.base_ports,
        req.base_prefix,
        req.extra_slots.max(0),
        req.extra_prefix
    ));
    out.emit(format!(
        "! Uplinks requested: {} | Printer ports: {}",
        req.uplinks.max(0),
        req.printers.max(0)
    ));
    out.emit(format!(
        "! Profile: {} | VLANs included: {}",
        input.profile.name,
        names.join(",")
    ));
    out.emit(RULE);
}

fn emit_identity(out: &mut Emitter, params: &DeviceParams) {
    out.emit(format!("hostname {}", params.hostname));
    out.emit("no ip domain-lookup");
    out.emit(format!("ip domain-name {}", params.domain));
    out.emit("service timestamps debug datetime msec");
    out.emit("service timestamps log datetime msec");
    out.emit("service password-encryption");
    out.emit("vtp mode transparent");
    out.bang();
}

fn emit_vlans(out: &mut Emitter, chosen: &[&Vlan]) {
    for vlan in chosen {
        out.emit(format!("vlan {}", vlan.id));
        out.emit(format!(" name {}", vlan.name));
        out.bang();
    }
}

fn emit_management(out: &mut Emitter, mgmt: &Vlan, addr: &ManagementAddressing) {
    out.emit(format!("interface Vlan{}", mgmt.id));
    out.emit(" description *** Management SVI ***");
    out.emit(format!(" ip address {} {}", addr.svi_address, addr.mask));
    out.emit(" no shut");
    out.bang();
    out.emit(format!("ip default-gateway {}", addr.gateway));
    out.bang();
}

fn emit_remote_access(out: &mut Emitter, params: &DeviceParams) {
    out.emit("ip ssh version 2");
    out.emit(format!(
        "crypto key generate rsa modulus {}",
        params.ssh_key_bits
    ));
    out.emit("ip scp server enable");
    out.emit("username admin privilege 15 secret 0 CHANGEME-StrongSecret");
    out.emit("enable secret 0 CHANGEME-Enable");
    out.emit("line con 0");
    out.emit(" logging synchronous");
    out.emit(" exec-timeout 10 0");
    out.emit("line vty 0 4");
    out.emit(" transport input ssh");
    out.emit(" exec-timeout 15 0");
    out.emit(" login local");
    out.bang();
    out.emit("banner login ^");
    out.emit("  Unauthorized access prohibited. Activity may be monitored.");
    out.emit("^");
    out.bang();
}

fn emit_logging(out: &mut Emitter, params: &DeviceParams) {
    out.emit("clock timezone CET 1 0");
    out.emit("clock summer-time CEST recurring last Sun Mar 2:00 last Sun Oct 3:00");
    if let Some(server) = non_empty(&params.syslog_server) {
        out.emit(format!("logging host {server}"));
    }
    out.emit("logging buffered 16384");
    out.emit("logging trap informational");
    if let Some(server) = non_empty(&params.ntp_server) {
        out.emit(format!("ntp server {server}"));
    }
    out.bang();
}

fn emit_dhcp_snooping(out: &mut Emitter, chosen: &[&Vlan]) {
    let ids: Vec<String> = chosen.iter().map(|v| v.id.to_string()).collect();
    out.emit("ip dhcp snooping");
    out.emit("ip dhcp snooping verify mac-address");
    out.emit("ip dhcp snooping information option");
    if !ids.is_empty() {
        out.emit(format!("ip dhcp snooping vlan {}", ids.join(",")));
    }
    out.bang();
}

fn emit_access_ports(
    out: &mut Emitter,
    plan: &PortPlan,
    features: &FeatureSet,
    access_vid: Option<u16>,
) {
    if plan.access_ranges.is_empty() {
        return;
    }
    out.emit(format!(
        "interface range {}",
        join_ranges(&plan.access_ranges)
    ));
    out.emit(" description *** ACCESS-PORTS ***");
    out.emit(" switchport mode access");
    if let Some(vid) = access_vid {
        out.emit(format!(" switchport access vlan {vid}"));
    }
    out.emit(" spanning-tree portfast");
    out.emit(" spanning-tree bpduguard enable");
    if features.storm_control {
        out.emit(" storm-control broadcast level 5.00");
        out.emit(" storm-control multicast level 5.00");
        out.emit(" storm-control unicast level 5.00");
        out.emit(" storm-control action shutdown");
    }
    if features.port_security {
        out.emit(" switchport port-security");
        out.emit(" switchport port-security maximum 2");
        out.emit(" switchport port-security mac-address sticky");
        out.emit(" switchport port-security violation restrict");
    }
    if features.dhcp_snooping {
        out.emit(" ip verify source");
    }
    out.emit(" no shut");
    out.emit(" exit");
    out.bang();
}

fn emit_uplinks(out: &mut Emitter, plan: &PortPlan, features: &FeatureSet, chosen: &[&Vlan]) {
    if plan.uplink_ranges.is_empty() {
        return;
    }
    let mut allowed: Vec<u16> = chosen.iter().map(|v| v.id).collect();
    allowed.sort_unstable();
    allowed.dedup();

    out.emit(format!(
        "interface range {}",
        join_ranges(&plan.uplink_ranges)
    ));
    out.emit(" description *** UPLINK(S) ***");
    out.emit(" switchport mode trunk");
    if !allowed.is_empty() {
        let list: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        out.emit(format!(" switchport trunk allowed vlan {}", list.join(",")));
    }
    if features.dhcp_snooping {
        out.emit(" ip dhcp snooping trust");
    }
    out.emit(" spanning-tree link-type point-to-point");
    out.emit(" no shut");
    out.emit(" exit");
    out.bang();
}

fn emit_printer_ports(out: &mut Emitter, plan: &PortPlan, vid: u16) {
    for iface in &plan.printer_list {
        out.emit(format!("interface {iface}"));
        out.emit(" description *** PRINTER-PORT ***");
        out.emit(" switchport mode access");
        out.emit(format!(" switchport access vlan {vid}"));
        out.emit(" spanning-tree portfast");
        out.emit(" spanning-tree bpduguard enable");
        out.emit(" switchport port-security");
        out.emit(" switchport port-security maximum 1");
        out.emit(" switchport port-security mac-address sticky");
        out.emit(" switchport port-security violation restrict");
        out.emit(" no shut");
        out.emit(" exit");
        out.bang();
    }
}

fn emit_hints(out: &mut Emitter, base_prefix: &str, voice: Option<&Vlan>, guest: Option<&Vlan>) {
    if let Some(voice) = voice {
        out.emit(format!("! Voice VLAN {}: per port, e.g.:", voice.id));
        out.emit(format!("!  interface {base_prefix}x"));
        out.emit(format!("!   switchport voice vlan {}", voice.id));
        out.bang();
    }
    if let Some(guest) = guest {
        out.emit(format!(
            "! Guest VLAN {}: apply to ports/SSIDs as needed.",
            guest.id
        ));
        out.bang();
    }
}

fn emit_pubkey(out: &mut Emitter, params: &DeviceParams, keys: &dyn KeySource) {
    let Some(path) = params.ssh_pubkey_path.as_deref() else {
        return;
    };
    match keys.read_key(path) {
        Ok(key) => {
            out.emit("ip ssh pubkey-chain");
            out.emit(format!(" username {}", params.ssh_username));
            out.emit("  key-string");
            out.emit(format!("   {key}"));
            out.emit("  exit");
            out.emit(" exit");
            out.bang();
        }
        Err(err) => {
            warn!("public key not embedded: {err}");
            out.emit(format!("! WARNING: could not read public key: {err}"));
            out.bang();
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
