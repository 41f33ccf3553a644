//! Parameter files and resolution of everything a synthesis run needs.
//!
//! Sources are layered: command-line values over a TOML parameters file over
//! the model catalog over built-in defaults. [`resolve`] validates the merged
//! record before any planning or rendering happens.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Deserialize;
use swbase_core::ports::validate_interface_prefix;
use swbase_core::{
    address_to_u32, plan_ports, u32_to_address, DeviceParams, Feature, FeatureSet, PlanRequest,
    PortPlan, Profile, Purpose, SwitchModel, Synthesis, VlanSelection, MGMT_KEY,
};
use thiserror::Error;

use crate::catalog::ModelCatalog;

pub const DEFAULT_MODEL: SwitchModel = SwitchModel::P24;
pub const DEFAULT_UPLINKS: i64 = 2;
pub const DEFAULT_PRINTERS: i64 = 1;

const KEY_BITS: (u32, u32) = (1024, 4096);
const MAX_UPLINKS: i64 = 32;
const MAX_EXTRA_SLOTS: i64 = 32;
const MAX_PRINTERS: i64 = 16;
const SYSLOG_HOST: u32 = 10;
const NTP_HOST: u32 = 11;

/// Errors returned when loading a parameters file.
#[derive(Debug, Error)]
pub enum ParamsLoadError {
    #[error("failed to read parameters file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse parameters file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// A parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidInput {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidInput {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// One layer of parameters. Every field is optional; unset fields fall
/// through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsFile {
    pub profile: Option<String>,
    pub model: Option<SwitchModel>,
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub ssh_key_bits: Option<u32>,
    pub syslog_server: Option<String>,
    pub ntp_server: Option<String>,
    pub ssh_username: Option<String>,
    pub ssh_pubkey_path: Option<PathBuf>,
    pub mgmt_svi_host: Option<u32>,
    pub mgmt_gw_host: Option<u32>,
    pub base_prefix: Option<String>,
    pub extra_prefix: Option<String>,
    pub extra_slots: Option<i64>,
    pub uplinks: Option<i64>,
    pub printers: Option<i64>,
    /// Default access VLAN id, overriding the `access-default` purpose.
    pub access_vlan: Option<u16>,
    /// VLAN keys to include. Unset means every VLAN of the profile.
    pub vlans: Option<Vec<String>>,
    pub without_vlans: Vec<String>,
    pub features: Option<FeatureSet>,
}

impl ParamsFile {
    pub fn load(path: &Path) -> Result<Self, ParamsLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| ParamsLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ParamsLoadError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Merge `self` over `lower`: set fields win, VLAN exclusions accumulate.
    pub fn layered_over(self, lower: ParamsFile) -> ParamsFile {
        let mut without_vlans = lower.without_vlans;
        for key in self.without_vlans {
            if !without_vlans.contains(&key) {
                without_vlans.push(key);
            }
        }
        ParamsFile {
            profile: self.profile.or(lower.profile),
            model: self.model.or(lower.model),
            hostname: self.hostname.or(lower.hostname),
            domain: self.domain.or(lower.domain),
            ssh_key_bits: self.ssh_key_bits.or(lower.ssh_key_bits),
            syslog_server: self.syslog_server.or(lower.syslog_server),
            ntp_server: self.ntp_server.or(lower.ntp_server),
            ssh_username: self.ssh_username.or(lower.ssh_username),
            ssh_pubkey_path: self.ssh_pubkey_path.or(lower.ssh_pubkey_path),
            mgmt_svi_host: self.mgmt_svi_host.or(lower.mgmt_svi_host),
            mgmt_gw_host: self.mgmt_gw_host.or(lower.mgmt_gw_host),
            base_prefix: self.base_prefix.or(lower.base_prefix),
            extra_prefix: self.extra_prefix.or(lower.extra_prefix),
            extra_slots: self.extra_slots.or(lower.extra_slots),
            uplinks: self.uplinks.or(lower.uplinks),
            printers: self.printers.or(lower.printers),
            access_vlan: self.access_vlan.or(lower.access_vlan),
            vlans: self.vlans.or(lower.vlans),
            without_vlans,
            features: self.features.or(lower.features),
        }
    }
}

/// Per-feature switches applied on top of the resolved feature set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureToggles {
    pub enable: Vec<Feature>,
    pub disable: Vec<Feature>,
}

impl FeatureToggles {
    pub fn apply(&self, base: FeatureSet) -> FeatureSet {
        let enabled = self
            .enable
            .iter()
            .fold(base, |set, &feature| set.with(feature, true));
        self.disable
            .iter()
            .fold(enabled, |set, &feature| set.with(feature, false))
    }
}

/// Fully resolved and validated inputs for one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisInput {
    pub profile: Profile,
    pub selection: VlanSelection,
    pub params: DeviceParams,
    pub features: FeatureSet,
    pub model: SwitchModel,
    pub request: PlanRequest,
    pub access_vlan_override: Option<u16>,
}

impl SynthesisInput {
    pub fn plan(&self) -> PortPlan {
        plan_ports(&self.request)
    }

    pub fn synthesis<'a>(
        &'a self,
        plan: &'a PortPlan,
        generated_at: DateTime<Utc>,
    ) -> Synthesis<'a> {
        Synthesis {
            params: &self.params,
            features: self.features,
            profile: &self.profile,
            selection: &self.selection,
            model: self.model.as_str(),
            request: &self.request,
            plan,
            access_vlan_override: self.access_vlan_override,
            generated_at,
        }
    }
}

/// Validate `layer` against `profile` and fill every gap from the catalog
/// and built-in defaults.
pub fn resolve(
    profile: Profile,
    layer: &ParamsFile,
    toggles: &FeatureToggles,
    catalog: &ModelCatalog,
) -> Result<SynthesisInput, InvalidInput> {
    profile
        .validate()
        .map_err(|err| InvalidInput::new("profile", err.to_string()))?;
    let mgmt = profile
        .management()
        .ok_or_else(|| InvalidInput::new("profile", "missing management VLAN"))?;

    let defaults = DeviceParams::default();
    let hostname = required_text("hostname", layer.hostname.as_deref(), &defaults.hostname)?;
    let domain = required_text("domain", layer.domain.as_deref(), &defaults.domain)?;
    let ssh_username = required_text(
        "ssh-username",
        layer.ssh_username.as_deref(),
        &defaults.ssh_username,
    )?;

    let ssh_key_bits = layer.ssh_key_bits.unwrap_or(defaults.ssh_key_bits);
    if !(KEY_BITS.0..=KEY_BITS.1).contains(&ssh_key_bits) {
        return Err(InvalidInput::new(
            "ssh-key-bits",
            format!("must be {}-{}, got {ssh_key_bits}", KEY_BITS.0, KEY_BITS.1),
        ));
    }

    let max_host = mgmt.max_host_offset().unwrap_or(0);
    for (field, value) in [
        ("mgmt-svi-host", layer.mgmt_svi_host),
        ("mgmt-gw-host", layer.mgmt_gw_host),
    ] {
        if let Some(v) = value {
            if v < 1 || v > max_host {
                return Err(InvalidInput::new(
                    field,
                    format!("must be 1-{max_host} for /{}, got {v}", mgmt.prefix),
                ));
            }
        }
    }

    let model = layer.model.unwrap_or(DEFAULT_MODEL);
    let layout = catalog.defaults_for(model);
    let base_prefix = layer.base_prefix.clone().unwrap_or(layout.base_prefix);
    let extra_prefix = layer.extra_prefix.clone().unwrap_or(layout.extra_prefix);
    validate_interface_prefix(&base_prefix).map_err(|e| InvalidInput::new("base-prefix", e))?;
    validate_interface_prefix(&extra_prefix).map_err(|e| InvalidInput::new("extra-prefix", e))?;

    let extra_slots = bounded(
        "extra-slots",
        layer.extra_slots.unwrap_or(i64::from(layout.extra_slots)),
        MAX_EXTRA_SLOTS,
    )?;
    let uplinks = bounded("uplinks", layer.uplinks.unwrap_or(DEFAULT_UPLINKS), MAX_UPLINKS)?;
    let mut printers = bounded(
        "printers",
        layer.printers.unwrap_or(DEFAULT_PRINTERS),
        MAX_PRINTERS,
    )?;

    if let Some(vid) = layer.access_vlan {
        if !(1..=4094).contains(&vid) {
            return Err(InvalidInput::new(
                "access-vlan",
                format!("must be 1-4094, got {vid}"),
            ));
        }
    }

    let selection = select_vlans(&profile, layer)?;

    if profile
        .find_purpose(Purpose::Printer, |k| selection.is_chosen(k))
        .is_none()
    {
        if printers > 0 {
            info!("no chosen VLAN has purpose printer; printer ports disabled");
        }
        printers = 0;
    }

    let features = toggles.apply(layer.features.unwrap_or_default());

    let (syslog_server, ntp_server) = if features.logging_ntp {
        let base = address_to_u32(&mgmt.network)
            .map_err(|err| InvalidInput::new("profile", err.to_string()))?
            & 0xFFFF_FF00;
        let syslog = server_address(
            "syslog-server",
            layer.syslog_server.as_deref(),
            base + SYSLOG_HOST,
        )?;
        let ntp = server_address("ntp-server", layer.ntp_server.as_deref(), base + NTP_HOST)?;
        (Some(syslog), Some(ntp))
    } else {
        (None, None)
    };

    let ssh_pubkey_path = if features.embed_ssh_key {
        layer.ssh_pubkey_path.clone().or_else(default_pubkey_path)
    } else {
        None
    };

    let params = DeviceParams {
        hostname,
        domain,
        ssh_key_bits,
        syslog_server,
        ntp_server,
        ssh_username,
        ssh_pubkey_path,
        mgmt_svi_host: layer.mgmt_svi_host,
        mgmt_gw_host: layer.mgmt_gw_host,
    };
    let request = PlanRequest::new(
        model.base_ports(),
        base_prefix,
        extra_slots,
        extra_prefix,
        uplinks,
        printers,
    );
    debug!("resolved {} on {} ({})", params.hostname, model.as_str(), profile.name);

    Ok(SynthesisInput {
        profile,
        selection,
        params,
        features,
        model,
        request,
        access_vlan_override: layer.access_vlan,
    })
}

fn required_text(field: &'static str, value: Option<&str>, default: &str) -> Result<String, InvalidInput> {
    let value = value.unwrap_or(default).trim();
    if value.is_empty() {
        return Err(InvalidInput::new(field, "must not be empty"));
    }
    Ok(value.to_string())
}

fn bounded(field: &'static str, value: i64, max: i64) -> Result<i64, InvalidInput> {
    if (0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidInput::new(field, format!("must be 0-{max}, got {value}")))
    }
}

fn server_address(
    field: &'static str,
    given: Option<&str>,
    fallback: u32,
) -> Result<String, InvalidInput> {
    match given.map(str::trim).filter(|s| !s.is_empty()) {
        Some(addr) => {
            address_to_u32(addr).map_err(|err| InvalidInput::new(field, err.to_string()))?;
            Ok(addr.to_string())
        }
        None => Ok(u32_to_address(fallback)),
    }
}

fn select_vlans(profile: &Profile, layer: &ParamsFile) -> Result<VlanSelection, InvalidInput> {
    let mut selection = match &layer.vlans {
        Some(keys) => {
            let mut selection = VlanSelection::new();
            for key in keys {
                known_key(profile, "vlan", key)?;
                selection.set(key, true);
            }
            selection
        }
        None => VlanSelection::all(profile),
    };
    for key in &layer.without_vlans {
        known_key(profile, "without-vlan", key)?;
        if key == MGMT_KEY {
            return Err(InvalidInput::new(
                "without-vlan",
                "the management VLAN is always included",
            ));
        }
        selection.set(key, false);
    }
    Ok(selection)
}

fn known_key(profile: &Profile, field: &'static str, key: &str) -> Result<(), InvalidInput> {
    if profile.vlans.contains_key(key) {
        return Ok(());
    }
    let known: Vec<&str> = profile.vlans.keys().collect();
    Err(InvalidInput::new(
        field,
        format!(
            "profile '{}' has no VLAN '{key}' (known: {})",
            profile.name,
            known.join(", ")
        ),
    ))
}

fn default_pubkey_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".ssh").join("id_rsa.pub"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use swbase_core::{Feature, FeatureSet, Profile, Purpose, SwitchModel, Vlan};

    use super::{resolve, FeatureToggles, InvalidInput, ParamsFile};
    use crate::catalog::ModelCatalog;

    fn office() -> Profile {
        let mut profile = Profile::default_profile();
        for (id, name, purpose) in [
            (20, "DATA", Purpose::AccessDefault),
            (30, "PRINT", Purpose::Printer),
            (40, "VOICE", Purpose::Voice),
        ] {
            profile
                .add_custom(Vlan::custom(id, name, format!("192.168.{id}.0"), 24, purpose))
                .expect("add");
        }
        profile
    }

    fn resolve_with(layer: ParamsFile) -> Result<super::SynthesisInput, InvalidInput> {
        resolve(
            office(),
            &layer,
            &FeatureToggles::default(),
            &ModelCatalog::embedded(),
        )
    }

    fn field_of(layer: ParamsFile) -> &'static str {
        resolve_with(layer).expect_err("invalid").field
    }

    #[test]
    fn defaults_fill_everything() {
        let input = resolve_with(ParamsFile::default()).expect("resolve");
        assert_eq!(input.model, SwitchModel::P24);
        assert_eq!(input.request.base_ports, 24);
        assert_eq!(input.request.base_prefix, "FastEthernet0/");
        assert_eq!(input.request.extra_slots, 2);
        assert_eq!(input.request.uplinks, 2);
        assert_eq!(input.request.printers, 1);
        assert_eq!(input.params.hostname, "SW-ACCESS-01");
        assert_eq!(input.features, FeatureSet::default());
        assert!(input.selection.is_chosen("print-30"));
        assert_eq!(input.params.syslog_server, None);
    }

    #[test]
    fn upper_layer_wins() {
        let file = ParamsFile {
            hostname: Some("SW-FILE".into()),
            uplinks: Some(4),
            without_vlans: vec!["voice-40".into()],
            ..ParamsFile::default()
        };
        let flags = ParamsFile {
            hostname: Some("SW-FLAG".into()),
            without_vlans: vec!["data-20".into()],
            ..ParamsFile::default()
        };
        let merged = flags.layered_over(file);
        assert_eq!(merged.hostname.as_deref(), Some("SW-FLAG"));
        assert_eq!(merged.uplinks, Some(4));
        assert_eq!(merged.without_vlans, vec!["voice-40", "data-20"]);
    }

    #[test]
    fn range_checks_name_the_field() {
        assert_eq!(
            field_of(ParamsFile {
                ssh_key_bits: Some(512),
                ..ParamsFile::default()
            }),
            "ssh-key-bits"
        );
        assert_eq!(
            field_of(ParamsFile {
                uplinks: Some(33),
                ..ParamsFile::default()
            }),
            "uplinks"
        );
        assert_eq!(
            field_of(ParamsFile {
                printers: Some(17),
                ..ParamsFile::default()
            }),
            "printers"
        );
        assert_eq!(
            field_of(ParamsFile {
                extra_slots: Some(-1),
                ..ParamsFile::default()
            }),
            "extra-slots"
        );
        assert_eq!(
            field_of(ParamsFile {
                hostname: Some("  ".into()),
                ..ParamsFile::default()
            }),
            "hostname"
        );
        assert_eq!(
            field_of(ParamsFile {
                mgmt_svi_host: Some(255),
                ..ParamsFile::default()
            }),
            "mgmt-svi-host"
        );
        assert_eq!(
            field_of(ParamsFile {
                access_vlan: Some(4095),
                ..ParamsFile::default()
            }),
            "access-vlan"
        );
        assert_eq!(
            field_of(ParamsFile {
                base_prefix: Some("Port".into()),
                ..ParamsFile::default()
            }),
            "base-prefix"
        );
    }

    #[test]
    fn unknown_vlan_keys_are_rejected() {
        let err = resolve_with(ParamsFile {
            vlans: Some(vec!["nope".into()]),
            ..ParamsFile::default()
        })
        .expect_err("unknown");
        assert_eq!(err.field, "vlan");
        assert!(err.reason.contains("data-20"));

        assert_eq!(
            field_of(ParamsFile {
                without_vlans: vec![super::MGMT_KEY.into()],
                ..ParamsFile::default()
            }),
            "without-vlan"
        );
    }

    #[test]
    fn printers_forced_off_without_printer_vlan() {
        let input = resolve_with(ParamsFile {
            vlans: Some(vec!["data-20".into()]),
            printers: Some(3),
            ..ParamsFile::default()
        })
        .expect("resolve");
        assert_eq!(input.request.printers, 0);
        assert!(!input.selection.is_chosen("print-30"));
        assert!(input.selection.is_chosen("mgmt"));
    }

    #[test]
    fn logging_defaults_derive_from_management_network() {
        let toggles = FeatureToggles {
            enable: vec![Feature::LoggingNtp],
            disable: vec![Feature::Lldp],
        };
        let input = resolve(
            office(),
            &ParamsFile {
                ntp_server: Some("10.0.0.123".into()),
                ..ParamsFile::default()
            },
            &toggles,
            &ModelCatalog::embedded(),
        )
        .expect("resolve");
        assert!(input.features.logging_ntp);
        assert!(!input.features.lldp);
        assert_eq!(input.params.syslog_server.as_deref(), Some("192.168.10.10"));
        assert_eq!(input.params.ntp_server.as_deref(), Some("10.0.0.123"));

        let err = resolve(
            office(),
            &ParamsFile {
                syslog_server: Some("10.0.0".into()),
                ..ParamsFile::default()
            },
            &toggles,
            &ModelCatalog::embedded(),
        )
        .expect_err("bad syslog");
        assert_eq!(err.field, "syslog-server");
    }

    #[test]
    fn parses_params_file_with_feature_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sw.toml");
        fs::write(
            &path,
            r#"
hostname = "SW-FLOOR2"
model = "48P"
uplinks = 4
without_vlans = ["voice-40"]

[features]
logging_ntp = true
storm_control = false
"#,
        )
        .expect("write");

        let layer = ParamsFile::load(&path).expect("load");
        assert_eq!(layer.model, Some(SwitchModel::P48));
        let features = layer.features.expect("features");
        assert!(features.logging_ntp);
        assert!(!features.storm_control);
        assert!(features.lldp);

        fs::write(&path, "hostnme = \"typo\"\n").expect("write");
        assert!(ParamsFile::load(&path).is_err());
    }
}
