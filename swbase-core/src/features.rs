//! Optional hardening and service features.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One toggleable feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    LoggingNtp,
    SnmpTemplate,
    Lldp,
    StpHardening,
    DhcpSnooping,
    PortSecurity,
    StormControl,
    EmbedSshKey,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::StpHardening,
        Feature::DhcpSnooping,
        Feature::PortSecurity,
        Feature::StormControl,
        Feature::Lldp,
        Feature::LoggingNtp,
        Feature::SnmpTemplate,
        Feature::EmbedSshKey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::LoggingNtp => "logging-ntp",
            Feature::SnmpTemplate => "snmp-template",
            Feature::Lldp => "lldp",
            Feature::StpHardening => "stp-hardening",
            Feature::DhcpSnooping => "dhcp-snooping",
            Feature::PortSecurity => "port-security",
            Feature::StormControl => "storm-control",
            Feature::EmbedSshKey => "embed-ssh-key",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Feature::LoggingNtp => "Logging, NTP and timezone",
            Feature::SnmpTemplate => "SNMPv3 template",
            Feature::Lldp => "LLDP enable",
            Feature::StpHardening => "STP hardening (bpduguard default, portfast edge)",
            Feature::DhcpSnooping => "DHCP snooping and IP source guard",
            Feature::PortSecurity => "Port-security (sticky MAC on access ports)",
            Feature::StormControl => "Storm-control (broadcast/multicast/unicast)",
            Feature::EmbedSshKey => "Embed SSH public key",
        }
    }

    pub fn parse(raw: &str) -> Option<Feature> {
        let raw = raw.trim().to_ascii_lowercase().replace('_', "-");
        Feature::ALL.into_iter().find(|f| f.as_str() == raw)
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature toggles supplied wholesale by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureSet {
    pub logging_ntp: bool,
    pub snmp_template: bool,
    pub lldp: bool,
    pub stp_hardening: bool,
    pub dhcp_snooping: bool,
    pub port_security: bool,
    pub storm_control: bool,
    pub embed_ssh_key: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            logging_ntp: false,
            snmp_template: false,
            lldp: true,
            stp_hardening: true,
            dhcp_snooping: true,
            port_security: true,
            storm_control: true,
            embed_ssh_key: false,
        }
    }
}

impl FeatureSet {
    /// Every feature off.
    pub fn none() -> Self {
        Self {
            logging_ntp: false,
            snmp_template: false,
            lldp: false,
            stp_hardening: false,
            dhcp_snooping: false,
            port_security: false,
            storm_control: false,
            embed_ssh_key: false,
        }
    }

    /// Every feature on.
    pub fn all() -> Self {
        Self {
            logging_ntp: true,
            snmp_template: true,
            lldp: true,
            stp_hardening: true,
            dhcp_snooping: true,
            port_security: true,
            storm_control: true,
            embed_ssh_key: true,
        }
    }

    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::LoggingNtp => self.logging_ntp,
            Feature::SnmpTemplate => self.snmp_template,
            Feature::Lldp => self.lldp,
            Feature::StpHardening => self.stp_hardening,
            Feature::DhcpSnooping => self.dhcp_snooping,
            Feature::PortSecurity => self.port_security,
            Feature::StormControl => self.storm_control,
            Feature::EmbedSshKey => self.embed_ssh_key,
        }
    }

    /// Copy with `feature` set to `on`.
    pub fn with(mut self, feature: Feature, on: bool) -> Self {
        let slot = match feature {
            Feature::LoggingNtp => &mut self.logging_ntp,
            Feature::SnmpTemplate => &mut self.snmp_template,
            Feature::Lldp => &mut self.lldp,
            Feature::StpHardening => &mut self.stp_hardening,
            Feature::DhcpSnooping => &mut self.dhcp_snooping,
            Feature::PortSecurity => &mut self.port_security,
            Feature::StormControl => &mut self.storm_control,
            Feature::EmbedSshKey => &mut self.embed_ssh_key,
        };
        *slot = on;
        self
    }

    /// Enabled features in display order.
    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.enabled(*f))
            .collect()
    }
}
