//! Supported switch models and their port-layout defaults.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed-port access switch models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchModel {
    #[serde(rename = "16P")]
    P16,
    #[serde(rename = "24P")]
    P24,
    #[serde(rename = "48P")]
    P48,
}

/// Interface naming and extra-slot defaults for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefaults {
    pub base_prefix: String,
    pub extra_prefix: String,
    pub extra_slots: u32,
}

impl ModelDefaults {
    /// Layout used for models without a catalog entry.
    pub fn fallback() -> Self {
        Self {
            base_prefix: "GigabitEthernet1/0/".to_string(),
            extra_prefix: "GigabitEthernet1/0/".to_string(),
            extra_slots: 4,
        }
    }
}

impl SwitchModel {
    pub const ALL: [SwitchModel; 3] = [SwitchModel::P16, SwitchModel::P24, SwitchModel::P48];

    pub fn as_str(self) -> &'static str {
        match self {
            SwitchModel::P16 => "16P",
            SwitchModel::P24 => "24P",
            SwitchModel::P48 => "48P",
        }
    }

    /// Ports on the primary interface block.
    pub fn base_ports(self) -> u32 {
        match self {
            SwitchModel::P16 => 16,
            SwitchModel::P24 => 24,
            SwitchModel::P48 => 48,
        }
    }

    /// Built-in layout (FastEthernet access ports, GigabitEthernet uplinks).
    pub fn defaults(self) -> ModelDefaults {
        let extra_slots = match self {
            SwitchModel::P16 => 0,
            SwitchModel::P24 | SwitchModel::P48 => 2,
        };
        ModelDefaults {
            base_prefix: "FastEthernet0/".to_string(),
            extra_prefix: "GigabitEthernet0/".to_string(),
            extra_slots,
        }
    }
}

impl Display for SwitchModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchModel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let norm = raw.trim().to_ascii_uppercase();
        SwitchModel::ALL
            .into_iter()
            .find(|m| m.as_str() == norm || m.base_ports().to_string() == norm)
            .ok_or_else(|| format!("unknown switch model '{raw}' (expected 16P, 24P or 48P)"))
    }
}
