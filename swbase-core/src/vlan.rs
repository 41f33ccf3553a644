//! VLAN definitions and per-field validation.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::addr::{address_to_u32, host_capacity};

pub const MIN_VLAN_ID: u16 = 1;
pub const MAX_VLAN_ID: u16 = 4094;

/// What a VLAN is used for when rendering port blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    Mgmt,
    #[default]
    General,
    AccessDefault,
    Printer,
    Voice,
    Guest,
}

impl Purpose {
    /// Purposes selectable for custom VLANs.
    pub const CUSTOM: [Purpose; 5] = [
        Purpose::General,
        Purpose::AccessDefault,
        Purpose::Printer,
        Purpose::Voice,
        Purpose::Guest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Mgmt => "mgmt",
            Purpose::General => "general",
            Purpose::AccessDefault => "access-default",
            Purpose::Printer => "printer",
            Purpose::Voice => "voice",
            Purpose::Guest => "guest",
        }
    }

    pub fn parse(raw: &str) -> Option<Purpose> {
        let raw = raw.trim().to_ascii_lowercase();
        [Purpose::Mgmt]
            .into_iter()
            .chain(Purpose::CUSTOM)
            .find(|p| p.as_str() == raw)
    }
}

impl Display for Purpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One VLAN of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: u16,
    pub name: String,
    /// Network base address in dotted form.
    #[serde(alias = "net")]
    pub network: String,
    pub prefix: u32,
    #[serde(default)]
    pub purpose: Purpose,
    /// Gateway host offset within `network` (management VLAN only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw_host: Option<u32>,
    /// The switch's own management host offset (management VLAN only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svi_host: Option<u32>,
}

impl Vlan {
    /// A custom VLAN without host offsets.
    pub fn custom(
        id: u16,
        name: impl Into<String>,
        network: impl Into<String>,
        prefix: u32,
        purpose: Purpose,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            network: network.into(),
            prefix,
            purpose,
            gw_host: None,
            svi_host: None,
        }
    }

    /// A management VLAN with gateway and SVI offsets.
    pub fn management(
        id: u16,
        name: impl Into<String>,
        network: impl Into<String>,
        prefix: u32,
        gw_host: u32,
        svi_host: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            network: network.into(),
            prefix,
            purpose: Purpose::Mgmt,
            gw_host: Some(gw_host),
            svi_host: Some(svi_host),
        }
    }

    pub fn is_management(&self) -> bool {
        self.purpose == Purpose::Mgmt
    }

    /// Check every field and return all violations.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if !(MIN_VLAN_ID..=MAX_VLAN_ID).contains(&self.id) {
            errors.push(FieldError::new(
                VlanField::Id,
                format!("must be {MIN_VLAN_ID}-{MAX_VLAN_ID}, got {}", self.id),
            ));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::new(VlanField::Name, "must not be empty"));
        }
        if let Err(err) = address_to_u32(&self.network) {
            errors.push(FieldError::new(VlanField::Network, err.to_string()));
        }
        if self.prefix > 32 {
            errors.push(FieldError::new(
                VlanField::Prefix,
                format!("must be 0-32, got {}", self.prefix),
            ));
        }

        if self.is_management() {
            if let Ok(capacity) = host_capacity(self.prefix) {
                let max = capacity.saturating_sub(2);
                for (field, value) in [
                    (VlanField::GwHost, self.gw_host),
                    (VlanField::SviHost, self.svi_host),
                ] {
                    match value {
                        None => errors.push(FieldError::new(field, "required for the management VLAN")),
                        Some(v) if u64::from(v) < 1 || u64::from(v) > max => {
                            errors.push(FieldError::new(field, host_range_message(max, v)))
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        errors
    }

    /// Validate and fail with every field error found.
    pub fn validate(&self) -> Result<(), VlanError> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(VlanError {
                vlan: self.name.clone(),
                errors,
            })
        }
    }

    /// Largest valid host offset for this VLAN's prefix, if any host fits.
    pub fn max_host_offset(&self) -> Option<u32> {
        let capacity = host_capacity(self.prefix).ok()?;
        let max = capacity.checked_sub(2)?;
        if max == 0 {
            return None;
        }
        u32::try_from(max).ok()
    }
}

fn host_range_message(max: u64, got: u32) -> String {
    if max == 0 {
        format!("no usable host offsets in this prefix, got {got}")
    } else {
        format!("must be 1-{max}, got {got}")
    }
}

/// Field of a [`Vlan`] named by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VlanField {
    Id,
    Name,
    Network,
    Prefix,
    GwHost,
    SviHost,
}

impl VlanField {
    pub fn as_str(self) -> &'static str {
        match self {
            VlanField::Id => "id",
            VlanField::Name => "name",
            VlanField::Network => "network",
            VlanField::Prefix => "prefix",
            VlanField::GwHost => "gw_host",
            VlanField::SviHost => "svi_host",
        }
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: VlanField,
    pub constraint: String,
}

impl FieldError {
    fn new(field: VlanField, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.as_str(), self.constraint)
    }
}

/// All field errors of one VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid VLAN '{vlan}': {}", join_errors(.errors))]
pub struct VlanError {
    pub vlan: String,
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
