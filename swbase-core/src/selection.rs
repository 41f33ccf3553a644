//! Which profile VLANs are included on one switch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::{Profile, MGMT_KEY};
use crate::vlan::Vlan;

/// VLAN key to inclusion flag. The management key always reads as chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanSelection {
    chosen: BTreeMap<String, bool>,
}

impl VlanSelection {
    /// Nothing chosen except the management VLAN.
    pub fn new() -> Self {
        let mut selection = Self::default();
        selection.chosen.insert(MGMT_KEY.to_string(), true);
        selection
    }

    /// Every VLAN of `profile` chosen.
    pub fn all(profile: &Profile) -> Self {
        let mut selection = Self::new();
        for key in profile.vlans.keys() {
            selection.set(key, true);
        }
        selection
    }

    /// Set the flag for `key`; attempts to deselect the management VLAN are ignored.
    pub fn set(&mut self, key: &str, chosen: bool) {
        let chosen = chosen || key == MGMT_KEY;
        self.chosen.insert(key.to_string(), chosen);
    }

    pub fn is_chosen(&self, key: &str) -> bool {
        key == MGMT_KEY || self.chosen.get(key).copied().unwrap_or(false)
    }

    /// Chosen VLANs of `profile` in profile order.
    pub fn chosen_vlans<'a>(
        &'a self,
        profile: &'a Profile,
    ) -> impl Iterator<Item = (&'a str, &'a Vlan)> + 'a {
        profile.vlans.iter().filter(move |(k, _)| self.is_chosen(k))
    }

    /// Keys present in the selection but absent from `profile`.
    pub fn unknown_keys<'a>(&'a self, profile: &Profile) -> Vec<&'a str> {
        self.chosen
            .keys()
            .map(String::as_str)
            .filter(|k| !profile.vlans.contains_key(k))
            .collect()
    }
}
