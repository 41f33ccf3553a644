//! Named VLAN profiles with ordered, keyed VLAN entries.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::vlan::{Purpose, Vlan, VlanError};

/// Fixed key of the management VLAN.
pub const MGMT_KEY: &str = "mgmt";

/// Errors raised by profile construction and editing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(transparent)]
    InvalidVlan(#[from] VlanError),
    #[error("profile name must not be empty")]
    EmptyName,
    #[error("profile '{0}' has no 'mgmt' VLAN")]
    MissingManagement(String),
    #[error("profile '{profile}': VLAN '{key}' has purpose mgmt but only 'mgmt' may")]
    ExtraManagement { profile: String, key: String },
    #[error("profile '{profile}': 'mgmt' VLAN must have purpose mgmt")]
    ManagementPurpose { profile: String },
    #[error("profile '{profile}': VLAN id {id} used by both '{first}' and '{second}'")]
    DuplicateId {
        profile: String,
        id: u16,
        first: String,
        second: String,
    },
    #[error("VLAN key '{0}' not found")]
    UnknownKey(String),
    #[error("the 'mgmt' VLAN cannot be removed")]
    RemoveManagement,
    #[error("custom VLANs cannot use purpose mgmt")]
    CustomManagement,
}

/// Ordered VLAN entries keyed by stable identifiers.
///
/// Serialized as a JSON object whose member order follows entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanTable {
    entries: Vec<(String, Vlan)>,
}

impl VlanTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Vlan> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vlan)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace `key`, keeping the position of an existing entry.
    pub fn insert(&mut self, key: impl Into<String>, vlan: Vlan) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = vlan,
            None => self.entries.push((key, vlan)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vlan> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for VlanTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, vlan) in &self.entries {
            map.serialize_entry(key, vlan)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VlanTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = VlanTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of VLAN key to VLAN")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<VlanTable, A::Error> {
                let mut table = VlanTable::new();
                while let Some((key, vlan)) = access.next_entry::<String, Vlan>()? {
                    if table.contains_key(&key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate VLAN key '{key}'"
                        )));
                    }
                    table.entries.push((key, vlan));
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// A named VLAN profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub vlans: VlanTable,
}

impl Profile {
    /// A profile holding only the given management VLAN.
    pub fn new(name: impl Into<String>, management: Vlan) -> Self {
        let mut vlans = VlanTable::new();
        vlans.insert(MGMT_KEY, management);
        Self {
            name: name.into(),
            vlans,
        }
    }

    /// Built-in profile served when no storage is available.
    pub fn default_profile() -> Self {
        Self::new(
            "basic-office",
            Vlan::management(10, "MGMT", "192.168.10.0", 24, 1, 2),
        )
    }

    pub fn management(&self) -> Option<&Vlan> {
        self.vlans.get(MGMT_KEY)
    }

    /// Custom VLANs (everything but the management entry) in insertion order.
    pub fn custom_vlans(&self) -> impl Iterator<Item = (&str, &Vlan)> {
        self.vlans.iter().filter(|(k, _)| *k != MGMT_KEY)
    }

    /// Check the profile as a whole.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        let mgmt = self
            .management()
            .ok_or_else(|| ModelError::MissingManagement(self.name.clone()))?;
        if !mgmt.is_management() {
            return Err(ModelError::ManagementPurpose {
                profile: self.name.clone(),
            });
        }

        let mut seen: Vec<(u16, &str)> = Vec::new();
        for (key, vlan) in self.vlans.iter() {
            vlan.validate()?;
            if key != MGMT_KEY && vlan.is_management() {
                return Err(ModelError::ExtraManagement {
                    profile: self.name.clone(),
                    key: key.to_string(),
                });
            }
            if let Some((_, first)) = seen.iter().find(|(id, _)| *id == vlan.id) {
                return Err(ModelError::DuplicateId {
                    profile: self.name.clone(),
                    id: vlan.id,
                    first: (*first).to_string(),
                    second: key.to_string(),
                });
            }
            seen.push((vlan.id, key));
        }
        Ok(())
    }

    /// Validate `vlan`, derive its key and append it.
    pub fn add_custom(&mut self, vlan: Vlan) -> Result<String, ModelError> {
        if vlan.is_management() {
            return Err(ModelError::CustomManagement);
        }
        vlan.validate()?;
        let taken: BTreeSet<&str> = self.vlans.keys().collect();
        let key = derive_key(&vlan.name, vlan.id, &taken);
        self.ensure_unique_id(vlan.id, None, &key)?;
        self.vlans.insert(key.clone(), vlan);
        Ok(key)
    }

    /// Replace the custom VLAN at `key`, re-deriving its key in place.
    ///
    /// Returns the (possibly new) key.
    pub fn edit_custom(&mut self, key: &str, vlan: Vlan) -> Result<String, ModelError> {
        if key == MGMT_KEY {
            return self.set_management(vlan).map(|()| MGMT_KEY.to_string());
        }
        if vlan.is_management() {
            return Err(ModelError::CustomManagement);
        }
        let idx = self
            .vlans
            .position(key)
            .ok_or_else(|| ModelError::UnknownKey(key.to_string()))?;
        vlan.validate()?;

        let taken: BTreeSet<&str> = self.vlans.keys().filter(|k| *k != key).collect();
        let new_key = derive_key(&vlan.name, vlan.id, &taken);
        self.ensure_unique_id(vlan.id, Some(key), &new_key)?;
        self.vlans.entries[idx] = (new_key.clone(), vlan);
        Ok(new_key)
    }

    /// Replace the management VLAN.
    pub fn set_management(&mut self, vlan: Vlan) -> Result<(), ModelError> {
        if !vlan.is_management() {
            return Err(ModelError::ManagementPurpose {
                profile: self.name.clone(),
            });
        }
        vlan.validate()?;
        self.ensure_unique_id(vlan.id, Some(MGMT_KEY), MGMT_KEY)?;
        self.vlans.insert(MGMT_KEY, vlan);
        Ok(())
    }

    /// Fail when another entry (other than `replacing`) already uses `id`.
    fn ensure_unique_id(
        &self,
        id: u16,
        replacing: Option<&str>,
        key: &str,
    ) -> Result<(), ModelError> {
        match self
            .vlans
            .iter()
            .find(|(k, v)| Some(*k) != replacing && v.id == id)
        {
            Some((existing, _)) => Err(ModelError::DuplicateId {
                profile: self.name.clone(),
                id,
                first: existing.to_string(),
                second: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn remove_custom(&mut self, key: &str) -> Result<Vlan, ModelError> {
        if key == MGMT_KEY {
            return Err(ModelError::RemoveManagement);
        }
        self.vlans
            .remove(key)
            .ok_or_else(|| ModelError::UnknownKey(key.to_string()))
    }

    /// First VLAN with `purpose` among entries accepted by `chosen`.
    pub fn find_purpose<'a>(
        &'a self,
        purpose: Purpose,
        chosen: impl Fn(&str) -> bool,
    ) -> Option<&'a Vlan> {
        self.vlans
            .iter()
            .find(|(k, v)| chosen(*k) && v.purpose == purpose)
            .map(|(_, v)| v)
    }
}

/// Slug of `name`: lower-cased, non-alphanumerics folded to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "vlan".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Key for a custom VLAN, suffixed `-2`, `-3`, ... until it is not in `taken`.
pub fn derive_key(name: &str, id: u16, taken: &BTreeSet<&str>) -> String {
    let base = slugify(&format!("{name}-{id}"));
    let is_taken = |k: &str| k == MGMT_KEY || taken.contains(k);
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
