use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use swbase_core::ports::validate_interface_prefix;
use swbase_core::{ModelDefaults, SwitchModel};
use thiserror::Error;

const MAX_EXTRA_SLOTS: u32 = 32;

/// Interface layout defaults for one switch model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model: SwitchModel,
    pub base_prefix: String,
    pub extra_prefix: String,
    pub extra_slots: u32,
    #[serde(default)]
    pub note: String,
}

impl ModelEntry {
    pub fn defaults(&self) -> ModelDefaults {
        ModelDefaults {
            base_prefix: self.base_prefix.clone(),
            extra_prefix: self.extra_prefix.clone(),
            extra_slots: self.extra_slots,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    model: Vec<ModelEntry>,
}

/// Errors returned when loading a model catalog file.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read model catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse model catalog {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid model catalog {path}: {message}")]
    Invalid { path: String, message: String },
}

/// Model layout catalog plus a label describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCatalog {
    pub source: String,
    pub entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    /// Catalog compiled into the binary.
    pub fn embedded() -> Self {
        let embedded = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/models/switch-models.toml"
        ));
        match parse_catalog(embedded, "embedded catalog".to_string()) {
            Ok(entries) if !entries.is_empty() => Self {
                source: "embedded".to_string(),
                entries,
            },
            _ => Self {
                source: "built-in".to_string(),
                entries: fallback_entries(),
            },
        }
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let entries = parse_catalog(&raw, path.display().to_string())?;
        Ok(Self {
            source: format!("file:{}", path.display()),
            entries,
        })
    }

    /// Use `path` when given, falling back to the embedded catalog if it
    /// cannot be loaded.
    pub fn resolve(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::embedded();
        };
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!("{err}; using embedded model catalog");
                Self::embedded()
            }
        }
    }

    pub fn entry(&self, model: SwitchModel) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.model == model)
    }

    /// Catalog layout for `model`, or the generic fallback when absent.
    pub fn defaults_for(&self, model: SwitchModel) -> ModelDefaults {
        self.entry(model)
            .map(ModelEntry::defaults)
            .unwrap_or_else(ModelDefaults::fallback)
    }
}

fn parse_catalog(raw: &str, path: String) -> Result<Vec<ModelEntry>, CatalogLoadError> {
    let parsed: CatalogFile = toml::from_str(raw).map_err(|source| CatalogLoadError::Parse {
        path: path.clone(),
        source,
    })?;

    let mut seen = BTreeSet::new();
    for entry in &parsed.model {
        let invalid = |message: String| CatalogLoadError::Invalid {
            path: path.clone(),
            message,
        };
        if !seen.insert(entry.model.as_str()) {
            return Err(invalid(format!("model {} listed twice", entry.model.as_str())));
        }
        validate_interface_prefix(&entry.base_prefix).map_err(&invalid)?;
        validate_interface_prefix(&entry.extra_prefix).map_err(&invalid)?;
        if entry.extra_slots > MAX_EXTRA_SLOTS {
            return Err(invalid(format!(
                "model {}: extra_slots {} exceeds {MAX_EXTRA_SLOTS}",
                entry.model.as_str(),
                entry.extra_slots
            )));
        }
    }
    Ok(parsed.model)
}

fn fallback_entries() -> Vec<ModelEntry> {
    SwitchModel::ALL
        .iter()
        .map(|&model| {
            let defaults = model.defaults();
            ModelEntry {
                model,
                base_prefix: defaults.base_prefix,
                extra_prefix: defaults.extra_prefix,
                extra_slots: defaults.extra_slots,
                note: String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use swbase_core::{ModelDefaults, SwitchModel};

    use super::{CatalogLoadError, ModelCatalog};

    #[test]
    fn embedded_catalog_matches_model_defaults() {
        let catalog = ModelCatalog::embedded();
        assert_eq!(catalog.source, "embedded");
        for model in SwitchModel::ALL {
            assert_eq!(catalog.defaults_for(model), model.defaults());
        }
    }

    #[test]
    fn missing_model_uses_fallback_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models.toml");
        fs::write(
            &path,
            r#"
[[model]]
model = "48P"
base_prefix = "GigabitEthernet1/0/"
extra_prefix = "TenGigabitEthernet1/1/"
extra_slots = 4
"#,
        )
        .expect("write");

        let catalog = ModelCatalog::load(&path).expect("load");
        assert!(catalog.source.starts_with("file:"));
        assert_eq!(catalog.defaults_for(SwitchModel::P48).extra_slots, 4);
        assert_eq!(
            catalog.defaults_for(SwitchModel::P16),
            ModelDefaults::fallback()
        );
    }

    #[test]
    fn rejects_bad_prefix_and_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models.toml");
        fs::write(
            &path,
            r#"
[[model]]
model = "24P"
base_prefix = "Port"
extra_prefix = "GigabitEthernet0/"
extra_slots = 2
"#,
        )
        .expect("write");
        let err = ModelCatalog::load(&path).expect_err("bad prefix");
        assert!(matches!(err, CatalogLoadError::Invalid { .. }));

        fs::write(
            &path,
            r#"
[[model]]
model = "24P"
base_prefix = "Fa0/"
extra_prefix = "Gi0/"
extra_slots = 2

[[model]]
model = "24P"
base_prefix = "Fa0/"
extra_prefix = "Gi0/"
extra_slots = 2
"#,
        )
        .expect("write");
        let err = ModelCatalog::load(&path).expect_err("duplicate");
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn unreadable_override_falls_back_to_embedded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[model]\nmodel = ").expect("write");
        let catalog = ModelCatalog::resolve(Some(&path));
        assert_eq!(catalog.source, "embedded");
    }
}
