//! Profile storage.
//!
//! [`ProfileRepository`] is the capability the command runners depend on.
//! [`JsonProfileStore`] keeps profiles in a pretty-printed JSON list on disk;
//! [`MemoryProfileStore`] keeps them in a vector.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use swbase_core::{ModelError, Profile};
use thiserror::Error;

/// Errors returned by profile repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write profile store {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("failed to encode profile store {path}: {source}")]
    Encode {
        path: String,
        source: serde_json::Error,
    },
    #[error("profile store {path} could not be loaded; refusing to overwrite it")]
    Degraded { path: String },
    #[error("profile '{0}' not found")]
    NotFound(String),
    #[error("profile '{0}' already exists")]
    Duplicate(String),
    #[error(transparent)]
    Invalid(#[from] ModelError),
}

/// Named profile storage.
pub trait ProfileRepository {
    /// Profiles in storage order.
    fn list(&self) -> Vec<Profile>;
    fn get(&self, name: &str) -> Result<Profile, StoreError>;
    /// Validate and append a profile whose name is not yet taken.
    fn create(&mut self, profile: Profile) -> Result<(), StoreError>;
    fn delete(&mut self, name: &str) -> Result<Profile, StoreError>;
    /// Validate and replace the stored profile with the same name.
    fn save(&mut self, profile: Profile) -> Result<(), StoreError>;
}

fn find(profiles: &[Profile], name: &str) -> Result<Profile, StoreError> {
    profiles
        .iter()
        .find(|p| p.name == name)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(name.to_string()))
}

fn insert_new(profiles: &mut Vec<Profile>, profile: Profile) -> Result<(), StoreError> {
    profile.validate()?;
    if profiles.iter().any(|p| p.name == profile.name) {
        return Err(StoreError::Duplicate(profile.name));
    }
    profiles.push(profile);
    Ok(())
}

fn remove(profiles: &mut Vec<Profile>, name: &str) -> Result<Profile, StoreError> {
    let idx = profiles
        .iter()
        .position(|p| p.name == name)
        .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
    Ok(profiles.remove(idx))
}

fn replace(profiles: &mut [Profile], profile: Profile) -> Result<(), StoreError> {
    profile.validate()?;
    let slot = profiles
        .iter_mut()
        .find(|p| p.name == profile.name)
        .ok_or_else(|| StoreError::NotFound(profile.name.clone()))?;
    *slot = profile;
    Ok(())
}

/// Vector-backed repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryProfileStore {
    profiles: Vec<Profile>,
}

impl MemoryProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    /// Store holding only the default profile.
    pub fn seeded() -> Self {
        Self::new(vec![Profile::default_profile()])
    }
}

impl ProfileRepository for MemoryProfileStore {
    fn list(&self) -> Vec<Profile> {
        self.profiles.clone()
    }

    fn get(&self, name: &str) -> Result<Profile, StoreError> {
        find(&self.profiles, name)
    }

    fn create(&mut self, profile: Profile) -> Result<(), StoreError> {
        insert_new(&mut self.profiles, profile)
    }

    fn delete(&mut self, name: &str) -> Result<Profile, StoreError> {
        remove(&mut self.profiles, name)
    }

    fn save(&mut self, profile: Profile) -> Result<(), StoreError> {
        replace(&mut self.profiles, profile)
    }
}

/// How the on-disk store was found when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Loaded,
    /// No file yet; serving the default profile until the first write.
    Seeded,
    /// The file exists but could not be read or parsed.
    Degraded,
}

/// JSON file repository. Every mutation rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
    state: StoreState,
    profiles: Vec<Profile>,
}

impl JsonProfileStore {
    /// Open the store at `path`. Never fails: a missing file seeds the
    /// default profile and an unreadable one serves it with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (state, profiles) = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<Profile>>(&raw) {
                Ok(profiles) => (StoreState::Loaded, profiles),
                Err(err) => {
                    warn!(
                        "profile store {} is corrupt ({err}); serving the default profile",
                        path.display()
                    );
                    (StoreState::Degraded, vec![Profile::default_profile()])
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("profile store {} not found; seeding default", path.display());
                (StoreState::Seeded, vec![Profile::default_profile()])
            }
            Err(err) => {
                warn!(
                    "profile store {} is unreadable ({err}); serving the default profile",
                    path.display()
                );
                (StoreState::Degraded, vec![Profile::default_profile()])
            }
        };
        Self {
            path,
            state,
            profiles,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        if self.state == StoreState::Degraded {
            return Err(StoreError::Degraded {
                path: self.path.display().to_string(),
            });
        }
        let mut body =
            serde_json::to_string_pretty(&self.profiles).map_err(|source| StoreError::Encode {
                path: self.path.display().to_string(),
                source,
            })?;
        body.push('\n');
        fs::write(&self.path, body).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        self.state = StoreState::Loaded;
        debug!(
            "wrote {} profiles to {}",
            self.profiles.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Apply `change` and persist; the previous list is restored if the
    /// write fails.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut Vec<Profile>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let previous = self.profiles.clone();
        let out = change(&mut self.profiles)?;
        if let Err(err) = self.persist() {
            self.profiles = previous;
            return Err(err);
        }
        Ok(out)
    }
}

impl ProfileRepository for JsonProfileStore {
    fn list(&self) -> Vec<Profile> {
        self.profiles.clone()
    }

    fn get(&self, name: &str) -> Result<Profile, StoreError> {
        find(&self.profiles, name)
    }

    fn create(&mut self, profile: Profile) -> Result<(), StoreError> {
        self.mutate(|profiles| insert_new(profiles, profile))
    }

    fn delete(&mut self, name: &str) -> Result<Profile, StoreError> {
        self.mutate(|profiles| remove(profiles, name))
    }

    fn save(&mut self, profile: Profile) -> Result<(), StoreError> {
        self.mutate(|profiles| replace(profiles, profile))
    }
}
