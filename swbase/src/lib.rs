//! Command-line front end for baseline switch configuration synthesis.
//!
//! The engine lives in `swbase-core`; this crate supplies what surrounds it:
//!
//! - [`store`]: named profile storage (JSON file or in memory)
//! - [`catalog`]: switch-model layout defaults, embedded or loaded from TOML
//! - [`params`]: TOML parameter files and validated parameter resolution
//! - [`report`]: terminal and JSON rendering of plans, profiles and models
//!
//! # Example
//!
//! ```
//! use swbase::catalog::ModelCatalog;
//! use swbase::params::{resolve, FeatureToggles, ParamsFile};
//! use swbase::store::{MemoryProfileStore, ProfileRepository};
//!
//! let store = MemoryProfileStore::seeded();
//! let profile = store.get("basic-office")?;
//! let input = resolve(
//!     profile,
//!     &ParamsFile::default(),
//!     &FeatureToggles::default(),
//!     &ModelCatalog::embedded(),
//! )?;
//! assert_eq!(input.plan().uplink_count(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod params;
pub mod report;
pub mod store;
