//! Baseline configuration synthesis for access switches.
//!
//! The crate turns a VLAN profile, a per-switch VLAN selection, a port
//! layout request and a set of feature toggles into an ordered list of
//! configuration statements.
//!
//! - [`addr`]: dotted IPv4 addresses, masks and host offsets
//! - [`vlan`], [`profile`]: VLAN definitions, validation and keyed profiles
//! - [`selection`]: which VLANs a switch carries
//! - [`features`]: the closed set of optional blocks
//! - [`model`]: switch models and their default port layout
//! - [`ports`]: the access/uplink/printer port planner
//! - [`synth`]: statement rendering
//! - [`keys`]: public-key material for the SSH pubkey block
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use swbase_core::{
//!     plan_ports, synthesize, DeviceParams, FeatureSet, FsKeySource, PlanRequest, Profile,
//!     Synthesis, VlanSelection,
//! };
//!
//! let profile = Profile::default_profile();
//! let selection = VlanSelection::all(&profile);
//! let request = PlanRequest::new(24, "FastEthernet0/", 2, "GigabitEthernet0/", 2, 0);
//! let plan = plan_ports(&request);
//! let params = DeviceParams::default();
//! let lines = synthesize(
//!     &Synthesis {
//!         params: &params,
//!         features: FeatureSet::default(),
//!         profile: &profile,
//!         selection: &selection,
//!         model: "24P",
//!         request: &request,
//!         plan: &plan,
//!         access_vlan_override: None,
//!         generated_at: Utc::now(),
//!     },
//!     &FsKeySource,
//! )?;
//! assert!(lines.contains(&" ip address 192.168.10.2 255.255.255.0".to_string()));
//! # Ok::<(), swbase_core::SynthError>(())
//! ```

pub mod addr;
pub mod features;
pub mod keys;
pub mod model;
pub mod ports;
pub mod profile;
pub mod selection;
pub mod synth;
pub mod vlan;

pub use addr::{address_to_u32, mask_from_prefix, u32_to_address, AddressError};
pub use features::{Feature, FeatureSet};
pub use keys::{FsKeySource, KeySource};
pub use model::{ModelDefaults, SwitchModel};
pub use ports::{join_ranges, plan_ports, PlanRequest, PortPlan, PortRange, Shortfall};
pub use profile::{ModelError, Profile, VlanTable, MGMT_KEY};
pub use selection::VlanSelection;
pub use synth::{render_text, synthesize, DeviceParams, SynthError, Synthesis};
pub use vlan::{FieldError, Purpose, Vlan, VlanError, VlanField};
