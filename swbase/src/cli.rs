use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};
use swbase::params::{FeatureToggles, ParamsFile};
use swbase_core::{Feature, Purpose, SwitchModel};

#[derive(Parser, Debug)]
#[command(name = "swbase")]
#[command(about = "Generate baseline access-switch configurations from VLAN profiles")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Render a baseline configuration file.
    Generate(GenerateArgs),
    /// Show the port plan without rendering a configuration.
    Plan(PlanArgs),
    /// Manage VLAN profiles.
    #[command(subcommand)]
    Profiles(ProfilesCommand),
    /// List switch models and their interface layout.
    Models(ModelsArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ModelArg {
    #[value(name = "16p")]
    P16,
    #[value(name = "24p")]
    P24,
    #[value(name = "48p")]
    P48,
}

impl From<ModelArg> for SwitchModel {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::P16 => SwitchModel::P16,
            ModelArg::P24 => SwitchModel::P24,
            ModelArg::P48 => SwitchModel::P48,
        }
    }
}

fn parse_feature(raw: &str) -> Result<Feature, String> {
    Feature::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Feature::ALL.iter().map(|f| f.as_str()).collect();
        format!("unknown feature '{raw}' (known: {})", known.join(", "))
    })
}

fn parse_purpose(raw: &str) -> Result<Purpose, String> {
    Purpose::parse(raw)
        .filter(|p| *p != Purpose::Mgmt)
        .ok_or_else(|| {
            let known: Vec<&str> = Purpose::CUSTOM.iter().map(|p| p.as_str()).collect();
            format!("unknown purpose '{raw}' (known: {})", known.join(", "))
        })
}

/// Shared switch parameters for `generate` and `plan`.
#[derive(Args, Debug)]
pub struct SwitchArgs {
    /// Profile store file.
    #[arg(long, default_value = "profiles.json")]
    pub store: PathBuf,
    /// Profile name. Defaults to the first profile in the store.
    #[arg(long)]
    pub profile: Option<String>,
    /// TOML parameters file; flags override its values.
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Model catalog TOML replacing the embedded one.
    #[arg(long)]
    pub models_file: Option<PathBuf>,
    #[arg(long, value_enum, ignore_case = true)]
    pub model: Option<ModelArg>,
    #[arg(long)]
    pub hostname: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub ssh_key_bits: Option<u32>,
    #[arg(long)]
    pub syslog_server: Option<String>,
    #[arg(long)]
    pub ntp_server: Option<String>,
    #[arg(long)]
    pub ssh_username: Option<String>,
    /// Public key file embedded by the embed-ssh-key feature.
    #[arg(long)]
    pub ssh_pubkey: Option<PathBuf>,
    /// Management SVI host offset within the management network.
    #[arg(long)]
    pub mgmt_svi_host: Option<u32>,
    /// Default gateway host offset within the management network.
    #[arg(long)]
    pub mgmt_gw_host: Option<u32>,
    #[arg(long)]
    pub base_prefix: Option<String>,
    #[arg(long)]
    pub extra_prefix: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub extra_slots: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub uplinks: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub printers: Option<i64>,
    /// Default access VLAN id for the access port range.
    #[arg(long)]
    pub access_vlan: Option<u16>,
    /// Include only these VLAN keys (repeatable). The management VLAN is always included.
    #[arg(long = "vlan")]
    pub vlans: Vec<String>,
    /// Exclude a VLAN key (repeatable).
    #[arg(long = "without-vlan")]
    pub without_vlans: Vec<String>,
    /// Enable a feature (repeatable).
    #[arg(long, value_parser = parse_feature)]
    pub enable: Vec<Feature>,
    /// Disable a feature (repeatable).
    #[arg(long, value_parser = parse_feature)]
    pub disable: Vec<Feature>,
}

impl SwitchArgs {
    /// Command-line values as the top parameter layer.
    pub fn layer(&self) -> ParamsFile {
        ParamsFile {
            profile: self.profile.clone(),
            model: self.model.map(SwitchModel::from),
            hostname: self.hostname.clone(),
            domain: self.domain.clone(),
            ssh_key_bits: self.ssh_key_bits,
            syslog_server: self.syslog_server.clone(),
            ntp_server: self.ntp_server.clone(),
            ssh_username: self.ssh_username.clone(),
            ssh_pubkey_path: self.ssh_pubkey.clone(),
            mgmt_svi_host: self.mgmt_svi_host,
            mgmt_gw_host: self.mgmt_gw_host,
            base_prefix: self.base_prefix.clone(),
            extra_prefix: self.extra_prefix.clone(),
            extra_slots: self.extra_slots,
            uplinks: self.uplinks,
            printers: self.printers,
            access_vlan: self.access_vlan,
            vlans: (!self.vlans.is_empty()).then(|| self.vlans.clone()),
            without_vlans: self.without_vlans.clone(),
            features: None,
        }
    }

    pub fn toggles(&self) -> FeatureToggles {
        FeatureToggles {
            enable: self.enable.clone(),
            disable: self.disable.clone(),
        }
    }
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub switch: SwitchArgs,
    /// Directory for `{hostname}-baseline.cfg`.
    #[arg(long, default_value = ".", conflicts_with = "output")]
    pub out_dir: PathBuf,
    /// Exact output file path.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Print the configuration instead of writing a file.
    #[arg(long, conflicts_with_all = ["output", "out_dir"])]
    pub stdout: bool,
    /// Fix the header timestamp (RFC 3339) for reproducible output.
    #[arg(long)]
    pub timestamp: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub switch: SwitchArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List stored profiles.
    List(StoreArgs),
    /// Show one profile's VLANs.
    Show(ProfileNameArgs),
    /// Create a profile holding only a management VLAN.
    Create(CreateProfileArgs),
    /// Delete a profile.
    Delete(ProfileNameArgs),
    /// Add a custom VLAN to a profile.
    AddVlan(AddVlanArgs),
    /// Replace a VLAN of a profile; `mgmt` edits the management VLAN.
    EditVlan(EditVlanArgs),
    /// Remove a custom VLAN from a profile.
    RemoveVlan(RemoveVlanArgs),
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Profile store file.
    #[arg(long, default_value = "profiles.json")]
    pub store: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ProfileNameArgs {
    pub name: String,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct CreateProfileArgs {
    pub name: String,
    #[arg(long, default_value_t = 10)]
    pub mgmt_id: u16,
    #[arg(long, default_value = "MGMT")]
    pub mgmt_name: String,
    /// Management network in `a.b.c.d/len` form.
    #[arg(long, default_value = "192.168.10.0/24")]
    pub mgmt_network: String,
    #[arg(long, default_value_t = 1)]
    pub gw_host: u32,
    #[arg(long, default_value_t = 2)]
    pub svi_host: u32,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct VlanFields {
    #[arg(long)]
    pub id: u16,
    #[arg(long)]
    pub name: String,
    /// Network in `a.b.c.d/len` form.
    #[arg(long)]
    pub network: String,
    #[arg(long, value_parser = parse_purpose, default_value = "general")]
    pub purpose: Purpose,
}

#[derive(Args, Debug)]
pub struct AddVlanArgs {
    pub profile: String,
    #[command(flatten)]
    pub vlan: VlanFields,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct EditVlanArgs {
    pub profile: String,
    pub key: String,
    #[arg(long)]
    pub id: Option<u16>,
    #[arg(long)]
    pub name: Option<String>,
    /// Network in `a.b.c.d/len` form.
    #[arg(long)]
    pub network: Option<String>,
    /// New purpose (custom VLANs only).
    #[arg(long, value_parser = parse_purpose)]
    pub purpose: Option<Purpose>,
    /// Gateway host offset (management VLAN only).
    #[arg(long)]
    pub gw_host: Option<u32>,
    /// SVI host offset (management VLAN only).
    #[arg(long)]
    pub svi_host: Option<u32>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct RemoveVlanArgs {
    pub profile: String,
    pub key: String,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Model catalog TOML replacing the embedded one.
    #[arg(long)]
    pub models_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
