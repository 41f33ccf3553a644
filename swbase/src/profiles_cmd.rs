use anyhow::{bail, Context, Result};
use swbase::report::{render_profile, render_profile_list};
use swbase::store::{JsonProfileStore, ProfileRepository};
use swbase_core::{Profile, Vlan, MGMT_KEY};

use crate::cli::{
    AddVlanArgs, CreateProfileArgs, EditVlanArgs, OutputFormat, ProfileNameArgs,
    ProfilesCommand, RemoveVlanArgs, StoreArgs,
};

pub fn run_profiles(command: ProfilesCommand) -> Result<()> {
    match command {
        ProfilesCommand::List(args) => run_list(args),
        ProfilesCommand::Show(args) => run_show(args),
        ProfilesCommand::Create(args) => run_create(args),
        ProfilesCommand::Delete(args) => run_delete(args),
        ProfilesCommand::AddVlan(args) => run_add_vlan(args),
        ProfilesCommand::EditVlan(args) => run_edit_vlan(args),
        ProfilesCommand::RemoveVlan(args) => run_remove_vlan(args),
    }
}

fn run_list(args: StoreArgs) -> Result<()> {
    let store = JsonProfileStore::open(&args.store);
    let profiles = store.list();
    match args.format {
        OutputFormat::Text => println!("{}", render_profile_list(&profiles)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profiles)?),
    }
    Ok(())
}

fn run_show(args: ProfileNameArgs) -> Result<()> {
    let store = JsonProfileStore::open(&args.store.store);
    let profile = store.get(&args.name)?;
    print_profile(&profile, args.store.format)
}

fn run_create(args: CreateProfileArgs) -> Result<()> {
    let (network, prefix) = parse_network(&args.mgmt_network)?;
    let mgmt = Vlan::management(
        args.mgmt_id,
        args.mgmt_name,
        network,
        prefix,
        args.gw_host,
        args.svi_host,
    );
    let profile = Profile::new(args.name, mgmt);

    let mut store = JsonProfileStore::open(&args.store.store);
    store
        .create(profile.clone())
        .with_context(|| format!("failed to create profile '{}'", profile.name))?;
    report_change(
        &format!("Created profile {}", profile.name),
        &profile,
        args.store.format,
    )
}

fn run_delete(args: ProfileNameArgs) -> Result<()> {
    let mut store = JsonProfileStore::open(&args.store.store);
    let removed = store.delete(&args.name)?;
    match args.store.format {
        OutputFormat::Text => println!("Deleted profile {}", removed.name),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&removed)?),
    }
    Ok(())
}

fn run_add_vlan(args: AddVlanArgs) -> Result<()> {
    let (network, prefix) = parse_network(&args.vlan.network)?;
    let vlan = Vlan::custom(args.vlan.id, args.vlan.name, network, prefix, args.vlan.purpose);

    let mut store = JsonProfileStore::open(&args.store.store);
    let mut profile = store.get(&args.profile)?;
    let key = profile
        .add_custom(vlan)
        .with_context(|| format!("failed to add VLAN to profile '{}'", args.profile))?;
    store.save(profile.clone())?;
    report_change(
        &format!("Added VLAN {key} to profile {}", profile.name),
        &profile,
        args.store.format,
    )
}

fn run_edit_vlan(args: EditVlanArgs) -> Result<()> {
    let mut store = JsonProfileStore::open(&args.store.store);
    let mut profile = store.get(&args.profile)?;
    let Some(current) = profile.vlans.get(&args.key).cloned() else {
        bail!("profile '{}' has no VLAN '{}'", profile.name, args.key);
    };

    let is_mgmt = args.key == MGMT_KEY;
    if is_mgmt && args.purpose.is_some() {
        bail!("the management VLAN's purpose cannot be changed");
    }
    if !is_mgmt && (args.gw_host.is_some() || args.svi_host.is_some()) {
        bail!("--gw-host and --svi-host only apply to the management VLAN");
    }

    let mut vlan = current;
    if let Some(id) = args.id {
        vlan.id = id;
    }
    if let Some(name) = args.name {
        vlan.name = name;
    }
    if let Some(raw) = &args.network {
        let (network, prefix) = parse_network(raw)?;
        vlan.network = network;
        vlan.prefix = prefix;
    }
    if let Some(purpose) = args.purpose {
        vlan.purpose = purpose;
    }
    if let Some(gw) = args.gw_host {
        vlan.gw_host = Some(gw);
    }
    if let Some(svi) = args.svi_host {
        vlan.svi_host = Some(svi);
    }

    let new_key = profile
        .edit_custom(&args.key, vlan)
        .with_context(|| format!("failed to edit VLAN '{}'", args.key))?;
    store.save(profile.clone())?;

    let message = if new_key == args.key {
        format!("Updated VLAN {new_key} in profile {}", profile.name)
    } else {
        format!(
            "Updated VLAN {} -> {new_key} in profile {}",
            args.key, profile.name
        )
    };
    report_change(&message, &profile, args.store.format)
}

fn run_remove_vlan(args: RemoveVlanArgs) -> Result<()> {
    let mut store = JsonProfileStore::open(&args.store.store);
    let mut profile = store.get(&args.profile)?;
    let removed = profile
        .remove_custom(&args.key)
        .with_context(|| format!("failed to remove VLAN '{}'", args.key))?;
    store.save(profile.clone())?;
    report_change(
        &format!(
            "Removed VLAN {} ({}) from profile {}",
            args.key, removed.id, profile.name
        ),
        &profile,
        args.store.format,
    )
}

fn report_change(message: &str, profile: &Profile, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{message}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile)?),
    }
    Ok(())
}

fn print_profile(profile: &Profile, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render_profile(profile)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile)?),
    }
    Ok(())
}

/// Split `a.b.c.d/len`. The address itself is checked by VLAN validation.
fn parse_network(raw: &str) -> Result<(String, u32)> {
    let (addr, len) = raw
        .split_once('/')
        .with_context(|| format!("network '{raw}' must be in a.b.c.d/len form"))?;
    let prefix = len
        .trim()
        .parse::<u32>()
        .with_context(|| format!("network '{raw}' has an invalid prefix length"))?;
    Ok((addr.trim().to_string(), prefix))
}
