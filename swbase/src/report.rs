use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use swbase_core::{join_ranges, Feature, PortPlan, Profile, Shortfall, SwitchModel};

use crate::catalog::ModelCatalog;
use crate::params::SynthesisInput;

/// Serializable view of a port plan.
#[derive(Debug, Serialize)]
pub struct PlanReport<'a> {
    pub model: SwitchModel,
    pub base_ports: u32,
    pub base_prefix: &'a str,
    pub extra_prefix: &'a str,
    pub extra_slots: i64,
    pub uplinks_requested: i64,
    pub printers_requested: i64,
    pub access: String,
    pub uplink: String,
    pub printer_ports: &'a [String],
    pub access_count: u32,
    pub uplink_count: u32,
    pub printer_count: u32,
    pub shortfall: Option<Shortfall>,
}

impl<'a> PlanReport<'a> {
    pub fn new(input: &'a SynthesisInput, plan: &'a PortPlan) -> Self {
        let req = &input.request;
        Self {
            model: input.model,
            base_ports: req.base_ports,
            base_prefix: &req.base_prefix,
            extra_prefix: &req.extra_prefix,
            extra_slots: req.extra_slots,
            uplinks_requested: req.uplinks,
            printers_requested: req.printers,
            access: join_ranges(&plan.access_ranges),
            uplink: join_ranges(&plan.uplink_ranges),
            printer_ports: &plan.printer_list,
            access_count: plan.access_count(),
            uplink_count: plan.uplink_count(),
            printer_count: plan.printer_count(),
            shortfall: plan.shortfall,
        }
    }
}

/// Render the port plan for terminal output.
pub fn render_plan(input: &SynthesisInput, plan: &PortPlan) -> String {
    let report = PlanReport::new(input, plan);
    let mut out = Vec::new();
    out.push(format!(
        "plan model={} base={} @ {} extra={} @ {}",
        report.model.as_str(),
        report.base_ports,
        report.base_prefix,
        report.extra_slots,
        report.extra_prefix
    ));
    out.push(format!(
        "- access ({}): {}",
        report.access_count,
        or_none(&report.access)
    ));
    out.push(format!(
        "- uplink ({}): {}",
        report.uplink_count,
        or_none(&report.uplink)
    ));
    out.push(format!(
        "- printer ({}): {}",
        report.printer_count,
        or_none(&report.printer_ports.join(", "))
    ));
    if let Some(shortfall) = &report.shortfall {
        out.push(render_shortfall(shortfall));
    }
    out.join("\n")
}

/// Summary printed after a configuration file is written.
pub fn render_generate_summary(
    written: Option<&Path>,
    input: &SynthesisInput,
    plan: &PortPlan,
    line_count: usize,
) -> String {
    let mut out = Vec::new();
    if let Some(path) = written {
        out.push(format!("Wrote {} ({line_count} lines)", path.display()).green().to_string());
    }
    let chosen: Vec<&str> = input
        .selection
        .chosen_vlans(&input.profile)
        .map(|(_, v)| v.name.as_str())
        .collect();
    out.push(format!(
        "profile={} vlans={}",
        input.profile.name,
        chosen.join(",")
    ));
    let features: Vec<&str> = input
        .features
        .enabled_features()
        .into_iter()
        .map(Feature::as_str)
        .collect();
    out.push(format!("features={}", or_none(&features.join(","))));
    out.push(render_plan(input, plan));
    out.join("\n")
}

fn render_shortfall(shortfall: &Shortfall) -> String {
    format!(
        "shortfall uplinks={}/{} printers={}/{}",
        shortfall.uplinks_provided,
        shortfall.uplinks_requested,
        shortfall.printers_provided,
        shortfall.printers_requested
    )
    .yellow()
    .to_string()
}

/// One line per profile.
pub fn render_profile_list(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return "- none".to_string();
    }
    profiles
        .iter()
        .map(|p| {
            let mgmt = p
                .management()
                .map(|v| format!("mgmt=vlan{}", v.id))
                .unwrap_or_else(|| "mgmt=missing".red().to_string());
            format!("- {} vlans={} {mgmt}", p.name.bold(), p.vlans.len())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full VLAN table of one profile.
pub fn render_profile(profile: &Profile) -> String {
    let mut out = vec![format!("profile {}", profile.name).cyan().to_string()];
    for (key, vlan) in profile.vlans.iter() {
        let mut line = format!(
            "- {key}: vlan {} {} {}/{} purpose={}",
            vlan.id, vlan.name, vlan.network, vlan.prefix, vlan.purpose
        );
        if let Some(gw) = vlan.gw_host {
            line.push_str(&format!(" gw_host={gw}"));
        }
        if let Some(svi) = vlan.svi_host {
            line.push_str(&format!(" svi_host={svi}"));
        }
        out.push(line);
    }
    out.join("\n")
}

/// Model catalog listing.
pub fn render_models(catalog: &ModelCatalog, verbose: bool) -> String {
    let mut out = Vec::new();
    if verbose {
        out.push(format!("Using models: {}", catalog.source));
    }
    for model in SwitchModel::ALL {
        let layout = catalog.defaults_for(model);
        let marker = if catalog.entry(model).is_some() {
            String::new()
        } else {
            " (fallback)".yellow().to_string()
        };
        out.push(format!(
            "- {} base={} @ {} extra={} @ {}{marker}",
            model.as_str(),
            model.base_ports(),
            layout.base_prefix,
            layout.extra_slots,
            layout.extra_prefix
        ));
    }
    out.join("\n")
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "none"
    } else {
        value
    }
}
