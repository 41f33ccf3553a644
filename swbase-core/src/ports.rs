//! Partitioning of a switch's physical ports into access, uplink and printer
//! regions.
//!
//! Printer ports always take the highest-numbered ports of the base block.
//! Uplinks are drawn from the extra block first; any remainder comes from the
//! top of the base block directly below the printer region. Access ports get
//! whatever is left at the bottom of the base block. Demand that does not fit
//! is dropped and reported through [`Shortfall`] instead of failing.

use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;

use log::warn;
use serde::Serialize;

/// A contiguous run of ports under one interface prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRange {
    pub prefix: String,
    pub first: u32,
    pub last: u32,
}

impl PortRange {
    pub fn new(prefix: impl Into<String>, first: u32, last: u32) -> Self {
        Self {
            prefix: prefix.into(),
            first,
            last,
        }
    }

    pub fn port_count(&self) -> u32 {
        (self.last - self.first).saturating_add(1)
    }

    pub fn numbers(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    /// Individual interface names in ascending order.
    pub fn interfaces(&self) -> Vec<String> {
        self.numbers()
            .map(|n| interface_name(&self.prefix, n))
            .collect()
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}{}", self.prefix, self.first)
        } else {
            write!(f, "{}{} - {}", self.prefix, self.first, self.last)
        }
    }
}

pub fn interface_name(prefix: &str, number: u32) -> String {
    format!("{prefix}{number}")
}

/// Render ranges the way an `interface range` statement lists them.
pub fn join_ranges(ranges: &[PortRange]) -> String {
    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Planner inputs. Counts are signed so callers can pass raw values; negative
/// counts are treated as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRequest {
    pub base_ports: u32,
    pub base_prefix: String,
    pub base_start: u32,
    pub extra_prefix: String,
    pub extra_slots: i64,
    pub extra_start: u32,
    pub uplinks: i64,
    pub printers: i64,
}

impl PlanRequest {
    pub fn new(
        base_ports: u32,
        base_prefix: impl Into<String>,
        extra_slots: i64,
        extra_prefix: impl Into<String>,
        uplinks: i64,
        printers: i64,
    ) -> Self {
        Self {
            base_ports,
            base_prefix: base_prefix.into(),
            base_start: 1,
            extra_prefix: extra_prefix.into(),
            extra_slots,
            extra_start: 1,
            uplinks,
            printers,
        }
    }
}

/// Requested versus provided port counts when demand exceeded capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub uplinks_requested: u32,
    pub uplinks_provided: u32,
    pub printers_requested: u32,
    pub printers_provided: u32,
}

/// The computed partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortPlan {
    pub access_ranges: Vec<PortRange>,
    pub uplink_ranges: Vec<PortRange>,
    pub printer_list: Vec<String>,
    /// Printer region as a range, kept for summaries.
    pub printer_range: Option<PortRange>,
    pub shortfall: Option<Shortfall>,
}

impl PortPlan {
    pub fn access_count(&self) -> u32 {
        total_ports(&self.access_ranges)
    }

    pub fn uplink_count(&self) -> u32 {
        total_ports(&self.uplink_ranges)
    }

    pub fn printer_count(&self) -> u32 {
        self.printer_list.len() as u32
    }
}

fn total_ports(ranges: &[PortRange]) -> u32 {
    ranges
        .iter()
        .fold(0u32, |acc, range| acc.saturating_add(range.port_count()))
}

fn clamp_count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Compute the access, uplink and printer regions for `req`.
pub fn plan_ports(req: &PlanRequest) -> PortPlan {
    let uplinks = clamp_count(req.uplinks);
    let printers = clamp_count(req.printers);
    let extra_slots = clamp_count(req.extra_slots);

    // Port numbers are handled as i64 so an empty base block (top < start)
    // needs no special casing.
    let base_start = i64::from(req.base_start);
    let base_top = (base_start + i64::from(req.base_ports) - 1).min(MAX_PORT);
    let base_ports = port_number(base_top - base_start + 1);

    let printer_count = printers.min(base_ports);
    let printer_first = (printer_count > 0).then(|| base_top - i64::from(printer_count) + 1);

    // Extra slots numbered past the top of the port space do not exist.
    let extra_first = i64::from(req.extra_start);
    let extra_room = port_number(MAX_PORT - extra_first + 1);
    let from_extra = uplinks.min(extra_slots).min(extra_room);
    let remaining = uplinks - from_extra;

    let mut uplink_ranges = Vec::new();
    if from_extra > 0 {
        uplink_ranges.push(PortRange::new(
            req.extra_prefix.as_str(),
            req.extra_start,
            port_number(extra_first + i64::from(from_extra) - 1),
        ));
    }

    let below_printers = printer_first.map_or(base_top, |p| p - 1);
    let mut from_base: i64 = 0;
    let mut base_uplink_first = None;
    if remaining > 0 {
        let room = (below_printers - base_start + 1).max(0);
        from_base = i64::from(remaining).min(room);
        if from_base > 0 {
            let first = below_printers - from_base + 1;
            base_uplink_first = Some(first);
            uplink_ranges.push(PortRange::new(
                req.base_prefix.as_str(),
                port_number(first),
                port_number(below_printers),
            ));
        }
    }

    let access_last = base_uplink_first.map_or(below_printers, |u| u - 1);
    let mut access_ranges = Vec::new();
    if access_last >= base_start {
        access_ranges.push(PortRange::new(
            req.base_prefix.as_str(),
            req.base_start,
            port_number(access_last),
        ));
    }

    let printer_range = printer_first.map(|first| {
        PortRange::new(
            req.base_prefix.as_str(),
            port_number(first),
            port_number(base_top),
        )
    });
    let printer_list = printer_range
        .as_ref()
        .map(PortRange::interfaces)
        .unwrap_or_default();

    let uplinks_provided = from_extra + port_number(from_base);
    let shortfall = (uplinks_provided < uplinks || printer_count < printers).then(|| {
        let shortfall = Shortfall {
            uplinks_requested: uplinks,
            uplinks_provided,
            printers_requested: printers,
            printers_provided: printer_count,
        };
        warn!(
            "port demand exceeds capacity: uplinks {}/{} printers {}/{}",
            shortfall.uplinks_provided,
            shortfall.uplinks_requested,
            shortfall.printers_provided,
            shortfall.printers_requested
        );
        shortfall
    });

    PortPlan {
        access_ranges,
        uplink_ranges,
        printer_list,
        printer_range,
        shortfall,
    }
}

const MAX_PORT: i64 = u32::MAX as i64;

fn port_number(n: i64) -> u32 {
    u32::try_from(n.clamp(0, MAX_PORT)).unwrap_or(0)
}

/// Check an interface naming prefix such as `FastEthernet0/`.
pub fn validate_interface_prefix(prefix: &str) -> Result<(), String> {
    const KNOWN: [&str; 6] = [
        "fa",
        "fastethernet",
        "gi",
        "gigabitethernet",
        "te",
        "tengigabitethernet",
    ];
    let lower = prefix.to_ascii_lowercase();
    if prefix.ends_with('/') && KNOWN.iter().any(|k| lower.starts_with(k)) {
        Ok(())
    } else {
        Err(format!(
            "invalid interface prefix '{prefix}' (e.g. FastEthernet0/ or GigabitEthernet0/)"
        ))
    }
}
