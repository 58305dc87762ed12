use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{
    encoding::{decode_entity, null_as_default, status_emission},
    error::CollectorError,
    traits::CategoryMapper,
    types::CollectorResult,
};
use crate::{
    core::metrics::{MetricDescriptor, MetricEmission, STATUS_TYPE_LABEL},
    register_collector,
};

pub const SUBSYSTEM: &str = "system";

const LABELS: &[&str] = &["firmware", "nic_serial_number"];
const STATUS_LABELS: &[&str] = &["firmware", "nic_serial_number", STATUS_TYPE_LABEL];

pub static ACTIVE_USERS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "active_users",
    "Integer number of active users logged in.",
    LABELS,
);
pub static UPTIME_SECONDS: MetricDescriptor =
    MetricDescriptor::new(SUBSYSTEM, "uptime_seconds", "System uptime in seconds.", LABELS);
pub static STATUS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "status",
    "Status (1 = Normal, 0 = Not Normal).",
    STATUS_LABELS,
);

// "<d> days <h> hours <m> minutes <s> seconds", leading groups optional.
static UPTIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\S+) days? )?(?:(\S+) hours? )?(?:(\S+) minutes? )?(\S+) seconds?$")
        .unwrap_or_else(|e| panic!("invalid uptime pattern: {e}"))
});

/// The `/jaws/monitor/system` object. Unlike every other category this is a
/// single object, not an array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub active_users: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub firmware: String,
    #[serde(deserialize_with = "null_as_default")]
    pub nic_serial_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_branches: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_cords: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_lines: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_ocps: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_outlets: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_phases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_units: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uptime: String,
}

/// Converts the device uptime string into seconds.
///
/// Absent day/hour/minute groups count as zero. A string without the
/// trailing seconds group, or with a component that is not an integer, is
/// rejected.
pub fn parse_uptime(raw: &str) -> CollectorResult<u64> {
    let caps = UPTIME_RE
        .captures(raw.trim())
        .ok_or_else(|| CollectorError::InvalidFormat {
            location: "system uptime".to_string(),
            reason: format!("unrecognised uptime string {raw:?}"),
        })?;

    let component = |idx: usize, unit: &str| -> CollectorResult<u64> {
        match caps.get(idx) {
            None => Ok(0),
            Some(m) => m.as_str().parse::<u64>().map_err(|e| CollectorError::ParseError {
                metric: format!("uptime {unit}"),
                location: "system uptime".to_string(),
                reason: format!("{:?}: {e}", m.as_str()),
            }),
        }
    };

    let days = component(1, "days")?;
    let hours = component(2, "hours")?;
    let minutes = component(3, "minutes")?;
    let seconds = component(4, "seconds")?;

    days.checked_mul(86_400)
        .and_then(|total| hours.checked_mul(3_600).and_then(|h| total.checked_add(h)))
        .and_then(|total| minutes.checked_mul(60).and_then(|m| total.checked_add(m)))
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(|| CollectorError::ParseError {
            metric: "uptime seconds".to_string(),
            location: "system uptime".to_string(),
            reason: format!("{raw:?} overflows a 64-bit second count"),
        })
}

/// Controller-level summary: users, aggregate statuses and uptime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMapper;

impl CategoryMapper for SystemMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let system: SystemInfo = decode_entity(SUBSYSTEM, raw)?;
        // Parse first so a bad uptime leaves the category with no emissions.
        let uptime = parse_uptime(&system.uptime)?;

        let labels = vec![system.firmware.clone(), system.nic_serial_number.clone()];
        let mut out = Vec::with_capacity(9);

        out.push(MetricEmission::gauge(
            &ACTIVE_USERS,
            system.active_users,
            labels.clone(),
        ));

        let statuses = [
            (system.status_branches.as_str(), "branches"),
            (system.status_cords.as_str(), "cords"),
            (system.status_lines.as_str(), "lines"),
            (system.status_ocps.as_str(), "ocps"),
            (system.status_outlets.as_str(), "outlets"),
            (system.status_phases.as_str(), "phases"),
            (system.status_units.as_str(), "units"),
        ];
        for (raw_status, status_type) in statuses {
            out.push(status_emission(&STATUS, raw_status, status_type, &labels));
        }

        out.push(MetricEmission::counter(&UPTIME_SECONDS, uptime as f64, labels));

        Ok(out)
    }
}

register_collector!(SystemMapper, SUBSYSTEM, true);
