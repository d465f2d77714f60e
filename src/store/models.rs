//! Entity model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::IpAddr;
use uuid::Uuid;

/// A tracked network device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub ip_address: IpAddr,
    #[serde(rename = "type")]
    pub device_type: String,
    pub snmp_profile: Option<Map<String, Value>>,
}

/// Payload for creating a device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCreate {
    pub name: String,
    pub ip_address: IpAddr,
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,
    #[serde(default)]
    pub snmp_profile: Option<Map<String, Value>>,
}

/// Partial update for a device. Absent fields leave existing values alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub ip_address: Option<IpAddr>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub snmp_profile: Option<Map<String, Value>>,
}

impl Device {
    pub(crate) fn apply(&mut self, patch: DeviceUpdate) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(ip_address) = patch.ip_address {
            self.ip_address = ip_address;
        }
        if let Some(device_type) = patch.device_type {
            self.device_type = device_type;
        }
        if let Some(snmp_profile) = patch.snmp_profile {
            self.snmp_profile = Some(snmp_profile);
        }
    }
}

fn default_device_type() -> String {
    "unknown".to_string()
}

/// A device placement on a layout, with normalized coordinates in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDevice {
    pub device_id: Uuid,
    pub x: f64,
    pub y: f64,
}

/// A spatial arrangement of devices over a background.
///
/// The background is either an uploaded image path or the sentinel "osm"
/// meaning default map tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub id: Uuid,
    pub name: String,
    pub background: String,
    pub devices: Vec<LayoutDevice>,
}

/// Payload for creating a layout.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutCreate {
    pub name: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub devices: Vec<LayoutDevice>,
}

/// Partial update for a layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutUpdate {
    pub name: Option<String>,
    pub background: Option<String>,
    pub devices: Option<Vec<LayoutDevice>>,
}

impl Layout {
    pub(crate) fn apply(&mut self, patch: LayoutUpdate) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(background) = patch.background {
            self.background = background;
        }
        if let Some(devices) = patch.devices {
            self.devices = devices;
        }
    }
}

fn default_background() -> String {
    "osm".to_string()
}

/// A link between two distinct devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub source_device_id: Uuid,
    pub target_device_id: Uuid,
    pub source_ifindex: Option<u32>,
    pub target_ifindex: Option<u32>,
    pub label: Option<String>,
}

/// Payload for creating a link.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkCreate {
    pub source_device_id: Uuid,
    pub target_device_id: Uuid,
    #[serde(default)]
    pub source_ifindex: Option<u32>,
    #[serde(default)]
    pub target_ifindex: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Partial update for a link. Endpoints are immutable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkUpdate {
    pub source_ifindex: Option<u32>,
    pub target_ifindex: Option<u32>,
    pub label: Option<String>,
}

impl Link {
    pub(crate) fn apply(&mut self, patch: LinkUpdate) {
        if let Some(source_ifindex) = patch.source_ifindex {
            self.source_ifindex = Some(source_ifindex);
        }
        if let Some(target_ifindex) = patch.target_ifindex {
            self.target_ifindex = Some(target_ifindex);
        }
        if let Some(label) = patch.label {
            self.label = Some(label);
        }
    }
}

/// Classification of a probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
    Unknown,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Up => "up",
            CheckStatus::Down => "down",
            CheckStatus::Unknown => "unknown",
        }
    }
}

/// The recorded outcome of a single check execution.
///
/// Immutable once constructed; each execution replaces the previous result
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub latency_ms: Option<f64>,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// A reachability check against a target host.
///
/// `last_result` is written only by result recording; every other field is
/// mutated only through explicit updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: Uuid,
    pub device_id: Uuid,
    pub target: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub interval_s: u32,
    pub timeout_ms: u32,
    pub params: Option<Map<String, Value>>,
    pub last_result: Option<CheckResult>,
}

/// Payload for creating a check.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckCreate {
    pub device_id: Uuid,
    pub target: String,
    #[serde(rename = "type", default = "default_check_type")]
    pub check_type: String,
    #[serde(default = "default_interval_s")]
    pub interval_s: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// Partial update for a check. The owning device is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckUpdate {
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub check_type: Option<String>,
    pub interval_s: Option<u32>,
    pub timeout_ms: Option<u32>,
    pub params: Option<Map<String, Value>>,
}

impl Check {
    pub(crate) fn apply(&mut self, patch: CheckUpdate) {
        if let Some(target) = patch.target {
            self.target = target;
        }
        if let Some(check_type) = patch.check_type {
            self.check_type = check_type;
        }
        if let Some(interval_s) = patch.interval_s {
            self.interval_s = interval_s;
        }
        if let Some(timeout_ms) = patch.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(params) = patch.params {
            self.params = Some(params);
        }
    }
}

fn default_check_type() -> String {
    "icmp".to_string()
}

fn default_interval_s() -> u32 {
    60
}

fn default_timeout_ms() -> u32 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_defaults() {
        let device: DeviceCreate =
            serde_json::from_str(r#"{"name":"r1","ip_address":"192.0.2.1"}"#).unwrap();
        assert_eq!(device.device_type, "unknown");
        assert!(device.snmp_profile.is_none());

        let check: CheckCreate = serde_json::from_str(&format!(
            r#"{{"device_id":"{}","target":"192.0.2.1"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(check.check_type, "icmp");
        assert_eq!(check.interval_s, 60);
        assert_eq!(check.timeout_ms, 1000);
    }

    #[test]
    fn test_check_status_wire_format() {
        assert_eq!(serde_json::to_string(&CheckStatus::Up).unwrap(), r#""up""#);
        assert_eq!(
            serde_json::to_string(&CheckStatus::Down).unwrap(),
            r#""down""#
        );
        assert_eq!(
            serde_json::to_string(&CheckStatus::Unknown).unwrap(),
            r#""unknown""#
        );
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let mut check = Check {
            id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            target: "192.0.2.1".to_string(),
            check_type: "icmp".to_string(),
            interval_s: 60,
            timeout_ms: 1000,
            params: None,
            last_result: None,
        };

        check.apply(CheckUpdate {
            timeout_ms: Some(2500),
            ..Default::default()
        });

        assert_eq!(check.timeout_ms, 2500);
        assert_eq!(check.target, "192.0.2.1");
        assert_eq!(check.interval_s, 60);
    }
}
