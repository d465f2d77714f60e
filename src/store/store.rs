//! In-memory entity store implementation.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use super::models::*;

/// Store error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
}

fn validation(msg: &str) -> StoreError {
    StoreError::Validation(msg.to_string())
}

/// Thread-safe in-memory entity store.
///
/// Each collection sits behind its own lock so unrelated entity types never
/// contend. Guards are held only for short critical sections and never
/// across suspension points; all validation runs before any mutation, so a
/// rejected request leaves the store unchanged.
#[derive(Default)]
pub struct Store {
    devices: RwLock<HashMap<Uuid, Device>>,
    layouts: RwLock<HashMap<Uuid, Layout>>,
    links: RwLock<HashMap<Uuid, Link>>,
    checks: RwLock<HashMap<Uuid, Check>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Devices ---

    pub fn create_device(&self, payload: DeviceCreate) -> Device {
        let device = Device {
            id: Uuid::new_v4(),
            name: payload.name,
            ip_address: payload.ip_address,
            device_type: payload.device_type,
            snmp_profile: payload.snmp_profile,
        };
        self.devices.write().insert(device.id, device.clone());
        device
    }

    pub fn list_devices(&self) -> Vec<Device> {
        self.devices.read().values().cloned().collect()
    }

    pub fn get_device(&self, id: Uuid) -> Result<Device, StoreError> {
        self.devices
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("device"))
    }

    pub fn update_device(&self, id: Uuid, patch: DeviceUpdate) -> Result<Device, StoreError> {
        let mut devices = self.devices.write();
        let device = devices.get_mut(&id).ok_or(StoreError::NotFound("device"))?;
        device.apply(patch);
        Ok(device.clone())
    }

    /// Deleting an absent id is a no-op.
    pub fn delete_device(&self, id: Uuid) {
        self.devices.write().remove(&id);
    }

    /// Cheap device count for the heartbeat stream.
    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }

    // --- Layouts ---

    pub fn create_layout(&self, payload: LayoutCreate) -> Result<Layout, StoreError> {
        validate_placements(&payload.devices)?;
        let layout = Layout {
            id: Uuid::new_v4(),
            name: payload.name,
            background: payload.background,
            devices: payload.devices,
        };
        self.layouts.write().insert(layout.id, layout.clone());
        Ok(layout)
    }

    pub fn list_layouts(&self) -> Vec<Layout> {
        self.layouts.read().values().cloned().collect()
    }

    pub fn get_layout(&self, id: Uuid) -> Result<Layout, StoreError> {
        self.layouts
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("layout"))
    }

    pub fn update_layout(&self, id: Uuid, patch: LayoutUpdate) -> Result<Layout, StoreError> {
        if let Some(devices) = &patch.devices {
            validate_placements(devices)?;
        }
        let mut layouts = self.layouts.write();
        let layout = layouts.get_mut(&id).ok_or(StoreError::NotFound("layout"))?;
        layout.apply(patch);
        Ok(layout.clone())
    }

    pub fn delete_layout(&self, id: Uuid) {
        self.layouts.write().remove(&id);
    }

    // --- Links ---

    /// Create a link between two distinct, existing devices.
    ///
    /// Endpoint validity is checked at creation time only; deleting a device
    /// later leaves dangling references in place.
    pub fn create_link(&self, payload: LinkCreate) -> Result<Link, StoreError> {
        if payload.source_device_id == payload.target_device_id {
            return Err(validation("link endpoints must be different devices"));
        }
        {
            let devices = self.devices.read();
            if !devices.contains_key(&payload.source_device_id)
                || !devices.contains_key(&payload.target_device_id)
            {
                return Err(validation("link endpoints must reference existing devices"));
            }
        }

        let link = Link {
            id: Uuid::new_v4(),
            source_device_id: payload.source_device_id,
            target_device_id: payload.target_device_id,
            source_ifindex: payload.source_ifindex,
            target_ifindex: payload.target_ifindex,
            label: payload.label,
        };
        self.links.write().insert(link.id, link.clone());
        Ok(link)
    }

    pub fn list_links(&self) -> Vec<Link> {
        self.links.read().values().cloned().collect()
    }

    pub fn get_link(&self, id: Uuid) -> Result<Link, StoreError> {
        self.links
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("link"))
    }

    pub fn update_link(&self, id: Uuid, patch: LinkUpdate) -> Result<Link, StoreError> {
        let mut links = self.links.write();
        let link = links.get_mut(&id).ok_or(StoreError::NotFound("link"))?;
        link.apply(patch);
        Ok(link.clone())
    }

    pub fn delete_link(&self, id: Uuid) {
        self.links.write().remove(&id);
    }

    // --- Checks ---

    pub fn create_check(&self, payload: CheckCreate) -> Result<Check, StoreError> {
        validate_check_ranges(payload.interval_s, payload.timeout_ms)?;
        if !self.devices.read().contains_key(&payload.device_id) {
            return Err(validation("device_id must reference an existing device"));
        }

        let check = Check {
            id: Uuid::new_v4(),
            device_id: payload.device_id,
            target: payload.target,
            check_type: payload.check_type,
            interval_s: payload.interval_s,
            timeout_ms: payload.timeout_ms,
            params: payload.params,
            last_result: None,
        };
        self.checks.write().insert(check.id, check.clone());
        Ok(check)
    }

    pub fn list_checks(&self) -> Vec<Check> {
        self.checks.read().values().cloned().collect()
    }

    pub fn get_check(&self, id: Uuid) -> Result<Check, StoreError> {
        self.checks
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("check"))
    }

    pub fn update_check(&self, id: Uuid, patch: CheckUpdate) -> Result<Check, StoreError> {
        let mut checks = self.checks.write();
        let check = checks.get_mut(&id).ok_or(StoreError::NotFound("check"))?;

        let interval_s = patch.interval_s.unwrap_or(check.interval_s);
        let timeout_ms = patch.timeout_ms.unwrap_or(check.timeout_ms);
        validate_check_ranges(interval_s, timeout_ms)?;

        check.apply(patch);
        Ok(check.clone())
    }

    pub fn delete_check(&self, id: Uuid) {
        self.checks.write().remove(&id);
    }

    /// Overwrite a check's `last_result` wholesale.
    ///
    /// The swap happens under the checks write lock, so concurrent readers
    /// never observe a partially written result; the last writer wins.
    pub fn record_result(&self, check_id: Uuid, result: CheckResult) -> Result<Check, StoreError> {
        let mut checks = self.checks.write();
        let check = checks
            .get_mut(&check_id)
            .ok_or(StoreError::NotFound("check"))?;
        check.last_result = Some(result);
        Ok(check.clone())
    }
}

fn validate_placements(devices: &[LayoutDevice]) -> Result<(), StoreError> {
    for placement in devices {
        if !(0.0..=1.0).contains(&placement.x) || !(0.0..=1.0).contains(&placement.y) {
            return Err(validation("layout coordinates must be within [0, 1]"));
        }
    }
    Ok(())
}

fn validate_check_ranges(interval_s: u32, timeout_ms: u32) -> Result<(), StoreError> {
    if interval_s < 1 {
        return Err(validation("interval_s must be at least 1"));
    }
    if !(100..=10000).contains(&timeout_ms) {
        return Err(validation("timeout_ms must be between 100 and 10000"));
    }
    Ok(())
}
