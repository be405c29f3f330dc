// Entity and device domain models
use super::ids::{DeviceId, EntityId};

/// A monitored data point (sensor reading or property) of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub key: String,
    pub name: String,
    pub device_id: Option<DeviceId>,
    pub unit: Option<String>,
}

impl Entity {
    pub fn new(id: EntityId, key: String, name: String) -> Self {
        Self {
            id,
            key,
            name,
            device_id: None,
            unit: None,
        }
    }

    pub fn with_device(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
}

impl Device {
    pub fn new(id: DeviceId, name: String) -> Self {
        Self { id, name }
    }

    /// Name used when the backend did not return the device.
    pub fn placeholder_name(id: &DeviceId) -> String {
        format!("Device {}", id)
    }
}
