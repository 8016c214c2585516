//! Process-wide device table.
//!
//! Device handles are singletons per identifier and live for the process
//! lifetime; there is no release operation. Teardown of transient state
//! goes through [`Device::disconnected`], not destruction.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::device::Device;
use crate::error::{CoreError, Result};

static DEVICES: Lazy<DashMap<String, Arc<Device>>> = Lazy::new(DashMap::new);

/// Returns the handle for `device_id`, creating it on first use.
pub fn obtain(device_id: &str) -> Arc<Device> {
    DEVICES
        .entry(device_id.to_owned())
        .or_insert_with(|| Arc::new(Device::new(device_id.to_owned())))
        .value()
        .clone()
}

/// Non-creating lookup; `InvalidDevice` when the identifier was never
/// obtained.
pub fn get(device_id: &str) -> Result<Arc<Device>> {
    DEVICES
        .get(device_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| CoreError::InvalidDevice(device_id.to_owned()))
}
