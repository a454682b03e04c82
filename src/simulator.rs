//! A simulated temperature client.
//!
//! Readings drift around each device's base temperature in a fixed pattern,
//! so runs are reproducible. Devices configured as failing keep reporting a
//! failure until the pool asks them to clear it.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use poolwatch_core::{TelemetryClient, UpdateSink};
use tracing::{debug, info};

use crate::settings::DeviceSettings;

/// Offsets applied to the base temperature, one per fetch.
const DRIFT: &[f64] = &[0.0, 0.25, 0.5, 0.25, 0.0, -0.25, -0.5, -0.25];

#[derive(Debug, Clone, PartialEq)]
struct SimulatedDevice {
    name: String,
    temperature: f64,
    failing: bool,
    fetches: usize,
}

impl SimulatedDevice {
    fn next_reading(&mut self) -> f64 {
        let offset = DRIFT[self.fetches % DRIFT.len()];
        self.fetches += 1;
        self.temperature + offset
    }
}

/// Clones share the same devices, so a factory can hand out clones while the
/// caller keeps one for inspection.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClient {
    devices: Arc<Mutex<BTreeMap<String, SimulatedDevice>>>,
}

impl SimulatedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(devices: &[DeviceSettings]) -> Self {
        let client = Self::new();
        for device in devices {
            client.insert(device);
        }
        client
    }

    /// Add or replace a device.
    pub fn insert(&self, device: &DeviceSettings) {
        let simulated = SimulatedDevice {
            name: device.name.clone().unwrap_or_else(|| device.id.clone()),
            temperature: device.temperature,
            failing: device.failing,
            fetches: 0,
        };
        self.devices.lock().insert(device.id.clone(), simulated);
    }

    /// Ids of every simulated device, in sorted order.
    pub fn device_ids(&self) -> Vec<String> {
        self.devices.lock().keys().cloned().collect()
    }

    pub fn is_failing(&self, device_id: &str) -> Option<bool> {
        self.devices.lock().get(device_id).map(|d| d.failing)
    }
}

impl TelemetryClient for SimulatedClient {
    fn request(&mut self, device_id: &str, sink: &UpdateSink) {
        let mut devices = self.devices.lock();
        let Some(device) = devices.get_mut(device_id) else {
            debug!(device_id, "Fetch for unknown device ignored");
            return;
        };

        let temperature = device.next_reading();
        sink.name(device.name.as_str());
        sink.temperature(temperature);
        sink.failure(device.failing);
    }

    fn clear_failure(&mut self, device_id: &str, sink: &UpdateSink) {
        let mut devices = self.devices.lock();
        let Some(device) = devices.get_mut(device_id) else {
            debug!(device_id, "Failure reset for unknown device ignored");
            return;
        };

        if device.failing {
            info!(device_id, "Clearing device failure");
            device.failing = false;
        }
        sink.failure(false);
    }
}
