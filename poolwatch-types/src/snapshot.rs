//! Snapshot - the published state of one device at tick time.

use alloc::string::String;

use crate::SchemaVersion;

/// A point-in-time view of a single device in the pool.
///
/// The controller emits one of these for the next ready device each time it
/// is ticked. All four telemetry fields are guaranteed to have been observed
/// at least once before a snapshot is produced.
///
/// # Example
///
/// ```rust
/// use poolwatch_types::Snapshot;
///
/// let snapshot = Snapshot::builder("oic/dev-7")
///     .name("cold store")
///     .temperature(-18.0)
///     .failure(true)
///     .timestamp_ms(1703160000000)
///     .build();
///
/// assert_eq!(snapshot.device_id, "oic/dev-7");
/// // Serialize with serde (requires "serde" feature)
/// // let json = serde_json::to_string(&snapshot)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    pub device_id: String,

    /// Last known display name reported by the device.
    pub name: String,

    pub failure: bool,

    /// Last known temperature reading.
    pub temperature: f64,
}

impl Snapshot {
    /// Create a builder for the given device.
    pub fn builder(device_id: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::new(device_id)
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    device_id: String,
    name: String,
    failure: bool,
    temperature: f64,
}

impl SnapshotBuilder {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            timestamp_ms: None,
            device_id: device_id.into(),
            name: String::new(),
            failure: false,
            temperature: 0.0,
        }
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn failure(mut self, failure: bool) -> Self {
        self.failure = failure;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the snapshot.
    #[cfg(feature = "std")]
    pub fn build(self) -> Snapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(current_timestamp_ms);
        self.finish(timestamp_ms)
    }

    /// Build the snapshot with a specific timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> Snapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or(0);
        self.finish(timestamp_ms)
    }

    fn finish(self, timestamp_ms: u64) -> Snapshot {
        Snapshot {
            version: SchemaVersion::CURRENT,
            timestamp_ms,
            device_id: self.device_id,
            name: self.name,
            failure: self.failure,
            temperature: self.temperature,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot::builder("oic/dev-1")
            .timestamp_ms(1703160000000)
            .name("boiler")
            .temperature(71.5)
            .failure(true)
            .build()
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = sample();

        assert_eq!(snapshot.device_id, "oic/dev-1");
        assert_eq!(snapshot.name, "boiler");
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert!(snapshot.failure);
        assert!(snapshot.version.is_compatible());
    }

    #[test]
    fn build_stamps_current_time_when_unset() {
        let snapshot = Snapshot::builder("dev").build();
        assert!(snapshot.timestamp_ms > 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = sample();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
    }
}
