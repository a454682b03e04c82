//! Inbound and outbound event vocabulary of the pool controller.

use alloc::string::String;
use core::fmt;

use crate::{Packet, Snapshot};

/// Input ports of the pool controller.
///
/// `AddDeviceId`, `Tick` and `SetFailure` are driven by the host;
/// `Name`, `Temperature` and `Failure` are driven by the telemetry client
/// and always address the device most recently asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InPort {
    /// A device was discovered (string).
    AddDeviceId,
    /// Publish the next ready device (any payload).
    Tick,
    /// Request a failure reset for the device last published (trigger or bool).
    SetFailure,
    Name,
    Temperature,
    Failure,
}

impl InPort {
    pub const ALL: [InPort; 6] = [
        InPort::AddDeviceId,
        InPort::Tick,
        InPort::SetFailure,
        InPort::Name,
        InPort::Temperature,
        InPort::Failure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InPort::AddDeviceId => "add_device_id",
            InPort::Tick => "tick",
            InPort::SetFailure => "set_failure",
            InPort::Name => "name",
            InPort::Temperature => "temperature",
            InPort::Failure => "failure",
        }
    }

    /// Whether the port carries telemetry reported by the client.
    pub fn is_update(&self) -> bool {
        matches!(self, InPort::Name | InPort::Temperature | InPort::Failure)
    }
}

impl fmt::Display for InPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A packet arriving on one of the controller's input ports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inbound {
    pub port: InPort,
    #[cfg_attr(feature = "serde", serde(default))]
    pub packet: Packet,
}

impl Inbound {
    pub fn new(port: InPort, packet: impl Into<Packet>) -> Self {
        Self {
            port,
            packet: packet.into(),
        }
    }

    pub fn add_device(device_id: impl Into<String>) -> Self {
        Self::new(InPort::AddDeviceId, Packet::String(device_id.into()))
    }

    pub fn tick() -> Self {
        Self::new(InPort::Tick, Packet::Empty)
    }

    pub fn request_failure_reset() -> Self {
        Self::new(InPort::SetFailure, Packet::Empty)
    }
}

/// An event produced by the pool controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum Outbound {
    /// Ask the client for fresh telemetry from this device.
    FetchRequest { device_id: String },
    /// Ask the client to clear this device's failure state.
    ClearFailureRequest { device_id: String },
    /// The device being fetched left failure state; sent outside the tick schedule.
    FailureCleared,
    Snapshot(Snapshot),
}

impl Outbound {
    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Outbound::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_ports() {
        let updates: alloc::vec::Vec<_> = InPort::ALL.iter().filter(|p| p.is_update()).collect();
        assert_eq!(updates, [&InPort::Name, &InPort::Temperature, &InPort::Failure]);
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(Inbound::tick().packet, Packet::Empty);
        assert_eq!(Inbound::add_device("a").packet.as_str(), Ok("a"));
        assert_eq!(Inbound::request_failure_reset().port, InPort::SetFailure);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_outbound_json_layout() {
        let event = Outbound::ClearFailureRequest {
            device_id: "dev-2".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"clear_failure_request","device_id":"dev-2"}"#);

        let cleared: Outbound = serde_json::from_str(r#"{"event":"failure_cleared"}"#).unwrap();
        assert_eq!(cleared, Outbound::FailureCleared);
    }
}
