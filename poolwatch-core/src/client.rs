//! The telemetry client seam.
//!
//! A client is the component that actually talks to devices. The driver asks
//! it for a device's telemetry on every fetch timer firing and forwards
//! latched failure resets to it; the client answers asynchronously through
//! an [`UpdateSink`].

use std::fmt::Debug;

use poolwatch_types::{InPort, Inbound, Packet};
use tokio::sync::mpsc;

/// Talks to devices on behalf of the pool.
///
/// Every update sent through the sink is applied to the device most recently
/// requested, so a client must finish reporting one device before the next
/// fetch timer firing.
pub trait TelemetryClient: Send + Debug {
    /// Start fetching name, temperature and failure status for a device.
    fn request(&mut self, device_id: &str, sink: &UpdateSink);

    /// Ask a device to clear its failure state.
    fn clear_failure(&mut self, device_id: &str, sink: &UpdateSink);
}

/// Where a client delivers telemetry updates.
///
/// Cloning is cheap; clients that answer from spawned tasks can keep a clone.
#[derive(Debug, Clone)]
pub struct UpdateSink {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl UpdateSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Inbound>) -> Self {
        Self { tx }
    }

    /// Create a detached sink and the receiver it feeds.
    ///
    /// Useful for exercising a client without a driver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn name(&self, name: impl Into<String>) -> bool {
        self.send(InPort::Name, Packet::String(name.into()))
    }

    pub fn temperature(&self, temperature: f64) -> bool {
        self.send(InPort::Temperature, Packet::Float(temperature))
    }

    pub fn failure(&self, failure: bool) -> bool {
        self.send(InPort::Failure, Packet::Bool(failure))
    }

    /// Deliver a raw packet on an update port.
    ///
    /// Returns `false` once the driver has shut down.
    pub fn send(&self, port: InPort, packet: Packet) -> bool {
        debug_assert!(port.is_update(), "{} is not an update port", port);
        self.tx.send(Inbound { port, packet }).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tags_ports() {
        let (sink, mut rx) = UpdateSink::channel();

        assert!(sink.name("kiln"));
        assert!(sink.temperature(900.0));
        assert!(sink.failure(true));

        let ports: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|inbound| inbound.port)
            .collect();
        assert_eq!(ports, [InPort::Name, InPort::Temperature, InPort::Failure]);
    }

    #[test]
    fn send_after_shutdown_reports_false() {
        let (sink, rx) = UpdateSink::channel();
        drop(rx);
        assert!(!sink.failure(false));
    }
}
