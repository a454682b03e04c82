//! # poolwatch-core
//!
//! A round-robin polling controller for a dynamically discovered pool of
//! devices.
//!
//! Devices are added as they are discovered. A fetch timer walks the pool
//! asking a telemetry client for each device's name, temperature and
//! failure status; the client's answers are cached per device. Every tick
//! publishes a snapshot of the next device whose telemetry is complete, and a
//! device leaving failure state is reported immediately.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use poolwatch_core::{NodeTypeRegistry, Output, TelemetryClient, UpdateSink, CLIENT_TYPE};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Thermometer;
//!
//! impl TelemetryClient for Thermometer {
//!     fn request(&mut self, device_id: &str, sink: &UpdateSink) {
//!         sink.name(device_id);
//!         sink.temperature(21.5);
//!         sink.failure(false);
//!     }
//!
//!     fn clear_failure(&mut self, _device_id: &str, sink: &UpdateSink) {
//!         sink.failure(false);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Register built-in node types once at startup
//!     let mut registry = NodeTypeRegistry::new();
//!     registry.init();
//!     registry.register_client(CLIENT_TYPE, || Box::new(Thermometer));
//!
//!     let handle = registry
//!         .compose()
//!         .unwrap()
//!         .into_driver()
//!         .output(Output::file("latest.json"))
//!         .build()
//!         .start();
//!
//!     handle.add_device("oic/dev-1").unwrap();
//!
//!     // Publish one device per second
//!     let mut ticker = tokio::time::interval(Duration::from_secs(1));
//!     loop {
//!         ticker.tick().await;
//!         handle.tick().unwrap();
//!     }
//! }
//! ```
//!
//! ## Without tokio
//!
//! [`PoolController`] is a plain state machine and can be embedded in any
//! event loop; the `tokio` feature (on by default) only adds the driver.

mod controller;
mod error;
mod output;
mod store;

#[cfg(feature = "tokio")]
mod client;
#[cfg(feature = "tokio")]
mod driver;
#[cfg(feature = "tokio")]
mod registry;

pub use controller::{PoolController, DEFAULT_FETCH_INTERVAL};
pub use error::ControllerError;
pub use output::{Output, Recorder};
pub use store::{AddOutcome, Readiness, Resource, ResourceStore};

#[cfg(feature = "tokio")]
pub use client::{TelemetryClient, UpdateSink};
#[cfg(feature = "tokio")]
pub use driver::{DriverError, DriverHandle, PoolDriver, PoolDriverBuilder};
#[cfg(feature = "tokio")]
pub use registry::{
    ClientFactory, CompositionError, NodeType, NodeTypeRegistry, PoolComposition, CLIENT_TYPE,
    CONTROLLER_NODE, CONTROLLER_TYPE, POOL_NODE, POOL_TYPE,
};

// Re-export types for convenience
pub use poolwatch_types::{
    InPort, Inbound, Outbound, Packet, PacketError, PacketKind, SchemaVersion, Snapshot,
};
