//! # poolwatch-types
//!
//! Wire types shared by the poolwatch pool controller and whatever hosts it.
//! This crate defines the packets carried on the controller's ports, the
//! inbound and outbound event vocabulary, and the per-device snapshot the
//! controller publishes on every productive tick.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Versioned schema**: Snapshots include version info for forward compatibility
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use poolwatch_types::{InPort, Inbound, Packet, Snapshot};
//!
//! // A telemetry client reporting a temperature reading
//! let update = Inbound::new(InPort::Temperature, Packet::Float(21.5));
//! assert_eq!(update.packet.as_float(), Ok(21.5));
//!
//! // What the controller publishes on a tick
//! let snapshot = Snapshot::builder("oic/dev-1")
//!     .name("boiler room")
//!     .temperature(21.5)
//!     .build();
//! assert!(!snapshot.failure);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in serialized
//! snapshots to allow consumers to handle format evolution gracefully.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod packet;
mod snapshot;
mod version;

pub use event::*;
pub use packet::*;
pub use snapshot::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
/// Consumers should check this version and handle older formats appropriately.
pub const SCHEMA_VERSION: u32 = 1;
