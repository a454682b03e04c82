//! # poolwatch
//!
//! Runs a monitor pool against a simulated set of temperature devices and
//! prints what the pool publishes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           poolwatch                          │
//! │  ┌──────────┐    ┌─────────────────────┐    ┌─────────────┐  │
//! │  │ settings │───▶│     PoolDriver      │───▶│   Output    │  │
//! │  │ (config) │    │ (poolwatch-core)    │    │ stdout/file │  │
//! │  └──────────┘    └──────────┬──────────┘    └─────────────┘  │
//! │                             │ fetch / clear failure          │
//! │                             ▼                                │
//! │                      ┌─────────────┐                         │
//! │                      │  simulator  │                         │
//! │                      └─────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, TOML file, environment)
//! - **[`simulator`]**: a deterministic [`TelemetryClient`](poolwatch_core::TelemetryClient)
//! - **[`duration`]**: parsing of interval strings such as `"900ms"`

pub mod duration;
pub mod settings;
pub mod simulator;

pub use settings::{DeviceSettings, Settings};
pub use simulator::SimulatedClient;
