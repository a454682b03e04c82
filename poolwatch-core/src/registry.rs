//! Node type registration and pool composition.
//!
//! A monitor pool is the controller wired to a temperature client. The
//! registry knows the built-in node types and the client implementations a
//! process has made available, and composes the two into a driver.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use poolwatch_types::InPort;
use thiserror::Error;
use tracing::debug;

use crate::client::TelemetryClient;
use crate::driver::{PoolDriver, PoolDriverBuilder};

/// The composed pool: controller plus temperature client.
pub const POOL_TYPE: &str = "custom-node/monitor-pool";
/// The bare controller.
pub const CONTROLLER_TYPE: &str = "custom-node/monitor-pool-controller";
/// The client implementation a pool is wired to.
pub const CLIENT_TYPE: &str = "monitor/client-temperature";

/// Static description of a node type's ports.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeType {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InPort],
    pub outputs: &'static [&'static str],
}

impl NodeType {
    pub fn accepts(&self, port: InPort) -> bool {
        self.inputs.contains(&port)
    }
}

/// The composed pool exports only the host-facing ports; updates flow
/// internally between controller and client.
pub static POOL_NODE: NodeType = NodeType {
    name: POOL_TYPE,
    description: "Round-robin monitor pool over discovered temperature devices",
    inputs: &[InPort::SetFailure, InPort::Tick, InPort::AddDeviceId],
    outputs: &["device_id", "temperature", "name", "failure"],
};

pub static CONTROLLER_NODE: NodeType = NodeType {
    name: CONTROLLER_TYPE,
    description: "Polling pool controller",
    inputs: &InPort::ALL,
    outputs: &[
        "set_device_id",
        "set_failure",
        "device_id",
        "name",
        "failure",
        "temperature",
    ],
};

/// Builds a fresh client for each composed pool.
pub type ClientFactory = Arc<dyn Fn() -> Box<dyn TelemetryClient> + Send + Sync>;

/// Errors that can occur when composing a pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Node type {0} is not registered; call NodeTypeRegistry::init first")]
    UnknownType(String),

    #[error("No client type {0} registered")]
    MissingClientType(String),
}

/// Known node types and client implementations.
///
/// Built-in types are registered by [`NodeTypeRegistry::init`], which the
/// process bootstrap calls once; calling it again is a no-op.
///
/// # Example
///
/// ```rust
/// use poolwatch_core::{NodeTypeRegistry, TelemetryClient, UpdateSink, CLIENT_TYPE};
///
/// #[derive(Debug)]
/// struct Quiet;
///
/// impl TelemetryClient for Quiet {
///     fn request(&mut self, _device_id: &str, _sink: &UpdateSink) {}
///     fn clear_failure(&mut self, _device_id: &str, _sink: &UpdateSink) {}
/// }
///
/// let mut registry = NodeTypeRegistry::new();
/// registry.init();
/// registry.register_client(CLIENT_TYPE, || Box::new(Quiet));
///
/// let builder = registry.compose().unwrap().into_driver();
/// ```
#[derive(Default)]
pub struct NodeTypeRegistry {
    types: BTreeMap<&'static str, &'static NodeType>,
    clients: BTreeMap<String, ClientFactory>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in node types.
    ///
    /// Returns `true` the first time, `false` if they were already present.
    pub fn init(&mut self) -> bool {
        if self.is_initialized() {
            return false;
        }
        for node in [&CONTROLLER_NODE, &POOL_NODE] {
            self.types.insert(node.name, node);
        }
        debug!("Registered built-in pool node types");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.types.contains_key(POOL_TYPE)
    }

    /// Make a client implementation available under `name`.
    ///
    /// Returns `true` if an earlier registration was replaced.
    pub fn register_client<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<dyn TelemetryClient> + Send + Sync + 'static,
    {
        self.clients.insert(name.into(), Arc::new(factory)).is_some()
    }

    pub fn node_type(&self, name: &str) -> Option<&'static NodeType> {
        self.types.get(name).copied()
    }

    /// Wire a new controller to a fresh [`CLIENT_TYPE`] client.
    pub fn compose(&self) -> Result<PoolComposition, CompositionError> {
        let node = self
            .node_type(POOL_TYPE)
            .ok_or_else(|| CompositionError::UnknownType(POOL_TYPE.to_string()))?;
        let factory = self
            .clients
            .get(CLIENT_TYPE)
            .ok_or_else(|| CompositionError::MissingClientType(CLIENT_TYPE.to_string()))?;

        Ok(PoolComposition {
            node,
            client: factory(),
        })
    }
}

impl fmt::Debug for NodeTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A controller/client pair ready to be driven.
#[derive(Debug)]
pub struct PoolComposition {
    node: &'static NodeType,
    client: Box<dyn TelemetryClient>,
}

impl PoolComposition {
    /// Ports the composed pool exposes to its host.
    pub fn node(&self) -> &'static NodeType {
        self.node
    }

    pub fn into_driver(self) -> PoolDriverBuilder {
        PoolDriver::builder(self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UpdateSink;

    #[derive(Debug)]
    struct Silent;

    impl TelemetryClient for Silent {
        fn request(&mut self, _device_id: &str, _sink: &UpdateSink) {}
        fn clear_failure(&mut self, _device_id: &str, _sink: &UpdateSink) {}
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut registry = NodeTypeRegistry::new();

        assert!(registry.init());
        assert!(!registry.init());
        assert_eq!(registry.node_type(POOL_TYPE), Some(&POOL_NODE));
        assert_eq!(registry.node_type(CONTROLLER_TYPE), Some(&CONTROLLER_NODE));
    }

    #[test]
    fn compose_requires_init() {
        let mut registry = NodeTypeRegistry::new();
        registry.register_client(CLIENT_TYPE, || Box::new(Silent));

        assert_eq!(
            registry.compose().unwrap_err(),
            CompositionError::UnknownType(POOL_TYPE.to_string())
        );
    }

    #[test]
    fn compose_requires_client_type() {
        let mut registry = NodeTypeRegistry::new();
        registry.init();
        registry.register_client("monitor/client-humidity", || Box::new(Silent));

        assert_eq!(
            registry.compose().unwrap_err(),
            CompositionError::MissingClientType(CLIENT_TYPE.to_string())
        );
    }

    #[test]
    fn test_compose_exports_host_ports() {
        let mut registry = NodeTypeRegistry::new();
        registry.init();
        assert!(!registry.register_client(CLIENT_TYPE, || Box::new(Silent)));
        assert!(registry.register_client(CLIENT_TYPE, || Box::new(Silent)));

        let composition = registry.compose().unwrap();
        let node = composition.node();
        assert!(node.accepts(InPort::Tick));
        assert!(node.accepts(InPort::AddDeviceId));
        assert!(node.accepts(InPort::SetFailure));
        assert!(!node.accepts(InPort::Temperature));
    }

    #[test]
    fn controller_accepts_every_port() {
        assert!(InPort::ALL.iter().all(|port| CONTROLLER_NODE.accepts(*port)));
    }
}
