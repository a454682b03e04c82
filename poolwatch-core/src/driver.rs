//! Timer and event driven execution of a pool controller.

use std::time::Duration;

use poolwatch_types::{InPort, Inbound, Outbound};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::client::{TelemetryClient, UpdateSink};
use crate::controller::{PoolController, DEFAULT_FETCH_INTERVAL};
use crate::output::Output;
use crate::registry::POOL_NODE;

/// Owns a [`PoolController`] and feeds it from the fetch timer, the host and
/// the telemetry client.
///
/// All three sources are serialized onto a single task, so the controller
/// sees one event at a time.
///
/// # Example
///
/// ```rust,no_run
/// use poolwatch_core::{NodeTypeRegistry, Output, CLIENT_TYPE};
/// # use poolwatch_core::{TelemetryClient, UpdateSink};
/// # #[derive(Debug)]
/// # struct Thermo;
/// # impl TelemetryClient for Thermo {
/// #     fn request(&mut self, _: &str, _: &UpdateSink) {}
/// #     fn clear_failure(&mut self, _: &str, _: &UpdateSink) {}
/// # }
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let mut registry = NodeTypeRegistry::new();
///     registry.init();
///     registry.register_client(CLIENT_TYPE, || Box::new(Thermo));
///
///     let (output, mut events) = Output::channel(16);
///     let handle = registry
///         .compose()
///         .unwrap()
///         .into_driver()
///         .output(output)
///         .fetch_interval(Duration::from_millis(900))
///         .build()
///         .start();
///
///     handle.add_device("oic/dev-1").unwrap();
///     handle.tick().unwrap();
///
///     while let Some(event) = events.recv().await {
///         println!("{:?}", event);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct PoolDriver {
    controller: PoolController,
    client: Box<dyn TelemetryClient>,
    outputs: Vec<Output>,
    fetch_interval: Duration,
}

impl PoolDriver {
    /// Create a builder for a driver serving this client.
    pub fn builder(client: Box<dyn TelemetryClient>) -> PoolDriverBuilder {
        PoolDriverBuilder::new(client)
    }

    pub fn fetch_interval(&self) -> Duration {
        self.fetch_interval
    }

    /// Start driving the controller on a background task.
    ///
    /// The first fetch fires one interval after the task starts.
    pub fn start(self) -> DriverHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let sink = UpdateSink::new(tx.clone());

        let task = tokio::spawn(self.run(rx, stop_rx, sink));

        DriverHandle { tx, stop_tx, task }
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Inbound>,
        mut stop_rx: watch::Receiver<bool>,
        sink: UpdateSink,
    ) {
        let interval = self.fetch_interval;
        let mut fetch_timer = tokio::time::interval_at(Instant::now() + interval, interval);
        fetch_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(?interval, "Pool driver started");

        loop {
            // Inbound events queued before a stop request are still applied
            tokio::select! {
                biased;

                Some(inbound) = rx.recv() => {
                    let mut events = Vec::new();
                    if let Err(e) = self.controller.process(&inbound, &mut events) {
                        warn!(port = %inbound.port, "Inbound event failed: {}", e);
                    }
                    for event in events {
                        self.dispatch(event, &sink).await;
                    }
                }
                _ = fetch_timer.tick() => {
                    if let Some(request) = self.controller.fetch_next() {
                        self.dispatch(request, &sink).await;
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.controller.teardown();
        info!("Pool driver stopped");
    }

    async fn dispatch(&mut self, event: Outbound, sink: &UpdateSink) {
        match &event {
            Outbound::FetchRequest { device_id } => self.client.request(device_id, sink),
            Outbound::ClearFailureRequest { device_id } => {
                self.client.clear_failure(device_id, sink)
            }
            Outbound::FailureCleared | Outbound::Snapshot(_) => {
                for output in &self.outputs {
                    if let Err(e) = output.emit(&event).await {
                        warn!("Failed to emit event: {}", e);
                    }
                }
            }
        }
    }
}

/// Builder for configuring a PoolDriver.
#[derive(Debug)]
pub struct PoolDriverBuilder {
    client: Box<dyn TelemetryClient>,
    outputs: Vec<Output>,
    fetch_interval: Option<Duration>,
}

impl PoolDriverBuilder {
    pub fn new(client: Box<dyn TelemetryClient>) -> Self {
        Self {
            client,
            outputs: Vec::new(),
            fetch_interval: None,
        }
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; events will be emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the fetch timer interval.
    ///
    /// Defaults to [`DEFAULT_FETCH_INTERVAL`] if not specified.
    pub fn fetch_interval(mut self, interval: Duration) -> Self {
        self.fetch_interval = Some(interval);
        self
    }

    pub fn build(self) -> PoolDriver {
        PoolDriver {
            controller: PoolController::new(),
            client: self.client,
            outputs: self.outputs,
            fetch_interval: self.fetch_interval.unwrap_or(DEFAULT_FETCH_INTERVAL),
        }
    }
}

/// Errors returned when feeding a running driver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    /// The port is internal to the pool and only the client may drive it.
    #[error("Port {0} is not exported by the pool")]
    NotExported(InPort),

    #[error("Pool driver has shut down")]
    Closed,
}

/// Handle for feeding and stopping a running driver.
///
/// Drop this handle to stop the driver, or call `stop()` explicitly.
#[derive(Debug)]
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<Inbound>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Deliver an event on one of the pool's exported ports.
    pub fn send(&self, inbound: Inbound) -> Result<(), DriverError> {
        if !POOL_NODE.accepts(inbound.port) {
            return Err(DriverError::NotExported(inbound.port));
        }
        self.tx.send(inbound).map_err(|_| DriverError::Closed)
    }

    pub fn add_device(&self, device_id: impl Into<String>) -> Result<(), DriverError> {
        self.send(Inbound::add_device(device_id))
    }

    pub fn tick(&self) -> Result<(), DriverError> {
        self.send(Inbound::tick())
    }

    pub fn request_failure_reset(&self) -> Result<(), DriverError> {
        self.send(Inbound::request_failure_reset())
    }

    /// Stop the driver.
    ///
    /// The fetch timer is cancelled and the pool released once the task
    /// observes the request.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the driver and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Pool driver task failed: {}", e);
        }
    }
}
