//! The pool controller state machine.
//!
//! Two cursors walk the same pool independently. The fetch cursor is moved by
//! the fetch timer and addresses every telemetry update; the output cursor is
//! moved by ticks and addresses published snapshots and failure reset
//! requests. Both advance round-robin in discovery order.

use std::time::Duration;

use poolwatch_types::{InPort, Inbound, Outbound, Packet, PacketError, PacketKind, Snapshot};
use tracing::{debug, info, warn};

use crate::error::ControllerError;
use crate::store::{AddOutcome, ResourceStore};

/// How often the fetch timer fires by default.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_millis(900);

fn next_idx(idx: usize, len: usize) -> usize {
    (idx + 1) % len
}

/// Round-robin polling controller over a pool of discovered devices.
///
/// The controller is a plain single-owner state machine: every method runs
/// to completion and leaves the pool consistent, so a host only has to make
/// sure calls are not interleaved.
///
/// # Example
///
/// ```rust
/// use poolwatch_core::PoolController;
///
/// let mut controller = PoolController::new();
/// controller.add_device("dev-a").unwrap();
///
/// // Fetch timer fires: the client is asked for dev-a
/// assert!(controller.fetch_next().is_some());
///
/// // The client answers
/// let mut events = Vec::new();
/// controller.update_name("boiler").unwrap();
/// controller.update_temperature(64.0).unwrap();
/// controller.update_failure(false, &mut events).unwrap();
///
/// let snapshot = controller.tick().unwrap();
/// assert_eq!(snapshot.device_id, "dev-a");
/// ```
#[derive(Debug, Default)]
pub struct PoolController {
    store: ResourceStore,
    fetch_idx: usize,
    /// Set once the fetch timer has targeted a device.
    fetching: bool,
    current_idx: usize,
}

impl PoolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Position of the device most recently asked for telemetry.
    pub fn fetch_cursor(&self) -> Option<usize> {
        (self.fetching && !self.store.is_empty()).then_some(self.fetch_idx)
    }

    /// Position of the device most recently published.
    pub fn output_cursor(&self) -> Option<usize> {
        (!self.store.is_empty()).then_some(self.current_idx)
    }

    /// Register a discovered device. Known devices are ignored.
    pub fn add_device(&mut self, device_id: &str) -> Result<AddOutcome, ControllerError> {
        let outcome = self.store.add(device_id)?;
        match outcome {
            AddOutcome::Added(index) => info!(device_id, index, "Discovered device"),
            AddOutcome::AlreadyPresent(_) => debug!("Ignoring known resource {}", device_id),
        }
        Ok(outcome)
    }

    /// Advance the fetch cursor and ask for the device it lands on.
    ///
    /// Called on every fetch timer firing. Returns `None` while the pool is
    /// empty.
    pub fn fetch_next(&mut self) -> Option<Outbound> {
        if self.store.is_empty() {
            debug!("No resources available yet");
            return None;
        }

        self.fetch_idx = next_idx(self.fetch_idx, self.store.len());
        self.fetching = true;

        let resource = self.store.get(self.fetch_idx).ok()?;
        Some(Outbound::FetchRequest {
            device_id: resource.device_id().to_string(),
        })
    }

    /// Record a display name for the device being fetched.
    pub fn update_name(&mut self, name: &str) -> Result<(), ControllerError> {
        let index = self.fetch_target()?;
        let resource = self.store.get_mut(index)?;

        if resource.name.as_deref() != Some(name) {
            resource.name = Some(name.to_string());
            resource.ready.name = true;
        }

        Ok(())
    }

    /// Record a temperature reading for the device being fetched.
    pub fn update_temperature(&mut self, temperature: f64) -> Result<(), ControllerError> {
        let index = self.fetch_target()?;
        let resource = self.store.get_mut(index)?;

        resource.temperature = temperature;
        resource.ready.temperature = true;

        Ok(())
    }

    /// Record the failure status of the device being fetched.
    ///
    /// Pushes [`Outbound::FailureCleared`] when the device leaves failure
    /// state, then [`Outbound::ClearFailureRequest`] if a reset was latched
    /// for it.
    pub fn update_failure(
        &mut self,
        failure: bool,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ControllerError> {
        let index = self.fetch_target()?;
        let resource = self.store.get_mut(index)?;

        // Published right away: ticks only report state on their own schedule.
        if resource.failure && !failure {
            info!(device_id = resource.device_id(), "Failure cleared");
            out.push(Outbound::FailureCleared);
        }

        if resource.reset_failure {
            debug!(
                device_id = resource.device_id(),
                "Flushing latched failure reset"
            );
            out.push(Outbound::ClearFailureRequest {
                device_id: resource.device_id().to_string(),
            });
            resource.reset_failure = false;
        }

        resource.failure = failure;
        resource.ready.failure = true;

        Ok(())
    }

    /// Latch a failure reset on the device last published.
    ///
    /// The requester cannot know where the fetch cursor is, so the reset is
    /// delivered the next time this device is fetched. Returns the device the
    /// reset was latched on.
    // TODO: the published device is not necessarily the failing one; pause the
    // fetch rotation on failure instead of routing through the output cursor.
    pub fn request_failure_reset(&mut self) -> Result<&str, ControllerError> {
        let resource = self.store.get_mut(self.current_idx)?;
        resource.reset_failure = true;
        debug!(device_id = resource.device_id(), "Failure reset latched");
        Ok(resource.device_id())
    }

    /// Advance the output cursor to the next ready device and snapshot it.
    ///
    /// The scan stops as soon as it wraps back to the position the cursor
    /// started from, which is only examined when the pool holds a single
    /// device. If nothing is ready the cursor does not move and `None` is
    /// returned.
    pub fn tick(&mut self) -> Option<Snapshot> {
        let len = self.store.len();
        if len == 0 {
            warn!("No resource available");
            return None;
        }

        let last_idx = self.current_idx;
        let mut idx = next_idx(last_idx, len);
        loop {
            let resource = self.store.get(idx).ok()?;
            if resource.is_ready() {
                self.current_idx = idx;
                return resource.snapshot();
            }

            idx = next_idx(idx, len);
            if idx == last_idx {
                debug!("No ready resource");
                return None;
            }
        }
    }

    /// Decode an inbound packet and run the handler for its port.
    ///
    /// Events produced by the handler are appended to `out`.
    pub fn process(
        &mut self,
        inbound: &Inbound,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ControllerError> {
        let port = inbound.port;
        let malformed = |source: PacketError| ControllerError::Malformed { port, source };

        match port {
            InPort::AddDeviceId => {
                let device_id = inbound.packet.as_str().map_err(malformed)?;
                self.add_device(device_id)?;
            }
            InPort::Tick => {
                if let Some(snapshot) = self.tick() {
                    out.push(Outbound::Snapshot(snapshot));
                }
            }
            InPort::SetFailure => {
                match &inbound.packet {
                    Packet::Empty | Packet::Bool(_) => {}
                    other => {
                        return Err(malformed(PacketError::TypeMismatch {
                            expected: PacketKind::Bool,
                            found: other.kind(),
                        }));
                    }
                }
                self.request_failure_reset()?;
            }
            InPort::Name => {
                let name = inbound.packet.as_str().map_err(malformed)?;
                self.update_name(name)?;
            }
            InPort::Temperature => {
                let temperature = inbound.packet.as_float().map_err(malformed)?;
                self.update_temperature(temperature)?;
            }
            InPort::Failure => {
                let failure = inbound.packet.as_bool().map_err(malformed)?;
                self.update_failure(failure, out)?;
            }
        }

        Ok(())
    }

    /// Release the pool and rewind both cursors.
    pub fn teardown(&mut self) {
        self.store.clear();
        self.fetch_idx = 0;
        self.fetching = false;
        self.current_idx = 0;
    }

    fn fetch_target(&self) -> Result<usize, ControllerError> {
        if !self.fetching {
            return Err(ControllerError::NothingFetched);
        }
        Ok(self.fetch_idx)
    }
}
