//! The ordered pool of discovered devices and their cached telemetry.

use poolwatch_types::Snapshot;

use crate::error::ControllerError;

/// Which telemetry fields of a resource have been written at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub temperature: bool,
    pub name: bool,
    pub failure: bool,
}

impl Readiness {
    /// A resource is ready once every field has been observed.
    pub fn is_ready(&self) -> bool {
        self.temperature && self.name && self.failure
    }
}

/// One discovered device and its last known state.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    device_id: String,
    pub(crate) name: Option<String>,
    pub(crate) temperature: f64,
    pub(crate) failure: bool,
    pub(crate) reset_failure: bool,
    pub(crate) ready: Readiness,
}

impl Resource {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            name: None,
            temperature: 0.0,
            failure: false,
            reset_failure: false,
            ready: Readiness::default(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn failure(&self) -> bool {
        self.failure
    }

    /// Whether a failure reset is latched for the next time this device is fetched.
    pub fn reset_pending(&self) -> bool {
        self.reset_failure
    }

    pub fn readiness(&self) -> Readiness {
        self.ready
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Build a snapshot of this resource, or `None` while it is not ready.
    pub fn snapshot(&self) -> Option<Snapshot> {
        if !self.is_ready() {
            return None;
        }
        let name = self.name.as_deref()?;
        Some(
            Snapshot::builder(self.device_id.as_str())
                .name(name)
                .failure(self.failure)
                .temperature(self.temperature)
                .build(),
        )
    }
}

/// Result of offering a device identifier to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended at this index.
    Added(usize),
    /// Already known at this index; nothing changed.
    AlreadyPresent(usize),
}

/// Discovery-ordered, append-only collection of resources.
///
/// Identifiers are unique. Entries are never removed individually; the whole
/// store is released by [`ResourceStore::clear`] on teardown.
#[derive(Debug, Default)]
pub struct ResourceStore {
    resources: Vec<Resource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device unless it is already known.
    ///
    /// Fails with [`ControllerError::ResourceExhausted`] if the pool cannot
    /// grow, in which case the store is left unchanged.
    pub fn add(&mut self, device_id: &str) -> Result<AddOutcome, ControllerError> {
        if let Some(index) = self.position(device_id) {
            return Ok(AddOutcome::AlreadyPresent(index));
        }

        self.resources
            .try_reserve(1)
            .map_err(|_| ControllerError::ResourceExhausted {
                device_id: device_id.to_string(),
            })?;
        self.resources.push(Resource::new(device_id));

        Ok(AddOutcome::Added(self.resources.len() - 1))
    }

    pub fn get(&self, index: usize) -> Result<&Resource, ControllerError> {
        let len = self.resources.len();
        self.resources
            .get(index)
            .ok_or(ControllerError::NotFound { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Resource, ControllerError> {
        let len = self.resources.len();
        self.resources
            .get_mut(index)
            .ok_or(ControllerError::NotFound { index, len })
    }

    /// Index of the resource with this identifier.
    pub fn position(&self, device_id: &str) -> Option<usize> {
        self.resources
            .iter()
            .position(|resource| resource.device_id == device_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Release every entry.
    pub fn clear(&mut self) {
        self.resources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_in_discovery_order() {
        let mut store = ResourceStore::new();

        assert_eq!(store.add("a").unwrap(), AddOutcome::Added(0));
        assert_eq!(store.add("b").unwrap(), AddOutcome::Added(1));

        assert_eq!(store.get(1).unwrap().device_id(), "b");
        assert_eq!(store.position("a"), Some(0));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut store = ResourceStore::new();
        store.add("dev").unwrap();

        assert_eq!(store.add("dev").unwrap(), AddOutcome::AlreadyPresent(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn new_resource_starts_blank() {
        let mut store = ResourceStore::new();
        store.add("dev").unwrap();

        let resource = store.get(0).unwrap();
        assert_eq!(resource.name(), None);
        assert!(!resource.failure());
        assert!(!resource.reset_pending());
        assert_eq!(resource.readiness(), Readiness::default());
        assert!(resource.snapshot().is_none());
    }

    #[test]
    fn get_out_of_range_is_not_found() {
        let mut store = ResourceStore::new();
        assert_eq!(
            store.get(0).unwrap_err(),
            ControllerError::NotFound { index: 0, len: 0 }
        );

        store.add("dev").unwrap();
        assert!(store.get_mut(3).unwrap_err().is_not_found());
    }

    #[test]
    fn readiness_needs_all_three_fields() {
        let partial = Readiness {
            temperature: true,
            name: true,
            failure: false,
        };
        assert!(!partial.is_ready());

        let full = Readiness {
            failure: true,
            ..partial
        };
        assert!(full.is_ready());
    }

    #[test]
    fn snapshot_of_ready_resource() {
        let mut resource = Resource::new("dev-9");
        resource.name = Some("lab".into());
        resource.temperature = 19.5;
        resource.failure = true;
        resource.ready = Readiness {
            temperature: true,
            name: true,
            failure: true,
        };

        let snapshot = resource.snapshot().unwrap();
        assert_eq!(snapshot.device_id, "dev-9");
        assert_eq!(snapshot.name, "lab");
        assert_eq!(snapshot.temperature, 19.5);
        assert!(snapshot.failure);
    }

    #[test]
    fn clear_releases_everything() {
        let mut store = ResourceStore::new();
        store.add("a").unwrap();
        store.add("b").unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.position("a"), None);
    }
}
