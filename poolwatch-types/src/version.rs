//! Snapshot schema versioning.

use core::fmt;

use crate::SCHEMA_VERSION;

/// Version of the snapshot layout a producer wrote.
///
/// Readers accept any snapshot whose major version they know; minor bumps
/// only ever add fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    /// The layout written by this crate.
    pub const CURRENT: SchemaVersion = SchemaVersion::new(SCHEMA_VERSION, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether a reader built against `reader` can decode this layout.
    pub fn readable_by(&self, reader: SchemaVersion) -> bool {
        self.major == reader.major
    }

    pub fn is_compatible(&self) -> bool {
        self.readable_by(Self::CURRENT)
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn minor_bump_stays_compatible() {
        assert!(SchemaVersion::new(SCHEMA_VERSION, 7).is_compatible());
        assert!(!SchemaVersion::new(SCHEMA_VERSION + 1, 0).is_compatible());
    }

    #[test]
    fn older_reader_rejects_newer_major() {
        let written = SchemaVersion::new(2, 1);
        assert!(written.readable_by(SchemaVersion::new(2, 0)));
        assert!(!written.readable_by(SchemaVersion::new(1, 3)));
    }

    #[test]
    fn displays_as_major_dot_minor() {
        assert_eq!(SchemaVersion::CURRENT.to_string(), "1.0");
    }
}
