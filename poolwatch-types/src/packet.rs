//! Dynamically typed payloads carried on controller ports.

use alloc::string::String;
use core::fmt;

/// A single payload delivered to or from a controller port.
///
/// Ports are typed by convention only: a host may deliver any packet to any
/// port, and the receiving handler decodes it with one of the `as_*`
/// accessors. A mismatch surfaces as a [`PacketError`] and leaves the
/// controller untouched.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "snake_case"))]
pub enum Packet {
    /// A bare trigger with no value.
    #[default]
    Empty,
    Bool(bool),
    String(String),
    Float(f64),
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Empty => PacketKind::Empty,
            Packet::Bool(_) => PacketKind::Bool,
            Packet::String(_) => PacketKind::String,
            Packet::Float(_) => PacketKind::Float,
        }
    }

    pub fn as_bool(&self) -> Result<bool, PacketError> {
        match self {
            Packet::Bool(value) => Ok(*value),
            other => Err(PacketError::mismatch(PacketKind::Bool, other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, PacketError> {
        match self {
            Packet::String(value) => Ok(value),
            other => Err(PacketError::mismatch(PacketKind::String, other)),
        }
    }

    pub fn as_float(&self) -> Result<f64, PacketError> {
        match self {
            Packet::Float(value) => Ok(*value),
            other => Err(PacketError::mismatch(PacketKind::Float, other)),
        }
    }
}

impl From<bool> for Packet {
    fn from(value: bool) -> Self {
        Packet::Bool(value)
    }
}

impl From<f64> for Packet {
    fn from(value: f64) -> Self {
        Packet::Float(value)
    }
}

impl From<String> for Packet {
    fn from(value: String) -> Self {
        Packet::String(value)
    }
}

impl From<&str> for Packet {
    fn from(value: &str) -> Self {
        Packet::String(value.into())
    }
}

/// The type tag of a [`Packet`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PacketKind {
    Empty,
    Bool,
    String,
    Float,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketKind::Empty => "empty",
            PacketKind::Bool => "bool",
            PacketKind::String => "string",
            PacketKind::Float => "float",
        };
        f.write_str(name)
    }
}

/// A packet could not be decoded into the type its port expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    TypeMismatch {
        expected: PacketKind,
        found: PacketKind,
    },
}

impl PacketError {
    fn mismatch(expected: PacketKind, found: &Packet) -> Self {
        PacketError::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::TypeMismatch { expected, found } => {
                write!(f, "expected a {} packet, got {}", expected, found)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {}
