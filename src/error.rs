//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

use crate::reference::NodeId;

/// Errors reported by the diagram manager, the codec and the file containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Raster dimensions that cannot be represented.
    #[error("invalid raster dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// The node table or its hash index has no room left.
    #[error("{resource} is full (capacity {capacity})")]
    CapacityExceeded {
        resource: &'static str,
        capacity: usize,
    },

    /// The serialized diagram cannot be parsed.
    #[error("malformed diagram stream at byte {offset}: {reason}")]
    MalformedStream { offset: usize, reason: &'static str },

    /// A serial number in the stream that no earlier node was assigned.
    #[error("unresolved serial number {serial} at byte {offset}")]
    UnresolvedReference { serial: u32, offset: usize },

    /// A level outside of `1..=MAX_LEVEL`.
    #[error("level {0} is out of range")]
    OutOfRangeLevel(i64),

    /// A child reference that is not a live node below the requested level.
    #[error("invalid child {child} for a node at level {level}")]
    InvalidNode { child: NodeId, level: u32 },

    /// A PGM or BIRP container with a bad header or payload.
    #[error("invalid {format} file: {reason}")]
    InvalidImage {
        format: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
