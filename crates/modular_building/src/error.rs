//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Every variant belongs to one [`ErrorKind`]: configuration problems are content bugs
//! (unknown part types, malformed templates), validation errors reject an illegal
//! placement, index errors are caller mistakes, and IO errors come from record decoding.
//! Ambiguous adjacency is not an error; it is reported through
//! [`crate::events::AssemblyEvent::AmbiguousAdjacency`].
use thiserror::Error;

use crate::assembly::PartIndex;
use crate::catalog::{AssemblyTypeId, PartTypeId};

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Index,
    Io,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown part type {0}")]
    UnknownPartType(PartTypeId),

    #[error("unknown assembly type {0}")]
    UnknownAssemblyType(AssemblyTypeId),

    #[error("invalid template for part type {part_type}: {reason}")]
    InvalidTemplate { part_type: PartTypeId, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("part type {0} cannot start a new assembly")]
    CannotStartAssembly(PartTypeId),

    #[error("slot {ordinal} of part {part} is already occupied by part {occupant}")]
    SlotOccupied {
        part: PartIndex,
        ordinal: usize,
        occupant: PartIndex,
    },

    #[error("slot {ordinal} of part {part} is not part of the last rebuild")]
    UnknownSlot { part: PartIndex, ordinal: usize },

    #[error("part index {index} out of range (len {len})")]
    PartIndexOutOfRange { index: PartIndex, len: usize },

    #[error("slot {ordinal} out of range for part {part} ({count} slots)")]
    SlotOutOfRange {
        part: PartIndex,
        ordinal: usize,
        count: usize,
    },

    #[error("malformed assembly record: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownPartType(_)
            | Error::UnknownAssemblyType(_)
            | Error::InvalidTemplate { .. }
            | Error::InvalidConfig(_) => ErrorKind::Configuration,
            Error::CannotStartAssembly(_)
            | Error::SlotOccupied { .. }
            | Error::UnknownSlot { .. } => ErrorKind::Validation,
            Error::PartIndexOutOfRange { .. } | Error::SlotOutOfRange { .. } => ErrorKind::Index,
            Error::Decode(_) | Error::Io(_) => ErrorKind::Io,
        }
    }
}
