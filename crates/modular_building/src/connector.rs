//! Connector tags and the per-part connector instances derived from templates.
//!
//! Slot and socket instances are addressed by integers, never by identity: a slot is
//! `(owner part index, ordinal within the owner's template)`. Instances are produced by
//! [`crate::catalog::ConnectorCatalog::materialize`] and stored contiguously by
//! [`crate::assembly::Assembly`].
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::assembly::PartIndex;
use crate::transform::Transform;

/// Tag that decides which slots and sockets may connect.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectorType {
    Foundation,
    Wall,
    Floor,
    /// Matches every type. Only valid in queries, never inside a template.
    All,
}

impl ConnectorType {
    /// Returns `true` if a query for `self` accepts a connector tagged `other`.
    #[inline]
    pub fn matches(self, other: ConnectorType) -> bool {
        self == other || self == ConnectorType::All || other == ConnectorType::All
    }
}

/// Integer address of a slot inside an assembly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    pub part: PartIndex,
    pub ordinal: usize,
}

impl SlotRef {
    pub fn new(part: PartIndex, ordinal: usize) -> Self {
        Self { part, ordinal }
    }
}

/// A template slot bound to a placed (or candidate) part, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotInstance {
    pub owner: PartIndex,
    pub ordinal: usize,
    pub connector_type: ConnectorType,
    pub transform: Transform,
    pub ignore_for_placement: bool,
}

impl SlotInstance {
    pub fn slot_ref(&self) -> SlotRef {
        SlotRef::new(self.owner, self.ordinal)
    }
}

/// A template socket bound to a placed (or candidate) part, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SocketInstance {
    pub owner: PartIndex,
    pub ordinal: usize,
    pub connector_type: ConnectorType,
    pub transform: Transform,
}

/// Adjacency entry of a single slot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Occupancy {
    #[default]
    Free,
    Occupied(PartIndex),
}

impl Occupancy {
    pub fn is_free(self) -> bool {
        matches!(self, Occupancy::Free)
    }

    pub fn occupant(self) -> Option<PartIndex> {
        match self {
            Occupancy::Free => None,
            Occupancy::Occupied(part) => Some(part),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_every_type() {
        for t in [
            ConnectorType::Foundation,
            ConnectorType::Wall,
            ConnectorType::Floor,
        ] {
            assert!(ConnectorType::All.matches(t));
            assert!(t.matches(ConnectorType::All));
            assert!(t.matches(t));
        }
        assert!(!ConnectorType::Wall.matches(ConnectorType::Foundation));
    }

    #[test]
    fn occupancy_distinguishes_part_zero_from_free() {
        assert!(Occupancy::Free.is_free());
        assert!(!Occupancy::Occupied(0).is_free());
        assert_eq!(Occupancy::Occupied(0).occupant(), Some(0));
        assert_eq!(Occupancy::Free.occupant(), None);
    }
}
