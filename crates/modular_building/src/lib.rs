#![forbid(unsafe_code)]
//! modular_building: connector-based adjacency for structures built from snapping parts.
//!
//! Modules:
//! - catalog: part types, connector templates and per-connector-type acceptance rules
//! - assembly: ordered parts list, full rebuild of the adjacency table, occupancy queries
//! - placement: snapping a candidate part onto an assembly
//! - record: persisted form of an assembly (serde and little-endian binary)
//! - registry: assembly types and live assemblies, range lookup
//! - events: event sinks observing edits and rebuilds
//!
//! For examples, see the README and the `modular_building_examples` crate.
pub mod assembly;
pub mod catalog;
pub mod connector;
pub mod error;
pub mod events;
pub mod placement;
pub mod record;
pub mod registry;
pub mod transform;

/// Convenient re-exports for common types. Import with `use modular_building::prelude::*;`.
pub mod prelude {
    pub use crate::assembly::{
        AmbiguousAdjacency, Assembly, AssemblyConfig, AssemblyState, ConnectionGraph, Part,
        PartIndex, RebuildSummary, RemovedPart, DEFAULT_EPSILON,
    };
    pub use crate::catalog::{
        AlignedAxes, AssemblyTypeId, ConnectionRule, ConnectionRules, ConnectorCatalog,
        ConnectorTemplate, Facing, PartType, PartTypeId, RuleSpec, SlotDescriptor,
        SocketDescriptor,
    };
    pub use crate::connector::{ConnectorType, Occupancy, SlotInstance, SlotRef, SocketInstance};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::events::{
        AssemblyEvent, AssemblyEventKind, EventSink, FnSink, VecSink,
    };
    pub use crate::placement::{
        Placement, PlacementConfig, PlacementQuery, DEFAULT_SNAP_DISTANCE,
    };
    pub use crate::record::{AssemblyRecord, PartRecord};
    pub use crate::registry::{AssemblyId, AssemblyRegistry};
    pub use crate::transform::Transform;
}
