//! Ordered parts list plus the adjacency table derived from it.
//!
//! An [`Assembly`] is either [`AssemblyState::Clean`] (the adjacency table reflects the
//! parts list) or [`AssemblyState::Dirty`]. Every edit makes it dirty; only
//! [`Assembly::rebuild`] makes it clean again. There is no incremental patching.
//!
//! Queries that read the adjacency table ([`Assembly::is_slot_free`],
//! [`Assembly::occupant`], [`Assembly::closest_slot`], [`Assembly::slots_at_position`])
//! expect a clean assembly. On a dirty assembly they answer from the last successful
//! rebuild, which may describe parts that have since moved index or disappeared.
//!
//! # Index stability
//!
//! A part is identified by its index in the parts list. [`Assembly::remove_part`] moves
//! the last part into the removed index, so any index retained across a removal must be
//! re-resolved through [`RemovedPart::relocated_from`].
use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, warn};

use crate::catalog::{AssemblyTypeId, ConnectorCatalog, PartTypeId};
use crate::connector::{ConnectorType, Occupancy, SlotInstance, SocketInstance};
use crate::error::{Error, Result};
use crate::events::{AssemblyEvent, AssemblyEventKind, EventSink};
use crate::transform::Transform;

pub mod graph;
pub(crate) mod spatial;

pub use graph::{AmbiguousAdjacency, ConnectionGraph};

/// Position of a part in its assembly's parts list.
pub type PartIndex = usize;

/// Distance below which two connectors coincide.
pub const DEFAULT_EPSILON: f32 = 0.01;

/// A placed instance of a part type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub part_type: PartTypeId,
    pub transform: Transform,
}

impl Part {
    pub fn new(part_type: PartTypeId, transform: Transform) -> Self {
        Self {
            part_type,
            transform,
        }
    }
}

/// Whether the adjacency table reflects the parts list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssemblyState {
    Clean,
    Dirty,
}

/// Matching configuration of an assembly.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyConfig {
    /// Connectors match when their distance is strictly below this value.
    pub epsilon: f32,
    /// Use a hash grid instead of the all-pairs scan. Results are identical.
    pub spatial_index: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            spatial_index: true,
        }
    }
}

impl AssemblyConfig {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            ..Default::default()
        }
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_spatial_index(mut self, spatial_index: bool) -> Self {
        self.spatial_index = spatial_index;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(Error::InvalidConfig(
                "epsilon must be finite and > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of [`Assembly::remove_part`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RemovedPart {
    /// The index that was removed.
    pub index: PartIndex,
    /// The removed part.
    pub part: Part,
    /// Former index of the part that now lives at `index`, if one was moved.
    pub relocated_from: Option<PartIndex>,
}

/// Counts and anomalies of a successful rebuild.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RebuildSummary {
    pub parts: usize,
    pub slots: usize,
    pub sockets: usize,
    pub occupied_slots: usize,
    pub ambiguities: Vec<AmbiguousAdjacency>,
}

/// A structure built from parts that connect at slots and sockets.
#[derive(Clone, Debug)]
pub struct Assembly {
    assembly_type: AssemblyTypeId,
    anchor: Transform,
    catalog: Arc<ConnectorCatalog>,
    config: AssemblyConfig,
    parts: Vec<Part>,
    graph: ConnectionGraph,
    state: AssemblyState,
}

impl Assembly {
    /// Creates an empty, dirty assembly with the default configuration.
    pub fn new(
        assembly_type: AssemblyTypeId,
        anchor: Transform,
        catalog: Arc<ConnectorCatalog>,
    ) -> Self {
        Self {
            assembly_type,
            anchor,
            catalog,
            config: AssemblyConfig::default(),
            parts: Vec::new(),
            graph: ConnectionGraph::default(),
            state: AssemblyState::Dirty,
        }
    }

    /// Creates an empty, dirty assembly after validating `config`.
    pub fn try_new(
        assembly_type: AssemblyTypeId,
        anchor: Transform,
        catalog: Arc<ConnectorCatalog>,
        config: AssemblyConfig,
    ) -> Result<Self> {
        Self::new(assembly_type, anchor, catalog).with_config(config)
    }

    /// Replaces the matching configuration and marks the assembly dirty.
    pub fn with_config(mut self, config: AssemblyConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        self.state = AssemblyState::Dirty;
        Ok(self)
    }

    pub fn assembly_type(&self) -> AssemblyTypeId {
        self.assembly_type
    }

    /// Transform given to a part added without an attach slot.
    pub fn anchor(&self) -> Transform {
        self.anchor
    }

    pub fn catalog(&self) -> &Arc<ConnectorCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn is_clean(&self) -> bool {
        self.state == AssemblyState::Clean
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, index: PartIndex) -> Option<&Part> {
        self.parts.get(index)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The derived table of the last successful rebuild.
    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    pub fn slots(&self) -> &[SlotInstance] {
        self.graph.slots()
    }

    pub fn sockets(&self) -> &[SocketInstance] {
        self.graph.sockets()
    }

    pub fn slots_of(&self, part: PartIndex) -> &[SlotInstance] {
        self.graph.slots_of(part)
    }

    pub fn sockets_of(&self, part: PartIndex) -> &[SocketInstance] {
        self.graph.sockets_of(part)
    }

    /// Appends a part, see [`Assembly::add_part_with_events`].
    pub fn add_part(
        &mut self,
        part_type: PartTypeId,
        attach: Option<&SlotInstance>,
    ) -> Result<PartIndex> {
        self.add_part_with_events(part_type, attach, &mut ())
    }

    /// Appends a part and marks the assembly dirty.
    ///
    /// Without `attach` the part is placed at the anchor; this is only legal for an
    /// empty assembly or a part type that can start an assembly. With `attach` the part
    /// takes the slot's world transform from the last rebuild, and the slot must be
    /// free in that rebuild. On error nothing changes.
    pub fn add_part_with_events(
        &mut self,
        part_type: PartTypeId,
        attach: Option<&SlotInstance>,
        sink: &mut dyn EventSink,
    ) -> Result<PartIndex> {
        let definition = self.catalog.get_part_type(part_type)?;

        let transform = match attach {
            None => {
                if !self.parts.is_empty() && !definition.can_start_assembly {
                    return Err(Error::CannotStartAssembly(part_type));
                }
                self.anchor
            }
            Some(slot) => {
                let index = self
                    .graph
                    .slot_index(slot.owner, slot.ordinal)
                    .map_err(|_| Error::UnknownSlot {
                        part: slot.owner,
                        ordinal: slot.ordinal,
                    })?;
                if let Some(occupant) = self.graph.occupancy(slot.owner, slot.ordinal)?.occupant()
                {
                    return Err(Error::SlotOccupied {
                        part: slot.owner,
                        ordinal: slot.ordinal,
                        occupant,
                    });
                }
                self.graph.slot_at(index).transform
            }
        };

        let index = self.parts.len();
        let part = Part::new(part_type, transform);
        self.parts.push(part);
        self.state = AssemblyState::Dirty;
        debug!(
            "Added part {} of type {} to assembly type {}.",
            index, part_type, self.assembly_type
        );
        if sink.wants(AssemblyEventKind::PartAdded) {
            sink.send(AssemblyEvent::PartAdded { index, part });
        }
        Ok(index)
    }

    /// Removes a part, see [`Assembly::remove_part_with_events`].
    pub fn remove_part(&mut self, index: PartIndex) -> Result<RemovedPart> {
        self.remove_part_with_events(index, &mut ())
    }

    /// Removes a part by moving the last part into `index` and marks the assembly dirty.
    ///
    /// Every part index obtained before this call is invalid afterwards, except that
    /// `index` now names the part formerly at [`RemovedPart::relocated_from`].
    pub fn remove_part_with_events(
        &mut self,
        index: PartIndex,
        sink: &mut dyn EventSink,
    ) -> Result<RemovedPart> {
        if index >= self.parts.len() {
            return Err(Error::PartIndexOutOfRange {
                index,
                len: self.parts.len(),
            });
        }

        let last = self.parts.len() - 1;
        let part = self.parts.swap_remove(index);
        let relocated_from = (index != last).then_some(last);
        self.state = AssemblyState::Dirty;
        debug!(
            "Removed part {} of type {} (relocated: {:?}).",
            index, part.part_type, relocated_from
        );
        if sink.wants(AssemblyEventKind::PartRemoved) {
            sink.send(AssemblyEvent::PartRemoved {
                index,
                part,
                relocated_from,
            });
        }
        Ok(RemovedPart {
            index,
            part,
            relocated_from,
        })
    }

    /// Rebuilds the adjacency table, see [`Assembly::rebuild_with_events`].
    pub fn rebuild(&mut self) -> Result<RebuildSummary> {
        self.rebuild_with_events(&mut ())
    }

    /// Recomputes all connector instances and the adjacency table from scratch.
    ///
    /// On success the assembly is clean. If a part has an unknown type the previous
    /// table is kept and the assembly stays dirty.
    pub fn rebuild_with_events(&mut self, sink: &mut dyn EventSink) -> Result<RebuildSummary> {
        if sink.wants(AssemblyEventKind::RebuildStarted) {
            sink.send(AssemblyEvent::RebuildStarted {
                part_count: self.parts.len(),
            });
        }

        let mut ambiguities = Vec::new();
        let graph =
            match ConnectionGraph::build(&self.parts, &self.catalog, &self.config, &mut ambiguities)
            {
                Ok(graph) => graph,
                Err(e) => {
                    warn!("Rebuild of assembly type {} failed: {}.", self.assembly_type, e);
                    if sink.wants(AssemblyEventKind::Warning) {
                        sink.send(AssemblyEvent::Warning {
                            context: format!("assembly:{}", self.assembly_type),
                            message: format!("Rebuild failed: {e}"),
                        });
                    }
                    self.state = AssemblyState::Dirty;
                    return Err(e);
                }
            };

        for ambiguity in &ambiguities {
            warn!(
                "Slot {} of part {} matched sockets of parts {:?}; using part {}.",
                ambiguity.slot.ordinal, ambiguity.slot.part, ambiguity.candidates, ambiguity.chosen
            );
            if sink.wants(AssemblyEventKind::AmbiguousAdjacency) {
                sink.send(AssemblyEvent::AmbiguousAdjacency(ambiguity.clone()));
            }
        }

        let summary = RebuildSummary {
            parts: self.parts.len(),
            slots: graph.slots().len(),
            sockets: graph.sockets().len(),
            occupied_slots: graph.occupied_count(),
            ambiguities,
        };
        self.graph = graph;
        self.state = AssemblyState::Clean;
        debug!(
            "Rebuilt assembly type {}: {} parts, {} of {} slots occupied.",
            self.assembly_type, summary.parts, summary.occupied_slots, summary.slots
        );
        if sink.wants(AssemblyEventKind::RebuildFinished) {
            sink.send(AssemblyEvent::RebuildFinished {
                summary: summary.clone(),
            });
        }
        Ok(summary)
    }

    /// Replaces the parts list wholesale, e.g. from a decoded record. Leaves the
    /// assembly dirty; call [`Assembly::rebuild`] before querying.
    pub fn replace_parts(&mut self, parts: Vec<Part>) {
        self.parts = parts;
        self.state = AssemblyState::Dirty;
    }

    /// Whether a slot is free in the last rebuild.
    pub fn is_slot_free(&self, part: PartIndex, ordinal: usize) -> Result<bool> {
        self.occupant(part, ordinal).map(Occupancy::is_free)
    }

    /// Adjacency entry of a slot in the last rebuild.
    pub fn occupant(&self, part: PartIndex, ordinal: usize) -> Result<Occupancy> {
        self.graph.occupancy(part, ordinal)
    }

    /// Nearest slot of a matching type, skipping placement-ignored slots when
    /// `for_placement` is set. Equal distances resolve to the first registered slot.
    pub fn closest_slot(
        &self,
        position: Vec3,
        connector_type: ConnectorType,
        for_placement: bool,
    ) -> Option<SlotInstance> {
        let mut best: Option<(&SlotInstance, f32)> = None;
        for slot in self.graph.slots() {
            if !connector_type.matches(slot.connector_type)
                || (for_placement && slot.ignore_for_placement)
            {
                continue;
            }
            let d2 = slot.transform.distance_squared(position);
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((slot, d2));
            }
        }
        best.map(|(slot, _)| *slot)
    }

    /// All slots of a matching type strictly within epsilon of `position`.
    pub fn slots_at_position(
        &self,
        position: Vec3,
        connector_type: ConnectorType,
        exclude_part: Option<PartIndex>,
    ) -> Vec<SlotInstance> {
        let epsilon_sq = self.config.epsilon * self.config.epsilon;
        self.graph
            .slots()
            .iter()
            .filter(|slot| {
                connector_type.matches(slot.connector_type)
                    && Some(slot.owner) != exclude_part
                    && slot.transform.distance_squared(position) < epsilon_sq
            })
            .copied()
            .collect()
    }

    /// Nearest part by origin, ignoring connectors. Reads the current parts list, so it
    /// is valid in either state.
    pub fn closest_part_index(&self, position: Vec3) -> Option<PartIndex> {
        self.parts
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.transform.distance_squared(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(i, _)| i)
    }
}
