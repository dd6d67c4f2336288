//! Derived connector storage and adjacency table of an assembly.
//!
//! [`ConnectionGraph::build`] materializes every part's slots and sockets in part
//! order into contiguous vectors, then matches each slot against the complete socket
//! set. A slot is occupied by the owner of a socket that
//! - has the same connector type,
//! - belongs to a different part,
//! - lies strictly closer than `epsilon`,
//! - and is accepted by the catalog's rule for that connector type.
//!
//! Matching only depends on the materialized sets, never on insertion order. When
//! several sockets qualify the nearest one wins and equal distances fall back to the
//! lowest socket registration index; the event is returned as [`AmbiguousAdjacency`].
use crate::assembly::spatial::SpatialHash;
use crate::assembly::{AssemblyConfig, Part, PartIndex};
use crate::catalog::ConnectorCatalog;
use crate::connector::{ConnectorType, Occupancy, SlotInstance, SlotRef, SocketInstance};
use crate::error::{Error, Result};

/// More than one socket matched a single slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousAdjacency {
    /// The slot that saw several matches.
    pub slot: SlotRef,
    /// Connector type of the slot.
    pub connector_type: ConnectorType,
    /// Owners of all matching sockets, in socket registration order.
    pub candidates: Vec<PartIndex>,
    /// The owner recorded in the adjacency table.
    pub chosen: PartIndex,
}

/// Contiguous slot/socket instances plus one [`Occupancy`] per slot.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGraph {
    slots: Vec<SlotInstance>,
    sockets: Vec<SocketInstance>,
    slot_offsets: Vec<usize>,
    socket_offsets: Vec<usize>,
    adjacency: Vec<Occupancy>,
}

impl ConnectionGraph {
    /// Builds a fresh graph for `parts`. Fails on the first unknown part type.
    pub(crate) fn build(
        parts: &[Part],
        catalog: &ConnectorCatalog,
        config: &AssemblyConfig,
        ambiguities: &mut Vec<AmbiguousAdjacency>,
    ) -> Result<Self> {
        let mut graph = ConnectionGraph {
            slots: Vec::new(),
            sockets: Vec::new(),
            slot_offsets: Vec::with_capacity(parts.len() + 1),
            socket_offsets: Vec::with_capacity(parts.len() + 1),
            adjacency: Vec::new(),
        };

        for (index, part) in parts.iter().enumerate() {
            let template = catalog.get_template(part.part_type)?;
            graph.slot_offsets.push(graph.slots.len());
            graph.socket_offsets.push(graph.sockets.len());
            catalog.materialize_into(
                template,
                index,
                &part.transform,
                &mut graph.slots,
                &mut graph.sockets,
            );
        }
        graph.slot_offsets.push(graph.slots.len());
        graph.socket_offsets.push(graph.sockets.len());

        let epsilon_sq = config.epsilon * config.epsilon;
        let index = config.spatial_index.then(|| {
            let mut hash = SpatialHash::with_capacity(config.epsilon, graph.sockets.len());
            for (i, socket) in graph.sockets.iter().enumerate() {
                hash.insert(socket.transform.position, i);
            }
            hash
        });

        let mut matches: Vec<(usize, f32)> = Vec::new();
        graph.adjacency = Vec::with_capacity(graph.slots.len());
        for slot in &graph.slots {
            matches.clear();
            let mut consider = |i: usize| {
                let socket = &graph.sockets[i];
                if socket.connector_type != slot.connector_type || socket.owner == slot.owner {
                    return;
                }
                let d2 = socket.transform.distance_squared(slot.transform.position);
                if d2 < epsilon_sq
                    && catalog
                        .rules()
                        .accepts(slot.connector_type, &slot.transform, &socket.transform)
                {
                    matches.push((i, d2));
                }
            };
            match &index {
                Some(hash) => hash.for_each_near(slot.transform.position, &mut consider),
                None => (0..graph.sockets.len()).for_each(&mut consider),
            }

            let best = matches
                .iter()
                .copied()
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            let entry = match best {
                Some((i, _)) => {
                    let chosen = graph.sockets[i].owner;
                    if matches.len() > 1 {
                        matches.sort_unstable_by_key(|m| m.0);
                        ambiguities.push(AmbiguousAdjacency {
                            slot: slot.slot_ref(),
                            connector_type: slot.connector_type,
                            candidates: matches.iter().map(|m| graph.sockets[m.0].owner).collect(),
                            chosen,
                        });
                    }
                    Occupancy::Occupied(chosen)
                }
                None => Occupancy::Free,
            };
            graph.adjacency.push(entry);
        }

        Ok(graph)
    }

    /// Number of parts the graph was built for.
    pub fn part_count(&self) -> usize {
        self.slot_offsets.len().saturating_sub(1)
    }

    pub fn slots(&self) -> &[SlotInstance] {
        &self.slots
    }

    pub fn sockets(&self) -> &[SocketInstance] {
        &self.sockets
    }

    /// Slots of one part, or an empty slice if the part is not in the graph.
    pub fn slots_of(&self, part: PartIndex) -> &[SlotInstance] {
        match self.range(&self.slot_offsets, part) {
            Some((start, end)) => &self.slots[start..end],
            None => &[],
        }
    }

    /// Sockets of one part, or an empty slice if the part is not in the graph.
    pub fn sockets_of(&self, part: PartIndex) -> &[SocketInstance] {
        match self.range(&self.socket_offsets, part) {
            Some((start, end)) => &self.sockets[start..end],
            None => &[],
        }
    }

    /// Occupancy of every slot, in slot registration order.
    pub fn adjacency(&self) -> impl Iterator<Item = (SlotRef, Occupancy)> + '_ {
        self.slots
            .iter()
            .zip(self.adjacency.iter())
            .map(|(slot, occupancy)| (slot.slot_ref(), *occupancy))
    }

    pub fn occupied_count(&self) -> usize {
        self.adjacency.iter().filter(|o| !o.is_free()).count()
    }

    pub fn occupancy(&self, part: PartIndex, ordinal: usize) -> Result<Occupancy> {
        self.slot_index(part, ordinal).map(|i| self.adjacency[i])
    }

    /// Resolves a slot address to its position in the contiguous storage.
    pub(crate) fn slot_index(&self, part: PartIndex, ordinal: usize) -> Result<usize> {
        let (start, end) =
            self.range(&self.slot_offsets, part)
                .ok_or(Error::PartIndexOutOfRange {
                    index: part,
                    len: self.part_count(),
                })?;
        if ordinal >= end - start {
            return Err(Error::SlotOutOfRange {
                part,
                ordinal,
                count: end - start,
            });
        }
        Ok(start + ordinal)
    }

    pub(crate) fn slot_at(&self, index: usize) -> &SlotInstance {
        &self.slots[index]
    }

    fn range(&self, offsets: &[usize], part: PartIndex) -> Option<(usize, usize)> {
        let start = *offsets.get(part)?;
        let end = *offsets.get(part + 1)?;
        Some((start, end))
    }
}
