//! Snapping of a candidate part onto an existing assembly.
//!
//! [`PlacementQuery::evaluate`] materializes the candidate part's sockets at the
//! candidate transform and looks for the nearest placement-visible slot of the same
//! connector type within the snap distance. The result describes where the part
//! would go and whether placing it there is allowed. It never mutates the assembly;
//! use [`Placement::commit`] to add the part.
use tracing::warn;

use crate::assembly::{Assembly, PartIndex};
use crate::catalog::{ConnectorCatalog, PartTypeId};
use crate::connector::SlotInstance;
use crate::error::{Error, Result};
use crate::transform::Transform;

/// Maximum distance between a candidate socket and a slot for the part to snap.
pub const DEFAULT_SNAP_DISTANCE: f32 = 0.25;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Snapping happens when the socket-to-slot distance is strictly below this.
    pub snap_distance: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
        }
    }
}

impl PlacementConfig {
    pub fn new(snap_distance: f32) -> Self {
        Self { snap_distance }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.snap_distance.is_finite() || self.snap_distance < 0.0 {
            return Err(Error::InvalidConfig(
                "snap_distance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a placement evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub part_type: PartTypeId,
    /// Snapped slot transform, or the candidate transform when nothing matched.
    pub transform: Transform,
    /// The slot the part would attach to.
    pub matched_slot: Option<SlotInstance>,
    /// The matched slot is already taken.
    pub occupied: bool,
    /// Whether [`Placement::commit`] is expected to succeed.
    pub allowed: bool,
}

impl Placement {
    /// Adds the evaluated part to `assembly`, attaching it to the matched slot if any.
    ///
    /// The assembly must be the one the placement was evaluated against and must not
    /// have been edited since; otherwise the usual [`Assembly::add_part`] errors apply.
    pub fn commit(&self, assembly: &mut Assembly) -> Result<PartIndex> {
        assembly.add_part(self.part_type, self.matched_slot.as_ref())
    }
}

/// Evaluates candidate placements against a catalog.
#[derive(Debug)]
pub struct PlacementQuery<'a> {
    catalog: &'a ConnectorCatalog,
    config: PlacementConfig,
}

impl<'a> PlacementQuery<'a> {
    pub fn new(catalog: &'a ConnectorCatalog) -> Self {
        Self {
            catalog,
            config: PlacementConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Finds where a part of `part_type` held at `candidate` would snap.
    ///
    /// Each candidate socket asks the assembly for its closest placement slot of the
    /// socket's connector type; the nearest answer within the snap distance wins, with
    /// ties going to the earlier socket. `assembly` should be clean.
    pub fn evaluate(
        &self,
        assembly: Option<&Assembly>,
        candidate: Transform,
        part_type: PartTypeId,
    ) -> Result<Placement> {
        let definition = self.catalog.get_part_type(part_type)?;
        let (_, sockets) = self.catalog.materialize(part_type, 0, &candidate)?;

        let mut best: Option<(SlotInstance, f32)> = None;
        if let Some(assembly) = assembly {
            let snap_sq = self.config.snap_distance * self.config.snap_distance;
            for socket in &sockets {
                let Some(slot) =
                    assembly.closest_slot(socket.transform.position, socket.connector_type, true)
                else {
                    continue;
                };
                let d2 = slot.transform.distance_squared(socket.transform.position);
                if d2 < snap_sq && best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                    best = Some((slot, d2));
                }
            }
        }

        let placement = match (best, assembly) {
            (Some((slot, _)), Some(assembly)) => {
                let occupied = !assembly.is_slot_free(slot.owner, slot.ordinal)?;
                if occupied {
                    warn!(
                        "Placement of part type {} rejected: slot {} of part {} is occupied.",
                        part_type, slot.ordinal, slot.owner
                    );
                }
                Placement {
                    part_type,
                    transform: slot.transform,
                    matched_slot: Some(slot),
                    occupied,
                    allowed: !occupied,
                }
            }
            _ => {
                let starts_new = assembly.is_none_or(Assembly::is_empty);
                Placement {
                    part_type,
                    transform: candidate,
                    matched_slot: None,
                    occupied: false,
                    allowed: definition.can_start_assembly && starts_new,
                }
            }
        };
        Ok(placement)
    }
}
