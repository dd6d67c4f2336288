//! Part types and their connector templates.
//!
//! A [`ConnectorCatalog`] maps a [`PartTypeId`] to a [`PartType`], whose
//! [`ConnectorTemplate`] lists the slots the part consumes and the sockets it offers,
//! each at a part-local transform. Catalogs are immutable once shared with assemblies
//! and are typically loaded by an external asset pipeline before first use.
//!
//! Typical usage:
//! - Register part types with [`ConnectorCatalog::with_part_type`].
//! - Attach data-driven acceptance rules per connector type with [`ConnectorCatalog::with_rule`].
//! - Share the catalog between assemblies behind an [`std::sync::Arc`].
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::assembly::PartIndex;
use crate::connector::{ConnectorType, SlotInstance, SocketInstance};
use crate::error::{Error, Result};
use crate::transform::Transform;

pub mod rules;

pub use rules::{AlignedAxes, ConnectionRule, ConnectionRules, Facing, RuleSpec};

pub type PartTypeId = u32;
pub type AssemblyTypeId = u32;

/// Slot descriptor in part-local space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotDescriptor {
    pub connector_type: ConnectorType,
    pub local: Transform,
    /// Hidden from placement snapping; still takes part in adjacency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_for_placement: bool,
}

impl SlotDescriptor {
    pub fn new(connector_type: ConnectorType, local: Transform) -> Self {
        Self {
            connector_type,
            local,
            ignore_for_placement: false,
        }
    }

    pub fn ignored_for_placement(mut self) -> Self {
        self.ignore_for_placement = true;
        self
    }
}

/// Socket descriptor in part-local space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SocketDescriptor {
    pub connector_type: ConnectorType,
    pub local: Transform,
}

impl SocketDescriptor {
    pub fn new(connector_type: ConnectorType, local: Transform) -> Self {
        Self {
            connector_type,
            local,
        }
    }
}

/// Ordered slots and sockets of a part type. Ordinals are positions in these lists.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorTemplate {
    pub slots: Vec<SlotDescriptor>,
    pub sockets: Vec<SocketDescriptor>,
}

impl ConnectorTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: SlotDescriptor) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn with_socket(mut self, socket: SocketDescriptor) -> Self {
        self.sockets.push(socket);
        self
    }

    fn validate(&self, part_type: PartTypeId) -> Result<()> {
        let invalid = |reason: String| Error::InvalidTemplate { part_type, reason };
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.connector_type == ConnectorType::All {
                return Err(invalid(format!("slot {i} uses the All connector type")));
            }
            check_local(&slot.local).map_err(|r| invalid(format!("slot {i}: {r}")))?;
        }
        for (i, socket) in self.sockets.iter().enumerate() {
            if socket.connector_type == ConnectorType::All {
                return Err(invalid(format!("socket {i} uses the All connector type")));
            }
            check_local(&socket.local).map_err(|r| invalid(format!("socket {i}: {r}")))?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        for slot in &mut self.slots {
            slot.local.orientation = slot.local.orientation.normalize();
        }
        for socket in &mut self.sockets {
            socket.local.orientation = socket.local.orientation.normalize();
        }
    }
}

fn check_local(local: &Transform) -> std::result::Result<(), &'static str> {
    if !local.is_finite() {
        return Err("non-finite transform");
    }
    if local.orientation.length_squared() < 1e-6 {
        return Err("degenerate orientation");
    }
    Ok(())
}

/// A part type: identity, placement flags and connector template.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct PartType {
    pub id: PartTypeId,
    pub name: String,
    /// Whether a part of this type may be placed without an attach slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_start_assembly: bool,
    pub template: ConnectorTemplate,
}

impl PartType {
    pub fn new(id: PartTypeId, name: impl Into<String>, template: ConnectorTemplate) -> Self {
        Self {
            id,
            name: name.into(),
            can_start_assembly: false,
            template,
        }
    }

    pub fn with_can_start_assembly(mut self, can_start_assembly: bool) -> Self {
        self.can_start_assembly = can_start_assembly;
        self
    }
}

/// Lookup from part type ids to templates plus per-connector-type rules.
#[derive(Clone, Debug, Default)]
pub struct ConnectorCatalog {
    part_types: HashMap<PartTypeId, PartType>,
    rules: ConnectionRules,
}

impl ConnectorCatalog {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self {
            part_types: HashMap::new(),
            rules: ConnectionRules::new(),
        }
    }

    /// Validates and registers a part type, replacing any previous entry with the same id.
    pub fn register(&mut self, mut part_type: PartType) -> Result<()> {
        part_type.template.validate(part_type.id)?;
        part_type.template.normalize();
        self.part_types.insert(part_type.id, part_type);
        Ok(())
    }

    /// Builder variant of [`ConnectorCatalog::register`].
    pub fn with_part_type(mut self, part_type: PartType) -> Result<Self> {
        self.register(part_type)?;
        Ok(self)
    }

    /// Installs an acceptance rule for a connector type.
    pub fn with_rule<R>(mut self, connector_type: ConnectorType, rule: R) -> Self
    where
        R: ConnectionRule + 'static,
    {
        self.rules.insert(connector_type, rule);
        self
    }

    pub fn rules(&self) -> &ConnectionRules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut ConnectionRules {
        &mut self.rules
    }

    pub fn len(&self) -> usize {
        self.part_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.part_types.is_empty()
    }

    pub fn contains(&self, part_type: PartTypeId) -> bool {
        self.part_types.contains_key(&part_type)
    }

    /// Iterates registered part types in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &PartType> {
        let mut types: Vec<&PartType> = self.part_types.values().collect();
        types.sort_by_key(|t| t.id);
        types.into_iter()
    }

    pub fn get_part_type(&self, part_type: PartTypeId) -> Result<&PartType> {
        self.part_types
            .get(&part_type)
            .ok_or(Error::UnknownPartType(part_type))
    }

    pub fn get_template(&self, part_type: PartTypeId) -> Result<&ConnectorTemplate> {
        self.get_part_type(part_type).map(|t| &t.template)
    }

    pub fn can_start_assembly(&self, part_type: PartTypeId) -> Result<bool> {
        self.get_part_type(part_type).map(|t| t.can_start_assembly)
    }

    /// Number of slots a part of this type exposes.
    pub fn slot_count(&self, part_type: PartTypeId) -> Result<usize> {
        self.get_template(part_type).map(|t| t.slots.len())
    }

    /// Computes world-space slot and socket instances for a part placed at `transform`.
    pub fn materialize(
        &self,
        part_type: PartTypeId,
        owner: PartIndex,
        transform: &Transform,
    ) -> Result<(Vec<SlotInstance>, Vec<SocketInstance>)> {
        let template = self.get_template(part_type)?;
        let mut slots = Vec::with_capacity(template.slots.len());
        let mut sockets = Vec::with_capacity(template.sockets.len());
        self.materialize_into(template, owner, transform, &mut slots, &mut sockets);
        Ok((slots, sockets))
    }

    pub(crate) fn materialize_into(
        &self,
        template: &ConnectorTemplate,
        owner: PartIndex,
        transform: &Transform,
        slots: &mut Vec<SlotInstance>,
        sockets: &mut Vec<SocketInstance>,
    ) {
        slots.extend(
            template
                .slots
                .iter()
                .enumerate()
                .map(|(ordinal, d)| SlotInstance {
                    owner,
                    ordinal,
                    connector_type: d.connector_type,
                    transform: transform.compose(&d.local),
                    ignore_for_placement: d.ignore_for_placement,
                }),
        );
        sockets.extend(
            template
                .sockets
                .iter()
                .enumerate()
                .map(|(ordinal, d)| SocketInstance {
                    owner,
                    ordinal,
                    connector_type: d.connector_type,
                    transform: transform.compose(&d.local),
                }),
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Small building set shared by the crate's tests: square foundations with wall
    //! edges and neighbour sockets, and walls that stack.
    use std::f32::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;

    pub const FOUNDATION: PartTypeId = 1;
    pub const WALL: PartTypeId = 2;
    pub const PILLAR: PartTypeId = 3;
    pub const UNKNOWN: PartTypeId = 99;

    pub const HALF: f32 = 1.5;
    pub const SIZE: f32 = 3.0;
    pub const WALL_HEIGHT: f32 = 3.0;

    /// Foundation slot ordinals: walls north, east, south, west, then neighbours in the same order.
    pub const NORTH_WALL: usize = 0;
    pub const EAST_WALL: usize = 1;
    pub const SOUTH_WALL: usize = 2;
    pub const NORTH_NEIGHBOUR: usize = 4;
    pub const EAST_NEIGHBOUR: usize = 5;

    /// Wall slot ordinals.
    pub const WALL_BASE: usize = 0;
    pub const WALL_TOP: usize = 1;

    fn edges() -> [(Vec3, f32); 4] {
        [
            (Vec3::new(0.0, 0.0, HALF), 0.0),
            (Vec3::new(HALF, 0.0, 0.0), FRAC_PI_2),
            (Vec3::new(0.0, 0.0, -HALF), PI),
            (Vec3::new(-HALF, 0.0, 0.0), -FRAC_PI_2),
        ]
    }

    pub fn foundation() -> PartType {
        let mut template = ConnectorTemplate::new();
        for (offset, yaw) in edges() {
            template = template.with_slot(SlotDescriptor::new(
                ConnectorType::Wall,
                Transform::from_position_yaw(offset, yaw),
            ));
        }
        for (offset, yaw) in edges() {
            template = template.with_slot(SlotDescriptor::new(
                ConnectorType::Foundation,
                Transform::from_position_yaw(offset * 2.0, yaw),
            ));
        }
        template = template.with_socket(SocketDescriptor::new(
            ConnectorType::Foundation,
            Transform::IDENTITY,
        ));
        for (offset, yaw) in edges() {
            template = template.with_socket(SocketDescriptor::new(
                ConnectorType::Foundation,
                Transform::from_position_yaw(offset, yaw),
            ));
        }
        PartType::new(FOUNDATION, "foundation", template).with_can_start_assembly(true)
    }

    pub fn wall() -> PartType {
        let template = ConnectorTemplate::new()
            .with_slot(
                SlotDescriptor::new(ConnectorType::Foundation, Transform::IDENTITY)
                    .ignored_for_placement(),
            )
            .with_slot(SlotDescriptor::new(
                ConnectorType::Wall,
                Transform::from_position(Vec3::new(0.0, WALL_HEIGHT, 0.0)),
            ))
            .with_socket(SocketDescriptor::new(
                ConnectorType::Wall,
                Transform::IDENTITY,
            ));
        PartType::new(WALL, "wall", template)
    }

    /// A part that offers a wall socket but cannot start an assembly.
    pub fn pillar() -> PartType {
        let template = ConnectorTemplate::new().with_socket(SocketDescriptor::new(
            ConnectorType::Wall,
            Transform::IDENTITY,
        ));
        PartType::new(PILLAR, "pillar", template)
    }

    pub fn catalog() -> Arc<ConnectorCatalog> {
        Arc::new(
            ConnectorCatalog::new()
                .with_part_type(foundation())
                .and_then(|c| c.with_part_type(wall()))
                .and_then(|c| c.with_part_type(pillar()))
                .expect("test catalog is valid")
                .with_rule(ConnectorType::Wall, AlignedAxes::new(0.9)),
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::testing::*;
    use super::*;

    #[test]
    fn unknown_part_type_is_configuration_error() {
        let catalog = catalog();
        let err = catalog.get_template(UNKNOWN).unwrap_err();
        assert!(matches!(err, Error::UnknownPartType(UNKNOWN)));
    }

    #[test]
    fn slot_count_reports_template_slots() {
        let catalog = catalog();
        assert_eq!(catalog.slot_count(FOUNDATION).unwrap(), 8);
        assert_eq!(catalog.slot_count(WALL).unwrap(), 2);
        assert_eq!(catalog.slot_count(PILLAR).unwrap(), 0);
    }

    #[test]
    fn register_rejects_all_connector_in_template() {
        let template = ConnectorTemplate::new().with_socket(SocketDescriptor::new(
            ConnectorType::All,
            Transform::IDENTITY,
        ));
        let err = ConnectorCatalog::new()
            .with_part_type(PartType::new(7, "bad", template))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate { part_type: 7, .. }));
    }

    #[test]
    fn register_rejects_non_finite_offsets() {
        let template = ConnectorTemplate::new().with_slot(SlotDescriptor::new(
            ConnectorType::Wall,
            Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0)),
        ));
        let mut catalog = ConnectorCatalog::new();
        assert!(catalog.register(PartType::new(8, "nan", template)).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn register_normalizes_local_orientations() {
        let template = ConnectorTemplate::new().with_socket(SocketDescriptor::new(
            ConnectorType::Wall,
            Transform::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 2.0)),
        ));
        let catalog = ConnectorCatalog::new()
            .with_part_type(PartType::new(9, "scaled", template))
            .unwrap();
        let stored = catalog.get_template(9).unwrap().sockets[0].local.orientation;
        assert!(stored.is_normalized());
    }

    #[test]
    fn materialize_applies_part_transform() {
        let catalog = catalog();
        let part = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        let (slots, sockets) = catalog.materialize(FOUNDATION, 4, &part).unwrap();
        assert_eq!(slots.len(), 8);
        assert_eq!(sockets.len(), 5);
        assert_eq!(slots[NORTH_WALL].owner, 4);
        assert_eq!(slots[NORTH_WALL].ordinal, NORTH_WALL);
        assert!(slots[NORTH_WALL]
            .transform
            .position
            .abs_diff_eq(Vec3::new(10.0, 0.0, HALF), 1e-5));
        assert!(slots[EAST_NEIGHBOUR]
            .transform
            .position
            .abs_diff_eq(Vec3::new(10.0 + SIZE, 0.0, 0.0), 1e-5));
        assert_eq!(sockets[0].transform.position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn iter_is_sorted_by_id() {
        let catalog = catalog();
        let ids: Vec<_> = catalog.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![FOUNDATION, WALL, PILLAR]);
    }
}
