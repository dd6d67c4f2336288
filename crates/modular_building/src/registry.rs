//! Registry of assembly types and the assemblies created from them.
//!
//! Each assembly type owns a shared [`ConnectorCatalog`]. Assemblies are independent
//! of each other; the registry only stores them and answers "which assembly is the
//! player aiming at" via [`AssemblyRegistry::assembly_in_range`].
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::Vec3;
use tracing::debug;

use crate::assembly::{Assembly, AssemblyConfig};
use crate::catalog::{AssemblyTypeId, ConnectorCatalog, PartTypeId};
use crate::connector::ConnectorType;
use crate::error::{Error, Result};
use crate::record::AssemblyRecord;
use crate::transform::Transform;

/// Handle of an assembly inside an [`AssemblyRegistry`]. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyId(pub u64);

#[derive(Debug, Default)]
pub struct AssemblyRegistry {
    types: HashMap<AssemblyTypeId, Arc<ConnectorCatalog>>,
    assemblies: BTreeMap<AssemblyId, Assembly>,
    config: AssemblyConfig,
    next_id: u64,
}

impl AssemblyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration used for assemblies created afterwards.
    pub fn with_config(mut self, config: AssemblyConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Registers or replaces the catalog of an assembly type. Existing assemblies keep
    /// the catalog they were created with.
    pub fn register_type(&mut self, assembly_type: AssemblyTypeId, catalog: Arc<ConnectorCatalog>) {
        self.types.insert(assembly_type, catalog);
    }

    pub fn catalog(&self, assembly_type: AssemblyTypeId) -> Result<&Arc<ConnectorCatalog>> {
        self.types
            .get(&assembly_type)
            .ok_or(Error::UnknownAssemblyType(assembly_type))
    }

    /// Number of slots a part type declares within an assembly type.
    pub fn slot_count(&self, assembly_type: AssemblyTypeId, part_type: PartTypeId) -> Result<usize> {
        self.catalog(assembly_type)?.slot_count(part_type)
    }

    /// Creates an empty assembly of a registered type.
    pub fn create(&mut self, assembly_type: AssemblyTypeId, anchor: Transform) -> Result<AssemblyId> {
        let catalog = self.catalog(assembly_type)?.clone();
        let assembly = Assembly::try_new(assembly_type, anchor, catalog, self.config)?;
        Ok(self.insert(assembly))
    }

    /// Loads a persisted assembly with the catalog of its type.
    pub fn insert_record(&mut self, record: &AssemblyRecord) -> Result<AssemblyId> {
        let catalog = self.catalog(record.assembly_type)?.clone();
        let assembly = record.into_assembly(catalog, self.config)?;
        Ok(self.insert(assembly))
    }

    fn insert(&mut self, assembly: Assembly) -> AssemblyId {
        let id = AssemblyId(self.next_id);
        self.next_id += 1;
        debug!(
            "Registered assembly {:?} of type {} with {} parts.",
            id,
            assembly.assembly_type(),
            assembly.len()
        );
        self.assemblies.insert(id, assembly);
        id
    }

    pub fn get(&self, id: AssemblyId) -> Option<&Assembly> {
        self.assemblies.get(&id)
    }

    pub fn get_mut(&mut self, id: AssemblyId) -> Option<&mut Assembly> {
        self.assemblies.get_mut(&id)
    }

    pub fn remove(&mut self, id: AssemblyId) -> Option<Assembly> {
        self.assemblies.remove(&id)
    }

    /// Assemblies in id order.
    pub fn iter(&self) -> impl Iterator<Item = (AssemblyId, &Assembly)> {
        self.assemblies.iter().map(|(id, a)| (*id, a))
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// The assembly whose closest placement slot (of any type) lies within
    /// `max_distance` of `position`. Dirty assemblies are skipped; the lowest id wins
    /// among equally close assemblies.
    pub fn assembly_in_range(&self, position: Vec3, max_distance: f32) -> Option<AssemblyId> {
        let max_sq = max_distance * max_distance;
        let mut best: Option<(AssemblyId, f32)> = None;
        for (id, assembly) in self.iter().filter(|(_, a)| a.is_clean()) {
            let Some(slot) = assembly.closest_slot(position, ConnectorType::All, true) else {
                continue;
            };
            let d2 = slot.transform.distance_squared(position);
            if d2 <= max_sq && best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((id, d2));
            }
        }
        best.map(|(id, _)| id)
    }
}
