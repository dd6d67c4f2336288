//! The house kit used by the demos, loaded from the bundled RON asset.
use std::sync::Arc;

use anyhow::Context;
use glam::Vec3;
use modular_building::prelude::*;
use tracing::info;

use crate::assets::CatalogAsset;
use crate::rendering::PartStyle;

pub const HOUSE: AssemblyTypeId = 1;

pub const FOUNDATION: PartTypeId = 1;
pub const WALL: PartTypeId = 2;
pub const CEILING: PartTypeId = 3;

/// Edge length of foundations and ceilings.
pub const TILE: f32 = 3.0;

/// Foundation and ceiling wall slots, north/east/south/west.
pub const EDGE_WALLS: [usize; 4] = [0, 1, 2, 3];
/// Foundation slot that holds a ceiling tile.
pub const FOUNDATION_CEILING: usize = 8;
pub const WALL_TOP: usize = 1;

const HOUSE_KIT_RON: &str = include_str!("../assets/house_kit.ron");

pub fn house_kit() -> anyhow::Result<Arc<ConnectorCatalog>> {
    CatalogAsset::from_ron_str(HOUSE_KIT_RON)?.to_catalog()
}

pub fn house_styles() -> Vec<PartStyle> {
    vec![
        PartStyle::square(FOUNDATION, [181, 164, 140], TILE),
        PartStyle::square(CEILING, [150, 170, 190], TILE * 0.8),
        PartStyle::segment(WALL, [90, 70, 60], TILE, 0.3),
    ]
}

/// Slot `ordinal` of part `part` from the last rebuild.
pub fn slot(assembly: &Assembly, part: PartIndex, ordinal: usize) -> anyhow::Result<SlotInstance> {
    assembly
        .slots_of(part)
        .get(ordinal)
        .copied()
        .with_context(|| format!("part {part} has no slot {ordinal}"))
}

/// Snaps a `side x side` block of foundations together through placement queries,
/// then closes every outer edge with a wall. Returns a clean assembly.
pub fn build_walled_block(catalog: Arc<ConnectorCatalog>, side: usize) -> anyhow::Result<Assembly> {
    let mut assembly = Assembly::new(HOUSE, Transform::IDENTITY, catalog.clone());
    assembly.add_part(FOUNDATION, None)?;
    assembly.rebuild()?;

    let query = PlacementQuery::new(&catalog);
    // Row by row, so every cell after the first has a placed neighbour.
    for z in 0..side {
        for x in 0..side {
            if x == 0 && z == 0 {
                continue;
            }
            let candidate =
                Transform::from_position(Vec3::new(x as f32 * TILE, 0.0, z as f32 * TILE));
            let placement = query.evaluate(Some(&assembly), candidate, FOUNDATION)?;
            anyhow::ensure!(
                placement.allowed && placement.matched_slot.is_some(),
                "foundation at ({x}, {z}) did not snap"
            );
            placement.commit(&mut assembly)?;
            assembly.rebuild()?;
        }
    }

    let outer_edges: Vec<SlotInstance> = assembly
        .slots()
        .iter()
        .filter(|s| s.connector_type == ConnectorType::Wall)
        .filter(|s| {
            assembly
                .slots_at_position(s.transform.position, ConnectorType::Wall, Some(s.owner))
                .is_empty()
        })
        .copied()
        .collect();
    for edge in &outer_edges {
        assembly.add_part(WALL, Some(edge))?;
    }
    let summary = assembly.rebuild()?;
    info!(
        "Walled block: {} parts, {} of {} slots occupied.",
        summary.parts, summary.occupied_slots, summary.slots
    );
    Ok(assembly)
}
