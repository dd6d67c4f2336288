use std::path::PathBuf;

use modular_building::prelude::*;
use modular_building_examples::{
    init_tracing, render_assembly_to_png, slot, CatalogAsset, PartStyle, RenderConfig, CEILING,
    EDGE_WALLS, FOUNDATION, FOUNDATION_CEILING, HOUSE, TILE, WALL, WALL_TOP,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/house_kit.ron");
    let asset = CatalogAsset::load(&path)?;
    let catalog = asset.to_catalog()?;
    for part_type in catalog.iter() {
        info!(
            "Part type {} ({}): {} slots, starts assemblies: {}.",
            part_type.id,
            part_type.name,
            catalog.slot_count(part_type.id)?,
            part_type.can_start_assembly
        );
    }

    let mut assembly = Assembly::new(HOUSE, Transform::IDENTITY, catalog);
    let root = assembly.add_part(FOUNDATION, None)?;
    assembly.rebuild()?;

    // Ground floor walls, then a ceiling, then the upper storey walls on the ceiling.
    let mut walls = Vec::new();
    for ordinal in EDGE_WALLS {
        let edge = slot(&assembly, root, ordinal)?;
        walls.push(assembly.add_part(WALL, Some(&edge))?);
    }
    let above = slot(&assembly, root, FOUNDATION_CEILING)?;
    let ceiling = assembly.add_part(CEILING, Some(&above))?;
    assembly.rebuild()?;

    for ordinal in EDGE_WALLS {
        let edge = slot(&assembly, ceiling, ordinal)?;
        assembly.add_part(WALL, Some(&edge))?;
    }
    let summary = assembly.rebuild()?;
    info!(
        "Two storeys: {} parts, {} of {} slots occupied.",
        summary.parts, summary.occupied_slots, summary.slots
    );
    for wall in walls {
        info!(
            "Ground wall {wall} top slot: {:?}.",
            assembly.occupant(wall, WALL_TOP)?
        );
    }

    let styles = [
        PartStyle::square(FOUNDATION, [181, 164, 140], TILE),
        PartStyle::square(CEILING, [150, 170, 190], TILE * 0.8),
        PartStyle::segment(WALL, [90, 70, 60], TILE, 0.3),
    ];
    render_assembly_to_png(
        &assembly,
        &styles,
        None,
        &RenderConfig::default().with_pixels_per_unit(48.0),
        "catalog-two-storey.png",
    )?;
    Ok(())
}
