use modular_building::prelude::*;
use modular_building_examples::{
    build_walled_block, house_kit, house_styles, init_tracing, render_assembly_to_png,
    RenderConfig, EDGE_WALLS, FOUNDATION,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let catalog = house_kit()?;

    // A 4x4 block of foundations closed by walls on the outside.
    let assembly = build_walled_block(catalog, 4)?;

    let mut walled = 0;
    let mut open = 0;
    for (part, p) in assembly.parts().iter().enumerate() {
        if p.part_type != FOUNDATION {
            continue;
        }
        for ordinal in EDGE_WALLS {
            match assembly.occupant(part, ordinal)? {
                Occupancy::Occupied(_) => walled += 1,
                Occupancy::Free => open += 1,
            }
        }
    }
    info!("Foundation edges: {walled} walled, {open} open (interior).");

    render_assembly_to_png(
        &assembly,
        &house_styles(),
        None,
        &RenderConfig::default(),
        "assembly-walled-block.png",
    )?;
    Ok(())
}
