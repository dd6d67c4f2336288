use glam::Vec3;
use modular_building::prelude::*;
use modular_building_examples::{
    build_walled_block, house_kit, house_styles, init_tracing, render_assembly_to_png,
    RenderConfig, CEILING, TILE, WALL,
};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let catalog = house_kit()?;
    let mut assembly = build_walled_block(catalog.clone(), 2)?;
    let query = PlacementQuery::new(&catalog).with_config(PlacementConfig::new(0.5))?;
    let mut rng = StdRng::seed_from_u64(7);

    // Simulate a player waving a wall around the block: most candidates snap to an
    // occupied outer edge or to nothing, a few to the open wall tops.
    let mut last_preview = None;
    let mut committed = 0;
    for attempt in 0..64 {
        let position = Vec3::new(
            rng.random::<f32>() * 2.0 * TILE - 0.5 * TILE,
            if rng.random::<bool>() { 0.0 } else { TILE },
            rng.random::<f32>() * 2.0 * TILE - 0.5 * TILE,
        );
        let yaw = (rng.random::<u32>() % 4) as f32 * std::f32::consts::FRAC_PI_2;
        let candidate = Transform::from_position_yaw(position, yaw);

        let placement = query.evaluate(Some(&assembly), candidate, WALL)?;
        if let Some(slot) = placement.matched_slot {
            info!(
                "Attempt {attempt}: snapped to slot {} of part {} (occupied: {}).",
                slot.ordinal, slot.owner, placement.occupied
            );
        }
        if placement.allowed {
            placement.commit(&mut assembly)?;
            assembly.rebuild()?;
            committed += 1;
        }
        last_preview = Some(placement);
    }
    info!("Committed {committed} walls; {} parts total.", assembly.len());

    // A ceiling held above the block snaps to the nearest free ceiling slot.
    let ceiling = query.evaluate(
        Some(&assembly),
        Transform::from_position(Vec3::new(0.2, TILE, 0.1)),
        CEILING,
    )?;
    info!(
        "Ceiling preview: allowed = {}, matched = {:?}.",
        ceiling.allowed,
        ceiling.matched_slot.map(|s| s.slot_ref())
    );

    render_assembly_to_png(
        &assembly,
        &house_styles(),
        last_preview.as_ref().or(Some(&ceiling)),
        &RenderConfig::default(),
        "placement-snap-preview.png",
    )?;
    Ok(())
}
