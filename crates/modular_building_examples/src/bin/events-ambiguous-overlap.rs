use modular_building::prelude::*;
use modular_building_examples::{house_kit, init_tracing, slot, EDGE_WALLS, FOUNDATION, HOUSE, WALL};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let catalog = house_kit()?;
    let mut assembly = Assembly::new(HOUSE, Transform::IDENTITY, catalog);

    let mut sink = FnSink::new(|event: AssemblyEvent| match event {
        AssemblyEvent::PartAdded { index, part } => {
            info!("+ part {index} (type {})", part.part_type)
        }
        AssemblyEvent::PartRemoved {
            index,
            relocated_from,
            ..
        } => info!("- part {index}, relocated from {relocated_from:?}"),
        AssemblyEvent::RebuildFinished { summary } => info!(
            "rebuilt: {} parts, {} occupied slots, {} ambiguous",
            summary.parts,
            summary.occupied_slots,
            summary.ambiguities.len()
        ),
        AssemblyEvent::AmbiguousAdjacency(a) => info!(
            "slot {} of part {} matched parts {:?}, kept {}",
            a.slot.ordinal, a.slot.part, a.candidates, a.chosen
        ),
        other => info!("{other:?}"),
    })
    .only([
        AssemblyEventKind::PartAdded,
        AssemblyEventKind::PartRemoved,
        AssemblyEventKind::RebuildFinished,
        AssemblyEventKind::AmbiguousAdjacency,
        AssemblyEventKind::Warning,
    ]);

    let root = assembly.add_part_with_events(FOUNDATION, None, &mut sink)?;
    assembly.rebuild_with_events(&mut sink)?;

    // Two walls on the same edge: both adds pass because the table is only refreshed
    // by a rebuild, which then reports the overlap instead of failing.
    let north = slot(&assembly, root, EDGE_WALLS[0])?;
    assembly.add_part_with_events(WALL, Some(&north), &mut sink)?;
    let duplicate = assembly.add_part_with_events(WALL, Some(&north), &mut sink)?;
    assembly.rebuild_with_events(&mut sink)?;

    // Removing the duplicate resolves the overlap.
    assembly.remove_part_with_events(duplicate, &mut sink)?;
    assembly.rebuild_with_events(&mut sink)?;
    Ok(())
}
