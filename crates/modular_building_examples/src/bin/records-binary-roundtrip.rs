use modular_building::prelude::*;
use modular_building_examples::{
    build_walled_block, house_kit, house_styles, init_tracing, render_assembly_to_png,
    RenderConfig, HOUSE,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let catalog = house_kit()?;
    let original = build_walled_block(catalog.clone(), 3)?;

    let path = std::env::temp_dir().join("modular-building-demo.bin");
    let bytes = AssemblyRecord::from_assembly(&original).to_bytes()?;
    std::fs::write(&path, &bytes)?;
    info!("Saved {} parts in {} bytes to {}.", original.len(), bytes.len(), path.display());

    let mut registry = AssemblyRegistry::new();
    registry.register_type(HOUSE, catalog);
    let mut file = std::fs::File::open(&path)?;
    let record = AssemblyRecord::read_from(&mut file)?;
    let id = registry.insert_record(&record)?;
    let loaded = registry
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("assembly {id:?} missing"))?;

    let same = original
        .graph()
        .adjacency()
        .zip(loaded.graph().adjacency())
        .all(|(a, b)| a == b);
    anyhow::ensure!(same, "adjacency changed across save/load");
    info!("Reloaded assembly {id:?}: adjacency identical.");

    render_assembly_to_png(
        loaded,
        &house_styles(),
        None,
        &RenderConfig::default(),
        "records-binary-roundtrip.png",
    )?;
    Ok(())
}
