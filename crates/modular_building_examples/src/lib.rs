#![forbid(unsafe_code)]

mod assets;
mod kit;
mod rendering;

pub use assets::{CatalogAsset, ConnectorDef, PartTypeDef, RuleDef};
pub use kit::{
    build_walled_block, house_kit, house_styles, slot, CEILING, EDGE_WALLS, FOUNDATION,
    FOUNDATION_CEILING, HOUSE, TILE, WALL, WALL_TOP,
};
pub use rendering::{init_tracing, render_assembly_to_png, Footprint, PartStyle, RenderConfig};
