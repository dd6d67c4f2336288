//! Top-down PNG rendering of assemblies.
//!
//! The view looks down the -Y axis with +Z pointing up in the image. Heights are
//! ignored, so stacked parts overdraw each other in part order.
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use modular_building::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Shape drawn for a part, in part-local X/Z.
#[derive(Clone, Copy, Debug)]
pub enum Footprint {
    /// Axis-aligned square centred on the part origin.
    Square { size: f32 },
    /// Bar along local X, as used for walls.
    Segment { length: f32, thickness: f32 },
}

impl Footprint {
    fn radius(&self) -> f32 {
        match *self {
            Footprint::Square { size } => size * std::f32::consts::FRAC_1_SQRT_2,
            Footprint::Segment { length, thickness } => 0.5 * length.hypot(thickness),
        }
    }

    fn contains(&self, local: Vec2) -> bool {
        match *self {
            Footprint::Square { size } => local.x.abs() <= size * 0.5 && local.y.abs() <= size * 0.5,
            Footprint::Segment { length, thickness } => {
                local.x.abs() <= length * 0.5 && local.y.abs() <= thickness * 0.5
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PartStyle {
    pub part_type: PartTypeId,
    pub color: [u8; 3],
    pub footprint: Footprint,
}

impl PartStyle {
    pub fn square(part_type: PartTypeId, color: [u8; 3], size: f32) -> Self {
        Self {
            part_type,
            color,
            footprint: Footprint::Square { size },
        }
    }

    pub fn segment(part_type: PartTypeId, color: [u8; 3], length: f32, thickness: f32) -> Self {
        Self {
            part_type,
            color,
            footprint: Footprint::Segment { length, thickness },
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub pixels_per_unit: f32,
    pub margin_px: u32,
    pub background: [u8; 3],
    /// Draw a dot per placement-visible slot: green when free, red when occupied.
    pub draw_slots: bool,
    pub max_size_px: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 24.0,
            margin_px: 16,
            background: [245, 245, 240],
            draw_slots: true,
            max_size_px: 4096,
        }
    }
}

impl RenderConfig {
    pub fn with_pixels_per_unit(mut self, pixels_per_unit: f32) -> Self {
        self.pixels_per_unit = pixels_per_unit;
        self
    }

    pub fn with_draw_slots(mut self, draw_slots: bool) -> Self {
        self.draw_slots = draw_slots;
        self
    }
}

const FREE_SLOT: [u8; 3] = [40, 170, 70];
const OCCUPIED_SLOT: [u8; 3] = [200, 50, 50];
const PREVIEW_ALLOWED: [u8; 3] = [70, 130, 230];
const PREVIEW_REJECTED: [u8; 3] = [240, 140, 40];

struct View {
    min: Vec2,
    max: Vec2,
    ppu: f32,
    margin: f32,
}

impl View {
    fn to_pixel(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x - self.min.x) * self.ppu + self.margin,
            (self.max.y - p.y) * self.ppu + self.margin,
        )
    }

    fn to_world(&self, px: Vec2) -> Vec2 {
        Vec2::new(
            (px.x - self.margin) / self.ppu + self.min.x,
            self.max.y - (px.y - self.margin) / self.ppu,
        )
    }
}

fn ground(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Renders parts, slot occupancy and an optional placement preview to a PNG file.
pub fn render_assembly_to_png(
    assembly: &Assembly,
    styles: &[PartStyle],
    preview: Option<&Placement>,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.pixels_per_unit.is_finite() && config.pixels_per_unit > 0.0,
        "pixels_per_unit must be > 0"
    );
    let pad = styles
        .iter()
        .map(|s| s.footprint.radius())
        .fold(1.0f32, f32::max);

    let mut points: Vec<Vec2> = assembly
        .parts()
        .iter()
        .map(|p| ground(p.transform.position))
        .collect();
    if let Some(placement) = preview {
        points.push(ground(placement.transform.position));
    }
    let (min, max) = points.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    );
    let (min, max) = if points.is_empty() {
        (Vec2::splat(-pad), Vec2::splat(pad))
    } else {
        (min - Vec2::splat(pad), max + Vec2::splat(pad))
    };

    let view = View {
        min,
        max,
        ppu: config.pixels_per_unit,
        margin: config.margin_px as f32,
    };
    let extent = (max - min) * view.ppu;
    let width = extent.x.ceil() as u32 + 2 * config.margin_px;
    let height = extent.y.ceil() as u32 + 2 * config.margin_px;
    anyhow::ensure!(
        width <= config.max_size_px && height <= config.max_size_px,
        "image would be {width}x{height} px, above the {} px limit",
        config.max_size_px
    );

    let mut img = RgbImage::from_pixel(width, height, Rgb(config.background));

    for part in assembly.parts() {
        match styles.iter().find(|s| s.part_type == part.part_type) {
            Some(style) => fill_footprint(&mut img, &view, &part.transform, style.footprint, style.color),
            None => warn!("No style for part type {}; skipping.", part.part_type),
        }
    }

    if let Some(placement) = preview {
        let color = if placement.allowed {
            PREVIEW_ALLOWED
        } else {
            PREVIEW_REJECTED
        };
        let footprint = styles
            .iter()
            .find(|s| s.part_type == placement.part_type)
            .map(|s| s.footprint)
            .unwrap_or(Footprint::Square { size: 1.0 });
        fill_footprint(&mut img, &view, &placement.transform, footprint, color);
    }

    if config.draw_slots {
        for slot in assembly.slots() {
            if slot.ignore_for_placement {
                continue;
            }
            let free = assembly
                .is_slot_free(slot.owner, slot.ordinal)
                .unwrap_or(true);
            let color = if free { FREE_SLOT } else { OCCUPIED_SLOT };
            fill_dot(&mut img, view.to_pixel(ground(slot.transform.position)), 2, color);
        }
    }

    let path = path.as_ref();
    img.save(path)?;
    info!("Wrote {} ({}x{}).", path.display(), width, height);
    Ok(())
}

fn fill_footprint(
    img: &mut RgbImage,
    view: &View,
    transform: &Transform,
    footprint: Footprint,
    color: [u8; 3],
) {
    let center = ground(transform.position);
    let r = Vec2::splat(footprint.radius());
    // Image Y grows downwards, so the world max corner maps to the pixel min corner.
    let lo = view.to_pixel(Vec2::new(center.x - r.x, center.y + r.y)).floor();
    let hi = view.to_pixel(Vec2::new(center.x + r.x, center.y - r.y)).ceil();
    let inverse = transform.orientation.inverse();

    let x0 = lo.x.max(0.0) as u32;
    let y0 = lo.y.max(0.0) as u32;
    let x1 = (hi.x.max(0.0) as u32).min(img.width());
    let y1 = (hi.y.max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            let world = view.to_world(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
            let offset = Vec3::new(world.x - center.x, 0.0, world.y - center.y);
            let local = inverse * offset;
            if footprint.contains(Vec2::new(local.x, local.z)) {
                img.put_pixel(px, py, Rgb(color));
            }
        }
    }
}

fn fill_dot(img: &mut RgbImage, at: Vec2, radius: i32, color: [u8; 3]) {
    let (cx, cy) = (at.x as i32, at.y as i32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}
