#![allow(dead_code)]
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec3;
use modular_building::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const FOUNDATION: PartTypeId = 1;
pub const WALL: PartTypeId = 2;
pub const TILE: f32 = 3.0;

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

fn edges() -> [(Vec3, f32); 4] {
    let half = TILE * 0.5;
    [
        (Vec3::new(0.0, 0.0, half), 0.0),
        (Vec3::new(half, 0.0, 0.0), FRAC_PI_2),
        (Vec3::new(0.0, 0.0, -half), PI),
        (Vec3::new(-half, 0.0, 0.0), -FRAC_PI_2),
    ]
}

/// Square foundations with wall slots on each edge, plus walls.
pub fn catalog() -> Arc<ConnectorCatalog> {
    let mut foundation = ConnectorTemplate::new().with_socket(SocketDescriptor::new(
        ConnectorType::Foundation,
        Transform::IDENTITY,
    ));
    for (offset, yaw) in edges() {
        foundation = foundation
            .with_slot(SlotDescriptor::new(
                ConnectorType::Wall,
                Transform::from_position_yaw(offset, yaw),
            ))
            .with_slot(SlotDescriptor::new(
                ConnectorType::Foundation,
                Transform::from_position_yaw(offset * 2.0, yaw),
            ));
    }
    let wall = ConnectorTemplate::new()
        .with_slot(SlotDescriptor::new(
            ConnectorType::Wall,
            Transform::from_position(Vec3::new(0.0, TILE, 0.0)),
        ))
        .with_socket(SocketDescriptor::new(ConnectorType::Wall, Transform::IDENTITY));

    let catalog = ConnectorCatalog::new()
        .with_part_type(
            PartType::new(FOUNDATION, "foundation", foundation).with_can_start_assembly(true),
        )
        .and_then(|c| c.with_part_type(PartType::new(WALL, "wall", wall)))
        .expect("bench catalog is valid")
        .with_rule(ConnectorType::Wall, AlignedAxes::new(0.9));
    Arc::new(catalog)
}

/// A `side x side` grid of foundations with a wall on every north edge. Left dirty.
pub fn foundation_grid(side: usize, spatial_index: bool) -> Assembly {
    let config = AssemblyConfig::default().with_spatial_index(spatial_index);
    let mut assembly = Assembly::try_new(1, Transform::IDENTITY, catalog(), config)
        .expect("bench config is valid");
    let mut parts = Vec::with_capacity(side * side * 2);
    for z in 0..side {
        for x in 0..side {
            let center = Vec3::new(x as f32 * TILE, 0.0, z as f32 * TILE);
            parts.push(Part::new(FOUNDATION, Transform::from_position(center)));
            parts.push(Part::new(
                WALL,
                Transform::from_position(center + Vec3::new(0.0, 0.0, TILE * 0.5)),
            ));
        }
    }
    assembly.replace_parts(parts);
    assembly
}
