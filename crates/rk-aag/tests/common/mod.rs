//! Shared model fixtures for the integration tests

#![allow(dead_code)]

use glam::DVec3;
use rk_aag::kernel::Axis;
use rk_aag::{Aag, AngleType, FaceId, MemoryKernel, ShapeData};

/// Install a log subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Faces of the plate fixtures
pub struct Plate {
    pub top: FaceId,
    pub bottom: FaceId,
    pub walls: [FaceId; 4],
    pub lateral: FaceId,
    pub cap: Option<FaceId>,
}

/// 20 x 20 x `thickness` plate with outer walls, returned with its face IDs
fn plate(data: &mut ShapeData, thickness: f64) -> (FaceId, FaceId, [FaceId; 4]) {
    let top = data.add_plane(DVec3::new(0.0, 0.0, thickness), DVec3::Z);
    let bottom = data.add_plane(DVec3::ZERO, -DVec3::Z);
    let half = thickness * 0.5;
    let walls = [
        data.add_plane(DVec3::new(-10.0, 0.0, half), -DVec3::X),
        data.add_plane(DVec3::new(10.0, 0.0, half), DVec3::X),
        data.add_plane(DVec3::new(0.0, -10.0, half), -DVec3::Y),
        data.add_plane(DVec3::new(0.0, 10.0, half), DVec3::Y),
    ];
    for wall in walls {
        data.add_edge(&[top, wall]);
        data.add_edge(&[bottom, wall]);
    }
    // -X/+X walls meet both Y walls at the vertical corners
    for x in &walls[..2] {
        for y in &walls[2..] {
            data.add_edge(&[*x, *y]);
        }
    }
    (top, bottom, walls)
}

/// Plate with one cylindrical hole through its whole thickness
pub fn plate_with_through_hole(radius: f64) -> (ShapeData, Plate) {
    let mut data = ShapeData::new();
    let (top, bottom, walls) = plate(&mut data, 4.0);
    let axis = Axis::new(DVec3::ZERO, DVec3::Z);
    let lateral = data.add_cylinder(axis, radius, DVec3::new(radius, 0.0, 2.0));
    data.add_edge(&[top, lateral]);
    data.add_edge(&[lateral, bottom]);
    (
        data,
        Plate {
            top,
            bottom,
            walls,
            lateral,
            cap: None,
        },
    )
}

/// Plate with a blind hole ending in a flat cap
pub fn plate_with_blind_hole(radius: f64) -> (ShapeData, Plate) {
    let mut data = ShapeData::new();
    let (top, bottom, walls) = plate(&mut data, 4.0);
    let axis = Axis::new(DVec3::ZERO, DVec3::Z);
    let lateral = data.add_cylinder(axis, radius, DVec3::new(radius, 0.0, 3.0));
    let cap = data.add_plane(DVec3::new(0.0, 0.0, 2.0), DVec3::Z);
    data.add_edge(&[top, lateral]);
    data.add_edge(&[lateral, cap]);
    (
        data,
        Plate {
            top,
            bottom,
            walls,
            lateral,
            cap: Some(cap),
        },
    )
}

/// Closed ring of `n` faces joined by edges of the given angle
pub fn ring(n: u32, angle: AngleType) -> ShapeData {
    let mut data = ShapeData::new();
    let faces: Vec<FaceId> = (0..n)
        .map(|i| {
            let phi = std::f64::consts::TAU * i as f64 / n as f64;
            let normal = DVec3::new(phi.cos(), phi.sin(), 0.0);
            data.add_plane(normal * 3.0, -normal)
        })
        .collect();
    for i in 0..faces.len() {
        data.add_edge_with_angle(&[faces[i], faces[(i + 1) % faces.len()]], angle);
    }
    data
}

/// Store `data` in a fresh kernel and build its graph
pub fn build(data: ShapeData) -> (MemoryKernel, Aag) {
    let kernel = MemoryKernel::new();
    let shape = kernel.insert(data);
    let aag = Aag::build(&kernel, &shape).expect("fixture must build");
    (kernel, aag)
}

/// Face IDs from plain numbers
pub fn ids(ids: &[u32]) -> Vec<FaceId> {
    ids.iter().copied().map(FaceId).collect()
}
