//! In-memory descriptor kernel
//!
//! Shapes are described explicitly as a list of analytic faces plus an
//! edge → faces table. This is enough to build an AAG and answer every
//! recognizer predicate without a native B-Rep library, and it is what the
//! test suites build their models with.

use glam::DVec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    AngleType, EdgeFaces, EdgeId, FaceId, FaceIndex, GeometryKernel, KernelError, KernelResult,
    Shape,
};
use crate::config::RecognitionConfig;
use crate::constants::{ANGULAR_TOLERANCE, LINEAR_TOLERANCE};

/// Infinite plane through `origin`; `normal` points out of the material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: DVec3,
    pub normal: DVec3,
}

/// Axis line used by surfaces of revolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Axis {
    /// Create an axis from origin and direction
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Check if two axes lie on the same line (direction sign ignored)
    fn is_coaxial(&self, other: &Axis, tol: &Tolerances) -> bool {
        if !tol.is_parallel(self.direction, other.direction) {
            return false;
        }
        let offset = other.origin - self.origin;
        offset.cross(self.direction).length() < tol.linear
    }
}

/// Cylindrical surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub axis: Axis,
    pub radius: f64,
}

/// Conical surface given by apex, axis direction and half angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub apex: DVec3,
    pub direction: DVec3,
    pub half_angle: f64,
}

/// Spherical surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

/// The untrimmed surface a face lies on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FaceSurface {
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    /// Surface the kernel cannot reason about (freeform, offset, ...)
    Unknown,
}

impl FaceSurface {
    fn signature(&self) -> Option<u64> {
        match self {
            FaceSurface::Plane(_) => Some(1),
            FaceSurface::Cylinder(_) => Some(2),
            FaceSurface::Cone(_) => Some(3),
            FaceSurface::Sphere(_) => Some(4),
            FaceSurface::Unknown => None,
        }
    }
}

/// A face description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    pub surface: FaceSurface,
    /// A point inside the trimmed face, used for angle classification
    pub centroid: DVec3,
}

/// An edge description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub faces: Vec<FaceId>,
    /// Explicit classification; computed from planar geometry when absent
    pub angle: Option<AngleType>,
}

/// Explicit description of a B-Rep shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeData {
    faces: Vec<FaceData>,
    edges: Vec<EdgeData>,
}

impl ShapeData {
    /// Create an empty shape description
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a face and return its 1-based ID
    pub fn add_face(&mut self, surface: FaceSurface, centroid: DVec3) -> FaceId {
        self.faces.push(FaceData { surface, centroid });
        FaceId(self.faces.len() as u32)
    }

    /// Add a planar face centred on `centroid`
    pub fn add_plane(&mut self, centroid: DVec3, normal: DVec3) -> FaceId {
        let plane = Plane {
            origin: centroid,
            normal: normal.normalize(),
        };
        self.add_face(FaceSurface::Plane(plane), centroid)
    }

    /// Add a cylindrical face
    pub fn add_cylinder(&mut self, axis: Axis, radius: f64, centroid: DVec3) -> FaceId {
        self.add_face(FaceSurface::Cylinder(Cylinder { axis, radius }), centroid)
    }

    /// Add a face the kernel cannot classify
    pub fn add_unknown(&mut self, centroid: DVec3) -> FaceId {
        self.add_face(FaceSurface::Unknown, centroid)
    }

    /// Add an edge bounding the given faces and return its 1-based ID
    pub fn add_edge(&mut self, faces: &[FaceId]) -> EdgeId {
        self.edges.push(EdgeData {
            faces: faces.to_vec(),
            angle: None,
        });
        EdgeId(self.edges.len() as u32)
    }

    /// Add an edge with an explicit angle classification
    pub fn add_edge_with_angle(&mut self, faces: &[FaceId], angle: AngleType) -> EdgeId {
        self.edges.push(EdgeData {
            faces: faces.to_vec(),
            angle: Some(angle),
        });
        EdgeId(self.edges.len() as u32)
    }

    /// Override the angle classification of an existing edge
    pub fn set_edge_angle(&mut self, edge: EdgeId, angle: AngleType) -> bool {
        match edge
            .index()
            .checked_sub(1)
            .and_then(|i| self.edges.get_mut(i as usize))
        {
            Some(data) => {
                data.angle = Some(angle);
                true
            }
            None => false,
        }
    }

    /// Axis-aligned box with outward normals
    ///
    /// Faces are numbered -X, +X, -Y, +Y, -Z, +Z; every edge is convex.
    pub fn cuboid(min: DVec3, max: DVec3) -> Self {
        let mut data = Self::new();
        let center = (min + max) * 0.5;
        let mut faces = Vec::with_capacity(6);
        for axis in 0..3 {
            let unit = DVec3::AXES[axis];
            let mut low = center;
            low[axis] = min[axis];
            let mut high = center;
            high[axis] = max[axis];
            faces.push(data.add_plane(low, -unit));
            faces.push(data.add_plane(high, unit));
        }
        // Opposite faces never touch; every other pair shares one edge
        for i in 0..faces.len() {
            for j in (i + 1)..faces.len() {
                if i / 2 != j / 2 {
                    data.add_edge(&[faces[i], faces[j]]);
                }
            }
        }
        data
    }

    fn face(&self, face: FaceId) -> KernelResult<&FaceData> {
        face.slot()
            .and_then(|slot| self.faces.get(slot))
            .ok_or(KernelError::UnknownFace(face))
    }

    fn edge(&self, edge: EdgeId) -> KernelResult<&EdgeData> {
        (edge.index() as usize)
            .checked_sub(1)
            .and_then(|slot| self.edges.get(slot))
            .ok_or(KernelError::UnknownEdge(edge))
    }
}

/// Geometric comparison tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tolerances {
    linear: f64,
    angular: f64,
}

impl Tolerances {
    /// Check if two directions are parallel or anti-parallel
    fn is_parallel(&self, a: DVec3, b: DVec3) -> bool {
        a.normalize().cross(b.normalize()).length() < self.angular.sqrt()
    }

    /// Classify the angle between two planar faces from outward normals
    ///
    /// Face `b` lying behind the plane of `a` means the material wraps
    /// around the shared edge from outside, i.e. a convex corner.
    fn classify_planar(
        &self,
        normal_a: DVec3,
        centroid_a: DVec3,
        normal_b: DVec3,
        centroid_b: DVec3,
    ) -> AngleType {
        let normal_a = normal_a.normalize();
        let normal_b = normal_b.normalize();
        if normal_a.dot(normal_b) > 1.0 - self.angular {
            return AngleType::Smooth;
        }
        let offset = (centroid_b - centroid_a).dot(normal_a);
        if offset < -self.linear {
            AngleType::Convex
        } else if offset > self.linear {
            AngleType::Concave
        } else {
            AngleType::Undefined
        }
    }
}

/// Kernel backed by explicit [`ShapeData`] descriptions
pub struct MemoryKernel {
    /// Storage for shape data (keyed by UUID)
    shapes: Mutex<HashMap<Uuid, ShapeData>>,
    tolerances: Tolerances,
}

impl MemoryKernel {
    /// Create an empty kernel with the default tolerances
    pub fn new() -> Self {
        Self::with_tolerances(LINEAR_TOLERANCE, ANGULAR_TOLERANCE)
    }

    /// Create an empty kernel with explicit comparison tolerances
    pub fn with_tolerances(linear: f64, angular: f64) -> Self {
        Self {
            shapes: Mutex::new(HashMap::new()),
            tolerances: Tolerances { linear, angular },
        }
    }

    /// Create an empty kernel using the tolerances of a recognition config
    pub fn with_config(config: &RecognitionConfig) -> Self {
        Self::with_tolerances(config.linear_tolerance, config.angular_tolerance)
    }

    /// Store a shape description and return its handle
    pub fn insert(&self, data: ShapeData) -> Shape {
        let id = Uuid::new_v4();
        self.shapes.lock().insert(id, data);
        Shape::new(id)
    }

    /// Replace the description behind an existing handle
    pub fn replace(&self, shape: &Shape, data: ShapeData) -> KernelResult<()> {
        let mut shapes = self.shapes.lock();
        match shapes.get_mut(&shape.id) {
            Some(slot) => {
                *slot = data;
                Ok(())
            }
            None => Err(KernelError::ShapeNotFound(shape.id)),
        }
    }

    /// Remove a shape description
    pub fn remove(&self, shape: &Shape) -> Option<ShapeData> {
        self.shapes.lock().remove(&shape.id)
    }

    fn with_shape<T>(
        &self,
        shape: &Shape,
        f: impl FnOnce(&ShapeData) -> KernelResult<T>,
    ) -> KernelResult<T> {
        let shapes = self.shapes.lock();
        let data = shapes
            .get(&shape.id)
            .ok_or(KernelError::ShapeNotFound(shape.id))?;
        f(data)
    }
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryKernel for MemoryKernel {
    fn name(&self) -> &str {
        "memory"
    }

    fn index_faces(&self, shape: &Shape) -> KernelResult<FaceIndex> {
        self.with_shape(shape, |data| {
            if data.faces.is_empty() {
                return Err(KernelError::EmptyShape);
            }
            Ok(FaceIndex::new(data.faces.len() as u32))
        })
    }

    fn shared_edges(&self, shape: &Shape) -> KernelResult<Vec<EdgeFaces>> {
        self.with_shape(shape, |data| {
            Ok(data
                .edges
                .iter()
                .enumerate()
                .map(|(i, edge)| EdgeFaces::new(EdgeId(i as u32 + 1), edge.faces.iter().copied()))
                .collect())
        })
    }

    fn classify_angle(
        &self,
        shape: &Shape,
        a: FaceId,
        b: FaceId,
        edge: EdgeId,
    ) -> KernelResult<AngleType> {
        self.with_shape(shape, |data| {
            let edge_data = data.edge(edge)?;
            if !edge_data.faces.contains(&a) || !edge_data.faces.contains(&b) {
                return Err(KernelError::EdgeMismatch { edge, a, b });
            }
            if let Some(angle) = edge_data.angle {
                return Ok(angle);
            }

            let face_a = data.face(a)?;
            let face_b = data.face(b)?;
            let normal_a = match face_a.surface {
                FaceSurface::Plane(plane) => plane.normal,
                _ => {
                    return Err(KernelError::UnsupportedSurface {
                        face: a,
                        query: "classify_angle",
                    });
                }
            };
            let normal_b = match face_b.surface {
                FaceSurface::Plane(plane) => plane.normal,
                _ => {
                    return Err(KernelError::UnsupportedSurface {
                        face: b,
                        query: "classify_angle",
                    });
                }
            };
            Ok(self.tolerances.classify_planar(
                normal_a,
                face_a.centroid,
                normal_b,
                face_b.centroid,
            ))
        })
    }

    fn is_cylindrical(&self, shape: &Shape, face: FaceId) -> KernelResult<bool> {
        self.with_shape(shape, |data| match data.face(face)?.surface {
            FaceSurface::Cylinder(_) => Ok(true),
            FaceSurface::Unknown => Err(KernelError::UnsupportedSurface {
                face,
                query: "is_cylindrical",
            }),
            _ => Ok(false),
        })
    }

    fn radius(&self, shape: &Shape, face: FaceId) -> KernelResult<f64> {
        self.with_shape(shape, |data| match data.face(face)?.surface {
            FaceSurface::Cylinder(cylinder) => Ok(cylinder.radius),
            FaceSurface::Sphere(sphere) => Ok(sphere.radius),
            _ => Err(KernelError::UnsupportedSurface {
                face,
                query: "radius",
            }),
        })
    }

    fn is_planar(&self, shape: &Shape, face: FaceId) -> KernelResult<bool> {
        self.with_shape(shape, |data| match data.face(face)?.surface {
            FaceSurface::Plane(_) => Ok(true),
            FaceSurface::Unknown => Err(KernelError::UnsupportedSurface {
                face,
                query: "is_planar",
            }),
            _ => Ok(false),
        })
    }

    fn same_host(&self, shape: &Shape, a: FaceId, b: FaceId) -> KernelResult<bool> {
        let tol = &self.tolerances;
        self.with_shape(shape, |data| {
            let surface_a = data.face(a)?.surface;
            let surface_b = data.face(b)?.surface;
            if a == b {
                return Ok(true);
            }
            match (surface_a, surface_b) {
                (FaceSurface::Unknown, _) => Err(KernelError::UnsupportedSurface {
                    face: a,
                    query: "same_host",
                }),
                (_, FaceSurface::Unknown) => Err(KernelError::UnsupportedSurface {
                    face: b,
                    query: "same_host",
                }),
                (FaceSurface::Plane(p), FaceSurface::Plane(q)) => {
                    Ok(tol.is_parallel(p.normal, q.normal)
                        && (q.origin - p.origin).dot(p.normal).abs() < tol.linear)
                }
                (FaceSurface::Cylinder(p), FaceSurface::Cylinder(q)) => Ok((p.radius - q.radius)
                    .abs()
                    < tol.linear
                    && p.axis.is_coaxial(&q.axis, tol)),
                (FaceSurface::Cone(p), FaceSurface::Cone(q)) => Ok(p.apex.distance(q.apex)
                    < tol.linear
                    && p.direction.normalize().dot(q.direction.normalize()) > 1.0 - tol.angular
                    && (p.half_angle - q.half_angle).abs() < tol.angular),
                (FaceSurface::Sphere(p), FaceSurface::Sphere(q)) => Ok(p.center.distance(q.center)
                    < tol.linear
                    && (p.radius - q.radius).abs() < tol.linear),
                _ => Ok(false),
            }
        })
    }

    fn host_signature(&self, shape: &Shape, face: FaceId) -> Option<u64> {
        let shapes = self.shapes.lock();
        let data = shapes.get(&shape.id)?;
        data.face(face).ok()?.surface.signature()
    }
}
