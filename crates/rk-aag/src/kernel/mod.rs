//! Geometry kernel collaborator
//!
//! - [`GeometryKernel`]: the narrow query interface the AAG consumes
//! - [`MemoryKernel`]: kernel over explicit shape descriptions
//! - [`NullKernel`]: placeholder that fails every query

mod memory;
mod traits;

pub use memory::{
    Axis, Cone, Cylinder, EdgeData, FaceData, FaceSurface, MemoryKernel, Plane, ShapeData, Sphere,
};
pub use traits::{
    AngleType, EdgeFaces, EdgeId, FaceId, FaceIndex, GeometryKernel, KernelError, KernelResult,
    NullKernel, Shape,
};
