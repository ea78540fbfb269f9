//! Geometry kernel trait definitions
//!
//! The graph builder and the recognizers never look at B-Rep data directly.
//! Every topological or geometric question goes through [`GeometryKernel`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 1-based index of a face within an indexed shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl FaceId {
    /// Create a face ID from its 1-based index
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the 1-based index
    pub fn index(self) -> u32 {
        self.0
    }

    /// Zero-based storage slot, `None` for the invalid ID 0
    pub(crate) fn slot(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl std::fmt::Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 1-based index of an edge within an indexed shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create an edge ID from its 1-based index
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the 1-based index
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Classification of the dihedral angle between two adjacent faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AngleType {
    /// Material-side angle below 180 degrees (an outside corner)
    Convex,
    /// Material-side angle above 180 degrees (an inside corner)
    Concave,
    /// Tangent-continuous transition
    Smooth,
    /// The kernel could not tell
    #[default]
    Undefined,
}

impl std::fmt::Display for AngleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AngleType::Convex => "convex",
            AngleType::Concave => "concave",
            AngleType::Smooth => "smooth",
            AngleType::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Handle to a shape whose data lives inside a kernel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier
    pub id: Uuid,
}

impl Shape {
    /// Create a shape handle with the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// Result of indexing the faces of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceIndex {
    face_count: u32,
}

impl FaceIndex {
    /// Create an index covering faces `1..=face_count`
    pub fn new(face_count: u32) -> Self {
        Self { face_count }
    }

    /// Number of indexed faces
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// Check if a face ID lies in `1..=face_count`
    pub fn contains(&self, face: FaceId) -> bool {
        face.0 >= 1 && face.0 <= self.face_count
    }

    /// Iterate over all face IDs in ascending order
    pub fn ids(&self) -> impl Iterator<Item = FaceId> {
        (1..=self.face_count).map(FaceId)
    }
}

/// An edge together with the faces it bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFaces {
    /// The edge
    pub edge: EdgeId,
    /// Faces bounded by this edge, as reported by the kernel
    pub faces: Vec<FaceId>,
}

impl EdgeFaces {
    /// Create an edge → faces entry
    pub fn new(edge: EdgeId, faces: impl IntoIterator<Item = FaceId>) -> Self {
        Self {
            edge,
            faces: faces.into_iter().collect(),
        }
    }
}

/// Error type for geometry kernel queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(Uuid),

    #[error("Shape has no faces")]
    EmptyShape,

    #[error("Unknown face {0}")]
    UnknownFace(FaceId),

    #[error("Unknown edge {0}")]
    UnknownEdge(EdgeId),

    #[error("Edge {edge} does not bound both faces {a} and {b}")]
    EdgeMismatch { edge: EdgeId, a: FaceId, b: FaceId },

    #[error("Query '{query}' is not supported for face {face}")]
    UnsupportedSurface { face: FaceId, query: &'static str },

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),
}

impl KernelError {
    /// The face a query failed on, when the kernel can tell
    pub fn face(&self) -> Option<FaceId> {
        match self {
            KernelError::UnknownFace(face) => Some(*face),
            KernelError::UnsupportedSurface { face, .. } => Some(*face),
            KernelError::EdgeMismatch { a, .. } => Some(*a),
            _ => None,
        }
    }
}

/// Result type for kernel queries
pub type KernelResult<T> = Result<T, KernelError>;

/// The geometry kernel collaborator
///
/// Implementations answer indexing, adjacency and per-face geometric
/// questions about a [`Shape`]. Predicates return `Err` when they cannot
/// decide (for example an unsupported surface type); callers treat that as
/// "no match" for the face in question.
pub trait GeometryKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Assign every face of the shape a stable 1-based ID
    fn index_faces(&self, shape: &Shape) -> KernelResult<FaceIndex>;

    /// Map every edge of the shape to the faces it bounds
    fn shared_edges(&self, shape: &Shape) -> KernelResult<Vec<EdgeFaces>>;

    /// Classify the angle between two faces along a shared edge
    fn classify_angle(
        &self,
        shape: &Shape,
        a: FaceId,
        b: FaceId,
        edge: EdgeId,
    ) -> KernelResult<AngleType>;

    /// Check if the face lies on a bounded cylindrical surface
    fn is_cylindrical(&self, shape: &Shape, face: FaceId) -> KernelResult<bool>;

    /// Radius of the face's surface
    fn radius(&self, shape: &Shape, face: FaceId) -> KernelResult<f64>;

    /// Check if the face lies on a plane
    fn is_planar(&self, shape: &Shape, face: FaceId) -> KernelResult<bool>;

    /// Check if two faces share the same untrimmed host surface
    fn same_host(&self, shape: &Shape, a: FaceId, b: FaceId) -> KernelResult<bool>;

    /// Cheap bucket key for the host surface
    ///
    /// Faces with different signatures never share a host, so grouping can
    /// skip the pairwise check. `None` means "unknown, always compare".
    fn host_signature(&self, _shape: &Shape, _face: FaceId) -> Option<u64> {
        None
    }
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> KernelResult<T> {
        Err(KernelError::KernelNotAvailable(
            "No geometry kernel available".into(),
        ))
    }
}

impl GeometryKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn index_faces(&self, _shape: &Shape) -> KernelResult<FaceIndex> {
        Self::unavailable()
    }

    fn shared_edges(&self, _shape: &Shape) -> KernelResult<Vec<EdgeFaces>> {
        Self::unavailable()
    }

    fn classify_angle(
        &self,
        _shape: &Shape,
        _a: FaceId,
        _b: FaceId,
        _edge: EdgeId,
    ) -> KernelResult<AngleType> {
        Self::unavailable()
    }

    fn is_cylindrical(&self, _shape: &Shape, _face: FaceId) -> KernelResult<bool> {
        Self::unavailable()
    }

    fn radius(&self, _shape: &Shape, _face: FaceId) -> KernelResult<f64> {
        Self::unavailable()
    }

    fn is_planar(&self, _shape: &Shape, _face: FaceId) -> KernelResult<bool> {
        Self::unavailable()
    }

    fn same_host(&self, _shape: &Shape, _a: FaceId, _b: FaceId) -> KernelResult<bool> {
        Self::unavailable()
    }
}
