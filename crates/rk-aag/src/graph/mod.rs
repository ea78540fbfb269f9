//! Attributed Adjacency Graph
//!
//! Nodes are the 1-based face IDs of an indexed shape; an arc joins two
//! faces that share at least one edge. Neighbor lists are kept sorted so
//! every traversal over the graph is deterministic.
//!
//! The topology is fixed once built. Analysis passes only attach, replace
//! or remove attributes on nodes and arcs.

mod builder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;
use uuid::Uuid;

use crate::attribute::{Attribute, AttributeKind, AttributeSet, AttributeStore};
use crate::iterator::{RandomIterator, SubsetIterator};
use crate::kernel::{EdgeId, FaceId, GeometryKernel, KernelError, Shape};

pub use builder::AagBuilder;

/// AAG-related errors
#[derive(Debug, Clone, Error)]
pub enum AagError {
    #[error("AAG construction failed: {0}")]
    Construction(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Recognition cancelled")]
    Cancelled,

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}

/// Result type for AAG operations
pub type AagResult<T> = Result<T, AagError>;

/// Unordered pair of adjacent faces, stored low ID first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArcKey {
    lo: FaceId,
    hi: FaceId,
}

impl ArcKey {
    /// Create a key for the pair; argument order does not matter
    pub fn new(a: FaceId, b: FaceId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The lower face ID
    pub fn lo(&self) -> FaceId {
        self.lo
    }

    /// The higher face ID
    pub fn hi(&self) -> FaceId {
        self.hi
    }

    /// Given one end of the arc, get the other
    pub fn other(&self, face: FaceId) -> Option<FaceId> {
        if face == self.lo {
            Some(self.hi)
        } else if face == self.hi {
            Some(self.lo)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

/// Topological data carried by an arc
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcData {
    /// Shared edges in ascending order
    pub edges: Vec<EdgeId>,
    /// Whether any shared edge bounds more than two faces
    pub non_manifold: bool,
}

impl ArcData {
    /// The lowest shared edge, used for angle classification
    pub fn first_edge(&self) -> Option<EdgeId> {
        self.edges.first().copied()
    }
}

/// The attributed adjacency graph of one shape
#[derive(Debug, Clone)]
pub struct Aag {
    /// Shape this graph was built from
    shape: Shape,
    /// Sorted neighbor list per face (slot = face ID - 1)
    neighbors: Vec<Vec<FaceId>>,
    /// Arc records keyed by face pair
    arcs: BTreeMap<ArcKey, ArcData>,
    /// Attributes attached to faces
    node_attributes: AttributeStore<FaceId>,
    /// Attributes attached to arcs
    arc_attributes: AttributeStore<ArcKey>,
}

impl Aag {
    /// Build the graph of a shape using the given kernel
    pub fn build(kernel: &dyn GeometryKernel, shape: &Shape) -> AagResult<Self> {
        AagBuilder::new(kernel).build(shape)
    }

    /// Assemble a graph from arc records; neighbor lists are derived, so
    /// the result is symmetric by construction
    pub(crate) fn from_arcs(shape: Shape, face_count: u32, arcs: BTreeMap<ArcKey, ArcData>) -> Self {
        let mut neighbors = vec![Vec::new(); face_count as usize];
        for key in arcs.keys() {
            if let Some(list) = key.lo.slot().and_then(|slot| neighbors.get_mut(slot)) {
                list.push(key.hi);
            }
            if let Some(list) = key.hi.slot().and_then(|slot| neighbors.get_mut(slot)) {
                list.push(key.lo);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        Self {
            shape,
            neighbors,
            arcs,
            node_attributes: AttributeStore::new(),
            arc_attributes: AttributeStore::new(),
        }
    }

    // ============== Topology ==============

    /// Get the shape handle this graph describes
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of faces (nodes)
    pub fn face_count(&self) -> u32 {
        self.neighbors.len() as u32
    }

    /// Number of arcs
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Check if a face ID is a node of this graph
    pub fn contains(&self, face: FaceId) -> bool {
        face.0 >= 1 && face.0 <= self.face_count()
    }

    /// All face IDs in ascending order
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (1..=self.face_count()).map(FaceId)
    }

    /// Sorted neighbors of a face; `None` if the face is not in the graph
    pub fn neighbors(&self, face: FaceId) -> Option<&[FaceId]> {
        face.slot()
            .and_then(|slot| self.neighbors.get(slot))
            .map(Vec::as_slice)
    }

    /// Number of neighbors of a face
    pub fn degree(&self, face: FaceId) -> Option<usize> {
        self.neighbors(face).map(<[FaceId]>::len)
    }

    /// Check if two faces are adjacent
    pub fn has_arc(&self, a: FaceId, b: FaceId) -> bool {
        self.arcs.contains_key(&ArcKey::new(a, b))
    }

    /// Arc record between two faces
    pub fn arc(&self, a: FaceId, b: FaceId) -> Option<&ArcData> {
        self.arcs.get(&ArcKey::new(a, b))
    }

    /// Edges shared by two faces
    pub fn shared_edges(&self, a: FaceId, b: FaceId) -> Option<&[EdgeId]> {
        self.arc(a, b).map(|arc| arc.edges.as_slice())
    }

    /// All arcs in ascending key order
    pub fn arcs(&self) -> impl Iterator<Item = (ArcKey, &ArcData)> {
        self.arcs.iter().map(|(key, data)| (*key, data))
    }

    /// Check `b ∈ neighbors(a) ⇔ a ∈ neighbors(b)` for every node
    pub fn is_symmetric(&self) -> bool {
        self.face_ids().all(|a| {
            self.neighbors(a).unwrap_or_default().iter().all(|&b| {
                self.neighbors(b)
                    .is_some_and(|list| list.binary_search(&a).is_ok())
            })
        })
    }

    // ============== Iterators ==============

    /// Iterator over every node
    pub fn random_iter(&self) -> RandomIterator<'_> {
        RandomIterator::new(self)
    }

    /// Iterator over a caller-supplied subset of nodes
    pub fn subset_iter(&self, faces: impl IntoIterator<Item = FaceId>) -> SubsetIterator<'_> {
        SubsetIterator::new(self, faces)
    }

    // ============== Node attributes ==============

    /// Attach or overwrite an attribute at a face
    ///
    /// Returns `false` (and drops the attribute) if the face is not in the graph.
    pub fn set_attribute(&mut self, face: FaceId, attr: Box<dyn Attribute>) -> bool {
        if !self.contains(face) {
            return false;
        }
        self.node_attributes.set(face, attr);
        true
    }

    /// Get the attribute of the given kind at a face
    pub fn attribute(&self, face: FaceId, guid: Uuid) -> Option<&dyn Attribute> {
        self.node_attributes.get(face, guid)
    }

    /// Get the attribute of kind `T` at a face
    pub fn attribute_as<T: AttributeKind>(&self, face: FaceId) -> Option<&T> {
        self.node_attributes.get_as::<T>(face)
    }

    /// Get the attribute of kind `T` at a face mutably
    pub fn attribute_as_mut<T: AttributeKind>(&mut self, face: FaceId) -> Option<&mut T> {
        self.node_attributes.get_as_mut::<T>(face)
    }

    /// Detach the attribute of the given kind from a face
    pub fn remove_attribute(&mut self, face: FaceId, guid: Uuid) -> Option<Box<dyn Attribute>> {
        self.node_attributes.remove(face, guid)
    }

    /// All attributes at a face
    pub fn attributes(&self, face: FaceId) -> Option<&AttributeSet> {
        self.node_attributes.set_at(face)
    }

    /// The node attribute store
    pub fn node_attributes(&self) -> &AttributeStore<FaceId> {
        &self.node_attributes
    }

    /// The node attribute store, mutably
    pub fn node_attributes_mut(&mut self) -> &mut AttributeStore<FaceId> {
        &mut self.node_attributes
    }

    // ============== Arc attributes ==============

    /// Attach or overwrite an attribute on the arc between two faces
    ///
    /// Returns `false` if the faces are not adjacent.
    pub fn set_arc_attribute(&mut self, a: FaceId, b: FaceId, attr: Box<dyn Attribute>) -> bool {
        let key = ArcKey::new(a, b);
        if !self.arcs.contains_key(&key) {
            return false;
        }
        self.arc_attributes.set(key, attr);
        true
    }

    /// Get the attribute of the given kind on an arc
    pub fn arc_attribute(&self, a: FaceId, b: FaceId, guid: Uuid) -> Option<&dyn Attribute> {
        self.arc_attributes.get(ArcKey::new(a, b), guid)
    }

    /// Get the attribute of kind `T` on an arc
    pub fn arc_attribute_as<T: AttributeKind>(&self, a: FaceId, b: FaceId) -> Option<&T> {
        self.arc_attributes.get_as::<T>(ArcKey::new(a, b))
    }

    /// Detach the attribute of the given kind from an arc
    pub fn remove_arc_attribute(
        &mut self,
        a: FaceId,
        b: FaceId,
        guid: Uuid,
    ) -> Option<Box<dyn Attribute>> {
        self.arc_attributes.remove(ArcKey::new(a, b), guid)
    }

    /// The arc attribute store
    pub fn arc_attributes(&self) -> &AttributeStore<ArcKey> {
        &self.arc_attributes
    }

    // ============== Diagnostics ==============

    /// Human-readable dump of adjacency and attributes
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "AAG: {} faces, {} arcs",
            self.face_count(),
            self.arc_count()
        );
        for face in self.face_ids() {
            let neighbors: Vec<String> = self
                .neighbors(face)
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect();
            let _ = write!(out, "  {} -> [{}]", face, neighbors.join(", "));
            if let Some(set) = self.attributes(face) {
                let attrs: Vec<String> = set.iter().map(|attr| attr.dump()).collect();
                let _ = write!(out, " {{{}}}", attrs.join("; "));
            }
            out.push('\n');
        }
        for (key, arc) in self.arcs() {
            let edges: Vec<String> = arc.edges.iter().map(ToString::to_string).collect();
            let _ = write!(out, "  arc {} via [{}]", key, edges.join(", "));
            if arc.non_manifold {
                out.push_str(" non-manifold");
            }
            if let Some(set) = self.arc_attributes.set_at(key) {
                let attrs: Vec<String> = set.iter().map(|attr| attr.dump()).collect();
                let _ = write!(out, " {{{}}}", attrs.join("; "));
            }
            out.push('\n');
        }
        out
    }
}
