//! Graph Iterator Layer
//!
//! Enumeration policy is kept apart from graph storage so the recognizers
//! can run either over the whole model or over a seeded set of faces.

use std::collections::BTreeSet;

use crate::graph::Aag;
use crate::kernel::FaceId;

/// Cursor-style enumeration over AAG nodes
pub trait AagIterator {
    /// Check if there is a current element
    fn more(&self) -> bool;

    /// Advance to the next element
    fn next(&mut self);

    /// The current node, `None` once exhausted
    fn face_id(&self) -> Option<FaceId>;

    /// Fill `out` with the neighbors of the current node
    ///
    /// `out` is cleared first. Returns `false` if the current node has no
    /// recorded neighbors in the underlying graph (including nodes that are
    /// not part of the graph at all).
    fn neighbors(&self, out: &mut BTreeSet<FaceId>) -> bool;
}

/// Look up `face` in the full graph and copy its neighbors into `out`
fn fill_neighbors(aag: &Aag, face: Option<FaceId>, out: &mut BTreeSet<FaceId>) -> bool {
    out.clear();
    match face.and_then(|f| aag.neighbors(f)) {
        Some(list) if !list.is_empty() => {
            out.extend(list.iter().copied());
            true
        }
        _ => false,
    }
}

/// Visits every node of the graph once, in ascending face ID order
#[derive(Debug, Clone)]
pub struct RandomIterator<'a> {
    aag: &'a Aag,
    current: u32,
}

impl<'a> RandomIterator<'a> {
    /// Start at the first node
    pub fn new(aag: &'a Aag) -> Self {
        Self { aag, current: 1 }
    }

    /// Restart from the first node
    pub fn reset(&mut self) {
        self.current = 1;
    }
}

impl AagIterator for RandomIterator<'_> {
    fn more(&self) -> bool {
        self.current >= 1 && self.current <= self.aag.face_count()
    }

    fn next(&mut self) {
        if self.more() {
            self.current += 1;
        }
    }

    fn face_id(&self) -> Option<FaceId> {
        self.more().then_some(FaceId(self.current))
    }

    fn neighbors(&self, out: &mut BTreeSet<FaceId>) -> bool {
        fill_neighbors(self.aag, self.face_id(), out)
    }
}

/// Visits only the caller-supplied faces, in ascending order
///
/// IDs absent from the graph are still visited; their neighbor lookup
/// simply reports `false`.
#[derive(Debug, Clone)]
pub struct SubsetIterator<'a> {
    aag: &'a Aag,
    faces: Vec<FaceId>,
    pos: usize,
}

impl<'a> SubsetIterator<'a> {
    /// Create an iterator over `faces`; duplicates are visited once
    pub fn new(aag: &'a Aag, faces: impl IntoIterator<Item = FaceId>) -> Self {
        let faces: BTreeSet<FaceId> = faces.into_iter().collect();
        Self {
            aag,
            faces: faces.into_iter().collect(),
            pos: 0,
        }
    }

    /// Number of distinct faces in the subset
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check if the subset is empty
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Restart from the first face
    pub fn reset(&mut self) {
        self.pos = 0;
    }
}

impl AagIterator for SubsetIterator<'_> {
    fn more(&self) -> bool {
        self.pos < self.faces.len()
    }

    fn next(&mut self) {
        if self.more() {
            self.pos += 1;
        }
    }

    fn face_id(&self) -> Option<FaceId> {
        self.faces.get(self.pos).copied()
    }

    fn neighbors(&self, out: &mut BTreeSet<FaceId>) -> bool {
        fill_neighbors(self.aag, self.face_id(), out)
    }
}
