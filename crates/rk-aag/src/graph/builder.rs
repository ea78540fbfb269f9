//! AAG construction
//!
//! Adjacency is derived in one pass over the kernel's edge → faces table,
//! so cost grows with the number of edges rather than the square of the
//! number of faces.

use std::collections::BTreeMap;

use super::{Aag, AagError, AagResult, ArcData, ArcKey};
use crate::kernel::{GeometryKernel, Shape};

/// Builds an [`Aag`] from a shape
pub struct AagBuilder<'k> {
    kernel: &'k dyn GeometryKernel,
}

impl<'k> AagBuilder<'k> {
    /// Create a builder over the given kernel
    pub fn new(kernel: &'k dyn GeometryKernel) -> Self {
        Self { kernel }
    }

    /// Index the shape and derive face adjacency from shared edges
    ///
    /// An edge bounding k > 2 faces yields an arc for every pair of those
    /// faces, each flagged non-manifold. Edges bounding a single face, and
    /// repeated mentions of one face on the same edge (seams), add nothing.
    /// Fails without a partial graph if the shape cannot be indexed or
    /// references faces outside the index.
    pub fn build(&self, shape: &Shape) -> AagResult<Aag> {
        let index = self.kernel.index_faces(shape).map_err(|e| {
            AagError::Construction(format!("cannot index faces of shape {}: {}", shape.id, e))
        })?;
        if index.face_count() == 0 {
            return Err(AagError::Construction(format!(
                "shape {} has no faces",
                shape.id
            )));
        }

        let edges = self.kernel.shared_edges(shape).map_err(|e| {
            AagError::Construction(format!("cannot map edges of shape {}: {}", shape.id, e))
        })?;

        let mut arcs: BTreeMap<ArcKey, ArcData> = BTreeMap::new();
        for entry in edges {
            let mut faces = entry.faces;
            faces.sort_unstable();
            faces.dedup();

            if let Some(&bad) = faces.iter().find(|f| !index.contains(**f)) {
                return Err(AagError::Construction(format!(
                    "edge {} references face {} outside 1..={}",
                    entry.edge,
                    bad,
                    index.face_count()
                )));
            }

            let non_manifold = faces.len() > 2;
            if non_manifold {
                tracing::warn!(
                    "Edge {} bounds {} faces; adding all pairwise arcs",
                    entry.edge,
                    faces.len()
                );
            }

            for (i, &a) in faces.iter().enumerate() {
                for &b in &faces[i + 1..] {
                    let arc = arcs.entry(ArcKey::new(a, b)).or_default();
                    arc.edges.push(entry.edge);
                    arc.non_manifold |= non_manifold;
                }
            }
        }

        for arc in arcs.values_mut() {
            arc.edges.sort_unstable();
            arc.edges.dedup();
        }

        let aag = Aag::from_arcs(shape.clone(), index.face_count(), arcs);
        debug_assert!(aag.is_symmetric());
        tracing::debug!(
            "Built AAG for shape {} with {} kernel: {} faces, {} arcs",
            shape.id,
            self.kernel.name(),
            aag.face_count(),
            aag.arc_count()
        );
        Ok(aag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{FaceId, MemoryKernel, NullKernel, ShapeData};
    use glam::DVec3;
    use uuid::Uuid;

    #[test]
    fn test_null_kernel_is_construction_error() {
        let shape = Shape::new(Uuid::new_v4());
        let result = AagBuilder::new(&NullKernel).build(&shape);
        assert!(matches!(result, Err(AagError::Construction(_))));
    }

    #[test]
    fn test_empty_shape_is_construction_error() {
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(ShapeData::new());
        assert!(matches!(
            Aag::build(&kernel, &shape),
            Err(AagError::Construction(_))
        ));
    }

    #[test]
    fn test_foreign_face_on_edge_is_construction_error() {
        let mut data = ShapeData::new();
        let a = data.add_plane(DVec3::ZERO, DVec3::Z);
        data.add_edge(&[a, FaceId(7)]);
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(data);
        assert!(matches!(
            Aag::build(&kernel, &shape),
            Err(AagError::Construction(_))
        ));
    }

    #[test]
    fn test_multiple_edges_one_arc() {
        let mut data = ShapeData::new();
        let a = data.add_plane(DVec3::ZERO, DVec3::Z);
        let b = data.add_plane(DVec3::X, DVec3::X);
        let first = data.add_edge(&[b, a]);
        let second = data.add_edge(&[a, b]);
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(data);
        let aag = Aag::build(&kernel, &shape).unwrap();

        assert_eq!(aag.arc_count(), 1);
        assert_eq!(aag.shared_edges(a, b).unwrap(), &[first, second]);
        assert_eq!(aag.arc(b, a).unwrap().first_edge(), Some(first));
    }

    #[test]
    fn test_non_manifold_edge_gives_pairwise_arcs() {
        let mut data = ShapeData::new();
        let a = data.add_plane(DVec3::ZERO, DVec3::Z);
        let b = data.add_plane(DVec3::X, DVec3::X);
        let c = data.add_plane(DVec3::Y, DVec3::Y);
        let d = data.add_plane(DVec3::ONE, DVec3::Z);
        data.add_edge(&[a, b, c]);
        data.add_edge(&[c, d]);
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(data);
        let aag = Aag::build(&kernel, &shape).unwrap();

        assert_eq!(aag.arc_count(), 4);
        assert!(aag.arc(a, b).unwrap().non_manifold);
        assert!(aag.arc(b, c).unwrap().non_manifold);
        assert!(aag.arc(a, c).unwrap().non_manifold);
        assert!(!aag.arc(c, d).unwrap().non_manifold);
        assert!(aag.is_symmetric());
    }

    #[test]
    fn test_seam_and_free_edges_add_no_arcs() {
        let mut data = ShapeData::new();
        let a = data.add_plane(DVec3::ZERO, DVec3::Z);
        let b = data.add_plane(DVec3::X, DVec3::X);
        data.add_edge(&[a, a]);
        data.add_edge(&[b]);
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(data);
        let aag = Aag::build(&kernel, &shape).unwrap();

        assert_eq!(aag.arc_count(), 0);
        assert_eq!(aag.degree(a), Some(0));
        assert_eq!(aag.face_count(), 2);
    }
}
