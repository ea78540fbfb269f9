//! Hole recognition
//!
//! A lateral face is a cylinder with exactly two neighbors, both planar,
//! whose radius does not exceed the threshold. A neighbor touching nothing
//! but the lateral face is the hole's bottom cap and joins the feature.

use super::{CancelCheck, CancelToken, Diagnostic, QueryContext, Recognition, Visited};
use crate::config::RecognitionConfig;
use crate::constants::{CANCEL_CHECK_INTERVAL, DEFAULT_HOLE_RADIUS};
use crate::feature::FaceIdSet;
use crate::graph::{Aag, AagError, AagResult};
use crate::iterator::AagIterator;
use crate::kernel::{FaceId, GeometryKernel};

/// Recognizes small cylindrical holes
pub struct HoleRecognizer<'a> {
    aag: &'a Aag,
    kernel: &'a dyn GeometryKernel,
    radius_threshold: f64,
    cancel: Option<CancelToken>,
    cancel_interval: usize,
}

impl<'a> HoleRecognizer<'a> {
    /// Create a recognizer with the default radius threshold
    pub fn new(aag: &'a Aag, kernel: &'a dyn GeometryKernel) -> Self {
        Self {
            aag,
            kernel,
            radius_threshold: DEFAULT_HOLE_RADIUS,
            cancel: None,
            cancel_interval: CANCEL_CHECK_INTERVAL,
        }
    }

    /// Set the largest accepted radius
    pub fn with_radius_threshold(mut self, radius_threshold: f64) -> Self {
        self.radius_threshold = radius_threshold;
        self
    }

    /// Apply the hole settings of a configuration
    pub fn with_config(mut self, config: &RecognitionConfig) -> Self {
        self.radius_threshold = config.hole_radius_threshold;
        self.cancel_interval = config.cancel_check_interval;
        self
    }

    /// Stop the pass when the token is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the recognizer
    pub fn perform(&self) -> AagResult<Recognition> {
        if !self.radius_threshold.is_finite() || self.radius_threshold <= 0.0 {
            return Err(AagError::InvalidConfig(format!(
                "hole radius threshold must be a positive number, got {}",
                self.radius_threshold
            )));
        }

        let mut consumed = Visited::new(self.aag.face_count());
        let mut cancel = CancelCheck::new(self.cancel.as_ref(), self.cancel_interval);
        let mut result = Recognition::default();

        let mut it = self.aag.random_iter();
        while it.more() {
            cancel.tick()?;
            if let Some(face) = it.face_id().filter(|f| !consumed.contains(*f)) {
                result.visit_order.push(face);
                match self.is_lateral(face) {
                    Ok(Some(neighbors)) => {
                        let hole = self.collect_hole(face, neighbors);
                        for &f in &hole {
                            consumed.insert(f);
                        }
                        tracing::trace!("Hole at {} with {} faces", face, hole.len());
                        result.features.push(hole);
                    }
                    Ok(None) => {}
                    Err(diagnostic) => result.skip(diagnostic),
                }
            }
            it.next();
        }

        tracing::debug!(
            "Hole recognition (radius <= {}): {} holes, {} skipped",
            self.radius_threshold,
            result.features.len(),
            result.diagnostics.len()
        );
        Ok(result)
    }

    /// Test whether `face` is a hole's lateral face and return its neighbors
    fn is_lateral(&self, face: FaceId) -> Result<Option<[FaceId; 2]>, Diagnostic> {
        let neighbors = match self.aag.neighbors(face) {
            Some(&[a, b]) => [a, b],
            _ => return Ok(None),
        };

        let shape = self.aag.shape();
        if !self
            .kernel
            .is_cylindrical(shape, face)
            .query(face, "is_cylindrical")?
        {
            return Ok(None);
        }
        for neighbor in neighbors {
            if !self
                .kernel
                .is_planar(shape, neighbor)
                .query(neighbor, "is_planar")?
            {
                return Ok(None);
            }
        }
        let radius = self.kernel.radius(shape, face).query(face, "radius")?;
        Ok((radius <= self.radius_threshold).then_some(neighbors))
    }

    /// The lateral face plus any neighbor that touches only it
    fn collect_hole(&self, lateral: FaceId, neighbors: [FaceId; 2]) -> FaceIdSet {
        let mut hole = FaceIdSet::from([lateral]);
        for neighbor in neighbors {
            if self.aag.neighbors(neighbor) == Some(&[lateral][..]) {
                hole.insert(neighbor);
            }
        }
        hole
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Axis, MemoryKernel, ShapeData};
    use glam::DVec3;

    /// Plate with a blind hole: top (1), lateral (2), cap (3), plus a side wall (4)
    fn blind_hole(radius: f64) -> ShapeData {
        let mut data = ShapeData::new();
        let top = data.add_plane(DVec3::new(0.0, 0.0, 1.0), DVec3::Z);
        let axis = Axis::new(DVec3::ZERO, DVec3::Z);
        let lateral = data.add_cylinder(axis, radius, DVec3::new(radius, 0.0, 0.5));
        let cap = data.add_plane(DVec3::new(0.0, 0.0, 0.2), DVec3::Z);
        let side = data.add_plane(DVec3::new(10.0, 0.0, 0.5), DVec3::X);
        data.add_edge(&[top, lateral]);
        data.add_edge(&[lateral, cap]);
        data.add_edge(&[top, side]);
        data
    }

    fn build(data: ShapeData) -> (MemoryKernel, Aag) {
        let kernel = MemoryKernel::new();
        let shape = kernel.insert(data);
        let aag = Aag::build(&kernel, &shape).unwrap();
        (kernel, aag)
    }

    #[test]
    fn test_blind_hole_includes_cap() {
        let (kernel, aag) = build(blind_hole(2.0));
        let result = HoleRecognizer::new(&aag, &kernel)
            .with_radius_threshold(5.0)
            .perform()
            .unwrap();
        assert_eq!(result.features, vec![FaceIdSet::from([FaceId(2), FaceId(3)])]);
    }

    #[test]
    fn test_radius_above_threshold() {
        let (kernel, aag) = build(blind_hole(2.0));
        let result = HoleRecognizer::new(&aag, &kernel)
            .with_radius_threshold(1.0)
            .perform()
            .unwrap();
        assert!(result.features.is_empty());
    }

    #[test]
    fn test_radius_equal_to_threshold_is_accepted() {
        let (kernel, aag) = build(blind_hole(2.0));
        let result = HoleRecognizer::new(&aag, &kernel)
            .with_radius_threshold(2.0)
            .perform()
            .unwrap();
        assert_eq!(result.features.len(), 1);
    }

    #[test]
    fn test_invalid_threshold() {
        let (kernel, aag) = build(blind_hole(2.0));
        for threshold in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let result = HoleRecognizer::new(&aag, &kernel)
                .with_radius_threshold(threshold)
                .perform();
            assert!(matches!(result, Err(AagError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_unknown_neighbor_is_skipped_not_fatal() {
        let mut data = ShapeData::new();
        let top = data.add_unknown(DVec3::new(0.0, 0.0, 1.0));
        let axis = Axis::new(DVec3::ZERO, DVec3::Z);
        let lateral = data.add_cylinder(axis, 1.0, DVec3::new(1.0, 0.0, 0.5));
        let bottom = data.add_plane(DVec3::ZERO, -DVec3::Z);
        data.add_edge(&[top, lateral]);
        data.add_edge(&[lateral, bottom]);
        let (kernel, aag) = build(data);

        let result = HoleRecognizer::new(&aag, &kernel).perform().unwrap();
        assert!(result.features.is_empty());
        assert_eq!(result.skipped_faces(), FaceIdSet::from([top]));
    }

    #[test]
    fn test_config_threshold() {
        let (kernel, aag) = build(blind_hole(3.0));
        let config = RecognitionConfig {
            hole_radius_threshold: 2.5,
            ..Default::default()
        };
        let result = HoleRecognizer::new(&aag, &kernel)
            .with_config(&config)
            .perform()
            .unwrap();
        assert!(result.features.is_empty());
    }
}
