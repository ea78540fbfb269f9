//! Slot and groove recognition
//!
//! From every untraversed seed the walk repeatedly steps to the untraversed
//! neighbor with the smallest face ID. The region is a slot when the walk
//! closes back onto the seed, none of the arcs around the visited faces is
//! convex, and enough faces were visited. Rejected regions stay traversed.

use std::collections::BTreeSet;

use super::{CancelCheck, CancelToken, Diagnostic, QueryContext, Recognition, Visited};
use crate::attribute::AngleTag;
use crate::config::RecognitionConfig;
use crate::constants::{CANCEL_CHECK_INTERVAL, MIN_SLOT_FACES};
use crate::graph::{Aag, AagResult, ArcData};
use crate::iterator::AagIterator;
use crate::kernel::{AngleType, FaceId, GeometryKernel};

/// Recognizes closed rings of non-convex faces
pub struct SlotRecognizer<'a> {
    aag: &'a Aag,
    kernel: &'a dyn GeometryKernel,
    seeds: Option<BTreeSet<FaceId>>,
    min_faces: usize,
    cancel: Option<CancelToken>,
    cancel_interval: usize,
}

impl<'a> SlotRecognizer<'a> {
    /// Scan the whole graph
    pub fn new(aag: &'a Aag, kernel: &'a dyn GeometryKernel) -> Self {
        Self {
            aag,
            kernel,
            seeds: None,
            min_faces: MIN_SLOT_FACES,
            cancel: None,
            cancel_interval: CANCEL_CHECK_INTERVAL,
        }
    }

    /// Only start walks from the given faces
    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = FaceId>) -> Self {
        self.seeds = Some(seeds.into_iter().collect());
        self
    }

    /// Apply the slot settings of a configuration
    ///
    /// A slot never has fewer than [`MIN_SLOT_FACES`] faces, whatever the
    /// configuration says.
    pub fn with_config(mut self, config: &RecognitionConfig) -> Self {
        self.min_faces = config.min_slot_faces.max(MIN_SLOT_FACES);
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
        let mut it: Box<dyn AagIterator + '_> = match &self.seeds {
            Some(seeds) => Box::new(self.aag.subset_iter(seeds.iter().copied())),
            None => Box::new(self.aag.random_iter()),
        };
        let mut visited = Visited::new(self.aag.face_count());
        let mut cancel = CancelCheck::new(self.cancel.as_ref(), self.cancel_interval);
        let mut result = Recognition::default();

        while it.more() {
            if let Some(seed) = it.face_id() {
                if !self.aag.contains(seed) {
                    result.skip(Diagnostic::not_in_graph(seed));
                } else if !visited.contains(seed) {
                    if let Some(region) = self.grow(seed, &mut visited, &mut cancel, &mut result)? {
                        result.features.push(region.into_iter().collect());
                    }
                }
            }
            it.next();
        }

        tracing::debug!(
            "Slot recognition: {} slots, {} faces visited, {} skipped",
            result.features.len(),
            result.visit_order.len(),
            result.diagnostics.len()
        );
        Ok(result)
    }

    /// Walk from `seed` and return the region if it is accepted
    fn grow(
        &self,
        seed: FaceId,
        visited: &mut Visited,
        cancel: &mut CancelCheck<'_>,
        result: &mut Recognition,
    ) -> AagResult<Option<Vec<FaceId>>> {
        let mut region = Vec::new();
        let mut convex = false;
        let mut current = seed;

        let last_neighbors = loop {
            cancel.tick()?;
            visited.insert(current);
            region.push(current);
            result.visit_order.push(current);

            let neighbors = self.aag.neighbors(current).unwrap_or_default();
            for &neighbor in neighbors {
                match self.arc_angle(current, neighbor) {
                    Ok(AngleType::Convex) => convex = true,
                    Ok(_) => {}
                    Err(diagnostic) => {
                        // An undecidable arc cannot prove the region non-convex
                        convex = true;
                        result.skip(diagnostic);
                    }
                }
            }

            // Neighbor lists are sorted, so the first hit is the minimum ID
            match neighbors.iter().copied().find(|n| !visited.contains(*n)) {
                Some(next) => {
                    tracing::trace!("Slot walk from {}: {} -> {}", seed, current, next);
                    current = next;
                }
                None => break neighbors,
            }
        };

        let closed = last_neighbors.contains(&seed);
        let accepted = closed && !convex && region.len() >= self.min_faces;
        tracing::trace!(
            "Slot candidate at {}: {} faces, closed={}, convex={}, accepted={}",
            seed,
            region.len(),
            closed,
            convex,
            accepted
        );
        Ok(accepted.then_some(region))
    }

    /// Angle of the arc between two faces, preferring a cached [`AngleTag`]
    fn arc_angle(&self, a: FaceId, b: FaceId) -> Result<AngleType, Diagnostic> {
        if let Some(tag) = self.aag.arc_attribute_as::<AngleTag>(a, b) {
            return Ok(tag.angle);
        }
        let Some(edge) = self.aag.arc(a, b).and_then(ArcData::first_edge) else {
            return Ok(AngleType::Undefined);
        };
        self.kernel
            .classify_angle(self.aag.shape(), a, b, edge)
            .query(b, "classify_angle")
    }
}
