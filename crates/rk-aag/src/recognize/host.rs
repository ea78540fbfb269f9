//! Same-host grouping
//!
//! Partitions every face into groups lying on one untrimmed surface. The
//! pairwise comparison is quadratic in the face count; kernel host
//! signatures prune pairs that cannot match.

use super::{CancelCheck, CancelToken, Diagnostic, Recognition, Visited};
use crate::attribute::{AttributeKind, HostTag};
use crate::config::RecognitionConfig;
use crate::constants::CANCEL_CHECK_INTERVAL;
use crate::feature::FaceIdSet;
use crate::graph::{Aag, AagResult};
use crate::kernel::GeometryKernel;

/// Groups faces by host surface
pub struct HostGrouper<'a> {
    aag: &'a Aag,
    kernel: &'a dyn GeometryKernel,
    cancel: Option<CancelToken>,
    cancel_interval: usize,
}

impl<'a> HostGrouper<'a> {
    /// Create a grouper over the whole graph
    pub fn new(aag: &'a Aag, kernel: &'a dyn GeometryKernel) -> Self {
        Self {
            aag,
            kernel,
            cancel: None,
            cancel_interval: CANCEL_CHECK_INTERVAL,
        }
    }

    /// Apply the cancellation interval of a configuration
    pub fn with_config(mut self, config: &RecognitionConfig) -> Self {
        self.cancel_interval = config.cancel_check_interval;
        self
    }

    /// Stop the pass when the token is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the grouping
    ///
    /// Every face ends up in exactly one group. A face whose host cannot be
    /// compared is reported once and forms a group of its own; it is never
    /// pulled into a later group.
    pub fn perform(&self) -> AagResult<Recognition> {
        let shape = self.aag.shape();
        let signatures: Vec<Option<u64>> = self
            .aag
            .face_ids()
            .map(|face| self.kernel.host_signature(shape, face))
            .collect();
        let signature = |face: crate::kernel::FaceId| {
            face.slot()
                .and_then(|slot| signatures.get(slot).copied())
                .flatten()
        };

        let mut assigned = Visited::new(self.aag.face_count());
        let mut cancel = CancelCheck::new(self.cancel.as_ref(), self.cancel_interval);
        let mut result = Recognition::default();

        for seed in self.aag.face_ids() {
            if !assigned.insert(seed) {
                continue;
            }
            result.visit_order.push(seed);
            let mut group = FaceIdSet::from([seed]);

            if !result.is_skipped(seed) {
                for other in self.aag.face_ids().skip(seed.index() as usize) {
                    cancel.tick()?;
                    if assigned.contains(other) || result.is_skipped(other) {
                        continue;
                    }
                    if let (Some(a), Some(b)) = (signature(seed), signature(other)) {
                        if a != b {
                            continue;
                        }
                    }
                    match self.kernel.same_host(shape, seed, other) {
                        Ok(true) => {
                            assigned.insert(other);
                            group.insert(other);
                        }
                        Ok(false) => {}
                        Err(err) => {
                            let diagnostic = Diagnostic::query_failed(other, "same_host", &err);
                            let failed_seed = diagnostic.face == seed;
                            result.skip(diagnostic);
                            if failed_seed {
                                break;
                            }
                        }
                    }
                }
            }

            tracing::trace!("Host group {}: {:?}", result.features.len() + 1, group);
            result.features.push(group);
        }

        tracing::debug!(
            "Same-host grouping: {} groups over {} faces",
            result.features.len(),
            self.aag.face_count()
        );
        Ok(result)
    }
}

/// Attach a 1-based [`HostTag`] to every face of every group
///
/// Tags left over from an earlier grouping are removed first.
pub fn tag_groups(aag: &mut Aag, groups: &[FaceIdSet]) -> usize {
    aag.node_attributes_mut().clear_kind(HostTag::GUID);
    let mut tagged = 0;
    for (index, group) in groups.iter().enumerate() {
        for &face in group {
            if aag.set_attribute(face, Box::new(HostTag::new(index as u32 + 1))) {
                tagged += 1;
            }
        }
    }
    tagged
}
