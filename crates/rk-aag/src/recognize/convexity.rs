//! Arc convexity classification
//!
//! Classifies every arc once through the kernel and caches the result as an
//! [`AngleTag`] on the arc, so later passes do not query the kernel again.

use super::{CancelCheck, CancelToken, Diagnostic, QueryContext};
use crate::attribute::{AngleTag, AttributeKind};
use crate::config::RecognitionConfig;
use crate::constants::CANCEL_CHECK_INTERVAL;
use crate::graph::{Aag, AagResult, ArcKey};
use crate::kernel::{AngleType, GeometryKernel};

/// Counts produced by a classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvexityReport {
    pub convex: usize,
    pub concave: usize,
    pub smooth: usize,
    pub undefined: usize,
    /// Arcs the kernel could not classify; any earlier tag on them is removed
    pub diagnostics: Vec<Diagnostic>,
}

impl ConvexityReport {
    /// Number of arcs that received a tag
    pub fn classified(&self) -> usize {
        self.convex + self.concave + self.smooth + self.undefined
    }

    fn count(&mut self, angle: AngleType) {
        match angle {
            AngleType::Convex => self.convex += 1,
            AngleType::Concave => self.concave += 1,
            AngleType::Smooth => self.smooth += 1,
            AngleType::Undefined => self.undefined += 1,
        }
    }
}

/// Tags every arc of a graph with its convexity
pub struct ConvexityClassifier<'a> {
    kernel: &'a dyn GeometryKernel,
    cancel: Option<CancelToken>,
    cancel_interval: usize,
}

impl<'a> ConvexityClassifier<'a> {
    /// Create a classifier using the given kernel
    pub fn new(kernel: &'a dyn GeometryKernel) -> Self {
        Self {
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

    /// Classify all arcs and store the tags
    ///
    /// Tags are written only after every arc has been classified, so a
    /// cancelled pass leaves the graph untouched. Arcs that cannot be
    /// classified lose any tag left by an earlier pass.
    pub fn perform(&self, aag: &mut Aag) -> AagResult<ConvexityReport> {
        let mut cancel = CancelCheck::new(self.cancel.as_ref(), self.cancel_interval);
        let mut report = ConvexityReport::default();
        let mut tags: Vec<(ArcKey, AngleType)> = Vec::with_capacity(aag.arc_count());
        let mut stale: Vec<ArcKey> = Vec::new();

        for (key, arc) in aag.arcs() {
            cancel.tick()?;
            let Some(edge) = arc.first_edge() else {
                stale.push(key);
                continue;
            };
            let classified = self
                .kernel
                .classify_angle(aag.shape(), key.lo(), key.hi(), edge)
                .query(key.lo(), "classify_angle");
            match classified {
                Ok(angle) => {
                    tracing::trace!("Arc {} via {} is {}", key, edge, angle);
                    tags.push((key, angle));
                }
                Err(diagnostic) => {
                    tracing::warn!("Arc {}: {}", key, diagnostic);
                    report.diagnostics.push(diagnostic);
                    stale.push(key);
                }
            }
        }

        for (key, angle) in tags {
            report.count(angle);
            aag.set_arc_attribute(key.lo(), key.hi(), Box::new(AngleTag::new(angle)));
        }
        for key in stale {
            aag.remove_arc_attribute(key.lo(), key.hi(), AngleTag::GUID);
        }

        tracing::debug!(
            "Convexity: {} convex, {} concave, {} smooth, {} undefined, {} failed",
            report.convex,
            report.concave,
            report.smooth,
            report.undefined,
            report.diagnostics.len()
        );
        Ok(report)
    }
}
