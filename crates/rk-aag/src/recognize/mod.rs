//! Feature Pattern Matchers
//!
//! Every matcher follows the same skeleton: take untraversed nodes from an
//! [`AagIterator`](crate::iterator::AagIterator), grow a candidate region
//! through the graph and test an acceptance predicate over it.
//!
//! Kernel predicates that cannot decide do not abort a pass. The face is
//! skipped and recorded as a [`Diagnostic`], so a caller can tell "skipped
//! because the kernel failed" apart from "examined and rejected".

mod convexity;
mod holes;
mod host;
mod slots;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::{Aag, AagError, AagResult};
use crate::kernel::{FaceId, GeometryKernel, KernelError, KernelResult};

pub use crate::feature::FaceIdSet;
pub use convexity::{ConvexityClassifier, ConvexityReport};
pub use holes::HoleRecognizer;
pub use host::{HostGrouper, tag_groups};
pub use slots::SlotRecognizer;

/// Dense set of visited face IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visited {
    bits: Vec<u64>,
    face_count: u32,
}

impl Visited {
    /// Create an empty set for faces `1..=face_count`
    pub fn new(face_count: u32) -> Self {
        Self {
            bits: vec![0; (face_count as usize).div_ceil(64)],
            face_count,
        }
    }

    fn position(&self, face: FaceId) -> Option<(usize, u64)> {
        if face.0 == 0 || face.0 > self.face_count {
            return None;
        }
        let slot = face.0 as usize - 1;
        Some((slot / 64, 1u64 << (slot % 64)))
    }

    /// Check if a face has been visited; IDs outside the range never are
    pub fn contains(&self, face: FaceId) -> bool {
        self.position(face)
            .and_then(|(word, mask)| self.bits.get(word).map(|bits| bits & mask != 0))
            .unwrap_or(false)
    }

    /// Mark a face visited; returns `true` if it was not visited before
    pub fn insert(&mut self, face: FaceId) -> bool {
        let Some((word, mask)) = self.position(face) else {
            return false;
        };
        match self.bits.get_mut(word) {
            Some(bits) if *bits & mask == 0 => {
                *bits |= mask;
                true
            }
            _ => false,
        }
    }

    /// Number of visited faces
    pub fn len(&self) -> usize {
        self.bits.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    /// Check if nothing has been visited
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|bits| *bits == 0)
    }
}

/// Why a face was skipped during recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A kernel query could not decide for this face
    QueryFailed { query: &'static str, message: String },
    /// A seed ID that is not a node of the graph
    NotInGraph,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::QueryFailed { query, message } => {
                write!(f, "query '{}' failed: {}", query, message)
            }
            SkipReason::NotInGraph => f.write_str("face is not in the graph"),
        }
    }
}

/// A face skipped by a recognition pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub face: FaceId,
    pub reason: SkipReason,
}

impl Diagnostic {
    /// Diagnostic for a failed kernel query
    ///
    /// The face named by the error wins over `face` when the kernel reports one.
    pub fn query_failed(face: FaceId, query: &'static str, err: &KernelError) -> Self {
        Self {
            face: err.face().unwrap_or(face),
            reason: SkipReason::QueryFailed {
                query,
                message: err.to_string(),
            },
        }
    }

    /// Diagnostic for a foreign seed ID
    pub fn not_in_graph(face: FaceId) -> Self {
        Self {
            face,
            reason: SkipReason::NotInGraph,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face {} skipped: {}", self.face, self.reason)
    }
}

/// Attach query context to a kernel result
pub(crate) trait QueryContext<T> {
    fn query(self, face: FaceId, query: &'static str) -> Result<T, Diagnostic>;
}

impl<T> QueryContext<T> for KernelResult<T> {
    fn query(self, face: FaceId, query: &'static str) -> Result<T, Diagnostic> {
        self.map_err(|err| Diagnostic::query_failed(face, query, &err))
    }
}

/// Outcome of one recognition pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    /// Accepted face sets, in recognition order
    pub features: Vec<FaceIdSet>,
    /// Faces skipped because of lookup or query failures
    pub diagnostics: Vec<Diagnostic>,
    /// Every node examined, in the order the pass reached it
    pub visit_order: Vec<FaceId>,
}

impl Recognition {
    /// Record a skipped face; a face is reported at most once per pass
    pub fn skip(&mut self, diagnostic: Diagnostic) {
        if self.is_skipped(diagnostic.face) {
            return;
        }
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Check if a face was skipped
    pub fn is_skipped(&self, face: FaceId) -> bool {
        self.diagnostics.iter().any(|d| d.face == face)
    }

    /// All skipped faces
    pub fn skipped_faces(&self) -> FaceIdSet {
        self.diagnostics.iter().map(|d| d.face).collect()
    }

    /// Faces that belong to some accepted feature
    pub fn recognized_faces(&self) -> FaceIdSet {
        self.features.iter().flatten().copied().collect()
    }
}

/// Shared flag used to stop a running pass from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Polls a [`CancelToken`] every `interval` steps
pub(crate) struct CancelCheck<'a> {
    token: Option<&'a CancelToken>,
    interval: usize,
    steps: usize,
}

impl<'a> CancelCheck<'a> {
    pub(crate) fn new(token: Option<&'a CancelToken>, interval: usize) -> Self {
        Self {
            token,
            interval: interval.max(1),
            steps: 0,
        }
    }

    /// Count one step and fail if cancellation was requested
    pub(crate) fn tick(&mut self) -> AagResult<()> {
        self.steps += 1;
        if self.steps % self.interval != 0 {
            return Ok(());
        }
        match self.token {
            Some(token) if token.is_cancelled() => {
                tracing::debug!("Recognition cancelled after {} steps", self.steps);
                Err(AagError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

/// Recognize holes whose radius does not exceed `radius_threshold`
pub fn recognize_holes(
    aag: &Aag,
    kernel: &dyn GeometryKernel,
    radius_threshold: f64,
) -> AagResult<Vec<FaceIdSet>> {
    let recognition = HoleRecognizer::new(aag, kernel)
        .with_radius_threshold(radius_threshold)
        .perform()?;
    Ok(recognition.features)
}

/// Recognize closed slot rings over the whole graph
pub fn recognize_slots(aag: &Aag, kernel: &dyn GeometryKernel) -> AagResult<Vec<FaceIdSet>> {
    Ok(SlotRecognizer::new(aag, kernel).perform()?.features)
}

/// Partition all faces into groups sharing one host surface
pub fn group_same_host(aag: &Aag, kernel: &dyn GeometryKernel) -> AagResult<Vec<FaceIdSet>> {
    Ok(HostGrouper::new(aag, kernel).perform()?.features)
}
