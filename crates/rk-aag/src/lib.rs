//! Attributed Adjacency Graph and Feature Recognition
//!
//! This crate provides:
//! - A geometry kernel trait that answers topology and surface queries
//! - The attributed adjacency graph (AAG) over the faces of a B-Rep solid
//! - GUID-keyed attributes on faces and arcs
//! - Full-graph and subset iterators
//! - Slot, hole, same-host and convexity recognizers
//! - RON snapshots and recognition configuration

pub mod attribute;
pub mod config;
pub mod constants;
pub mod feature;
pub mod graph;
pub mod iterator;
pub mod kernel;
pub mod recognize;
pub mod snapshot;

// Re-exports for convenience
pub use attribute::{
    AngleTag, Attribute, AttributeKind, AttributeSet, AttributeStore, FeatureTag, HostTag,
};
pub use config::{ConfigError, RecognitionConfig};
pub use feature::{FaceIdSet, Feature, FeatureType, FeaturesByType, feature_of};
pub use graph::{Aag, AagBuilder, AagError, AagResult, ArcData, ArcKey};
pub use iterator::{AagIterator, RandomIterator, SubsetIterator};
pub use kernel::{
    AngleType, EdgeFaces, EdgeId, FaceId, FaceIndex, GeometryKernel, KernelError, KernelResult,
    MemoryKernel, NullKernel, Shape, ShapeData,
};
pub use recognize::{
    CancelToken, ConvexityClassifier, ConvexityReport, Diagnostic, HoleRecognizer, HostGrouper,
    Recognition, SkipReason, SlotRecognizer, Visited, group_same_host, recognize_holes,
    recognize_slots, tag_groups,
};
pub use snapshot::{AagSnapshot, SnapshotError};
