//! AAG snapshots
//!
//! A snapshot is a plain data copy of a graph: face count, arc records and
//! the built-in attributes keyed by face ID or face pair. It can be written
//! to RON and restored against the same shape later without re-running the
//! kernel queries. Attribute kinds outside the built-in set are not stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::attribute::{AngleTag, Attribute, AttributeSet, FeatureTag, HostTag};
use crate::constants::SNAPSHOT_VERSION;
use crate::graph::{Aag, AagResult, ArcData, ArcKey};
use crate::kernel::{EdgeId, FaceId, GeometryKernel, Shape};

/// Snapshot-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// A built-in attribute in serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredAttribute {
    Feature(FeatureTag),
    Angle(AngleTag),
    Host(HostTag),
}

impl StoredAttribute {
    /// Convert an attribute if it is one of the built-in kinds
    pub fn from_attribute(attr: &dyn Attribute) -> Option<Self> {
        let any = attr.as_any();
        if let Some(tag) = any.downcast_ref::<FeatureTag>() {
            Some(StoredAttribute::Feature(tag.clone()))
        } else if let Some(tag) = any.downcast_ref::<AngleTag>() {
            Some(StoredAttribute::Angle(*tag))
        } else {
            any.downcast_ref::<HostTag>()
                .map(|tag| StoredAttribute::Host(*tag))
        }
    }

    /// Turn back into a boxed attribute
    pub fn into_attribute(self) -> Box<dyn Attribute> {
        match self {
            StoredAttribute::Feature(tag) => Box::new(tag),
            StoredAttribute::Angle(tag) => Box::new(tag),
            StoredAttribute::Host(tag) => Box::new(tag),
        }
    }
}

fn store_set(set: &AttributeSet) -> Vec<StoredAttribute> {
    set.iter()
        .filter_map(|attr| {
            let stored = StoredAttribute::from_attribute(attr);
            if stored.is_none() {
                tracing::debug!("Attribute kind {} is not stored in snapshots", attr.guid());
            }
            stored
        })
        .collect()
}

/// One arc of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub lo: FaceId,
    pub hi: FaceId,
    pub edges: Vec<EdgeId>,
    #[serde(default)]
    pub non_manifold: bool,
}

/// Attributes of one face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub face: FaceId,
    pub attributes: Vec<StoredAttribute>,
}

/// Attributes of one arc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcAttributes {
    pub lo: FaceId,
    pub hi: FaceId,
    pub attributes: Vec<StoredAttribute>,
}

/// Serializable copy of an [`Aag`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AagSnapshot {
    /// Format version
    pub version: u32,
    /// Number of faces in the source shape
    pub face_count: u32,
    /// Arc records in ascending face pair order
    pub arcs: Vec<ArcRecord>,
    /// Face attributes in ascending face order
    #[serde(default)]
    pub node_attributes: Vec<NodeAttributes>,
    /// Arc attributes in ascending face pair order
    #[serde(default)]
    pub arc_attributes: Vec<ArcAttributes>,
}

impl AagSnapshot {
    /// Copy the topology and built-in attributes of a graph
    pub fn capture(aag: &Aag) -> Self {
        let arcs = aag
            .arcs()
            .map(|(key, arc)| ArcRecord {
                lo: key.lo(),
                hi: key.hi(),
                edges: arc.edges.clone(),
                non_manifold: arc.non_manifold,
            })
            .collect();

        let node_attributes = aag
            .node_attributes()
            .iter()
            .map(|(face, set)| NodeAttributes {
                face,
                attributes: store_set(set),
            })
            .filter(|entry| !entry.attributes.is_empty())
            .collect();

        let arc_attributes = aag
            .arc_attributes()
            .iter()
            .map(|(key, set)| ArcAttributes {
                lo: key.lo(),
                hi: key.hi(),
                attributes: store_set(set),
            })
            .filter(|entry| !entry.attributes.is_empty())
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            face_count: aag.face_count(),
            arcs,
            node_attributes,
            arc_attributes,
        }
    }

    /// Rebuild the graph and bind it to `shape`
    pub fn restore(&self, shape: Shape) -> Result<Aag, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Invalid(format!(
                "unsupported version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.face_count == 0 {
            return Err(SnapshotError::Invalid("snapshot has no faces".into()));
        }

        let in_range = |face: FaceId| face.0 >= 1 && face.0 <= self.face_count;
        let mut arcs = BTreeMap::new();
        for record in &self.arcs {
            if record.lo >= record.hi || !in_range(record.lo) || !in_range(record.hi) {
                return Err(SnapshotError::Invalid(format!(
                    "bad arc {}-{} for {} faces",
                    record.lo, record.hi, self.face_count
                )));
            }
            let data = ArcData {
                edges: record.edges.clone(),
                non_manifold: record.non_manifold,
            };
            if arcs.insert(ArcKey::new(record.lo, record.hi), data).is_some() {
                return Err(SnapshotError::Invalid(format!(
                    "duplicate arc {}-{}",
                    record.lo, record.hi
                )));
            }
        }

        let mut aag = Aag::from_arcs(shape, self.face_count, arcs);

        for entry in &self.node_attributes {
            for attr in &entry.attributes {
                if !aag.set_attribute(entry.face, attr.clone().into_attribute()) {
                    return Err(SnapshotError::Invalid(format!(
                        "attribute on unknown face {}",
                        entry.face
                    )));
                }
            }
        }
        for entry in &self.arc_attributes {
            for attr in &entry.attributes {
                if !aag.set_arc_attribute(entry.lo, entry.hi, attr.clone().into_attribute()) {
                    return Err(SnapshotError::Invalid(format!(
                        "attribute on unknown arc {}-{}",
                        entry.lo, entry.hi
                    )));
                }
            }
        }

        tracing::debug!(
            "Restored AAG snapshot: {} faces, {} arcs",
            aag.face_count(),
            aag.arc_count()
        );
        Ok(aag)
    }

    /// Restore after checking that the kernel still indexes the same face count
    pub fn restore_checked(&self, kernel: &dyn GeometryKernel, shape: &Shape) -> AagResult<Aag> {
        let index = kernel.index_faces(shape)?;
        if index.face_count() != self.face_count {
            return Err(SnapshotError::Invalid(format!(
                "shape {} has {} faces, snapshot has {}",
                shape.id,
                index.face_count(),
                self.face_count
            ))
            .into());
        }
        Ok(self.restore(shape.clone())?)
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SnapshotError::Serialize(e.to_string()))
    }

    /// Parse a RON string
    pub fn from_ron(content: &str) -> Result<Self, SnapshotError> {
        ron::from_str(content).map_err(|e| SnapshotError::Deserialize(e.to_string()))
    }

    /// Save the snapshot to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let content = self.to_ron()?;
        std::fs::write(path.as_ref(), content).map_err(|e| SnapshotError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SnapshotError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }
}
