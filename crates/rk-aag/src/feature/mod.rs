//! Recognized Features
//!
//! A feature is a named set of face IDs. Recognized features are collected
//! per type and can be written back into the graph as [`FeatureTag`]
//! attributes, so later passes can ask "which feature owns this face".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::attribute::{AttributeKind, FeatureTag};
use crate::graph::Aag;
use crate::kernel::FaceId;

/// A set of face IDs, ordered for deterministic output
pub type FaceIdSet = BTreeSet<FaceId>;

/// Kind of recognized feature
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    /// Cylindrical hole (lateral face plus optional bottom cap)
    Hole,
    /// Slot or groove (closed ring of non-convex faces)
    Slot,
    /// Faces sharing one host surface
    HostGroup,
    /// Application-defined feature class
    Custom(String),
}

impl FeatureType {
    /// Get the type name of this feature
    pub fn type_name(&self) -> &str {
        match self {
            FeatureType::Hole => "hole",
            FeatureType::Slot => "slot",
            FeatureType::HostGroup => "host group",
            FeatureType::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A recognized feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// 1-based number within its type
    pub id: u32,
    /// Feature class
    pub feature_type: FeatureType,
    /// Name of the feature
    pub name: String,
    /// Faces making up the feature
    pub faces: FaceIdSet,
}

impl Feature {
    /// Create a feature named after its type and number
    pub fn new(feature_type: FeatureType, id: u32, faces: FaceIdSet) -> Self {
        let name = format!("{} {}", feature_type, id);
        Self {
            id,
            feature_type,
            name,
            faces,
        }
    }

    /// Get the name of this feature
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the feature contains a face
    pub fn contains(&self, face: FaceId) -> bool {
        self.faces.contains(&face)
    }
}

/// Features grouped by type, then by feature number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesByType {
    features: BTreeMap<FeatureType, BTreeMap<u32, FaceIdSet>>,
}

impl FeaturesByType {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature and return its 1-based number within the type
    pub fn insert(&mut self, feature_type: FeatureType, faces: FaceIdSet) -> u32 {
        let by_id = self.features.entry(feature_type).or_default();
        let id = by_id.keys().next_back().map_or(1, |last| last + 1);
        by_id.insert(id, faces);
        id
    }

    /// Add several features of one type in order
    pub fn extend(
        &mut self,
        feature_type: FeatureType,
        sets: impl IntoIterator<Item = FaceIdSet>,
    ) -> Vec<u32> {
        sets.into_iter()
            .map(|faces| self.insert(feature_type.clone(), faces))
            .collect()
    }

    /// Get the faces of a feature
    pub fn get(&self, feature_type: &FeatureType, id: u32) -> Option<&FaceIdSet> {
        self.features.get(feature_type)?.get(&id)
    }

    /// Remove a feature
    pub fn remove(&mut self, feature_type: &FeatureType, id: u32) -> Option<FaceIdSet> {
        let by_id = self.features.get_mut(feature_type)?;
        let removed = by_id.remove(&id);
        if by_id.is_empty() {
            self.features.remove(feature_type);
        }
        removed
    }

    /// All features of one type, keyed by number
    pub fn of_type(&self, feature_type: &FeatureType) -> Option<&BTreeMap<u32, FaceIdSet>> {
        self.features.get(feature_type)
    }

    /// Feature types present, in order
    pub fn types(&self) -> impl Iterator<Item = &FeatureType> {
        self.features.keys()
    }

    /// Iterate over every feature
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().flat_map(|(feature_type, by_id)| {
            by_id
                .iter()
                .map(|(id, faces)| Feature::new(feature_type.clone(), *id, faces.clone()))
        })
    }

    /// Total number of features
    pub fn len(&self) -> usize {
        self.features.values().map(BTreeMap::len).sum()
    }

    /// Check if there are no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Attach a [`FeatureTag`] to every face of every feature
    ///
    /// A face can carry one tag; when features overlap the later one wins.
    /// Returns the number of faces tagged.
    pub fn tag(&self, aag: &mut Aag) -> usize {
        let mut tagged = 0;
        for feature in self.features() {
            for &face in &feature.faces {
                if let Some(previous) = aag.attribute_as::<FeatureTag>(face) {
                    tracing::warn!(
                        "Face {} already belongs to {}; retagging as {}",
                        face,
                        previous,
                        feature.name
                    );
                }
                let tag = FeatureTag::new(feature.feature_type.clone(), feature.id);
                if aag.set_attribute(face, Box::new(tag)) {
                    tagged += 1;
                }
            }
        }
        tagged
    }

    /// Collect features back from the tags stored in a graph
    pub fn from_tags(aag: &Aag) -> Self {
        let mut features = Self::new();
        for face in aag.node_attributes().keys_with(FeatureTag::GUID) {
            if let Some(tag) = aag.attribute_as::<FeatureTag>(face) {
                features
                    .features
                    .entry(tag.feature_type.clone())
                    .or_default()
                    .entry(tag.feature_id)
                    .or_default()
                    .insert(face);
            }
        }
        features
    }
}

/// Which feature a face was tagged with, if any
pub fn feature_of(aag: &Aag, face: FaceId) -> Option<(FeatureType, u32)> {
    aag.attribute_as::<FeatureTag>(face)
        .map(|tag| (tag.feature_type.clone(), tag.feature_id))
}
