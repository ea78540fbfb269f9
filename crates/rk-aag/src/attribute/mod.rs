//! Attribute Store
//!
//! Typed, GUID-keyed attributes attached to AAG nodes and arcs. A store
//! holds at most one attribute per GUID per attachment point; attributes
//! compare, hash and order by GUID alone so heterogeneous sets can be
//! deduplicated by kind.
//!
//! New attribute kinds only need to implement [`Attribute`] (and
//! [`AttributeKind`] for typed access); the graph and the store stay as
//! they are.

mod kinds;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

pub use kinds::{AngleTag, FeatureTag, HostTag};

/// Capability set every attribute exposes
pub trait Attribute: Any + fmt::Debug + Send + Sync {
    /// Kind identity
    fn guid(&self) -> Uuid;

    /// Independent deep clone
    fn copy(&self) -> Box<dyn Attribute>;

    /// Human-readable diagnostic form
    fn dump(&self) -> String;

    /// Upcast for typed access
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An attribute type with a compile-time GUID
pub trait AttributeKind: Attribute + Sized {
    /// The GUID every instance of this kind reports
    const GUID: Uuid;
}

impl PartialEq for dyn Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.guid() == other.guid()
    }
}

impl Eq for dyn Attribute {}

impl Hash for dyn Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid().hash(state);
    }
}

impl PartialOrd for dyn Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for dyn Attribute {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.guid().cmp(&other.guid())
    }
}

impl Clone for Box<dyn Attribute> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

/// Attributes attached to one node or arc, one per GUID
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    items: BTreeMap<Uuid, Box<dyn Attribute>>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or overwrite; returns the attribute previously stored under that GUID
    pub fn insert(&mut self, attr: Box<dyn Attribute>) -> Option<Box<dyn Attribute>> {
        self.items.insert(attr.guid(), attr)
    }

    /// Get the attribute of the given kind
    pub fn get(&self, guid: Uuid) -> Option<&dyn Attribute> {
        self.items.get(&guid).map(|attr| attr.as_ref())
    }

    /// Get a mutable attribute of the given kind
    pub fn get_mut(&mut self, guid: Uuid) -> Option<&mut (dyn Attribute + 'static)> {
        self.items.get_mut(&guid).map(|attr| attr.as_mut())
    }

    /// Get the attribute of kind `T`, downcast
    pub fn get_as<T: AttributeKind>(&self) -> Option<&T> {
        self.get(T::GUID)?.as_any().downcast_ref::<T>()
    }

    /// Get the attribute of kind `T` mutably, downcast
    pub fn get_as_mut<T: AttributeKind>(&mut self) -> Option<&mut T> {
        self.get_mut(T::GUID)?.as_any_mut().downcast_mut::<T>()
    }

    /// Detach the attribute of the given kind
    pub fn remove(&mut self, guid: Uuid) -> Option<Box<dyn Attribute>> {
        self.items.remove(&guid)
    }

    /// Check if an attribute of the given kind is attached
    pub fn contains(&self, guid: Uuid) -> bool {
        self.items.contains_key(&guid)
    }

    /// Iterate over attributes in GUID order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Attribute> {
        self.items.values().map(|attr| attr.as_ref())
    }

    /// Number of attached attributes
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is attached
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Attribute sets keyed by attachment point (face ID or arc key)
#[derive(Debug, Clone)]
pub struct AttributeStore<K> {
    sets: BTreeMap<K, AttributeSet>,
}

impl<K> Default for AttributeStore<K> {
    fn default() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> AttributeStore<K> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or overwrite an attribute at `key`
    pub fn set(&mut self, key: K, attr: Box<dyn Attribute>) -> Option<Box<dyn Attribute>> {
        self.sets.entry(key).or_default().insert(attr)
    }

    /// Get the attribute of the given kind at `key`
    pub fn get(&self, key: K, guid: Uuid) -> Option<&dyn Attribute> {
        self.sets.get(&key)?.get(guid)
    }

    /// Get the attribute of kind `T` at `key`
    pub fn get_as<T: AttributeKind>(&self, key: K) -> Option<&T> {
        self.sets.get(&key)?.get_as::<T>()
    }

    /// Get the attribute of kind `T` at `key` mutably
    pub fn get_as_mut<T: AttributeKind>(&mut self, key: K) -> Option<&mut T> {
        self.sets.get_mut(&key)?.get_as_mut::<T>()
    }

    /// Detach the attribute of the given kind at `key`
    pub fn remove(&mut self, key: K, guid: Uuid) -> Option<Box<dyn Attribute>> {
        let set = self.sets.get_mut(&key)?;
        let removed = set.remove(guid);
        if set.is_empty() {
            self.sets.remove(&key);
        }
        removed
    }

    /// All attributes at `key`
    pub fn set_at(&self, key: K) -> Option<&AttributeSet> {
        self.sets.get(&key)
    }

    /// Keys carrying an attribute of the given kind, in ascending order
    pub fn keys_with(&self, guid: Uuid) -> impl Iterator<Item = K> + '_ {
        self.sets
            .iter()
            .filter(move |(_, set)| set.contains(guid))
            .map(|(key, _)| *key)
    }

    /// Detach every attribute of the given kind; returns how many were removed
    pub fn clear_kind(&mut self, guid: Uuid) -> usize {
        let mut removed = 0;
        self.sets.retain(|_, set| {
            if set.remove(guid).is_some() {
                removed += 1;
            }
            !set.is_empty()
        });
        removed
    }

    /// Iterate over every attachment point and its attributes
    pub fn iter(&self) -> impl Iterator<Item = (K, &AttributeSet)> {
        self.sets.iter().map(|(key, set)| (*key, set))
    }

    /// Number of attachment points carrying at least one attribute
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureType;
    use crate::kernel::{AngleType, FaceId};
    use std::collections::HashSet;

    #[test]
    fn test_overwrite_same_kind() {
        let mut set = AttributeSet::new();
        assert!(set.insert(Box::new(HostTag::new(1))).is_none());
        let previous = set.insert(Box::new(HostTag::new(2)));
        assert_eq!(previous.unwrap().dump(), "host group 1");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_as::<HostTag>().unwrap().group, 2);
    }

    #[test]
    fn test_equality_by_guid_only() {
        let a: Box<dyn Attribute> = Box::new(HostTag::new(1));
        let b: Box<dyn Attribute> = Box::new(HostTag::new(7));
        let c: Box<dyn Attribute> = Box::new(AngleTag::new(AngleType::Convex));
        assert!(*a == *b);
        assert!(*a != *c);

        let unique: HashSet<Box<dyn Attribute>> = [a, b, c].into_iter().collect();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_copy_is_independent() {
        let original = FeatureTag::new(FeatureType::Hole, 3);
        let mut copy = original.copy();
        assert_eq!(copy.guid(), original.guid());

        let tag = copy.as_any_mut().downcast_mut::<FeatureTag>().unwrap();
        tag.feature_id = 9;
        assert_eq!(original.feature_id, 3);
    }

    #[test]
    fn test_store_remove_and_keys() {
        let mut store: AttributeStore<FaceId> = AttributeStore::new();
        store.set(FaceId(2), Box::new(HostTag::new(1)));
        store.set(FaceId(1), Box::new(HostTag::new(1)));
        store.set(FaceId(1), Box::new(AngleTag::new(AngleType::Smooth)));

        let keys: Vec<_> = store.keys_with(HostTag::GUID).collect();
        assert_eq!(keys, vec![FaceId(1), FaceId(2)]);

        assert!(store.remove(FaceId(2), HostTag::GUID).is_some());
        assert!(store.set_at(FaceId(2)).is_none());
        assert_eq!(store.clear_kind(HostTag::GUID), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(FaceId(3), HostTag::GUID).is_none());
    }
}
