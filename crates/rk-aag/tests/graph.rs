mod common;

use std::collections::{BTreeSet, HashSet};

use common::{build, ids, plate_with_blind_hole, plate_with_through_hole, ring};
use glam::DVec3;
use rk_aag::{
    Aag, AagError, AagIterator, AngleType, Attribute, AttributeKind, FaceId, FeatureTag,
    FeatureType, HostTag, MemoryKernel, NullKernel, Shape, ShapeData,
};

#[test]
fn test_graphs_are_symmetric() {
    for data in [
        plate_with_through_hole(2.0).0,
        plate_with_blind_hole(1.0).0,
        ring(7, AngleType::Concave),
        ShapeData::cuboid(DVec3::ZERO, DVec3::splat(2.0)),
    ] {
        let (_, aag) = build(data);
        assert!(aag.is_symmetric());
        for a in aag.face_ids() {
            for &b in aag.neighbors(a).unwrap() {
                assert!(aag.neighbors(b).unwrap().contains(&a), "{} -> {}", a, b);
            }
        }
    }
}

#[test]
fn test_random_iterator_total_coverage() {
    let (data, _) = plate_with_blind_hole(1.0);
    let (_, aag) = build(data);

    let mut seen = Vec::new();
    let mut it = aag.random_iter();
    while it.more() {
        seen.push(it.face_id().unwrap());
        it.next();
    }
    let distinct: HashSet<FaceId> = seen.iter().copied().collect();
    assert_eq!(seen.len(), aag.face_count() as usize);
    assert_eq!(distinct.len(), seen.len());
    assert!(seen.iter().all(|f| aag.contains(*f)));
}

#[test]
fn test_subset_iterator_containment() {
    let (_, aag) = build(ring(5, AngleType::Concave));
    let subset = ids(&[4, 2, 77, 0, 2]);
    let allowed: BTreeSet<FaceId> = subset.iter().copied().collect();

    let mut it = aag.subset_iter(subset.iter().copied());
    let mut out = BTreeSet::new();
    let mut yielded = Vec::new();
    while it.more() {
        let face = it.face_id().unwrap();
        let found = it.neighbors(&mut out);
        assert_eq!(found, aag.contains(face));
        yielded.push(face);
        it.next();
    }
    assert!(yielded.iter().all(|f| allowed.contains(f)));
    assert!(yielded.len() <= subset.len());
    assert_eq!(yielded, ids(&[0, 2, 4, 77]));
}

#[test]
fn test_attribute_round_trip_and_copy() {
    let (_, mut aag) = build(ring(3, AngleType::Concave));
    let tag = FeatureTag::new(FeatureType::Hole, 3);
    let guid = tag.guid();
    assert!(aag.set_attribute(FaceId(1), Box::new(tag.clone())));

    let stored = aag.attribute(FaceId(1), guid).unwrap();
    assert_eq!(stored.guid(), guid);

    let copy = stored.copy();
    assert_eq!(copy.guid(), guid);
    assert!(!std::ptr::addr_eq(copy.as_ref(), stored));
    assert_eq!(
        copy.as_any().downcast_ref::<FeatureTag>(),
        Some(&tag)
    );

    // Overwrite keeps a single attribute of the kind
    aag.set_attribute(FaceId(1), Box::new(FeatureTag::new(FeatureType::Slot, 1)));
    assert_eq!(aag.attributes(FaceId(1)).unwrap().len(), 1);
    assert_eq!(
        aag.attribute_as::<FeatureTag>(FaceId(1)).unwrap().feature_type,
        FeatureType::Slot
    );
}

#[test]
fn test_lookup_of_foreign_face_is_absent() {
    let (_, aag) = build(ring(3, AngleType::Concave));
    assert!(aag.neighbors(FaceId(40)).is_none());
    assert!(aag.attribute(FaceId(40), HostTag::GUID).is_none());
    assert!(aag.attribute(FaceId(2), HostTag::GUID).is_none());
}

#[test]
fn test_construction_failures() {
    let kernel = MemoryKernel::new();
    let missing = Shape::new(uuid::Uuid::new_v4());
    assert!(matches!(
        Aag::build(&kernel, &missing),
        Err(AagError::Construction(_))
    ));
    assert!(matches!(
        Aag::build(&NullKernel, &missing),
        Err(AagError::Construction(_))
    ));
}

#[test]
fn test_hole_plate_adjacency() {
    let (data, plate) = plate_with_through_hole(2.0);
    let (_, aag) = build(data);
    assert_eq!(aag.neighbors(plate.lateral).unwrap(), &[plate.top, plate.bottom]);
    assert_eq!(aag.degree(plate.top), Some(5));
    for wall in plate.walls {
        assert_eq!(aag.degree(wall), Some(4));
    }
}
