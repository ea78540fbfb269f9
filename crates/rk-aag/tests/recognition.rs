mod common;

use common::{build, ids, init_tracing, plate_with_blind_hole, plate_with_through_hole, ring};
use rk_aag::{
    AngleType, CancelToken, ConvexityClassifier, EdgeId, FaceIdSet, FeatureType, FeaturesByType,
    HoleRecognizer, RecognitionConfig, SlotRecognizer, feature_of, group_same_host,
    recognize_holes, recognize_slots,
};

#[test]
fn test_through_hole_under_threshold() {
    init_tracing();
    let (data, plate) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);

    let holes = recognize_holes(&aag, &kernel, 5.0).unwrap();
    assert_eq!(holes, vec![FaceIdSet::from([plate.lateral])]);
}

#[test]
fn test_through_hole_over_threshold() {
    let (data, _) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);
    assert!(recognize_holes(&aag, &kernel, 1.0).unwrap().is_empty());
}

#[test]
fn test_blind_hole_takes_cap() {
    let (data, plate) = plate_with_blind_hole(2.0);
    let (kernel, aag) = build(data);

    let holes = recognize_holes(&aag, &kernel, 5.0).unwrap();
    let cap = plate.cap.unwrap();
    assert_eq!(holes, vec![FaceIdSet::from([plate.lateral, cap])]);
    assert!(!holes[0].contains(&plate.top));
}

#[test]
fn test_concave_ring_is_one_slot() {
    init_tracing();
    let (kernel, aag) = build(ring(4, AngleType::Concave));
    let slots = recognize_slots(&aag, &kernel).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0], ids(&[1, 2, 3, 4]).into_iter().collect::<FaceIdSet>());
}

#[test]
fn test_single_convex_arc_rejects_ring() {
    let mut data = ring(4, AngleType::Concave);
    data.set_edge_angle(EdgeId(3), AngleType::Convex);
    let (kernel, aag) = build(data);

    let result = SlotRecognizer::new(&aag, &kernel)
        .with_seeds(ids(&[1]))
        .perform()
        .unwrap();
    assert!(result.features.is_empty());
    // Rejected faces stay traversed
    assert_eq!(result.visit_order, ids(&[1, 2, 3, 4]));
}

#[test]
fn test_recognition_is_deterministic() {
    let (kernel, aag) = build(ring(6, AngleType::Concave));
    let first = SlotRecognizer::new(&aag, &kernel).perform().unwrap();
    let second = SlotRecognizer::new(&aag, &kernel).perform().unwrap();
    assert_eq!(first, second);

    let (data, _) = plate_with_blind_hole(1.0);
    let (kernel, aag) = build(data);
    let first = HoleRecognizer::new(&aag, &kernel).perform().unwrap();
    let second = HoleRecognizer::new(&aag, &kernel).perform().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_plate_slot_scan_reports_cylinder() {
    // Arcs around the hole wall cannot be classified from planar geometry
    let (data, plate) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);
    let result = SlotRecognizer::new(&aag, &kernel).perform().unwrap();
    assert!(result.features.is_empty());
    assert!(result.is_skipped(plate.lateral));
    assert_eq!(result.visit_order.len(), aag.face_count() as usize);
}

#[test]
fn test_same_host_groups_plate() {
    let (data, plate) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);
    let groups = group_same_host(&aag, &kernel).unwrap();
    // Every face of the plate lies on its own surface
    assert_eq!(groups.len(), aag.face_count() as usize);
    assert!(groups.contains(&FaceIdSet::from([plate.top])));
}

#[test]
fn test_classify_then_recognize_and_tag() {
    let (kernel, mut aag) = build(ring(5, AngleType::Concave));
    let report = ConvexityClassifier::new(&kernel).perform(&mut aag).unwrap();
    assert_eq!(report.concave, 5);

    let mut features = FeaturesByType::new();
    let slots = SlotRecognizer::new(&aag, &kernel).perform().unwrap();
    features.extend(FeatureType::Slot, slots.features);
    assert_eq!(features.tag(&mut aag), 5);

    for face in aag.face_ids() {
        assert_eq!(feature_of(&aag, face), Some((FeatureType::Slot, 1)));
    }
    assert!(aag.dump().contains("feature slot #1"));
}

#[test]
fn test_config_drives_recognizers() {
    let config = RecognitionConfig {
        hole_radius_threshold: 1.5,
        ..Default::default()
    };
    let (data, _) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);
    let result = HoleRecognizer::new(&aag, &kernel)
        .with_config(&config)
        .perform()
        .unwrap();
    assert!(result.features.is_empty());
}

#[test]
fn test_cancel_before_start() {
    let (data, _) = plate_with_through_hole(2.0);
    let (kernel, aag) = build(data);
    let token = CancelToken::new();
    token.cancel();
    let config = RecognitionConfig {
        cancel_check_interval: 1,
        ..Default::default()
    };
    let result = HoleRecognizer::new(&aag, &kernel)
        .with_config(&config)
        .with_cancel(token)
        .perform();
    assert!(matches!(result, Err(rk_aag::AagError::Cancelled)));
}
