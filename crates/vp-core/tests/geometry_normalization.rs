//! Integration tests: every historical geometry encoding normalizes to the
//! same canonical record (vp-core).

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vp_core::geometry::{GeometrySource, normalize_geometry, normalize_record, shape_of};
use vp_core::model::{CanonicalGeometry, ShapeType};

fn records() -> Vec<Value> {
    serde_json::from_str(include_str!("fixtures/legacy_records.json")).unwrap()
}

#[test]
fn every_box_encoding_yields_the_same_geometry() {
    let expected = CanonicalGeometry::from_box([40.0, 60.0, 140.0, 160.0]);
    for record in records() {
        let shape = shape_of(&record);
        assert_eq!(shape, ShapeType::Rectangle, "{record}");
        let normalized = normalize_geometry(shape, &record);
        assert_eq!(normalized.geometry, expected, "{record}");
        assert_ne!(normalized.source, GeometrySource::Default, "{record}");
    }
}

#[test]
fn normalized_records_share_one_geometry_encoding() {
    let geometries: Vec<Value> = records()
        .iter()
        .map(|r| normalize_record(r)["geometry"].clone())
        .collect();
    for g in &geometries {
        assert_eq!(g, &geometries[0]);
    }
    assert_eq!(
        geometries[0],
        json!({
            "coordinates": [40.0, 60.0, 140.0, 160.0],
            "start": { "x": 40.0, "y": 60.0 },
            "end": { "x": 140.0, "y": 160.0 },
        })
    );
}

#[test]
fn normalization_is_idempotent() {
    for record in records() {
        let once = normalize_record(&record);
        let twice = normalize_record(&once);
        assert_eq!(twice, once, "{record}");
    }
}

#[test]
fn point_shapes_and_fallbacks_are_idempotent() {
    let records = [
        json!({ "id": "p1", "shapeType": "polygon", "points": [[0, 0], [30, 0], [15, 25]] }),
        json!({ "id": "p2", "shapeType": "polygon", "geometry": { "points": [{ "x": 1, "y": 2 }] } }),
        json!({ "id": "p3", "shapeType": "polygon", "bbox": [0, 0, 10, 20] }),
        json!({ "id": "b1", "shapeType": "brushStroke", "path": "M 0 0 L 10 10 L 20 0", "strokeWidth": 6 }),
        json!({ "id": "b2", "type": "freehand", "pathData": "M 5 5 Q 10 0 15 5", "feather": 2 }),
        json!({ "id": "d1", "shapeType": "circle", "radius": 5 }),
        json!({ "id": "d2", "shapeType": "polygon" }),
        json!({ "id": "d3" }),
    ];
    for record in &records {
        let once = normalize_record(record);
        let twice = normalize_record(&once);
        assert_eq!(twice, once, "{record}");
    }

    let fallback = normalize_geometry(ShapeType::Circle, &records[5]);
    assert_eq!(fallback.source, GeometrySource::Default);
    let again = normalize_record(&normalize_record(&records[5]));
    assert_eq!(
        normalize_geometry(ShapeType::Circle, &again).geometry,
        fallback.geometry
    );
}

#[test]
fn legacy_keys_are_dropped_and_others_kept() {
    let record = &records()[1];
    let normalized = normalize_record(record);
    let map = normalized.as_object().unwrap();
    assert!(!map.contains_key("type"));
    assert!(!map.contains_key("coordinates"));
    assert_eq!(map["id"], "b");
    assert_eq!(map["color"], "red");
    assert_eq!(map["shapeType"], "rectangle");
}

#[test]
fn unrecognized_geometry_falls_back_to_default_box() {
    let normalized = normalize_geometry(ShapeType::Circle, &json!({ "id": "z", "radius": 5 }));
    assert_eq!(normalized.source, GeometrySource::Default);
    assert_eq!(
        normalized.geometry,
        CanonicalGeometry::from_box([100.0, 100.0, 200.0, 200.0])
    );
}
