//! Integration tests for reading detection payloads into a scene.

mod common;

use planmark::Origin;

use common::*;

fn build(json: &str, options: IngestOptions) -> Scene {
    build_scene(&PredictionPayload::from_json(json), &options)
}

#[test]
fn test_sample_payload() {
    let scene = sample_scene();
    assert_eq!(scene.len(), 3);
    assert_eq!(scene.encoding(), BoxEncoding::CenterSize);
    assert!(scene.image_meta().is_some());

    let door = scene.get(&ElementId::from_index(1)).expect("door present");
    assert_eq!(door.class_label, "door");
    assert_eq!(door.origin, Origin::Model);
    assert!((door.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn test_malformed_payloads_give_empty_scene() {
    for json in ["not json", "{}", "42", r#"{ "predictions": "oops" }"#, "[]"] {
        let scene = scene_from(json);
        assert!(scene.is_empty(), "payload {:?} should give an empty scene", json);
    }
}

#[test]
fn test_malformed_entries_are_skipped() {
    let scene = scene_from(
        r#"{
            "predictions": [
                { "x": 1, "y": 2, "width": 3, "height": 4 },
                { "class": "door", "x": 100, "y": 50, "width": 40 },
                { "class": "door", "x": 100, "y": 50, "width": 40, "height": 20 }
            ],
            "image": { "width": 800, "height": 600 }
        }"#,
    );
    assert_eq!(scene.len(), 1);
    assert!(scene.get(&ElementId::from_index(2)).is_some());
}

#[test]
fn test_auto_encoding_locks_to_first_prediction() {
    let mixed = r#"{
        "predictions": [
            { "class": "room", "box_2d": [0, 0, 500, 500] },
            { "class": "door", "x": 100, "y": 50, "width": 40, "height": 20 }
        ],
        "image": { "width": 800, "height": 600 }
    }"#;

    let scene = build(mixed, IngestOptions::default());
    assert_eq!(scene.encoding(), BoxEncoding::Corner);
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.elements()[0].class_label, "room");

    let fixed = IngestOptions {
        encoding: EncodingPolicy::Fixed(BoxEncoding::CenterSize),
        ..IngestOptions::default()
    };
    let scene = build(mixed, fixed);
    assert_eq!(scene.encoding(), BoxEncoding::CenterSize);
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.elements()[0].class_label, "door");
}

#[test]
fn test_empty_payload_encoding_follows_metadata() {
    let with_meta = scene_from(r#"{ "predictions": [], "image": { "width": 10, "height": 10 } }"#);
    assert_eq!(with_meta.encoding(), BoxEncoding::CenterSize);

    let without_meta = scene_from(r#"{ "predictions": [] }"#);
    assert_eq!(without_meta.encoding(), BoxEncoding::Corner);
}

#[test]
fn test_missing_metadata_skips_center_size_rendering() {
    let scene = scene_from(r#"[{ "class": "door", "x": 100, "y": 50, "width": 40, "height": 20 }]"#);
    assert_eq!(scene.len(), 1);
    assert!(scene.image_meta().is_none());

    let frame = make_editor(scene).frame();
    assert!(frame.items.is_empty());
    assert_eq!(frame.legend.len(), 1);
}

#[test]
fn test_confidence_filter_and_default() {
    let json = r#"[
        { "class": "door", "box_2d": [0, 0, 100, 100], "confidence": 0.3 },
        { "class": "door", "box_2d": [0, 0, 200, 200], "confidence": 0.8 },
        { "class": "wall", "box_2d": [0, 0, 300, 300] }
    ]"#;
    let options = IngestOptions {
        min_confidence: 0.5,
        ..IngestOptions::default()
    };
    let scene = build(json, options);

    assert_eq!(scene.len(), 2);
    assert!(scene.get(&ElementId::from_index(0)).is_none());
    let wall = scene.get(&ElementId::from_index(2)).expect("wall kept");
    assert_eq!(wall.confidence, 1.0);
}

#[test]
fn test_supplied_ids_kept_and_duplicates_rederived() {
    let json = r#"[
        { "class": "door", "box_2d": [0, 0, 100, 100], "detection_id": "a" },
        { "class": "door", "box_2d": [0, 0, 200, 200], "id": "a" },
        { "class": "door", "box_2d": [0, 0, 300, 300], "detection_id": "" }
    ]"#;
    let scene = scene_from(json);
    let ids: Vec<&str> = scene.elements().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "det-1", "det-2"]);
}

#[test]
fn test_min_box_size_carried_into_scene() {
    let options = IngestOptions {
        min_box_size: 25.0,
        ..IngestOptions::default()
    };
    let scene = build(CORNER_PAYLOAD, options);
    assert_eq!(scene.min_box_size(), 25.0);
}

#[test]
fn test_payload_from_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("predictions.json");
    std::fs::write(&path, SAMPLE_PAYLOAD)?;

    let payload = PredictionPayload::from_file(&path)?;
    assert_eq!(payload.predictions.len(), 3);

    assert!(PredictionPayload::from_file(&dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_filtered_prediction_does_not_pick_encoding() {
    let json = r#"{
        "predictions": [
            { "class": "noise", "box_2d": [0, 0, 100, 100], "confidence": 0.1 },
            { "class": "door", "x": 100, "y": 50, "width": 40, "height": 20, "confidence": 0.9 },
            { "class": "room", "x": 400, "y": 300, "width": 600, "height": 400, "confidence": 0.95 }
        ],
        "image": { "width": 800, "height": 600 }
    }"#;
    let options = IngestOptions {
        min_confidence: 0.5,
        ..IngestOptions::default()
    };
    let scene = build(json, options);

    assert_eq!(scene.encoding(), BoxEncoding::CenterSize);
    assert_eq!(scene.len(), 2);
    assert!(scene.get(&ElementId::from_index(1)).is_some());
    assert!(scene.get(&ElementId::from_index(2)).is_some());
}
