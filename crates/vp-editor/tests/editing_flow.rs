//! Integration tests: drawing, selecting, and generating prompts through
//! the editing session (vp-editor).

use pretty_assertions::assert_eq;
use serde_json::json;
use smallvec::smallvec;
use vp_core::model::*;
use vp_editor::{EditorConfig, EditorSession, ValidationError};

fn rect(session: &mut EditorSession, coords: [f64; 4], color: PaletteColor) -> Annotation {
    session.create(
        ShapeType::Rectangle,
        &json!({ "coordinates": coords }),
        Some(color),
    )
}

// ─── Prompt scenarios ───────────────────────────────────────────────────

#[test]
fn single_annotation_with_own_operation() {
    let mut session = EditorSession::default();
    let a = rect(&mut session, [200.0, 200.0, 300.0, 300.0], PaletteColor::Green);
    session.update(
        a.id,
        AnnotationPatch {
            operation_type: Some(Some("change_color".into())),
            description: Some(Some("bright red".into())),
            ..AnnotationPatch::default()
        },
    );
    session.select_only(a.id);

    assert_eq!(
        session.generate().unwrap(),
        "Change the color of the green rectangular marked area \
         in the upper left part of the image to bright red"
    );
}

#[test]
fn shared_mode_joins_object_descriptions() {
    let mut session = EditorSession::default();
    let a = rect(&mut session, [0.0, 0.0, 100.0, 100.0], PaletteColor::Red);
    let b = session.create(
        ShapeType::Circle,
        &json!({ "coordinates": [700, 700, 800, 800] }),
        Some(PaletteColor::Blue),
    );
    session.toggle(a.id);
    session.toggle(b.id);
    session.set_global_operation(Some("add_object"));
    session.set_global_description("a cat");

    assert_eq!(
        session.generate().unwrap(),
        "Add a cat to the red rectangular marked area in the upper left part of the image, \
         and the blue circular marked area in the lower right part of the image"
    );
}

#[test]
fn no_selection_targets_entire_image() {
    let mut session = EditorSession::default();
    rect(&mut session, [0.0, 0.0, 10.0, 10.0], PaletteColor::Yellow);
    session.set_global_operation(Some("global_color_grade"));
    session.set_global_description("warmer tones");
    session.set_constraint_prompts(smallvec!["maintain natural skin tones".to_string()]);

    assert_eq!(
        session.generate().unwrap(),
        "Apply warmer tones color grading to the entire image, maintain natural skin tones"
    );
}

#[test]
fn numbers_are_included_on_request() {
    let mut session = EditorSession::default();
    rect(&mut session, [0.0, 0.0, 10.0, 10.0], PaletteColor::Red);
    let b = rect(&mut session, [400.0, 400.0, 500.0, 500.0], PaletteColor::Yellow);
    session.select_only(b.id);
    session.set_global_operation(Some("remove_object"));
    session.set_include_numbers(true);

    assert_eq!(
        session.generate().unwrap(),
        "Remove the yellow rectangular marked area (annotation 2) \
         in the center part of the image and fill the area naturally"
    );
}

#[test]
fn independent_annotations_override_shared_intent() {
    let mut session = EditorSession::default();
    let a = rect(&mut session, [0.0, 0.0, 100.0, 100.0], PaletteColor::Red);
    let b = rect(&mut session, [700.0, 0.0, 800.0, 100.0], PaletteColor::Green);
    session.update(a.id, AnnotationPatch::description("a blue sky"));
    session.update(
        a.id,
        AnnotationPatch {
            operation_type: Some(Some("replace_object".into())),
            ..AnnotationPatch::default()
        },
    );
    session.select_all();
    session.set_global_operation(Some("change_color"));
    session.set_global_description("gold");

    let prompt = session.generate().unwrap();
    assert!(prompt.starts_with("Replace the red rectangular marked area"), "{prompt}");
    assert!(
        prompt.ends_with(
            ", and Change the color of the green rectangular marked area \
             in the upper right part of the image to gold"
        ),
        "{prompt}"
    );
}

// ─── Validation ─────────────────────────────────────────────────────────

#[test]
fn failed_validation_leaves_session_untouched() {
    let mut session = EditorSession::default();
    rect(&mut session, [0.0, 0.0, 10.0, 10.0], PaletteColor::Red);
    session.set_global_operation(Some("text_add"));
    session.set_global_description("SALE");

    let before = session.annotations().to_vec();
    assert_eq!(
        session.generate(),
        Err(ValidationError::SelectionRequired {
            operation: "text_add".into()
        })
    );
    assert_eq!(session.annotations(), before.as_slice());
}

// ─── Store behavior through the session ─────────────────────────────────

#[test]
fn duplicate_offsets_and_renumbers() {
    let mut session = EditorSession::new(EditorConfig {
        duplicate_offset: 5.0,
        ..EditorConfig::default()
    });
    let a = rect(&mut session, [10.0, 10.0, 20.0, 20.0], PaletteColor::Blue);
    session.update(a.id, AnnotationPatch::operation("blur_area"));
    session.select_only(a.id);

    let copy = session.duplicate(a.id).unwrap();
    assert_ne!(copy.id, a.id);
    assert_eq!(copy.number, 2);
    assert_eq!(copy.geometry, CanonicalGeometry::from_box([15.0, 15.0, 25.0, 25.0]));
    assert_eq!(copy.color, PaletteColor::Blue);
    assert_eq!(copy.operation_type.as_deref(), Some("blur_area"));
    assert!(!copy.selected);
    assert!(session.store().selection_is_consistent());
}

#[test]
fn brush_duplicate_moves_path_too() {
    let mut session = EditorSession::default();
    let brush = session.create(
        ShapeType::BrushStroke,
        &json!({ "points": [[0, 0], [10, 0]], "path": "M 0 0 L 10 0", "strokeWidth": 4 }),
        None,
    );
    let copy = session.duplicate(brush.id).unwrap();
    let CanonicalGeometry::Points(pg) = copy.geometry else {
        panic!("expected point geometry");
    };
    assert_eq!(pg.points, vec![Point::new(20.0, 20.0), Point::new(30.0, 20.0)]);
    assert_eq!(pg.path.as_deref(), Some("M 20 20 L 30 20"));
    assert_eq!(pg.stroke_width, Some(4.0));
}

#[test]
fn numbering_is_never_reused() {
    let mut session = EditorSession::default();
    let a = rect(&mut session, [0.0, 0.0, 1.0, 1.0], PaletteColor::Red);
    session.delete(a.id);
    session.clear();
    let b = rect(&mut session, [0.0, 0.0, 1.0, 1.0], PaletteColor::Red);
    assert_eq!(b.number, 2);
}

#[test]
fn unknown_ids_are_no_ops() {
    let mut session = EditorSession::default();
    let a = rect(&mut session, [0.0, 0.0, 1.0, 1.0], PaletteColor::Red);
    let ghost = vp_core::AnnotationId::intern("ghost");
    assert!(!session.select_only(ghost));
    assert!(!session.toggle(ghost));
    assert!(!session.update(ghost, AnnotationPatch::color(PaletteColor::Blue)));
    assert!(session.delete(ghost).is_none());
    assert!(session.duplicate(ghost).is_none());
    assert_eq!(session.annotations().len(), 1);
    assert_eq!(session.annotations()[0].id, a.id);
}
