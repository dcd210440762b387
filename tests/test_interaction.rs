//! Integration tests for the editor's tool state machine and hit handling.

mod common;

use planmark::render::{ChromeItem, Emphasis};

use common::*;

fn p(x: f32, y: f32) -> DisplayPoint {
    DisplayPoint::new(x, y)
}

/// Drag from `(10, 10)` to `(10 + w, 10 + h)` with the add tool
fn drag_box(editor: &mut Editor, w: f32, h: f32) -> EventOutcome {
    editor.set_tool(Tool::Add);
    assert_eq!(editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0))), EventOutcome::DragStarted);
    editor.handle_pointer(PointerEvent::Move(p(10.0 + w, 10.0 + h)));
    editor.handle_pointer(PointerEvent::Up(p(10.0 + w, 10.0 + h)))
}

#[test]
fn test_minimum_box_size() {
    let mut editor = make_editor(empty_corner_scene());

    assert_eq!(drag_box(&mut editor, 9.0, 40.0), EventOutcome::Discarded);
    assert_eq!(drag_box(&mut editor, 40.0, 9.0), EventOutcome::Discarded);
    assert!(editor.scene().is_empty());

    assert!(matches!(drag_box(&mut editor, 10.0, 10.0), EventOutcome::Added(_)));
    assert!(matches!(drag_box(&mut editor, 12.0, 30.0), EventOutcome::Added(_)));
    assert_eq!(editor.scene().len(), 2);
}

#[test]
fn test_added_box_uses_selected_class() {
    let mut editor = make_editor(empty_corner_scene());
    assert_eq!(editor.selected_class(), "door");

    editor.set_selected_class_for_add("window");
    let EventOutcome::Added(id) = drag_box(&mut editor, 40.0, 30.0) else {
        panic!("box should have been added");
    };
    let element = editor.scene().get(&id).expect("stored");
    assert_eq!(element.class_label, "window");

    let item = editor.frame().item(&id).cloned().expect("rendered");
    assert!((item.rect.left - 2.5).abs() < 0.01);
    assert!((item.rect.width - 10.0).abs() < 0.01);
    assert!((item.rect.height - 10.0).abs() < 0.01);
}

#[test]
fn test_leave_cancels_drag() {
    let mut editor = make_editor(empty_corner_scene());
    editor.set_tool(Tool::Add);
    editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0)));
    editor.handle_pointer(PointerEvent::Move(p(100.0, 100.0)));

    assert_eq!(editor.handle_pointer(PointerEvent::Leave), EventOutcome::DragCancelled);
    assert!(editor.tool_state().drag().is_none());
    assert_eq!(editor.handle_pointer(PointerEvent::Up(p(100.0, 100.0))), EventOutcome::Ignored);
    assert!(editor.scene().is_empty());
}

#[test]
fn test_tool_switch_drops_drag() {
    let mut editor = make_editor(empty_corner_scene());
    editor.set_tool(Tool::Add);
    editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0)));

    editor.set_tool(Tool::View);
    editor.set_tool(Tool::Add);
    assert!(editor.tool_state().drag().is_none());
    assert_eq!(editor.handle_pointer(PointerEvent::Up(p(100.0, 100.0))), EventOutcome::Ignored);
    assert!(editor.scene().is_empty());
}

#[test]
fn test_drag_is_clamped_to_image() {
    let mut editor = make_editor(empty_corner_scene());
    editor.set_tool(Tool::Add);

    assert_eq!(editor.handle_pointer(PointerEvent::Down(p(500.0, 10.0))), EventOutcome::Ignored);

    editor.handle_pointer(PointerEvent::Down(p(380.0, 280.0)));
    editor.handle_pointer(PointerEvent::Move(p(900.0, 900.0)));
    let drag = editor.tool_state().drag().copied().expect("drag in progress");
    assert_eq!(drag.current, p(400.0, 300.0));

    let outcome = editor.handle_pointer(PointerEvent::Up(p(900.0, 900.0)));
    assert!(matches!(outcome, EventOutcome::Added(_)));
}

#[test]
fn test_drag_preview_is_chrome() {
    let mut editor = make_editor(empty_corner_scene());
    editor.set_tool(Tool::Add);
    editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0)));
    editor.handle_pointer(PointerEvent::Move(p(50.0, 40.0)));

    let frame = editor.frame();
    assert!(matches!(frame.chrome.as_slice(), [ChromeItem::DragPreview { .. }]));
    assert!(frame.without_chrome().chrome.is_empty());
}

#[test]
fn test_remove_click_hits_topmost_and_stops_propagation() {
    // Toilet at display (80,60)-(120,90), on top of the room at (40,30)-(360,270)
    let mut editor = make_editor(scene_from(CORNER_PAYLOAD));
    editor.set_tool(Tool::Remove);

    let outcome = editor.handle_pointer(PointerEvent::Click(p(100.0, 75.0)));
    assert_eq!(outcome, EventOutcome::Removed(ElementId::from_index(1)));
    assert!(outcome.stops_propagation());
    assert_eq!(editor.scene().len(), 1);

    let outcome = editor.handle_pointer(PointerEvent::Click(p(100.0, 75.0)));
    assert_eq!(outcome, EventOutcome::Removed(ElementId::from_index(0)));

    let outcome = editor.handle_pointer(PointerEvent::Click(p(100.0, 75.0)));
    assert_eq!(outcome, EventOutcome::Ignored);
    assert!(!outcome.stops_propagation());
    assert!(editor.scene().is_empty());
}

#[test]
fn test_hidden_elements_cannot_be_hit() {
    let mut editor = make_editor(scene_from(CORNER_PAYLOAD));
    editor.toggle_class_visibility("toilet");
    editor.set_tool(Tool::Remove);

    let outcome = editor.handle_pointer(PointerEvent::Click(p(100.0, 75.0)));
    assert_eq!(outcome, EventOutcome::Removed(ElementId::from_index(0)));
    assert!(editor.scene().get(&ElementId::from_index(1)).is_some());
}

#[test]
fn test_hits_at_lists_topmost_first() {
    let editor = make_editor(scene_from(CORNER_PAYLOAD));
    let hits = planmark::editor::hit::hits_at(editor.scene(), editor.viewport(), p(100.0, 75.0));
    assert_eq!(hits, vec![ElementId::from_index(1), ElementId::from_index(0)]);
}

#[test]
fn test_clicks_ignored_outside_remove_tool() {
    let mut editor = make_editor(sample_scene());
    for tool in [Tool::View, Tool::Add] {
        editor.set_tool(tool);
        let outcome = editor.handle_pointer(PointerEvent::Click(p(50.0, 25.0)));
        assert_eq!(outcome, EventOutcome::Ignored);
    }
    assert_eq!(editor.scene().len(), 3);
}

#[test]
fn test_hover_emphasis_depends_on_tool() {
    let mut editor = make_editor(sample_scene());
    let door = ElementId::from_index(1);

    editor.hover(Some(p(50.0, 25.0)));
    assert_eq!(editor.hovered(), Some(&door));
    let frame = editor.frame();
    let item = frame.item(&door).expect("door rendered");
    assert_eq!(item.emphasis, Emphasis::Hover);
    assert_ne!(item.display_color(), item.color);
    assert!(frame.chrome.iter().any(|c| matches!(c, ChromeItem::Tooltip { id, .. } if id == &door)));

    editor.set_tool(Tool::Remove);
    let frame = editor.frame();
    assert_eq!(frame.item(&door).map(|i| i.emphasis), Some(Emphasis::RemoveTarget));
    assert!(frame.chrome.is_empty());

    editor.hover(None);
    assert!(editor.hovered().is_none());
}

#[test]
fn test_hiding_hovered_class_clears_hover() {
    let mut editor = make_editor(sample_scene());
    editor.hover(Some(p(50.0, 25.0)));
    assert!(editor.hovered().is_some());

    editor.toggle_class_visibility("door");
    assert!(editor.hovered().is_none());
}

#[test]
fn test_viewport_change_cancels_drag() {
    let mut editor = make_editor(empty_corner_scene());
    editor.set_tool(Tool::Add);
    editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0)));

    editor.set_viewport(viewport(800.0, 600.0));
    assert!(editor.tool_state().drag().is_none());
    assert_eq!(editor.tool(), Tool::Add);
}

#[test]
fn test_configured_minimum_box_size() {
    let config = EditorConfig {
        min_box_size: 30.0,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(empty_corner_scene(), test_source(), viewport(400.0, 300.0), config);
    assert_eq!(editor.scene().min_box_size(), 30.0);

    assert_eq!(drag_box(&mut editor, 12.0, 12.0), EventOutcome::Discarded);
    assert_eq!(drag_box(&mut editor, 29.0, 40.0), EventOutcome::Discarded);
    assert!(editor.scene().is_empty());

    assert!(matches!(drag_box(&mut editor, 30.0, 30.0), EventOutcome::Added(_)));
    assert_eq!(editor.scene().len(), 1);
}

#[test]
fn test_load_replaces_scene_and_keeps_tool_selection() {
    let config = EditorConfig {
        min_box_size: 30.0,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(sample_scene(), test_source(), viewport(400.0, 300.0), config);
    editor.hover(Some(p(50.0, 25.0)));
    assert!(editor.hovered().is_some());
    editor.set_tool(Tool::Add);
    editor.set_selected_class_for_add("window");
    editor.handle_pointer(PointerEvent::Down(p(10.0, 10.0)));
    assert!(editor.tool_state().drag().is_some());

    editor.load(scene_from(CORNER_PAYLOAD), test_source());

    assert_eq!(editor.scene().len(), 2);
    assert!(editor.scene().get(&ElementId::from_index(2)).is_none());
    assert!(editor.scene().elements().iter().all(|e| e.class_label != "door"));
    assert!(editor.hovered().is_none());
    assert!(editor.tool_state().drag().is_none());
    assert_eq!(editor.tool(), Tool::Add);
    assert_eq!(editor.selected_class(), "window");

    // The configured threshold survives the swap
    assert_eq!(editor.scene().min_box_size(), 30.0);
    assert_eq!(drag_box(&mut editor, 12.0, 12.0), EventOutcome::Discarded);
    assert_eq!(editor.scene().len(), 2);
}
