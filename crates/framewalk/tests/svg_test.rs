use framewalk::geom::point;
use framewalk::svg::view_box_matrix;
use framewalk::{
    Dimension, MatrixEntry, ResolveOptions, Resolver, SnapshotDocument, SvgOffsetMode,
};

/// An `<svg>` at (20, 30) drawing a 100×50 viewBox into 200×100, with a `<rect>` at
/// user-space (10, 5) of size 20×10 (rendered 40×20 at (40, 40)).
const SVG_RECT: &str = r#"{
  "viewport": { "width": 800, "height": 600 },
  "nodes": [
    { "id": "html", "offset": { "left": 0, "top": 0, "width": 800, "height": 600 } },
    { "id": "body", "parent": "html", "offset": { "left": 0, "top": 0, "width": 800, "height": 600 } },
    {
      "id": "canvas", "parent": "body", "kind": "svg",
      "rect": { "left": 20, "top": 30, "width": 200, "height": 100 },
      "client": { "width": 200, "height": 100 },
      "view_box": { "x": 0, "y": 0, "width": 100, "height": 50 }
    },
    {
      "id": "shape", "parent": "canvas", "kind": "svg-graphics",
      "rect": { "left": 40, "top": 40, "width": 40, "height": 20 },
      "bbox": { "left": 10, "top": 5, "width": 20, "height": 10 }
    }
  ]
}"#;

/// Same canvas, with the shape inside a `<g transform="translate(5 5)">`.
const SVG_GROUP: &str = r#"{
  "viewport": { "width": 800, "height": 600 },
  "nodes": [
    { "id": "html", "offset": { "left": 0, "top": 0, "width": 800, "height": 600 } },
    { "id": "body", "parent": "html", "offset": { "left": 0, "top": 0, "width": 800, "height": 600 } },
    {
      "id": "canvas", "parent": "body", "kind": "svg",
      "rect": { "left": 20, "top": 30, "width": 200, "height": 100 },
      "client": { "width": 200, "height": 100 },
      "view_box": { "x": 0, "y": 0, "width": 100, "height": 50 }
    },
    { "id": "group", "parent": "canvas", "kind": "svg-group", "style": { "transform": "translate(5 5)" } },
    {
      "id": "shape", "parent": "group", "kind": "svg-graphics",
      "rect": { "left": 50, "top": 50, "width": 40, "height": 20 },
      "bbox": { "left": 10, "top": 5, "width": 20, "height": 10 }
    }
  ]
}"#;

fn canvas_with(client: (f64, f64), view_box: (f64, f64), aspect: &str) -> SnapshotDocument {
    let json = format!(
        r#"{{
          "nodes": [
            {{ "id": "html" }},
            {{ "id": "body", "parent": "html" }},
            {{
              "id": "canvas", "parent": "body", "kind": "svg",
              "client": {{ "width": {}, "height": {} }},
              "view_box": {{ "x": 0, "y": 0, "width": {}, "height": {} }},
              "preserve_aspect_ratio": "{aspect}"
            }}
          ]
        }}"#,
        client.0, client.1, view_box.0, view_box.1
    );
    SnapshotDocument::from_json(&json).unwrap()
}

fn assert_box(info: &framewalk::ElementInfo, expected: (f64, f64, f64, f64)) {
    let b = &info.projected;
    let got = (b.left, b.top, b.right, b.bottom);
    let close = |a: f64, e: f64| (a - e).abs() < 1e-9;
    assert!(
        close(got.0, expected.0)
            && close(got.1, expected.1)
            && close(got.2, expected.2)
            && close(got.3, expected.3),
        "expected {expected:?}, got {got:?}"
    );
}

#[test]
fn solver_places_svg_content_from_its_rendered_rect() {
    let doc = SnapshotDocument::from_json(SVG_RECT).unwrap();
    let shape = doc.lookup("shape").unwrap();

    let info = Resolver::new(&doc)
        .element_info(Some(shape), None, None)
        .unwrap();

    assert_eq!((info.width, info.height), (20.0, 10.0));
    assert_box(&info, (40.0, 40.0, 80.0, 60.0));
    // SVG content always formats its own transform as a 2D matrix.
    assert!(info.composed.target_transform.starts_with("matrix("));
}

#[test]
fn pending_offsets_are_resolved_in_the_stack() {
    let doc = SnapshotDocument::from_json(SVG_RECT).unwrap();
    let shape = doc.lookup("shape").unwrap();
    let canvas = doc.lookup("canvas").unwrap();

    let stack = Resolver::new(&doc).matrix_stack(shape, None, None).unwrap();

    assert!(
        stack
            .entries
            .iter()
            .all(|e| !matches!(e, MatrixEntry::SvgPendingOffset { .. }))
    );
    // svg offset, svg transform, viewBox offset, viewBox mapping, shape offset, shape transform
    let nodes: Vec<_> = stack.entries.iter().map(|e| e.node()).collect();
    assert_eq!(nodes, vec![canvas, canvas, canvas, canvas, shape, shape]);
    let shape_offset = stack.entries[4].matrix().unwrap().translation_part();
    assert_eq!((shape_offset.x, shape_offset.y), (10.0, 5.0));
}

#[test]
fn raw_walk_leaves_svg_offsets_pending() {
    let doc = SnapshotDocument::from_json(SVG_RECT).unwrap();
    let shape = doc.lookup("shape").unwrap();

    let chain = Resolver::new(&doc).walk(shape, None).unwrap();

    let pending = chain
        .entries
        .iter()
        .filter(|e| matches!(e, MatrixEntry::SvgPendingOffset { .. }))
        .count();
    assert_eq!(pending, 2);
}

#[test]
fn local_bbox_mode_agrees_with_the_solver() {
    let doc = SnapshotDocument::from_json(SVG_RECT).unwrap();
    let shape = doc.lookup("shape").unwrap();

    let info = Resolver::new(&doc)
        .with_options(ResolveOptions::new().with_svg_offset(SvgOffsetMode::LocalBbox))
        .element_info(Some(shape), None, None)
        .unwrap();

    assert_box(&info, (40.0, 40.0, 80.0, 60.0));
    // The transform-origin is re-based onto the bbox.
    assert_eq!(info.composed.transform_origin, point(-10.0, -5.0));
    assert_eq!(info.composed.target_origin, point(0.0, 0.0));
}

#[test]
fn user_space_origin_is_rebased_onto_the_bbox_in_both_modes() {
    // Centre of the rect in user space.
    let json = SVG_RECT.replace(
        r#""bbox": { "left": 10, "top": 5, "width": 20, "height": 10 }"#,
        r#""bbox": { "left": 10, "top": 5, "width": 20, "height": 10 },
      "style": { "transform_origin": [20, 10] }"#,
    );
    let doc = SnapshotDocument::from_json(&json).unwrap();
    let shape = doc.lookup("shape").unwrap();

    for mode in [SvgOffsetMode::Solve, SvgOffsetMode::LocalBbox] {
        let info = Resolver::new(&doc)
            .with_options(ResolveOptions::new().with_svg_offset(mode))
            .element_info(Some(shape), None, None)
            .unwrap();

        assert_box(&info, (40.0, 40.0, 80.0, 60.0));
        assert_eq!(info.composed.transform_origin, point(10.0, 5.0), "{mode:?}");
        assert_eq!(info.composed.target_origin, point(20.0, 10.0), "{mode:?}");
        // Centre of the rendered 40x20 box.
        assert_eq!(info.projected.origin, point(20.0, 10.0), "{mode:?}");
    }
}

#[test]
fn group_contributes_only_its_transform() {
    let doc = SnapshotDocument::from_json(SVG_GROUP).unwrap();
    let shape = doc.lookup("shape").unwrap();
    let group = doc.lookup("group").unwrap();

    let stack = Resolver::new(&doc).matrix_stack(shape, None, None).unwrap();
    let group_offset = stack
        .entries
        .iter()
        .find(|e| e.node() == group && matches!(e, MatrixEntry::Offset { .. }))
        .and_then(|e| e.matrix())
        .unwrap();
    assert!(group_offset.is_identity());

    let info = Resolver::new(&doc)
        .element_info(Some(shape), None, None)
        .unwrap();
    assert_box(&info, (50.0, 50.0, 90.0, 70.0));
}

#[test]
fn view_box_meet_centers_the_smaller_axis() {
    let doc = canvas_with((200.0, 100.0), (100.0, 100.0), "xMidYMid meet");
    let canvas = doc.lookup("canvas").unwrap();
    let m = view_box_matrix(&doc, canvas, Dimension::Planar);

    assert_eq!(m.transform_point(point(0.0, 0.0)), point(50.0, 0.0));
    assert_eq!(m.transform_point(point(100.0, 100.0)), point(150.0, 100.0));
}

#[test]
fn view_box_none_scales_each_axis() {
    let doc = canvas_with((200.0, 100.0), (100.0, 100.0), "none");
    let canvas = doc.lookup("canvas").unwrap();
    let m = view_box_matrix(&doc, canvas, Dimension::Planar);

    assert_eq!(m.transform_point(point(100.0, 100.0)), point(200.0, 100.0));
}

#[test]
fn view_box_slice_uses_the_larger_ratio() {
    let doc = canvas_with((200.0, 100.0), (100.0, 100.0), "xMinYMin slice");
    let canvas = doc.lookup("canvas").unwrap();
    let m = view_box_matrix(&doc, canvas, Dimension::Planar);

    assert_eq!(m.transform_point(point(0.0, 0.0)), point(0.0, 0.0));
    assert_eq!(m.transform_point(point(100.0, 100.0)), point(200.0, 200.0));
}

#[test]
fn zero_sized_view_box_falls_back_to_identity() {
    let doc = canvas_with((200.0, 100.0), (0.0, 0.0), "xMidYMid meet");
    let canvas = doc.lookup("canvas").unwrap();
    let m = view_box_matrix(&doc, canvas, Dimension::Planar);

    assert!(m.is_identity());
}
