use pinchframe::{
    BoundsMode, Direction, GestureController, Point, Profile, ReferenceBox, Transform,
};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn clamped() -> Profile {
    let mut p = Profile::default();
    p.behavior.bounds = BoundsMode::ClampToReference;
    p
}

#[test]
fn horizontal_stretch_just_past_threshold() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let start = [pt(0.0, 0.0), pt(100.0, 0.0)];

    // 19 units: below threshold, nothing moves
    let mut c = GestureController::default();
    c.on_gesture_start(&start, Some(r)).unwrap();
    let out = c.on_gesture_move(&[pt(0.0, 0.0), pt(119.0, 0.0)], pt(0.0, 0.0)).unwrap();
    assert_eq!((out.snapshot.scale_x, out.snapshot.scale_y), (1.0, 1.0));
    assert_eq!(c.session().unwrap().direction(), None);

    // 21 units: horizontal lock, x scales
    let mut c = GestureController::default();
    c.on_gesture_start(&start, Some(r)).unwrap();
    let out = c.on_gesture_move(&[pt(0.0, 0.0), pt(121.0, 0.0)], pt(0.0, 0.0)).unwrap();
    assert_eq!(out.snapshot.scale_x, 1.21);
    assert_eq!(out.snapshot.scale_y, 1.0);
    assert_eq!(c.session().unwrap().direction(), Some(Direction::Horizontal));
}

#[test]
fn single_touch_drag_commits_on_end() {
    let r = ReferenceBox::new(0.0, 0.0, 50.0, 50.0);
    let mut c = GestureController::default();
    c.on_gesture_start(&[pt(10.0, 10.0)], Some(r)).unwrap();
    c.on_gesture_move(&[pt(15.0, 40.0)], pt(5.0, 30.0)).unwrap();
    assert_eq!(c.transform().move_x, 0.0);
    let out = c.on_gesture_end().unwrap();
    assert_eq!((c.transform().move_x, c.transform().move_y), (5.0, 30.0));
    assert_eq!((out.snapshot.left, out.snapshot.top), (5.0, 30.0));
}

#[test]
fn ending_twice_is_idempotent() {
    let mut c = GestureController::default();
    c.on_gesture_start(&[pt(0.0, 0.0)], Some(ReferenceBox::new(0.0, 0.0, 80.0, 40.0)))
        .unwrap();
    c.on_gesture_move(&[pt(6.0, 2.0)], pt(6.0, 2.0)).unwrap();
    let first = c.on_gesture_end().unwrap();
    let committed = *c.transform();
    let second = c.on_gesture_end().unwrap();
    assert_eq!(*c.transform(), committed);
    assert_eq!(first.snapshot, second.snapshot);
    assert!(second.events.is_empty());
}

#[test]
fn reset_then_noop_gesture_round_trips() {
    let snapshot = Transform {
        scale_x: 0.8,
        scale_y: 1.2,
        move_x: 12.0,
        move_y: -4.0,
        rotation_deg: 30.0,
        ..Transform::default()
    };
    let mut c = GestureController::default();
    c.reset(&snapshot);
    c.on_gesture_start(&[pt(5.0, 5.0)], Some(ReferenceBox::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();
    c.on_gesture_end().unwrap();
    assert_eq!(*c.transform(), snapshot);
}

#[test]
fn scale_never_leaves_limits() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let mut c = GestureController::default();
    for (spread, expected) in [(10_000.0, 2.0), (0.5, 0.33)] {
        c.on_gesture_start(&[pt(0.0, 0.0), pt(100.0, 100.0)], Some(r)).unwrap();
        let out = c
            .on_gesture_move(&[pt(0.0, 0.0), pt(spread, spread)], pt(0.0, 0.0))
            .unwrap();
        assert_eq!(out.snapshot.scale_x, expected);
        assert_eq!(out.snapshot.scale_y, expected);
        c.on_gesture_end().unwrap();
    }
}

#[test]
fn aspect_ratio_is_never_committed_out_of_range() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let mut c = GestureController::default();
    c.on_gesture_start(&[pt(0.0, 0.0), pt(100.0, 0.0)], Some(r)).unwrap();
    for x in [130.0, 160.0, 190.0, 230.0, 260.0] {
        c.on_gesture_move(&[pt(0.0, 0.0), pt(x, 0.0)], pt(0.0, 0.0)).unwrap();
        let t = c.transform();
        let ar = t.scale_x / t.scale_y;
        assert!((0.5..=2.0).contains(&ar), "aspect {ar} after x={x}");
    }
    assert_eq!(c.transform().scale_x, 2.0);
}

#[test]
fn clamped_drag_never_leaves_reference() {
    let r = ReferenceBox::new(10.0, 10.0, 100.0, 100.0);
    let mut c = GestureController::new(&clamped());
    c.reset(&Transform {
        scale_x: 0.5,
        scale_y: 0.5,
        ..Transform::default()
    });
    c.on_gesture_start(&[pt(60.0, 60.0)], Some(r)).unwrap();
    for step in 0..40 {
        let d = step as f64 * 3.0;
        c.on_gesture_move(&[pt(60.0 + d, 60.0 - d)], pt(d, -d)).unwrap();
    }
    let out = c.on_gesture_end().unwrap().snapshot;
    assert!(out.left >= r.left && out.left + out.width <= r.right());
    assert!(out.top >= r.top && out.top + out.height <= r.bottom());
    // last accepted delta before the edge: 24 in both directions
    assert_eq!((c.transform().move_x, c.transform().move_y), (24.0, -24.0));
}

#[test]
fn clamped_pinch_shrinks_but_cannot_outgrow_reference() {
    let r = ReferenceBox::new(0.0, 0.0, 200.0, 100.0);
    let mut c = GestureController::new(&clamped());
    c.on_gesture_start(&[pt(0.0, 0.0), pt(100.0, 100.0)], Some(r)).unwrap();
    c.on_gesture_move(&[pt(0.0, 0.0), pt(60.0, 60.0)], pt(0.0, 0.0)).unwrap();
    c.on_gesture_move(&[pt(0.0, 0.0), pt(120.0, 120.0)], pt(0.0, 0.0)).unwrap();
    let t = *c.transform();
    assert!((t.scale_x - 0.6).abs() < 1e-9);
    assert!((t.scale_y - 0.6).abs() < 1e-9);
    let out = c.on_gesture_end().unwrap().snapshot;
    assert!(out.width <= 200.0 && out.height <= 100.0);
}

#[test]
fn scale_compounds_across_gestures_by_default() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let mut c = GestureController::default();
    for _ in 0..2 {
        c.on_gesture_start(&[pt(0.0, 0.0), pt(100.0, 100.0)], Some(r)).unwrap();
        c.on_gesture_move(&[pt(0.0, 0.0), pt(120.0, 120.0)], pt(0.0, 0.0)).unwrap();
        c.on_gesture_end().unwrap();
    }
    assert!((c.transform().scale_x - 1.44).abs() < 1e-9);
}

#[test]
fn rotation_accumulates_across_gestures() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let mut c = GestureController::default();
    for _ in 0..2 {
        c.on_gesture_start(&[pt(0.0, 0.0), pt(100.0, 0.0)], Some(r)).unwrap();
        let out = c
            .on_gesture_move(&[pt(0.0, 0.0), pt(100.0, 100.0)], pt(0.0, 0.0))
            .unwrap();
        assert!(out.style.transform[0] != pinchframe::session::StyleTransform::Rotate("0deg".into()));
        c.on_gesture_end().unwrap();
    }
    assert!((c.transform().rotation_deg - 90.0).abs() < 1e-9);
}

#[test]
fn pinch_from_coincident_touches_is_harmless() {
    let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
    let mut c = GestureController::default();
    c.on_gesture_start(&[pt(40.0, 40.0), pt(40.0, 40.0)], Some(r)).unwrap();
    let out = c
        .on_gesture_move(&[pt(40.0, 40.0), pt(90.0, 90.0)], pt(0.0, 0.0))
        .unwrap();
    assert_eq!((out.snapshot.scale_x, out.snapshot.scale_y), (1.0, 1.0));
    assert!(out.snapshot.rotation_deg.is_finite());
    c.on_gesture_end().unwrap();
    assert_eq!((c.transform().scale_x, c.transform().scale_y), (1.0, 1.0));
}
