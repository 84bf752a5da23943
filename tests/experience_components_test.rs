use std::{cell::RefCell, rc::Rc, time::Duration};

use cgmath::{InnerSpace, MetricSpace, Point3};
use scene_experience::{
    camera::{apply_fov, controls::{OrbitControls, PointerInput}, register_fov, Camera, FOV_PARAM},
    debug::Debug,
    events::EventEmitter,
    layers::{Layers, BLOOM_LAYER},
    sizes::{Resize, Sizes},
    time::Time,
};

fn camera() -> Camera {
    Camera::new(
        Point3::new(6.0, 4.0, 8.0),
        Point3::new(0.0, 0.0, 0.0),
        cgmath::Deg(35.0),
        1.0,
        0.1,
        100.0,
    )
}

#[test]
fn should_clamp_pixel_ratio_to_the_configured_maximum() {
    let sizes = Sizes::new(800, 600, 3.0, 2.0);
    assert_eq!(sizes.pixel_ratio(), 2.0);
    assert_eq!(sizes.physical_size(), (1600, 1200));

    let sizes = Sizes::new(800, 600, 1.5, 2.0);
    assert_eq!(sizes.pixel_ratio(), 1.5);
    assert_eq!(sizes.physical_size(), (1200, 900));
}

#[test]
fn should_notify_resize_listeners_with_the_new_dimensions() {
    let mut sizes = Sizes::new(800, 600, 1.0, 2.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    sizes.events.on(move |resize: &Resize| sink.borrow_mut().push(*resize));

    sizes.update_sizes(1024, 0, 4.0);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!((seen[0].width, seen[0].height, seen[0].pixel_ratio), (1024, 1, 2.0));
    assert!(sizes.aspect().is_finite());
}

#[test]
fn should_follow_the_viewport_aspect_after_resize() {
    let mut sizes = Sizes::new(800, 600, 1.0, 2.0);
    let mut camera = camera();
    camera.set_aspect(sizes.width(), sizes.height());
    assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

    sizes.update_sizes(500, 1000, 1.0);
    camera.set_aspect(sizes.width(), sizes.height());
    assert!((camera.aspect - 0.5).abs() < 1e-6);
    assert_eq!(camera.aspect, sizes.aspect());
}

#[test]
fn should_map_the_window_corner_to_ndc_above_the_pixel_ratio_limit() {
    let sizes = Sizes::from_physical(winit::dpi::PhysicalSize::new(2400, 1800), 3.0, 2.0);
    assert_eq!(sizes.physical_size(), (1600, 1200));
    assert_eq!(sizes.window_size(), (2400, 1800));

    let mut input = PointerInput::new(1.0, 1.0);
    input.fit_window(&sizes);
    input.move_to(2400.0, 1800.0);
    let ndc = input.ndc();
    assert!((ndc.x - 1.0).abs() < 1e-6 && (ndc.y + 1.0).abs() < 1e-6);

    input.move_to(1200.0, 900.0);
    assert!(input.ndc().magnitude() < 1e-6);
}

#[test]
fn should_drive_the_field_of_view_from_the_debug_parameter() {
    let mut camera = camera();
    let mut debug = Debug::new(true);
    register_fov(&camera, &mut debug);
    assert!((debug.get(FOV_PARAM).unwrap_or_default() - 35.0).abs() < 1e-3);
    assert!(!apply_fov(&mut camera, &debug));

    assert!(debug.set(FOV_PARAM, 60.0));
    assert!(apply_fov(&mut camera, &debug));
    let degrees = cgmath::Deg::from(camera.fovy).0;
    assert!((degrees - 60.0).abs() < 1e-3);
    let before = camera.projection_matrix();

    debug.set(FOV_PARAM, 500.0);
    apply_fov(&mut camera, &debug);
    assert!((cgmath::Deg::from(camera.fovy).0 - 100.0).abs() < 1e-3);
    assert_ne!(camera.projection_matrix(), before);
}

#[test]
fn should_stop_calling_removed_listeners() {
    let mut emitter = EventEmitter::<u32>::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let first = {
        let calls = calls.clone();
        emitter.on(move |v| calls.borrow_mut().push(("first", *v)))
    };
    {
        let calls = calls.clone();
        emitter.on(move |v| calls.borrow_mut().push(("second", *v)));
    }

    emitter.trigger(&1);
    assert!(emitter.off(first));
    assert!(!emitter.off(first));
    emitter.trigger(&2);

    assert_eq!(*calls.borrow(), vec![("first", 1), ("second", 1), ("second", 2)]);
    assert_eq!(emitter.listener_count(), 1);
}

#[test]
fn should_clamp_frame_deltas() {
    let mut time = Time::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
    assert_eq!(time.delta(), Time::INITIAL_DELTA);

    time.advance(Duration::from_secs(5));
    assert_eq!(time.delta(), Duration::from_millis(100));
    time.advance(Duration::ZERO);
    assert_eq!(time.delta(), Duration::from_millis(1));

    let tick = time.snapshot();
    assert_eq!(tick.frame, 2);
    assert!((tick.elapsed - 0.101).abs() < 1e-6);
}

#[test]
fn should_emit_one_tick_per_frame() {
    let mut time = Time::new();
    let frames = Rc::new(RefCell::new(Vec::new()));
    let sink = frames.clone();
    time.events.on(move |tick| sink.borrow_mut().push(tick.frame));

    for _ in 0..3 {
        let tick = time.tick();
        assert!(tick.delta > 0.0 && tick.delta <= 0.25);
    }
    assert_eq!(*frames.borrow(), vec![1, 2, 3]);
}

#[test]
fn should_match_objects_sharing_a_layer() {
    let default = Layers::new();
    let glowing = Layers::new().with(BLOOM_LAYER);
    let bloom_only = Layers::none().with(BLOOM_LAYER);

    assert!(default.test(&glowing));
    assert!(!default.test(&bloom_only));
    assert!(glowing.test(&bloom_only));
    assert!(!Layers::none().test(&Layers::all()));

    let mut layers = Layers::new();
    layers.toggle(3);
    assert!(layers.is_enabled(3));
    layers.set(5);
    assert!(!layers.is_enabled(0) && layers.is_enabled(5));
    layers.disable(5);
    assert_eq!(layers, Layers::none());
}

#[test]
fn should_orbit_at_a_constant_distance() {
    let mut camera = camera();
    let mut orbit = OrbitControls::new(camera.target);
    let mut input = PointerInput::new(800.0, 600.0);
    let distance = camera.distance_to_target();

    input.primary = true;
    input.move_to(100.0, 100.0);
    input.move_to(160.0, 130.0);
    assert!(orbit.update(&mut camera, &input, 1.0 / 60.0));
    input.reset_deltas();

    assert!((camera.distance_to_target() - distance).abs() < 1e-3);
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    assert!(!orbit.update(&mut camera, &input, 1.0 / 60.0));
}

#[test]
fn should_clamp_the_polar_angle() {
    let mut camera = camera();
    let mut orbit = OrbitControls::new(camera.target);
    orbit.min_polar_angle = 0.3;
    orbit.max_polar_angle = 2.0;
    let mut input = PointerInput::new(800.0, 600.0);

    input.primary = true;
    input.move_to(0.0, 0.0);
    input.move_to(0.0, 5000.0);
    orbit.update(&mut camera, &input, 1.0 / 60.0);
    let polar = |camera: &Camera| {
        let offset = camera.eye - camera.target;
        (offset.y / offset.magnitude()).acos()
    };
    assert!((polar(&camera) - 0.3).abs() < 1e-3);

    input.reset_deltas();
    input.move_to(0.0, -5000.0);
    orbit.update(&mut camera, &input, 1.0 / 60.0);
    assert!((polar(&camera) - 2.0).abs() < 1e-3);
}

#[test]
fn should_dolly_in_on_scroll_within_limits() {
    let mut camera = camera();
    let mut orbit = OrbitControls::new(camera.target);
    orbit.min_distance = 5.0;
    let mut input = PointerInput::new(800.0, 600.0);

    input.wheel = 100.0;
    orbit.update(&mut camera, &input, 1.0 / 60.0);

    assert!((camera.eye.distance(camera.target) - 5.0).abs() < 1e-3);
}
