use cgmath::{InnerSpace, Point3, Quaternion, Rotation3, Vector3};
use scene_experience::{
    camera::Camera,
    data_structures::{geometry::Geometry, instance::Instance},
    reflector::mirror_camera,
};

fn assert_indices_in_bounds(geometry: &Geometry) {
    let count = geometry.vertices.len() as u32;
    assert!(geometry.indices.iter().all(|&i| i < count));
    assert_eq!(geometry.indices.len() % 3, 0);
}

#[test]
fn should_build_grids_with_the_expected_counts() {
    let plane = Geometry::plane(1.0, 1.0, 2, 3);
    assert_eq!(plane.vertices.len(), 12);
    assert_eq!(plane.triangle_count(), 12);
    assert_indices_in_bounds(&plane);

    let cube = Geometry::cuboid(1.0, 1.0, 1.0, 1, 1, 1);
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.triangle_count(), 12);
    assert_indices_in_bounds(&cube);

    let hangar = Geometry::cuboid(1.0, 1.0, 3.0, 32, 32, 32);
    assert_eq!(hangar.triangle_count(), 6 * 32 * 32 * 2);
    assert_indices_in_bounds(&hangar);
}

#[test]
fn should_skip_degenerate_pole_triangles() {
    let sphere = Geometry::sphere(1.0, 8, 6);
    assert_eq!(sphere.vertices.len(), 9 * 7);
    assert_eq!(sphere.triangle_count(), 80);
    assert_indices_in_bounds(&sphere);
    for vertex in &sphere.vertices {
        let p = Vector3::from(vertex.position);
        assert!((p.magnitude() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn should_wrap_the_torus_tube() {
    let torus = Geometry::torus(1.0, 0.4, 3, 4);
    assert_eq!(torus.vertices.len(), 20);
    assert_eq!(torus.triangle_count(), 24);
    assert_indices_in_bounds(&torus);
}

#[test]
fn should_face_the_target_after_look_at() {
    let mut instance = Instance::at(1.0, 0.0, 0.0);
    instance.look_at(Point3::new(1.0, 0.0, 5.0));
    let forward = instance.rotation * Vector3::unit_z();
    assert!((forward - Vector3::unit_z()).magnitude() < 1e-5);

    instance.look_at(Point3::new(1.0, 10.0, 0.0));
    let forward = instance.rotation * Vector3::unit_z();
    assert!((forward - Vector3::unit_y()).magnitude() < 1e-4);
}

#[test]
fn should_combine_parent_and_child_transforms() {
    let parent = Instance::at(0.0, 1.0, 0.0)
        .with_rotation(Quaternion::from_angle_y(cgmath::Deg(90.0)))
        .with_scale(2.0);
    let child = Instance::at(1.0, 0.0, 0.0);
    let world = &parent * &child;
    assert!((world.position - Vector3::new(0.0, 1.0, -2.0)).magnitude() < 1e-5);
    assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn should_mirror_the_camera_below_a_floor() {
    let camera = Camera::new(
        Point3::new(0.0, 2.0, 4.0),
        Point3::new(0.0, 0.0, 0.0),
        cgmath::Deg(45.0),
        1.0,
        0.1,
        100.0,
    );
    let normal = Quaternion::from_angle_x(cgmath::Deg(-90.0)) * Vector3::unit_z();
    assert!((normal - Vector3::unit_y()).magnitude() < 1e-5);

    let mirrored = mirror_camera(&camera, Point3::new(0.0, 0.0, 0.0), normal).unwrap();
    assert!((mirrored.eye - Point3::new(0.0, -2.0, 4.0)).magnitude() < 1e-5);
    assert!((mirrored.up + Vector3::unit_y()).magnitude() < 1e-5);

    let below = Camera {
        eye: Point3::new(0.0, -1.0, 4.0),
        ..camera
    };
    assert!(mirror_camera(&below, Point3::new(0.0, 0.0, 0.0), normal).is_none());
}
