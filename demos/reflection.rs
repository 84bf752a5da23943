//! A spinning torus above a mirror floor, with a second mirror standing behind it.

use scene_experience::{
    cgmath::{Deg, Point3, Quaternion, Rad, Rotation3, Vector3},
    config::ExperienceConfig,
    data_structures::{geometry::Geometry, instance::Instance, material::Material},
    flow,
    reflector::ReflectorOptions,
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

#[derive(Default)]
struct Mirrors {
    torus: Option<ObjectId>,
}

impl World for Mirrors {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let ctx = world.ctx;
        scene.add_reflector(
            ctx,
            "floor",
            Geometry::plane(10.0, 10.0, 1, 1).upload(&ctx.device, "Floor"),
            Instance::new().with_rotation(Quaternion::from_angle_x(Deg(-90.0))),
            ReflectorOptions {
                texture_size: [1024, 1024],
                tint: [0.6, 0.6, 0.65],
            },
        );

        scene.add_reflector(
            ctx,
            "wall",
            Geometry::plane(4.0, 3.0, 1, 1).upload(&ctx.device, "Wall"),
            Instance::at(0.0, 1.5, -3.0),
            ReflectorOptions::default(),
        );

        let torus = scene.add(
            ctx,
            "torus",
            Geometry::torus(0.8, 0.3, 32, 96).upload(&ctx.device, "Torus"),
            Material::standard(ctx, "torus", [0.9, 0.45, 0.2, 1.0], None),
        );
        if let Some(object) = scene.get_mut(torus) {
            object.set_transform(Instance::at(0.0, 1.5, 0.0));
        }
        self.torus = Some(torus);

        let sphere = Geometry::sphere(0.3, 24, 12);
        for (i, x) in [-2.0f32, 2.0].into_iter().enumerate() {
            let id = scene.add(
                ctx,
                &format!("sphere {i}"),
                sphere.upload(&ctx.device, "Sphere"),
                Material::standard(ctx, "sphere", [0.3, 0.6, 0.9, 1.0], None),
            );
            if let Some(object) = scene.get_mut(id) {
                object.set_transform(Instance::at(x, 0.3, 1.0));
            }
        }

        scene.light.light.direction = Vector3::new(2.0, 4.0, 3.0);
        scene.light.light.intensity = 1.4;
        Ok(())
    }

    fn update(&mut self, _world: &mut WorldContext, scene: &mut Scene, tick: Tick) {
        let Some(transform) = self
            .torus
            .and_then(|id| scene.get_mut(id))
            .and_then(|object| object.transform_mut())
        else {
            return;
        };
        transform.rotation = Quaternion::from_angle_y(Rad(tick.elapsed * 0.6))
            * Quaternion::from_angle_x(Rad(tick.elapsed * 0.4));
        transform.position.y = 1.5 + 0.2 * (tick.elapsed * 1.3).sin();
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Reflection")
        .with_camera_position(Point3::new(0.0, 2.5, 6.0))
        .with_camera_target(Point3::new(0.0, 1.0, 0.0));
    flow::run(config, Vec::new(), Box::new(Mirrors::default()))
}
