//! Render-to-texture: a second camera films a spinning cube and the picture is shown on a screen.

use scene_experience::{
    camera::{Camera, CameraResources},
    cgmath::{Deg, Point3, Quaternion, Rad, Rotation3},
    config::ExperienceConfig,
    data_structures::{
        geometry::Geometry, instance::Instance, material::Material, render_target::RenderTarget,
    },
    flow,
    layers::Layers,
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

/// Only the screen lives here, so the filming camera never samples its own target.
const SCREEN_LAYER: u32 = 2;
const TARGET_SIZE: [u32; 2] = [512, 512];

#[derive(Default)]
struct Studio {
    cube: Option<ObjectId>,
    film: Option<Film>,
}

struct Film {
    camera: Camera,
    resources: CameraResources,
    target: RenderTarget,
}

impl World for Studio {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let ctx = world.ctx;
        let cube = scene.add(
            ctx,
            "cube",
            Geometry::cuboid(1.0, 1.0, 1.0, 1, 1, 1).upload(&ctx.device, "Cube"),
            Material::standard(ctx, "cube", [0.2, 0.8, 0.4, 1.0], None),
        );
        if let Some(object) = scene.get_mut(cube) {
            object.set_transform(Instance::at(-1.5, 0.5, 0.0));
        }
        self.cube = Some(cube);

        let target = RenderTarget::new(&ctx.device, TARGET_SIZE, "Film");
        let screen = scene.add(
            ctx,
            "screen",
            Geometry::plane(2.4, 2.4, 1, 1).upload(&ctx.device, "Screen"),
            Material::basic(ctx, "screen", [1.0; 4], Some(&target.colour)),
        );
        if let Some(object) = scene.get_mut(screen) {
            object.layers.set(SCREEN_LAYER);
            object.set_transform(
                Instance::at(1.5, 1.2, 0.0).with_rotation(Quaternion::from_angle_y(Deg(-20.0))),
            );
        }
        world.camera.layers.enable(SCREEN_LAYER);

        let camera = Camera::new(
            Point3::new(-1.5, 2.0, 3.0),
            Point3::new(-1.5, 0.5, 0.0),
            Deg(45.0),
            TARGET_SIZE[0] as f32 / TARGET_SIZE[1] as f32,
            0.1,
            100.0,
        );
        let resources = CameraResources::new(&ctx.device, &ctx.layouts.camera, "Film camera");
        self.film = Some(Film {
            camera,
            resources,
            target,
        });
        Ok(())
    }

    fn update(&mut self, _world: &mut WorldContext, scene: &mut Scene, tick: Tick) {
        if let Some(transform) = self
            .cube
            .and_then(|id| scene.get_mut(id))
            .and_then(|object| object.transform_mut())
        {
            transform.rotation = Quaternion::from_angle_y(Rad(tick.elapsed))
                * Quaternion::from_angle_x(Rad(tick.elapsed * 0.5));
        }

        if let Some(film) = &mut self.film {
            let angle = tick.elapsed * 0.3;
            film.camera.eye = Point3::new(-1.5 + 3.0 * angle.sin(), 2.0, 3.0 * angle.cos());
        }
    }

    fn on_render(&mut self, world: &mut WorldContext, scene: &Scene, _tick: Tick) {
        let Some(film) = &mut self.film else {
            return;
        };
        film.resources.write(&world.ctx.queue, &film.camera);
        world.renderer.render_to_target(
            world.ctx,
            scene,
            &film.resources.bind_group,
            Layers::new(),
            &film.target,
        );
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Render target")
        .with_camera_position(Point3::new(0.0, 2.0, 6.0))
        .with_camera_target(Point3::new(0.0, 0.8, 0.0));
    flow::run(config, Vec::new(), Box::new(Studio::default()))
}
