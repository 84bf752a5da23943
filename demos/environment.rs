//! Environment backgrounds: an equirectangular HDR map and a cube map.
//!
//! With `EXPERIENCE_DEBUG=1`, select `background` with Tab and press ArrowUp or
//! ArrowDown to switch between the two.

use scene_experience::{
    cgmath::Point3,
    config::{ExperienceConfig, ToneMapping},
    data_structures::{geometry::Geometry, instance::Instance, material::Material},
    flow,
    resources::{Resources, Source},
    scene::{Background, Scene},
    time::Tick,
    world::{World, WorldContext},
};

const BACKGROUND: &str = "background";

#[derive(Default)]
struct Environment {
    /// The background not currently shown.
    spare: Option<Background>,
    showing_cube: bool,
}

impl World for Environment {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let ctx = world.ctx;
        let sphere = Geometry::sphere(0.6, 48, 24);
        for (i, colour) in [[0.9, 0.9, 0.9, 1.0], [0.8, 0.3, 0.2, 1.0], [0.2, 0.4, 0.9, 1.0]]
            .into_iter()
            .enumerate()
        {
            let id = scene.add(
                ctx,
                &format!("sphere {i}"),
                sphere.upload(&ctx.device, "Sphere"),
                Material::standard(ctx, "sphere", colour, None),
            );
            if let Some(object) = scene.get_mut(id) {
                object.set_transform(Instance::at(i as f32 * 1.6 - 1.6, 0.0, 0.0));
            }
        }
        scene.light.light.ambient_intensity = 0.5;
        world.debug.add(BACKGROUND, 0.0, 0.0, 1.0, 1.0);
        Ok(())
    }

    fn on_ready(
        &mut self,
        world: &mut WorldContext,
        scene: &mut Scene,
        resources: &Resources,
    ) -> anyhow::Result<()> {
        let equirect = resources.create_texture(world.ctx, "sky")?;
        let cube = resources.create_texture(world.ctx, "cube")?;
        scene.background = Background::equirect(world.ctx, equirect);
        self.spare = Some(Background::cube(world.ctx, cube));
        Ok(())
    }

    fn update(&mut self, world: &mut WorldContext, scene: &mut Scene, _tick: Tick) {
        let want_cube = world.debug.value_or(BACKGROUND, 0.0) >= 0.5;
        if want_cube == self.showing_cube {
            return;
        }
        if let Some(spare) = self.spare.as_mut() {
            std::mem::swap(&mut scene.background, spare);
            self.showing_cube = want_cube;
            log::info!("showing the {} background", if want_cube { "cube" } else { "equirect" });
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Environment")
        .with_camera_position(Point3::new(0.0, 1.0, 5.0))
        .with_tone_mapping(ToneMapping::AcesFilmic, 1.2);
    let sources = vec![
        Source::hdr("sky", "textures/sky.hdr"),
        Source::cube(
            "cube",
            [
                "textures/cube/px.png",
                "textures/cube/nx.png",
                "textures/cube/py.png",
                "textures/cube/ny.png",
                "textures/cube/pz.png",
                "textures/cube/nz.png",
            ],
        ),
    ];
    flow::run(config, sources, Box::new(Environment::default()))
}
