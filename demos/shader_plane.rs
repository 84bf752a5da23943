//! A plane drawn with its own WGSL, followed by bloom and a vignette pass.
//!
//! Move the pointer over the plane to shift the ripples' centre.

use scene_experience::{
    cgmath::{Deg, Point3, Quaternion, Rotation3},
    config::{ExperienceConfig, ToneMapping},
    context::Context,
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::{Material, ShaderMaterialDescriptor},
        texture::Texture,
    },
    flow,
    postprocessing::{BloomPass, BloomSettings, Composer, ScenePass, ShaderPass},
    renderer::PostProcessing,
    resources::{Resources, Source},
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

const VIGNETTE: &str = "vignette";

#[derive(Default)]
struct Waves {
    plane: Option<ObjectId>,
}

impl Waves {
    fn material(ctx: &Context, map: Option<&Texture>) -> Material {
        let mut material = Material::shader(
            ctx,
            &ShaderMaterialDescriptor {
                label: "Waves",
                source: include_str!("shaders/waves.wgsl"),
                transparent: false,
                map,
            },
        );
        material.set_param(0, [1.5, 0.0, 0.0, 0.0]);
        material
    }
}

impl World for Waves {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let mesh = Geometry::plane(4.0, 4.0, 128, 128).upload(&world.ctx.device, "Waves");
        let id = scene.add(world.ctx, "waves", mesh, Self::material(world.ctx, None));
        if let Some(object) = scene.get_mut(id) {
            object.set_transform(Instance::new().with_rotation(Quaternion::from_angle_x(Deg(-90.0))));
        }
        self.plane = Some(id);
        world.debug.add(VIGNETTE, 0.6, 0.0, 1.0, 0.05);
        Ok(())
    }

    fn on_ready(
        &mut self,
        world: &mut WorldContext,
        scene: &mut Scene,
        resources: &Resources,
    ) -> anyhow::Result<()> {
        let texture = resources.create_texture(world.ctx, "checker")?;
        if let Some(object) = self.plane.and_then(|id| scene.get_mut(id)) {
            object.material = Self::material(world.ctx, Some(&texture));
        }
        Ok(())
    }

    fn post_processing(&mut self, ctx: &Context) -> PostProcessing {
        let size = ctx.size();
        let mut vignette = ShaderPass::new(ctx, VIGNETTE, include_str!("shaders/vignette.wgsl"));
        vignette.set_param(0, [0.6, 0.35, 0.0, 0.0]);
        let composer = Composer::new(ctx, size)
            .with_pass(ScenePass::new())
            .with_pass(BloomPass::new(
                ctx,
                size,
                BloomSettings {
                    strength: 0.6,
                    ..Default::default()
                },
            ))
            .with_pass(vignette);
        PostProcessing::Composer(composer)
    }

    fn update(&mut self, world: &mut WorldContext, _scene: &mut Scene, _tick: Tick) {
        let strength = world.debug.value_or(VIGNETTE, 0.6);
        if let Some(pass) = world
            .renderer
            .composer_mut()
            .and_then(Composer::pass_mut::<ShaderPass>)
        {
            pass.set_param(0, [strength, 0.35, 0.0, 0.0]);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Shader plane")
        .with_camera_position(Point3::new(0.0, 3.0, 4.0))
        .with_tone_mapping(ToneMapping::AcesFilmic, 1.0);
    let sources = vec![Source::texture("checker", "textures/checker.png")];
    flow::run(config, sources, Box::new(Waves::default()))
}
