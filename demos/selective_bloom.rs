//! A ring of spheres where every other one glows.
//!
//! Only objects on [`BLOOM_LAYER`] feed the bloom, the rest keep their plain colour.
//! Click to toggle the glow of the sphere closest to the pointer's screen position.
//! With `EXPERIENCE_DEBUG=1` Tab and the arrow keys tune strength, radius and threshold.

use std::f32::consts::TAU;

use scene_experience::{
    cgmath::{Point3, Vector4},
    config::{ExperienceConfig, ToneMapping},
    context::Context,
    data_structures::{geometry::Geometry, instance::Instance, material::Material},
    flow,
    layers::BLOOM_LAYER,
    postprocessing::{bloom::BloomSettings, SelectiveBloom},
    renderer::PostProcessing,
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

const SPHERES: usize = 10;
const RING_RADIUS: f32 = 3.0;

#[derive(Default)]
struct Spheres {
    spheres: Vec<ObjectId>,
    was_pressed: bool,
}

impl Spheres {
    fn colour(i: usize) -> [f32; 4] {
        let hue = i as f32 / SPHERES as f32;
        [
            0.5 + 0.5 * (TAU * hue).cos(),
            0.5 + 0.5 * (TAU * (hue + 0.33)).cos(),
            0.5 + 0.5 * (TAU * (hue + 0.67)).cos(),
            1.0,
        ]
    }

    fn set_glow(scene: &mut Scene, id: ObjectId, glow: bool) {
        let Some(object) = scene.get_mut(id) else {
            return;
        };
        let [r, g, b, _] = object
            .material
            .surface_uniform()
            .map_or([1.0; 4], |uniform| uniform.colour);
        if glow {
            object.layers.enable(BLOOM_LAYER);
            object.material.set_emissive([r * 4.0, g * 4.0, b * 4.0, 1.0]);
        } else {
            object.layers.disable(BLOOM_LAYER);
            object.material.set_emissive([0.0, 0.0, 0.0, 1.0]);
        }
    }
}

impl World for Spheres {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let geometry = Geometry::sphere(0.4, 32, 16);
        for i in 0..SPHERES {
            let angle = TAU * i as f32 / SPHERES as f32;
            let material = Material::standard(world.ctx, &format!("sphere {i}"), Self::colour(i), None);
            let id = scene.add(
                world.ctx,
                &format!("sphere {i}"),
                geometry.upload(&world.ctx.device, "Sphere"),
                material,
            );
            if let Some(object) = scene.get_mut(id) {
                object.set_transform(Instance::at(
                    RING_RADIUS * angle.cos(),
                    0.0,
                    RING_RADIUS * angle.sin(),
                ));
            }
            Self::set_glow(scene, id, i % 2 == 0);
            self.spheres.push(id);
        }

        let defaults = BloomSettings::default();
        world.debug.add("strength", defaults.strength, 0.0, 3.0, 0.1);
        world.debug.add("radius", defaults.radius, 0.0, 1.0, 0.05);
        world.debug.add("threshold", defaults.threshold, 0.0, 1.0, 0.05);
        Ok(())
    }

    fn post_processing(&mut self, ctx: &Context) -> PostProcessing {
        PostProcessing::SelectiveBloom(SelectiveBloom::new(
            ctx,
            ctx.size(),
            BLOOM_LAYER,
            BloomSettings::default(),
        ))
    }

    fn on_pointer(&mut self, world: &mut WorldContext, scene: &mut Scene) {
        let pressed = world.pointer.primary;
        let clicked = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !clicked {
            return;
        }
        let pointer = world.pointer.ndc();
        let view_proj = world.camera.view_projection();
        let closest = self
            .spheres
            .iter()
            .filter_map(|&id| {
                let position = scene.get(id)?.instances().first()?.position;
                let clip = view_proj * Vector4::new(position.x, position.y, position.z, 1.0);
                if clip.w <= 0.0 {
                    return None;
                }
                let (dx, dy) = (clip.x / clip.w - pointer.x, clip.y / clip.w - pointer.y);
                Some((id, dx * dx + dy * dy))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((id, _)) = closest {
            let glowing = scene
                .get(id)
                .is_some_and(|object| object.layers.is_enabled(BLOOM_LAYER));
            Self::set_glow(scene, id, !glowing);
        }
    }

    fn update(&mut self, world: &mut WorldContext, scene: &mut Scene, tick: Tick) {
        if let Some(settings) = world
            .renderer
            .selective_bloom_mut()
            .and_then(SelectiveBloom::settings_mut)
        {
            settings.strength = world.debug.value_or("strength", settings.strength);
            settings.radius = world.debug.value_or("radius", settings.radius);
            settings.threshold = world.debug.value_or("threshold", settings.threshold);
        }
        for (i, &id) in self.spheres.iter().enumerate() {
            if let Some(transform) = scene.get_mut(id).and_then(|object| object.transform_mut()) {
                let phase = tick.elapsed + i as f32;
                transform.position.y = 0.3 * phase.sin();
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Selective bloom")
        .with_camera_position(Point3::new(0.0, 3.0, 7.0))
        .with_tone_mapping(ToneMapping::Reinhard, 1.0);
    flow::run(config, Vec::new(), Box::new(Spheres::default()))
}
