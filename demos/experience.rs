//! A glTF drone inside a dark box that keeps facing the camera, with axes at the origin.
//!
//! Run with `cargo run --example experience`. Set `EXPERIENCE_DEBUG=1` to tune the lights.

use scene_experience::{
    cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3},
    config::ExperienceConfig,
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::{Material, ShaderMaterialDescriptor},
    },
    flow,
    resources::{Resources, Source},
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

/// Length and thickness of the axis bars, x red, y green, z blue.
const AXIS_LENGTH: f32 = 1.0;
const AXIS_WIDTH: f32 = 0.01;

const BOX_COLOUR: [f32; 4] = [0x13 as f32 / 255.0, 0x18 as f32 / 255.0, 0x25 as f32 / 255.0, 1.0];

#[derive(Default)]
struct Hangar {
    shell: Option<ObjectId>,
    drone: Vec<ObjectId>,
}

impl World for Hangar {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let mut material = Material::shader(
            world.ctx,
            &ShaderMaterialDescriptor {
                label: "Box",
                source: include_str!("shaders/box.wgsl"),
                transparent: true,
                map: None,
            },
        );
        material.set_param(0, BOX_COLOUR);
        let mesh = Geometry::cuboid(1.0, 1.0, 3.0, 32, 32, 32).upload(&world.ctx.device, "Box");
        self.shell = Some(scene.add(world.ctx, "box", mesh, material));
        add_axes(world, scene);

        scene.light.light.ambient_intensity = world.debug.add("ambient", 0.45, 0.0, 2.0, 0.05);
        scene.light.light.intensity = world.debug.add("sun", 1.2, 0.0, 4.0, 0.1);
        scene.light.light.direction = Vector3::new(3.5, 2.0, 0.0);
        Ok(())
    }

    fn on_ready(
        &mut self,
        world: &mut WorldContext,
        scene: &mut Scene,
        resources: &Resources,
    ) -> anyhow::Result<()> {
        let model = resources.create_model(world.ctx, "drone")?;
        let transform = Instance::new()
            .with_rotation(Quaternion::from_angle_y(Deg(-180.0)))
            .with_scale(0.5);
        self.drone = scene.add_model(world.ctx, "drone", &model, transform);
        log::info!("drone added as {} object(s)", self.drone.len());
        Ok(())
    }

    fn update(&mut self, world: &mut WorldContext, scene: &mut Scene, _tick: Tick) {
        let eye = world.camera.eye;
        if let Some(object) = self.shell.and_then(|id| scene.get_mut(id)) {
            if let Some(transform) = object.transform_mut() {
                transform.look_at(eye);
            }
        }
        scene.light.light.ambient_intensity = world.debug.value_or("ambient", 0.45);
        scene.light.light.intensity = world.debug.value_or("sun", 1.2);
    }
}

fn add_axes(world: &WorldContext, scene: &mut Scene) {
    let half = AXIS_LENGTH / 2.0;
    let axes = [
        ("x", [AXIS_LENGTH, AXIS_WIDTH, AXIS_WIDTH], [half, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
        ("y", [AXIS_WIDTH, AXIS_LENGTH, AXIS_WIDTH], [0.0, half, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ("z", [AXIS_WIDTH, AXIS_WIDTH, AXIS_LENGTH], [0.0, 0.0, half], [0.0, 0.0, 1.0, 1.0]),
    ];
    for (name, [w, h, d], [x, y, z], colour) in axes {
        let mesh = Geometry::cuboid(w, h, d, 1, 1, 1).upload(&world.ctx.device, "Axis");
        let material = Material::basic(world.ctx, "axis", colour, None);
        let id = scene.add(world.ctx, &format!("axis {name}"), mesh, material);
        if let Some(object) = scene.get_mut(id) {
            object.set_transform(Instance::at(x, y, z));
        }
    }
}

/// The camera of the Experience composition: two units back, a narrow 30 degree lens.
fn config() -> ExperienceConfig {
    ExperienceConfig::new("Experience")
        .with_camera_position(Point3::new(0.0, 0.0, 2.0))
        .with_fovy(30.0)
        .with_clear_colour(scene_experience::wgpu::Color {
            r: 0.012,
            g: 0.012,
            b: 0.012,
            a: 1.0,
        })
}

fn main() -> anyhow::Result<()> {
    let sources = vec![Source::gltf("drone", "models/drone/scene.gltf")];
    flow::run(config(), sources, Box::new(Hangar::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_at_the_box_through_the_composition_camera() {
        let config = config();
        assert_eq!(config.camera.position, Point3::new(0.0, 0.0, 2.0));
        assert_eq!(config.camera.target, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(config.camera.fovy, Deg(30.0));
    }
}
