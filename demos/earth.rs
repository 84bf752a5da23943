//! A shaded earth lit by a small sun orbiting at five units.
//!
//! The sun direction is kept in spherical coordinates. Set `EXPERIENCE_DEBUG=1` to move
//! it with the `sun_phi` and `sun_theta` parameters.

use std::f32::consts::{FRAC_PI_2, PI};

use scene_experience::{
    cgmath::{Point3, Vector3},
    config::ExperienceConfig,
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::{Material, ShaderMaterialDescriptor},
    },
    flow,
    scene::{ObjectId, Scene},
    time::Tick,
    world::{World, WorldContext},
};

const SUN_DISTANCE: f32 = 5.0;
const SUN_PHI: f32 = FRAC_PI_2;
const SUN_THETA: f32 = 0.5;

/// Unit direction for a polar angle `phi` measured from +y and an azimuth `theta` around it.
fn spherical_direction(phi: f32, theta: f32) -> Vector3<f32> {
    Vector3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
}

#[derive(Default)]
struct Earth {
    earth: Option<ObjectId>,
    sun: Option<ObjectId>,
    angles: (f32, f32),
}

impl Earth {
    fn place_sun(&mut self, scene: &mut Scene, phi: f32, theta: f32) {
        self.angles = (phi, theta);
        let direction = spherical_direction(phi, theta);
        if let Some(sun) = self.sun.and_then(|id| scene.get_mut(id)) {
            let position = direction * SUN_DISTANCE;
            sun.set_transform(Instance::at(position.x, position.y, position.z));
        }
        if let Some(earth) = self.earth.and_then(|id| scene.get_mut(id)) {
            earth
                .material
                .set_param(0, [direction.x, direction.y, direction.z, 0.0]);
        }
    }
}

impl World for Earth {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
        let ctx = world.ctx;
        self.sun = Some(scene.add(
            ctx,
            "sun",
            Geometry::sphere(0.1, 24, 16).upload(&ctx.device, "Sun"),
            Material::basic(ctx, "sun", [1.0, 1.0, 0.0, 1.0], None),
        ));

        let material = Material::shader(
            ctx,
            &ShaderMaterialDescriptor {
                label: "Earth",
                source: include_str!("shaders/earth.wgsl"),
                transparent: true,
                map: None,
            },
        );
        self.earth = Some(scene.add(
            ctx,
            "earth",
            Geometry::sphere(2.0, 32, 32).upload(&ctx.device, "Earth"),
            material,
        ));

        let phi = world.debug.add("sun_phi", SUN_PHI, 0.0, PI, 0.05);
        let theta = world.debug.add("sun_theta", SUN_THETA, -PI, PI, 0.05);
        self.place_sun(scene, phi, theta);
        Ok(())
    }

    fn update(&mut self, world: &mut WorldContext, scene: &mut Scene, _tick: Tick) {
        let phi = world.debug.value_or("sun_phi", SUN_PHI);
        let theta = world.debug.value_or("sun_theta", SUN_THETA);
        if (phi, theta) != self.angles {
            self.place_sun(scene, phi, theta);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ExperienceConfig::new("Earth")
        .with_camera_position(Point3::new(3.0, 3.0, 3.0))
        .with_fovy(75.0)
        .with_clear_colour(scene_experience::wgpu::Color {
            r: 0.013,
            g: 0.013,
            b: 0.013,
            a: 1.0,
        });
    flow::run(config, Vec::new(), Box::new(Earth::default()))
}

#[cfg(test)]
mod tests {
    use scene_experience::cgmath::InnerSpace;

    use super::*;

    #[test]
    fn default_sun_sits_on_the_equator() {
        let direction = spherical_direction(SUN_PHI, SUN_THETA);
        assert!((direction.magnitude() - 1.0).abs() < 1e-6);
        assert!(direction.y.abs() < 1e-6);
        assert!((direction.x - 0.5f32.sin()).abs() < 1e-6);
        assert!((direction.z - 0.5f32.cos()).abs() < 1e-6);
    }

    #[test]
    fn sun_above_the_north_pole_points_up() {
        let direction = spherical_direction(0.0, 1.3);
        assert!((direction - Vector3::unit_y()).magnitude() < 1e-6);
    }
}
