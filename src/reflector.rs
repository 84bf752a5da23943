//! Planar mirrors.
//!
//! A reflector renders the scene from the main camera mirrored across its plane into
//! an offscreen target. Its material then samples that target with projective
//! texture coordinates, so the floor shows the mirrored scene.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, CameraResources},
    context::Context,
    data_structures::{material::Material, render_target::RenderTarget},
    scene::{DrawOptions, ObjectId, Scene},
};

/// Maps wgpu clip space to texture space: x to 0..1, y flipped to 0..1 (v down).
#[rustfmt::skip]
pub const TEXTURE_BIAS: Matrix4<f32> = Matrix4::new(
    0.5, 0.0, 0.0, 0.0,
    0.0, -0.5, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.5, 0.5, 0.0, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReflectorOptions {
    /// Size of the reflection target in pixels, independent of the window.
    pub texture_size: [u32; 2],
    pub tint: [f32; 3],
}

impl Default for ReflectorOptions {
    fn default() -> Self {
        Self {
            texture_size: [512, 512],
            tint: [0.5, 0.5, 0.5],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ReflectorUniform {
    texture_matrix: [[f32; 4]; 4],
    tint: [f32; 4],
}

#[derive(Debug)]
pub struct Reflector {
    pub object: ObjectId,
    pub target: RenderTarget,
    pub tint: [f32; 3],
    camera: CameraResources,
    buffer: wgpu::Buffer,
}

impl Reflector {
    pub(crate) fn new(ctx: &Context, name: &str, object: ObjectId, options: ReflectorOptions) -> Self {
        let target = RenderTarget::new(&ctx.device, options.texture_size, &format!("{name} reflection"));
        let uniform = ReflectorUniform {
            texture_matrix: TEXTURE_BIAS.into(),
            tint: [options.tint[0], options.tint[1], options.tint[2], 1.0],
        };
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Reflector Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            object,
            target,
            tint: options.tint,
            camera: CameraResources::new(&ctx.device, &ctx.layouts.camera, &format!("{name} virtual camera")),
            buffer,
        }
    }

    pub(crate) fn material(&self, ctx: &Context, name: &str) -> Material {
        Material::reflector(ctx, name, &self.buffer, &self.target.colour)
    }

    /// Position the virtual camera for this frame.
    ///
    /// Returns `false` when the camera looks at the back of the mirror; the
    /// target then keeps its previous contents.
    pub fn update(&self, ctx: &Context, scene: &Scene, camera: &Camera) -> bool {
        let Some(transform) = scene.get(self.object).and_then(|o| o.instances().first()) else {
            return false;
        };
        let plane_point = Point3::new(transform.position.x, transform.position.y, transform.position.z);
        let normal = transform.rotation * Vector3::unit_z();
        let Some(mirrored) = mirror_camera(camera, plane_point, normal) else {
            return false;
        };
        let view_proj = mirrored.view_projection();
        let uniform = ReflectorUniform {
            texture_matrix: (TEXTURE_BIAS * view_proj).into(),
            tint: [self.tint[0], self.tint[1], self.tint[2], 1.0],
        };
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        let mut camera_uniform = self.camera.uniform;
        camera_uniform.update_from_matrices(mirrored.eye, view_proj);
        ctx.queue
            .write_buffer(&self.camera.buffer, 0, bytemuck::cast_slice(&[camera_uniform]));
        true
    }

    /// Draw the scene, minus the mirror itself, into the reflection target.
    pub fn render(
        &self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &Camera,
        clear_colour: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Reflector Pass"),
            color_attachments: &[Some(
                self.target.colour_attachment(wgpu::LoadOp::Clear(clear_colour)),
            )],
            depth_stencil_attachment: Some(self.target.depth_attachment()),
            ..Default::default()
        });
        scene.draw(
            ctx,
            &mut render_pass,
            &self.camera.bind_group,
            &DrawOptions {
                layers: camera.layers,
                skip: Some(self.object),
                ..Default::default()
            },
        );
    }
}

pub fn reflect_vector(v: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    let n = normal.normalize();
    v - n * (2.0 * v.dot(n))
}

pub fn reflect_point(p: Point3<f32>, plane_point: Point3<f32>, normal: Vector3<f32>) -> Point3<f32> {
    let n = normal.normalize();
    p - n * (2.0 * (p - plane_point).dot(n))
}

/// The main camera mirrored across the plane, or `None` if the camera is behind it.
pub fn mirror_camera(camera: &Camera, plane_point: Point3<f32>, normal: Vector3<f32>) -> Option<Camera> {
    if normal.magnitude2() == 0.0 || (camera.eye - plane_point).dot(normal) < 0.0 {
        return None;
    }
    let mut mirrored = camera.clone();
    mirrored.eye = reflect_point(camera.eye, plane_point, normal);
    mirrored.target = reflect_point(camera.target, plane_point, normal);
    mirrored.up = reflect_vector(camera.up, normal);
    Some(mirrored)
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    fn camera_at(eye: Point3<f32>) -> Camera {
        Camera::new(eye, Point3::new(0.0, 0.0, 0.0), Deg(45.0), 1.0, 0.1, 100.0)
    }

    #[test]
    fn mirrors_eye_target_and_up_across_the_floor() {
        let camera = camera_at(Point3::new(1.0, 5.0, 2.0));
        let mirrored = mirror_camera(&camera, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y())
            .expect("camera is above the floor");
        assert_eq!(mirrored.eye, Point3::new(1.0, -5.0, 2.0));
        assert_eq!(mirrored.target, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(mirrored.up, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn camera_behind_the_mirror_is_skipped() {
        let camera = camera_at(Point3::new(0.0, -1.0, 3.0));
        assert!(mirror_camera(&camera, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y()).is_none());
    }

    #[test]
    fn reflection_respects_an_offset_plane() {
        let p = reflect_point(Point3::new(0.0, 3.0, 0.0), Point3::new(0.0, 1.0, 0.0), Vector3::unit_y() * 4.0);
        assert!((p.y - -1.0).abs() < 1e-6);
    }

    #[test]
    fn texture_bias_maps_clip_corners_to_uv_corners() {
        let top_left = TEXTURE_BIAS * cgmath::Vector4::new(-1.0, 1.0, 0.5, 1.0);
        let bottom_right = TEXTURE_BIAS * cgmath::Vector4::new(1.0, -1.0, 0.5, 1.0);
        assert_eq!((top_left.x, top_left.y), (0.0, 0.0));
        assert_eq!((bottom_right.x, bottom_right.y), (1.0, 1.0));
    }
}
