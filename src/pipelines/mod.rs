//! Render pipelines shared by every scene draw.
//!
//! All scene pipelines render into [`Texture::HDR_FORMAT`](crate::data_structures::texture::Texture::HDR_FORMAT)
//! targets with a depth buffer; only the output pass writes the surface format.
//! Bind group order: material (0), camera (1), light (2).

pub mod basic;
pub mod light;
pub mod sky;

use crate::{camera, data_structures::material};

/// Bind group layouts created once per device.
#[derive(Debug, Clone)]
pub struct Layouts {
    pub material: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub equirect: wgpu::BindGroupLayout,
    pub cube: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            material: material::mk_bind_group_layout(device),
            camera: camera::mk_bind_group_layout(device),
            light: light::mk_bind_group_layout(device),
            equirect: sky::mk_equirect_layout(device),
            cube: sky::mk_cube_layout(device),
        }
    }

    /// Layout of every mesh pipeline: material, camera, light.
    pub fn scene_pipeline_layout(&self, device: &wgpu::Device, label: &str) -> wgpu::PipelineLayout {
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&self.material, &self.camera, &self.light],
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub standard: wgpu::RenderPipeline,
    pub reflector: wgpu::RenderPipeline,
    pub sky_equirect: wgpu::RenderPipeline,
    pub sky_cube: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, layouts: &Layouts) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(device, layouts),
            standard: basic::mk_standard_pipeline(device, layouts),
            reflector: basic::mk_reflector_pipeline(device, layouts),
            sky_equirect: sky::mk_equirect_pipeline(device, layouts),
            sky_cube: sky::mk_cube_pipeline(device, layouts),
        }
    }
}
