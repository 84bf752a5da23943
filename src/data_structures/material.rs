//! Materials: a pipeline plus the `@group(0)` bind group it reads.
//!
//! All material kinds share one bind group layout, a uniform at binding 0, a
//! 2D texture at binding 1 and its sampler at binding 2, so every scene pipeline
//! is created from the same pipeline layout.

use wgpu::util::DeviceExt;

use crate::{context::Context, data_structures::texture::Texture};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Unlit colour times an optional map.
    Basic,
    /// Lambert shading from the scene light plus ambient.
    Standard,
    /// User WGSL with the shared [`ShaderUniforms`] block.
    Shader,
    /// Projective lookup into a reflector's render target.
    Reflector,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub colour: [f32; 4],
    /// rgb is added on top of the shaded colour, so values above 1 glow under bloom.
    pub emissive: [f32; 4],
}

impl SurfaceUniform {
    pub fn new(colour: [f32; 4]) -> Self {
        Self {
            colour,
            emissive: [0.0; 4],
        }
    }
}

/// Uniforms every custom shader material and shader pass receives.
///
/// `time`, `delta`, `resolution` and `pointer` are rewritten every frame;
/// `params` belongs to the world.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub time: f32,
    pub delta: f32,
    pub resolution: [f32; 2],
    /// Pointer in normalized device coordinates.
    pub pointer: [f32; 2],
    _padding: [f32; 2],
    pub params: [[f32; 4]; 4],
}

impl ShaderUniforms {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            delta: 0.0,
            resolution: [1.0, 1.0],
            pointer: [0.0, 0.0],
            _padding: [0.0; 2],
            params: [[0.0; 4]; 4],
        }
    }
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame values fed into every [`ShaderUniforms`] block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub delta: f32,
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
}

impl FrameUniforms {
    pub fn apply(&self, uniforms: &mut ShaderUniforms) {
        uniforms.time = self.time;
        uniforms.delta = self.delta;
        uniforms.resolution = self.resolution;
        uniforms.pointer = self.pointer;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MaterialData {
    Surface(SurfaceUniform),
    Shader(ShaderUniforms),
    /// The uniform buffer is owned and written by someone else (a reflector).
    External,
}

/// Describes a custom WGSL material.
///
/// `source` is appended to a prelude that declares `VertexInput`, `InstanceInput`,
/// `VertexOutput`, the camera and light uniforms, `uniforms: ShaderUniforms`,
/// `t_map`/`s_map` and the helper `standard_vertex`. It must define `vs_main` and `fs_main`.
#[derive(Clone, Debug)]
pub struct ShaderMaterialDescriptor<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub transparent: bool,
    pub map: Option<&'a Texture>,
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    /// Drawn after every opaque object of the scene.
    pub transparent: bool,
    buffer: wgpu::Buffer,
    data: MaterialData,
}

impl Material {
    /// Unlit material.
    pub fn basic(ctx: &Context, name: &str, colour: [f32; 4], map: Option<&Texture>) -> Self {
        Self::surface(ctx, name, MaterialKind::Basic, SurfaceUniform::new(colour), map)
    }

    /// Lit material.
    pub fn standard(ctx: &Context, name: &str, colour: [f32; 4], map: Option<&Texture>) -> Self {
        Self::surface(ctx, name, MaterialKind::Standard, SurfaceUniform::new(colour), map)
    }

    pub fn surface(
        ctx: &Context,
        name: &str,
        kind: MaterialKind,
        uniform: SurfaceUniform,
        map: Option<&Texture>,
    ) -> Self {
        let pipeline = match kind {
            MaterialKind::Standard => &ctx.pipelines.standard,
            _ => &ctx.pipelines.basic,
        };
        Self::from_parts(
            &ctx.device,
            &ctx.layouts.material,
            pipeline.clone(),
            name,
            kind,
            MaterialData::Surface(uniform),
            map.unwrap_or(&ctx.white),
        )
    }

    pub fn shader(ctx: &Context, desc: &ShaderMaterialDescriptor) -> Self {
        let pipeline = crate::pipelines::basic::mk_shader_pipeline(
            &ctx.device,
            &ctx.layouts,
            desc.label,
            desc.source,
            desc.transparent,
        );
        let mut material = Self::from_parts(
            &ctx.device,
            &ctx.layouts.material,
            pipeline,
            desc.label,
            MaterialKind::Shader,
            MaterialData::Shader(ShaderUniforms::new()),
            desc.map.unwrap_or(&ctx.white),
        );
        material.transparent = desc.transparent;
        material
    }

    /// A material reading a uniform buffer and render target owned by a reflector.
    pub fn reflector(ctx: &Context, name: &str, uniform: &wgpu::Buffer, target: &Texture) -> Self {
        let bind_group = mk_bind_group(&ctx.device, &ctx.layouts.material, name, uniform, target);
        Self {
            name: name.to_string(),
            kind: MaterialKind::Reflector,
            pipeline: ctx.pipelines.reflector.clone(),
            bind_group,
            transparent: false,
            buffer: uniform.clone(),
            data: MaterialData::External,
        }
    }

    pub(crate) fn from_parts(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        pipeline: wgpu::RenderPipeline,
        name: &str,
        kind: MaterialKind,
        data: MaterialData,
        map: &Texture,
    ) -> Self {
        let contents: &[u8] = match &data {
            MaterialData::Surface(uniform) => bytemuck::bytes_of(uniform),
            MaterialData::Shader(uniform) => bytemuck::bytes_of(uniform),
            MaterialData::External => &[0; 16],
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Material Buffer")),
            contents,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(device, layout, name, &buffer, map);
        Self {
            name: name.to_string(),
            kind,
            pipeline,
            bind_group,
            transparent: false,
            buffer,
            data,
        }
    }

    pub(crate) fn black(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        pipeline: &wgpu::RenderPipeline,
        white: &Texture,
    ) -> Self {
        Self::from_parts(
            device,
            layout,
            pipeline.clone(),
            "Black",
            MaterialKind::Basic,
            MaterialData::Surface(SurfaceUniform::new([0.0, 0.0, 0.0, 1.0])),
            white,
        )
    }

    pub fn surface_uniform(&self) -> Option<&SurfaceUniform> {
        match &self.data {
            MaterialData::Surface(uniform) => Some(uniform),
            _ => None,
        }
    }

    pub fn surface_uniform_mut(&mut self) -> Option<&mut SurfaceUniform> {
        match &mut self.data {
            MaterialData::Surface(uniform) => Some(uniform),
            _ => None,
        }
    }

    pub fn shader_uniforms(&self) -> Option<&ShaderUniforms> {
        match &self.data {
            MaterialData::Shader(uniforms) => Some(uniforms),
            _ => None,
        }
    }

    pub fn shader_uniforms_mut(&mut self) -> Option<&mut ShaderUniforms> {
        match &mut self.data {
            MaterialData::Shader(uniforms) => Some(uniforms),
            _ => None,
        }
    }

    /// Set one of the four user vec4 slots of a shader material. Ignored for other kinds.
    pub fn set_param(&mut self, index: usize, value: [f32; 4]) {
        match self.shader_uniforms_mut() {
            Some(uniforms) if index < uniforms.params.len() => uniforms.params[index] = value,
            Some(_) => log::warn!("material {} has no shader param {index}", self.name),
            None => log::warn!("material {} is not a shader material", self.name),
        }
    }

    pub fn set_colour(&mut self, colour: [f32; 4]) {
        if let Some(uniform) = self.surface_uniform_mut() {
            uniform.colour = colour;
        }
    }

    pub fn set_emissive(&mut self, emissive: [f32; 4]) {
        if let Some(uniform) = self.surface_uniform_mut() {
            uniform.emissive = emissive;
        }
    }

    /// Upload the CPU copy of the uniform.
    pub fn write(&self, queue: &wgpu::Queue) {
        match &self.data {
            MaterialData::Surface(uniform) => {
                queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform))
            }
            MaterialData::Shader(uniforms) => {
                queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms))
            }
            MaterialData::External => (),
        }
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    name: &str,
    buffer: &wgpu::Buffer,
    map: &Texture,
) -> wgpu::BindGroup {
    let fallback;
    let sampler = match &map.sampler {
        Some(sampler) => sampler,
        None => {
            fallback = crate::data_structures::texture::create_default_sampler(device);
            &fallback
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&map.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(&format!("{name} material bind group")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_uniforms_match_the_wgsl_layout() {
        // time, delta, resolution, pointer, padding, four vec4 params
        assert_eq!(std::mem::size_of::<ShaderUniforms>(), 96);
        assert_eq!(std::mem::size_of::<SurfaceUniform>(), 32);
    }

    #[test]
    fn frame_uniforms_leave_params_untouched() {
        let mut uniforms = ShaderUniforms::new();
        uniforms.params[2] = [1.0, 2.0, 3.0, 4.0];
        FrameUniforms {
            time: 3.5,
            delta: 0.016,
            resolution: [800.0, 600.0],
            pointer: [0.25, -0.5],
        }
        .apply(&mut uniforms);
        assert_eq!(uniforms.time, 3.5);
        assert_eq!(uniforms.resolution, [800.0, 600.0]);
        assert_eq!(uniforms.pointer, [0.25, -0.5]);
        assert_eq!(uniforms.params[2], [1.0, 2.0, 3.0, 4.0]);
    }
}
