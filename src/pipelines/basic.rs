use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, Vertex},
        texture::Texture,
    },
    pipelines::Layouts,
};

/// Declarations shared by all mesh shaders: vertex/instance inputs, camera, light.
pub const SCENE_PRELUDE: &str = include_str!("scene.wgsl");

/// Declarations custom shader materials see on top of [`SCENE_PRELUDE`].
pub const SHADER_MATERIAL_PRELUDE: &str = include_str!("shader_material.wgsl");

pub fn mk_basic_pipeline(device: &wgpu::Device, layouts: &Layouts) -> wgpu::RenderPipeline {
    mk_scene_pipeline(device, layouts, "Basic", include_str!("basic.wgsl"), None, true)
}

pub fn mk_standard_pipeline(device: &wgpu::Device, layouts: &Layouts) -> wgpu::RenderPipeline {
    mk_scene_pipeline(device, layouts, "Standard", include_str!("standard.wgsl"), None, true)
}

pub fn mk_reflector_pipeline(device: &wgpu::Device, layouts: &Layouts) -> wgpu::RenderPipeline {
    mk_scene_pipeline(device, layouts, "Reflector", include_str!("reflector.wgsl"), None, true)
}

/// Compile a user material. Transparent materials alpha blend and skip depth writes.
pub fn mk_shader_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    label: &str,
    source: &str,
    transparent: bool,
) -> wgpu::RenderPipeline {
    let source = format!("{SHADER_MATERIAL_PRELUDE}\n{source}");
    let blend = transparent.then_some(wgpu::BlendState::ALPHA_BLENDING);
    mk_scene_pipeline(device, layouts, label, &source, blend, !transparent)
}

fn mk_scene_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    label: &str,
    source: &str,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let layout = layouts.scene_pipeline_layout(device, &format!("{label} Pipeline Layout"));
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(format!("{SCENE_PRELUDE}\n{source}").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        Texture::HDR_FORMAT,
        Some(blend.unwrap_or(wgpu::BlendState::REPLACE)),
        Some(Texture::DEPTH_FORMAT),
        &[model::ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        // mirrored cameras flip the winding, so nothing is culled
        None,
        depth_write,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
