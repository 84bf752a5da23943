use std::any::Any;

use crate::{
    context::Context,
    data_structures::{
        material::ShaderUniforms,
        render_target::RenderTarget,
        texture::{Texture, create_clamp_sampler},
    },
    postprocessing::{Pass, PassFrame, fullscreen},
};

/// Declarations a shader pass sees besides `t_input`, `s_input` and `FullscreenOutput`.
pub const SHADER_PASS_PRELUDE: &str = include_str!("shader_pass.wgsl");

/// A fullscreen effect written in WGSL.
///
/// The source must define `fs_main(in: FullscreenOutput) -> @location(0) vec4<f32>`.
/// It samples the previous result through `t_input`/`s_input` and reads `uniforms`,
/// whose frame fields are refreshed before every draw.
#[derive(Debug)]
pub struct ShaderPass {
    pub name: String,
    pub enabled: bool,
    pub uniforms: ShaderUniforms,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl ShaderPass {
    pub fn new(ctx: &Context, name: &str, fragment: &str) -> Self {
        let device = &ctx.device;
        let layout = fullscreen::mk_layout(device, &format!("{name} bind group layout"), false);
        let source = format!("{SHADER_PASS_PRELUDE}\n{fragment}");
        let uniforms = ShaderUniforms::new();
        Self {
            name: name.to_string(),
            enabled: true,
            pipeline: fullscreen::mk_pipeline(device, name, &layout, &source, Texture::HDR_FORMAT),
            buffer: fullscreen::mk_uniform_buffer(device, &format!("{name} Buffer"), &uniforms),
            sampler: create_clamp_sampler(device),
            uniforms,
            layout,
        }
    }

    pub fn set_param(&mut self, index: usize, value: [f32; 4]) {
        match self.uniforms.params.get_mut(index) {
            Some(param) => *param = value,
            None => log::warn!("shader pass {} has no param {index}", self.name),
        }
    }
}

impl Pass for ShaderPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &mut self,
        frame: &PassFrame,
        encoder: &mut wgpu::CommandEncoder,
        read: &RenderTarget,
        write: &RenderTarget,
    ) {
        frame.uniforms.apply(&mut self.uniforms);
        frame
            .ctx
            .queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.uniforms));
        let bind_group = fullscreen::mk_bind_group(
            &frame.ctx.device,
            &self.layout,
            &self.name,
            &read.colour.view,
            &self.sampler,
            &self.buffer,
            None,
        );
        fullscreen::draw(encoder, &self.name, &write.colour.view, &self.pipeline, &bind_group);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
