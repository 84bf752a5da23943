use std::any::Any;

use crate::{
    context::Context,
    data_structures::{
        render_target::RenderTarget,
        texture::{Texture, create_clamp_sampler},
    },
    postprocessing::{Pass, PassFrame, bloom::MixUniform, fullscreen},
};

/// Adds a second texture on top of the composer input: `write = read + secondary * strength`.
///
/// The secondary view usually belongs to another composer and is set every frame.
#[derive(Debug)]
pub struct MixPass {
    pub strength: f32,
    pub enabled: bool,
    secondary: Option<wgpu::TextureView>,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl MixPass {
    pub fn new(ctx: &Context, strength: f32) -> Self {
        let device = &ctx.device;
        let layout = fullscreen::mk_layout(device, "mix_bind_group_layout", true);
        let uniform = MixUniform {
            strength,
            _padding: [0.0; 3],
        };
        Self {
            strength,
            enabled: true,
            secondary: None,
            pipeline: fullscreen::mk_pipeline(device, "Mix", &layout, include_str!("mix.wgsl"), Texture::HDR_FORMAT),
            buffer: fullscreen::mk_uniform_buffer(device, "Mix Buffer", &uniform),
            sampler: create_clamp_sampler(device),
            layout,
        }
    }

    pub fn set_secondary(&mut self, view: wgpu::TextureView) {
        self.secondary = Some(view);
    }
}

impl Pass for MixPass {
    fn name(&self) -> &str {
        "Mix"
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
        // without a secondary input the pass degrades to a copy
        let (secondary, strength) = match &self.secondary {
            Some(view) => (view, self.strength),
            None => (&read.colour.view, 0.0),
        };
        let uniform = MixUniform {
            strength,
            _padding: [0.0; 3],
        };
        frame
            .ctx
            .queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
        let bind_group = fullscreen::mk_bind_group(
            &frame.ctx.device,
            &self.layout,
            "mix",
            &read.colour.view,
            &self.sampler,
            &self.buffer,
            Some(secondary),
        );
        fullscreen::draw(encoder, "Mix Pass", &write.colour.view, &self.pipeline, &bind_group);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
