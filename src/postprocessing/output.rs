//! Tone mapping from the HDR targets into the surface format.

use crate::{
    config::ToneMapping,
    context::Context,
    data_structures::texture::create_clamp_sampler,
    postprocessing::fullscreen,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct OutputUniform {
    exposure: f32,
    tone_mapping: u32,
    encode_srgb: u32,
    _padding: u32,
}

impl OutputUniform {
    fn new(tone_mapping: ToneMapping, exposure: f32, format: wgpu::TextureFormat) -> Self {
        Self {
            exposure,
            tone_mapping: match tone_mapping {
                ToneMapping::None => 0,
                ToneMapping::Reinhard => 1,
                ToneMapping::AcesFilmic => 2,
            },
            // sRGB surfaces encode on store
            encode_srgb: u32::from(!format.is_srgb()),
            _padding: 0,
        }
    }
}

/// The last step of every frame. Not part of a composer: it writes the surface.
#[derive(Debug)]
pub struct OutputPass {
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    format: wgpu::TextureFormat,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl OutputPass {
    pub fn new(ctx: &Context, tone_mapping: ToneMapping, exposure: f32) -> Self {
        let device = &ctx.device;
        let format = ctx.surface_format();
        let layout = fullscreen::mk_layout(device, "output_bind_group_layout", false);
        let uniform = OutputUniform::new(tone_mapping, exposure, format);
        Self {
            tone_mapping,
            exposure,
            format,
            pipeline: mk_output_pipeline(device, &layout, format),
            buffer: fullscreen::mk_uniform_buffer(device, "Output Buffer", &uniform),
            sampler: create_clamp_sampler(device),
            layout,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Tone map `input` into `target`, whose format must match the surface.
    pub fn render(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        if ctx.surface_format() != self.format {
            log::debug!("output format changed to {:?}", ctx.surface_format());
            self.format = ctx.surface_format();
            self.pipeline = mk_output_pipeline(&ctx.device, &self.layout, self.format);
        }
        let uniform = OutputUniform::new(self.tone_mapping, self.exposure, self.format);
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
        let bind_group = fullscreen::mk_bind_group(
            &ctx.device,
            &self.layout,
            "output",
            input,
            &self.sampler,
            &self.buffer,
            None,
        );
        fullscreen::draw(encoder, "Output Pass", target, &self.pipeline, &bind_group);
    }
}

fn mk_output_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    fullscreen::mk_pipeline(device, "Output", layout, include_str!("output.wgsl"), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_linear_surfaces_are_encoded_by_hand() {
        let srgb = OutputUniform::new(ToneMapping::Reinhard, 1.0, wgpu::TextureFormat::Bgra8UnormSrgb);
        let linear = OutputUniform::new(ToneMapping::AcesFilmic, 0.8, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!((srgb.tone_mapping, srgb.encode_srgb), (1, 0));
        assert_eq!((linear.tone_mapping, linear.encode_srgb), (2, 1));
        assert_eq!(linear.exposure, 0.8);
    }
}
