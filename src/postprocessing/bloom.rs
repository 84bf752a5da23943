//! Threshold, blur and add.
//!
//! Bright pixels of the input are extracted at half resolution, blurred with a
//! separable gaussian a few times and added back onto the input.

use std::any::Any;

use bytemuck::Zeroable;

use crate::{
    context::Context,
    data_structures::{
        render_target::RenderTarget,
        texture::{Texture, create_clamp_sampler},
    },
    postprocessing::{Pass, PassFrame, fullscreen},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    /// Multiplier of the blurred glow when added back.
    pub strength: f32,
    /// Blur tap spacing in half-resolution texels.
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

const BLUR_ITERATIONS: usize = 3;
const THRESHOLD_KNEE: f32 = 0.1;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BrightUniform {
    threshold: f32,
    knee: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    direction: [f32; 2],
    radius: f32,
    _padding: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MixUniform {
    pub strength: f32,
    pub _padding: [f32; 3],
}

#[derive(Debug)]
pub struct BloomPass {
    pub settings: BloomSettings,
    pub enabled: bool,
    single_layout: wgpu::BindGroupLayout,
    mix_layout: wgpu::BindGroupLayout,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    mix_pipeline: wgpu::RenderPipeline,
    bright_buffer: wgpu::Buffer,
    horizontal_buffer: wgpu::Buffer,
    vertical_buffer: wgpu::Buffer,
    mix_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    /// Half-resolution pair the blur bounces between.
    bright: Texture,
    scratch: Texture,
}

pub(crate) fn half_size(size: [u32; 2]) -> [u32; 2] {
    [(size[0] / 2).max(1), (size[1] / 2).max(1)]
}

impl BloomPass {
    pub fn new(ctx: &Context, size: [u32; 2], settings: BloomSettings) -> Self {
        let device = &ctx.device;
        let single_layout = fullscreen::mk_layout(device, "bloom_bind_group_layout", false);
        let mix_layout = fullscreen::mk_layout(device, "bloom_mix_bind_group_layout", true);
        let format = Texture::HDR_FORMAT;
        let [bright, scratch] = mk_half_targets(device, size);
        Self {
            settings,
            enabled: true,
            bright_pipeline: fullscreen::mk_pipeline(device, "Bloom Bright", &single_layout, include_str!("bright.wgsl"), format),
            blur_pipeline: fullscreen::mk_pipeline(device, "Bloom Blur", &single_layout, include_str!("blur.wgsl"), format),
            mix_pipeline: fullscreen::mk_pipeline(device, "Bloom Composite", &mix_layout, include_str!("mix.wgsl"), format),
            bright_buffer: fullscreen::mk_uniform_buffer(device, "Bloom Bright Buffer", &BrightUniform::zeroed()),
            horizontal_buffer: fullscreen::mk_uniform_buffer(device, "Bloom Horizontal Buffer", &BlurUniform::zeroed()),
            vertical_buffer: fullscreen::mk_uniform_buffer(device, "Bloom Vertical Buffer", &BlurUniform::zeroed()),
            mix_buffer: fullscreen::mk_uniform_buffer(device, "Bloom Composite Buffer", &MixUniform::zeroed()),
            sampler: create_clamp_sampler(device),
            single_layout,
            mix_layout,
            bright,
            scratch,
        }
    }

    fn write_uniforms(&self, queue: &wgpu::Queue) {
        let s = &self.settings;
        let bright = BrightUniform {
            threshold: s.threshold,
            knee: THRESHOLD_KNEE,
            _padding: [0.0; 2],
        };
        let blur = |direction| BlurUniform {
            direction,
            radius: s.radius.max(0.0) * 2.0 + 1.0,
            _padding: 0.0,
        };
        let mix = MixUniform {
            strength: s.strength,
            _padding: [0.0; 3],
        };
        queue.write_buffer(&self.bright_buffer, 0, bytemuck::bytes_of(&bright));
        queue.write_buffer(&self.horizontal_buffer, 0, bytemuck::bytes_of(&blur([1.0, 0.0])));
        queue.write_buffer(&self.vertical_buffer, 0, bytemuck::bytes_of(&blur([0.0, 1.0])));
        queue.write_buffer(&self.mix_buffer, 0, bytemuck::bytes_of(&mix));
    }
}

fn mk_half_targets(device: &wgpu::Device, size: [u32; 2]) -> [Texture; 2] {
    let half = half_size(size);
    [
        Texture::create_render_texture(device, half, Texture::HDR_FORMAT, "Bloom Bright"),
        Texture::create_render_texture(device, half, Texture::HDR_FORMAT, "Bloom Scratch"),
    ]
}

impl Pass for BloomPass {
    fn name(&self) -> &str {
        "Bloom"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn resize(&mut self, ctx: &Context, size: [u32; 2]) {
        if self.bright.size() == half_size(size) {
            return;
        }
        let [bright, scratch] = mk_half_targets(&ctx.device, size);
        self.bright = bright;
        self.scratch = scratch;
    }

    fn render(
        &mut self,
        frame: &PassFrame,
        encoder: &mut wgpu::CommandEncoder,
        read: &RenderTarget,
        write: &RenderTarget,
    ) {
        let device = &frame.ctx.device;
        self.write_uniforms(&frame.ctx.queue);

        let extract = fullscreen::mk_bind_group(
            device,
            &self.single_layout,
            "bloom extract",
            &read.colour.view,
            &self.sampler,
            &self.bright_buffer,
            None,
        );
        fullscreen::draw(encoder, "Bloom Extract", &self.bright.view, &self.bright_pipeline, &extract);

        let horizontal = fullscreen::mk_bind_group(
            device,
            &self.single_layout,
            "bloom horizontal",
            &self.bright.view,
            &self.sampler,
            &self.horizontal_buffer,
            None,
        );
        let vertical = fullscreen::mk_bind_group(
            device,
            &self.single_layout,
            "bloom vertical",
            &self.scratch.view,
            &self.sampler,
            &self.vertical_buffer,
            None,
        );
        for _ in 0..BLUR_ITERATIONS {
            fullscreen::draw(encoder, "Bloom Blur H", &self.scratch.view, &self.blur_pipeline, &horizontal);
            fullscreen::draw(encoder, "Bloom Blur V", &self.bright.view, &self.blur_pipeline, &vertical);
        }

        let composite = fullscreen::mk_bind_group(
            device,
            &self.mix_layout,
            "bloom composite",
            &read.colour.view,
            &self.sampler,
            &self.mix_buffer,
            Some(&self.bright.view),
        );
        fullscreen::draw(encoder, "Bloom Composite", &write.colour.view, &self.mix_pipeline, &composite);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_size_never_reaches_zero() {
        assert_eq!(half_size([1920, 1080]), [960, 540]);
        assert_eq!(half_size([1, 3]), [1, 1]);
    }

    #[test]
    fn uniforms_are_16_byte_blocks() {
        assert_eq!(std::mem::size_of::<BrightUniform>(), 16);
        assert_eq!(std::mem::size_of::<BlurUniform>(), 16);
        assert_eq!(std::mem::size_of::<MixUniform>(), 16);
    }
}
