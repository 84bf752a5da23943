//! Frame rendering: reflectors, the scene through the chosen post-processing mode, then
//! tone mapping onto the surface.

use std::{iter, time::Duration};

use anyhow::Context as _;

use crate::{
    camera::{Camera, ExperienceCamera},
    config::{ExperienceConfig, ToneMapping},
    context::Context,
    data_structures::{material::FrameUniforms, render_target::RenderTarget},
    postprocessing::{Composer, OutputPass, Pass, PassFrame, ScenePass, SelectiveBloom},
    scene::{DrawOptions, Scene},
    sizes::Sizes,
};

/// How the HDR scene image is produced before the output pass.
#[derive(Debug)]
pub enum PostProcessing {
    /// Scene straight into the renderer's own target.
    None,
    Composer(Composer),
    SelectiveBloom(SelectiveBloom),
}

impl PostProcessing {
    fn resize(&mut self, ctx: &Context, size: [u32; 2]) {
        match self {
            PostProcessing::None => (),
            PostProcessing::Composer(composer) => composer.resize(ctx, size),
            PostProcessing::SelectiveBloom(bloom) => bloom.resize(ctx, size),
        }
    }
}

#[derive(Debug)]
pub struct Renderer {
    pub clear_colour: wgpu::Color,
    pub post_processing: PostProcessing,
    pub output: OutputPass,
    scene_pass: ScenePass,
    scene_target: RenderTarget,
}

impl Renderer {
    pub fn new(ctx: &Context, config: &ExperienceConfig) -> Self {
        let size = ctx.size();
        Self {
            clear_colour: config.clear_colour,
            post_processing: PostProcessing::None,
            output: OutputPass::new(ctx, config.tone_mapping, config.exposure),
            scene_pass: ScenePass::new(),
            scene_target: RenderTarget::new(&ctx.device, size, "Scene"),
        }
    }

    pub fn set_tone_mapping(&mut self, tone_mapping: ToneMapping, exposure: f32) {
        self.output.tone_mapping = tone_mapping;
        self.output.exposure = exposure;
    }

    /// Switch modes. The new mode is resized to the current surface.
    pub fn set_post_processing(&mut self, ctx: &Context, mut post_processing: PostProcessing) {
        post_processing.resize(ctx, ctx.size());
        self.post_processing = post_processing;
    }

    pub fn composer_mut(&mut self) -> Option<&mut Composer> {
        match &mut self.post_processing {
            PostProcessing::Composer(composer) => Some(composer),
            _ => None,
        }
    }

    pub fn selective_bloom_mut(&mut self) -> Option<&mut SelectiveBloom> {
        match &mut self.post_processing {
            PostProcessing::SelectiveBloom(bloom) => Some(bloom),
            _ => None,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.scene_target.size()
    }

    /// Reconfigure the surface and every size-dependent target for the physical size.
    pub fn resize(&mut self, ctx: &mut Context, sizes: &Sizes) {
        let (width, height) = sizes.physical_size();
        ctx.resize(width, height);
        self.resize_targets(ctx, [width, height]);
    }

    fn resize_targets(&mut self, ctx: &Context, size: [u32; 2]) {
        self.scene_target.resize(&ctx.device, size);
        self.post_processing.resize(ctx, size);
    }

    /// Encode reflectors and the scene. Returns the HDR view to tone map.
    fn encode_scene(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &Camera,
        camera_bind_group: &wgpu::BindGroup,
        uniforms: FrameUniforms,
    ) -> wgpu::TextureView {
        let clear_colour = scene.clear_colour().unwrap_or(self.clear_colour);
        for reflector in scene.reflectors() {
            if reflector.update(ctx, scene, camera) {
                reflector.render(ctx, encoder, scene, camera, clear_colour);
            }
        }

        let frame = PassFrame {
            ctx,
            scene,
            camera,
            camera_bind_group,
            clear_colour,
            uniforms,
        };
        match &mut self.post_processing {
            PostProcessing::None => {
                self.scene_pass
                    .render(&frame, encoder, &self.scene_target, &self.scene_target);
                self.scene_target.colour.view.clone()
            }
            PostProcessing::Composer(composer) => composer.render(&frame, encoder).colour.view.clone(),
            PostProcessing::SelectiveBloom(bloom) => bloom.render(&frame, encoder).colour.view.clone(),
        }
    }

    /// Draw one frame to the window surface.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &Scene,
        camera: &ExperienceCamera,
        uniforms: FrameUniforms,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(surface) = &ctx.surface else {
            log::warn!("render called on a context without a surface");
            return Ok(());
        };
        let output = surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let hdr = self.encode_scene(
            ctx,
            &mut encoder,
            scene,
            &camera.camera,
            &camera.resources.bind_group,
            uniforms,
        );
        self.output.render(ctx, &mut encoder, &hdr, &view);
        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Render the scene into a caller-owned target, without post-processing.
    ///
    /// The target can then be bound as a material map (render-to-texture).
    pub fn render_to_target(
        &self,
        ctx: &Context,
        scene: &Scene,
        camera_bind_group: &wgpu::BindGroup,
        layers: crate::layers::Layers,
        target: &RenderTarget,
    ) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Target Encoder"),
            });
        {
            let clear = scene.clear_colour().unwrap_or(self.clear_colour);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Target Pass"),
                color_attachments: &[Some(target.colour_attachment(wgpu::LoadOp::Clear(clear)))],
                depth_stencil_attachment: Some(target.depth_attachment()),
                ..Default::default()
            });
            scene.draw(
                ctx,
                &mut render_pass,
                camera_bind_group,
                &DrawOptions {
                    layers,
                    ..Default::default()
                },
            );
        }
        ctx.queue.submit(iter::once(encoder.finish()));
    }

    /// Render a frame offscreen and read it back, in the surface format's channel order
    /// converted to RGBA.
    pub async fn render_to_image(
        &mut self,
        ctx: &Context,
        scene: &Scene,
        camera: &Camera,
        camera_bind_group: &wgpu::BindGroup,
        uniforms: FrameUniforms,
    ) -> anyhow::Result<image::RgbaImage> {
        let [width, height] = ctx.size();
        let format = ctx.surface_format();
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Readback Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row = padded_bytes_per_row(width);
        let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            size: u64::from(padded_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Readback Buffer"),
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        let hdr = self.encode_scene(ctx, &mut encoder, scene, camera, camera_bind_group, uniforms);
        self.output.render(ctx, &mut encoder, &hdr, &view);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(iter::once(encoder.finish()));

        // map first, then poll, otherwise the future never resolves
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // the receiver is awaited below
            let _ = tx.send(result);
        });
        ctx.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .context("waiting for the readback copy")?;
        rx.receive()
            .await
            .context("readback mapping was dropped")?
            .context("mapping the readback buffer")?;

        let data = buffer_slice.get_mapped_range();
        let pixels = unpad_rows(&data, width, height, padded_row, is_bgra(format));
        drop(data);
        output_buffer.unmap();
        image::RgbaImage::from_raw(width, height, pixels).context("readback buffer has the wrong size")
    }
}

/// Rows of a texture-to-buffer copy must be 256 byte aligned.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32, bgra: bool) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    if bgra {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    pixels
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_the_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(100), 512);
    }

    #[test]
    fn unpadding_drops_the_row_tail_and_swaps_bgra() {
        let mut data = vec![0u8; 512];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        data[256..260].copy_from_slice(&[5, 6, 7, 8]);
        let pixels = unpad_rows(&data, 1, 2, 256, true);
        assert_eq!(pixels, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }
}
