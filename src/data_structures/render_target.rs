use crate::data_structures::texture::Texture;

/// An offscreen colour + depth pair that the scene or a fullscreen pass can draw into.
///
/// Sizes are in physical pixels. The colour attachment is always sampled later,
/// either by another pass or by a material (render-to-texture, reflections).
#[derive(Debug)]
pub struct RenderTarget {
    pub colour: Texture,
    pub depth: Texture,
    pub format: wgpu::TextureFormat,
    label: String,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        Self::with_format(device, size, Texture::HDR_FORMAT, label)
    }

    pub fn with_format(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        Self {
            colour: Texture::create_render_texture(device, size, format, &format!("{label} colour")),
            depth: Texture::create_depth_texture(device, size, &format!("{label} depth")),
            format,
            label: label.to_string(),
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.colour.size()
    }

    /// Recreate both attachments. A no-op when the size did not change.
    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        let size = [size[0].max(1), size[1].max(1)];
        if size == self.size() {
            return;
        }
        log::debug!("resizing render target {} to {}x{}", self.label, size[0], size[1]);
        *self = Self::with_format(device, size, self.format, &self.label);
    }

    pub fn colour_attachment(&self, load: wgpu::LoadOp<wgpu::Color>) -> wgpu::RenderPassColorAttachment<'_> {
        wgpu::RenderPassColorAttachment {
            view: &self.colour.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }
}
