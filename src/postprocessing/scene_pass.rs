use std::any::Any;

use crate::{
    data_structures::render_target::RenderTarget,
    layers::Layers,
    postprocessing::{Pass, PassFrame},
    scene::DrawOptions,
};

/// Draws the scene into the composer's read target.
#[derive(Debug)]
pub struct ScenePass {
    pub enabled: bool,
    /// Objects outside these layers are drawn black and the background is skipped.
    pub darken_except: Option<Layers>,
}

impl ScenePass {
    pub fn new() -> Self {
        Self {
            enabled: true,
            darken_except: None,
        }
    }

    /// Only objects on `layers` keep their colour, the selective bloom input.
    pub fn darkened(layers: Layers) -> Self {
        Self {
            enabled: true,
            darken_except: Some(layers),
        }
    }
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ScenePass {
    fn name(&self) -> &str {
        "Scene"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn needs_swap(&self) -> bool {
        false
    }

    fn render(
        &mut self,
        frame: &PassFrame,
        encoder: &mut wgpu::CommandEncoder,
        read: &RenderTarget,
        _write: &RenderTarget,
    ) {
        let clear = match self.darken_except {
            Some(_) => wgpu::Color::BLACK,
            None => frame.scene.clear_colour().unwrap_or(frame.clear_colour),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(read.colour_attachment(wgpu::LoadOp::Clear(clear)))],
            depth_stencil_attachment: Some(read.depth_attachment()),
            ..Default::default()
        });
        let options = DrawOptions {
            layers: frame.camera.layers,
            darken: self
                .darken_except
                .map(|keep| (keep, &frame.ctx.black_material)),
            background: self.darken_except.is_none(),
            ..Default::default()
        };
        frame
            .scene
            .draw(frame.ctx, &mut render_pass, frame.camera_bind_group, &options);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
