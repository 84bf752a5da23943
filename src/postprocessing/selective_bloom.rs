//! Bloom restricted to objects on one layer.
//!
//! Two composers run every frame. The bloom composer draws the scene with every
//! object outside the layer blacked out and blooms it. The final composer draws the
//! scene normally and adds the bloom composer's result on top.

use crate::{
    context::Context,
    data_structures::render_target::RenderTarget,
    layers::Layers,
    postprocessing::{
        BloomPass, BloomSettings, Composer, MixPass, PassFrame, ScenePass,
    },
};

#[derive(Debug)]
pub struct SelectiveBloom {
    pub layer: u32,
    pub bloom: Composer,
    pub final_composer: Composer,
}

impl SelectiveBloom {
    pub fn new(ctx: &Context, size: [u32; 2], layer: u32, settings: BloomSettings) -> Self {
        let bloom = Composer::new(ctx, size)
            .with_pass(ScenePass::darkened(Layers::none().with(layer)))
            .with_pass(BloomPass::new(ctx, size, settings));
        let final_composer = Composer::new(ctx, size)
            .with_pass(ScenePass::new())
            .with_pass(MixPass::new(ctx, 1.0));
        Self {
            layer,
            bloom,
            final_composer,
        }
    }

    pub fn settings_mut(&mut self) -> Option<&mut BloomSettings> {
        self.bloom.pass_mut::<BloomPass>().map(|pass| &mut pass.settings)
    }

    pub fn resize(&mut self, ctx: &Context, size: [u32; 2]) {
        self.bloom.resize(ctx, size);
        self.final_composer.resize(ctx, size);
    }

    pub fn render(&mut self, frame: &PassFrame, encoder: &mut wgpu::CommandEncoder) -> &RenderTarget {
        let glow = self.bloom.render(frame, encoder).colour.view.clone();
        if let Some(mix) = self.final_composer.pass_mut::<MixPass>() {
            mix.set_secondary(glow);
        }
        self.final_composer.render(frame, encoder)
    }
}
