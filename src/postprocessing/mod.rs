//! Post-processing: a chain of fullscreen passes over ping-pong render targets.
//!
//! A [`Composer`] owns two [`RenderTarget`]s. Every enabled [`Pass`] reads one and
//! writes the other; passes that report [`Pass::needs_swap`] flip the pair afterwards,
//! so the next pass reads what was just written. [`ScenePass`](scene_pass::ScenePass)
//! draws the scene straight into the read target and does not swap.

pub mod bloom;
mod fullscreen;
pub mod mix;
pub mod output;
pub mod scene_pass;
pub mod selective_bloom;
pub mod shader_pass;

use std::any::Any;

pub use bloom::{BloomPass, BloomSettings};
pub use mix::MixPass;
pub use output::OutputPass;
pub use scene_pass::ScenePass;
pub use selective_bloom::SelectiveBloom;
pub use shader_pass::ShaderPass;

use crate::{
    camera::Camera,
    context::Context,
    data_structures::{material::FrameUniforms, render_target::RenderTarget},
    scene::Scene,
};

/// Everything a pass may need to draw one frame.
pub struct PassFrame<'a> {
    pub ctx: &'a Context,
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub camera_bind_group: &'a wgpu::BindGroup,
    pub clear_colour: wgpu::Color,
    pub uniforms: FrameUniforms,
}

pub trait Pass: std::fmt::Debug {
    fn name(&self) -> &str;

    fn enabled(&self) -> bool {
        true
    }

    /// Whether the composer swaps read and write after this pass.
    fn needs_swap(&self) -> bool {
        true
    }

    /// Size-dependent resources follow the composer, in physical pixels.
    fn resize(&mut self, _ctx: &Context, _size: [u32; 2]) {}

    fn render(
        &mut self,
        frame: &PassFrame,
        encoder: &mut wgpu::CommandEncoder,
        read: &RenderTarget,
        write: &RenderTarget,
    );

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// `(read, write)` target indices per pass and the index holding the result.
///
/// `needs_swap` lists the enabled passes in order. The first pass reads target 0.
pub fn ping_pong_schedule(needs_swap: &[bool]) -> (Vec<(usize, usize)>, usize) {
    let mut read = 0;
    let steps = needs_swap
        .iter()
        .map(|&swap| {
            let step = (read, 1 - read);
            if swap {
                read = 1 - read;
            }
            step
        })
        .collect();
    (steps, read)
}

#[derive(Debug)]
pub struct Composer {
    targets: [RenderTarget; 2],
    result: usize,
    passes: Vec<Box<dyn Pass>>,
}

impl Composer {
    pub fn new(ctx: &Context, size: [u32; 2]) -> Self {
        Self {
            targets: [
                RenderTarget::new(&ctx.device, size, "Composer A"),
                RenderTarget::new(&ctx.device, size, "Composer B"),
            ],
            result: 0,
            passes: Vec::new(),
        }
    }

    pub fn add_pass<P: Pass + 'static>(&mut self, pass: P) -> &mut Self {
        log::debug!("composer pass {} added", pass.name());
        self.passes.push(Box::new(pass));
        self
    }

    pub fn with_pass<P: Pass + 'static>(mut self, pass: P) -> Self {
        self.add_pass(pass);
        self
    }

    pub fn passes(&self) -> impl Iterator<Item = &dyn Pass> {
        self.passes.iter().map(|p| p.as_ref())
    }

    /// The first pass of type `T`.
    pub fn pass_mut<T: Pass + 'static>(&mut self) -> Option<&mut T> {
        self.passes
            .iter_mut()
            .find_map(|p| p.as_any_mut().downcast_mut::<T>())
    }

    pub fn size(&self) -> [u32; 2] {
        self.targets[0].size()
    }

    pub fn resize(&mut self, ctx: &Context, size: [u32; 2]) {
        for target in self.targets.iter_mut() {
            target.resize(&ctx.device, size);
        }
        for pass in self.passes.iter_mut() {
            pass.resize(ctx, size);
        }
    }

    /// Run every enabled pass and return the target holding the result.
    pub fn render(&mut self, frame: &PassFrame, encoder: &mut wgpu::CommandEncoder) -> &RenderTarget {
        let swaps: Vec<bool> = self
            .passes
            .iter()
            .filter(|p| p.enabled())
            .map(|p| p.needs_swap())
            .collect();
        let (steps, result) = ping_pong_schedule(&swaps);
        let targets = &self.targets;
        for (pass, (read, write)) in self.passes.iter_mut().filter(|p| p.enabled()).zip(steps) {
            pass.render(frame, encoder, &targets[read], &targets[write]);
        }
        self.result = result;
        &self.targets[result]
    }

    /// Result of the last [`render`](Self::render).
    pub fn output(&self) -> &RenderTarget {
        &self.targets[self.result]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_then_two_swapping_passes() {
        let (steps, result) = ping_pong_schedule(&[false, true, true]);
        assert_eq!(steps, vec![(0, 1), (0, 1), (1, 0)]);
        assert_eq!(result, 0);
    }

    #[test]
    fn a_single_swap_leaves_the_result_in_the_second_target() {
        let (steps, result) = ping_pong_schedule(&[false, true]);
        assert_eq!(steps, vec![(0, 1), (0, 1)]);
        assert_eq!(result, 1);
    }

    #[test]
    fn no_passes_reads_the_first_target() {
        let (steps, result) = ping_pong_schedule(&[]);
        assert!(steps.is_empty());
        assert_eq!(result, 0);
    }
}
