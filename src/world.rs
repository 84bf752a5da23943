//! The per-demo part of an Experience.

use crate::{
    camera::controls::PointerInput,
    context::Context,
    debug::Debug,
    renderer::{PostProcessing, Renderer},
    resources::Resources,
    scene::Scene,
    time::Tick,
};

/// Everything a world may touch besides its scene.
pub struct WorldContext<'a> {
    pub ctx: &'a Context,
    pub renderer: &'a mut Renderer,
    pub debug: &'a mut Debug,
    pub camera: &'a mut crate::camera::Camera,
    pub pointer: &'a PointerInput,
}

/// Builds and animates a demo's scene.
///
/// `on_init` runs once the GPU is up, before any asset has arrived. `on_ready` runs
/// exactly once, on the frame that observes every declared source loaded. A failed
/// source means it never runs.
pub trait World {
    fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()>;

    fn on_ready(
        &mut self,
        _world: &mut WorldContext,
        _scene: &mut Scene,
        _resources: &Resources,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn update(&mut self, world: &mut WorldContext, scene: &mut Scene, tick: Tick);

    /// Called once the scene's GPU copies match this frame's `update`, right before the
    /// frame is drawn. Offscreen renders such as [`Renderer::render_to_target`] go here.
    fn on_render(&mut self, _world: &mut WorldContext, _scene: &Scene, _tick: Tick) {}

    /// Called for every pointer move or button change, after the camera saw it.
    fn on_pointer(&mut self, _world: &mut WorldContext, _scene: &mut Scene) {}

    /// The renderer mode this world wants, asked once after `on_init`.
    fn post_processing(&mut self, _ctx: &Context) -> PostProcessing {
        PostProcessing::None
    }
}
