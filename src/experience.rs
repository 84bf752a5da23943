//! The composition root of a demo.
//!
//! An [`Experience`] is created once the GPU context exists and is then driven by the
//! event loop in [`flow`](crate::flow). It is an ordinary value passed by reference;
//! nothing about it is global.

use winit::{dpi::PhysicalSize, event::WindowEvent};

use crate::{
    camera::{ExperienceCamera, register_fov},
    config::ExperienceConfig,
    context::Context,
    data_structures::material::FrameUniforms,
    debug::Debug,
    renderer::Renderer,
    resources::Resources,
    scene::Scene,
    sizes::Sizes,
    time::{Tick, Time},
    world::{World, WorldContext},
};

pub struct Experience {
    pub ctx: Context,
    pub sizes: Sizes,
    pub time: Time,
    pub camera: ExperienceCamera,
    pub renderer: Renderer,
    pub resources: Resources,
    pub scene: Scene,
    pub debug: Debug,
    world: Box<dyn World>,
}

impl std::fmt::Debug for Experience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Experience")
            .field("sizes", &self.sizes)
            .field("time", &self.time)
            .field("objects", &self.scene.len())
            .field("resources", &format_args!("{}/{}", self.resources.loaded, self.resources.to_load))
            .finish_non_exhaustive()
    }
}

impl Experience {
    /// Build every component and run the world's `on_init`.
    pub fn new(
        ctx: Context,
        config: &ExperienceConfig,
        scale_factor: f64,
        resources: Resources,
        world: Box<dyn World>,
    ) -> anyhow::Result<Self> {
        let [width, height] = ctx.size();
        let sizes = Sizes::from_physical(
            PhysicalSize::new(width, height),
            scale_factor,
            config.max_pixel_ratio,
        );
        let camera = ExperienceCamera::new(&ctx.device, &ctx.layouts.camera, &config.camera, &sizes);
        let mut debug = Debug::new(config.debug);
        register_fov(&camera.camera, &mut debug);
        let renderer = Renderer::new(&ctx, config);
        let scene = Scene::new(&ctx, config.clear_colour);
        let mut experience = Self {
            debug,
            ctx,
            sizes,
            time: Time::new(),
            camera,
            renderer,
            resources,
            scene,
            world,
        };
        // the pixel ratio clamp can make the render size differ from the window
        experience.camera.resize(&experience.sizes);
        experience
            .renderer
            .resize(&mut experience.ctx, &experience.sizes);

        let (mut world_ctx, scene, world, _) = experience.parts();
        world.on_init(&mut world_ctx, scene)?;
        let post_processing = world.post_processing(world_ctx.ctx);
        world_ctx
            .renderer
            .set_post_processing(world_ctx.ctx, post_processing);
        log::info!("experience ready to render with {} objects", experience.scene.len());
        Ok(experience)
    }

    /// Borrow the world alongside what it may touch.
    fn parts(&mut self) -> (WorldContext<'_>, &mut Scene, &mut dyn World, &Resources) {
        (
            WorldContext {
                ctx: &self.ctx,
                renderer: &mut self.renderer,
                debug: &mut self.debug,
                camera: &mut self.camera.camera,
                pointer: &self.camera.input,
            },
            &mut self.scene,
            self.world.as_mut(),
            &self.resources,
        )
    }

    pub fn start_loading(
        &mut self,
        #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ) {
        self.resources.start_loading(
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
        );
    }

    /// Sizes first, then the camera aspect, then the renderer targets.
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.sizes.update_from_physical(size, scale_factor);
        self.camera.resize(&self.sizes);
        self.renderer.resize(&mut self.ctx, &self.sizes);
    }

    /// Route a window event to the pointer, the world and the debug keys.
    /// Returns `true` if it was consumed.
    pub fn window_event(&mut self, event: &WindowEvent) -> bool {
        if self.camera.input.handle_window_event(event) {
            let (mut world_ctx, scene, world, _) = self.parts();
            world.on_pointer(&mut world_ctx, scene);
            return true;
        }
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.debug.handle_key(event),
            _ => false,
        }
    }

    pub fn frame_uniforms(&self, tick: Tick) -> FrameUniforms {
        let [width, height] = self.ctx.size();
        let pointer = self.camera.input.ndc();
        FrameUniforms {
            time: tick.elapsed,
            delta: tick.delta,
            resolution: [width as f32, height as f32],
            pointer: [pointer.x, pointer.y],
        }
    }

    /// Everything of a frame except drawing: resources, camera, world, GPU uploads and the
/// world's offscreen renders.
    pub fn update(&mut self, tick: Tick) {
        if self.resources.poll() {
            let (mut world_ctx, scene, world, resources) = self.parts();
            if let Err(e) = world.on_ready(&mut world_ctx, scene, resources) {
                log::error!("world failed to use its loaded resources: {e:#}");
            }
        }
        self.camera.update(&self.ctx.queue, &self.debug, tick.delta);
        {
            let (mut world_ctx, scene, world, _) = self.parts();
            world.update(&mut world_ctx, scene, tick);
        }
        let uniforms = self.frame_uniforms(tick);
        self.scene.prepare(&self.ctx, &uniforms);
        let (mut world_ctx, scene, world, _) = self.parts();
        world.on_render(&mut world_ctx, scene, tick);
    }

    pub fn render(&mut self, tick: Tick) -> Result<(), wgpu::SurfaceError> {
        let uniforms = self.frame_uniforms(tick);
        self.renderer
            .render(&self.ctx, &self.scene, &self.camera, uniforms)
    }

    /// Advance the clock, update and draw one frame.
    pub fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        let tick = self.time.tick();
        self.update(tick);
        self.render(tick)
    }

    /// Update and draw one frame offscreen, returning the pixels.
    pub async fn capture(&mut self) -> anyhow::Result<image::RgbaImage> {
        let tick = self.time.tick();
        self.update(tick);
        let uniforms = self.frame_uniforms(tick);
        self.renderer
            .render_to_image(
                &self.ctx,
                &self.scene,
                &self.camera.camera,
                &self.camera.resources.bind_group,
                uniforms,
            )
            .await
    }
}
