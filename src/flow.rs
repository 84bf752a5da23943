//! Application event loop.
//!
//! [`run`] opens a window (the `canvas` element on the web), creates the GPU
//! [`Context`], builds the [`Experience`] around the given world and then drives it:
//!
//! 1. window events go to the pointer, the world and the debug keys
//! 2. resizes go to sizes, camera and renderer in that order
//! 3. every `RedrawRequested` is one tick: resources, camera, world, render
//!
//! Natively the context is created on a tokio runtime that also runs the asset loads.
//! On the web both are spawned with `spawn_local` and the context arrives as a user event.

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::ExperienceConfig,
    context::Context,
    experience::Experience,
    resources::{Resources, Source},
    world::World,
};

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<anyhow::Result<Context>>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(result) => f
                .debug_tuple("Initialized")
                .field(&(**result).as_ref().map(|_| "Context"))
                .finish(),
        }
    }
}

struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: ExperienceConfig,
    // taken once the context exists
    pending: Option<(Resources, Box<dyn World>)>,
    experience: Option<Experience>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        config: ExperienceConfig,
        resources: Resources,
        world: Box<dyn World>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            config,
            pending: Some((resources, world)),
            experience: None,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, ctx: anyhow::Result<Context>) {
        let Some((resources, world)) = self.pending.take() else {
            return;
        };
        let ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => return self.fail(event_loop, e.context("GPU initialisation failed")),
        };
        let scale_factor = ctx.window.as_ref().map_or(1.0, |w| w.scale_factor());
        match Experience::new(ctx, &self.config, scale_factor, resources, world) {
            Ok(mut experience) => {
                experience.start_loading(
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                );
                experience.ctx.request_redraw();
                self.experience = Some(experience);
            }
            Err(e) => self.fail(event_loop, e.context("world initialisation failed")),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.pending.is_none() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::error!("no element with id `{CANVAS_ID}` on the page"),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(Context::new(window));
            self.start(event_loop, ctx);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window).await;
                if proxy.send_event(FlowEvent::Initialized(Box::new(ctx))).is_err() {
                    log::error!("event loop closed before the GPU context was ready");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(ctx) => self.start(event_loop, *ctx),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(experience) = &mut self.experience else {
            return;
        };
        let window = experience.ctx.window.clone();
        let scale_factor = window.as_ref().map_or(1.0, |w| w.scale_factor());

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => experience.resize(size, scale_factor),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &window {
                    experience.resize(window.inner_size(), scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                // invoke main render loop
                experience.ctx.request_redraw();
                match experience.tick() {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(window) = &window {
                            experience.resize(window.inner_size(), scale_factor);
                        }
                    }
                    Err(e) => log::error!("Unable to render {}", e),
                }
            }
            event => {
                experience.window_event(&event);
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(experience) = &mut self.experience {
            experience.time.reset();
        }
    }
}

/// Open a window and run `world` until the window closes.
///
/// Fails if the GPU context or the world's `on_init` fails, or if a source is invalid.
pub fn run(config: ExperienceConfig, sources: Vec<Source>, world: Box<dyn World>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            wasm_bindgen::throw_str(&format!("could not initialize logger: {e}"));
        }
    }

    let config = config.with_env_overrides();
    let resources = Resources::new(sources, config.asset_root.clone())?;

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(not(all(feature = "integration-tests", target_os = "linux")))]
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config, resources, world)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_initialisation_is_debug_printable() {
        let event = FlowEvent::Initialized(Box::new(Err(anyhow::anyhow!("no adapter"))));
        let printed = format!("{event:?}");
        assert!(printed.starts_with("Initialized(Err("), "got {printed}");
        assert!(printed.contains("no adapter"));
    }
}
