use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use scene_experience::{
    resources::Resources,
    scene::Scene,
    time::Tick,
    world::{World, WorldContext},
};

pub fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// How often each world hook ran.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Invocations {
    pub init: u32,
    pub ready: u32,
    pub update: u32,
    pub render: u32,
    pub pointer: u32,
}

/// A world that only counts. The counters are shared so a test can keep a handle
/// after boxing the world.
#[derive(Debug, Default, Clone)]
pub struct RecordingWorld {
    pub invocations: Arc<Mutex<Invocations>>,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Invocations {
        self.invocations.lock().map(|i| i.clone()).unwrap_or_default()
    }

    fn record(&self, f: impl FnOnce(&mut Invocations)) {
        if let Ok(mut invocations) = self.invocations.lock() {
            f(&mut invocations);
        }
    }
}

impl World for RecordingWorld {
    fn on_init(&mut self, _world: &mut WorldContext, _scene: &mut Scene) -> anyhow::Result<()> {
        self.record(|i| i.init += 1);
        Ok(())
    }

    fn on_ready(
        &mut self,
        _world: &mut WorldContext,
        _scene: &mut Scene,
        _resources: &Resources,
    ) -> anyhow::Result<()> {
        self.record(|i| i.ready += 1);
        Ok(())
    }

    fn update(&mut self, _world: &mut WorldContext, _scene: &mut Scene, _tick: Tick) {
        self.record(|i| i.update += 1);
    }

    fn on_render(&mut self, _world: &mut WorldContext, _scene: &Scene, _tick: Tick) {
        self.record(|i| i.render += 1);
    }

    fn on_pointer(&mut self, _world: &mut WorldContext, _scene: &mut Scene) {
        self.record(|i| i.pointer += 1);
    }
}

/// Poll until the resources report ready, everything failed or `timeout` passed.
/// Returns how many polls reported readiness.
pub fn poll_until_settled(resources: &mut Resources, timeout: Duration) -> usize {
    let deadline = Instant::now() + timeout;
    let mut ready_reports = 0;
    loop {
        if resources.poll() {
            ready_reports += 1;
        }
        let settled = resources.loaded + resources.failed == resources.to_load;
        if settled || Instant::now() > deadline {
            // one more round to catch duplicate notifications
            if resources.poll() {
                ready_reports += 1;
            }
            return ready_reports;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

pub fn pixel_is(pixel: &image::Rgba<u8>, expected: [u8; 4], tolerance: u8) -> bool {
    pixel
        .0
        .iter()
        .zip(expected)
        .all(|(&got, want)| got.abs_diff(want) <= tolerance)
}

#[cfg(feature = "integration-tests")]
pub mod headless {
    use scene_experience::{
        config::{ExperienceConfig, ToneMapping},
        context::Context,
        experience::Experience,
        resources::{Resources, Source},
        world::World,
    };

    pub const WIDTH: u32 = 64;
    pub const HEIGHT: u32 = 64;

    /// Tone mapping off so the readback equals the scene colours.
    pub fn config(clear_colour: wgpu::Color) -> ExperienceConfig {
        ExperienceConfig::new("headless")
            .with_clear_colour(clear_colour)
            .with_tone_mapping(ToneMapping::None, 1.0)
    }

    pub fn experience(
        runtime: &tokio::runtime::Runtime,
        config: ExperienceConfig,
        sources: Vec<Source>,
        world: Box<dyn World>,
    ) -> anyhow::Result<Experience> {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = runtime.block_on(Context::headless(WIDTH, HEIGHT))?;
        let resources = Resources::new(sources, super::assets_root())?;
        let mut experience = Experience::new(ctx, &config, 1.0, resources, world)?;
        experience.start_loading(runtime);
        Ok(experience)
    }
}
