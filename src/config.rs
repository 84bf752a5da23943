//! Startup configuration for an [`Experience`](crate::experience::Experience).
//!
//! Every demo used to carry its own copy of the renderer/camera boilerplate. The
//! knobs that actually differ between demos live here instead, with defaults
//! matching the common case.

use std::path::PathBuf;

/// Environment variable overriding [`ExperienceConfig::asset_root`] on native targets.
pub const ASSETS_ENV: &str = "EXPERIENCE_ASSETS";
/// Environment variable enabling the debug parameter registry on native targets.
pub const DEBUG_ENV: &str = "EXPERIENCE_DEBUG";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneMapping {
    None,
    Reinhard,
    AcesFilmic,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fovy: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub position: cgmath::Point3<f32>,
    pub target: cgmath::Point3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: cgmath::Deg(35.0),
            znear: 0.1,
            zfar: 100.0,
            position: cgmath::Point3::new(6.0, 4.0, 8.0),
            target: cgmath::Point3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExperienceConfig {
    pub title: String,
    pub camera: CameraConfig,
    pub clear_colour: wgpu::Color,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    /// Upper bound applied to the window scale factor. Rendering above 2x costs a
    /// lot of fill rate for almost no visible gain.
    pub max_pixel_ratio: f64,
    pub asset_root: PathBuf,
    pub debug: bool,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            title: "experience".to_string(),
            camera: CameraConfig::default(),
            clear_colour: wgpu::Color {
                r: 0.083,
                g: 0.083,
                b: 0.1,
                a: 1.0,
            },
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            max_pixel_ratio: 2.0,
            asset_root: PathBuf::from("assets"),
            debug: false,
        }
    }
}

impl ExperienceConfig {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Apply `EXPERIENCE_ASSETS` / `EXPERIENCE_DEBUG` (native) or the `#debug` url hash (web).
    pub fn with_env_overrides(mut self) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(root) = std::env::var(ASSETS_ENV) {
                log::info!("Using asset root {} from {}", root, ASSETS_ENV);
                self.asset_root = PathBuf::from(root);
            }
            if std::env::var_os(DEBUG_ENV).is_some() {
                self.debug = true;
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            let hash = web_sys::window().and_then(|w| w.location().hash().ok());
            if hash.as_deref() == Some("#debug") {
                self.debug = true;
            }
        }
        self
    }

    pub fn with_camera_position(mut self, position: impl Into<cgmath::Point3<f32>>) -> Self {
        self.camera.position = position.into();
        self
    }

    pub fn with_camera_target(mut self, target: impl Into<cgmath::Point3<f32>>) -> Self {
        self.camera.target = target.into();
        self
    }

    pub fn with_fovy(mut self, fovy: f32) -> Self {
        self.camera.fovy = cgmath::Deg(fovy);
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_tone_mapping(mut self, tone_mapping: ToneMapping, exposure: f32) -> Self {
        self.tone_mapping = tone_mapping;
        self.exposure = exposure;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
