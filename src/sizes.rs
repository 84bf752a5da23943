//! Viewport dimensions of the drawing surface.

use crate::events::EventEmitter;

/// Lowest pixel ratio accepted. Guards against bogus scale factors reported by
/// some compositors while the window is being created.
const MIN_PIXEL_RATIO: f64 = 0.25;

/// Notification emitted after every [`Sizes::update_sizes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

/// Logical window size plus the (clamped) pixel ratio used for the render targets.
#[derive(Debug)]
pub struct Sizes {
    width: u32,
    height: u32,
    pixel_ratio: f64,
    scale_factor: f64,
    max_pixel_ratio: f64,
    pub events: EventEmitter<Resize>,
}

impl Sizes {
    pub fn new(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let mut sizes = Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
            scale_factor: 1.0,
            max_pixel_ratio: max_pixel_ratio.max(MIN_PIXEL_RATIO),
            events: EventEmitter::new(),
        };
        sizes.store(width, height, scale_factor);
        sizes
    }

    /// Build from a physical size as reported by winit.
    pub fn from_physical(
        size: winit::dpi::PhysicalSize<u32>,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale_factor,
            max_pixel_ratio,
        )
    }

    /// Store new logical dimensions and the device scale factor, then notify listeners.
    ///
    /// Dimensions are kept at one pixel or more so that every aspect ratio derived from
    /// them stays finite.
    pub fn update_sizes(&mut self, width: u32, height: u32, scale_factor: f64) -> Resize {
        self.store(width, height, scale_factor);
        let resize = self.snapshot();
        log::debug!(
            "resize to {}x{} @{}",
            resize.width,
            resize.height,
            resize.pixel_ratio
        );
        self.events.trigger(&resize);
        resize
    }

    pub fn update_from_physical(
        &mut self,
        size: winit::dpi::PhysicalSize<u32>,
        scale_factor: f64,
    ) -> Resize {
        let logical = size.to_logical::<f64>(scale_factor);
        self.update_sizes(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale_factor,
        )
    }

    fn store(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.width = width.max(1);
        self.height = height.max(1);
        let scale_factor = if scale_factor.is_finite() {
            scale_factor
        } else {
            1.0
        };
        self.scale_factor = scale_factor.max(MIN_PIXEL_RATIO);
        self.pixel_ratio = self.scale_factor.min(self.max_pixel_ratio);
    }

    pub fn snapshot(&self) -> Resize {
        Resize {
            width: self.width,
            height: self.height,
            pixel_ratio: self.pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Size of the render targets in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (f64::from(self.width) * self.pixel_ratio).round() as u32;
        let h = (f64::from(self.height) * self.pixel_ratio).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Window size in the pixels winit reports cursor positions in. Differs from
    /// [`Sizes::physical_size`] once the scale factor exceeds the pixel ratio limit.
    pub fn window_size(&self) -> (u32, u32) {
        let w = (f64::from(self.width) * self.scale_factor).round() as u32;
        let h = (f64::from(self.height) * self.scale_factor).round() as u32;
        (w.max(1), h.max(1))
    }
}
