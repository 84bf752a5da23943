use crate::{
    camera::{
        Camera, CameraResources,
        controls::{OrbitControls, PointerInput, TrackballControls},
    },
    config::CameraConfig,
    debug::Debug,
    sizes::Sizes,
};

/// Debug parameter holding the vertical field of view in degrees.
pub const FOV_PARAM: &str = "fov";

/// Expose the camera's field of view as a debug parameter (10..100 degrees).
pub fn register_fov(camera: &Camera, debug: &mut Debug) {
    let degrees = cgmath::Deg::from(camera.fovy).0;
    debug.add(FOV_PARAM, degrees, 10.0, 100.0, 1.0);
}

/// Copy the debug field of view onto the camera, which makes the parameter the owner of
/// `fovy`. Returns `true` if the projection changed.
pub fn apply_fov(camera: &mut Camera, debug: &Debug) -> bool {
    let Some(degrees) = debug.get(FOV_PARAM) else {
        return false;
    };
    let fovy = cgmath::Rad::from(cgmath::Deg(degrees));
    if (fovy.0 - camera.fovy.0).abs() < 1e-6 {
        return false;
    }
    camera.fovy = fovy;
    true
}

/// The camera component of an Experience.
///
/// Owns a perspective [`Camera`], its GPU uniform and both control schemes. Orbit
/// rotates with damping, trackball zooms smoothly; panning is disabled for both by
/// default so the two never fight over the target.
#[derive(Debug)]
pub struct ExperienceCamera {
    pub camera: Camera,
    pub resources: CameraResources,
    pub orbit: OrbitControls,
    pub trackball: TrackballControls,
    pub input: PointerInput,
}

impl ExperienceCamera {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        config: &CameraConfig,
        sizes: &Sizes,
    ) -> Self {
        let camera = Camera::new(
            config.position,
            config.target,
            config.fovy,
            sizes.aspect(),
            config.znear,
            config.zfar,
        );

        let mut orbit = OrbitControls::new(config.target);
        orbit.enable_damping = true;
        orbit.enable_zoom = false;
        orbit.enable_pan = false;

        let mut trackball = TrackballControls::new(config.target);
        trackball.no_rotate = true;
        trackball.no_pan = true;
        trackball.no_zoom = false;
        trackball.zoom_speed = 1.5;

        let mut resources = CameraResources::new(device, layout, "Camera");
        resources.uniform.update_view_proj(&camera);

        let mut input = PointerInput::new(1.0, 1.0);
        input.fit_window(sizes);

        Self {
            camera,
            resources,
            orbit,
            trackball,
            input,
        }
    }

    /// Keep the projection in sync with the viewport: `aspect == width / height`.
    pub fn resize(&mut self, sizes: &Sizes) {
        self.camera.set_aspect(sizes.width(), sizes.height());
        self.input.fit_window(sizes);
    }

    /// Feed the debug field of view and the collected pointer input through the camera,
    /// then upload the result.
    pub fn update(&mut self, queue: &wgpu::Queue, debug: &Debug, delta: f32) {
        apply_fov(&mut self.camera, debug);
        self.orbit.update(&mut self.camera, &self.input, delta);
        self.trackball.target = self.orbit.target;
        self.trackball.update(&mut self.camera, &self.input, delta);
        self.input.reset_deltas();
        self.resources.write(queue, &self.camera);
    }
}
