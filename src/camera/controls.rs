//! Pointer driven camera controls.
//!
//! Both schemes read a [`PointerInput`] that is filled from winit window events and
//! cleared after every frame. The Experience camera runs them together: orbit for
//! damped rotation around the target, trackball for smooth zooming.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Quaternion, Rotation, Rotation3, Vector2, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::sizes::Sizes;

const EPS: f32 = 0.000_001;
/// Pixel based wheel deltas (touchpads, browsers) are converted to "lines" with this factor.
const PIXELS_PER_LINE: f32 = 100.0;

/// Pointer state collected between two frames.
#[derive(Debug, Clone)]
pub struct PointerInput {
    /// Cursor position in physical pixels.
    pub position: Vector2<f32>,
    /// Cursor movement since the last frame in physical pixels.
    pub delta: Vector2<f32>,
    pub primary: bool,
    pub secondary: bool,
    /// Scroll distance in lines, positive when scrolling towards the scene.
    pub wheel: f32,
    /// Size of the window the position refers to, in physical pixels.
    pub viewport: Vector2<f32>,
    has_position: bool,
}

impl PointerInput {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            position: Vector2::zero(),
            delta: Vector2::zero(),
            primary: false,
            secondary: false,
            wheel: 0.0,
            viewport: Vector2::new(width.max(1.0), height.max(1.0)),
            has_position: false,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vector2::new(width.max(1.0), height.max(1.0));
    }

    /// Match the viewport to the window, not to the clamped render targets.
    pub fn fit_window(&mut self, sizes: &Sizes) {
        let (width, height) = sizes.window_size();
        self.set_viewport(width as f32, height as f32);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let position = Vector2::new(x, y);
        if self.has_position {
            self.delta += position - self.position;
        }
        self.position = position;
        self.has_position = true;
    }

    /// Cursor position in normalized device coordinates (-1..1, y up).
    pub fn ndc(&self) -> Vector2<f32> {
        Vector2::new(
            self.position.x / self.viewport.x * 2.0 - 1.0,
            -(self.position.y / self.viewport.y * 2.0 - 1.0),
        )
    }

    /// Record a window event. Returns `true` if the event was pointer related.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.has_position = false;
                self.primary = false;
                self.secondary = false;
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.primary = pressed,
                    MouseButton::Right | MouseButton::Middle => self.secondary = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.wheel += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                true
            }
            _ => false,
        }
    }

    /// Forget the per-frame deltas, called once the controls consumed them.
    pub fn reset_deltas(&mut self) {
        self.delta = Vector2::zero();
        self.wheel = 0.0;
    }
}

/// Converts a per-frame damping factor (tuned at 60 fps) into one for `dt` seconds.
fn frame_damping(factor: f32, dt: f32) -> f32 {
    1.0 - (1.0 - factor.clamp(0.0, 1.0)).powf((dt * 60.0).max(0.0))
}

/// Rotates the camera around a target on a sphere.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    fn accumulate(&mut self, camera: &super::Camera, input: &PointerInput) {
        let height = input.viewport.y;
        if self.enable_rotate && input.primary && input.delta != Vector2::zero() {
            self.rotate_left(2.0 * PI * input.delta.x / height * self.rotate_speed);
            self.rotate_up(2.0 * PI * input.delta.y / height * self.rotate_speed);
        }
        if self.enable_zoom && input.wheel != 0.0 {
            // positive wheel dollies in
            self.scale *= self.zoom_scale().powf(input.wheel);
        }
        if self.enable_pan && input.secondary && input.delta != Vector2::zero() {
            let offset = camera.eye - self.target;
            let target_distance = offset.magnitude() * (camera.fovy.0 / 2.0).tan();
            let forward = -offset.normalize();
            let right = forward.cross(camera.up).normalize();
            let up = right.cross(forward);
            let dx = 2.0 * input.delta.x * target_distance / height * self.pan_speed;
            let dy = 2.0 * input.delta.y * target_distance / height * self.pan_speed;
            self.pan_offset += -right * dx + up * dy;
        }
    }

    /// Apply the accumulated input to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut super::Camera, input: &PointerInput, dt: f32) -> bool {
        self.accumulate(camera, input);

        let offset = camera.eye - self.target;
        let mut radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let step = if self.enable_damping {
            frame_damping(self.damping_factor, dt)
        } else {
            1.0
        };

        theta += self.theta_delta * step;
        phi += self.phi_delta * step;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let pan = self.pan_offset * step;
        self.target += pan;

        let new_offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let new_eye = self.target + new_offset;
        let moved = (new_eye - camera.eye).magnitude2() > EPS || pan.magnitude2() > EPS;
        camera.eye = new_eye;
        camera.target = self.target;

        if self.enable_damping {
            self.theta_delta *= 1.0 - step;
            self.phi_delta *= 1.0 - step;
            self.pan_offset *= 1.0 - step;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
        moved
    }
}

/// Virtual trackball: free rotation, zoom and pan with optional momentum.
#[derive(Debug, Clone)]
pub struct TrackballControls {
    pub target: Point3<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub no_rotate: bool,
    pub no_zoom: bool,
    pub no_pan: bool,
    /// Without static moving, rotation/zoom/pan ease out using `dynamic_damping_factor`.
    pub static_moving: bool,
    pub dynamic_damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    move_prev: Vector2<f32>,
    move_curr: Vector2<f32>,
    last_axis: Vector3<f32>,
    last_angle: f32,
    zoom_start: f32,
    zoom_end: f32,
    pan_start: Vector2<f32>,
    pan_end: Vector2<f32>,
    rotating: bool,
    panning: bool,
}

impl TrackballControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            rotate_speed: 1.0,
            zoom_speed: 1.2,
            pan_speed: 0.3,
            no_rotate: false,
            no_zoom: false,
            no_pan: false,
            static_moving: false,
            dynamic_damping_factor: 0.2,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            move_prev: Vector2::zero(),
            move_curr: Vector2::zero(),
            last_axis: Vector3::unit_y(),
            last_angle: 0.0,
            zoom_start: 0.0,
            zoom_end: 0.0,
            pan_start: Vector2::zero(),
            pan_end: Vector2::zero(),
            rotating: false,
            panning: false,
        }
    }

    fn mouse_on_circle(input: &PointerInput) -> Vector2<f32> {
        let half_width = input.viewport.x * 0.5;
        Vector2::new(
            (input.position.x - half_width) / half_width,
            (input.viewport.y * 0.5 - input.position.y) / half_width,
        )
    }

    fn mouse_on_screen(input: &PointerInput) -> Vector2<f32> {
        Vector2::new(
            input.position.x / input.viewport.x,
            input.position.y / input.viewport.y,
        )
    }

    fn accumulate(&mut self, input: &PointerInput) {
        if !self.no_rotate {
            let on_circle = Self::mouse_on_circle(input);
            if input.primary {
                if !self.rotating {
                    self.move_prev = on_circle;
                    self.rotating = true;
                }
                self.move_curr = on_circle;
            } else {
                self.rotating = false;
            }
        }
        if !self.no_zoom && input.wheel != 0.0 {
            self.zoom_start += input.wheel * 0.025;
        }
        if !self.no_pan {
            let on_screen = Self::mouse_on_screen(input);
            if input.secondary {
                if !self.panning {
                    self.pan_start = on_screen;
                    self.panning = true;
                }
                self.pan_end = on_screen;
            } else {
                self.panning = false;
            }
        }
    }

    fn rotate(&mut self, eye: &mut Vector3<f32>, up: &mut Vector3<f32>) {
        let move_direction = self.move_curr - self.move_prev;
        let mut angle = move_direction.magnitude();
        if angle > EPS {
            let eye_direction = eye.normalize();
            let up_direction = up.normalize();
            let sideways = up_direction.cross(eye_direction).normalize();
            let direction = up_direction * move_direction.y + sideways * move_direction.x;
            let axis = direction.cross(*eye).normalize();
            angle *= self.rotate_speed;
            let rotation = Quaternion::from_axis_angle(axis, cgmath::Rad(angle));
            *eye = rotation.rotate_vector(*eye);
            *up = rotation.rotate_vector(*up);
            self.last_axis = axis;
            self.last_angle = angle;
        } else if !self.static_moving && self.last_angle > EPS {
            self.last_angle *= (1.0 - self.dynamic_damping_factor).sqrt();
            let rotation = Quaternion::from_axis_angle(self.last_axis, cgmath::Rad(self.last_angle));
            *eye = rotation.rotate_vector(*eye);
            *up = rotation.rotate_vector(*up);
        }
        self.move_prev = self.move_curr;
    }

    fn zoom(&mut self, eye: &mut Vector3<f32>) {
        let factor = 1.0 + (self.zoom_end - self.zoom_start) * self.zoom_speed;
        if (factor - 1.0).abs() > EPS && factor > 0.0 {
            *eye *= factor;
        }
        if self.static_moving {
            self.zoom_start = self.zoom_end;
        } else {
            self.zoom_start += (self.zoom_end - self.zoom_start) * self.dynamic_damping_factor;
        }
    }

    fn pan(&mut self, eye: &Vector3<f32>, up: &Vector3<f32>) -> Vector3<f32> {
        let mut mouse_change = self.pan_end - self.pan_start;
        if mouse_change.magnitude2() <= EPS * EPS {
            return Vector3::zero();
        }
        mouse_change *= eye.magnitude() * self.pan_speed;
        let sideways = eye.cross(*up).normalize() * mouse_change.x;
        let upwards = up.normalize() * mouse_change.y;
        let pan = sideways + upwards;
        if self.static_moving {
            self.pan_start = self.pan_end;
        } else {
            self.pan_start += (self.pan_end - self.pan_start) * self.dynamic_damping_factor;
        }
        pan
    }

    pub fn update(&mut self, camera: &mut super::Camera, input: &PointerInput, _dt: f32) {
        self.accumulate(input);

        let mut eye = camera.eye - self.target;
        let mut up = camera.up;
        if !self.no_rotate {
            self.rotate(&mut eye, &mut up);
        }
        if !self.no_zoom {
            self.zoom(&mut eye);
        }
        if !self.no_pan {
            let pan = self.pan(&eye, &up);
            self.target += pan;
        }

        let distance = eye.magnitude();
        if distance > EPS {
            let clamped = distance.clamp(self.min_distance.max(EPS), self.max_distance);
            eye = eye * (clamped / distance);
        }

        camera.eye = self.target + eye;
        camera.up = up;
        camera.target = self.target;
    }
}
