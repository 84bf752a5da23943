//! scene-experience
//!
//! A small Experience composition for wgpu demos that run natively and in the
//! browser. A demo implements [`World`](world::World) and hands it to
//! [`flow::run`]; the [`Experience`](experience::Experience) takes care of the
//! window, the GPU context, resizing, the frame clock, camera controls, asset
//! loading and rendering.
//!
//! High-level modules
//! - `camera`: perspective camera, uniforms, orbit and trackball controls
//! - `context`: GPU device/queue, surface and the shared pipelines
//! - `data_structures`: meshes, geometry, materials, textures, instances, render targets
//! - `experience`: the composition root wiring every component together
//! - `flow`: the winit event loop
//! - `postprocessing`: composer, scene/bloom/shader/mix/output passes, selective bloom
//! - `reflector`: planar mirrors rendered through a mirrored camera
//! - `renderer`: per-frame rendering, render-to-texture and readback
//! - `resources`: asynchronous loading of gltf models, textures, HDR and cube maps
//! - `scene`: objects, background and light
//! - `sizes`, `time`, `events`, `layers`, `debug`, `config`: the small components
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod debug;
pub mod error;
pub mod events;
pub mod experience;
pub mod flow;
pub mod layers;
pub mod pipelines;
pub mod postprocessing;
pub mod reflector;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod sizes;
pub mod time;
pub mod world;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::WindowEvent;
