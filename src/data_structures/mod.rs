//! Engine data structures: meshes, geometry, materials, textures, instances and render targets.
//!
//! - `geometry` builds procedural CPU-side vertex/index data (plane, box, sphere, torus)
//! - `model` contains GPU meshes and the models loaded from gltf
//! - `material` pairs a pipeline with its bind group and uniform
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `render_target` is an offscreen colour + depth pair

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod render_target;
pub mod texture;
