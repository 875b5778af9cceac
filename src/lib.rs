//! scene-sandbox
//!
//! A real-time rendering sandbox. Each scene demonstrates one technique and
//! the keyboard switches between them while the window stays open.
//!
//! High-level modules
//! - `camera`: fly camera, projection and their uniforms
//! - `config`: start-up settings and their environment overrides
//! - `context`: window, device, queue and the resources every scene shares
//! - `data_structures`: meshes, instances, terrain, LOD grids, particles
//! - `flow`: the `Scene` trait and the event loop driving it
//! - `lights`: point, directional and spot lights
//! - `noise`: seeded Perlin noise
//! - `pipelines`: render and compute pipelines with their shaders
//! - `render`: per-frame pass helpers
//! - `resources`: loading models, textures, heightmaps and skyboxes
//! - `scenes`: the demo scenes and scene selection
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod lights;
pub mod noise;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scenes;

pub use config::SandboxConfig;
pub use scenes::SceneKind;
