//! Scene data: meshes, instances, textures and terrain.
//!
//! - `model` holds mesh and material definitions and the draw helpers
//! - `primitives` generates cubes, spheres and planes
//! - `instance` and `instanced` cover per-instance transforms and grids of them
//! - `terrain` builds heightmap and Perlin meshes
//! - `lod` picks per-patch detail levels for large terrains
//! - `particle` holds firework particles and their ring allocator
//! - `texture` wraps GPU textures, render targets and shadow maps

pub mod instance;
pub mod instanced;
pub mod lod;
pub mod model;
pub mod particle;
pub mod primitives;
pub mod terrain;
pub mod texture;
