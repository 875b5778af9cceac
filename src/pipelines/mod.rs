//! Render and compute pipelines.
//!
//! Every shader is compiled with `common.wgsl` prepended, which declares the
//! camera, light, vertex and instance layouts shared by all of them.

pub mod basic;
pub mod deferred;
pub mod forward;
pub mod light;
pub mod noise_overlay;
pub mod outline;
pub mod particles;
pub mod post;
pub mod shadow;
pub mod skybox;
