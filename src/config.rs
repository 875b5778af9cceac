//! Start-up configuration.
//!
//! [`SandboxConfig`] carries everything that is fixed for the lifetime of the
//! window. Values can be overridden from the environment with
//! [`SandboxConfig::from_env`]; anything that fails to parse is logged and the
//! default is kept.

use std::{path::PathBuf, str::FromStr};

use crate::{noise::PerlinNoise, pipelines::particles::particle_limit, scenes::SceneKind};

#[derive(Clone, Debug)]
pub struct SandboxConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub start_scene: SceneKind,
    /// Base directory for models, textures, heightmaps and skybox faces.
    pub asset_dir: PathBuf,
    /// Where the Perlin scene writes its JPEG and raw heightmap.
    pub output_dir: PathBuf,
    pub shadow_map_size: u32,
    pub max_particles: u32,
    pub particles_per_burst: u32,
    pub instance_count: u32,
    /// `None` seeds the noise generator from the clock.
    pub noise_seed: Option<u64>,
    pub tick_duration_millis: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            title: "Scene Sandbox".to_string(),
            width: 800,
            height: 600,
            start_scene: SceneKind::Shadow,
            asset_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("."),
            shadow_map_size: 2048,
            max_particles: 100_000,
            particles_per_burst: 25_000,
            instance_count: 10,
            noise_seed: None,
            tick_duration_millis: 1500,
        }
    }
}

impl SandboxConfig {
    /// Defaults overridden by `SANDBOX_SCENE`, `SANDBOX_SEED`,
    /// `SANDBOX_PARTICLES` and `SANDBOX_ASSETS`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(scene) = parse_var(&lookup, "SANDBOX_SCENE") {
            self.start_scene = scene;
        }
        if let Some(seed) = parse_var(&lookup, "SANDBOX_SEED") {
            self.noise_seed = Some(seed);
        }
        if let Some(particles) = parse_var::<u32>(&lookup, "SANDBOX_PARTICLES") {
            let limit = particle_limit(&wgpu::Limits::default());
            if particles == 0 {
                log::warn!("SANDBOX_PARTICLES must be positive, keeping {}", self.max_particles);
            } else if particles > limit {
                log::warn!("SANDBOX_PARTICLES={particles} exceeds {limit}, keeping {}", self.max_particles);
            } else {
                self.max_particles = particles;
                self.particles_per_burst = self.particles_per_burst.min(particles);
            }
        }
        if let Some(dir) = lookup("SANDBOX_ASSETS") {
            self.asset_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn asset_path(&self, file_name: &str) -> PathBuf {
        self.asset_dir.join(file_name)
    }

    /// Noise generator for the configured seed, clock-seeded without one.
    pub fn noise(&self) -> PerlinNoise {
        match self.noise_seed {
            Some(seed) => PerlinNoise::new(seed),
            None => PerlinNoise::from_entropy(),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring {key}={raw:?}: {e}");
            None
        }
    }
}
