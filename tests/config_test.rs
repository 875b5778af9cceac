use std::{collections::HashMap, path::PathBuf};

use scene_sandbox::{
    SandboxConfig, SceneKind,
    data_structures::particle::Particle,
    pipelines::particles::{particle_limit, workgroup_count},
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_match_the_window_and_particle_budget() {
    let config = SandboxConfig::default();
    assert_eq!((config.width, config.height), (800, 600));
    assert_eq!(config.start_scene, SceneKind::Shadow);
    assert_eq!(config.max_particles, 100_000);
    assert_eq!(config.particles_per_burst, 25_000);
    assert_eq!(config.tick_duration_millis, 1500);
    assert_eq!(config.noise_seed, None);
}

#[test]
fn overrides_replace_defaults() {
    let config = SandboxConfig::default().with_overrides(lookup(&[
        ("SANDBOX_SCENE", "particles"),
        ("SANDBOX_SEED", "1234"),
        ("SANDBOX_PARTICLES", "1000"),
        ("SANDBOX_ASSETS", "/tmp/assets"),
    ]));
    assert_eq!(config.start_scene, SceneKind::Particles);
    assert_eq!(config.noise_seed, Some(1234));
    assert_eq!(config.max_particles, 1000);
    assert_eq!(config.particles_per_burst, 1000);
    assert_eq!(config.asset_path("Skybox/top.jpg"), PathBuf::from("/tmp/assets/Skybox/top.jpg"));
}

#[test]
fn invalid_overrides_keep_defaults() {
    let config = SandboxConfig::default().with_overrides(lookup(&[
        ("SANDBOX_SCENE", "teapot"),
        ("SANDBOX_SEED", "-3"),
        ("SANDBOX_PARTICLES", "0"),
    ]));
    assert_eq!(config.start_scene, SceneKind::Shadow);
    assert_eq!(config.noise_seed, None);
    assert_eq!(config.max_particles, 100_000);
}

#[test]
fn oversized_particle_budget_keeps_default() {
    let config = SandboxConfig::default().with_overrides(lookup(&[("SANDBOX_PARTICLES", "20000000")]));
    assert_eq!(config.max_particles, 100_000);
    assert_eq!(config.particles_per_burst, 25_000);
}

#[test]
fn largest_accepted_particle_budget_fits_default_limits() {
    let limits = wgpu::Limits::default();
    let limit = particle_limit(&limits);
    let config = SandboxConfig::default().with_overrides(lookup(&[("SANDBOX_PARTICLES", &limit.to_string())]));
    assert_eq!(config.max_particles, limit);

    let bytes = config.max_particles as u64 * std::mem::size_of::<Particle>() as u64;
    assert!(bytes <= limits.max_storage_buffer_binding_size as u64);
    assert!(workgroup_count(config.max_particles) <= limits.max_compute_workgroups_per_dimension);

    let config = SandboxConfig::default().with_overrides(lookup(&[("SANDBOX_PARTICLES", &(limit + 1).to_string())]));
    assert_eq!(config.max_particles, 100_000);
}

#[test]
fn seeded_noise_is_reproducible() {
    let config = SandboxConfig {
        noise_seed: Some(77),
        ..Default::default()
    };
    assert_eq!(config.noise().seed(), 77);
    assert_eq!(config.noise().noise(0.3, 0.7, 0.1), config.noise().noise(0.3, 0.7, 0.1));
}
