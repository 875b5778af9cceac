use cgmath::Vector3;
use scene_sandbox::lights::{LightManager, MAX_POINT_LIGHTS, PointLight, SpotLight};

#[test]
fn attenuation_is_one_at_the_light_and_falls_off() {
    let light = PointLight::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(light.attenuation(0.0), 1.0);
    let mut previous = 1.0;
    for d in [10.0, 100.0, 500.0, 3000.0] {
        let a = light.attenuation(d);
        assert!(a < previous);
        assert!(a > 0.0);
        previous = a;
    }
    let expected = 1.0 / (1.0 + 0.0014 * 100.0 + 0.000007 * 100.0 * 100.0);
    assert!((light.attenuation(100.0) - expected).abs() < 1e-6);
}

#[test]
fn default_manager_has_two_point_lights_and_everything_on() {
    let manager = LightManager::default();
    assert_eq!(manager.point_lights.len(), 2);
    assert!(manager.point_lights_on && manager.directional_on && manager.spot_on);
    assert_eq!(manager.point_lights[0].color, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(manager.point_lights[1].color, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn toggles_flip_and_report_the_new_state() {
    let mut manager = LightManager::default();
    assert!(!manager.toggle_point_lights());
    assert!(manager.toggle_point_lights());
    assert!(!manager.toggle_directional());
    assert!(!manager.toggle_spot());
    assert!(manager.toggle_spot());
}

#[test]
fn uniform_counts_scene_lights_after_the_shared_ones() {
    let manager = LightManager::default();
    let extra = [PointLight::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0))];
    let uniform = manager.to_uniform(Vector3::new(0.0, 0.0, 0.0), -Vector3::unit_z(), &extra);
    assert_eq!(uniform.point_count, 3);
    assert_eq!(uniform.points[2].position, [1.0, 2.0, 3.0, 1.0]);
    assert_eq!(uniform.points[2].color, [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn switched_off_groups_upload_nothing() {
    let mut manager = LightManager::default();
    manager.toggle_point_lights();
    manager.toggle_directional();
    manager.toggle_spot();
    let extra = [PointLight::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0))];
    let uniform = manager.to_uniform(Vector3::new(0.0, 0.0, 0.0), -Vector3::unit_z(), &extra);
    assert_eq!(uniform.point_count, 0);
    assert_eq!(uniform.directional_color, [0.0; 4]);
    assert_eq!(uniform.spot_color, [0.0; 4]);
    assert_eq!(manager.active_point_lights(&extra).count(), 0);
}

#[test]
fn spot_light_follows_the_camera() {
    let manager = LightManager::default();
    let uniform = manager.to_uniform(Vector3::new(4.0, 5.0, 6.0), Vector3::unit_x(), &[]);
    assert_eq!(uniform.spot_position, [4.0, 5.0, 6.0, 1.0]);
    assert_eq!(uniform.spot_direction, [1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn point_lights_beyond_the_limit_are_dropped() {
    let manager = LightManager::default();
    let extra: Vec<PointLight> = (0..40)
        .map(|i| PointLight::new(Vector3::new(i as f32, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)))
        .collect();
    let uniform = manager.to_uniform(Vector3::new(0.0, 0.0, 0.0), -Vector3::unit_z(), &extra);
    assert_eq!(uniform.point_count as usize, MAX_POINT_LIGHTS);
}

#[test]
fn spot_intensity_fades_between_the_cones() {
    let spot = SpotLight {
        position: Vector3::new(0.0, 0.0, 0.0),
        direction: Vector3::unit_z(),
        color: Vector3::new(1.0, 1.0, 1.0),
        cut_off: 12.5f32.to_radians().cos(),
        outer_cut_off: 15.0f32.to_radians().cos(),
    };
    assert_eq!(spot.intensity(Vector3::unit_z()), 1.0);
    assert_eq!(spot.intensity(Vector3::unit_x()), 0.0);
    let halfway = 13.75f32.to_radians();
    let i = spot.intensity(Vector3::new(halfway.sin(), 0.0, halfway.cos()));
    assert!(i > 0.0 && i < 1.0);
}
