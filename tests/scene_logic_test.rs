use cgmath::{InnerSpace, Matrix4, Point3, Vector3, Vector4};
use scene_sandbox::{
    data_structures::lod::LodRange,
    pipelines::{
        post::{EffectUniform, PostEffect},
        shadow::{SHADOW_CASTERS, ShadowUniform, light_space_matrix},
    },
    scenes::{
        deferred::{RING_HEIGHT, RING_LIGHTS, RING_RADIUS, ring_lights},
        lod::{LOD_RANGE, terrain_transform},
        shadow::{HeldKeys, SHADOW_LIGHT_DIRECTIONS, movement_axis},
    },
};
use winit::keyboard::KeyCode;

fn to_ndc(matrix: Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    let clip: Vector4<f32> = matrix * p.extend(1.0);
    clip.truncate() / clip.w
}

#[test]
fn light_space_keeps_the_origin_inside_the_shadow_map() {
    for direction in SHADOW_LIGHT_DIRECTIONS {
        let ndc = to_ndc(light_space_matrix(direction), Vector3::new(0.0, 0.0, 0.0));
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}

#[test]
fn light_space_depth_grows_along_the_light() {
    let direction = Vector3::new(-0.5, -1.0, -0.5);
    let matrix = light_space_matrix(direction);
    let near = to_ndc(matrix, -direction.normalize() * 10.0);
    let far = to_ndc(matrix, direction.normalize() * 10.0);
    assert!(near.z < far.z);
}

#[test]
fn shadow_uniform_packs_every_caster() {
    let uniform = ShadowUniform::new(&SHADOW_LIGHT_DIRECTIONS, -30.0, 100.0);
    assert_eq!(uniform.light_space.len(), SHADOW_CASTERS);
    assert_eq!(uniform.light_directions[1], [0.5, -1.0, 0.5, 0.0]);
    assert_eq!(uniform.terrain[..2], [-30.0, 100.0]);
    assert!(ShadowUniform::new(&SHADOW_LIGHT_DIRECTIONS, 0.0, 0.0).terrain[1] > 0.0);
}

#[test]
fn arrow_and_page_keys_move_the_model() {
    assert_eq!(movement_axis(KeyCode::ArrowLeft), Some(-Vector3::unit_x()));
    assert_eq!(movement_axis(KeyCode::ArrowRight), Some(Vector3::unit_x()));
    assert_eq!(movement_axis(KeyCode::ArrowUp), Some(-Vector3::unit_z()));
    assert_eq!(movement_axis(KeyCode::ArrowDown), Some(Vector3::unit_z()));
    assert_eq!(movement_axis(KeyCode::PageUp), Some(Vector3::unit_y()));
    assert_eq!(movement_axis(KeyCode::PageDown), Some(-Vector3::unit_y()));
    assert_eq!(movement_axis(KeyCode::KeyW), None);
}

#[test]
fn held_keys_sum_and_release() {
    let mut held = HeldKeys::default();
    held.handle(KeyCode::ArrowLeft, true);
    held.handle(KeyCode::PageUp, true);
    held.handle(KeyCode::KeyW, true);
    assert_eq!(held.direction(), Vector3::new(-1.0, 1.0, 0.0));

    held.handle(KeyCode::ArrowLeft, true);
    held.handle(KeyCode::ArrowLeft, false);
    assert_eq!(held.direction(), Vector3::unit_y());
}

#[test]
fn cleared_keys_stop_the_model() {
    let mut held = HeldKeys::default();
    held.handle(KeyCode::ArrowDown, true);
    held.clear();
    assert_eq!(held.direction(), Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(held, HeldKeys::default());
}

#[test]
fn post_effects_cycle_through_all_four() {
    let mut effect = PostEffect::default();
    assert_eq!(effect, PostEffect::None);
    let mut seen = Vec::new();
    for _ in 0..4 {
        effect = effect.next();
        seen.push(effect);
    }
    assert_eq!(
        seen,
        vec![PostEffect::Inversion, PostEffect::Greyscale, PostEffect::Rain, PostEffect::None]
    );
    assert_eq!(PostEffect::from_index(7), PostEffect::Rain);
    assert_eq!(PostEffect::Greyscale.to_string(), "greyscale");
}

#[test]
fn effect_uniform_is_sixteen_bytes() {
    assert_eq!(std::mem::size_of::<EffectUniform>(), 16);
    let uniform = EffectUniform::new(PostEffect::Rain, 2.5);
    assert_eq!((uniform.kind, uniform.time), (3, 2.5));
}

#[test]
fn ring_lights_sit_evenly_on_the_circle() {
    let lights = ring_lights(RING_LIGHTS, RING_RADIUS, RING_HEIGHT, 0.3);
    assert_eq!(lights.len(), RING_LIGHTS);
    for light in &lights {
        assert!((light.position.y - RING_HEIGHT).abs() < 1e-5);
        let flat = Vector3::new(light.position.x, 0.0, light.position.z);
        assert!((flat.magnitude() - RING_RADIUS).abs() < 1e-3);
    }
    let gap = (lights[1].position - lights[0].position).magnitude();
    let expected = 2.0 * RING_RADIUS * (std::f32::consts::PI / RING_LIGHTS as f32).sin();
    assert!((gap - expected).abs() < 1e-3);
    assert_ne!(lights[0].color, lights[1].color);
}

#[test]
fn lod_terrain_is_stretched_and_lowered() {
    let transform = terrain_transform();
    let p = transform.apply(Point3::new(2.0, 10.0, 3.0));
    assert_eq!(p, Point3::new(100.0, -40.0, 150.0));
    let LodRange { near, far } = LOD_RANGE;
    assert!(near < far);
}
