use cgmath::{Point3, Vector3};
use scene_sandbox::{
    data_structures::terrain::{Heightmap, Transform, grid_indices, perlin_grid},
    noise::PerlinNoise,
};

#[test]
fn heightmap_scales_bytes_to_max_height() {
    let bytes = [0u8, 255, 51, 102];
    let map = Heightmap::from_raw(&bytes, 2, 2, 20.0).expect("valid heightmap");
    assert_eq!(map.sample(0, 0), 0.0);
    assert_eq!(map.sample(1, 0), 20.0);
    assert!((map.sample(0, 1) - 4.0).abs() < 1e-5);
    // clamped to the grid
    assert_eq!(map.sample(5, 5), map.sample(1, 1));
}

#[test]
fn short_heightmaps_are_rejected() {
    assert!(Heightmap::from_raw(&[0u8; 3], 2, 2, 1.0).is_err());
    assert!(Heightmap::from_raw(&[0u8; 10], 1, 10, 1.0).is_err());
}

#[test]
fn rgb_heightmaps_use_the_red_channel() {
    let bytes = [10u8, 0, 0, 20, 0, 0, 30, 0, 0, 40, 0, 0];
    let map = Heightmap::from_raw(&bytes, 2, 2, 255.0).expect("rgb heightmap");
    assert_eq!(map.bytes(), &[10, 20, 30, 40]);
}

#[test]
fn grid_indices_cover_every_cell_twice() {
    let indices = grid_indices(4, 3);
    assert_eq!(indices.len(), 3 * 2 * 6);
    assert!(indices.iter().all(|&i| i < 12));
}

#[test]
fn heightmap_mesh_has_one_vertex_per_sample() {
    let noise = PerlinNoise::new(1);
    let map = Heightmap::from_noise(&noise, 16, 8, 20.0, 4.0);
    let mesh = map.to_mesh();
    assert_eq!(mesh.vertices.len(), 16 * 8);
    assert_eq!(mesh.triangle_count(), 15 * 7 * 2);
    for vertex in &mesh.vertices {
        assert!((0.0..=20.0).contains(&vertex.position[1]));
        // smooth normals of a heightfield always point up-ish
        assert!(vertex.normal[1] > 0.0);
    }
}

#[test]
fn perlin_grid_is_centred_and_bounded() {
    let noise = PerlinNoise::new(8);
    let mesh = perlin_grid(&noise, 128, 100.0);
    assert_eq!(mesh.vertices.len(), 128 * 128);
    let first = mesh.vertices[0].position;
    let last = mesh.vertices[mesh.vertices.len() - 1].position;
    assert_eq!([first[0], first[2]], [-50.0, -50.0]);
    assert_eq!([last[0], last[2]], [50.0, 50.0]);
    assert!(mesh.vertices.iter().all(|v| (0.0..=10.0).contains(&v.position[1])));
}

#[test]
fn transform_applies_translate_then_scale() {
    let mut transform = Transform::new();
    transform
        .translate(Vector3::new(0.0, -50.0, 0.0))
        .scale(Vector3::new(50.0, 1.0, 50.0));
    let p = transform.apply(Point3::new(2.0, 3.0, 4.0));
    assert_eq!(p, Point3::new(100.0, -47.0, 200.0));

    transform.reset();
    assert_eq!(transform.apply(Point3::new(2.0, 3.0, 4.0)), Point3::new(2.0, 3.0, 4.0));
}
