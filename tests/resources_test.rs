use std::path::Path;

use scene_sandbox::{noise::PerlinNoise, resources};

fn triangle(normals: Vec<f32>) -> tobj::Model {
    tobj::Model::new(
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.25],
            normals,
            indices: vec![0, 1, 2],
            ..Default::default()
        },
        "triangle".to_string(),
    )
}

#[test]
fn obj_meshes_flip_texture_v() {
    let data = resources::mesh::mesh_data(&triangle(vec![0.0, 1.0, 0.0].repeat(3))).expect("valid mesh");
    assert_eq!(data.vertices.len(), 3);
    assert_eq!(data.vertices[0].tex_coords, [0.0, 1.0]);
    assert_eq!(data.vertices[2].tex_coords, [0.0, 0.75]);
}

#[test]
fn obj_meshes_without_normals_get_face_normals() {
    let data = resources::mesh::mesh_data(&triangle(Vec::new())).expect("valid mesh");
    for vertex in &data.vertices {
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
    }
}

#[test]
fn broken_obj_meshes_are_rejected() {
    let mut model = triangle(Vec::new());
    model.mesh.indices = vec![0, 1, 7];
    assert!(resources::mesh::mesh_data(&model).is_err());
    model.mesh.positions.clear();
    assert!(resources::mesh::mesh_data(&model).is_err());
}

#[tokio::test]
async fn missing_heightmap_becomes_perlin_terrain() {
    let noise = PerlinNoise::new(21);
    let map = resources::load_heightmap_or_noise(Path::new("does/not/exist.raw"), 32, 16, 10.0, &noise).await;
    assert_eq!((map.width(), map.height()), (32, 16));
    assert_eq!(map.max_height, 10.0);

    let again = resources::load_heightmap_or_noise(Path::new("does/not/exist.raw"), 32, 16, 10.0, &noise).await;
    assert_eq!(map, again);
}

#[tokio::test]
async fn heightmap_files_are_read_as_raw_bytes() {
    let path = std::env::temp_dir().join(format!("scene-sandbox-heightmap-{}.raw", std::process::id()));
    std::fs::write(&path, [0u8, 64, 128, 255]).expect("write heightmap");
    let map = resources::load_heightmap_or_noise(&path, 2, 2, 255.0, &PerlinNoise::new(1)).await;
    assert_eq!(map.bytes(), &[0, 64, 128, 255]);
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn missing_skybox_is_an_error() {
    assert!(resources::load_skybox_faces(Path::new("does/not/exist")).await.is_err());
}

#[test]
fn gradient_sky_has_six_square_faces() {
    let faces = resources::gradient_sky_faces(16);
    for face in &faces {
        assert_eq!(face.dimensions(), (16, 16));
    }
    // top face is the zenith colour, brighter sides fade towards it
    let top = faces[2].get_pixel(0, 0);
    assert_eq!(faces[0].get_pixel(0, 0), top);
    assert_ne!(faces[0].get_pixel(0, 15), top);
}
