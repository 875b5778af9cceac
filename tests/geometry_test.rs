use cgmath::{Deg, InnerSpace, Matrix4, Quaternion, Rotation3, SquareMatrix, Vector3};
use scene_sandbox::data_structures::{
    instance::{Instance, InstanceRaw},
    instanced::grid_layout,
    primitives,
};

#[test]
fn grid_layout_fills_rows_of_sqrt_n() {
    let instances = grid_layout(10, 300.0, 0.3);
    assert_eq!(instances.len(), 10);
    // floor(sqrt(10)) = 3 per row
    assert_eq!(instances[2].position, Vector3::new(600.0, 0.0, 0.0));
    assert_eq!(instances[3].position, Vector3::new(0.0, 0.0, 300.0));
    assert_eq!(instances[9].position, Vector3::new(0.0, 0.0, 900.0));
    assert!(instances.iter().all(|i| i.scale == Vector3::new(0.3, 0.3, 0.3)));
}

#[test]
fn grid_layout_of_nothing_is_empty() {
    assert!(grid_layout(0, 10.0, 1.0).is_empty());
    assert_eq!(grid_layout(1, 10.0, 1.0)[0].position, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn instance_matrix_scales_rotates_then_translates() {
    let instance = Instance {
        position: Vector3::new(1.0, 2.0, 3.0),
        rotation: Quaternion::from_angle_y(Deg(90.0)),
        scale: Vector3::new(2.0, 2.0, 2.0),
    };
    let p = instance.to_matrix() * Vector3::unit_x().extend(1.0);
    // x scaled to 2, rotated onto -z, then moved
    assert!((p.truncate() - Vector3::new(1.0, 2.0, 1.0)).magnitude() < 1e-5);
}

#[test]
fn parent_times_child_matches_matrix_product() {
    let parent = Instance {
        position: Vector3::new(5.0, 0.0, 0.0),
        rotation: Quaternion::from_angle_z(Deg(30.0)),
        scale: Vector3::new(2.0, 2.0, 2.0),
    };
    let child = Instance::from(Vector3::new(0.0, 1.0, 0.0)).with_uniform_scale(0.5);
    let combined = (parent * child).to_matrix();
    let expected = parent.to_matrix() * child.to_matrix();
    let combined: [[f32; 4]; 4] = combined.into();
    let expected: [[f32; 4]; 4] = expected.into();
    for (a, b) in combined.iter().flatten().zip(expected.iter().flatten()) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let model = Matrix4::from_nonuniform_scale(4.0, 1.0, 1.0);
    let raw = InstanceRaw::from_matrix(model);
    assert_eq!(raw.model(), model);
    // a 45 degree surface normal tilts towards the squashed axis
    let n = raw.normal() * Vector3::new(1.0, 1.0, 0.0);
    assert!((n.x - 0.25).abs() < 1e-6);
    assert!((n.y - 1.0).abs() < 1e-6);
}

#[test]
fn singular_models_keep_a_usable_normal_matrix() {
    let raw = InstanceRaw::from_matrix(Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0));
    assert!(raw.normal().determinant() == 0.0);
    assert!(raw.model().invert().is_none());
}

#[test]
fn cube_has_four_vertices_per_face() {
    let cube = primitives::cube(2.0);
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.indices.len(), 36);
    for v in &cube.vertices {
        assert!(v.position.iter().all(|c| c.abs() == 1.0));
    }
}

#[test]
fn cube_faces_wind_outwards() {
    let cube = primitives::cube(1.0);
    for tri in cube.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vector3::from(cube.vertices[i as usize].position));
        let face = (b - a).cross(c - a);
        let normal = Vector3::from(cube.vertices[tri[0] as usize].normal);
        assert!(face.dot(normal) > 0.0);
    }
}

#[test]
fn sphere_vertices_sit_on_the_radius() {
    let sphere = primitives::uv_sphere(3.0, 12, 8);
    assert_eq!(sphere.vertices.len(), 13 * 9);
    // the pole rows contribute one triangle per sector instead of two
    assert_eq!(sphere.triangle_count(), 12 * 8 * 2 - 2 * 12);
    for v in &sphere.vertices {
        assert!((Vector3::from(v.position).magnitude() - 3.0).abs() < 1e-4);
    }
}

#[test]
fn degenerate_sphere_parameters_are_clamped() {
    let sphere = primitives::uv_sphere(1.0, 0, 0);
    assert_eq!(sphere.vertices.len(), 4 * 3);
}

#[test]
fn plane_faces_up() {
    let plane = primitives::plane(10.0, 4.0);
    assert_eq!(plane.vertices.len(), 4);
    assert_eq!(plane.indices, vec![0, 2, 1, 0, 3, 2]);
    let [a, b, c] = [0, 2, 1].map(|i| Vector3::from(plane.vertices[i].position));
    assert!((b - a).cross(c - a).y > 0.0);
    assert_eq!(plane.vertices[2].tex_coords, [4.0, 4.0]);
}
