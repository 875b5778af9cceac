//! Procedural meshes used for light markers, ground planes and as stand-ins
//! when a model file is missing.
//!
//! All triangles are counter-clockwise seen from outside.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::data_structures::model::{MeshData, ModelVertex};

/// Axis aligned cube of edge length `size`, centred on the origin, with
/// per-face normals.
pub fn cube(size: f32) -> MeshData {
    // (normal, u axis, v axis) with u x v == normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let half = size * 0.5;
    let mut data = MeshData::default();
    for (normal, u, v) in faces {
        let n = Vector3::from(normal);
        let u = Vector3::from(u);
        let v = Vector3::from(v);
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + u * su + v * sv) * half;
            data.vertices.push(ModelVertex {
                position: p.into(),
                tex_coords: [(su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5],
                normal,
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// Latitude/longitude sphere. `sectors` and `stacks` are clamped to at
/// least 3 and 2.
pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> MeshData {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut data = MeshData::default();

    for i in 0..=stacks {
        let phi = PI / 2.0 - i as f32 * PI / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..=sectors {
            let theta = j as f32 * 2.0 * PI / sectors as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = [cos_phi * cos_theta, sin_phi, cos_phi * sin_theta];
            data.vertices.push(ModelVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                tex_coords: [j as f32 / sectors as f32, i as f32 / stacks as f32],
                normal,
            });
        }
    }

    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                data.indices.extend_from_slice(&[k1, k1 + 1, k2]);
            }
            if i != stacks - 1 {
                data.indices.extend_from_slice(&[k1 + 1, k2 + 1, k2]);
            }
            k1 += 1;
            k2 += 1;
        }
    }
    data
}

/// Flat square on the XZ plane facing +Y, texture repeated `uv_repeat` times.
pub fn plane(half_size: f32, uv_repeat: f32) -> MeshData {
    let h = half_size;
    let r = uv_repeat;
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        ModelVertex { position: [-h, 0.0, -h], tex_coords: [0.0, 0.0], normal: up },
        ModelVertex { position: [h, 0.0, -h], tex_coords: [r, 0.0], normal: up },
        ModelVertex { position: [h, 0.0, h], tex_coords: [r, r], normal: up },
        ModelVertex { position: [-h, 0.0, h], tex_coords: [0.0, r], normal: up },
    ];
    MeshData {
        vertices,
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}
