use crate::data_structures::model::{MeshData, ModelVertex};

/// Converts one `tobj` mesh into vertex and index data. Texture `v` is
/// flipped for wgpu's top-left origin. Meshes exported without normals get
/// smooth normals computed from their faces.
pub fn mesh_data(model: &tobj::Model) -> anyhow::Result<MeshData> {
    let m = &model.mesh;
    if m.positions.is_empty() || m.indices.is_empty() {
        anyhow::bail!("mesh {:?} has no geometry", model.name);
    }
    let vertex_count = m.positions.len() / 3;
    if let Some(bad) = m.indices.iter().find(|&&i| i as usize >= vertex_count) {
        anyhow::bail!(
            "mesh {:?} indexes vertex {} of {}",
            model.name,
            bad,
            vertex_count
        );
    }

    let vertices = (0..vertex_count)
        .map(|i| ModelVertex {
            position: [
                m.positions[i * 3],
                m.positions[i * 3 + 1],
                m.positions[i * 3 + 2],
            ],
            tex_coords: [
                m.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                m.normals.get(i * 3).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 1).map_or(1.0, |f| *f),
                m.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        })
        .collect::<Vec<_>>();

    let mut data = MeshData {
        vertices,
        indices: m.indices.clone(),
    };
    if m.normals.len() < m.positions.len() {
        data.compute_smooth_normals();
    }
    Ok(data)
}
