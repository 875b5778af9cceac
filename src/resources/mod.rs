//! Loading models, textures, heightmaps and skybox faces from disk.
//!
//! Every loader has a fallible form returning `anyhow::Result` and, where a
//! scene can carry on without the file, a `*_or_*` form that logs the problem
//! and substitutes procedural content.

use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{
    data_structures::{
        model::{self, MeshData},
        terrain::Heightmap,
        texture::Texture,
    },
    noise::PerlinNoise,
};

pub mod mesh;
pub mod texture;

pub use texture::{load_binary, load_image, load_string, load_texture, load_texture_or, material_layout};

/// Skybox face files in cube-layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const SKYBOX_FACES: [&str; 6] = [
    "Right.png",
    "Left.png",
    "Top.png",
    "Bottom.png",
    "Back.png",
    "Front.png",
];

/// Loads an OBJ file. All meshes share one material built from
/// `texture_path`, or from the first diffuse texture named in the OBJ's
/// material library, or a flat grey.
pub async fn load_model_obj(
    path: &Path,
    texture_path: Option<&Path>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<model::Model> {
    let obj_text = load_string(path).await?;
    let base = path.parent().unwrap_or(Path::new("."));
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let mtl_path = base.join(p);
            async move {
                match tokio::fs::read_to_string(&mtl_path).await {
                    Ok(text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(text))),
                    Err(_) => Err(tobj::LoadError::OpenFileFailed),
                }
            }
        },
    )
    .await?;

    let mtl_texture = match obj_materials {
        Ok(materials) => materials
            .into_iter()
            .find_map(|m| m.diffuse_texture)
            .map(|t| base.join(t)),
        Err(e) => {
            log::debug!("{}: no material library ({e})", path.display());
            None
        }
    };
    let diffuse_path = texture_path.map(Path::to_path_buf).or(mtl_texture);
    let diffuse = match diffuse_path {
        Some(p) => load_texture_or(&p, [180, 180, 180, 255], device, queue).await,
        None => Texture::solid_colour(device, queue, [180, 180, 180, 255], "default diffuse"),
    };
    let name = path.to_string_lossy();
    let material = model::Material::new(device, &name, diffuse, layout);

    let meshes: Vec<model::Mesh> = models
        .iter()
        .enumerate()
        .filter_map(|(idx, m)| match mesh::mesh_data(m) {
            Ok(data) => Some(model::Mesh::from_data(device, &m.name, &data, 0)),
            Err(e) => {
                log::warn!("mesh {} in {} skipped: {e:#}", idx, path.display());
                None
            }
        })
        .collect();
    if meshes.is_empty() {
        anyhow::bail!("{} contains no usable meshes", path.display());
    }

    Ok(model::Model {
        meshes,
        materials: vec![material],
    })
}

/// [`load_model_obj`], or `fallback` with a flat grey material if loading
/// fails.
pub async fn load_model_or(
    path: &Path,
    texture_path: Option<&Path>,
    fallback: MeshData,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> model::Model {
    match load_model_obj(path, texture_path, device, queue, layout).await {
        Ok(model) => model,
        Err(e) => {
            log::warn!("{e:#}; drawing a placeholder instead");
            primitive_model(device, queue, layout, &path.to_string_lossy(), &fallback, [180, 180, 180, 255])
        }
    }
}

pub fn primitive_model(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    name: &str,
    data: &MeshData,
    colour: [u8; 4],
) -> model::Model {
    let diffuse = Texture::solid_colour(device, queue, colour, name);
    let material = model::Material::new(device, name, diffuse, layout);
    model::Model::from_mesh(device, name, data, material)
}

/// A raw `width x height` heightmap, or Perlin terrain of the same size when
/// the file is missing or too short.
pub async fn load_heightmap_or_noise(
    path: &Path,
    width: u32,
    height: u32,
    max_height: f32,
    noise: &PerlinNoise,
) -> Heightmap {
    let loaded = match load_binary(path).await {
        Ok(bytes) => Heightmap::from_raw(&bytes, width, height, max_height),
        Err(e) => Err(e),
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("{e:#}; generating Perlin terrain (seed {})", noise.seed());
        Heightmap::from_noise(noise, width, height, max_height, 4.0)
    })
}

/// The six faces from `dir`, converted to RGBA.
pub async fn load_skybox_faces(dir: &Path) -> anyhow::Result<[image::RgbaImage; 6]> {
    let mut faces = Vec::with_capacity(6);
    for name in SKYBOX_FACES {
        faces.push(load_image(&dir.join(name)).await?.to_rgba8());
    }
    faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected six skybox faces"))
}

/// Vertical gradient from a pale horizon to a deep zenith, one image per
/// cube face.
pub fn gradient_sky_faces(size: u32) -> [image::RgbaImage; 6] {
    let horizon = [186.0, 206.0, 230.0];
    let zenith = [40.0, 80.0, 150.0];
    let ground = [70.0, 70.0, 80.0];
    let size = size.max(1);
    let side = || {
        image::RgbaImage::from_fn(size, size, |_, y| {
            // y = 0 is the top of a side face
            let t = y as f32 / (size - 1).max(1) as f32;
            let (from, to, k) = if t < 0.5 {
                (zenith, horizon, t * 2.0)
            } else {
                (horizon, ground, (t - 0.5) * 2.0)
            };
            let mix = |i: usize| (from[i] + (to[i] - from[i]) * k) as u8;
            image::Rgba([mix(0), mix(1), mix(2), 255])
        })
    };
    let flat = |c: [f32; 3]| {
        image::RgbaImage::from_pixel(size, size, image::Rgba([c[0] as u8, c[1] as u8, c[2] as u8, 255]))
    };
    [side(), side(), flat(zenith), flat(ground), side(), side()]
}
