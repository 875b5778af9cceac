use std::path::Path;

use anyhow::Context as _;

use crate::data_structures::texture;

/// Diffuse texture and its sampler, bound at [`crate::data_structures::model::MATERIAL_GROUP`].
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

pub async fn load_string(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

pub async fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

pub async fn load_image(path: &Path) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(path).await?;
    image::load_from_memory(&data).with_context(|| format!("decoding {}", path.display()))
}

pub async fn load_texture(
    path: &Path,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let img = load_image(path).await?;
    texture::Texture::from_image(device, queue, &img, Some(&path.to_string_lossy()))
}

/// Like [`load_texture`] but falls back to a single `fallback` pixel.
pub async fn load_texture_or(
    path: &Path,
    fallback: [u8; 4],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> texture::Texture {
    match load_texture(path, device, queue).await {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!("{e:#}; using a flat colour instead");
            texture::Texture::solid_colour(device, queue, fallback, &path.to_string_lossy())
        }
    }
}
