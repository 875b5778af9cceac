//! Cube-mapped sky drawn behind everything else.

use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{self, PipelineDesc},
};

/// Cube map, its bind group and the pipeline drawing it. The cube itself
/// comes from the vertex index, so no vertex buffer is bound.
#[derive(Debug)]
pub struct Skybox {
    pub texture: Texture,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl Skybox {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        faces: &[image::RgbaImage; 6],
    ) -> anyhow::Result<Self> {
        let texture = Texture::create_cube_map(device, queue, faces, "skybox")?;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::Cube,
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
        });
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = basic::mk_layout(device, "Skybox Pipeline Layout", &[camera_layout, &layout]);
        let shader = basic::shader_module(device, "Skybox Shader", include_str!("skybox.wgsl"));
        // Sky depth is 1.0, so it only survives where nothing else was drawn.
        let pipeline = PipelineDesc::new("Skybox Pipeline", &pipeline_layout, &shader)
            .target(color_format, Some(wgpu::BlendState::REPLACE))
            .depth(basic::depth_state(wgpu::CompareFunction::LessEqual, false))
            .cull(None)
            .build(device);

        Ok(Self {
            texture,
            bind_group,
            pipeline,
        })
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, camera_bind_group: &'a wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..36, 0..1);
    }
}
