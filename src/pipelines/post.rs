//! Full-screen post-processing of an off-screen scene render.

use std::fmt;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{self, Texture},
    pipelines::basic::{self, PipelineDesc},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PostEffect {
    #[default]
    None,
    Inversion,
    Greyscale,
    Rain,
}

impl PostEffect {
    pub const ALL: [PostEffect; 4] = [
        PostEffect::None,
        PostEffect::Inversion,
        PostEffect::Greyscale,
        PostEffect::Rain,
    ];

    /// Index the shader switches on.
    pub fn index(&self) -> u32 {
        match self {
            PostEffect::None => 0,
            PostEffect::Inversion => 1,
            PostEffect::Greyscale => 2,
            PostEffect::Rain => 3,
        }
    }

    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize) % Self::ALL.len()]
    }

    /// `(current + 1) % 4`.
    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl fmt::Display for PostEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostEffect::None => "none",
            PostEffect::Inversion => "inversion",
            PostEffect::Greyscale => "greyscale",
            PostEffect::Rain => "rain",
        };
        f.write_str(name)
    }
}

/// Mirrors `Effect` in `post.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniform {
    pub kind: u32,
    pub time: f32,
    pub _padding: [u32; 2],
}

impl EffectUniform {
    pub fn new(effect: PostEffect, time: f32) -> Self {
        Self {
            kind: effect.index(),
            time,
            _padding: [0; 2],
        }
    }
}

/// The off-screen target the scene renders into and the pass that
/// composites it onto the surface.
#[derive(Debug)]
pub struct PostProcess {
    pub target: Texture,
    format: wgpu::TextureFormat,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
}

impl PostProcess {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: [u32; 2]) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bind_group_layout"),
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
                basic::uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Post Effect Uniform"),
            contents: bytemuck::cast_slice(&[EffectUniform::new(PostEffect::None, 0.0)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let target = Texture::create_render_target(device, size, format, "post target");
        let bind_group = Self::bind_group(device, &layout, &target, &uniform);

        let pipeline_layout = basic::mk_layout(device, "Post Layout", &[&layout]);
        let shader = basic::shader_module(device, "Post Shader", include_str!("post.wgsl"));
        let pipeline = PipelineDesc::new("Post Pipeline", &pipeline_layout, &shader)
            .target(format, Some(wgpu::BlendState::REPLACE))
            .cull(None)
            .build(device);

        Self {
            target,
            format,
            layout,
            bind_group,
            uniform,
            pipeline,
        }
    }

    fn bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        target: &Texture,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let sampler = target
            .sampler
            .clone()
            .unwrap_or_else(|| texture::create_default_sampler(device));
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("post_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&target.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        self.target = Texture::create_render_target(device, size, self.format, "post target");
        self.bind_group = Self::bind_group(device, &self.layout, &self.target, &self.uniform);
    }

    pub fn update(&self, queue: &wgpu::Queue, effect: PostEffect, time: f32) {
        queue.write_buffer(&self.uniform, 0, bytemuck::cast_slice(&[EffectUniform::new(effect, time)]));
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
