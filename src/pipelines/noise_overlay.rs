//! Animated gradient noise drawn into the upper-right quarter of the
//! screen on top of the scene.

use wgpu::util::DeviceExt;

use crate::pipelines::basic::{self, PipelineDesc};

/// Mirrors `Overlay` in `noise_overlay.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniform {
    pub time: [f32; 4],
}

#[derive(Debug)]
pub struct NoiseOverlay {
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl NoiseOverlay {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Noise Overlay Uniform"),
            contents: bytemuck::cast_slice(&[OverlayUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (layout, bind_group) =
            basic::uniform_bind_group(device, "noise_overlay_bind_group", &buffer, wgpu::ShaderStages::FRAGMENT);
        let pipeline_layout = basic::mk_layout(device, "Noise Overlay Layout", &[&layout]);
        let shader = basic::shader_module(device, "Noise Overlay Shader", include_str!("noise_overlay.wgsl"));
        let pipeline = PipelineDesc::new("Noise Overlay Pipeline", &pipeline_layout, &shader)
            .target(color_format, Some(wgpu::BlendState::REPLACE))
            .depth(basic::depth_state(wgpu::CompareFunction::Always, false))
            .cull(None)
            .build(device);
        Self {
            pipeline,
            buffer,
            bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, seconds: f32) {
        let uniform = OverlayUniform {
            time: [seconds, 0.0, 0.0, 0.0],
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
