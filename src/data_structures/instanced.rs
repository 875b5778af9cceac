//! A model drawn many times from one instance buffer.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    model::{DrawModel, Model},
};

pub const DEFAULT_SPACING: f32 = 300.0;
pub const DEFAULT_SCALE: f32 = 0.3;

/// `count` instances in rows of `floor(sqrt(count))`, starting at the origin
/// and growing along +x then +z.
pub fn grid_layout(count: u32, spacing: f32, scale: f32) -> Vec<Instance> {
    let grid_size = ((count as f64).sqrt() as u32).max(1);
    (0..count)
        .map(|i| {
            let row = i / grid_size;
            let col = i % grid_size;
            Instance::from(cgmath::Vector3::new(
                col as f32 * spacing,
                0.0,
                row as f32 * spacing,
            ))
            .with_uniform_scale(scale)
        })
        .collect()
}

#[derive(Debug)]
pub struct InstancedModel {
    pub model: Model,
    pub instances: Vec<Instance>,
    pub instance_buffer: wgpu::Buffer,
}

impl InstancedModel {
    pub fn new(device: &wgpu::Device, model: Model, instances: Vec<Instance>) -> Self {
        let instance_data = instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            model,
            instances,
            instance_buffer,
        }
    }

    pub fn grid(device: &wgpu::Device, model: Model, count: u32) -> Self {
        Self::new(device, model, grid_layout(count, DEFAULT_SPACING, DEFAULT_SCALE))
    }

    /// Uploads edited instances. The instance count must not grow.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        let instance_data = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let bytes: &[u8] = bytemuck::cast_slice(&instance_data);
        if bytes.len() as u64 > self.instance_buffer.size() {
            log::error!(
                "instance buffer holds {} bytes, {} requested; upload skipped",
                self.instance_buffer.size(),
                bytes.len()
            );
            return;
        }
        queue.write_buffer(&self.instance_buffer, 0, bytes);
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_model_instanced(&self.model, 0..self.instances.len() as u32);
    }

    pub fn draw_geometry<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_model_geometry(&self.model, 0..self.instances.len() as u32);
    }
}
