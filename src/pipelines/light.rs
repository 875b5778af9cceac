use cgmath::EuclideanSpace;
use wgpu::util::DeviceExt;

use crate::{
    camera::Camera,
    data_structures::{
        model::{Mesh, ModelVertex, Vertex},
        primitives,
    },
    lights::{LightManager, LightsUniform, PointLight},
    pipelines::basic::{self, PipelineDesc},
};

/// The light groups shared by every scene and their uniform buffer.
#[derive(Debug)]
pub struct LightResources {
    pub manager: LightManager,
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

pub fn mk_buffer(device: &wgpu::Device, uniform: &LightsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Lights Buffer"),
        contents: bytemuck::cast_slice(std::slice::from_ref(uniform)),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

impl LightResources {
    pub fn new(device: &wgpu::Device, manager: LightManager) -> Self {
        let camera = Camera::default();
        let uniform = manager.to_uniform(camera.position.to_vec(), camera.front(), &[]);
        let buffer = mk_buffer(device, &uniform);
        let (bind_group_layout, bind_group) = basic::uniform_bind_group(
            device,
            "lights_bind_group",
            &buffer,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        Self {
            manager,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Repacks the lights for this frame. `extra` are scene-owned point
    /// lights appended after the shared ones.
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, extra: &[PointLight]) {
        self.uniform = self
            .manager
            .to_uniform(camera.position.to_vec(), camera.front(), extra);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Per-instance data of a light marker cube.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    /// xyz: centre, w: edge length
    pub position_scale: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex for MarkerInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![5 => Float32x4, 6 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MarkerInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Small unlit cubes drawn in each point light's colour.
#[derive(Debug)]
pub struct LightMarkers {
    pipeline: wgpu::RenderPipeline,
    cube: Mesh,
    instances: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl LightMarkers {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> Self {
        let layout = basic::mk_layout(device, "Light Marker Pipeline Layout", &[camera_layout]);
        let shader = basic::shader_module(device, "Light Shader", include_str!("light.wgsl"));
        let vertex_layouts = [ModelVertex::desc(), MarkerInstance::desc()];
        let pipeline = PipelineDesc::new("Light Marker Pipeline", &layout, &shader)
            .vertex_layouts(&vertex_layouts)
            .target(color_format, Some(wgpu::BlendState::REPLACE))
            .depth(basic::depth_state(wgpu::CompareFunction::Less, true))
            .build(device);

        let cube = Mesh::from_data(device, "light marker", &primitives::cube(1.0), 0);
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Marker Instances"),
            size: (capacity.max(1) * std::mem::size_of::<MarkerInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            pipeline,
            cube,
            instances,
            capacity: capacity.max(1),
            count: 0,
        }
    }

    pub fn update<'a>(
        &mut self,
        queue: &wgpu::Queue,
        lights: impl Iterator<Item = &'a PointLight>,
        size: f32,
    ) {
        let data: Vec<MarkerInstance> = lights
            .take(self.capacity)
            .map(|light| MarkerInstance {
                position_scale: light.position.extend(size).into(),
                color: light.color.extend(1.0).into(),
            })
            .collect();
        self.count = data.len() as u32;
        if !data.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&data));
        }
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, camera_bind_group: &'a wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instances.slice(..));
        pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.cube.num_elements, 0, 0..self.count);
    }
}
