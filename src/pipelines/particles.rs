//! GPU particle system: a compute pass integrates every particle in place,
//! then the same buffer is drawn as additive points.

use std::mem::size_of;

use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::{
        model::Vertex,
        particle::{Particle, ParticleRing},
    },
    pipelines::basic::{self, PipelineDesc},
};

pub const WORKGROUP_SIZE: u32 = 256;
pub const GRAVITY: f32 = 9.81;
pub const DRAG: f32 = 0.5;
/// Alpha lost per second.
pub const FADE: f32 = 0.35;

/// Workgroups needed to cover `count` particles.
pub fn workgroup_count(count: u32) -> u32 {
    count.div_ceil(WORKGROUP_SIZE)
}

/// Largest particle buffer `limits` allow: one storage binding, dispatched in
/// a single row of workgroups.
pub fn particle_limit(limits: &wgpu::Limits) -> u32 {
    let by_binding = limits.max_storage_buffer_binding_size as u64 / size_of::<Particle>() as u64;
    let by_dispatch = limits.max_compute_workgroups_per_dimension as u64 * WORKGROUP_SIZE as u64;
    by_binding.min(by_dispatch).min(u32::MAX as u64) as u32
}

/// Mirrors `SimParams` in `particles_compute.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParams {
    pub delta_time: f32,
    pub gravity: f32,
    pub drag: f32,
    pub fade: f32,
    pub count: u32,
    pub _padding: [u32; 3],
}

impl SimParams {
    pub fn new(delta_time: f32, count: u32) -> Self {
        Self {
            delta_time,
            gravity: GRAVITY,
            drag: DRAG,
            fade: FADE,
            count,
            _padding: [0; 3],
        }
    }
}

#[derive(Debug)]
pub struct ParticleSystem {
    particles: wgpu::Buffer,
    params: wgpu::Buffer,
    compute_bind_group: wgpu::BindGroup,
    compute_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    ring: ParticleRing,
}

impl ParticleSystem {
    pub fn new(init: &InitContext, capacity: u32) -> Self {
        let device = &init.device;
        let limit = particle_limit(&device.limits());
        if capacity > limit {
            log::warn!("{capacity} particles exceed the device limit, using {limit}");
        }
        let ring = ParticleRing::new(capacity.min(limit));
        let parked = vec![Particle::PARKED; ring.capacity() as usize];
        let particles = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer"),
            contents: bytemuck::cast_slice(&parked),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Params"),
            contents: bytemuck::cast_slice(&[SimParams::new(0.0, ring.capacity())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particle_compute_layout"),
            entries: &[
                basic::uniform_layout_entry(0, wgpu::ShaderStages::COMPUTE),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_compute_bind_group"),
            layout: &compute_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particles.as_entire_binding(),
                },
            ],
        });
        let compute_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("particles_compute.wgsl").into()),
        });
        let compute_pipeline_layout = basic::mk_layout(device, "Particle Compute Layout", &[&compute_layout]);
        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Compute Pipeline"),
            layout: Some(&compute_pipeline_layout),
            module: &compute_shader,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let render_shader = basic::shader_module(device, "Particle Render Shader", include_str!("particles_render.wgsl"));
        let render_layout = basic::mk_layout(device, "Particle Render Layout", &[&init.camera_layout]);
        let vertex_layouts = [Particle::desc()];
        let render_pipeline = PipelineDesc::new("Particle Render Pipeline", &render_layout, &render_shader)
            .vertex_layouts(&vertex_layouts)
            .target(init.surface_format, Some(basic::ADDITIVE))
            .depth(basic::depth_state(wgpu::CompareFunction::Less, false))
            .topology(wgpu::PrimitiveTopology::PointList)
            .cull(None)
            .build(device);

        log::debug!(
            "particle buffer: {} particles, {} bytes",
            ring.capacity(),
            ring.capacity() as usize * size_of::<Particle>()
        );
        Self {
            particles,
            params,
            compute_bind_group,
            compute_pipeline,
            render_pipeline,
            ring,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.ring.capacity()
    }

    /// Writes `new` into the next ring slots, overwriting the oldest.
    pub fn spawn(&mut self, queue: &wgpu::Queue, new: &[Particle]) {
        let mut written = 0usize;
        for range in self.ring.allocate(new.len() as u32) {
            let len = (range.end - range.start) as usize;
            let offset = range.start as wgpu::BufferAddress * size_of::<Particle>() as wgpu::BufferAddress;
            queue.write_buffer(
                &self.particles,
                offset,
                bytemuck::cast_slice(&new[written..written + len]),
            );
            written += len;
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, delta_time: f32) {
        let params = SimParams::new(delta_time, self.ring.capacity());
        queue.write_buffer(&self.params, 0, bytemuck::cast_slice(&[params]));
    }

    pub fn compute(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Particle Update Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.compute_pipeline);
        pass.set_bind_group(0, &self.compute_bind_group, &[]);
        pass.dispatch_workgroups(workgroup_count(self.ring.capacity()), 1, 1);
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, camera_bind_group: &'a wgpu::BindGroup) {
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.particles.slice(..));
        pass.draw(0..self.ring.capacity(), 0..1);
    }
}
