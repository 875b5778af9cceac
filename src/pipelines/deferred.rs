//! Deferred shading: a geometry pass fills the G-buffer, a fullscreen pass
//! lights every covered pixel once.
//!
//! G-buffer layout:
//!
//! | target | format | contents |
//! |--------|--------|----------|
//! | 0 | `Rgba16Float` | world position, `w = 1` where covered |
//! | 1 | `Rgba16Float` | world normal |
//! | 2 | `Rgba8Unorm` | albedo, specular strength in alpha |
//!
//! The frame's depth-stencil buffer doubles as G-buffer depth, so forward
//! geometry drawn after lighting is still occluded correctly.

use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{self, PipelineDesc},
};

pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug)]
pub struct GBuffer {
    pub position: Texture,
    pub normal: Texture,
    pub albedo: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, size: [u32; 2], layout: &wgpu::BindGroupLayout) -> Self {
        let position = Texture::create_render_target(device, size, POSITION_FORMAT, "g_position");
        let normal = Texture::create_render_target(device, size, NORMAL_FORMAT, "g_normal");
        let albedo = Texture::create_render_target(device, size, ALBEDO_FORMAT, "g_albedo");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gbuffer_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&position.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
            ],
        });
        log::debug!("created g-buffer of {}x{}", size[0], size[1]);
        Self {
            position,
            normal,
            albedo,
            bind_group,
        }
    }

    /// Geometry pass writing all three targets and clearing `depth`.
    /// `background` fills the albedo target where nothing is drawn.
    pub fn geometry_pass<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        depth: &'e wgpu::TextureView,
        background: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        let attachment = |view: &'e wgpu::TextureView, clear: wgpu::Color| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })
        };
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("G-Buffer Pass"),
            color_attachments: &[
                attachment(&self.position.view, wgpu::Color::TRANSPARENT),
                attachment(&self.normal.view, wgpu::Color::TRANSPARENT),
                attachment(&self.albedo.view, wgpu::Color { a: 0.0, ..background }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

/// Mirrors `Surface` in `deferred_geometry.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub albedo_specular: [f32; 4],
}

/// Flat material of a deferred draw.
#[derive(Debug)]
pub struct Surface {
    pub uniform: SurfaceUniform,
    pub bind_group: wgpu::BindGroup,
}

impl Surface {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, albedo: [f32; 3], specular: f32) -> Self {
        let uniform = SurfaceUniform {
            albedo_specular: [albedo[0], albedo[1], albedo[2], specular],
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Deferred Surface"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("deferred_surface_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { uniform, bind_group }
    }
}

#[derive(Debug)]
pub struct DeferredPipelines {
    pub geometry: wgpu::RenderPipeline,
    pub lighting: wgpu::RenderPipeline,
    pub surface_layout: wgpu::BindGroupLayout,
    pub gbuffer_layout: wgpu::BindGroupLayout,
}

impl DeferredPipelines {
    pub fn new(init: &InitContext) -> Self {
        let device = &init.device;
        let surface_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("deferred_surface_layout"),
            entries: &[basic::uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gbuffer_layout"),
            entries: &[gbuffer_entry(0), gbuffer_entry(1), gbuffer_entry(2)],
        });

        let geometry_shader = basic::shader_module(
            device,
            "Deferred Geometry Shader",
            include_str!("deferred_geometry.wgsl"),
        );
        let geometry_layout = basic::mk_layout(
            device,
            "Deferred Geometry Layout",
            &[&init.camera_layout, &surface_layout],
        );
        let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
        let geometry = PipelineDesc::new("Deferred Geometry Pipeline", &geometry_layout, &geometry_shader)
            .vertex_layouts(&vertex_layouts)
            .target(POSITION_FORMAT, None)
            .target(NORMAL_FORMAT, None)
            .target(ALBEDO_FORMAT, None)
            .depth(basic::depth_state(wgpu::CompareFunction::Less, true))
            .build(device);

        let lighting_shader = basic::shader_module(
            device,
            "Deferred Lighting Shader",
            include_str!("deferred_lighting.wgsl"),
        );
        let lighting_layout = basic::mk_layout(
            device,
            "Deferred Lighting Layout",
            &[&init.camera_layout, &init.lights_layout, &gbuffer_layout],
        );
        let lighting = PipelineDesc::new("Deferred Lighting Pipeline", &lighting_layout, &lighting_shader)
            .target(init.surface_format, Some(wgpu::BlendState::REPLACE))
            .depth(basic::depth_state(wgpu::CompareFunction::Always, false))
            .cull(None)
            .build(device);

        Self {
            geometry,
            lighting,
            surface_layout,
            gbuffer_layout,
        }
    }
}

fn gbuffer_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
        },
        count: None,
    }
}
