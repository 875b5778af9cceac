//! Directional shadow maps and the lit pass that samples them.
//!
//! Each shadow-casting light renders the scene depth-only into its own
//! [`Texture::SHADOW_FORMAT`] map. The lit pass binds all maps at group 3
//! with one comparison sampler and filters them with a 3x3 PCF kernel.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    context::InitContext,
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{self, PipelineDesc},
};

/// Number of shadow-casting lights the lit shader samples.
pub const SHADOW_CASTERS: usize = 2;
/// Half extent of the orthographic light frustum.
pub const SHADOW_EXTENT: f32 = 50.0;
/// Distance of the virtual light position from the origin, in units of
/// the light direction.
pub const SHADOW_DISTANCE: f32 = 50.0;
pub const SHADOW_NEAR: f32 = 1.0;
pub const SHADOW_FAR: f32 = 100.0;

/// `ortho * look_at` for a directional light aimed at the origin.
pub fn light_space_matrix(direction: Vector3<f32>) -> Matrix4<f32> {
    let eye = Point3::from_vec(-direction * SHADOW_DISTANCE);
    let view = Matrix4::look_at_rh(eye, Point3::origin(), Vector3::unit_y());
    let projection = cgmath::ortho(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        SHADOW_NEAR,
        SHADOW_FAR,
    );
    OPENGL_TO_WGPU_MATRIX * projection * view
}

/// Mirrors `Shadows` in `shadow.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub light_space: [[[f32; 4]; 4]; SHADOW_CASTERS],
    /// xyz: direction towards the scene, w unused
    pub light_directions: [[f32; 4]; SHADOW_CASTERS],
    /// x: world height of the terrain base, y: world height range
    pub terrain: [f32; 4],
}

impl ShadowUniform {
    pub fn new(directions: &[Vector3<f32>; SHADOW_CASTERS], terrain_base: f32, terrain_range: f32) -> Self {
        let mut light_space = [[[0.0; 4]; 4]; SHADOW_CASTERS];
        let mut light_directions = [[0.0; 4]; SHADOW_CASTERS];
        for (i, dir) in directions.iter().enumerate() {
            light_space[i] = light_space_matrix(*dir).into();
            light_directions[i] = dir.extend(0.0).into();
        }
        Self {
            light_space,
            light_directions,
            terrain: [terrain_base, terrain_range.max(f32::EPSILON), 0.0, 0.0],
        }
    }
}

#[derive(Debug)]
pub struct ShadowCaster {
    pub map: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Shadow maps, the depth-only pipeline rendering into them and the
/// group-3 bind group the lit pass reads them through.
#[derive(Debug)]
pub struct ShadowResources {
    pub uniform: ShadowUniform,
    pub casters: Vec<ShadowCaster>,
    pub depth_pipeline: wgpu::RenderPipeline,
    pub model_pipeline: wgpu::RenderPipeline,
    pub terrain_pipeline: wgpu::RenderPipeline,
    pub lit_bind_group: wgpu::BindGroup,
}

impl ShadowResources {
    pub fn new(init: &InitContext, uniform: ShadowUniform) -> Self {
        let device = &init.device;
        let size = init.settings.shadow_map_size;

        let light_space_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_light_space_layout"),
            entries: &[basic::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let casters: Vec<ShadowCaster> = uniform
            .light_space
            .iter()
            .enumerate()
            .map(|(i, matrix)| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("shadow light space {i}")),
                    contents: bytemuck::cast_slice(&[*matrix]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("shadow light space {i}")),
                    layout: &light_space_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                ShadowCaster {
                    map: Texture::create_shadow_map(device, size, &format!("shadow map {i}")),
                    bind_group,
                }
            })
            .collect();
        log::debug!("created {} shadow maps of {size}x{size}", casters.len());

        let shader = basic::shader_module(device, "Shadow Shader", include_str!("shadow.wgsl"));
        let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];

        let depth_shader =
            basic::shader_module(device, "Shadow Depth Shader", include_str!("shadow_depth.wgsl"));
        let depth_layout = basic::mk_layout(device, "Shadow Depth Layout", &[&light_space_layout]);
        let depth_pipeline = PipelineDesc::new("Shadow Depth Pipeline", &depth_layout, &depth_shader)
            .entries("vs_depth", None)
            .vertex_layouts(&vertex_layouts)
            .depth(wgpu::DepthStencilState {
                format: Texture::SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            })
            .build(device);

        let sampling_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_sampling_layout"),
            entries: &[
                basic::uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT),
                shadow_map_entry(1),
                shadow_map_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let comparison = casters[0]
            .map
            .sampler
            .clone()
            .unwrap_or_else(|| texture_compare_sampler(device));
        let lit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_sampling_bind_group"),
            layout: &sampling_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&casters[0].map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&casters[1].map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&comparison),
                },
            ],
        });

        let lit_layout = basic::mk_layout(
            device,
            "Shadow Lit Layout",
            &[
                &init.camera_layout,
                &init.lights_layout,
                &init.material_layout,
                &sampling_layout,
            ],
        );
        let lit = |label, fs| {
            PipelineDesc::new(label, &lit_layout, &shader)
                .entries("vs_main", Some(fs))
                .vertex_layouts(&vertex_layouts)
                .target(init.surface_format, Some(wgpu::BlendState::REPLACE))
                .depth(basic::depth_state(wgpu::CompareFunction::Less, true))
                .build(device)
        };
        let model_pipeline = lit("Shadowed Model Pipeline", "fs_model");
        let terrain_pipeline = lit("Shadowed Terrain Pipeline", "fs_terrain");

        Self {
            uniform,
            casters,
            depth_pipeline,
            model_pipeline,
            terrain_pipeline,
            lit_bind_group,
        }
    }
}

fn shadow_map_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Depth,
        },
        count: None,
    }
}

fn texture_compare_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("shadow sampler"),
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    })
}
