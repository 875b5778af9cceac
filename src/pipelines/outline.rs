//! Stencil outlines: objects first mark their pixels with a stencil
//! reference, then a slightly enlarged copy is drawn only where the mark is
//! missing.

use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{
        basic::{self, PipelineDesc},
        forward,
    },
};

pub const STENCIL_REFERENCE: u32 = 1;
pub const OUTLINE_SCALE: f32 = 1.05;

/// Mirrors `Outline` in `outline.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OutlineUniform {
    pub color: [f32; 4],
    pub scale: [f32; 4],
}

/// Stencil test shared by both passes, differing in compare function and
/// whether passing fragments write the reference.
pub fn stencil_state(compare: wgpu::CompareFunction, write: bool) -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: if write {
            wgpu::StencilOperation::Replace
        } else {
            wgpu::StencilOperation::Keep
        },
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xff,
        write_mask: if write { 0xff } else { 0x00 },
    }
}

#[derive(Debug)]
pub struct OutlinePipelines {
    /// Lit forward pipeline that also writes [`STENCIL_REFERENCE`].
    pub marked: wgpu::RenderPipeline,
    /// Flat colour, depth test off, only where the stencil is not set.
    pub outline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
}

impl OutlinePipelines {
    pub fn new(init: &InitContext, color: [f32; 3]) -> Self {
        let device = &init.device;
        let marked = forward::mk_forward_pipeline(
            init,
            "Stencil Marked Pipeline",
            wgpu::DepthStencilState {
                stencil: stencil_state(wgpu::CompareFunction::Always, true),
                ..basic::depth_state(wgpu::CompareFunction::Less, true)
            },
            wgpu::PolygonMode::Fill,
        );

        let uniform = OutlineUniform {
            color: [color[0], color[1], color[2], 1.0],
            scale: [OUTLINE_SCALE, 0.0, 0.0, 0.0],
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Outline Uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let (outline_layout, bind_group) = basic::uniform_bind_group(
            device,
            "outline_bind_group",
            &buffer,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let layout = basic::mk_layout(device, "Outline Layout", &[&init.camera_layout, &outline_layout]);
        let shader = basic::shader_module(device, "Outline Shader", include_str!("outline.wgsl"));
        let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
        let outline = PipelineDesc::new("Outline Pipeline", &layout, &shader)
            .vertex_layouts(&vertex_layouts)
            .target(init.surface_format, Some(wgpu::BlendState::REPLACE))
            .depth(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: stencil_state(wgpu::CompareFunction::NotEqual, false),
                bias: wgpu::DepthBiasState::default(),
            })
            .build(device);

        Self {
            marked,
            outline,
            bind_group,
        }
    }
}
