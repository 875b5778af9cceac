//! Lit, textured forward rendering of instanced models.
//!
//! Bind groups: camera at 0, lights at 1, material at
//! [`MATERIAL_GROUP`](crate::data_structures::model::MATERIAL_GROUP).
//! Vertex slot 0 holds [`ModelVertex`], slot 1 the [`InstanceRaw`] buffer.

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
    },
    pipelines::basic::{self, PipelineDesc},
};

pub const FORWARD_WGSL: &str = include_str!("forward.wgsl");

#[derive(Debug)]
pub struct ForwardPipeline {
    pub fill: wgpu::RenderPipeline,
    /// Only present when the adapter supports line polygons.
    pub wireframe: Option<wgpu::RenderPipeline>,
}

pub fn mk_forward_pipeline(
    init: &InitContext,
    label: &str,
    depth_stencil: wgpu::DepthStencilState,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    let layout = basic::mk_layout(
        &init.device,
        label,
        &[&init.camera_layout, &init.lights_layout, &init.material_layout],
    );
    let shader = basic::shader_module(&init.device, "Forward Shader", FORWARD_WGSL);
    let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
    PipelineDesc::new(label, &layout, &shader)
        .vertex_layouts(&vertex_layouts)
        .target(init.surface_format, Some(wgpu::BlendState::REPLACE))
        .depth(depth_stencil)
        .polygon_mode(polygon_mode)
        .build(&init.device)
}

impl ForwardPipeline {
    pub fn new(init: &InitContext) -> Self {
        let depth = basic::depth_state(wgpu::CompareFunction::Less, true);
        let fill = mk_forward_pipeline(init, "Forward Pipeline", depth.clone(), wgpu::PolygonMode::Fill);
        let wireframe = init.wireframe_supported.then(|| {
            mk_forward_pipeline(init, "Forward Wireframe Pipeline", depth, wgpu::PolygonMode::Line)
        });
        Self { fill, wireframe }
    }

    /// The wireframe variant when requested and available.
    pub fn select(&self, wireframe: bool) -> &wgpu::RenderPipeline {
        match (&self.wireframe, wireframe) {
            (Some(line), true) => line,
            _ => &self.fill,
        }
    }
}

/// Binds the camera and light groups every forward shader expects.
pub fn bind_frame_groups<'a>(pass: &mut wgpu::RenderPass<'a>, ctx: &'a Context) {
    pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
    pass.set_bind_group(1, &ctx.lights.bind_group, &[]);
}
