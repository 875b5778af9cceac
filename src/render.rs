//! Per-frame render targets handed to scenes.
//!
//! A scene records any number of passes into [`Frame::encoder`]. The final
//! image goes to [`Frame::view`], using [`Frame::depth`] as depth-stencil
//! buffer. The same scene code renders to the window or to an offscreen
//! texture in tests.

pub struct Frame<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub clear_colour: wgpu::Color,
}

impl<'a> Frame<'a> {
    /// Pass onto the frame's colour and depth targets. Clears colour to
    /// the clear colour and depth/stencil to 1.0/0 unless `load` is set.
    pub fn main_pass(&mut self, label: &str, load: bool) -> wgpu::RenderPass<'_> {
        let (colour_load, depth_load, stencil_load) = if load {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        } else {
            (
                wgpu::LoadOp::Clear(self.clear_colour),
                wgpu::LoadOp::Clear(1.0),
                wgpu::LoadOp::Clear(0),
            )
        };
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: colour_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }

    /// Pass onto an arbitrary colour target with the frame's depth buffer,
    /// both cleared. Used to render a scene before post-processing.
    pub fn offscreen_pass<'t>(
        &'t mut self,
        label: &str,
        target: &'t wgpu::TextureView,
    ) -> wgpu::RenderPass<'t> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth,
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

    /// Colour-only pass with no depth attachment, e.g. a fullscreen
    /// composite.
    pub fn colour_pass(&mut self, label: &str, load: bool) -> wgpu::RenderPass<'_> {
        let load = if load {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(self.clear_colour)
        };
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

/// Depth-only pass, e.g. into a shadow map.
pub fn depth_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    depth: &'e wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
