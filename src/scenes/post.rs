//! Skybox and a model grid rendered off-screen, then composited through a
//! selectable full-screen effect. `Tab` cycles the effect.

use cgmath::Point3;
use instant::Duration;
use winit::{
    event::WindowEvent,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    context::{Context, InitContext},
    data_structures::{instanced::InstancedModel, primitives},
    flow::{Out, Scene},
    pipelines::{
        forward::{self, ForwardPipeline},
        post::{PostEffect, PostProcess},
    },
    render::Frame,
    resources,
    scenes::SceneKind,
};

pub struct PostScene {
    pipeline: ForwardPipeline,
    post: PostProcess,
    models: InstancedModel,
    effect: PostEffect,
    time: f32,
}

impl PostScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let settings = &init.settings;
        let texture_path = settings.asset_path("Textures/PolygonSciFiSpace_Texture_01_A.png");
        let model = resources::load_model_or(
            &settings.asset_path("Models/SciFiSpace/SM_Ship_Fighter_02.obj"),
            Some(texture_path.as_path()),
            primitives::cube(60.0),
            &init.device,
            &init.queue,
            &init.material_layout,
        )
        .await;
        Ok(Self {
            pipeline: ForwardPipeline::new(&init),
            post: PostProcess::new(&init.device, init.surface_format, init.size),
            models: InstancedModel::grid(&init.device, model, settings.instance_count),
            effect: PostEffect::None,
            time: 0.0,
        })
    }

    pub fn effect(&self) -> PostEffect {
        self.effect
    }

    pub fn cycle_effect(&mut self) -> PostEffect {
        self.effect = self.effect.next();
        log::info!("post effect: {}", self.effect);
        self.effect
    }
}

impl Scene for PostScene {
    fn kind(&self) -> SceneKind {
        SceneKind::PostProcessing
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.1,
            g: 0.1,
            b: 0.1,
            a: 1.0,
        };
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(-150.0, 150.0, -150.0);
        camera.look_at(Point3::new(300.0, 0.0, 300.0));
    }

    fn on_resize(&mut self, ctx: &Context) {
        self.post.resize(&ctx.device, ctx.size());
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        self.time += dt.as_secs_f32();
        self.post.update(&ctx.queue, self.effect, self.time);
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, event: &WindowEvent) -> Out {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state.is_pressed()
                && !event.repeat
                && event.physical_key == PhysicalKey::Code(KeyCode::Tab)
            {
                self.cycle_effect();
            }
        }
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        {
            let mut pass = frame.offscreen_pass("Post Scene Pass", &self.post.target.view);
            ctx.skybox.draw(&mut pass, &ctx.camera.bind_group);
            pass.set_pipeline(self.pipeline.select(ctx.wireframe));
            forward::bind_frame_groups(&mut pass, ctx);
            self.models.draw(&mut pass);
        }
        let mut pass = frame.colour_pass("Post Effect Pass", false);
        self.post.draw(&mut pass);
        Ok(())
    }
}
