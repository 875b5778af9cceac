//! Rotating models outlined through the stencil buffer.

use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};
use instant::Duration;

use crate::{
    context::{Context, InitContext},
    data_structures::{instance::Instance, instanced::InstancedModel, primitives},
    flow::{Out, Scene},
    pipelines::{
        forward,
        outline::{OutlinePipelines, STENCIL_REFERENCE},
    },
    render::Frame,
    resources,
    scenes::SceneKind,
};

/// Degrees per second about +Y.
pub const ROTATION_SPEED: f32 = 20.0;
pub const OUTLINE_COLOUR: [f32; 3] = [1.0, 0.6, 0.05];
const MODEL_SCALE: f32 = 0.05;
const MODEL_SPACING: f32 = 40.0;

pub struct StencilScene {
    pipelines: OutlinePipelines,
    models: InstancedModel,
    angle: Deg<f32>,
}

impl StencilScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let model = resources::load_model_or(
            &init.settings.asset_path("Models/SciFiWorlds/SM_Bld_Planetary_Cannon_01.obj"),
            None,
            primitives::cube(200.0),
            &init.device,
            &init.queue,
            &init.material_layout,
        )
        .await;
        let instances = (-1..=1)
            .map(|i| {
                Instance::from(Vector3::new(i as f32 * MODEL_SPACING, 0.0, 0.0)).with_uniform_scale(MODEL_SCALE)
            })
            .collect();
        Ok(Self {
            pipelines: OutlinePipelines::new(&init, OUTLINE_COLOUR),
            models: InstancedModel::new(&init.device, model, instances),
            angle: Deg(0.0),
        })
    }
}

impl Scene for StencilScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Stencil
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.1,
            g: 0.1,
            b: 0.1,
            a: 1.0,
        };
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 30.0, 90.0);
        camera.look_at(Point3::new(0.0, 0.0, 0.0));
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        self.angle = Deg((self.angle.0 + ROTATION_SPEED * dt.as_secs_f32()) % 360.0);
        let rotation = Quaternion::from_angle_y(self.angle);
        for instance in &mut self.models.instances {
            instance.rotation = rotation;
        }
        self.models.write_to_buffer(&ctx.queue);
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let mut pass = frame.main_pass("Stencil Outline Pass", false);
        ctx.skybox.draw(&mut pass, &ctx.camera.bind_group);

        pass.set_stencil_reference(STENCIL_REFERENCE);
        pass.set_pipeline(&self.pipelines.marked);
        forward::bind_frame_groups(&mut pass, ctx);
        self.models.draw(&mut pass);

        pass.set_pipeline(&self.pipelines.outline);
        pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        pass.set_bind_group(1, &self.pipelines.bind_group, &[]);
        self.models.draw_geometry(&mut pass);
        Ok(())
    }
}
