//! Deferred shading of a model grid lit by a ring of coloured point lights
//! circling the origin.

use cgmath::{Point3, Vector3};
use instant::Duration;

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        instanced::{self, InstancedModel},
        primitives,
    },
    flow::{Out, Scene},
    lights::PointLight,
    pipelines::{
        deferred::{DeferredPipelines, GBuffer, Surface},
        light::LightMarkers,
    },
    render::Frame,
    resources,
    scenes::SceneKind,
};

pub const RING_LIGHTS: usize = 8;
pub const RING_RADIUS: f32 = 45.0;
pub const RING_HEIGHT: f32 = 8.0;
/// Radians per second.
pub const RING_SPEED: f32 = 0.5;
const GRID_COUNT: u32 = 9;
const GRID_SPACING: f32 = 30.0;
const MARKER_SIZE: f32 = 1.0;

/// `count` lights evenly spaced on a circle around the y axis, rotated by
/// `angle` radians, cycling through a fixed palette.
pub fn ring_lights(count: usize, radius: f32, height: f32, angle: f32) -> Vec<PointLight> {
    const PALETTE: [[f32; 3]; 6] = [
        [1.0, 0.2, 0.2],
        [0.2, 1.0, 0.2],
        [0.2, 0.4, 1.0],
        [1.0, 1.0, 0.2],
        [1.0, 0.2, 1.0],
        [0.2, 1.0, 1.0],
    ];
    (0..count)
        .map(|i| {
            let theta = angle + i as f32 / count as f32 * std::f32::consts::TAU;
            let mut light = PointLight::new(
                Vector3::new(radius * theta.cos(), height, radius * theta.sin()),
                PALETTE[i % PALETTE.len()].into(),
            );
            light.linear = 0.045;
            light.quadratic = 0.0075;
            light
        })
        .collect()
}

pub struct DeferredScene {
    pipelines: DeferredPipelines,
    gbuffer: GBuffer,
    models: InstancedModel,
    ground: InstancedModel,
    model_surface: Surface,
    ground_surface: Surface,
    markers: LightMarkers,
    ring: Vec<PointLight>,
    angle: f32,
}

impl DeferredScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let device = &init.device;
        let settings = &init.settings;
        let pipelines = DeferredPipelines::new(&init);
        let gbuffer = GBuffer::new(device, init.size, &pipelines.gbuffer_layout);

        let model = resources::load_model_or(
            &settings.asset_path("Models/SciFiWorlds/SM_Env_Artifact_AlienRuin_03.obj"),
            None,
            primitives::cube(20.0),
            device,
            &init.queue,
            &init.material_layout,
        )
        .await;
        let offset = GRID_SPACING * ((GRID_COUNT as f32).sqrt().floor() - 1.0) / 2.0;
        let instances = instanced::grid_layout(GRID_COUNT, GRID_SPACING, 0.3)
            .into_iter()
            .map(|mut instance| {
                instance.position -= Vector3::new(offset, 0.0, offset);
                instance
            })
            .collect();
        let models = InstancedModel::new(device, model, instances);

        let ground_model = resources::primitive_model(
            device,
            &init.queue,
            &init.material_layout,
            "deferred ground",
            &primitives::plane(500.0, 50.0),
            [255, 255, 255, 255],
        );
        let ground = InstancedModel::new(
            device,
            ground_model,
            vec![Instance::from(Vector3::new(0.0, -5.0, 0.0))],
        );

        let model_surface = Surface::new(device, &pipelines.surface_layout, [0.5, 0.0, 0.0], 1.0);
        let ground_surface = Surface::new(device, &pipelines.surface_layout, [0.3, 0.3, 0.3], 0.5);
        let markers = LightMarkers::new(
            device,
            init.surface_format,
            &init.camera_layout,
            crate::lights::MAX_POINT_LIGHTS,
        );

        Ok(Self {
            pipelines,
            gbuffer,
            models,
            ground,
            model_surface,
            ground_surface,
            markers,
            ring: ring_lights(RING_LIGHTS, RING_RADIUS, RING_HEIGHT, 0.0),
            angle: 0.0,
        })
    }
}

impl Scene for DeferredScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Deferred
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.02,
            g: 0.02,
            b: 0.03,
            a: 1.0,
        };
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 60.0, 110.0);
        camera.look_at(Point3::new(0.0, 0.0, 0.0));
    }

    fn on_resize(&mut self, ctx: &Context) {
        self.gbuffer = GBuffer::new(&ctx.device, ctx.size(), &self.pipelines.gbuffer_layout);
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        self.angle = (self.angle + RING_SPEED * dt.as_secs_f32()) % std::f32::consts::TAU;
        self.ring = ring_lights(RING_LIGHTS, RING_RADIUS, RING_HEIGHT, self.angle);
        self.markers.update(
            &ctx.queue,
            ctx.lights.manager.active_point_lights(&self.ring),
            MARKER_SIZE,
        );
        Out::Empty
    }

    fn point_lights(&self) -> &[PointLight] {
        &self.ring
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        {
            let mut pass = self
                .gbuffer
                .geometry_pass(frame.encoder, frame.depth, frame.clear_colour);
            pass.set_pipeline(&self.pipelines.geometry);
            pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
            pass.set_bind_group(1, &self.model_surface.bind_group, &[]);
            self.models.draw_geometry(&mut pass);
            pass.set_bind_group(1, &self.ground_surface.bind_group, &[]);
            self.ground.draw_geometry(&mut pass);
        }

        let mut pass = frame.main_pass("Deferred Lighting Pass", true);
        pass.set_pipeline(&self.pipelines.lighting);
        pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        pass.set_bind_group(1, &ctx.lights.bind_group, &[]);
        pass.set_bind_group(2, &self.gbuffer.bind_group, &[]);
        pass.draw(0..3, 0..1);
        self.markers.draw(&mut pass, &ctx.camera.bind_group);
        Ok(())
    }
}
