//! Terrain generated from Perlin noise, textured with the noise itself.
//!
//! Construction writes the noise image to `perlin_noise_texture.jpg` and
//! `perlin_noise_heightmap.raw` in the output directory. An animated noise
//! overlay runs in the upper-right corner.

use anyhow::Context as _;
use cgmath::Point3;
use instant::Duration;

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        instanced::InstancedModel,
        model::{Material, Model},
        terrain,
        texture::Texture,
    },
    flow::{Out, Scene},
    noise::NOISE_IMAGE_SIZE,
    pipelines::{
        forward::{self, ForwardPipeline},
        noise_overlay::NoiseOverlay,
    },
    render::Frame,
    scenes::SceneKind,
};

pub const GRID_RESOLUTION: u32 = 128;
pub const GRID_SIZE: f32 = 100.0;
pub const NOISE_TEXTURE_FILE: &str = "perlin_noise_texture.jpg";
pub const NOISE_HEIGHTMAP_FILE: &str = "perlin_noise_heightmap.raw";

pub struct PerlinScene {
    pipeline: ForwardPipeline,
    terrain: InstancedModel,
    overlay: NoiseOverlay,
    time: f32,
}

impl PerlinScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let device = &init.device;
        let settings = &init.settings;
        let noise = settings.noise();
        log::info!("perlin terrain seed {}", noise.seed());

        let image = noise
            .save_noise_image(
                settings.output_dir.join(NOISE_TEXTURE_FILE),
                settings.output_dir.join(NOISE_HEIGHTMAP_FILE),
            )
            .unwrap_or_else(|e| {
                log::warn!("{e:#}; keeping the noise texture in memory only");
                noise.noise_image(NOISE_IMAGE_SIZE, NOISE_IMAGE_SIZE, 1.0)
            });
        let texture = Texture::from_image(
            device,
            &init.queue,
            &image::DynamicImage::ImageRgb8(image),
            Some("perlin noise texture"),
        )
        .context("uploading the perlin noise texture")?;

        let mesh = terrain::perlin_grid(&noise, GRID_RESOLUTION, GRID_SIZE);
        let material = Material::new(device, "perlin terrain", texture, &init.material_layout);
        let model = Model::from_mesh(device, "perlin terrain", &mesh, material);
        let terrain = InstancedModel::new(device, model, vec![Instance::new()]);

        Ok(Self {
            pipeline: ForwardPipeline::new(&init),
            terrain,
            overlay: NoiseOverlay::new(device, init.surface_format),
            time: 0.0,
        })
    }
}

impl Scene for PerlinScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Perlin
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.1,
            g: 0.1,
            b: 0.1,
            a: 1.0,
        };
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 40.0, 80.0);
        camera.look_at(Point3::new(0.0, 0.0, 0.0));
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        self.time += dt.as_secs_f32();
        self.overlay.update(&ctx.queue, self.time);
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let mut pass = frame.main_pass("Perlin Terrain Pass", false);
        pass.set_pipeline(self.pipeline.select(ctx.wireframe));
        forward::bind_frame_groups(&mut pass, ctx);
        self.terrain.draw(&mut pass);
        self.overlay.draw(&mut pass);
        Ok(())
    }
}
