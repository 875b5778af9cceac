//! Heightmap terrain with a detail level chosen per patch each frame.
//!
//! All patches share one vertex grid; only the drawn index ranges change
//! as the camera moves. `H` shows the result in wireframe.

use cgmath::{Point3, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::InstanceRaw,
        lod::{LodGrid, LodRange},
        model::{Material, MATERIAL_GROUP, Mesh},
        terrain::Transform,
    },
    flow::{Out, Scene},
    pipelines::forward::{self, ForwardPipeline},
    render::Frame,
    resources,
    scenes::SceneKind,
};

pub const HEIGHTMAP_SIZE: u32 = 128;
pub const MAX_HEIGHT: f32 = 20.0;
pub const PATCHES_PER_SIDE: u32 = 8;
pub const PATCH_RES: u32 = 16;
pub const LOD_RANGE: LodRange = LodRange {
    near: 300.0,
    far: 2500.0,
};

/// World placement of the grid: `T(0, -50, 0) * S(50, 1, 50)`.
pub fn terrain_transform() -> Transform {
    let mut transform = Transform::new();
    transform
        .translate(Vector3::new(0.0, -50.0, 0.0))
        .scale(Vector3::new(50.0, 1.0, 50.0));
    transform
}

pub struct LodScene {
    pipeline: ForwardPipeline,
    grid: LodGrid,
    mesh: Mesh,
    material: Material,
    instance_buffer: wgpu::Buffer,
    transform: Transform,
    levels: Vec<u32>,
}

impl LodScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let device = &init.device;
        let settings = &init.settings;
        let heightmap = resources::load_heightmap_or_noise(
            &settings.asset_path("Heightmap0.raw"),
            HEIGHTMAP_SIZE,
            HEIGHTMAP_SIZE,
            MAX_HEIGHT,
            &settings.noise(),
        )
        .await;
        let grid = LodGrid::from_heightmap(&heightmap, PATCHES_PER_SIDE, PATCH_RES);
        log::debug!(
            "lod terrain: {} patches, {} levels, {} indices",
            grid.patch_count(),
            grid.max_level() + 1,
            grid.mesh.indices.len()
        );
        let mesh = Mesh::from_data(device, "lod terrain", &grid.mesh, 0);

        let texture = resources::load_texture_or(
            &settings.asset_path("Textures/PolygonScifiWorlds_Texture_01_B.png"),
            [110, 140, 90, 255],
            device,
            &init.queue,
        )
        .await;
        let material = Material::new(device, "lod terrain", texture, &init.material_layout);

        let transform = terrain_transform();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("LOD Terrain Instance"),
            contents: bytemuck::cast_slice(&[InstanceRaw::from_matrix(transform.matrix())]),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let levels = vec![grid.max_level(); grid.patch_count()];

        Ok(Self {
            pipeline: ForwardPipeline::new(&init),
            grid,
            mesh,
            material,
            instance_buffer,
            transform,
            levels,
        })
    }

    /// Current level of every patch, finest first.
    pub fn levels(&self) -> &[u32] {
        &self.levels
    }
}

impl Scene for LodScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Lod
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.55,
            g: 0.7,
            b: 0.85,
            a: 1.0,
        };
        let centre = self.transform.apply(Point3::new(
            (HEIGHTMAP_SIZE / 2) as f32,
            0.0,
            (HEIGHTMAP_SIZE / 2) as f32,
        ));
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 400.0, 0.0);
        camera.look_at(centre);
    }

    fn on_update(&mut self, ctx: &Context, _dt: Duration) -> Out {
        let levels = self
            .grid
            .select_levels(ctx.camera.camera.position, &self.transform, &LOD_RANGE);
        if levels != self.levels {
            log::trace!("lod levels changed: {levels:?}");
            self.levels = levels;
        }
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let mut pass = frame.main_pass("LOD Terrain Pass", false);
        ctx.skybox.draw(&mut pass, &ctx.camera.bind_group);

        pass.set_pipeline(self.pipeline.select(ctx.wireframe));
        forward::bind_frame_groups(&mut pass, ctx);
        pass.set_bind_group(MATERIAL_GROUP, &self.material.bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for range in self.grid.draw_ranges(&self.levels) {
            pass.draw_indexed(range, 0, 0..1);
        }
        Ok(())
    }
}
