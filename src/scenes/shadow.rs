//! Heightmap terrain and models lit by two shadow-casting directional
//! lights.
//!
//! Every frame renders one depth pass per light, then the lit pass samples
//! both shadow maps. The arrow keys and PageUp/PageDown move the ship.

use cgmath::{One, Point3, Quaternion, Vector3, Zero};
use instant::Duration;
use winit::{
    event::WindowEvent,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        instanced::InstancedModel,
        model::{Material, Model},
        primitives,
    },
    flow::{Out, Scene},
    pipelines::{
        forward,
        light::LightMarkers,
        shadow::{SHADOW_CASTERS, ShadowResources, ShadowUniform},
    },
    render::{self, Frame},
    resources,
    scenes::SceneKind,
};

pub const SHADOW_LIGHT_DIRECTIONS: [Vector3<f32>; SHADOW_CASTERS] = [
    Vector3::new(-0.5, -1.0, -0.5),
    Vector3::new(0.5, -1.0, 0.5),
];
pub const HEIGHTMAP_SIZE: u32 = 128;
pub const TERRAIN_MAX_HEIGHT: f32 = 20.0;
pub const TERRAIN_OFFSET: Vector3<f32> = Vector3::new(-150.0, -30.0, -50.0);
pub const TERRAIN_SCALE: Vector3<f32> = Vector3::new(20.0, 5.0, 20.0);
/// Units per second the movable model travels while a key is held.
pub const MODEL_SPEED: f32 = 10.0;
const MARKER_SIZE: f32 = 4.0;

/// Unit direction for a held movement key.
pub fn movement_axis(key: KeyCode) -> Option<Vector3<f32>> {
    Some(match key {
        KeyCode::ArrowLeft => -Vector3::unit_x(),
        KeyCode::ArrowRight => Vector3::unit_x(),
        KeyCode::ArrowUp => -Vector3::unit_z(),
        KeyCode::ArrowDown => Vector3::unit_z(),
        KeyCode::PageUp => Vector3::unit_y(),
        KeyCode::PageDown => -Vector3::unit_y(),
        _ => return None,
    })
}

/// Movement keys currently held down, in press order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeldKeys(Vec<KeyCode>);

impl HeldKeys {
    /// Records a press or release. Keys without a movement axis are ignored.
    pub fn handle(&mut self, key: KeyCode, pressed: bool) {
        if movement_axis(key).is_none() {
            return;
        }
        self.0.retain(|k| *k != key);
        if pressed {
            self.0.push(key);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Sum of the axes of every held key.
    pub fn direction(&self) -> Vector3<f32> {
        self.0
            .iter()
            .filter_map(|key| movement_axis(*key))
            .fold(Vector3::zero(), |sum, axis| sum + axis)
    }
}

pub struct ShadowScene {
    shadows: ShadowResources,
    terrain: InstancedModel,
    models: Vec<InstancedModel>,
    movable: usize,
    grid: InstancedModel,
    markers: LightMarkers,
    held: HeldKeys,
    queue: wgpu::Queue,
}

impl ShadowScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init).await?))
    }

    pub async fn new(init: InitContext) -> anyhow::Result<Self> {
        let settings = &init.settings;
        let device = &init.device;
        let queue = &init.queue;
        let layout = &init.material_layout;

        let noise = settings.noise();
        let heightmap = resources::load_heightmap_or_noise(
            &settings.asset_path("Heightmap0.raw"),
            HEIGHTMAP_SIZE,
            HEIGHTMAP_SIZE,
            TERRAIN_MAX_HEIGHT,
            &noise,
        )
        .await;
        let detail = resources::load_texture_or(
            &settings.asset_path("Textures/PolygonScifiWorlds_Texture_01_B.png"),
            [200, 200, 200, 255],
            device,
            queue,
        )
        .await;
        let terrain_model = Model::from_mesh(
            device,
            "shadow terrain",
            &heightmap.to_mesh(),
            Material::new(device, "shadow terrain", detail, layout),
        );
        let terrain = InstancedModel::new(
            device,
            terrain_model,
            vec![Instance {
                position: TERRAIN_OFFSET,
                rotation: Quaternion::one(),
                scale: TERRAIN_SCALE,
            }],
        );

        let axe_path = settings.asset_path("Models/AncientEmpire/SM_Wep_Axe_02.obj");
        let sword_path = settings.asset_path("Models/SciFiWorlds/SM_Wep_Sword_02.obj");
        let ship_path = settings.asset_path("Models/SciFiSpace/SM_Ship_Fighter_02.obj");
        let mine_path = settings.asset_path("Models/SciFiSpace/SM_Prop_Mine_01.obj");
        let space_texture = settings.asset_path("Textures/PolygonSciFiSpace_Texture_01_A.png");
        let (axe, sword, ship, mine) = futures::join!(
            resources::load_model_or(&axe_path, None, primitives::cube(2.0), device, queue, layout),
            resources::load_model_or(
                &sword_path,
                None,
                primitives::uv_sphere(1.5, 24, 16),
                device,
                queue,
                layout,
            ),
            resources::load_model_or(&ship_path, None, primitives::cube(60.0), device, queue, layout),
            resources::load_model_or(
                &mine_path,
                Some(space_texture.as_path()),
                primitives::uv_sphere(20.0, 24, 16),
                device,
                queue,
                layout,
            ),
        );
        let models = vec![
            InstancedModel::new(device, axe, vec![Instance::from(Vector3::new(-10.0, 0.0, 0.0))]),
            InstancedModel::new(device, sword, vec![Instance::from(Vector3::new(10.0, 0.0, 0.0))]),
            InstancedModel::new(
                device,
                ship,
                vec![Instance::from(Vector3::new(0.0, 0.0, 20.0)).with_uniform_scale(0.05)],
            ),
        ];
        let grid = InstancedModel::grid(device, mine, settings.instance_count);

        let uniform = ShadowUniform::new(
            &SHADOW_LIGHT_DIRECTIONS,
            TERRAIN_OFFSET.y,
            TERRAIN_MAX_HEIGHT * TERRAIN_SCALE.y,
        );
        let shadows = ShadowResources::new(&init, uniform);
        let markers = LightMarkers::new(
            device,
            init.surface_format,
            &init.camera_layout,
            crate::lights::MAX_POINT_LIGHTS,
        );

        Ok(Self {
            shadows,
            terrain,
            models,
            movable: 2,
            grid,
            markers,
            held: HeldKeys::default(),
            queue: init.queue.clone(),
        })
    }

    /// Shifts the movable model and uploads its new transform.
    pub fn move_model(&mut self, delta: Vector3<f32>) {
        let Some(model) = self.models.get_mut(self.movable) else {
            return;
        };
        for instance in &mut model.instances {
            instance.position += delta;
        }
        model.write_to_buffer(&self.queue);
    }

    fn draw_geometry<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        self.terrain.draw_geometry(pass);
        for model in &self.models {
            model.draw_geometry(pass);
        }
        self.grid.draw_geometry(pass);
    }
}

impl Scene for ShadowScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Shadow
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.1,
            g: 0.1,
            b: 0.1,
            a: 1.0,
        };
        // Releases that happened while another scene was active never arrived.
        self.held.clear();
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 25.0, 60.0);
        camera.look_at(Point3::new(0.0, 0.0, 0.0));
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        let direction = self.held.direction();
        if direction != Vector3::zero() {
            self.move_model(direction * MODEL_SPEED * dt.as_secs_f32());
        }
        self.markers.update(
            &ctx.queue,
            ctx.lights.manager.active_point_lights(&[]),
            MARKER_SIZE,
        );
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, event: &WindowEvent) -> Out {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.held.handle(code, event.state.is_pressed());
                }
            }
            WindowEvent::Focused(false) => self.held.clear(),
            _ => (),
        }
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        for caster in &self.shadows.casters {
            let mut pass = render::depth_pass(frame.encoder, "Shadow Depth Pass", &caster.map.view);
            pass.set_pipeline(&self.shadows.depth_pipeline);
            pass.set_bind_group(0, &caster.bind_group, &[]);
            self.draw_geometry(&mut pass);
        }

        let mut pass = frame.main_pass("Shadow Lit Pass", false);
        forward::bind_frame_groups(&mut pass, ctx);
        pass.set_bind_group(3, &self.shadows.lit_bind_group, &[]);
        pass.set_pipeline(&self.shadows.terrain_pipeline);
        self.terrain.draw(&mut pass);
        pass.set_pipeline(&self.shadows.model_pipeline);
        for model in &self.models {
            model.draw(&mut pass);
        }
        self.grid.draw(&mut pass);
        self.markers.draw(&mut pass, &ctx.camera.bind_group);
        Ok(())
    }
}
