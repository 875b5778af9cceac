use std::sync::Arc;

use anyhow::Context as _;
use winit::{dpi::PhysicalPosition, window::Window};

use crate::{
    camera::{self, CameraResources, Projection},
    config::SandboxConfig,
    data_structures::texture,
    lights::LightManager,
    pipelines::{light::LightResources, skybox::Skybox},
    resources,
};

#[derive(Debug, Default)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    /// Cursor is grabbed and mouse motion turns the camera.
    pub look_enabled: bool,
}

/// GPU handles, camera, lights and per-run settings shared by all scenes.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub lights: LightResources,
    pub skybox: Skybox,
    pub material_layout: wgpu::BindGroupLayout,
    pub settings: SandboxConfig,
    pub clear_colour: wgpu::Color,
    pub tick_duration_millis: u64,
    pub mouse: MouseState,
    pub wireframe: bool,
    /// Seconds since start-up.
    pub elapsed: f32,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: SandboxConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::debug!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        // Wireframe is optional, everything else runs on the defaults.
        let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sandbox device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("requesting the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour and rely on an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = camera::Camera::default();
        let projection =
            camera::Projection::new(config.width, config.height, cgmath::Deg(45.0), 0.1, 5000.0);
        let controller = camera::CameraController::new(25.0, 0.1);
        let camera = CameraResources::new(&device, camera, controller, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let lights = LightResources::new(&device, LightManager::default());
        let material_layout = resources::material_layout(&device);

        let faces = match resources::load_skybox_faces(&settings.asset_path("Skybox")).await {
            Ok(faces) => faces,
            Err(e) => {
                log::warn!("{e:#}; using a gradient sky");
                resources::gradient_sky_faces(64)
            }
        };
        let skybox = Skybox::new(
            &device,
            &queue,
            config.format,
            &camera.bind_group_layout,
            &faces,
        )?;

        let tick_duration_millis = settings.tick_duration_millis;
        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            lights,
            skybox,
            material_layout,
            settings,
            clear_colour: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            tick_duration_millis,
            mouse: MouseState::default(),
            wireframe: false,
            elapsed: 0.0,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }

    pub fn supports_wireframe(&self) -> bool {
        self.device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
    }
}

/// What an async scene constructor gets to build its GPU resources with.
/// Device and queue are reference counted, so cloning is cheap.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub size: [u32; 2],
    pub camera_layout: wgpu::BindGroupLayout,
    pub lights_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
    pub settings: SandboxConfig,
    pub wireframe_supported: bool,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            surface_format: ctx.config.format,
            size: ctx.size(),
            camera_layout: ctx.camera.bind_group_layout.clone(),
            lights_layout: ctx.lights.bind_group_layout.clone(),
            material_layout: ctx.material_layout.clone(),
            settings: ctx.settings.clone(),
            wireframe_supported: ctx.supports_wireframe(),
        }
    }
}
