//! Scene lifecycle and the application event loop.
//!
//! A [`Scene`] is one self-contained demo: it owns its GPU resources,
//! reacts to input and records its own passes each frame. All scenes are
//! constructed up front, concurrently, and exactly one is active at a time.
//!
//! # Lifecycle
//!
//! 1. constructors run once in `resumed`, joined with `join_all`
//! 2. `on_init` runs once per scene after construction
//! 3. `on_enter` runs whenever a scene becomes active
//! 4. per frame the active scene gets `on_update` and `on_render`
//! 5. `on_tick` fires every `tick_duration_millis`
//! 6. input reaches the active scene through `on_window_events` and
//!    `on_device_events` after the global bindings had their turn

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use crate::{
    config::SandboxConfig,
    context::{Context, InitContext},
    data_structures::texture::Texture,
    lights::PointLight,
    render::Frame,
    scenes::{SceneKind, SceneSelector},
};

/// Returned by scene hooks. `Configure` gets mutable access to the context,
/// e.g. to change the clear colour or tick rate.
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(feature = "integration-tests")]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

pub trait Scene {
    fn kind(&self) -> SceneKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Out {
        Out::Empty
    }

    /// The scene became active: place the camera, pick a clear colour.
    fn on_enter(&mut self, _ctx: &mut Context) {}

    /// The window and the frame's depth buffer were resized.
    fn on_resize(&mut self, _ctx: &Context) {}

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out;

    fn on_tick(&mut self, _ctx: &Context) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, _event: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_device_events(&mut self, _ctx: &Context, _event: &DeviceEvent) -> Out {
        Out::Empty
    }

    /// Point lights owned by the scene, uploaded after the shared ones.
    fn point_lights(&self) -> &[PointLight] {
        &[]
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()>;

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &mut self,
        _ctx: &Context,
        _texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> anyhow::Result<ImageTestResult> {
        Ok(ImageTestResult::Passed)
    }
}

impl Debug for dyn Scene + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scene({})", self.name())
    }
}

/// Builds a scene from a cheap clone of the GPU handles. A failing
/// constructor is logged and its scene left out.
pub type SceneConstructor =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn Scene>>>>>>;

#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: SandboxConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, settings).await?;
        Ok(Self {
            ctx,
            is_surface_configured: false,
        })
    }

    /// Returns `true` if the surface was reconfigured.
    fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.ctx.config.width = width;
        self.ctx.config.height = height;
        self.is_surface_configured = true;
        self.ctx.projection.resize(width, height);
        self.ctx
            .surface
            .configure(&self.ctx.device, &self.ctx.config);
        self.ctx.depth_texture = Texture::create_depth_texture(
            &self.ctx.device,
            [self.ctx.config.width, self.ctx.config.height],
            "depth_texture",
        );
        log::debug!("surface configured at {width}x{height}");
        true
    }

    #[cfg(feature = "integration-tests")]
    fn get_test_texture(&self, extent3d: wgpu::Extent3d) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: extent3d,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Width of the read-back image in pixels. Rows copied out of a
    /// texture must be 256-byte aligned, so it may exceed the surface.
    #[cfg(feature = "integration-tests")]
    fn get_with_height(&self) -> (u32, u32) {
        let width = self.ctx.config.width.div_ceil(64) * 64;
        let height = self.ctx.config.height;
        (width, height)
    }

    /// Same size as the surface, so scene-owned targets match the depth
    /// buffer.
    #[cfg(feature = "integration-tests")]
    fn get_test_3d_extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.ctx.config.width,
            height: self.ctx.config.height,
            depth_or_array_layers: 1,
        }
    }

    fn render(
        &mut self,
        scene: &mut dyn Scene,
        #[cfg(feature = "integration-tests")] async_runtime: &tokio::runtime::Runtime,
        #[cfg(feature = "integration-tests")] proxy: &winit::event_loop::EventLoopProxy<FlowEvent>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;

        #[cfg(not(feature = "integration-tests"))]
        let (view, depth_view) = (
            output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            self.ctx.depth_texture.view.clone(),
        );

        #[cfg(feature = "integration-tests")]
        let (tex, view, depth_view) = {
            let extent3d = self.get_test_3d_extent();
            let tex = self.get_test_texture(extent3d);
            let depth = Texture::create_depth_texture(
                &self.ctx.device,
                [extent3d.width, extent3d.height],
                "test depth texture",
            );
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            (tex, view, depth.view)
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut frame = Frame {
                encoder: &mut encoder,
                view: &view,
                depth: &depth_view,
                clear_colour: self.ctx.clear_colour,
            };
            if let Err(e) = scene.on_render(&self.ctx, &mut frame) {
                log::error!("scene {} failed to render: {e:#}", scene.name());
            }
        }

        #[cfg(feature = "integration-tests")]
        let output_buffer = {
            let u32_size = std::mem::size_of::<u32>() as u32;
            let (width, height) = self.get_with_height();
            let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                size: (u32_size * width * height) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: Some("Golden Image Read-back"),
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &tex,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(u32_size * width),
                        rows_per_image: Some(height),
                    },
                },
                self.get_test_3d_extent(),
            );
            output_buffer
        };

        self.ctx.queue.submit(iter::once(encoder.finish()));

        #[cfg(feature = "integration-tests")]
        {
            let result = async_runtime
                .block_on(self.read_back(&output_buffer))
                .and_then(|mut img| scene.render_to_texture(&self.ctx, &mut img));
            match result {
                Ok(ImageTestResult::Passed) => {
                    if proxy.send_event(FlowEvent::Exit).is_err() {
                        log::error!("assertions passed but the event loop is gone");
                    }
                }
                Ok(ImageTestResult::Waiting) => (),
                Ok(ImageTestResult::Failed) => panic!("golden image assertion failed"),
                Err(e) => panic!("{e:#}"),
            }
        }

        output.present();
        Ok(())
    }

    #[cfg(feature = "integration-tests")]
    async fn read_back<'b>(
        &self,
        output_buffer: &'b wgpu::Buffer,
    ) -> anyhow::Result<image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>> {
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.ctx.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("read-back channel closed"))??;
        let data = buffer_slice.get_mapped_range();
        let (width, height) = self.get_with_height();
        image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(width, height, data)
            .ok_or_else(|| anyhow::anyhow!("read-back buffer is smaller than {width}x{height}"))
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exit => f.write_str("Exit"),
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    settings: SandboxConfig,
    state: Option<AppState>,
    scenes: Vec<Box<dyn Scene>>,
    selector: Option<SceneSelector>,
    // Taken on the first `resumed`.
    constructors: Option<Vec<SceneConstructor>>,
    last_time: Instant,
    time_since_tick: Duration,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        settings: SandboxConfig,
        constructors: Vec<SceneConstructor>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            proxy,
            settings,
            state: None,
            scenes: Vec::new(),
            selector: None,
            constructors: Some(constructors),
            last_time: Instant::now(),
            time_since_tick: Duration::from_millis(0),
        })
    }

    fn enter_active_scene(&mut self) {
        let Some(idx) = self.selector.as_ref().map(SceneSelector::active_index) else {
            return;
        };
        let (Some(state), Some(scene)) = (self.state.as_mut(), self.scenes.get_mut(idx)) else {
            return;
        };
        log::info!("entering scene {}", scene.name());
        state.ctx.camera.controller.reset();
        scene.on_enter(&mut state.ctx);
        state
            .ctx
            .window
            .set_title(&format!("{} - {}", state.ctx.settings.title, scene.name()));
    }

    /// Keys that work in every scene. Returns `true` if the key was used.
    fn handle_global_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let lights = &mut state.ctx.lights.manager;
        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Digit5 => _ = lights.toggle_point_lights(),
            KeyCode::Digit6 => _ = lights.toggle_directional(),
            KeyCode::Digit7 => _ = lights.toggle_spot(),
            KeyCode::KeyH => {
                if state.ctx.supports_wireframe() {
                    state.ctx.wireframe = !state.ctx.wireframe;
                    log::info!("wireframe {}", if state.ctx.wireframe { "on" } else { "off" });
                } else {
                    log::warn!("this adapter cannot draw wireframes");
                }
            }
            KeyCode::KeyO => {
                let controller = &mut state.ctx.camera.controller;
                controller.auto_rotate = !controller.auto_rotate;
            }
            KeyCode::KeyN | KeyCode::KeyB => {
                let Some(selector) = self.selector.as_mut() else {
                    return false;
                };
                if key == KeyCode::KeyN {
                    selector.next();
                } else {
                    selector.prev();
                }
                self.enter_active_scene();
            }
            other => {
                let Some(kind) = SceneKind::from_key(other) else {
                    return false;
                };
                if self.selector.as_mut().is_some_and(|s| s.select(kind)) {
                    self.enter_active_scene();
                }
            }
        }
        true
    }

    fn toggle_mouse_look(ctx: &mut Context) {
        let look = !ctx.mouse.look_enabled;
        let window = ctx.window();
        if look {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("cursor grab failed: {e}");
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("cursor release failed: {e}");
        }
        window.set_cursor_visible(!look);
        ctx.mouse.look_enabled = look;
    }

    fn redraw(&mut self) {
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();
        self.time_since_tick += dt;

        let Some(idx) = self.selector.as_ref().map(SceneSelector::active_index) else {
            return;
        };
        let (Some(state), Some(scene)) = (self.state.as_mut(), self.scenes.get_mut(idx)) else {
            return;
        };

        state.ctx.elapsed += dt.as_secs_f32();
        state
            .ctx
            .camera
            .update(&state.ctx.queue, &mut state.ctx.projection, dt);
        let events = scene.on_update(&state.ctx, dt);
        handle_scene_output(&mut state.ctx, events);
        state
            .ctx
            .lights
            .update(&state.ctx.queue, &state.ctx.camera.camera, scene.point_lights());

        if self.time_since_tick >= Duration::from_millis(state.ctx.tick_duration_millis) {
            let events = scene.on_tick(&state.ctx);
            handle_scene_output(&mut state.ctx, events);
            self.time_since_tick = Duration::from_millis(0);
        }

        match state.render(
            scene.as_mut(),
            #[cfg(feature = "integration-tests")]
            &self.async_runtime,
            #[cfg(feature = "integration-tests")]
            &self.proxy,
        ) {
            Ok(()) => (),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                if state.resize(size.width, size.height) {
                    self.scenes.iter_mut().for_each(|s| s.on_resize(&state.ctx));
                }
            }
            Err(e) => log::error!("Unable to render {}", e),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.width,
                self.settings.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let settings = self.settings.clone();
        let init_future = async move {
            let app_state = AppState::new(window, settings).await?;
            let scene_futures: Vec<_> = constructors
                .into_iter()
                // Cloning the init context only clones Arcs inside wgpu.
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let scenes = futures::future::join_all(scene_futures).await;
            anyhow::Ok((app_state, scenes))
        };

        let (mut app_state, results) = match self.async_runtime.block_on(init_future) {
            Ok(init) => init,
            Err(e) => {
                log::error!("App initialization failed. Cannot create the main context: {e:#}");
                event_loop.exit();
                return;
            }
        };

        for result in results {
            match result {
                Ok(mut scene) => {
                    let events = scene.on_init(&mut app_state.ctx);
                    handle_scene_output(&mut app_state.ctx, events);
                    self.scenes.push(scene);
                }
                Err(e) => log::error!("scene construction failed: {e:#}"),
            }
        }
        let order = self.scenes.iter().map(|s| s.kind()).collect();
        self.selector = SceneSelector::new(order, self.settings.start_scene);
        if self.selector.is_none() {
            log::error!("no scene could be constructed");
            event_loop.exit();
            return;
        }

        let size = app_state.ctx.window.inner_size();
        if app_state.resize(size.width, size.height) {
            self.scenes.iter_mut().for_each(|s| s.on_resize(&app_state.ctx));
        }
        app_state.ctx.window.request_redraw();
        self.state = Some(app_state);
        self.last_time = Instant::now();
        self.enter_active_scene();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.ctx.mouse.look_enabled {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        let Some(idx) = self.selector.as_ref().map(SceneSelector::active_index) else {
            return;
        };
        if let Some(scene) = self.scenes.get_mut(idx) {
            let events = scene.on_device_events(&state.ctx, &event);
            handle_scene_output(&mut state.ctx, events);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.ctx.camera.controller.handle_window_events(&event);

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if state.resize(size.width, size.height) {
                    self.scenes.iter_mut().for_each(|s| s.on_resize(&state.ctx));
                }
            }
            WindowEvent::Focused(false) => state.ctx.camera.controller.reset(),
            WindowEvent::CursorMoved { position, .. } => state.ctx.mouse.coords = *position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => match button {
                MouseButton::Right => Self::toggle_mouse_look(&mut state.ctx),
                MouseButton::Left => log::debug!(
                    "click at ({:.0}, {:.0})",
                    state.ctx.mouse.coords.x,
                    state.ctx.mouse.coords.y
                ),
                _ => (),
            },
            WindowEvent::KeyboardInput { event: key_event, .. }
                if key_event.state.is_pressed() && !key_event.repeat =>
            {
                if let PhysicalKey::Code(code) = key_event.physical_key {
                    if self.handle_global_key(event_loop, code) {
                        return;
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                return;
            }
            _ => (),
        }

        let Some(idx) = self.selector.as_ref().map(SceneSelector::active_index) else {
            return;
        };
        let (Some(state), Some(scene)) = (self.state.as_mut(), self.scenes.get_mut(idx)) else {
            return;
        };
        let events = scene.on_window_events(&state.ctx, &event);
        handle_scene_output(&mut state.ctx, events);
    }
}

fn handle_scene_output(ctx: &mut Context, out: Out) {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Opens the window and runs `constructors` until the window closes.
pub fn run(settings: SandboxConfig, constructors: Vec<SceneConstructor>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, settings, constructors)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
