#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use scene_sandbox::flow::ImageTestResult;
use scene_sandbox::{
    context::Context,
    flow::{Out, Scene},
    render::Frame,
    scenes::SceneKind,
};

/// Counts hook invocations so lifecycle tests can check their order.
pub(crate) struct State {
    frame_counter: u32,
    init_invocations: u32,
    enter_invocations: u32,
    update_invocations: u32,
    tick_invocations: u32,
}

impl State {
    pub fn new() -> Self {
        Self {
            frame_counter: 0,
            init_invocations: 0,
            enter_invocations: 0,
            update_invocations: 0,
            tick_invocations: 0,
        }
    }

    pub fn frame(&mut self) {
        self.frame_counter += 1;
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn enter(&mut self) {
        self.enter_invocations += 1;
    }

    pub fn update(&mut self) {
        self.update_invocations += 1;
    }

    pub fn tick(&mut self) {
        self.tick_invocations += 1;
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn enter_invocations(&self) -> u32 {
        self.enter_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }

    pub fn tick_invocations(&self) -> u32 {
        self.tick_invocations
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validate = Box<
    dyn Fn(
        &Context,
        &FrameCounter,
        &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> anyhow::Result<ImageTestResult>,
>;

/// A scene that only clears the frame, set up and checked by closures.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestScene {
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) validate: Validate,
    pub(crate) frames: FrameCounter,
}

#[cfg(feature = "integration-tests")]
impl TestScene {
    pub(crate) fn new(
        setup: impl Fn(&mut Context) + 'static,
        validate: impl Fn(
            &Context,
            &FrameCounter,
            &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
        ) -> anyhow::Result<ImageTestResult>
        + 'static,
    ) -> Self {
        Self {
            setup: Box::new(setup),
            validate: Box::new(validate),
            frames: FrameCounter::default(),
        }
    }
}

#[cfg(feature = "integration-tests")]
impl Scene for TestScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Shadow
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        (self.setup)(ctx);
    }

    fn on_update(&mut self, _: &Context, _: instant::Duration) -> Out {
        self.frames.progress();
        Out::Empty
    }

    fn on_render(&self, _: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let _pass = frame.main_pass("Test Clear Pass", false);
        Ok(())
    }

    fn render_to_texture(
        &mut self,
        ctx: &Context,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> anyhow::Result<ImageTestResult> {
        (self.validate)(ctx, &self.frames, texture)
    }
}

/// Every pixel of `texture` equals `colour`.
#[cfg(feature = "integration-tests")]
pub(crate) fn assert_uniform_colour(
    texture: &image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    colour: wgpu::Color,
) {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let desired_pixel = image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ]);
    for pixel in texture.pixels() {
        assert_eq!(*pixel, desired_pixel);
    }
}

/// Runs the given scenes in a small window until one of them reports
/// [`ImageTestResult::Passed`].
#[macro_export]
macro_rules! golden_image_test {
    ($start:expr, $($scene:expr),+ $(,)?) => {{
        use scene_sandbox::{
            SandboxConfig,
            context::InitContext,
            flow::{Scene, SceneConstructor},
        };
        let mut constructors: Vec<SceneConstructor> = Vec::new();
        $(
            let constructor: SceneConstructor = Box::new(|init: InitContext| {
                Box::pin(async move {
                    let scene: Box<dyn Scene> = Box::new(($scene)(init).await?);
                    Ok::<_, anyhow::Error>(scene)
                })
            });
            constructors.push(constructor);
        )+
        let settings = SandboxConfig {
            width: 256,
            height: 256,
            start_scene: $start,
            noise_seed: Some(1),
            ..Default::default()
        };
        scene_sandbox::flow::run(settings, constructors)
            .expect("Failed to run the sandbox for an integration test.");
    }};
}
