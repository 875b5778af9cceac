//! Compute-shader fireworks.
//!
//! Space or a left click launches a burst; one more goes off on every tick.
//! Bursts are written round-robin into a single particle buffer, so the
//! oldest sparks make room for new ones.

use cgmath::{Point3, Vector3};
use instant::Duration;
use rand::Rng;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    context::{Context, InitContext},
    data_structures::particle,
    flow::{Out, Scene},
    pipelines::particles::ParticleSystem,
    render::Frame,
    scenes::SceneKind,
};

/// Launch positions are drawn from this box above the origin.
pub const LAUNCH_HALF_WIDTH: f32 = 20.0;
pub const LAUNCH_HEIGHT: std::ops::Range<f32> = 10.0..30.0;

pub struct ParticleScene {
    system: ParticleSystem,
    burst_size: u32,
    queue: wgpu::Queue,
}

impl ParticleScene {
    pub async fn construct(init: InitContext) -> anyhow::Result<Box<dyn Scene>> {
        Ok(Box::new(Self::new(init)))
    }

    pub fn new(init: InitContext) -> Self {
        let system = ParticleSystem::new(&init, init.settings.max_particles);
        let burst_size = init.settings.particles_per_burst.min(system.capacity());
        Self {
            system,
            burst_size,
            queue: init.queue.clone(),
        }
    }

    /// Launches one burst of sparks from `position`.
    pub fn trigger_firework(&mut self, position: Vector3<f32>, color: Vector3<f32>) {
        let sparks = particle::burst(&mut rand::thread_rng(), position, color, self.burst_size);
        self.system.spawn(&self.queue, &sparks);
        log::debug!("firework at {position:?}, {} sparks", sparks.len());
    }

    fn random_firework(&mut self) {
        let mut rng = rand::thread_rng();
        let position = Vector3::new(
            rng.gen_range(-LAUNCH_HALF_WIDTH..LAUNCH_HALF_WIDTH),
            rng.gen_range(LAUNCH_HEIGHT),
            rng.gen_range(-LAUNCH_HALF_WIDTH..LAUNCH_HALF_WIDTH),
        );
        let color = Vector3::new(
            rng.gen_range(0.3..1.0),
            rng.gen_range(0.3..1.0),
            rng.gen_range(0.3..1.0),
        );
        self.trigger_firework(position, color);
    }
}

impl Scene for ParticleScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Particles
    }

    fn on_enter(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color::BLACK;
        let camera = &mut ctx.camera.camera;
        camera.position = Point3::new(0.0, 20.0, 80.0);
        camera.look_at(Point3::new(0.0, 20.0, 0.0));
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out {
        self.system.update(&ctx.queue, dt.as_secs_f32());
        Out::Empty
    }

    fn on_tick(&mut self, _ctx: &Context) -> Out {
        self.random_firework();
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, event: &WindowEvent) -> Out {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed()
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::Space) =>
            {
                self.random_firework()
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.random_firework(),
            _ => (),
        }
        Out::Empty
    }

    fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.system.compute(frame.encoder);
        let mut pass = frame.main_pass("Particle Pass", false);
        self.system.draw(&mut pass, &ctx.camera.bind_group);
        Ok(())
    }
}
