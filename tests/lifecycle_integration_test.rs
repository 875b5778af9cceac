#[cfg(feature = "integration-tests")]
#[macro_use]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::State;
#[cfg(feature = "integration-tests")]
use scene_sandbox::{
    context::Context,
    flow::{ImageTestResult, Out, Scene},
    render::Frame,
    scenes::SceneKind,
};

#[cfg(feature = "integration-tests")]
struct LifecycleScene {
    kind: SceneKind,
    state: State,
}

#[cfg(feature = "integration-tests")]
impl Scene for LifecycleScene {
    fn kind(&self) -> SceneKind {
        self.kind
    }

    fn on_init(&mut self, ctx: &mut Context) -> Out {
        assert_eq!(self.state.init_invocations(), 0);
        assert_eq!(self.state.enter_invocations(), 0);
        assert_eq!(self.state.update_invocations(), 0);
        ctx.clear_colour = wgpu::Color::TRANSPARENT;
        self.state.init();
        Out::Configure(Box::new(|ctx: &mut Context| ctx.tick_duration_millis = 10))
    }

    fn on_enter(&mut self, _: &mut Context) {
        assert_eq!(self.state.init_invocations(), 1);
        self.state.enter();
    }

    fn on_update(&mut self, ctx: &Context, _: instant::Duration) -> Out {
        assert_eq!(self.state.frame_counter(), self.state.update_invocations());
        assert_eq!(self.state.init_invocations(), 1);
        assert_eq!(self.state.enter_invocations(), 1);
        assert_eq!(ctx.tick_duration_millis, 10);
        self.state.frame();
        self.state.update();
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context) -> Out {
        self.state.tick();
        Out::Empty
    }

    fn on_render(&self, _: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let _pass = frame.main_pass("Lifecycle Pass", false);
        Ok(())
    }

    fn render_to_texture(
        &mut self,
        _: &Context,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> anyhow::Result<ImageTestResult> {
        if self.state.tick_invocations() > 0 && self.state.frame_counter() > 3 {
            Ok(ImageTestResult::Passed)
        } else {
            Ok(ImageTestResult::Waiting)
        }
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn hooks_run_in_order() {
    golden_image_test!(SceneKind::Stencil, |_| async move {
        anyhow::Ok(LifecycleScene {
            kind: SceneKind::Stencil,
            state: State::new(),
        })
    });
}
