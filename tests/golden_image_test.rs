#[cfg(feature = "integration-tests")]
#[macro_use]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::{TestScene, assert_uniform_colour};
#[cfg(feature = "integration-tests")]
use scene_sandbox::{context::Context, flow::ImageTestResult, scenes::SceneKind};

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    golden_image_test!(SceneKind::Shadow, |_| async move {
        anyhow::Ok(TestScene::new(
            |ctx: &mut Context| {
                ctx.clear_colour = wgpu::Color::WHITE;
                ctx.camera.camera.position = [0.0, 5.0, 2.0].into();
            },
            |_, frames, texture| {
                if frames.frame() > 0 {
                    assert_uniform_colour(texture, wgpu::Color::WHITE);
                    Ok(ImageTestResult::Passed)
                } else {
                    Ok(ImageTestResult::Waiting)
                }
            },
        ))
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn idle_fireworks_render_nothing() {
    use scene_sandbox::{flow::Scene, render::Frame, scenes::particles::ParticleScene};

    // The first burst waits for the tick, so early frames show only the
    // cleared sky.
    struct Idle {
        inner: ParticleScene,
        frames: u32,
    }

    impl Scene for Idle {
        fn kind(&self) -> SceneKind {
            self.inner.kind()
        }

        fn on_enter(&mut self, ctx: &mut Context) {
            self.inner.on_enter(ctx);
        }

        fn on_update(&mut self, ctx: &Context, dt: instant::Duration) -> scene_sandbox::flow::Out {
            self.frames += 1;
            self.inner.on_update(ctx, dt)
        }

        fn on_render(&self, ctx: &Context, frame: &mut Frame<'_>) -> anyhow::Result<()> {
            self.inner.on_render(ctx, frame)
        }

        fn render_to_texture(
            &mut self,
            _: &Context,
            texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
        ) -> anyhow::Result<ImageTestResult> {
            if self.frames > 1 {
                assert_uniform_colour(texture, wgpu::Color::BLACK);
                Ok(ImageTestResult::Passed)
            } else {
                Ok(ImageTestResult::Waiting)
            }
        }
    }

    golden_image_test!(SceneKind::Particles, |init| async move {
        anyhow::Ok(Idle {
            inner: ParticleScene::new(init),
            frames: 0,
        })
    });
}
