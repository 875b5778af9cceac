//! The demo scenes and keyboard scene selection.
//!
//! | key | scene |
//! |-----|-------|
//! | 1 | shadow mapping |
//! | 2 | LOD terrain |
//! | 3 | Perlin terrain |
//! | 4 | post-processing |
//! | 8 | deferred shading |
//! | 9 | particle fireworks |
//! | 0 | stencil outline |
//!
//! `N` and `B` step forward and backward through the loaded scenes.

use std::{fmt, str::FromStr};

use winit::keyboard::KeyCode;

use crate::flow::SceneConstructor;

pub mod deferred;
pub mod lod;
pub mod particles;
pub mod perlin;
pub mod post;
pub mod shadow;
pub mod stencil;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Shadow,
    Lod,
    Perlin,
    PostProcessing,
    Deferred,
    Particles,
    Stencil,
}

impl SceneKind {
    pub const ALL: [SceneKind; 7] = [
        SceneKind::Shadow,
        SceneKind::Lod,
        SceneKind::Perlin,
        SceneKind::PostProcessing,
        SceneKind::Deferred,
        SceneKind::Particles,
        SceneKind::Stencil,
    ];

    pub fn key(&self) -> KeyCode {
        match self {
            SceneKind::Shadow => KeyCode::Digit1,
            SceneKind::Lod => KeyCode::Digit2,
            SceneKind::Perlin => KeyCode::Digit3,
            SceneKind::PostProcessing => KeyCode::Digit4,
            SceneKind::Deferred => KeyCode::Digit8,
            SceneKind::Particles => KeyCode::Digit9,
            SceneKind::Stencil => KeyCode::Digit0,
        }
    }

    pub fn from_key(key: KeyCode) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Shadow => "shadow",
            SceneKind::Lod => "lod",
            SceneKind::Perlin => "perlin",
            SceneKind::PostProcessing => "post",
            SceneKind::Deferred => "deferred",
            SceneKind::Particles => "particles",
            SceneKind::Stencil => "stencil",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownScene(pub String);

impl fmt::Display for UnknownScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = SceneKind::ALL.iter().map(SceneKind::name).collect();
        write!(f, "unknown scene {:?}, expected one of {}", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownScene {}

/// Accepts the scene name in any case or the digit of its key.
impl FromStr for SceneKind {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SceneKind::ALL
            .into_iter()
            .find(|kind| {
                kind.name() == wanted
                    || matches!(kind, SceneKind::PostProcessing if wanted == "postprocessing")
                    || key_digit(kind.key()).is_some_and(|d| d.to_string() == wanted)
            })
            .ok_or_else(|| UnknownScene(s.to_string()))
    }
}

fn key_digit(key: KeyCode) -> Option<u8> {
    Some(match key {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    })
}

/// Which of the loaded scenes is active. Exactly one is, at all times.
#[derive(Clone, Debug)]
pub struct SceneSelector {
    order: Vec<SceneKind>,
    active: usize,
}

impl SceneSelector {
    /// `None` when no scene loaded. A `start` that is not loaded falls back
    /// to the first scene.
    pub fn new(order: Vec<SceneKind>, start: SceneKind) -> Option<Self> {
        if order.is_empty() {
            return None;
        }
        let active = order.iter().position(|k| *k == start).unwrap_or_else(|| {
            log::warn!("start scene {start} is not available, using {}", order[0]);
            0
        });
        Some(Self { order, active })
    }

    pub fn active(&self) -> SceneKind {
        self.order[self.active]
    }

    /// Position of the active scene in load order.
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if the active scene changed.
    pub fn select(&mut self, kind: SceneKind) -> bool {
        match self.order.iter().position(|k| *k == kind) {
            Some(idx) if idx != self.active => {
                self.active = idx;
                true
            }
            Some(_) => false,
            None => {
                log::warn!("scene {kind} is not loaded");
                false
            }
        }
    }

    pub fn next(&mut self) -> SceneKind {
        self.active = (self.active + 1) % self.order.len();
        self.active()
    }

    pub fn prev(&mut self) -> SceneKind {
        self.active = (self.active + self.order.len() - 1) % self.order.len();
        self.active()
    }
}

/// One constructor per scene, in [`SceneKind::ALL`] order.
pub fn all_constructors() -> Vec<SceneConstructor> {
    vec![
        Box::new(|init| Box::pin(shadow::ShadowScene::construct(init))),
        Box::new(|init| Box::pin(lod::LodScene::construct(init))),
        Box::new(|init| Box::pin(perlin::PerlinScene::construct(init))),
        Box::new(|init| Box::pin(post::PostScene::construct(init))),
        Box::new(|init| Box::pin(deferred::DeferredScene::construct(init))),
        Box::new(|init| Box::pin(particles::ParticleScene::construct(init))),
        Box::new(|init| Box::pin(stencil::StencilScene::construct(init))),
    ]
}
