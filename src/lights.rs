//! Scene lights and their GPU layout.
//!
//! [`LightManager`] owns the point, directional and spot lights shared by all
//! scenes and packs them into a [`LightsUniform`]. Switched-off groups are
//! packed with zero colour so shaders never branch on them.

use bytemuck::Zeroable;
use cgmath::{InnerSpace, Vector3, Zero};

/// Point lights beyond this are not uploaded.
pub const MAX_POINT_LIGHTS: usize = 16;

pub const DEFAULT_LINEAR: f32 = 0.0014;
pub const DEFAULT_QUADRATIC: f32 = 0.000007;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn new(position: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self {
            position,
            color,
            linear: DEFAULT_LINEAR,
            quadratic: DEFAULT_QUADRATIC,
        }
    }

    /// `1 / (1 + linear d + quadratic d^2)`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (1.0 + self.linear * distance + self.quadratic * distance * distance)
    }

    fn to_raw(&self) -> PointLightRaw {
        PointLightRaw {
            position: self.position.extend(1.0).into(),
            color: self.color.extend(1.0).into(),
            attenuation: [self.linear, self.quadratic, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    /// Cosine of the outer cone angle.
    pub outer_cut_off: f32,
}

impl SpotLight {
    /// Smooth falloff between the inner and outer cone for a fragment in
    /// direction `to_fragment` from the light.
    pub fn intensity(&self, to_fragment: Vector3<f32>) -> f32 {
        if to_fragment.magnitude2() == 0.0 || self.direction.magnitude2() == 0.0 {
            return 0.0;
        }
        let theta = to_fragment.normalize().dot(self.direction.normalize());
        let epsilon = self.cut_off - self.outer_cut_off;
        if epsilon <= 0.0 {
            return if theta >= self.cut_off { 1.0 } else { 0.0 };
        }
        ((theta - self.outer_cut_off) / epsilon).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct LightManager {
    pub point_lights: Vec<PointLight>,
    pub directional: DirectionalLight,
    pub spot: SpotLight,
    pub point_lights_on: bool,
    pub directional_on: bool,
    pub spot_on: bool,
}

impl Default for LightManager {
    fn default() -> Self {
        Self {
            point_lights: vec![
                PointLight::new(Vector3::new(150.0, 50.0, 0.0), Vector3::new(1.0, 0.0, 0.0)),
                PointLight::new(Vector3::new(150.0, 50.0, 150.0), Vector3::new(0.0, 0.0, 1.0)),
            ],
            directional: DirectionalLight {
                direction: Vector3::new(-1.0, -1.0, -1.0),
                color: Vector3::new(1.0, 1.0, 1.0),
            },
            spot: SpotLight {
                position: Vector3::zero(),
                direction: Vector3::zero(),
                color: Vector3::new(1.0, 1.0, 1.0),
                cut_off: 12.5f32.to_radians().cos(),
                outer_cut_off: 15.0f32.to_radians().cos(),
            },
            point_lights_on: true,
            directional_on: true,
            spot_on: true,
        }
    }
}

impl LightManager {
    pub fn toggle_point_lights(&mut self) -> bool {
        self.point_lights_on = !self.point_lights_on;
        log::info!("point lights {}", on_off(self.point_lights_on));
        self.point_lights_on
    }

    pub fn toggle_directional(&mut self) -> bool {
        self.directional_on = !self.directional_on;
        log::info!("directional light {}", on_off(self.directional_on));
        self.directional_on
    }

    pub fn toggle_spot(&mut self) -> bool {
        self.spot_on = !self.spot_on;
        log::info!("spot light {}", on_off(self.spot_on));
        self.spot_on
    }

    /// Point lights that are currently lit, `extra` appended after the
    /// manager's own.
    pub fn active_point_lights<'a>(
        &'a self,
        extra: &'a [PointLight],
    ) -> impl Iterator<Item = &'a PointLight> + 'a {
        let on = self.point_lights_on;
        self.point_lights
            .iter()
            .chain(extra.iter())
            .filter(move |_| on)
    }

    /// Packs all groups. The spot light is attached to the camera.
    pub fn to_uniform(
        &self,
        camera_position: Vector3<f32>,
        camera_front: Vector3<f32>,
        extra: &[PointLight],
    ) -> LightsUniform {
        let mut uniform = LightsUniform::zeroed();

        let lights: Vec<&PointLight> = self.active_point_lights(extra).collect();
        if lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights requested, only the first {} are uploaded",
                lights.len(),
                MAX_POINT_LIGHTS
            );
        }
        for (slot, light) in uniform.points.iter_mut().zip(lights.iter()) {
            *slot = light.to_raw();
        }
        uniform.point_count = lights.len().min(MAX_POINT_LIGHTS) as u32;

        if self.directional_on {
            uniform.directional_direction = self.directional.direction.extend(0.0).into();
            uniform.directional_color = self.directional.color.extend(1.0).into();
        }

        if self.spot_on {
            uniform.spot_position = camera_position.extend(1.0).into();
            uniform.spot_direction = camera_front.extend(0.0).into();
            uniform.spot_color = self.spot.color.extend(1.0).into();
            uniform.spot_cut_off = [self.spot.cut_off, self.spot.outer_cut_off, 0.0, 0.0];
        }
        uniform
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// x: linear, y: quadratic
    pub attenuation: [f32; 4],
}

/// Mirrors `Lights` in the WGSL shaders. Every field is 16-byte aligned.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub points: [PointLightRaw; MAX_POINT_LIGHTS],
    pub directional_direction: [f32; 4],
    pub directional_color: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_color: [f32; 4],
    /// x: inner cosine, y: outer cosine
    pub spot_cut_off: [f32; 4],
    pub point_count: u32,
    pub _padding: [u32; 3],
}
