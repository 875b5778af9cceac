//! Particle records shared between the CPU and the update compute shader,
//! and the ring allocator that decides where new bursts land.

use std::ops::Range;

use cgmath::Vector3;
use rand::Rng;

use crate::data_structures::model;

/// Where dead particles wait, below the scene.
pub const PARKING_POSITION: [f32; 4] = [0.0, -10.0, 0.0, 1.0];

/// Mirrors `Particle` in `particles_compute.wgsl`. Alpha is the remaining
/// life; a particle with zero alpha is parked.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: [f32; 4],
    pub velocity: [f32; 4],
    pub color: [f32; 4],
}

impl Particle {
    pub const PARKED: Particle = Particle {
        position: PARKING_POSITION,
        velocity: [0.0; 4],
        color: [1.0, 1.0, 1.0, 0.0],
    };

    pub fn is_alive(&self) -> bool {
        self.color[3] > 0.0
    }
}

impl model::Vertex for Particle {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 2 * std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Particle>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Speeds of freshly launched particles, units per second.
pub const BURST_SPEED: Range<f32> = 5.0..15.0;

/// `count` particles leaving `origin` in uniformly drawn spherical
/// directions (`theta` in `[0, 2pi)`, `phi` in `[0, pi)`).
pub fn burst(rng: &mut impl Rng, origin: Vector3<f32>, color: Vector3<f32>, count: u32) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let theta = rng.gen_range(0.0..std::f32::consts::TAU);
            let phi = rng.gen_range(0.0..std::f32::consts::PI);
            let speed = rng.gen_range(BURST_SPEED);
            let direction = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            Particle {
                position: origin.extend(1.0).into(),
                velocity: (direction * speed).extend(0.0).into(),
                color: color.extend(1.0).into(),
            }
        })
        .collect()
}

/// Hands out slots of a fixed-size particle buffer in order, wrapping at the
/// end so the oldest particles are overwritten first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticleRing {
    capacity: u32,
    cursor: u32,
}

impl ParticleRing {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity: capacity.max(1),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Next slot to be written.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Slot ranges for `count` new particles, at most two when the burst
    /// wraps. Bursts larger than the buffer are clamped to its capacity.
    pub fn allocate(&mut self, count: u32) -> Vec<Range<u32>> {
        let count = count.min(self.capacity);
        if count == 0 {
            return Vec::new();
        }
        let start = self.cursor;
        let end = start + count;
        self.cursor = end % self.capacity;
        if end <= self.capacity {
            vec![start..end]
        } else {
            vec![start..self.capacity, 0..end - self.capacity]
        }
    }
}
