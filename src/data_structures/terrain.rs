//! Heightmaps and the terrain meshes built from them.
//!
//! A heightmap is a grid of bytes; a byte `h` becomes the height
//! `h / 255 * max_height`. Grid vertices sit on integer `x`/`z` coordinates
//! and are placed in the world through a [`Transform`].

use anyhow::bail;
use cgmath::{Matrix4, Point3, SquareMatrix, Transform as _, Vector3};

use crate::{
    data_structures::model::{MeshData, ModelVertex},
    noise::PerlinNoise,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
    pub max_height: f32,
}

impl Heightmap {
    /// Raw greyscale bytes, one per sample. Three bytes per sample (RGB, as
    /// written by [`PerlinNoise::save_noise_image`]) are accepted too; the red
    /// channel is used.
    pub fn from_raw(bytes: &[u8], width: u32, height: u32, max_height: f32) -> anyhow::Result<Self> {
        if width < 2 || height < 2 {
            bail!("heightmap must be at least 2x2, got {width}x{height}");
        }
        let samples = width as usize * height as usize;
        let data = if bytes.len() == samples * 3 {
            bytes.iter().step_by(3).copied().collect()
        } else if bytes.len() >= samples {
            bytes[..samples].to_vec()
        } else {
            bail!(
                "heightmap of {width}x{height} needs {samples} bytes, got {}",
                bytes.len()
            );
        };
        Ok(Self {
            width,
            height,
            data,
            max_height,
        })
    }

    /// Samples `noise` over `frequency` lattice cells in each direction.
    pub fn from_noise(
        noise: &PerlinNoise,
        width: u32,
        height: u32,
        max_height: f32,
        frequency: f64,
    ) -> Self {
        let width = width.max(2);
        let height = height.max(2);
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for z in 0..height {
            for x in 0..width {
                let value = noise.fbm(
                    x as f64 / width as f64 * frequency,
                    z as f64 / height as f64 * frequency,
                    0.5,
                    4,
                    0.5,
                );
                data.push((value * 255.0).round() as u8);
            }
        }
        Self {
            width,
            height,
            data,
            max_height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// World-less height of the sample at `(x, z)`, clamped to the grid.
    pub fn sample(&self, x: u32, z: u32) -> f32 {
        let x = x.min(self.width - 1) as usize;
        let z = z.min(self.height - 1) as usize;
        self.data[z * self.width as usize + x] as f32 / 255.0 * self.max_height
    }

    /// One vertex per sample, two triangles per cell, smooth normals.
    pub fn to_mesh(&self) -> MeshData {
        let mut vertices = Vec::with_capacity(self.data.len());
        for z in 0..self.height {
            for x in 0..self.width {
                vertices.push(ModelVertex {
                    position: [x as f32, self.sample(x, z), z as f32],
                    tex_coords: [
                        x as f32 / (self.width - 1) as f32,
                        z as f32 / (self.height - 1) as f32,
                    ],
                    normal: [0.0, 1.0, 0.0],
                });
            }
        }
        let mut mesh = MeshData {
            vertices,
            indices: grid_indices(self.width, self.height),
        };
        mesh.compute_smooth_normals();
        mesh
    }
}

/// Index list for a `width x height` vertex grid laid out row by row along
/// +x. Each cell becomes `(tl, bl, tr)` and `(tr, bl, br)`.
pub fn grid_indices(width: u32, height: u32) -> Vec<u32> {
    if width < 2 || height < 2 {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity(((width - 1) * (height - 1) * 6) as usize);
    for z in 0..height - 1 {
        for x in 0..width - 1 {
            let top_left = z * width + x;
            let top_right = top_left + 1;
            let bottom_left = (z + 1) * width + x;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}

/// `resolution x resolution` grid spanning `size` units centred on the
/// origin, `y = noise(x * 0.1, z * 0.1, 0) * 10` for grid indices `x`, `z`.
pub fn perlin_grid(noise: &PerlinNoise, resolution: u32, size: f32) -> MeshData {
    let resolution = resolution.max(2);
    let step = (resolution - 1) as f32;
    let mut vertices = Vec::with_capacity((resolution * resolution) as usize);
    for z in 0..resolution {
        for x in 0..resolution {
            let x_pos = x as f32 / step * size - size / 2.0;
            let z_pos = z as f32 / step * size - size / 2.0;
            let y_pos = noise.noise(x as f64 * 0.1, z as f64 * 0.1, 0.0) as f32 * 10.0;
            vertices.push(ModelVertex {
                position: [x_pos, y_pos, z_pos],
                tex_coords: [x as f32 / step, z as f32 / step],
                normal: [0.0, 1.0, 0.0],
            });
        }
    }
    let mut mesh = MeshData {
        vertices,
        indices: grid_indices(resolution, resolution),
    };
    mesh.compute_smooth_normals();
    mesh
}

/// Accumulating model matrix: each call post-multiplies, so
/// `translate(t); scale(s)` yields `T * S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.matrix = Matrix4::identity();
        self
    }

    pub fn translate(&mut self, offset: Vector3<f32>) -> &mut Self {
        self.matrix = self.matrix * Matrix4::from_translation(offset);
        self
    }

    pub fn scale(&mut self, factors: Vector3<f32>) -> &mut Self {
        self.matrix = self.matrix * Matrix4::from_nonuniform_scale(factors.x, factors.y, factors.z);
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    pub fn apply(&self, point: Point3<f32>) -> Point3<f32> {
        self.matrix.transform_point(point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
