//! Distance based level of detail for heightmap terrain.
//!
//! The terrain is cut into square patches of `patch_res` cells. Every patch
//! owns index ranges per level inside a single index buffer; level `n`
//! walks the shared vertex grid with a stride of `2^n`. Each level also has
//! a variant for every combination of coarser neighbours, with those edges
//! stitched to the neighbour's stride. Choosing levels per frame is then
//! just choosing which ranges to draw.

use std::ops::Range;

use cgmath::{MetricSpace, Point3};

use crate::data_structures::{
    model::{MeshData, ModelVertex},
    terrain::{Heightmap, Transform},
};

/// Distances at which detail starts and stops dropping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodRange {
    pub near: f32,
    pub far: f32,
}

impl LodRange {
    /// `0` up to `near`, `max_level` from `far` on, linear in between.
    pub fn level(&self, distance: f32, max_level: u32) -> u32 {
        if distance <= self.near || self.far <= self.near {
            return 0;
        }
        if distance >= self.far {
            return max_level;
        }
        let t = (distance - self.near) / (self.far - self.near);
        ((t * (max_level + 1) as f32) as u32).min(max_level)
    }
}

/// Coarsest level a patch of `patch_res` cells supports: a single quad.
pub fn max_level(patch_res: u32) -> u32 {
    patch_res.max(1).ilog2()
}

/// Patch edges as bits of a stitch mask. A set bit means the neighbour on
/// that side is one level coarser.
pub const EDGE_NORTH: u8 = 0b0001;
pub const EDGE_EAST: u8 = 0b0010;
pub const EDGE_SOUTH: u8 = 0b0100;
pub const EDGE_WEST: u8 = 0b1000;
pub const STITCH_MASKS: usize = 16;

/// Triangles of the patch whose top-left vertex is `(origin_x, origin_z)` in
/// a vertex grid `grid_width` wide, skipping `2^level - 1` vertices between
/// samples.
pub fn patch_indices(
    grid_width: u32,
    origin_x: u32,
    origin_z: u32,
    patch_res: u32,
    level: u32,
) -> Vec<u32> {
    stitched_patch_indices(grid_width, origin_x, origin_z, patch_res, level, 0)
}

/// Like [`patch_indices`], but every edge flagged in `stitch` only uses the
/// vertices of the next coarser level. The in-between edge vertices are
/// snapped onto their coarse predecessor, so the border matches the
/// neighbour's exactly; triangles that collapse are dropped.
pub fn stitched_patch_indices(
    grid_width: u32,
    origin_x: u32,
    origin_z: u32,
    patch_res: u32,
    level: u32,
    stitch: u8,
) -> Vec<u32> {
    let stride = 1u32 << level.min(max_level(patch_res));
    let coarse = (stride * 2).min(patch_res.max(1));
    let cells = patch_res / stride;
    let snap = |x: u32, z: u32| {
        let (mut x, mut z) = (x, z);
        if (z == 0 && stitch & EDGE_NORTH != 0) || (z == patch_res && stitch & EDGE_SOUTH != 0) {
            x -= x % coarse;
        }
        if (x == 0 && stitch & EDGE_WEST != 0) || (x == patch_res && stitch & EDGE_EAST != 0) {
            z -= z % coarse;
        }
        (origin_z + z) * grid_width + origin_x + x
    };

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for cz in 0..cells {
        for cx in 0..cells {
            let (x, z) = (cx * stride, cz * stride);
            let top_left = snap(x, z);
            let top_right = snap(x + stride, z);
            let bottom_left = snap(x, z + stride);
            let bottom_right = snap(x + stride, z + stride);
            for [a, b, c] in [
                [top_left, bottom_left, top_right],
                [top_right, bottom_left, bottom_right],
            ] {
                if a != b && b != c && a != c {
                    indices.extend_from_slice(&[a, b, c]);
                }
            }
        }
    }
    indices
}

#[derive(Clone, Debug)]
pub struct LodGrid {
    pub mesh: MeshData,
    pub patches_per_side: u32,
    pub patch_res: u32,
    /// `ranges[patch][level][stitch]` into `mesh.indices`.
    ranges: Vec<Vec<[Range<u32>; STITCH_MASKS]>>,
    /// Patch centres in grid space.
    centers: Vec<Point3<f32>>,
}

impl LodGrid {
    /// Resamples `heightmap` onto a `(patches_per_side * patch_res + 1)`
    /// vertex grid. `patch_res` is rounded up to a power of two.
    pub fn from_heightmap(heightmap: &Heightmap, patches_per_side: u32, patch_res: u32) -> Self {
        let patches_per_side = patches_per_side.max(1);
        let patch_res = patch_res.max(1).next_power_of_two();
        let side = patches_per_side * patch_res + 1;
        let span = (side - 1) as f32;
        let hx = (heightmap.width() - 1) as f32;
        let hz = (heightmap.height() - 1) as f32;

        let mut vertices = Vec::with_capacity((side * side) as usize);
        for z in 0..side {
            for x in 0..side {
                let sx = (x as f32 / span * hx).round() as u32;
                let sz = (z as f32 / span * hz).round() as u32;
                vertices.push(ModelVertex {
                    position: [x as f32 / span * hx, heightmap.sample(sx, sz), z as f32 / span * hz],
                    tex_coords: [x as f32 / span, z as f32 / span],
                    normal: [0.0, 1.0, 0.0],
                });
            }
        }

        let mut mesh = MeshData {
            vertices,
            indices: super::terrain::grid_indices(side, side),
        };
        mesh.compute_smooth_normals();
        mesh.indices.clear();

        let levels = max_level(patch_res) + 1;
        let mut ranges = Vec::with_capacity((patches_per_side * patches_per_side) as usize);
        let mut centers = Vec::with_capacity(ranges.capacity());
        for pz in 0..patches_per_side {
            for px in 0..patches_per_side {
                let (ox, oz) = (px * patch_res, pz * patch_res);
                let mut patch_ranges = Vec::with_capacity(levels as usize);
                for level in 0..levels {
                    // nothing is coarser than a single quad
                    if level + 1 == levels {
                        let start = mesh.indices.len() as u32;
                        mesh.indices.extend(patch_indices(side, ox, oz, patch_res, level));
                        let range = start..mesh.indices.len() as u32;
                        patch_ranges.push(std::array::from_fn(|_| range.clone()));
                        continue;
                    }
                    patch_ranges.push(std::array::from_fn(|stitch| {
                        let start = mesh.indices.len() as u32;
                        mesh.indices.extend(stitched_patch_indices(
                            side,
                            ox,
                            oz,
                            patch_res,
                            level,
                            stitch as u8,
                        ));
                        start..mesh.indices.len() as u32
                    }));
                }
                ranges.push(patch_ranges);

                let centre = ((oz + patch_res / 2) * side + ox + patch_res / 2) as usize;
                centers.push(Point3::from(mesh.vertices[centre].position));
            }
        }

        Self {
            mesh,
            patches_per_side,
            patch_res,
            ranges,
            centers,
        }
    }

    pub fn patch_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn max_level(&self) -> u32 {
        max_level(self.patch_res)
    }

    /// Unstitched range of `patch` at `level`.
    pub fn range(&self, patch: usize, level: u32) -> Range<u32> {
        self.stitched_range(patch, level, 0)
    }

    pub fn stitched_range(&self, patch: usize, level: u32, stitch: u8) -> Range<u32> {
        let levels = &self.ranges[patch];
        levels[(level as usize).min(levels.len() - 1)][stitch as usize % STITCH_MASKS].clone()
    }

    /// Neighbours of `patch` in edge bit order: north, east, south, west.
    pub fn neighbours(&self, patch: usize) -> [Option<usize>; 4] {
        let side = self.patches_per_side as usize;
        let (px, pz) = (patch % side, patch / side);
        [
            (pz > 0).then(|| patch - side),
            (px + 1 < side).then(|| patch + 1),
            (pz + 1 < side).then(|| patch + side),
            (px > 0).then(|| patch - 1),
        ]
    }

    /// Lowers levels until no two neighbouring patches differ by more than
    /// one, the most a stitched edge can bridge.
    pub fn balance_levels(&self, levels: &mut [u32]) {
        let mut changed = true;
        while changed {
            changed = false;
            for patch in 0..levels.len() {
                let limit = self
                    .neighbours(patch)
                    .into_iter()
                    .flatten()
                    .map(|n| levels[n] + 1)
                    .min();
                if let Some(limit) = limit {
                    if levels[patch] > limit {
                        levels[patch] = limit;
                        changed = true;
                    }
                }
            }
        }
    }

    /// Edges of `patch` whose neighbour is coarser.
    pub fn stitch_mask(&self, levels: &[u32], patch: usize) -> u8 {
        self.neighbours(patch)
            .into_iter()
            .enumerate()
            .filter(|(_, n)| n.is_some_and(|n| levels[n] > levels[patch]))
            .fold(0, |mask, (edge, _)| mask | 1 << edge)
    }

    /// One level per patch for a viewer at `eye` in world space, balanced so
    /// neighbours stitch without cracks.
    pub fn select_levels(&self, eye: Point3<f32>, transform: &Transform, lod: &LodRange) -> Vec<u32> {
        let mut levels = self
            .centers
            .iter()
            .map(|centre| {
                let distance = transform.apply(*centre).distance(eye);
                lod.level(distance, self.max_level())
            })
            .collect::<Vec<_>>();
        self.balance_levels(&mut levels);
        levels
    }

    /// Index ranges to draw for the given balanced per-patch levels.
    pub fn draw_ranges<'a>(&'a self, levels: &'a [u32]) -> impl Iterator<Item = Range<u32>> + 'a {
        levels
            .iter()
            .enumerate()
            .map(|(patch, level)| self.stitched_range(patch, *level, self.stitch_mask(levels, patch)))
    }
}
