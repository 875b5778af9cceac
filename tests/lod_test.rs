use std::collections::HashSet;

use cgmath::Point3;
use scene_sandbox::{
    data_structures::{
        lod::{
            EDGE_EAST, EDGE_SOUTH, LodGrid, LodRange, STITCH_MASKS, max_level, patch_indices,
            stitched_patch_indices,
        },
        terrain::{Heightmap, Transform},
    },
    noise::PerlinNoise,
};

const RANGE: LodRange = LodRange {
    near: 100.0,
    far: 500.0,
};

#[test]
fn level_is_finest_up_close_and_coarsest_far_away() {
    assert_eq!(RANGE.level(0.0, 4), 0);
    assert_eq!(RANGE.level(100.0, 4), 0);
    assert_eq!(RANGE.level(500.0, 4), 4);
    assert_eq!(RANGE.level(10_000.0, 4), 4);
}

#[test]
fn detail_never_increases_with_distance() {
    let mut previous = 0;
    for step in 0..200 {
        let level = RANGE.level(step as f32 * 5.0, 4);
        assert!(level >= previous, "level dropped back at distance {}", step * 5);
        assert!(level <= 4);
        previous = level;
    }
}

#[test]
fn degenerate_range_stays_at_full_detail() {
    let range = LodRange { near: 50.0, far: 50.0 };
    assert_eq!(range.level(1000.0, 3), 0);
}

#[test]
fn max_level_is_log2_of_patch_resolution() {
    assert_eq!(max_level(1), 0);
    assert_eq!(max_level(16), 4);
    assert_eq!(max_level(64), 6);
}

#[test]
fn patch_indices_shrink_by_four_per_level() {
    let full = patch_indices(17, 0, 0, 16, 0);
    assert_eq!(full.len(), 16 * 16 * 6);
    let half = patch_indices(17, 0, 0, 16, 1);
    assert_eq!(half.len(), 8 * 8 * 6);
    let single = patch_indices(17, 0, 0, 16, 4);
    assert_eq!(single, vec![0, 16 * 17, 16, 16, 16 * 17, 16 * 17 + 16]);
}

#[test]
fn levels_beyond_the_coarsest_are_clamped() {
    assert_eq!(patch_indices(17, 0, 0, 16, 9), patch_indices(17, 0, 0, 16, 4));
}

fn grid() -> LodGrid {
    let heightmap = Heightmap::from_noise(&PerlinNoise::new(4), 33, 33, 20.0, 2.0);
    LodGrid::from_heightmap(&heightmap, 4, 8)
}

#[test]
fn grid_shares_one_vertex_grid_between_levels() {
    let grid = grid();
    assert_eq!(grid.patch_count(), 16);
    assert_eq!(grid.max_level(), 3);
    assert_eq!(grid.mesh.vertices.len(), 33 * 33);
    let vertex_count = grid.mesh.vertices.len() as u32;
    assert!(grid.mesh.indices.iter().all(|&i| i < vertex_count));
}

#[test]
fn grid_ranges_are_disjoint_and_sized_per_level() {
    let grid = grid();
    for patch in 0..grid.patch_count() {
        for level in 0..=grid.max_level() {
            let range = grid.range(patch, level);
            let cells = 8 >> level;
            assert_eq!(range.end - range.start, cells * cells * 6);
        }
        assert!(grid.range(patch, 0).end <= grid.range(patch, 1).start);
    }
}

#[test]
fn near_patches_get_more_detail_than_far_ones() {
    let grid = grid();
    let transform = Transform::new();
    let range = LodRange { near: 5.0, far: 30.0 };
    let levels = grid.select_levels(Point3::new(0.0, 0.0, 0.0), &transform, &range);
    assert_eq!(levels.len(), grid.patch_count());
    // patch 0 sits at the eye, the last patch in the far corner
    assert!(levels[0] < levels[grid.patch_count() - 1]);
    assert_eq!(grid.draw_ranges(&levels).count(), grid.patch_count());
}

/// Twice the signed area of a triangle in grid coordinates.
fn signed_area(grid_width: u32, [a, b, c]: [u32; 3]) -> i64 {
    let at = |i: u32| ((i % grid_width) as i64, (i / grid_width) as i64);
    let ((ax, az), (bx, bz), (cx, cz)) = (at(a), at(b), at(c));
    (bx - ax) * (cz - az) - (bz - az) * (cx - ax)
}

#[test]
fn stitched_patches_still_cover_the_whole_patch() {
    for level in 0..max_level(16) {
        for stitch in 0..STITCH_MASKS as u8 {
            let indices = stitched_patch_indices(17, 0, 0, 16, level, stitch);
            let areas: Vec<i64> = indices
                .chunks(3)
                .map(|t| signed_area(17, [t[0], t[1], t[2]]))
                .collect();
            assert!(areas.iter().all(|a| *a <= 0), "level {level} stitch {stitch:04b} folds over");
            assert_eq!(areas.iter().sum::<i64>(), -2 * 16 * 16);
        }
    }
}

#[test]
fn stitched_edge_only_uses_coarse_vertices() {
    let indices = stitched_patch_indices(17, 0, 0, 16, 0, EDGE_EAST);
    let east: HashSet<u32> = indices.iter().copied().filter(|i| i % 17 == 16).collect();
    let expected: HashSet<u32> = (0..=16).step_by(2).map(|z| z * 17 + 16).collect();
    assert_eq!(east, expected);
}

fn balanced_grid() -> LodGrid {
    let heightmap = Heightmap::from_noise(&PerlinNoise::new(9), 33, 33, 20.0, 2.0);
    LodGrid::from_heightmap(&heightmap, 2, 16)
}

#[test]
fn neighbour_levels_are_balanced() {
    let grid = balanced_grid();
    let mut levels = vec![0, 4, 4, 4];
    grid.balance_levels(&mut levels);
    assert_eq!(levels, vec![0, 1, 1, 2]);
}

#[test]
fn stitch_mask_flags_coarser_neighbours() {
    let grid = balanced_grid();
    let levels = [0, 1, 1, 2];
    assert_eq!(grid.stitch_mask(&levels, 0), EDGE_EAST | EDGE_SOUTH);
    assert_eq!(grid.stitch_mask(&levels, 1), EDGE_SOUTH);
    assert_eq!(grid.stitch_mask(&levels, 2), EDGE_EAST);
    assert_eq!(grid.stitch_mask(&levels, 3), 0);
}

#[test]
fn shared_borders_have_no_cracks() {
    let grid = balanced_grid();
    let side = 33;
    let levels = [0, 1, 1, 2];
    let used: Vec<HashSet<u32>> = grid
        .draw_ranges(&levels)
        .map(|range| grid.mesh.indices[range.start as usize..range.end as usize].iter().copied().collect())
        .collect();

    // (patch a, patch b, vertices on their shared border)
    let borders: [(usize, usize, Vec<u32>); 4] = [
        (0, 1, (0..=16).map(|z| z * side + 16).collect()),
        (0, 2, (0..=16).map(|x| 16 * side + x).collect()),
        (1, 3, (16..=32).map(|x| 16 * side + x).collect()),
        (2, 3, (16..=32).map(|z| z * side + 16).collect()),
    ];
    for (a, b, vertices) in borders {
        for vertex in vertices {
            assert_eq!(
                used[a].contains(&vertex),
                used[b].contains(&vertex),
                "vertex {vertex} on the border of patches {a} and {b} is used by one side only"
            );
        }
    }
}

#[test]
fn selected_levels_never_jump_more_than_one() {
    let grid = grid();
    let range = LodRange { near: 1.0, far: 12.0 };
    let levels = grid.select_levels(Point3::new(0.0, 0.0, 0.0), &Transform::new(), &range);
    for patch in 0..grid.patch_count() {
        for neighbour in grid.neighbours(patch).into_iter().flatten() {
            assert!(levels[patch].abs_diff(levels[neighbour]) <= 1);
        }
    }
}
