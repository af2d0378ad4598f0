//! Property-based tests for the dense-mesh interpolator.
//!
//! Run with: cargo test -p bed-interp -- proptest

#![allow(clippy::unwrap_used)]

use bed_interp::{dense_shape, interpolate};
use bed_types::{CellCoord, MeshGrid, PointsPerSegment};
use proptest::prelude::*;

fn arb_grid() -> impl Strategy<Value = MeshGrid> {
    (4usize..=9, 4usize..=9).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-1.0..1.0f64, rows * cols)
            .prop_map(move |values| MeshGrid::from_vec(rows, cols, values).unwrap())
    })
}

fn arb_pps() -> impl Strategy<Value = PointsPerSegment> {
    (1u32..=5, 1u32..=5).prop_map(|(x, y)| PointsPerSegment::new(x, y))
}

proptest! {
    #[test]
    fn proptest_dense_shape_matches_density(grid in arb_grid(), pps in arb_pps()) {
        let dense = interpolate(&grid, pps).unwrap();
        prop_assert_eq!(dense.grid.shape(), dense_shape(grid.shape(), pps));
    }

    #[test]
    fn proptest_interpolant_hits_every_sample(grid in arb_grid(), pps in arb_pps()) {
        let dense = interpolate(&grid, pps).unwrap();
        for (cell, v) in grid.iter_cells() {
            let at = CellCoord::new(cell.y * pps.y as usize, cell.x * pps.x as usize);
            prop_assert!((dense.grid[at] - v).abs() < 1e-9);
        }
    }

    #[test]
    fn proptest_offset_commutes(grid in arb_grid(), pps in arb_pps(), delta in -0.5..0.5f64) {
        let mut shifted = grid.clone();
        for v in shifted.as_mut_slice() {
            *v += delta;
        }
        let a = interpolate(&grid, pps).unwrap();
        let b = interpolate(&shifted, pps).unwrap();
        for (x, y) in a.grid.as_slice().iter().zip(b.grid.as_slice()) {
            prop_assert!((y - x - delta).abs() < 1e-9);
        }
    }
}
