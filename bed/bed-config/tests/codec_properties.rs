//! Property-based tests for the mesh codec.
//!
//! Run with: cargo test -p bed-config -- proptest

#![allow(clippy::unwrap_used)]

use bed_config::{apply, parse, serialize};
use bed_types::MeshGrid;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Grids up to 12x12 with heights in a realistic ±2 mm band.
fn arb_grid() -> impl Strategy<Value = MeshGrid> {
    (1usize..=12, 1usize..=12).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-2.0..2.0f64, rows * cols)
            .prop_map(move |values| MeshGrid::from_vec(rows, cols, values).unwrap())
    })
}

fn wrap(block: &str) -> String {
    format!(
        "[printer]\nkinematics = cartesian\n\n#*# [bed_mesh default]\n#*# version = 1\n#*# points =\n{block}#*# mesh_x_pps = 2\n#*# mesh_y_pps = 2\n"
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_serialize_then_parse_round_trips(grid in arb_grid()) {
        let text = wrap(&serialize(&grid));
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed.grid.shape(), grid.shape());
        prop_assert!(parsed.grid.approx_eq(&grid, 1e-6));
    }

    #[test]
    fn proptest_apply_preserves_surrounding_text(a in arb_grid(), b in arb_grid()) {
        let text = wrap(&serialize(&a));
        let parsed = parse(&text).unwrap();
        let updated = apply(&text, &parsed, &serialize(&b)).unwrap();

        let prefix = &text[..parsed.points_span.start];
        let suffix = &text[parsed.points_span.end..];
        prop_assert!(updated.starts_with(prefix));
        prop_assert!(updated.ends_with(suffix));

        let reparsed = parse(&updated).unwrap();
        prop_assert!(reparsed.grid.approx_eq(&b, 1e-6));
    }
}
