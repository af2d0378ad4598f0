//! Terminal output helpers.

use bed::prelude::*;
use bed::types::GridStatistics;
use owo_colors::OwoColorize;

/// Print the grid as a table, row 0 first, highlighting `marked` cells.
pub fn grid(grid: &MeshGrid, marked: &[CellCoord]) {
    let header: String = (0..grid.cols()).map(|x| format!("{x:>11}")).collect();
    println!("{:>4}{}", "", header.dimmed());

    for (y, row) in grid.iter_rows().enumerate() {
        print!("{:>4}", y.dimmed());
        for (x, value) in row.iter().enumerate() {
            let text = format!("{value:>11.6}");
            if marked.contains(&CellCoord::new(y, x)) {
                print!("{}", text.yellow().bold());
            } else if *value < 0.0 {
                print!("{}", text.cyan());
            } else {
                print!("{text}");
            }
        }
        println!();
    }
}

/// Print min/max/range/mean/std.
pub fn statistics(stats: &GridStatistics) {
    println!(
        "  min {:.6}  max {:.6}  range {:.6}  mean {:.6}  std {:.6}",
        stats.min, stats.max, stats.range, stats.mean, stats.std_dev
    );
}
