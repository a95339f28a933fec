//! Character rendering of a coverage grid

use covgrid_core::models::CoverageGrid;

const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Render the grid at most `max_width` characters wide, north up.
///
/// Each character stands for a block of cells and shows the lowest count in
/// it. Blocks are twice as tall as wide to offset terminal glyph proportions.
pub fn render(grid: &CoverageGrid, max_width: usize) -> String {
    let dims = grid.dimensions();
    if dims.cell_count() == 0 || max_width == 0 {
        return String::new();
    }

    let step = dims.cols.div_ceil(max_width).max(1);
    let row_step = step * 2;
    let cells = grid.cells();

    let mut out = String::new();
    for row0 in (0..dims.rows).step_by(row_step) {
        for col0 in (0..dims.cols).step_by(step) {
            let row_end = (row0 + row_step).min(dims.rows);
            let col_end = (col0 + step).min(dims.cols);
            let lowest = (row0..row_end)
                .flat_map(|r| (col0..col_end).map(move |c| (r, c)))
                .map(|(r, c)| cells[[r, c]])
                .min()
                .unwrap_or(0);
            out.push(glyph(lowest));
        }
        out.push('\n');
    }
    out
}

/// Legend line matching [`render`]
pub fn legend(max_count: u32) -> String {
    (0..=max_count.min(RAMP.len() as u32 - 1))
        .map(|n| {
            let label = if n as usize == RAMP.len() - 1 { format!("{}+", n) } else { n.to_string() };
            format!("'{}'={}", glyph(n), label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn glyph(count: u32) -> char {
    RAMP[(count as usize).min(RAMP.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_small_grid_one_char_per_cell_pair() {
        let grid = CoverageGrid::from_array(array![[2, 1], [2, 1], [0, 1], [0, 1]]);
        assert_eq!(render(&grid, 10), ":.\n .\n");
    }

    #[test]
    fn test_downsampling_shows_lowest_count() {
        let grid = CoverageGrid::from_array(array![[3, 3, 1, 1], [3, 0, 1, 1]]);
        let text = render(&grid, 2);
        assert_eq!(text, " .\n");
    }

    #[test]
    fn test_saturating_ramp() {
        let grid = CoverageGrid::from_array(array![[50, 50]]);
        assert_eq!(render(&grid, 10), "@@\n");
        assert!(legend(12).ends_with("'@'=9+"));
        assert_eq!(legend(1), "' '=0  '.'=1");
    }
}
