//! Summary statistics over a coverage grid

use covgrid_core::models::{CoverageGrid, CoverageSummary};

/// Number of cells holding each count; index `k` is the number of cells
/// covered by exactly `k` overlaps
pub fn histogram(grid: &CoverageGrid) -> Vec<usize> {
    let max = grid.cells().iter().copied().max().unwrap_or(0) as usize;
    let mut counts = vec![0usize; max + 1];
    for &value in grid.cells() {
        counts[value as usize] += 1;
    }
    counts
}

/// `{min, max, median}` over all cells. The median of an even number of
/// cells is the mean of the two middle values.
pub fn summarize(grid: &CoverageGrid) -> CoverageSummary {
    let counts = histogram(grid);
    let total: usize = counts.iter().sum();
    if total == 0 {
        return CoverageSummary { min: 0, max: 0, median: 0.0 };
    }

    let min = counts.iter().position(|&n| n > 0).unwrap_or(0) as u32;
    let max = (counts.len() - 1) as u32;

    let lower = value_at_rank(&counts, (total - 1) / 2);
    let upper = value_at_rank(&counts, total / 2);
    let median = (f64::from(lower) + f64::from(upper)) / 2.0;

    CoverageSummary { min, max, median }
}

/// Share of cells covered by at least one overlap
pub fn fraction_covered(grid: &CoverageGrid) -> f64 {
    let total = grid.cells().len();
    if total == 0 {
        return 0.0;
    }
    let covered = grid.cells().iter().filter(|&&c| c > 0).count();
    covered as f64 / total as f64
}

/// Value of the `rank`-th smallest cell (0-based)
fn value_at_rank(counts: &[usize], rank: usize) -> u32 {
    let mut seen = 0;
    for (value, &n) in counts.iter().enumerate() {
        seen += n;
        if seen > rank {
            return value as u32;
        }
    }
    (counts.len().saturating_sub(1)) as u32
}
