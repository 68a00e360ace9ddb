// Contribution graph quantizers.
// Reduce a year of daily counts to symbols a low-resolution display can show.

use serde::Deserialize;

/// Columns in the tiered bitmap.
pub const GRID_COLUMNS: usize = 32;
/// Rows (tiers) in the tiered bitmap.
pub const GRID_ROWS: usize = 7;
/// Highest intensity level.
pub const MAX_LEVEL: u8 = 7;

/// Separator between emitted symbols.
pub const SYMBOL_DELIMITER: &str = ",";
const FILLED: &str = "1";
const EMPTY: &str = "0";
const LEVEL_PALETTE: [&str; MAX_LEVEL as usize + 1] = ["0", "1", "2", "3", "4", "5", "6", "7"];

/// How the contribution graph is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    /// Fixed 32x7 bitmap of averaged columns.
    #[default]
    Bitmap,
    /// One intensity symbol per day.
    Levels,
}

/// Compress counts into a 32x7 grid, row-major, top (highest tier) row first.
///
/// Each column averages `ceil(N / 32)` consecutive days; a cell is filled when
/// its column average reaches the row's share of the busiest column. A series
/// without any contributions produces an all-empty grid.
pub fn tiered_bitmap(counts: &[u32]) -> Vec<bool> {
    let averages = column_averages(counts);
    let max_value = averages.iter().copied().fold(0.0_f64, f64::max);

    if max_value <= 0.0 {
        return vec![false; GRID_COLUMNS * GRID_ROWS];
    }

    (0..GRID_ROWS)
        .rev()
        .flat_map(|y| averages.iter().map(move |&avg| cell_filled(avg, max_value, y)))
        .collect()
}

/// Whether a column averaging `avg` fills row `y` (0 = bottom).
///
/// `avg >= (max / 7) * (y + 1)`, scaled by 7 so the busiest column always
/// reaches the top row without rounding loss.
fn cell_filled(avg: f64, max_value: f64, y: usize) -> bool {
    avg * GRID_ROWS as f64 >= max_value * (y + 1) as f64
}

/// Mean count of each of the 32 column buckets. Empty buckets average 0.
fn column_averages(counts: &[u32]) -> [f64; GRID_COLUMNS] {
    let n = counts.len();
    let days_per_column = n.div_ceil(GRID_COLUMNS);
    let mut averages = [0.0; GRID_COLUMNS];

    for (i, avg) in averages.iter_mut().enumerate() {
        let start = (i * days_per_column).min(n);
        let end = ((i + 1) * days_per_column).min(n);
        let bucket = &counts[start..end];
        if !bucket.is_empty() {
            let sum: u64 = bucket.iter().map(|&c| u64::from(c)).sum();
            *avg = sum as f64 / bucket.len() as f64;
        }
    }

    averages
}

/// Intensity level for one day: 0 for no activity, otherwise `ceil(count / 2)` capped at 7.
pub fn intensity_level(count: u32) -> u8 {
    if count == 0 {
        return 0;
    }
    count.div_ceil(2).min(u32::from(MAX_LEVEL)) as u8
}

/// Intensity level of every day, in order.
pub fn intensity_levels(counts: &[u32]) -> Vec<u8> {
    counts.iter().map(|&c| intensity_level(c)).collect()
}

/// Encode a bitmap as delimited symbols.
pub fn render_bitmap(cells: &[bool]) -> String {
    cells
        .iter()
        .map(|&filled| if filled { FILLED } else { EMPTY })
        .collect::<Vec<_>>()
        .join(SYMBOL_DELIMITER)
}

/// Encode intensity levels as delimited palette symbols.
pub fn render_levels(levels: &[u8]) -> String {
    levels
        .iter()
        .map(|&level| LEVEL_PALETTE[usize::from(level.min(MAX_LEVEL))])
        .collect::<Vec<_>>()
        .join(SYMBOL_DELIMITER)
}

/// Render counts with the chosen mode.
pub fn render(counts: &[u32], mode: GraphMode) -> String {
    match mode {
        GraphMode::Bitmap => render_bitmap(&tiered_bitmap(counts)),
        GraphMode::Levels => render_levels(&intensity_levels(counts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(grid: &[bool], y: usize, x: usize) -> bool {
        // Row y=6 is emitted first.
        grid[(GRID_ROWS - 1 - y) * GRID_COLUMNS + x]
    }

    #[test]
    fn test_bitmap_matches_recomputation() {
        let counts: Vec<u32> = [7, 6, 5, 4, 3, 2, 1, 0].repeat(4);
        let grid = tiered_bitmap(&counts);

        assert_eq!(grid.len(), GRID_COLUMNS * GRID_ROWS);

        // One day per column, so each column average is the count itself.
        let max = 7.0;
        for y in 0..GRID_ROWS {
            let threshold = max / 7.0 * (y + 1) as f64;
            for x in 0..GRID_COLUMNS {
                assert_eq!(cell(&grid, y, x), counts[x] as f64 >= threshold, "y={} x={}", y, x);
            }
        }
    }

    #[test]
    fn test_bitmap_columns_fill_bottom_up() {
        let counts: Vec<u32> = [7, 6, 5, 4, 3, 2, 1, 0].repeat(4);
        let grid = tiered_bitmap(&counts);

        for x in 0..GRID_COLUMNS {
            for y in 1..GRID_ROWS {
                if cell(&grid, y, x) {
                    assert!(cell(&grid, y - 1, x), "gap below y={} x={}", y, x);
                }
            }
        }
        // Column 0 (count 7) is full, column 7 (count 0) is empty.
        assert!((0..GRID_ROWS).all(|y| cell(&grid, y, 0)));
        assert!((0..GRID_ROWS).all(|y| !cell(&grid, y, 7)));
    }

    #[test]
    fn test_cell_threshold_is_exact_at_equality() {
        // 1/7 is exactly 5/7 of 0.2, so row 4 fills. Dividing by 7 first
        // rounds the threshold above the average and would leave it empty.
        let avg = 1.0 / 7.0;
        assert!(cell_filled(avg, 0.2, 4));
        assert!(avg < (0.2 / 7.0) * 5.0);
        assert!(!cell_filled(avg, 0.2, 5));

        // The busiest column always reaches the top row.
        assert!(cell_filled(0.2, 0.2, GRID_ROWS - 1));
        assert!(cell_filled(0.1, 0.1, GRID_ROWS - 1));
    }

    #[test]
    fn test_bitmap_all_zero_is_empty() {
        let grid = tiered_bitmap(&[0; 365]);
        assert_eq!(grid.len(), 224);
        assert!(grid.iter().all(|&c| !c));
    }

    #[test]
    fn test_bitmap_empty_series() {
        let grid = tiered_bitmap(&[]);
        assert_eq!(grid.len(), 224);
        assert!(grid.iter().all(|&c| !c));
    }

    #[test]
    fn test_bitmap_full_year_trailing_columns() {
        // 365 days -> 12 days per column; column 30 gets 5 days, column 31 none.
        let mut counts = vec![0u32; 365];
        counts[364] = 35;
        let averages = column_averages(&counts);

        assert_eq!(averages[30], 7.0);
        assert_eq!(averages[31], 0.0);

        let grid = tiered_bitmap(&counts);
        assert!((0..GRID_ROWS).all(|y| cell(&grid, y, 30)));
        assert!((0..GRID_ROWS).all(|y| !cell(&grid, y, 31)));
    }

    #[test]
    fn test_bitmap_short_series() {
        // Fewer days than columns: one day per column, rest empty.
        let grid = tiered_bitmap(&[7, 14]);
        assert!(cell(&grid, 0, 0));
        assert!(!cell(&grid, 6, 0));
        assert!((0..GRID_ROWS).all(|y| cell(&grid, y, 1)));
        assert!((0..GRID_ROWS).all(|y| !cell(&grid, y, 2)));
    }

    #[test]
    fn test_intensity_levels() {
        assert_eq!(intensity_level(0), 0);
        assert_eq!(intensity_level(1), 1);
        assert_eq!(intensity_level(2), 1);
        assert_eq!(intensity_level(3), 2);
        assert_eq!(intensity_level(13), 7);
        assert_eq!(intensity_level(14), 7);
        assert_eq!(intensity_level(u32::MAX), 7);
    }

    #[test]
    fn test_intensity_preserves_length_and_order() {
        assert_eq!(intensity_levels(&[0, 2, 13, 14, 5]), vec![0, 1, 7, 7, 3]);
        assert!(intensity_levels(&[]).is_empty());
    }

    #[test]
    fn test_render() {
        assert_eq!(render_levels(&[0, 3, 7]), "0,3,7");
        assert_eq!(render_bitmap(&[true, false]), "1,0");

        // 365 days leave the last column without data.
        let bitmap = render(&[7; 365], GraphMode::Bitmap);
        assert_eq!(bitmap.split(',').count(), 224);
        assert_eq!(bitmap.split(',').filter(|&s| s == "1").count(), 31 * 7);

        assert_eq!(render(&[0, 4], GraphMode::Levels), "0,2");
    }

    #[test]
    fn test_graph_mode_parse() {
        let mode: GraphMode = serde_json::from_str("\"levels\"").unwrap();
        assert_eq!(mode, GraphMode::Levels);
        assert_eq!(GraphMode::default(), GraphMode::Bitmap);
    }
}
