//! Leftover-space decomposition into reusable remnants.
//!
//! The sheet is rasterized into unit cells. Cells touched by a placed piece or
//! the kerf on its right and top are occupied. The free cells are then
//! covered by axis-aligned rectangles, and those with both sides at least the
//! minimum size are reported.

use u_cutstock_core::{PlacedCut, Remnant, RemnantScan, Result, Sheet, MIN_REMNANT_SIZE};

/// Occupancy raster with one cell per unit of length.
struct Grid {
    cols: usize,
    rows: usize,
    /// Occupied by a piece or claimed by an earlier remnant.
    blocked: Vec<bool>,
}

impl Grid {
    fn new(placed: &[PlacedCut], sheet: &Sheet) -> Self {
        let cols = sheet.width.ceil().max(0.0) as usize;
        let rows = sheet.height.ceil().max(0.0) as usize;
        let mut grid = Self {
            cols,
            rows,
            blocked: vec![false; cols * rows],
        };

        for pc in placed {
            let r = pc.kerf_rect(sheet.kerf);
            let x0 = (r.x.floor().max(0.0) as usize).min(cols);
            let y0 = (r.y.floor().max(0.0) as usize).min(rows);
            let x1 = (r.right().ceil().max(0.0) as usize).min(cols);
            let y1 = (r.top().ceil().max(0.0) as usize).min(rows);
            grid.claim(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0));
        }
        grid
    }

    fn is_free(&self, x: usize, y: usize) -> bool {
        !self.blocked[y * self.cols + x]
    }

    fn claim(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..y + height {
            let base = row * self.cols;
            self.blocked[base + x..base + x + width].fill(true);
        }
    }

    fn row_free(&self, y: usize, x: usize, width: usize) -> bool {
        (x..x + width).all(|cx| self.is_free(cx, y))
    }
}

/// Remnants of a layout with the default greedy scan and minimum size.
///
/// An empty layout yields the whole sheet. A malformed sheet is an error.
pub fn calculate_remnants(placed: &[PlacedCut], sheet: &Sheet) -> Result<Vec<Remnant>> {
    calculate_remnants_with(placed, sheet, RemnantScan::Greedy, MIN_REMNANT_SIZE)
}

/// Remnants of a layout, sorted by descending area.
///
/// `min_size` is raised to [`MIN_REMNANT_SIZE`] if smaller. Remnants are
/// pairwise disjoint and lie inside the sheet.
pub fn calculate_remnants_with(
    placed: &[PlacedCut],
    sheet: &Sheet,
    scan: RemnantScan,
    min_size: f64,
) -> Result<Vec<Remnant>> {
    sheet.validate()?;
    let min_size = min_size.max(MIN_REMNANT_SIZE);

    if placed.is_empty() {
        if sheet.width >= min_size && sheet.height >= min_size {
            return Ok(vec![Remnant::new(0.0, 0.0, sheet.width, sheet.height)]);
        }
        return Ok(Vec::new());
    }

    let mut grid = Grid::new(placed, sheet);
    let mut remnants = match scan {
        RemnantScan::Greedy => greedy_scan(&mut grid, sheet, min_size),
        RemnantScan::Histogram => histogram_scan(&mut grid, sheet, min_size),
    };
    remnants.sort_by(|a, b| b.area.total_cmp(&a.area));
    Ok(remnants)
}

/// Clips a cell rectangle to the sheet, returning it if large enough.
fn to_remnant(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    sheet: &Sheet,
    min_size: f64,
) -> Option<Remnant> {
    let x = x as f64;
    let y = y as f64;
    let width = (width as f64).min(sheet.width - x);
    let height = (height as f64).min(sheet.height - y);
    (width >= min_size && height >= min_size).then(|| Remnant::new(x, y, width, height))
}

/// Row-major scan growing a rectangle from each free cell, first to the
/// right, then upward.
fn greedy_scan(grid: &mut Grid, sheet: &Sheet, min_size: f64) -> Vec<Remnant> {
    let mut remnants = Vec::new();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            if !grid.is_free(x, y) {
                continue;
            }

            let mut width = 1;
            while x + width < grid.cols && grid.is_free(x + width, y) {
                width += 1;
            }
            let mut height = 1;
            while y + height < grid.rows && grid.row_free(y + height, x, width) {
                height += 1;
            }

            grid.claim(x, y, width, height);
            remnants.extend(to_remnant(x, y, width, height, sheet, min_size));
        }
    }

    remnants
}

/// Repeatedly extracts the largest free rectangle with both sides at least
/// `min_size`, using the largest-rectangle-in-histogram sweep.
fn histogram_scan(grid: &mut Grid, sheet: &Sheet, min_size: f64) -> Vec<Remnant> {
    let mut remnants = Vec::new();
    let min_cells = min_size.ceil() as usize;

    while let Some((x, y, width, height)) = largest_free_rect(grid, min_cells) {
        grid.claim(x, y, width, height);
        remnants.extend(to_remnant(x, y, width, height, sheet, min_size));
    }

    remnants
}

/// Largest free cell rectangle with both sides at least `min_cells`, as
/// `(x, y, width, height)`. Ties keep the first found.
fn largest_free_rect(grid: &Grid, min_cells: usize) -> Option<(usize, usize, usize, usize)> {
    let mut heights = vec![0usize; grid.cols];
    let mut best: Option<(usize, usize, usize, usize)> = None;
    let mut best_area = 0;
    let mut stack: Vec<usize> = Vec::with_capacity(grid.cols + 1);

    for y in 0..grid.rows {
        for (x, h) in heights.iter_mut().enumerate() {
            *h = if grid.is_free(x, y) { *h + 1 } else { 0 };
        }

        stack.clear();
        for i in 0..=grid.cols {
            let current = if i < grid.cols { heights[i] } else { 0 };
            while let Some(&top) = stack.last() {
                if heights[top] < current {
                    break;
                }
                stack.pop();
                let height = heights[top];
                let left = stack.last().map_or(0, |&l| l + 1);
                let width = i - left;
                let area = width * height;
                if width >= min_cells && height >= min_cells && area > best_area {
                    best_area = area;
                    best = Some((left, y + 1 - height, width, height));
                }
            }
            stack.push(i);
        }
    }

    best
}
