use rayon::prelude::*;

use glyph_trace_types::{Grid, Sample, Shape};

use crate::error::{CompareError, ensure_same_shape};
use crate::pipeline::ops::should_parallel;

const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Mean SSIM with the data range taken from the sample type.
pub fn structural_similarity<T: Sample>(a: &Grid<T>, b: &Grid<T>) -> Result<f64, CompareError> {
    ensure_same_shape("ssim", a.shape(), b.shape())?;
    structural_similarity_with_range(&a.to_f64(), &b.to_f64(), T::DATA_RANGE)
}

/// Mean SSIM over every position where a uniform `7×7` window fits.
///
/// Local variances use the sample normalization `N/(N-1)`. Grids narrower than
/// the window fall back to the largest odd window that fits. Window sums come
/// from summed-area tables, so the cost is linear in the pixel count.
pub fn structural_similarity_with_range(
    a: &Grid<f64>,
    b: &Grid<f64>,
    data_range: f64,
) -> Result<f64, CompareError> {
    ensure_same_shape("ssim", a.shape(), b.shape())?;
    if !(data_range.is_finite() && data_range > 0.0) {
        return Err(CompareError::InvalidDataRange(data_range));
    }

    let shape = a.shape();
    let win = window_size(shape);
    let n = (win * win) as f64;
    let cov_norm = if win > 1 { n / (n - 1.0) } else { 1.0 };
    let c1 = (K1 * data_range).powi(2);
    let c2 = (K2 * data_range).powi(2);

    let (x, y) = (a.data(), b.data());
    let ((sx, sy), (sxx, (syy, sxy))) = rayon::join(
        || {
            (
                SummedArea::new(shape, |i| x[i]),
                SummedArea::new(shape, |i| y[i]),
            )
        },
        || {
            (
                SummedArea::new(shape, |i| x[i] * x[i]),
                rayon::join(
                    || SummedArea::new(shape, |i| y[i] * y[i]),
                    || SummedArea::new(shape, |i| x[i] * y[i]),
                ),
            )
        },
    );

    let local = |row: usize, col: usize| -> f64 {
        let ux = sx.window(row, col, win) / n;
        let uy = sy.window(row, col, win) / n;
        let uxx = sxx.window(row, col, win) / n;
        let uyy = syy.window(row, col, win) / n;
        let uxy = sxy.window(row, col, win) / n;
        let vx = cov_norm * (uxx - ux * ux);
        let vy = cov_norm * (uyy - uy * uy);
        let vxy = cov_norm * (uxy - ux * uy);

        let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
        let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
        numerator / denominator
    };

    let rows = shape.height - win + 1;
    let cols = shape.width - win + 1;
    let row_sum = |row: usize| (0..cols).map(|col| local(row, col)).sum::<f64>();
    let total: f64 = if should_parallel(shape.len()) {
        (0..rows).into_par_iter().map(row_sum).sum()
    } else {
        (0..rows).map(row_sum).sum()
    };
    Ok(total / (rows * cols) as f64)
}

fn window_size(shape: Shape) -> usize {
    let fit = WINDOW.min(shape.height).min(shape.width).max(1);
    if fit % 2 == 0 { fit - 1 } else { fit }
}

/// Inclusive prefix sums with a zero border row and column.
struct SummedArea {
    stride: usize,
    sums: Vec<f64>,
}

impl SummedArea {
    fn new(shape: Shape, value: impl Fn(usize) -> f64) -> Self {
        let stride = shape.width + 1;
        let mut sums = vec![0.0f64; (shape.height + 1) * stride];
        for y in 0..shape.height {
            let mut row_total = 0.0;
            for x in 0..shape.width {
                row_total += value(y * shape.width + x);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_total;
            }
        }
        Self { stride, sums }
    }

    /// Sum of the `size×size` block whose top-left corner is `(row, col)`.
    fn window(&self, row: usize, col: usize, size: usize) -> f64 {
        let top = row * self.stride;
        let bottom = (row + size) * self.stride;
        self.sums[bottom + col + size] - self.sums[top + col + size] - self.sums[bottom + col]
            + self.sums[top + col]
    }
}
