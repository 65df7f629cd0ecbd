use rayon::prelude::*;

use glyph_trace_types::BinaryMask;

use crate::error::{CompareError, ensure_same_shape};
use crate::pipeline::ops::should_parallel;

/// `|A ∧ B| / |A ∨ B|`. Two blank masks are identical, so an empty union scores `1.0`.
pub fn intersection_over_union(a: &BinaryMask, b: &BinaryMask) -> Result<f64, CompareError> {
    ensure_same_shape("iou", a.shape(), b.shape())?;
    let (intersection, union) = reduce_overlap(a.data(), b.data());
    if union == 0 {
        return Ok(1.0);
    }
    Ok(intersection as f64 / union as f64)
}

fn reduce_overlap(a: &[bool], b: &[bool]) -> (usize, usize) {
    let count = |(&x, &y): (&bool, &bool)| ((x && y) as usize, (x || y) as usize);
    if should_parallel(a.len()) {
        a.par_iter()
            .zip(b.par_iter())
            .map(count)
            .reduce(|| (0usize, 0usize), |l, r| (l.0 + r.0, l.1 + r.1))
    } else {
        a.iter()
            .zip(b.iter())
            .map(count)
            .fold((0usize, 0usize), |acc, v| (acc.0 + v.0, acc.1 + v.1))
    }
}
