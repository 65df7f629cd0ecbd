use rayon::prelude::*;

use glyph_trace_types::BinaryMask;

use crate::error::{CompareError, ensure_same_shape};
use crate::pipeline::ops::{should_parallel, squared_distance_transform};

/// Hausdorff distance divided by the image diagonal and clipped to `[0, 1]`.
///
/// Two blank masks score `0.0`; a blank mask against an inked one scores `1.0`.
pub fn hausdorff_normalized(a: &BinaryMask, b: &BinaryMask) -> Result<f64, CompareError> {
    let normalized = match hausdorff_distance(a, b)? {
        Some(distance) => (distance / a.shape().diagonal()).clamp(0.0, 1.0),
        None => 1.0,
    };
    Ok(normalized)
}

/// Symmetric Hausdorff distance in pixels between the ink sets of `a` and `b`.
///
/// Each directed term reads the squared Euclidean distance transform of the
/// opposite mask at every ink pixel, so the whole metric is O(H·W) and agrees
/// exactly with the pairwise definition. `None` when exactly one mask is blank.
pub fn hausdorff_distance(a: &BinaryMask, b: &BinaryMask) -> Result<Option<f64>, CompareError> {
    ensure_same_shape("hausdorff", a.shape(), b.shape())?;
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ok(Some(0.0)),
        (true, false) | (false, true) => return Ok(None),
        (false, false) => {}
    }
    let (forward, backward) = rayon::join(|| max_sq_distance(a, b), || max_sq_distance(b, a));
    Ok(Some(forward.max(backward).sqrt()))
}

/// `max over p in from of min over q in to of |p - q|`.
///
/// A blank `from` has nothing to cover and yields `Some(0.0)`; a blank `to`
/// cannot be reached and yields `None`.
pub fn directed_hausdorff(
    from: &BinaryMask,
    to: &BinaryMask,
) -> Result<Option<f64>, CompareError> {
    ensure_same_shape("hausdorff", from.shape(), to.shape())?;
    if from.is_blank() {
        return Ok(Some(0.0));
    }
    if to.is_blank() {
        return Ok(None);
    }
    Ok(Some(max_sq_distance(from, to).sqrt()))
}

fn max_sq_distance(from: &BinaryMask, to: &BinaryMask) -> f64 {
    let field = squared_distance_transform(to.data(), to.width(), to.height());
    let source = from.data();
    let pick = |(&ink, &dist): (&bool, &f64)| if ink { dist } else { 0.0 };
    if should_parallel(source.len()) {
        source
            .par_iter()
            .zip(field.par_iter())
            .map(pick)
            .reduce(|| 0.0f64, f64::max)
    } else {
        source.iter().zip(field.iter()).map(pick).fold(0.0f64, f64::max)
    }
}
