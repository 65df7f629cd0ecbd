use rayon::prelude::*;

use glyph_trace_types::Shape;

/// Stand-in for "no foreground pixel"; finite so the envelope intersections stay ordered.
const FAR: f64 = 1e20;
const PARALLEL_MIN_PIXELS: usize = 64 * 64;

pub fn histogram(pixels: &[u8]) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &value in pixels {
        hist[value as usize] += 1;
    }
    hist
}

/// Otsu's global threshold. Returns the smallest level that maximizes the
/// between-class variance of `[0, t]` against `(t, 255]`.
///
/// A histogram with fewer than two distinct levels has nothing to split and
/// yields 0, so only pure black counts as ink in a uniform image.
pub fn otsu_threshold(hist: &[u64; 256]) -> u8 {
    let total: u64 = hist.iter().sum();
    if total == 0 || hist.iter().filter(|&&count| count > 0).count() < 2 {
        return 0;
    }
    let weighted_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_variance = -1.0f64;
    let mut weight_below = 0u64;
    let mut sum_below = 0.0f64;
    for (level, &count) in hist.iter().enumerate() {
        weight_below += count;
        sum_below += level as f64 * count as f64;
        if weight_below == 0 {
            continue;
        }
        let weight_above = total - weight_below;
        if weight_above == 0 {
            break;
        }
        let w0 = weight_below as f64;
        let w1 = weight_above as f64;
        let mean_below = sum_below / w0;
        let mean_above = (weighted_total - sum_below) / w1;
        let delta = mean_below - mean_above;
        let variance = w0 * w1 * delta * delta;
        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }
    best_level
}

pub fn erode_binary(mask: &[bool], width: usize, height: usize, radius: usize) -> Vec<bool> {
    square_pass(mask, width, height, radius, true)
}

pub fn dilate_binary(mask: &[bool], width: usize, height: usize, radius: usize) -> Vec<bool> {
    square_pass(mask, width, height, radius, false)
}

/// Erosion followed by dilation with a `(2r+1)²` square element.
pub fn open_binary(mask: &[bool], width: usize, height: usize, radius: usize) -> Vec<bool> {
    if radius == 0 {
        return mask.to_vec();
    }
    let eroded = erode_binary(mask, width, height, radius);
    dilate_binary(&eroded, width, height, radius)
}

// The square element is separable: a horizontal AND/OR run followed by a vertical one.
// Neighbours outside the grid are skipped rather than padded.
fn square_pass(
    mask: &[bool],
    width: usize,
    height: usize,
    radius: usize,
    erode: bool,
) -> Vec<bool> {
    assert_eq!(mask.len(), width * height);
    if mask.is_empty() || radius == 0 {
        return mask.to_vec();
    }
    let mut tmp = vec![false; mask.len()];
    for (src_row, dst_row) in mask.chunks_exact(width).zip(tmp.chunks_exact_mut(width)) {
        for (x, slot) in dst_row.iter_mut().enumerate() {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(width - 1);
            *slot = reduce_window(src_row[lo..=hi].iter().copied(), erode);
        }
    }

    let mut output = vec![false; mask.len()];
    for y in 0..height {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(height - 1);
        for x in 0..width {
            output[y * width + x] = reduce_window((lo..=hi).map(|ky| tmp[ky * width + x]), erode);
        }
    }
    output
}

fn reduce_window(mut window: impl Iterator<Item = bool>, erode: bool) -> bool {
    if erode {
        window.all(|v| v)
    } else {
        window.any(|v| v)
    }
}

/// Nearest-neighbour resampling; source index is `floor(dst * src_len / dst_len)`.
pub fn resize_nearest<T: Copy>(pixels: &[T], from: Shape, to: Shape) -> Vec<T> {
    assert_eq!(pixels.len(), from.len());
    if from == to {
        return pixels.to_vec();
    }
    if from.is_empty() || to.is_empty() {
        return Vec::new();
    }
    let columns: Vec<usize> = (0..to.width)
        .map(|x| (x * from.width / to.width).min(from.width - 1))
        .collect();
    let mut output = Vec::with_capacity(to.len());
    for y in 0..to.height {
        let sy = (y * from.height / to.height).min(from.height - 1);
        let row = &pixels[sy * from.width..(sy + 1) * from.width];
        output.extend(columns.iter().map(|&sx| row[sx]));
    }
    output
}

/// Exact squared Euclidean distance from every pixel to the nearest `true` pixel.
///
/// Separable lower-envelope transform (Felzenszwalb & Huttenlocher): one 1-D
/// pass down every column, then one along every row, O(H·W) overall. Values are
/// integer squared distances stored as `f64`; pixels of a mask without any
/// foreground keep a huge sentinel, so callers must handle blank masks first.
pub fn squared_distance_transform(mask: &[bool], width: usize, height: usize) -> Vec<f64> {
    assert_eq!(mask.len(), width * height);
    if mask.is_empty() {
        return Vec::new();
    }
    let parallel = should_parallel(mask.len());

    let mut columns = vec![FAR; mask.len()];
    for y in 0..height {
        for x in 0..width {
            if mask[y * width + x] {
                columns[x * height + y] = 0.0;
            }
        }
    }
    transform_lines(&mut columns, height, parallel);

    let mut dist = vec![0.0f64; mask.len()];
    for x in 0..width {
        for y in 0..height {
            dist[y * width + x] = columns[x * height + y];
        }
    }
    transform_lines(&mut dist, width, parallel);
    dist
}

fn transform_lines(values: &mut [f64], line_len: usize, parallel: bool) {
    if parallel {
        values
            .par_chunks_mut(line_len)
            .for_each(|line| lower_envelope_1d(line));
    } else {
        for line in values.chunks_mut(line_len) {
            lower_envelope_1d(line);
        }
    }
}

fn lower_envelope_1d(f: &mut [f64]) {
    let n = f.len();
    if n <= 1 {
        return;
    }
    let mut vertices = vec![0usize; n];
    let mut bounds = vec![0.0f64; n + 1];
    let mut k = 0usize;
    bounds[0] = f64::NEG_INFINITY;
    bounds[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(f, q, vertices[k]);
        while s <= bounds[k] {
            k -= 1;
            s = intersect(f, q, vertices[k]);
        }
        k += 1;
        vertices[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }

    let mut output = vec![0.0f64; n];
    k = 0;
    for (q, slot) in output.iter_mut().enumerate() {
        while bounds[k + 1] < q as f64 {
            k += 1;
        }
        let offset = q as f64 - vertices[k] as f64;
        *slot = offset * offset + f[vertices[k]];
    }
    f.copy_from_slice(&output);
}

// Abscissa where the parabolas rooted at `q` and `p` cross.
fn intersect(f: &[f64], q: usize, p: usize) -> f64 {
    let (qf, pf) = (q as f64, p as f64);
    ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf))
}

pub(crate) fn should_parallel(pixels: usize) -> bool {
    pixels >= PARALLEL_MIN_PIXELS && rayon::current_num_threads() > 1
}
