//! Shared grid types for the glyph-trace workspace.
//!
//! This crate holds the lightweight pixel containers used by the comparator,
//! classifier, and CLI crates. The element type of a [`Grid`] carries its
//! value-range convention (see [`Sample`]), so metric code can state range
//! preconditions in signatures rather than by convention. Keep it free of
//! image codecs and numeric backends.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

/// 8-bit intensity samples in `[0, 255]`.
pub type GrayImage = Grid<u8>;

/// Ink mask; `true` marks foreground.
pub type BinaryMask = Grid<bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub height: usize,
    pub width: usize,
}

impl Shape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the image diagonal, `sqrt(H² + W²)`.
    pub fn diagonal(&self) -> f64 {
        let h = self.height as f64;
        let w = self.width as f64;
        (h * h + w * w).sqrt()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Pixel element with a known numeric span.
///
/// `DATA_RANGE` is the distance between the darkest and brightest value the
/// element can represent once promoted with [`Sample::value`].
pub trait Sample: Copy + Send + Sync + 'static {
    const DATA_RANGE: f64;

    fn value(self) -> f64;
}

impl Sample for u8 {
    const DATA_RANGE: f64 = 255.0;

    fn value(self) -> f64 {
        self as f64
    }
}

impl Sample for bool {
    const DATA_RANGE: f64 = 1.0;

    fn value(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

/// Normalized sample in `[0, 1]`.
impl Sample for f32 {
    const DATA_RANGE: f64 = 1.0;

    fn value(self) -> f64 {
        self as f64
    }
}

/// Immutable row-major pixel grid.
#[derive(Clone, PartialEq)]
pub struct Grid<T> {
    shape: Shape,
    data: Arc<[T]>,
}

impl<T> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("height", &self.shape.height)
            .field("width", &self.shape.width)
            .field("samples", &self.data.len())
            .finish()
    }
}

impl<T> Grid<T> {
    pub fn from_vec(shape: Shape, data: Vec<T>) -> GridResult<Self> {
        if shape.is_empty() {
            return Err(GridError::InvalidDimensions {
                height: shape.height,
                width: shape.width,
            });
        }
        if data.len() != shape.len() {
            return Err(GridError::LengthMismatch {
                shape,
                expected: shape.len(),
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn from_fn(shape: Shape, mut f: impl FnMut(usize, usize) -> T) -> GridResult<Self> {
        let mut data = Vec::with_capacity(shape.len());
        for y in 0..shape.height {
            for x in 0..shape.width {
                data.push(f(y, x));
            }
        }
        Self::from_vec(shape, data)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, y: usize, x: usize) -> Option<&T> {
        if y >= self.shape.height || x >= self.shape.width {
            return None;
        }
        self.data.get(y * self.shape.width + x)
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(shape: Shape, value: T) -> GridResult<Self> {
        Self::from_vec(shape, vec![value; shape.len()])
    }
}

impl<T: Sample> Grid<T> {
    /// Promotes every sample to `f64` while keeping the shape.
    pub fn to_f64(&self) -> Grid<f64> {
        Grid {
            shape: self.shape,
            data: self.data.iter().map(|&v| v.value()).collect(),
        }
    }
}

impl Grid<bool> {
    pub fn count_ones(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_blank(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Row/column coordinates of every foreground pixel, row-major order.
    pub fn foreground_points(&self) -> Vec<(usize, usize)> {
        let width = self.shape.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(idx, _)| (idx / width, idx % width))
            .collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {height}x{width})")]
    InvalidDimensions { height: usize, width: usize },

    #[error("grid {shape} needs {expected} samples, got {actual}")]
    LengthMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },
}
