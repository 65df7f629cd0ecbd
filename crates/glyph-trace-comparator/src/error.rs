use glyph_trace_types::{GridError, Shape};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompareError {
    #[error("{stage}: shape mismatch between {left} and {right}")]
    ShapeMismatch {
        stage: &'static str,
        left: Shape,
        right: Shape,
    },

    #[error("ssim data range must be positive and finite (got {0})")]
    InvalidDataRange(f64),

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub(crate) fn ensure_same_shape(
    stage: &'static str,
    left: Shape,
    right: Shape,
) -> Result<(), CompareError> {
    if left != right {
        return Err(CompareError::ShapeMismatch { stage, left, right });
    }
    Ok(())
}
