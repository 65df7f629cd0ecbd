use glyph_trace_types::{BinaryMask, GrayImage, Shape};

use crate::error::CompareError;
use crate::settings::{ComparatorSettings, ThresholdMethod};

use super::ops::{histogram, open_binary, otsu_threshold, resize_nearest};

/// Turns dark-on-light grayscale glyphs into cleaned ink masks.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binarizer {
    settings: ComparatorSettings,
}

impl Binarizer {
    pub fn new(settings: ComparatorSettings) -> Self {
        Self { settings }
    }

    /// Level at or below which a pixel counts as ink.
    pub fn threshold_for(&self, image: &GrayImage) -> u8 {
        match self.settings.threshold {
            ThresholdMethod::Otsu => otsu_threshold(&histogram(image.data())),
            ThresholdMethod::Fixed(level) => level,
        }
    }

    /// Threshold, open, then resample to `target` when it differs from the
    /// image shape. A uniform image is all ink when black, blank otherwise.
    pub fn binarize(
        &self,
        image: &GrayImage,
        target: Option<Shape>,
    ) -> Result<BinaryMask, CompareError> {
        let shape = image.shape();
        let threshold = self.threshold_for(image);
        let raw: Vec<bool> = image
            .data()
            .iter()
            .map(|&value| value <= threshold)
            .collect();
        let cleaned = open_binary(
            &raw,
            shape.width,
            shape.height,
            self.settings.opening_radius,
        );

        let frame = target.unwrap_or(shape);
        let pixels = if frame == shape {
            cleaned
        } else {
            resize_nearest(&cleaned, shape, frame)
        };
        tracing::trace!(
            source = %shape,
            frame = %frame,
            threshold,
            "binarized glyph"
        );
        Ok(BinaryMask::from_vec(frame, pixels)?)
    }
}
