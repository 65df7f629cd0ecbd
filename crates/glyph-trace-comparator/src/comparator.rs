use glyph_trace_types::{BinaryMask, GrayImage, Shape};
use tracing::debug;

use crate::error::{CompareError, ensure_same_shape};
use crate::metrics::{hausdorff_normalized, intersection_over_union, structural_similarity};
use crate::pipeline::{Binarizer, MetricReport};
use crate::settings::ComparatorSettings;

/// Scores a candidate glyph against a template glyph.
///
/// The template defines the frame: with no explicit target it keeps its own
/// shape and the candidate is resampled onto it, never the reverse.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphComparator {
    binarizer: Binarizer,
}

impl GlyphComparator {
    pub fn new(settings: ComparatorSettings) -> Self {
        Self {
            binarizer: Binarizer::new(settings),
        }
    }

    pub fn binarize_pair(
        &self,
        template: &GrayImage,
        candidate: &GrayImage,
        target: Option<Shape>,
    ) -> Result<(BinaryMask, BinaryMask), CompareError> {
        let frame = target.unwrap_or(template.shape());
        let (template_mask, candidate_mask) = rayon::join(
            || self.binarizer.binarize(template, Some(frame)),
            || self.binarizer.binarize(candidate, Some(frame)),
        );
        Ok((template_mask?, candidate_mask?))
    }

    pub fn compare(
        &self,
        template: &GrayImage,
        candidate: &GrayImage,
        target: Option<Shape>,
    ) -> Result<MetricReport, CompareError> {
        let (template_mask, candidate_mask) = self.binarize_pair(template, candidate, target)?;
        self.compare_masks(&template_mask, &candidate_mask)
    }

    pub fn compare_masks(
        &self,
        template: &BinaryMask,
        candidate: &BinaryMask,
    ) -> Result<MetricReport, CompareError> {
        ensure_same_shape("compare", template.shape(), candidate.shape())?;
        let (ssim, (iou, hausdorff)) = rayon::join(
            || structural_similarity(template, candidate),
            || {
                rayon::join(
                    || intersection_over_union(template, candidate),
                    || hausdorff_normalized(template, candidate),
                )
            },
        );
        let report = MetricReport::from_metrics(ssim?, iou?, hausdorff?);
        debug!(
            shape = %template.shape(),
            template_ink = template.count_ones(),
            candidate_ink = candidate.count_ones(),
            ssim = report.ssim,
            iou = report.iou,
            hausdorff_norm = report.hausdorff_norm,
            combined = report.combined,
            "compared glyph masks"
        );
        Ok(report)
    }
}
