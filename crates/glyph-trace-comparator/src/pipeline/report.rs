use serde::{Deserialize, Serialize};

use crate::combine::combine;

/// Scores for one template/candidate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub ssim: f64,
    pub iou: f64,
    pub hausdorff_norm: f64,
    /// Weighted blend of the three metrics; not clamped, so a strongly
    /// anti-correlated pair can fall below zero.
    pub combined: f64,
}

impl MetricReport {
    pub fn from_metrics(ssim: f64, iou: f64, hausdorff_norm: f64) -> Self {
        Self {
            ssim,
            iou,
            hausdorff_norm,
            combined: combine(ssim, iou, hausdorff_norm),
        }
    }

    pub fn passes(&self, threshold: f64) -> bool {
        self.combined >= threshold
    }
}
