pub const SSIM_WEIGHT: f64 = 0.55;
pub const IOU_WEIGHT: f64 = 0.30;
pub const BOUNDARY_WEIGHT: f64 = 0.15;

/// Fixed-weight blend of the three metrics. The result is left unclamped.
pub fn combine(ssim: f64, iou: f64, hausdorff_norm: f64) -> f64 {
    SSIM_WEIGHT * ssim + IOU_WEIGHT * iou + BOUNDARY_WEIGHT * (1.0 - hausdorff_norm)
}
