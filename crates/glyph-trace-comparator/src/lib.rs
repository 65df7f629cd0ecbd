//! Glyph similarity scoring with flat, easy-to-import modules.
//!
//! [`GlyphComparator`] binarizes a template and a candidate image, then scores
//! the mask pair with IoU, SSIM, and a normalized Hausdorff distance blended
//! by [`combine`]. The metric functions are also usable on their own.

pub mod combine;
pub mod comparator;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod settings;

pub use combine::{BOUNDARY_WEIGHT, IOU_WEIGHT, SSIM_WEIGHT, combine};
pub use comparator::GlyphComparator;
pub use error::CompareError;
pub use metrics::{
    directed_hausdorff, hausdorff_distance, hausdorff_normalized, intersection_over_union,
    structural_similarity, structural_similarity_with_range,
};
pub use pipeline::{Binarizer, MetricReport};
pub use settings::{
    ComparatorSettings, DEFAULT_OPENING_RADIUS, ThresholdMethod, ThresholdParseError,
};
