pub mod boundary;
pub mod overlap;
pub mod structural;

pub use boundary::{directed_hausdorff, hausdorff_distance, hausdorff_normalized};
pub use overlap::intersection_over_union;
pub use structural::{structural_similarity, structural_similarity_with_range};
