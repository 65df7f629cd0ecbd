pub mod binarize;
pub mod ops;
pub mod report;

pub use binarize::Binarizer;
pub use report::MetricReport;
