use crate::error::ClassifierError;
use crate::input::ModelInput;

/// Common interface for glyph classification models.
///
/// `scores` returns one probability per class, index-aligned with the label
/// set the model was trained with.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn scores(&self, input: &ModelInput) -> Result<Vec<f32>, ClassifierError>;
}
