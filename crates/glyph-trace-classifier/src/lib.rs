//! Glyph classification collaborator.
//!
//! Models implement [`Classifier`]; a [`ClassifierContext`] owns a
//! [`ModelLoader`] and loads the model and its [`LabelSet`] once, on first use.

mod backends;
mod context;
mod engine;
mod error;
mod input;
mod labels;
mod ranking;
mod response;

#[cfg(feature = "engine-onnx")]
pub use backends::onnx::{OnnxClassifier, OnnxModelLoader};
pub use context::{ClassifierContext, LoadedClassifier, ModelLoader};
pub use engine::Classifier;
pub use error::{Artifact, ClassifierError, ensure_artifact};
pub use input::{DEFAULT_INPUT_SIDE, ModelInput};
pub use labels::LabelSet;
pub use ranking::rank_predictions;
pub use response::{Prediction, PredictionResponse};

/// Number of ranked classes returned when the caller does not ask otherwise.
pub const DEFAULT_TOP_K: usize = 3;

#[cfg(test)]
mod tests;
