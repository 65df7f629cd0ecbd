use glyph_trace_classifier::ClassifierError;
use glyph_trace_comparator::CompareError;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::request::RequestError;
use crate::settings::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("this build has no classifier backend; enable the `classifier-onnx` feature")]
    ClassifierUnavailable,
}
