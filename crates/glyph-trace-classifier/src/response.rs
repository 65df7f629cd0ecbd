use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// One ranked class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Classification outcome in the shape clients of the prediction endpoint expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted: String,
    pub score: f32,
    /// Present only when the caller supplied an expected label.
    pub correct: Option<bool>,
    pub predictions: Vec<Prediction>,
}

impl PredictionResponse {
    /// `correct` compares the trimmed labels exactly (case-sensitive). An
    /// empty expected label counts as absent.
    pub fn from_predictions(
        predictions: Vec<Prediction>,
        expected: Option<&str>,
    ) -> Result<Self, ClassifierError> {
        let top = predictions
            .first()
            .ok_or_else(|| ClassifierError::invalid_input("no predictions to report"))?;
        let predicted = top.label.clone();
        let score = top.score;
        let correct = expected
            .filter(|label| !label.is_empty())
            .map(|label| label.trim() == predicted.trim());
        Ok(Self {
            predicted,
            score,
            correct,
            predictions,
        })
    }
}
