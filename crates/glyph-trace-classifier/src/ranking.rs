use crate::error::ClassifierError;
use crate::labels::LabelSet;
use crate::response::Prediction;

/// Top `top_k` labels by descending score. Equal scores keep label order.
pub fn rank_predictions(
    scores: &[f32],
    labels: &LabelSet,
    top_k: usize,
) -> Result<Vec<Prediction>, ClassifierError> {
    if scores.len() != labels.len() {
        return Err(ClassifierError::LabelMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if top_k == 0 {
        return Err(ClassifierError::invalid_input("top_k must be at least 1"));
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    Ok(order
        .into_iter()
        .take(top_k)
        .filter_map(|index| {
            labels.get(index).map(|label| Prediction {
                label: label.to_owned(),
                score: scores[index],
            })
        })
        .collect())
}
