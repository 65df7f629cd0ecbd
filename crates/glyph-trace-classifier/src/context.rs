use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::engine::Classifier;
use crate::error::ClassifierError;
use crate::input::ModelInput;
use crate::labels::LabelSet;
use crate::ranking::rank_predictions;
use crate::response::Prediction;

/// A model together with the labels its outputs are aligned to.
#[derive(Debug)]
pub struct LoadedClassifier<M> {
    pub model: M,
    pub labels: LabelSet,
}

/// Produces a ready classifier from its artifacts.
pub trait ModelLoader: Send + Sync {
    type Model: Classifier;

    fn describe(&self) -> String;

    fn load(&self) -> Result<LoadedClassifier<Self::Model>, ClassifierError>;
}

/// Caller-owned handle that loads the classifier on first use.
///
/// Loading is single-flight: concurrent callers wait for the in-flight load
/// instead of starting another. A failed load is returned to every waiter
/// that attempted it and leaves the context empty, so a later call retries.
pub struct ClassifierContext<L: ModelLoader> {
    loader: L,
    loaded: OnceCell<LoadedClassifier<L::Model>>,
}

impl<L: ModelLoader> ClassifierContext<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            loaded: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn get(&self) -> Result<&LoadedClassifier<L::Model>, ClassifierError> {
        self.loaded.get_or_try_init(|| {
            let started = Instant::now();
            info!(source = %self.loader.describe(), "loading classifier");
            let loaded = self.loader.load()?;
            info!(
                model = loaded.model.name(),
                classes = loaded.labels.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "classifier ready"
            );
            Ok(loaded)
        })
    }

    pub fn classify(
        &self,
        input: &ModelInput,
        top_k: usize,
    ) -> Result<Vec<Prediction>, ClassifierError> {
        let loaded = self.get()?;
        let scores = loaded.model.scores(input)?;
        rank_predictions(&scores, &loaded.labels, top_k)
    }
}
