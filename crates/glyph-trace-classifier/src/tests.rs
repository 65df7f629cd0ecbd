use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::{
    Artifact, Classifier, ClassifierContext, ClassifierError, LabelSet, LoadedClassifier,
    ModelInput, ModelLoader, Prediction, PredictionResponse, rank_predictions,
};

fn labels(names: &[&str]) -> LabelSet {
    LabelSet::new(names.iter().map(|name| name.to_string()).collect()).unwrap()
}

struct FixedScores(Vec<f32>);

impl Classifier for FixedScores {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn scores(&self, _: &ModelInput) -> Result<Vec<f32>, ClassifierError> {
        Ok(self.0.clone())
    }
}

/// Counts loads and can be told to fail the first few attempts.
struct CountingLoader {
    loads: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl CountingLoader {
    fn new(loads: Arc<AtomicUsize>) -> Self {
        Self {
            loads,
            failures_left: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
        }
    }
}

impl ModelLoader for CountingLoader {
    type Model = FixedScores;

    fn describe(&self) -> String {
        "counting".to_string()
    }

    fn load(&self) -> Result<LoadedClassifier<FixedScores>, ClassifierError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(ClassifierError::ArtifactMissing {
                artifact: Artifact::Model,
                path: PathBuf::from("missing.onnx"),
            });
        }
        Ok(LoadedClassifier {
            model: FixedScores(vec![0.1, 0.7, 0.2]),
            labels: labels(&["a", "ba", "ka"]),
        })
    }
}

fn sample_input() -> ModelInput {
    ModelInput::from_rgb(&[255u8; 2 * 2 * 3], 2, 2, 4).unwrap()
}

#[test]
fn ranking_orders_by_descending_score() {
    let set = labels(&["a", "i", "u", "e"]);
    let ranked = rank_predictions(&[0.1, 0.5, 0.05, 0.35], &set, 3).unwrap();
    let names: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(names, vec!["i", "e", "a"]);
    assert_eq!(ranked[0].score, 0.5);
}

#[test]
fn ranking_keeps_label_order_for_ties_and_caps_top_k() {
    let set = labels(&["x", "y", "z"]);
    let ranked = rank_predictions(&[0.25, 0.5, 0.25], &set, 10).unwrap();
    let names: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(names, vec!["y", "x", "z"]);
}

#[test]
fn ranking_rejects_misaligned_scores() {
    let set = labels(&["x", "y"]);
    let err = rank_predictions(&[0.1, 0.2, 0.7], &set, 1).unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::LabelMismatch {
            labels: 2,
            scores: 3
        }
    ));
    assert!(matches!(
        rank_predictions(&[0.1, 0.9], &set, 0),
        Err(ClassifierError::InvalidInput { .. })
    ));
}

#[test]
fn labels_parse_text_and_json() {
    let text = LabelSet::from_text("a\n  ba \n\nka\n").unwrap();
    assert_eq!(text.iter().collect::<Vec<_>>(), vec!["a", "ba", "ka"]);
    let json = LabelSet::from_json(r#"["a", "ba"]"#).unwrap();
    assert_eq!(json.len(), 2);
    assert_eq!(json.get(1), Some("ba"));
    assert!(LabelSet::from_text("\n\n").is_err());
    assert!(LabelSet::from_json("{}").is_err());
}

#[test]
fn labels_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let text_path = dir.path().join("classes.txt");
    std::fs::write(&text_path, "a\nba\n").unwrap();
    let json_path = dir.path().join("classes.json");
    std::fs::write(&json_path, r#"["ka", "ga", "nga"]"#).unwrap();

    assert_eq!(LabelSet::load(&text_path).unwrap().len(), 2);
    assert_eq!(LabelSet::load(&json_path).unwrap().get(2), Some("nga"));
}

#[test]
fn missing_label_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    match LabelSet::load(&path) {
        Err(ClassifierError::ArtifactMissing { artifact, path: reported }) => {
            assert_eq!(artifact, Artifact::Labels);
            assert_eq!(reported, path);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    let message = LabelSet::load(&path).unwrap_err().to_string();
    assert!(message.contains("absent.txt"), "{message}");
}

#[test]
fn model_input_is_nhwc_and_normalized() {
    #[rustfmt::skip]
    let pixels = [
        0, 0, 0,       255, 255, 255,
        255, 0, 0,     0, 0, 255,
    ];
    let input = ModelInput::from_rgb(&pixels, 2, 2, 2).unwrap();
    assert_eq!(input.shape(), [1, 2, 2, 3]);
    assert_eq!(input.data()[..3], [0.0, 0.0, 0.0]);
    assert_eq!(input.data()[3..6], [1.0, 1.0, 1.0]);
    assert_eq!(input.data()[6..9], [1.0, 0.0, 0.0]);

    let upscaled = ModelInput::from_rgb(&pixels, 2, 2, 64).unwrap();
    assert_eq!(upscaled.data().len(), 64 * 64 * 3);
    assert!(upscaled.data().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn model_input_rejects_bad_buffers() {
    assert!(matches!(
        ModelInput::from_rgb(&[0u8; 5], 2, 1, 8),
        Err(ClassifierError::InvalidInput { .. })
    ));
    assert!(ModelInput::from_rgb(&[], 0, 0, 8).is_err());
}

#[test]
fn context_loads_once_across_threads() {
    let loads = Arc::new(AtomicUsize::new(0));
    let context = Arc::new(ClassifierContext::new(CountingLoader::new(loads.clone())));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context.get().map(|loaded| loaded.labels.len())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(context.is_loaded());
}

#[test]
fn failed_load_is_reported_and_retried() {
    let loads = Arc::new(AtomicUsize::new(0));
    let mut loader = CountingLoader::new(loads.clone());
    loader.failures_left = AtomicUsize::new(1);
    loader.delay = Duration::ZERO;
    let context = ClassifierContext::new(loader);

    assert!(matches!(
        context.get(),
        Err(ClassifierError::ArtifactMissing { .. })
    ));
    assert!(!context.is_loaded());
    assert!(context.get().is_ok());
    assert!(context.get().is_ok());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn context_classifies_with_ranked_labels() {
    let context = ClassifierContext::new(CountingLoader::new(Arc::new(AtomicUsize::new(0))));
    let ranked = context.classify(&sample_input(), 2).unwrap();
    assert_eq!(
        ranked,
        vec![
            Prediction {
                label: "ba".into(),
                score: 0.7
            },
            Prediction {
                label: "ka".into(),
                score: 0.2
            },
        ]
    );
}

#[test]
fn response_checks_expected_label_exactly() {
    let predictions = vec![
        Prediction {
            label: "ba ".into(),
            score: 0.8,
        },
        Prediction {
            label: "pa".into(),
            score: 0.1,
        },
    ];
    let hit = PredictionResponse::from_predictions(predictions.clone(), Some(" ba")).unwrap();
    assert_eq!(hit.predicted, "ba ");
    assert_eq!(hit.score, 0.8);
    assert_eq!(hit.correct, Some(true));

    let miss = PredictionResponse::from_predictions(predictions.clone(), Some("BA")).unwrap();
    assert_eq!(miss.correct, Some(false));

    let none = PredictionResponse::from_predictions(predictions.clone(), None).unwrap();
    assert_eq!(none.correct, None);
    let empty = PredictionResponse::from_predictions(predictions, Some("")).unwrap();
    assert_eq!(empty.correct, None);

    assert!(PredictionResponse::from_predictions(Vec::new(), None).is_err());
}

#[test]
fn response_serializes_null_correctness() {
    let response = PredictionResponse::from_predictions(
        vec![Prediction {
            label: "a".into(),
            score: 0.5,
        }],
        None,
    )
    .unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert!(value["correct"].is_null());
    assert_eq!(value["predicted"], "a");
    assert_eq!(value["predictions"][0]["label"], "a");
}

#[cfg(feature = "engine-onnx")]
#[test]
fn onnx_loader_reports_missing_artifacts() {
    use crate::OnnxModelLoader;

    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("glyphs.onnx");
    let classes = dir.path().join("classes.txt");

    let loader = OnnxModelLoader::new(model.clone(), classes.clone(), 64);
    match loader.load() {
        Err(ClassifierError::ArtifactMissing { artifact, path }) => {
            assert_eq!(artifact, Artifact::Model);
            assert_eq!(path, model);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    std::fs::write(&model, b"not a real model").unwrap();
    match loader.load() {
        Err(ClassifierError::ArtifactMissing { artifact, path }) => {
            assert_eq!(artifact, Artifact::Labels);
            assert_eq!(path, classes);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}
