use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array4, CowArray, IxDyn};
use ort::environment::Environment;
use ort::error::OrtError;
use ort::session::{Session, SessionBuilder};
use ort::value::Value;

use crate::context::{LoadedClassifier, ModelLoader};
use crate::error::{Artifact, ensure_artifact};
use crate::{Classifier, ClassifierError, LabelSet, ModelInput};

/// Glyph classifier backed by an ONNX Runtime session.
#[derive(Debug)]
pub struct OnnxClassifier {
    _environment: Arc<Environment>,
    session: Session,
    input_side: usize,
}

impl OnnxClassifier {
    pub fn new(model_path: &Path, input_side: usize) -> Result<Self, ClassifierError> {
        ensure_artifact(Artifact::Model, model_path)?;
        let environment = Environment::builder()
            .with_name("glyph-trace")
            .build()
            .map_err(map_environment_error)?;
        let environment = Arc::new(environment);
        let session = SessionBuilder::new(&environment)
            .map_err(map_session_error)?
            .with_model_from_file(model_path)
            .map_err(map_session_error)?;
        Ok(Self {
            _environment: environment,
            session,
            input_side,
        })
    }

    fn run_model(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let allocator = self.session.allocator();
        let input_dyn: CowArray<'_, f32, IxDyn> = CowArray::from(input.view().into_dyn());
        let tensor = Value::from_array(allocator, &input_dyn).map_err(map_input_error)?;
        let outputs = self.session.run(vec![tensor]).map_err(map_inference_error)?;
        let tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::backend("onnx model produced no output"))?
            .try_extract::<f32>()
            .map_err(map_inference_error)?;
        let view = tensor.view();
        Ok(view.iter().copied().collect())
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn scores(&self, input: &ModelInput) -> Result<Vec<f32>, ClassifierError> {
        if input.side() != self.input_side {
            return Err(ClassifierError::invalid_input(format!(
                "model expects {side}x{side} input, got {got}x{got}",
                side = self.input_side,
                got = input.side()
            )));
        }
        let [batch, height, width, channels] = input.shape();
        let tensor = Array4::from_shape_vec((batch, height, width, channels), input.data().to_vec())
            .map_err(|err| {
                ClassifierError::backend(format!("failed to build ONNX input tensor: {err}"))
            })?;
        self.run_model(&tensor)
    }
}

/// Loads an ONNX model file and its class label list.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    model_path: PathBuf,
    labels_path: PathBuf,
    input_side: usize,
}

impl OnnxModelLoader {
    pub fn new(model_path: PathBuf, labels_path: PathBuf, input_side: usize) -> Self {
        Self {
            model_path,
            labels_path,
            input_side,
        }
    }
}

impl ModelLoader for OnnxModelLoader {
    type Model = OnnxClassifier;

    fn describe(&self) -> String {
        format!(
            "{} (labels {})",
            self.model_path.display(),
            self.labels_path.display()
        )
    }

    fn load(&self) -> Result<LoadedClassifier<OnnxClassifier>, ClassifierError> {
        // Check both artifacts before touching the runtime.
        ensure_artifact(Artifact::Model, &self.model_path)?;
        ensure_artifact(Artifact::Labels, &self.labels_path)?;
        let labels = LabelSet::load(&self.labels_path)?;
        let model = OnnxClassifier::new(&self.model_path, self.input_side)?;
        Ok(LoadedClassifier { model, labels })
    }
}

fn map_environment_error(err: OrtError) -> ClassifierError {
    map_schema_conflict(err, "failed to initialise ONNX runtime environment")
}

fn map_session_error(err: OrtError) -> ClassifierError {
    map_schema_conflict(err, "failed to load ONNX model")
}

fn map_input_error(err: OrtError) -> ClassifierError {
    ClassifierError::backend(format!("failed to prepare ONNX input: {err}"))
}

fn map_inference_error(err: OrtError) -> ClassifierError {
    ClassifierError::backend(format!("ONNX inference failed: {err}"))
}

fn map_schema_conflict(err: OrtError, context: &str) -> ClassifierError {
    let message = err.to_string();
    if message.contains("Trying to register schema with name") {
        ClassifierError::backend(format!(
            "{context}: detected ONNX Runtime schema registration conflict ({message})"
        ))
    } else {
        ClassifierError::backend(format!("{context}: {message}"))
    }
}
