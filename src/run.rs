use std::path::Path;
use std::sync::Arc;

use glyph_trace_classifier::{ClassifierContext, ModelInput, ModelLoader, PredictionResponse};
use glyph_trace_comparator::{GlyphComparator, MetricReport};
use glyph_trace_types::Shape;
use serde::Serialize;
use tracing::info;

use crate::cli::{ClassifyArgs, CliArgs, CliSources, Command, CompareArgs};
use crate::decode::{self, REQUEST_IMAGE};
use crate::error::AppError;
use crate::request::PredictRequest;
use crate::settings::{ClassifySettings, CompareSettings, EffectiveSettings, resolve_settings};

/// JSON written by `compare`.
#[derive(Debug, Clone, Serialize)]
pub struct CompareOutput {
    pub frame: Shape,
    #[serde(flatten)]
    pub report: MetricReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

/// Where the image to classify comes from.
#[derive(Debug, Clone)]
pub enum ImageSource<'a> {
    File(&'a Path),
    Request(&'a Path),
}

/// Resolves settings, runs the selected command, and returns its JSON output.
pub async fn run(cli: CliArgs, sources: CliSources) -> Result<String, AppError> {
    let settings = resolve_settings(&cli, &sources)?;
    let value = match &cli.command {
        Command::Compare(args) => serde_json::to_value(compare(args, &settings.compare).await?)?,
        Command::Classify(args) => serde_json::to_value(classify(args, &settings).await?)?,
    };
    let rendered = if settings.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

async fn compare(
    args: &CompareArgs,
    settings: &CompareSettings,
) -> Result<CompareOutput, AppError> {
    run_compare(&args.template, &args.candidate, settings).await
}

pub async fn run_compare(
    template: &Path,
    candidate: &Path,
    settings: &CompareSettings,
) -> Result<CompareOutput, AppError> {
    let (template_bytes, candidate_bytes) =
        tokio::try_join!(decode::read_file(template), decode::read_file(candidate))?;
    let template_name = template.display().to_string();
    let candidate_name = candidate.display().to_string();
    let settings = settings.clone();

    tokio::task::spawn_blocking(move || -> Result<CompareOutput, AppError> {
        let template = decode::gray_from_bytes(&template_bytes, &template_name)?;
        let candidate = decode::gray_from_bytes(&candidate_bytes, &candidate_name)?;
        let frame = settings.target.unwrap_or(template.shape());
        let report = GlyphComparator::new(settings.comparator).compare(
            &template,
            &candidate,
            settings.target,
        )?;
        let passed = settings
            .pass_threshold
            .map(|threshold| report.passes(threshold));
        info!(
            template = %template_name,
            candidate = %candidate_name,
            combined = report.combined,
            "comparison finished"
        );
        Ok(CompareOutput {
            frame,
            report,
            passed,
        })
    })
    .await?
}

#[cfg(feature = "classifier-onnx")]
async fn classify(
    args: &ClassifyArgs,
    settings: &EffectiveSettings,
) -> Result<PredictionResponse, AppError> {
    use glyph_trace_classifier::OnnxModelLoader;

    let classify = &settings.classify;
    let context = Arc::new(ClassifierContext::new(OnnxModelLoader::new(
        classify.model.clone(),
        classify.labels.clone(),
        classify.input_size,
    )));
    let source = match (&args.image, &args.request) {
        (_, Some(request)) => ImageSource::Request(request),
        (Some(image), None) => ImageSource::File(image),
        (None, None) => {
            return Err(crate::request::RequestError::InvalidInput {
                message: "provide an image path or --request".to_string(),
            }
            .into());
        }
    };
    run_classify(context, source, args.expected.clone(), classify).await
}

#[cfg(not(feature = "classifier-onnx"))]
async fn classify(
    _: &ClassifyArgs,
    _: &EffectiveSettings,
) -> Result<PredictionResponse, AppError> {
    Err(AppError::ClassifierUnavailable)
}

/// Decodes the image, runs the model through `context`, and builds the
/// response. `expected` overrides the label carried by a request body.
pub async fn run_classify<L>(
    context: Arc<ClassifierContext<L>>,
    source: ImageSource<'_>,
    expected: Option<String>,
    settings: &ClassifySettings,
) -> Result<PredictionResponse, AppError>
where
    L: ModelLoader + 'static,
{
    let (bytes, input_name, expected) = match source {
        ImageSource::File(path) => (
            decode::read_file(path).await?,
            path.display().to_string(),
            expected,
        ),
        ImageSource::Request(path) => {
            let body = decode::read_file(path).await?;
            let request = PredictRequest::from_json(&String::from_utf8_lossy(&body))?;
            let bytes = decode::decode_base64(&request.image, REQUEST_IMAGE)?;
            (
                bytes,
                REQUEST_IMAGE.to_string(),
                expected.or(request.expected),
            )
        }
    };
    let side = settings.input_size;
    let top_k = settings.top_k;

    tokio::task::spawn_blocking(move || -> Result<PredictionResponse, AppError> {
        let image = decode::decode_image(&bytes, &input_name)?;
        let (pixels, width, height) = decode::rgb_pixels(&image);
        let input = ModelInput::from_rgb(&pixels, width, height, side)?;
        let predictions = context.classify(&input, top_k)?;
        let response = PredictionResponse::from_predictions(predictions, expected.as_deref())?;
        info!(
            input = %input_name,
            predicted = %response.predicted,
            score = response.score,
            "classification finished"
        );
        Ok(response)
    })
    .await?
}
