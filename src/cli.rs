use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use glyph_trace_classifier::{DEFAULT_INPUT_SIDE, DEFAULT_TOP_K};
use glyph_trace_comparator::{DEFAULT_OPENING_RADIUS, ThresholdMethod};
use glyph_trace_types::Shape;

/// Records which defaulted options were typed on the command line, so that
/// config file values only replace clap defaults.
#[derive(Debug, Default)]
pub struct CliSources {
    pub threshold_from_cli: bool,
    pub opening_radius_from_cli: bool,
    pub top_k_from_cli: bool,
    pub input_size_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        match matches.subcommand() {
            Some(("compare", sub)) => Self {
                threshold_from_cli: value_from_cli(sub, "threshold"),
                opening_radius_from_cli: value_from_cli(sub, "opening_radius"),
                ..Self::default()
            },
            Some(("classify", sub)) => Self {
                top_k_from_cli: value_from_cli(sub, "top_k"),
                input_size_from_cli: value_from_cli(sub, "input_size"),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    match parse_cli_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    }
}

pub fn parse_cli_from<I, T>(args: I) -> Result<(CliArgs, CliSources), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = CliArgs::command().try_get_matches_from(args)?;
    let cli = CliArgs::from_arg_matches(&matches)?;
    let sources = CliSources::from_matches(&matches);
    Ok((cli, sources))
}

/// Parses `HxW` (for example `64x64`) into a non-empty [`Shape`].
pub fn parse_shape(value: &str) -> Result<Shape, String> {
    let (height, width) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected HxW, got '{value}'"))?;
    let height: usize = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    let width: usize = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    if height == 0 || width == 0 {
        return Err(format!("dimensions must be non-zero, got '{value}'"));
    }
    Ok(Shape::new(height, width))
}

#[derive(Debug, Parser)]
#[command(
    name = "glyph-trace",
    about = "Score handwritten glyphs against templates and classify them",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON written to stdout
    #[arg(long = "pretty", global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare a candidate glyph image against a template image
    Compare(CompareArgs),
    /// Classify a glyph image with the trained model
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Reference glyph image; defines the comparison frame
    pub template: PathBuf,

    /// User-drawn glyph image
    pub candidate: PathBuf,

    /// Resample both masks to this frame instead of the template's shape
    #[arg(long = "target-size", value_name = "HxW", value_parser = parse_shape)]
    pub target_size: Option<Shape>,

    /// Ink threshold: `otsu` or a fixed level 0-255
    #[arg(long = "threshold", id = "threshold", default_value_t = ThresholdMethod::Otsu)]
    pub threshold: ThresholdMethod,

    /// Radius of the square opening element used to drop specks (0 disables)
    #[arg(
        long = "opening-radius",
        id = "opening_radius",
        default_value_t = DEFAULT_OPENING_RADIUS,
        value_parser = clap::value_parser!(usize)
    )]
    pub opening_radius: usize,

    /// Report `passed` against this combined score
    #[arg(long = "pass-threshold", value_name = "SCORE")]
    pub pass_threshold: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Image file to classify
    #[arg(required_unless_present = "request", conflicts_with = "request")]
    pub image: Option<PathBuf>,

    /// JSON request body `{ "image": "<base64>", "expected": "<label>" }`
    #[arg(long = "request", value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Expected label; overrides the one in the request body
    #[arg(long = "expected", value_name = "LABEL")]
    pub expected: Option<String>,

    /// Number of ranked classes to report
    #[arg(
        long = "top-k",
        id = "top_k",
        default_value_t = DEFAULT_TOP_K,
        value_parser = clap::value_parser!(usize)
    )]
    pub top_k: usize,

    /// ONNX model file
    #[arg(long = "model", value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Class label list, one per line or a JSON array
    #[arg(long = "labels", value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Square input edge the model expects
    #[arg(
        long = "input-size",
        id = "input_size",
        default_value_t = DEFAULT_INPUT_SIDE,
        value_parser = clap::value_parser!(usize)
    )]
    pub input_size: usize,
}
