use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use glyph_trace_classifier::{DEFAULT_INPUT_SIDE, DEFAULT_TOP_K};
use glyph_trace_comparator::{ComparatorSettings, DEFAULT_OPENING_RADIUS, ThresholdMethod};
use glyph_trace_types::Shape;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::{ClassifyArgs, CliArgs, CliSources, Command, CompareArgs, parse_shape};

const CONFIG_FILE_NAME: &str = "glyph-trace.toml";
const DEFAULT_MODEL_FILE: &str = "glyph_model.onnx";
const DEFAULT_LABELS_FILE: &str = "class_names.txt";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    pretty: Option<bool>,
    compare: Option<CompareFileConfig>,
    classify: Option<ClassifyFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompareFileConfig {
    threshold: Option<String>,
    opening_radius: Option<usize>,
    target_size: Option<String>,
    pass_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClassifyFileConfig {
    model: Option<String>,
    labels: Option<String>,
    top_k: Option<usize>,
    input_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub compare: CompareSettings,
    pub classify: ClassifySettings,
    pub pretty: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub comparator: ComparatorSettings,
    pub target: Option<Shape>,
    pub pass_threshold: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ClassifySettings {
    pub model: PathBuf,
    pub labels: PathBuf,
    pub top_k: usize,
    pub input_size: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for '{field}'{}", location(.path.as_deref()))]
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    #[error("config file {} does not exist", .path.display())]
    NotFound { path: PathBuf },
}

fn location(path: Option<&Path>) -> String {
    path.map(|path| format!(" in {}", path.display()))
        .unwrap_or_default()
}

/// Layers command-line values over the config file over built-in defaults.
///
/// The config file is `--config` when given, otherwise `./glyph-trace.toml`,
/// otherwise `config.toml` in the platform config directory.
pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    if let Some(path) = config_path.as_ref() {
        tracing::debug!(path = %path.display(), "using config file");
    }
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let config = read_config(&path)?;
        return Ok((config, Some(path)));
    }

    for candidate in [project_config_path(), default_config_path()]
        .into_iter()
        .flatten()
    {
        if candidate.exists() {
            let config = read_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }
    Ok((FileConfig::default(), None))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));

    let FileConfig {
        pretty: file_pretty,
        compare: file_compare,
        classify: file_classify,
    } = file;

    let compare_args = match &cli.command {
        Command::Compare(args) => Some(args),
        Command::Classify(_) => None,
    };
    let classify_args = match &cli.command {
        Command::Classify(args) => Some(args),
        Command::Compare(_) => None,
    };

    let compare = merge_compare(
        compare_args,
        sources,
        file_compare.unwrap_or_default(),
        config_path.as_ref(),
    )?;
    let classify = merge_classify(
        classify_args,
        sources,
        file_classify.unwrap_or_default(),
        config_path.as_ref(),
        config_dir.as_deref(),
    )?;

    Ok(EffectiveSettings {
        compare,
        classify,
        pretty: cli.pretty || file_pretty.unwrap_or(false),
        config_path,
    })
}

fn merge_compare(
    args: Option<&CompareArgs>,
    sources: &CliSources,
    file: CompareFileConfig,
    config_path: Option<&PathBuf>,
) -> Result<CompareSettings, ConfigError> {
    let mut threshold = args.map(|args| args.threshold).unwrap_or_default();
    if !sources.threshold_from_cli {
        if let Some(value) = non_empty(file.threshold) {
            threshold = value
                .parse::<ThresholdMethod>()
                .map_err(|_| invalid_value(config_path, "compare.threshold", value.clone()))?;
        }
    }

    let mut opening_radius = args.map_or(DEFAULT_OPENING_RADIUS, |args| args.opening_radius);
    if !sources.opening_radius_from_cli {
        if let Some(value) = file.opening_radius {
            opening_radius = value;
        }
    }

    let mut target = args.and_then(|args| args.target_size);
    if target.is_none() {
        if let Some(value) = non_empty(file.target_size) {
            target = Some(
                parse_shape(&value)
                    .map_err(|_| invalid_value(config_path, "compare.target_size", value.clone()))?,
            );
        }
    }

    let mut pass_threshold = args.and_then(|args| args.pass_threshold);
    if let Some(value) = pass_threshold {
        if !value.is_finite() {
            return Err(invalid_value(None, "pass_threshold", value.to_string()));
        }
    } else if let Some(value) = file.pass_threshold {
        if !value.is_finite() {
            return Err(invalid_value(
                config_path,
                "compare.pass_threshold",
                value.to_string(),
            ));
        }
        pass_threshold = Some(value);
    }

    Ok(CompareSettings {
        comparator: ComparatorSettings {
            threshold,
            opening_radius,
        },
        target,
        pass_threshold,
    })
}

fn merge_classify(
    args: Option<&ClassifyArgs>,
    sources: &CliSources,
    file: ClassifyFileConfig,
    config_path: Option<&PathBuf>,
    config_dir: Option<&Path>,
) -> Result<ClassifySettings, ConfigError> {
    let model = resolve_artifact(
        args.and_then(|args| args.model.clone()),
        file.model,
        DEFAULT_MODEL_FILE,
        config_dir,
    );
    let labels = resolve_artifact(
        args.and_then(|args| args.labels.clone()),
        file.labels,
        DEFAULT_LABELS_FILE,
        config_dir,
    );

    let mut top_k = args.map_or(DEFAULT_TOP_K, |args| args.top_k);
    if top_k == 0 {
        return Err(invalid_value(None, "top_k", "0".to_string()));
    }
    if !sources.top_k_from_cli {
        if let Some(value) = file.top_k {
            if value == 0 {
                return Err(invalid_value(config_path, "classify.top_k", value.to_string()));
            }
            top_k = value;
        }
    }

    let mut input_size = args.map_or(DEFAULT_INPUT_SIDE, |args| args.input_size);
    if input_size == 0 {
        return Err(invalid_value(None, "input_size", "0".to_string()));
    }
    if !sources.input_size_from_cli {
        if let Some(value) = file.input_size {
            if value == 0 {
                return Err(invalid_value(
                    config_path,
                    "classify.input_size",
                    value.to_string(),
                ));
            }
            input_size = value;
        }
    }

    Ok(ClassifySettings {
        model,
        labels,
        top_k,
        input_size,
    })
}

/// Command-line paths are used as given; config and default names resolve
/// against the config file's directory.
fn resolve_artifact(
    cli_value: Option<PathBuf>,
    file_value: Option<String>,
    default_name: &str,
    config_dir: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_value {
        return expand_home(&path);
    }
    let name = non_empty(file_value).unwrap_or_else(|| default_name.to_string());
    let path = expand_home(Path::new(&name));
    match config_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

fn invalid_value(path: Option<&PathBuf>, field: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        path: path.cloned(),
        field,
        value,
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "glyph-trace", "glyph-trace")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Replaces a leading `~` component with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), BaseDirs::new()) {
        (Ok(rest), Some(dirs)) if rest.as_os_str().is_empty() => dirs.home_dir().to_path_buf(),
        (Ok(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => path.to_path_buf(),
    }
}
