use std::fs;
use std::path::Path;

use glyph_trace::cli::parse_cli_from;
use glyph_trace::settings::{ConfigError, resolve_settings};
use glyph_trace_comparator::ThresholdMethod;
use glyph_trace_types::Shape;

fn write_config(dir: &Path, contents: &str) -> String {
    let path = dir.join("glyph-trace.toml");
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn file_values_replace_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
pretty = true

[compare]
threshold = "120"
opening_radius = 2
target_size = "32x48"
pass_threshold = 0.7

[classify]
model = "models/glyphs.onnx"
labels = "models/classes.json"
top_k = 5
"#,
    );
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    let settings = resolve_settings(&cli, &sources).unwrap();

    assert!(settings.pretty);
    assert_eq!(
        settings.compare.comparator.threshold,
        ThresholdMethod::Fixed(120)
    );
    assert_eq!(settings.compare.comparator.opening_radius, 2);
    assert_eq!(settings.compare.target, Some(Shape::new(32, 48)));
    assert_eq!(settings.compare.pass_threshold, Some(0.7));
    assert_eq!(settings.classify.top_k, 5);
    assert_eq!(settings.classify.input_size, 64);
    assert_eq!(
        settings.classify.model,
        dir.path().join("models/glyphs.onnx")
    );
    assert_eq!(
        settings.classify.labels,
        dir.path().join("models/classes.json")
    );
}

#[test]
fn command_line_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[compare]
threshold = "120"
opening_radius = 2
target_size = "32x48"

[classify]
top_k = 5
input_size = 96
"#,
    );
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--threshold",
        "otsu",
        "--opening-radius",
        "1",
        "--target-size",
        "16x16",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    let settings = resolve_settings(&cli, &sources).unwrap();
    assert_eq!(settings.compare.comparator.threshold, ThresholdMethod::Otsu);
    assert_eq!(settings.compare.comparator.opening_radius, 1);
    assert_eq!(settings.compare.target, Some(Shape::new(16, 16)));

    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "classify",
        "glyph.png",
        "--top-k",
        "3",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    let settings = resolve_settings(&cli, &sources).unwrap();
    assert_eq!(settings.classify.top_k, 3);
    assert_eq!(settings.classify.input_size, 96);
    assert!(!settings.pretty);
}

#[test]
fn invalid_file_values_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[compare]\nthreshold = \"adaptive\"\n");
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    match resolve_settings(&cli, &sources) {
        Err(ConfigError::InvalidValue { field, value, .. }) => {
            assert_eq!(field, "compare.threshold");
            assert_eq!(value, "adaptive");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let config = write_config(dir.path(), "[classify]\ntop_k = 0\n");
    let (cli, sources) =
        parse_cli_from(["glyph-trace", "classify", "g.png", "--config", config.as_str()])
            .unwrap();
    let err = resolve_settings(&cli, &sources).unwrap_err();
    assert!(err.to_string().contains("classify.top_k"), "{err}");

    let config = write_config(dir.path(), "[compare]\ntarget_size = \"0x10\"\n");
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    assert!(matches!(
        resolve_settings(&cli, &sources),
        Err(ConfigError::InvalidValue {
            field: "compare.target_size",
            ..
        })
    ));
}

#[test]
fn malformed_and_missing_config_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[compare\nthreshold = ");
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    assert!(matches!(
        resolve_settings(&cli, &sources),
        Err(ConfigError::Parse { .. })
    ));

    let missing = dir.path().join("absent.toml").display().to_string();
    let (cli, sources) =
        parse_cli_from(["glyph-trace", "compare", "t.png", "c.png", "--config", missing.as_str()])
            .unwrap();
    assert!(matches!(
        resolve_settings(&cli, &sources),
        Err(ConfigError::NotFound { .. })
    ));
}

#[test]
fn command_line_rejects_bad_values() {
    assert!(
        parse_cli_from(["glyph-trace", "compare", "t.png", "c.png", "--target-size", "64"]).is_err()
    );
    assert!(
        parse_cli_from(["glyph-trace", "compare", "t.png", "c.png", "--threshold", "999"]).is_err()
    );
    assert!(parse_cli_from(["glyph-trace", "classify"]).is_err());
    assert!(
        parse_cli_from(["glyph-trace", "classify", "g.png", "--request", "body.json"]).is_err()
    );
}

#[test]
fn config_errors_carry_path_and_cause() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[compare\n");
    let (cli, sources) = parse_cli_from([
        "glyph-trace",
        "compare",
        "t.png",
        "c.png",
        "--config",
        config.as_str(),
    ])
    .unwrap();
    let err = resolve_settings(&cli, &sources).unwrap_err();
    assert!(err.to_string().starts_with("failed to parse config file"), "{err}");
    assert!(err.to_string().contains("glyph-trace.toml"), "{err}");
    assert!(std::error::Error::source(&err).is_some());

    let config = write_config(dir.path(), "[classify]\ninput_size = 0\n");
    let (cli, sources) =
        parse_cli_from(["glyph-trace", "classify", "g.png", "--config", config.as_str()])
            .unwrap();
    let err = resolve_settings(&cli, &sources).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("invalid value '0' for 'classify.input_size' in {config}")
    );
    assert!(std::error::Error::source(&err).is_none());

    let (cli, sources) =
        parse_cli_from(["glyph-trace", "classify", "g.png", "--top-k", "0"]).unwrap();
    let err = resolve_settings(&cli, &sources).unwrap_err();
    assert_eq!(err.to_string(), "invalid value '0' for 'top_k'");
}

#[test]
fn artifact_paths_expand_home_and_follow_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[classify]\nmodel = \"~/models/glyphs.onnx\"\nlabels = \"  \"\n",
    );
    let (cli, sources) =
        parse_cli_from(["glyph-trace", "classify", "g.png", "--config", config.as_str()])
            .unwrap();
    let settings = resolve_settings(&cli, &sources).unwrap();
    let home = directories::BaseDirs::new().unwrap().home_dir().to_path_buf();
    assert_eq!(settings.classify.model, home.join("models/glyphs.onnx"));
    assert_eq!(settings.classify.labels, dir.path().join("class_names.txt"));
}
