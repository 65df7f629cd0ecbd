use std::fmt;
use std::str::FromStr;

pub const DEFAULT_OPENING_RADIUS: usize = 1;

/// How the binarizer picks the ink/background cut-off.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ThresholdMethod {
    #[default]
    Otsu,
    Fixed(u8),
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdMethod::Otsu => f.write_str("otsu"),
            ThresholdMethod::Fixed(value) => write!(f, "fixed:{value}"),
        }
    }
}

#[derive(Debug)]
pub struct ThresholdParseError(pub String);

impl fmt::Display for ThresholdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown threshold '{}' (expected 'otsu' or a level 0-255)",
            self.0
        )
    }
}

impl std::error::Error for ThresholdParseError {}

impl FromStr for ThresholdMethod {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "otsu" {
            return Ok(ThresholdMethod::Otsu);
        }
        let level = lower.strip_prefix("fixed:").unwrap_or(&lower);
        level
            .trim()
            .parse::<u8>()
            .map(ThresholdMethod::Fixed)
            .map_err(|_| ThresholdParseError(lower.clone()))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ComparatorSettings {
    pub threshold: ThresholdMethod,
    /// Half-width of the square structuring element used for opening; 0 disables cleanup.
    pub opening_radius: usize,
}

impl Default for ComparatorSettings {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Otsu,
            opening_radius: DEFAULT_OPENING_RADIUS,
        }
    }
}
