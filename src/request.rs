use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRequest {
    image: Option<String>,
    expected: Option<String>,
}

/// Body of a prediction request: a base64 or `data:` URL image and an
/// optional expected label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest {
    pub image: String,
    pub expected: Option<String>,
}

impl PredictRequest {
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        let raw: RawRequest =
            serde_json::from_str(body).map_err(|err| RequestError::InvalidInput {
                message: format!("body is not a JSON object: {err}"),
            })?;
        let image = raw
            .image
            .filter(|image| !image.trim().is_empty())
            .ok_or_else(|| RequestError::InvalidInput {
                message: "provide 'image' (base64) in JSON body".to_string(),
            })?;
        Ok(Self {
            image,
            expected: raw.expected,
        })
    }
}
