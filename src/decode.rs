//! Turns transport payloads and image files into pixel grids.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use glyph_trace_types::{GrayImage, GridError, Shape};
use image::DynamicImage;
use thiserror::Error;

/// Label used in errors for images that arrived inside a request body.
pub const REQUEST_IMAGE: &str = "request image";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {input}: {source}")]
    Io {
        input: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode base64 payload of {input}: {source}")]
    Base64 {
        input: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to decode image {input}: {source}")]
    Image {
        input: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image {input} has no pixels: {source}")]
    Empty {
        input: String,
        #[source]
        source: GridError,
    },
}

/// Drops a `data:<mime>;base64,` prefix when present.
pub fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    match trimmed.split_once(',') {
        Some((_, data)) => data,
        None => trimmed,
    }
}

pub fn decode_base64(payload: &str, input: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = strip_data_url(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| DecodeError::Base64 {
            input: input.to_string(),
            source,
        })
}

pub fn decode_image(bytes: &[u8], input: &str) -> Result<DynamicImage, DecodeError> {
    image::load_from_memory(bytes).map_err(|source| DecodeError::Image {
        input: input.to_string(),
        source,
    })
}

/// Luma conversion; any alpha channel is discarded.
pub fn gray_image(image: &DynamicImage, input: &str) -> Result<GrayImage, DecodeError> {
    let luma = image.to_luma8();
    let shape = Shape::new(luma.height() as usize, luma.width() as usize);
    GrayImage::from_vec(shape, luma.into_raw()).map_err(|source| DecodeError::Empty {
        input: input.to_string(),
        source,
    })
}

/// Interleaved 8-bit RGB pixels with their width and height.
pub fn rgb_pixels(image: &DynamicImage) -> (Vec<u8>, usize, usize) {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    (rgb.into_raw(), width as usize, height as usize)
}

pub fn gray_from_bytes(bytes: &[u8], input: &str) -> Result<GrayImage, DecodeError> {
    gray_image(&decode_image(bytes, input)?, input)
}

pub async fn read_file(path: &Path) -> Result<Vec<u8>, DecodeError> {
    tokio::fs::read(path).await.map_err(|source| DecodeError::Io {
        input: path.display().to_string(),
        source,
    })
}
