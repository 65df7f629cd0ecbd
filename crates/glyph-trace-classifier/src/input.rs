use crate::error::ClassifierError;

/// Square edge length the bundled glyph model was trained on.
pub const DEFAULT_INPUT_SIDE: usize = 64;
const CHANNELS: usize = 3;

/// One RGB image laid out as an NHWC `f32` tensor with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    side: usize,
    data: Vec<f32>,
}

impl ModelInput {
    /// Resizes interleaved 8-bit RGB pixels to `side × side` with bilinear
    /// sampling and scales them to `[0, 1]`.
    pub fn from_rgb(
        pixels: &[u8],
        width: usize,
        height: usize,
        side: usize,
    ) -> Result<Self, ClassifierError> {
        if width == 0 || height == 0 || side == 0 {
            return Err(ClassifierError::invalid_input(format!(
                "image {width}x{height} cannot be resized to {side}x{side}"
            )));
        }
        let expected = width * height * CHANNELS;
        if pixels.len() != expected {
            return Err(ClassifierError::invalid_input(format!(
                "rgb buffer has {} bytes, expected {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            side,
            data: resize_bilinear_rgb(pixels, width, height, side, side),
        })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Tensor dimensions as `[batch, height, width, channels]`.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.side, self.side, CHANNELS]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

fn resize_bilinear_rgb(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    let mut out = vec![0.0f32; dst_width * dst_height * CHANNELS];
    let scale_x = if dst_width > 1 {
        (src_width - 1) as f32 / (dst_width - 1) as f32
    } else {
        0.0
    };
    let scale_y = if dst_height > 1 {
        (src_height - 1) as f32 / (dst_height - 1) as f32
    } else {
        0.0
    };

    for dy in 0..dst_height {
        let fy = scale_y * dy as f32;
        let y0 = (fy.floor() as usize).min(src_height - 1);
        let y1 = (y0 + 1).min(src_height - 1);
        let wy = fy - y0 as f32;
        for dx in 0..dst_width {
            let fx = scale_x * dx as f32;
            let x0 = (fx.floor() as usize).min(src_width - 1);
            let x1 = (x0 + 1).min(src_width - 1);
            let wx = fx - x0 as f32;
            for channel in 0..CHANNELS {
                let sample =
                    |y: usize, x: usize| src[(y * src_width + x) * CHANNELS + channel] as f32;
                let top = sample(y0, x0) + (sample(y0, x1) - sample(y0, x0)) * wx;
                let bottom = sample(y1, x0) + (sample(y1, x1) - sample(y1, x0)) * wx;
                let value = top + (bottom - top) * wy;
                out[(dy * dst_width + dx) * CHANNELS + channel] = (value / 255.0).clamp(0.0, 1.0);
            }
        }
    }
    out
}
