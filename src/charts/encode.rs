//! Image encoding: raw RGB chart buffer → PNG bytes.
//!
//! PNG is lossless, which keeps thin grid lines and small annotation text
//! crisp when the chart is scaled down inside the PDF.

use crate::error::ChartError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode a `width × height` RGB8 buffer as PNG.
pub fn encode_png(width: u32, height: u32, rgb: Vec<u8>) -> Result<Vec<u8>, ChartError> {
    let len = rgb.len();
    let img = RgbImage::from_raw(width, height, rgb).ok_or(ChartError::BufferSize {
        width,
        height,
        len,
    })?;

    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    debug!("Encoded {}x{} chart → {} bytes PNG", width, height, buf.len());
    Ok(buf)
}

/// Wrap PNG bytes as a `data:` URI for HTML or JSON consumers.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
