use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use super::PhotoError;

/// Prefix of every image produced by `compress`
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Downscale and re-encode a photo into an embeddable JPEG data URL
///
/// # Arguments
/// * `raw` - Encoded image bytes in any format `image` can decode
/// * `max_dimension` - Upper bound for the longer side; smaller images are not upscaled
/// * `quality` - JPEG quality between 0.0 and 1.0
pub fn compress(raw: &[u8], max_dimension: u32, quality: f32) -> Result<String, PhotoError> {
    let img = image::load_from_memory(raw).map_err(|e| PhotoError::Decode(e.to_string()))?;

    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality(quality))
        .encode_image(&rgb)
        .map_err(|e| PhotoError::Encode(e.to_string()))?;

    tracing::debug!(
        width = rgb.width(),
        height = rgb.height(),
        bytes = jpeg.len(),
        "Photo compressed"
    );

    Ok(format!("{}{}", JPEG_DATA_URL_PREFIX, STANDARD.encode(&jpeg)))
}

/// Map a 0.0-1.0 quality onto the encoder's 1-100 scale
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// The base64 part of a data URL, or the whole string if it has no prefix
pub fn base64_payload(image: &str) -> &str {
    match image.split_once("base64,") {
        Some((_, payload)) => payload,
        None => image,
    }
}

/// Decode the bytes of an embedded `data:` image
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, PhotoError> {
    if !is_data_url(url) || !url.contains("base64,") {
        return Err(PhotoError::NotEmbedded);
    }

    STANDARD
        .decode(base64_payload(url))
        .map_err(|e| PhotoError::Decode(e.to_string()))
}

pub fn is_data_url(url: &str) -> bool {
    url.starts_with("data:")
}
