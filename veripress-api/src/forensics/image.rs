//! Image forensics
//!
//! Embedded EXIF metadata and a pixel-noise statistic: variance of the
//! histogram of an edge-detected grayscale copy. The statistic is reported,
//! never converted to a verdict on its own.

use super::ForensicsError;
use ::image::{imageops, DynamicImage, ImageFormat};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

/// 3x3 Laplacian edge kernel
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Sniff the upload and confirm it is an image this build can decode
///
/// Returns the detected MIME type. Image types without a decoder here
/// (HEIC, PSD, camera RAW) are rejected the same way as non-images.
pub fn ensure_image(bytes: &[u8]) -> Result<&'static str, ForensicsError> {
    let kind = infer::get(bytes)
        .ok_or_else(|| ForensicsError::UnsupportedType("unknown".to_string()))?;
    let mime = kind.mime_type();

    if kind.matcher_type() != infer::MatcherType::Image || !is_decodable(mime) {
        return Err(ForensicsError::UnsupportedType(mime.to_string()));
    }
    Ok(mime)
}

fn is_decodable(mime: &str) -> bool {
    ImageFormat::from_mime_type(mime)
        .map(|format| format.can_read() && format.reading_enabled())
        .unwrap_or(false)
}

/// Decode image bytes
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ForensicsError> {
    ::image::load_from_memory(bytes)
        .map_err(|e| ForensicsError::Decode(format!("Failed to decode image: {}", e)))
}

/// EXIF tags of the primary image, tag name → display value
///
/// No EXIF block (or an unreadable one) yields an empty map.
pub fn extract_exif(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    let mut cursor = Cursor::new(bytes);

    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No usable EXIF data: {}", e);
            return tags;
        }
    };

    for field in exif.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
        tags.entry(field.tag.to_string())
            .or_insert_with(|| field.display_value().to_string());
    }
    tags
}

/// Variance of the 256-bin histogram of the edge-filtered grayscale image
pub fn edge_noise_variance(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let edges = imageops::filter3x3(&gray, &EDGE_KERNEL);

    let mut histogram = [0u64; 256];
    for pixel in edges.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let bins = histogram.len() as f64;
    let mean = histogram.iter().sum::<u64>() as f64 / bins;
    histogram
        .iter()
        .map(|&count| {
            let d = count as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / bins
}


#[cfg(test)]
pub(crate) mod fixtures {
    use ::image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn ascii(s: &str) -> Vec<u8> {
        let mut v = s.as_bytes().to_vec();
        v.push(0);
        v
    }

    fn ifd_entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: usize, value: usize) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&(count as u32).to_le_bytes());
        out.extend_from_slice(&(value as u32).to_le_bytes());
    }

    /// Little-endian TIFF block: IFD0 with Make/Model, Exif IFD with
    /// DateTimeOriginal. Strings must be longer than 3 characters so
    /// their values sit in the data area.
    fn camera_tiff(make: &str, model: &str, captured: &str) -> Vec<u8> {
        const ASCII: u16 = 2;
        const LONG: u16 = 4;
        let (make, model, captured) = (ascii(make), ascii(model), ascii(captured));

        let make_at = 8 + 2 + 3 * 12 + 4;
        let model_at = make_at + make.len();
        let exif_ifd_at = (model_at + model.len() + 1) & !1;
        let captured_at = exif_ifd_at + 2 + 12 + 4;

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());

        tiff.extend_from_slice(&3u16.to_le_bytes());
        ifd_entry(&mut tiff, 0x010F, ASCII, make.len(), make_at);
        ifd_entry(&mut tiff, 0x0110, ASCII, model.len(), model_at);
        ifd_entry(&mut tiff, 0x8769, LONG, 1, exif_ifd_at);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&make);
        tiff.extend_from_slice(&model);
        tiff.resize(exif_ifd_at, 0);

        tiff.extend_from_slice(&1u16.to_le_bytes());
        ifd_entry(&mut tiff, 0x9003, ASCII, captured.len(), captured_at);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&captured);
        tiff
    }

    /// Small JPEG with an EXIF APP1 segment right after SOI
    pub(crate) fn jpeg_with_camera_exif(make: &str, model: &str, captured: &str) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        }));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Jpeg(90)).unwrap();
        let jpeg = out.into_inner();

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&camera_tiff(make, model, captured));

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&[0xFF, 0xE1]);
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&jpeg[2..]);
        bytes
    }
}
