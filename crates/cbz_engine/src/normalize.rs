use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cbz_core::SequenceNumber;
use engine_logging::engine_warn;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};

use crate::{NormalizedAsset, RawAsset};

pub const NORMALIZED_EXTENSION: &str = "jpg";

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("unsupported or corrupt image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode jpeg: {0}")]
    Encode(image::ImageError),
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("conversion task aborted: {0}")]
    Task(String),
}

/// Entry name of a normalized image, e.g. `007.jpg`.
pub fn entry_name(sequence: SequenceNumber, pad_width: usize) -> String {
    format!("{}.{NORMALIZED_EXTENSION}", sequence.padded(pad_width))
}

/// Decode `raw`, flatten transparency onto white and re-encode as JPEG next to it.
///
/// The raw file is removed whether or not conversion succeeds. `quality` is
/// clamped into `1..=100`.
pub fn normalize(
    raw: RawAsset,
    quality: u8,
    pad_width: usize,
    out_dir: &Path,
) -> Result<NormalizedAsset, ConvertError> {
    let result = convert_file(&raw, quality, pad_width, out_dir);
    if let Err(err) = fs::remove_file(&raw.path) {
        if err.kind() != io::ErrorKind::NotFound {
            engine_warn!("Failed to remove raw download {:?}: {}", raw.path, err);
        }
    }
    result
}

fn convert_file(
    raw: &RawAsset,
    quality: u8,
    pad_width: usize,
    out_dir: &Path,
) -> Result<NormalizedAsset, ConvertError> {
    let bytes = fs::read(&raw.path).map_err(|source| ConvertError::Read {
        path: raw.path.clone(),
        source,
    })?;
    let encoded = encode_jpeg(&bytes, quality)?;

    let entry_name = entry_name(raw.sequence, pad_width);
    let path = out_dir.join(&entry_name);
    fs::write(&path, &encoded).map_err(|source| ConvertError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(NormalizedAsset {
        sequence: raw.sequence,
        entry_name,
        path,
        byte_len: encoded.len() as u64,
    })
}

/// Decode any supported raster format and encode it as an opaque JPEG.
pub fn encode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, ConvertError> {
    let img = image::load_from_memory(bytes).map_err(ConvertError::Decode)?;
    let rgb = flatten_onto_white(img);

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    encoder.encode_image(&rgb).map_err(ConvertError::Encode)?;
    Ok(jpeg)
}

/// Composite any alpha channel over opaque white; opaque images convert directly.
///
/// Palette images with a transparent index decode with an alpha channel, so
/// they take the compositing path too.
pub fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(r), blend(g), blend(b)]);
    }
    out
}
