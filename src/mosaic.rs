//! Strip mosaic composer.
//!
//! Keeps only a bottom vertical slice of each photo and stacks the slices
//! top to bottom in survey order, approximating a continuous vertical
//! transect without feature registration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::imageops::{self, crop_imm, FilterType};
use image::{ImageReader, RgbImage};

use crate::models::{DetectedImage, LogLevel, RunState};

/// Filename tag identifying the masked variant of an upload.
pub const MASK_PREFIX: &str = "mask_total_";

/// Vertical crop window for the strip at `index`, as height fractions.
/// The first strip keeps only the bottom third; every later strip keeps
/// the bottom half.
pub fn crop_window(index: usize) -> (f64, f64) {
    if index == 0 { (0.66, 1.0) } else { (0.5, 1.0) }
}

/// Cut the [start, end) height window out of an image. An inverted window
/// extends to the bottom edge instead.
pub fn crop_section(img: &RgbImage, start: f64, end: f64) -> RgbImage {
    let height = img.height();
    let row_start = (height as f64 * start) as u32;
    let mut row_end = (height as f64 * end) as u32;
    if row_end <= row_start {
        row_end = height;
    }
    crop_imm(img, 0, row_start, img.width(), row_end - row_start).to_image()
}

/// Find the first decodable source for one ordered item: the masked
/// variant inside `folder`, the bare filename inside `folder`, then the
/// path recorded at detection time.
fn resolve_source(item: &DetectedImage, folder: &Path) -> Option<RgbImage> {
    let candidates: [PathBuf; 3] = [
        folder.join(format!("{}{}", MASK_PREFIX, item.filename)),
        folder.join(&item.filename),
        item.filepath.clone(),
    ];

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        if let Ok(reader) = ImageReader::open(&candidate) {
            if let Ok(img) = reader.decode() {
                return Some(img.to_rgb8());
            }
        }
    }
    None
}

/// Compose the ordered items into one mosaic sourced from `folder`.
///
/// Returns `Ok(false)` and writes nothing when no source resolves.
/// Crop windows are assigned by position in the ordered list before any
/// item is skipped, so a missing photo does not shift its neighbours.
pub fn compose(
    ordered: &[DetectedImage],
    folder: &Path,
    output: &Path,
    state: &mut RunState,
) -> anyhow::Result<bool> {
    state.log(LogLevel::Info, "Composing mosaic...");
    let mut sections = Vec::new();
    let mut loaded = 0usize;

    for (idx, item) in ordered.iter().enumerate() {
        let (start, end) = crop_window(idx);
        match resolve_source(item, folder) {
            Some(img) => {
                sections.push(crop_section(&img, start, end));
                loaded += 1;
                state.log(
                    LogLevel::Info,
                    format!("✓ Marker {} ({}/{})", item.marker, idx + 1, ordered.len()),
                );
            }
            None => {
                state.log(
                    LogLevel::Warning,
                    format!("✗ Marker {} source not found", item.marker),
                );
            }
        }
    }

    state.images_loaded = loaded;
    state.images_total = ordered.len();

    if sections.is_empty() {
        return Ok(false);
    }

    let max_width = sections.iter().map(RgbImage::width).max().unwrap_or(0);
    let scaled: Vec<RgbImage> = sections
        .into_iter()
        .map(|section| {
            if section.width() == max_width {
                section
            } else {
                let factor = max_width as f64 / section.width() as f64;
                let new_height = (section.height() as f64 * factor) as u32;
                imageops::resize(&section, max_width, new_height, FilterType::Triangle)
            }
        })
        .collect();

    let total_height: u32 = scaled.iter().map(RgbImage::height).sum();
    let mut mosaic = RgbImage::new(max_width, total_height);
    let mut offset = 0i64;
    for strip in &scaled {
        imageops::replace(&mut mosaic, strip, 0, offset);
        offset += strip.height() as i64;
    }

    mosaic
        .save(output)
        .with_context(|| format!("cannot write mosaic {}", output.display()))?;
    state.log(
        LogLevel::Success,
        format!("✓ Mosaic saved: {} markers", loaded),
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_strip_keeps_bottom_third() {
        assert_eq!(crop_window(0), (0.66, 1.0));
        assert_eq!(crop_window(1), (0.5, 1.0));
        assert_eq!(crop_window(7), (0.5, 1.0));
    }

    #[test]
    fn crop_rows_match_window() {
        let img = RgbImage::new(10, 300);
        // Rows 198..300 for the leading strip.
        assert_eq!(crop_section(&img, 0.66, 1.0).height(), 102);
        assert_eq!(crop_section(&img, 0.5, 1.0).height(), 150);
    }

    #[test]
    fn inverted_window_extends_to_bottom() {
        let img = RgbImage::new(10, 100);
        let section = crop_section(&img, 0.9, 0.3);
        assert_eq!(section.height(), 10);
    }
}
