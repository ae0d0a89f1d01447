//! Binary coverage masks used by the mask mosaic.

use std::path::Path;

use anyhow::Context;
use image::ImageReader;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

use crate::detection::preprocessing::{binarize, to_grayscale};

/// Threshold separating black border and vignette from real content.
const MASK_THRESHOLD: u8 = 30;

/// Render `input` as a foreground/background mask and write it to `output`.
///
/// Grayscale, threshold at 30, then one closing and one opening with a 3x3
/// square element to solidify content and drop speckle.
pub fn make_mask(input: &Path, output: &Path) -> anyhow::Result<()> {
    let img = ImageReader::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?
        .decode()
        .with_context(|| format!("cannot decode {}", input.display()))?;

    let mask = binarize(&to_grayscale(&img), MASK_THRESHOLD);
    let mask = close(&mask, Norm::LInf, 1);
    let mask = open(&mask, Norm::LInf, 1);

    mask.save(output)
        .with_context(|| format!("cannot write mask {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    #[test]
    fn mask_keeps_input_dimensions() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let input = dir.path().join("in.png");
        let output = dir.path().join("mask.png");

        RgbImage::from_pixel(40, 60, image::Rgb([200, 200, 200])).save(&input)?;
        make_mask(&input, &output)?;

        let mask = image::open(&output)?.to_luma8();
        assert_eq!(mask.dimensions(), (40, 60));
        assert!(mask.pixels().all(|p| p[0] == 255));
        Ok(())
    }

    #[test]
    fn dark_border_is_background() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let input = dir.path().join("in.png");
        let output = dir.path().join("mask.png");

        // Bright core with a 10px black frame.
        let mut img = GrayImage::from_pixel(60, 60, Luma([0]));
        for y in 10..50 {
            for x in 10..50 {
                img.put_pixel(x, y, Luma([180]));
            }
        }
        img.save(&input)?;
        make_mask(&input, &output)?;

        let mask = image::open(&output)?.to_luma8();
        assert_eq!(mask.get_pixel(30, 30)[0], 255);
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
        Ok(())
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = make_mask(&dir.path().join("nope.png"), &dir.path().join("out.png"));
        assert!(result.is_err());
    }
}
