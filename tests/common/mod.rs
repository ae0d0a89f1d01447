#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fieldmosaic::{DetectedImage, Marker};
use image::{Rgb, RgbImage};

/// Write a solid-color RGB image to `path`.
pub fn save_rgb(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(path)
        .expect("write test image");
}

pub fn detected(name: &str, path: impl Into<PathBuf>, marker: &str) -> DetectedImage {
    DetectedImage {
        filename: name.to_string(),
        filepath: path.into(),
        marker: Marker::parse(marker),
    }
}
