use image::{DynamicImage, GrayImage, Luma};
use image::imageops::crop_imm;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Fixed-threshold binarization: pixels at or above `thresh` become white.
pub fn binarize(img: &GrayImage, thresh: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        *pixel = if pixel[0] >= thresh { Luma([255]) } else { Luma([0]) };
    }
    out
}

/// Crop the four corner patches where a marker sticker may sit, each 20%
/// of the image's height and width, in scan order: top-right, bottom-right,
/// top-left, bottom-left.
pub fn corner_regions(gray: &GrayImage) -> Vec<GrayImage> {
    let (w, h) = gray.dimensions();
    let h_top = (h as f64 * 0.2) as u32;
    let h_bottom = (h as f64 * 0.8) as u32;
    let w_left = (w as f64 * 0.2) as u32;
    let w_right = (w as f64 * 0.8) as u32;

    vec![
        crop_imm(gray, w_right, 0, w - w_right, h_top).to_image(),
        crop_imm(gray, w_right, h_bottom, w - w_right, h - h_bottom).to_image(),
        crop_imm(gray, 0, 0, w_left, h_top).to_image(),
        crop_imm(gray, 0, h_bottom, w_left, h - h_bottom).to_image(),
    ]
}
