//! Yellow-flower blob counting on the color mosaic.

use std::path::Path;

use image::{GrayImage, ImageReader, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, Contour};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::morphology::close;
use imageproc::point::Point;

use crate::models::{LogLevel, RunState};

/// Minimum contour area, in pixels, for a blob to count as a flower.
const MIN_FLOWER_AREA: f64 = 50.0;

/// OpenCV-style HSV: hue 0-179, saturation and value 0-255.
fn rgb_to_hsv(pixel: Rgb<u8>) -> (u8, u8, u8) {
    let r = pixel[0] as f32 / 255.0;
    let g = pixel[1] as f32 / 255.0;
    let b = pixel[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let sat = if max == 0.0 { 0.0 } else { delta / max * 255.0 };
    ((hue / 2.0).round() as u8, sat.round() as u8, (max * 255.0).round() as u8)
}

/// Select pixels in the yellow band: hue 20-30, saturation and value >= 100.
fn yellow_mask(img: &RgbImage) -> GrayImage {
    let mut mask = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(*pixel);
        if (20..=30).contains(&h) && s >= 100 && v >= 100 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Shoelace area of a contour polygon.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

fn draw_contour(canvas: &mut RgbImage, contour: &Contour<i32>, color: Rgb<u8>) {
    let points = &contour.points;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            canvas,
            (p.x as f32, p.y as f32),
            (q.x as f32, q.y as f32),
            color,
        );
    }
}

/// Count yellow flower blobs in the mosaic at `input` and write a copy
/// with the kept blobs outlined in green to `annotated_out`.
///
/// A close with a 5x5 element merges fragmented petals before external
/// contours are taken. Decode failure returns 0; decode and write
/// failures are recorded in the run-state log.
pub fn count_flowers(input: &Path, annotated_out: &Path, state: &mut RunState) -> u32 {
    let Some(img) = ImageReader::open(input).ok().and_then(|r| r.decode().ok()) else {
        state.log(
            LogLevel::Warning,
            format!("Cannot decode {}", input.display()),
        );
        return 0;
    };
    let rgb = img.to_rgb8();

    let mask = close(&yellow_mask(&rgb), Norm::LInf, 2);

    let contours: Vec<Contour<i32>> = find_contours(&mask);
    let flowers: Vec<&Contour<i32>> = contours
        .iter()
        .filter(|c| c.parent.is_none() && contour_area(&c.points) > MIN_FLOWER_AREA)
        .collect();

    let mut annotated = rgb.clone();
    for contour in &flowers {
        draw_contour(&mut annotated, contour, Rgb([0, 255, 0]));
    }
    // Annotated copy is written even when nothing was found.
    if let Err(err) = annotated.save(annotated_out) {
        state.log(
            LogLevel::Error,
            format!("Cannot write annotated copy {}: {}", annotated_out.display(), err),
        );
    }

    flowers.len() as u32
}
