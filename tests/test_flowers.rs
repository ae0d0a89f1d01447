//! Integration tests for the yellow-flower counter.

use fieldmosaic::flowers::count_flowers;
use fieldmosaic::{LogLevel, RunState};
use image::{Rgb, RgbImage};
use std::path::Path;

fn paint_square(img: &mut RgbImage, x0: u32, y0: u32, size: u32, color: [u8; 3]) {
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

const YELLOW: [u8; 3] = [255, 255, 0];

#[test]
fn counts_a_single_yellow_blob() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("mosaic.png");
    let annotated = dir.path().join("flowers.jpg");

    let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 60, 0]));
    paint_square(&mut img, 50, 50, 30, YELLOW);
    img.save(&input)?;

    assert_eq!(count_flowers(&input, &annotated, &mut RunState::new()), 1);
    assert!(annotated.exists());
    Ok(())
}

#[test]
fn counts_separate_blobs_individually() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("mosaic.png");
    let annotated = dir.path().join("flowers.jpg");

    let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 60, 0]));
    paint_square(&mut img, 20, 20, 20, YELLOW);
    paint_square(&mut img, 150, 150, 20, YELLOW);
    img.save(&input)?;

    assert_eq!(count_flowers(&input, &annotated, &mut RunState::new()), 2);
    Ok(())
}

#[test]
fn tiny_specks_fall_under_the_area_floor() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("mosaic.png");
    let annotated = dir.path().join("flowers.jpg");

    let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 60, 0]));
    paint_square(&mut img, 40, 40, 3, YELLOW);
    img.save(&input)?;

    assert_eq!(count_flowers(&input, &annotated, &mut RunState::new()), 0);
    Ok(())
}

#[test]
fn no_yellow_means_zero_and_still_writes_annotated_copy() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("mosaic.png");
    let annotated = dir.path().join("flowers.jpg");

    RgbImage::from_pixel(120, 80, Rgb([0, 0, 200])).save(&input)?;

    assert_eq!(count_flowers(&input, &annotated, &mut RunState::new()), 0);
    let copy = image::open(&annotated)?.to_rgb8();
    assert_eq!(copy.dimensions(), (120, 80));
    Ok(())
}

#[test]
fn decode_failure_returns_zero_and_is_logged() {
    let dir = tempfile::TempDir::new().unwrap();
    let annotated = dir.path().join("flowers.jpg");
    let mut state = RunState::new();
    assert_eq!(count_flowers(Path::new("/no/such/mosaic.png"), &annotated, &mut state), 0);
    assert!(!annotated.exists());
    assert!(state
        .logs
        .iter()
        .any(|entry| entry.level == LogLevel::Warning && entry.message.contains("decode")));
}

#[test]
fn failed_annotated_write_is_logged() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("mosaic.png");
    // The annotated copy targets a directory that does not exist.
    let annotated = dir.path().join("missing").join("flowers.jpg");

    let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 60, 0]));
    paint_square(&mut img, 50, 50, 30, YELLOW);
    img.save(&input)?;

    let mut state = RunState::new();
    assert_eq!(count_flowers(&input, &annotated, &mut state), 1);
    assert!(state
        .logs
        .iter()
        .any(|entry| entry.level == LogLevel::Error && entry.message.contains("annotated")));
    Ok(())
}
