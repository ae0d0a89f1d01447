use std::path::Path;

use image::GrayImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;

/// Load detection and recognition models from the standard ocrs cache.
pub fn init_ocr_engine() -> anyhow::Result<OcrEngine> {
    let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;

    let cache_dir = Path::new(&home_dir).join(".cache/ocrs");
    let detection_model_path = cache_dir.join("text-detection.rten");
    let recognition_model_path = cache_dir.join("text-recognition.rten");

    if !detection_model_path.exists() || !recognition_model_path.exists() {
        anyhow::bail!(
            "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
             Expected locations:\n  - {}\n  - {}",
            detection_model_path.display(),
            recognition_model_path.display()
        );
    }

    let detection_model = Model::load_file(&detection_model_path)?;
    let recognition_model = Model::load_file(&recognition_model_path)?;

    let engine = OcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })?;

    Ok(engine)
}

/// Run text recognition on one binarized corner patch.
///
/// Any engine failure is treated as "nothing readable in this patch" so a
/// bad corner never aborts the remaining regions.
pub fn recognize_patch(engine: &OcrEngine, patch: &GrayImage) -> Option<String> {
    let rgb = image::DynamicImage::ImageLuma8(patch.clone()).to_rgb8();

    let img_source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).ok()?;
    let ocr_input = engine.prepare_input(img_source).ok()?;

    match engine.get_text(&ocr_input) {
        Ok(text) => Some(text),
        Err(_) => None,
    }
}
