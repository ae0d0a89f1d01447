pub mod ocr;
pub mod patterns;
pub mod preprocessing;

use std::path::Path;

use image::ImageReader;
use ocrs::OcrEngine;

use crate::models::Marker;

/// Finds the positional marker printed in a corner of a survey photo.
///
/// OCR runs over the four corner patches; when it reads nothing the shot id
/// in the filename is mapped through the fixed flight sequence. The engine
/// is optional so hosts without the ocrs model store still get the
/// filename fallback.
pub struct MarkerExtractor {
    engine: Option<OcrEngine>,
}

impl MarkerExtractor {
    /// Build an extractor, loading the OCR engine if its models are
    /// available. A missing model store degrades to filename fallback.
    pub fn new() -> Self {
        Self {
            engine: ocr::init_ocr_engine().ok(),
        }
    }

    /// Extractor with no OCR engine; only the filename fallback runs.
    pub fn without_ocr() -> Self {
        Self { engine: None }
    }

    pub fn has_ocr(&self) -> bool {
        self.engine.is_some()
    }

    /// Best-guess marker for one photo; `None` when the image cannot be
    /// decoded or neither OCR nor the filename yields a marker.
    pub fn extract(&self, path: &Path) -> Option<Marker> {
        let img = ImageReader::open(path).ok()?.decode().ok()?;
        let gray = preprocessing::to_grayscale(&img);

        let mut candidates = Vec::new();
        if let Some(engine) = &self.engine {
            for region in preprocessing::corner_regions(&gray) {
                let patch = preprocessing::binarize(&region, 150);
                if let Some(text) = ocr::recognize_patch(engine, &patch) {
                    candidates.extend(patterns::extract_tokens(&text));
                }
            }
        }

        if let Some(token) = patterns::choose_token(&candidates) {
            return Some(Marker::parse(token));
        }

        let filename = path.file_name()?.to_str()?;
        patterns::file_id_from_name(filename).and_then(patterns::marker_for_file_id)
    }
}

impl Default for MarkerExtractor {
    fn default() -> Self {
        Self::new()
    }
}
