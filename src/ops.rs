//! The operations the external caller drives, in pipeline order:
//! ingest, detect, mask, mosaic, plus artifact lookup and liveness.
//!
//! Every operation takes the workspace and the run state explicitly;
//! nothing here is async or guarded, each call runs to completion.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::detection::MarkerExtractor;
use crate::flowers::count_flowers;
use crate::masking::make_mask;
use crate::models::{DetectedImage, LogLevel, Phase, RunState};
use crate::mosaic::{compose, MASK_PREFIX};
use crate::ordering::order_detections;
use crate::workspace::{allowed_file, sanitize_filename, Workspace};

#[derive(Debug, Serialize)]
pub struct IngestedFile {
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub count: usize,
    pub files: Vec<IngestedFile>,
}

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub count: usize,
    pub markers: Vec<DetectedImage>,
}

#[derive(Debug, Serialize)]
pub struct MaskReport {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MosaicReport {
    pub flower_count: u32,
    pub images_loaded: usize,
    pub images_total: usize,
}

/// Persist a batch of named image buffers into the uploads area.
/// Files with a disallowed extension or an empty sanitized name are
/// silently dropped, matching upload-form behavior.
pub fn ingest(
    ws: &Workspace,
    state: &mut RunState,
    files: &[(String, Vec<u8>)],
) -> anyhow::Result<IngestReport> {
    let mut accepted = Vec::new();
    for (name, bytes) in files {
        if name.is_empty() || !allowed_file(name) {
            continue;
        }
        let filename = sanitize_filename(name);
        if filename.is_empty() {
            continue;
        }
        let path = ws.uploads.join(&filename);
        fs::write(&path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
        state.log(LogLevel::Info, format!("Uploaded: {}", filename));
        accepted.push(IngestedFile { filename, path });
    }
    Ok(IngestReport {
        count: accepted.len(),
        files: accepted,
    })
}

/// List the uploaded image filenames in deterministic (sorted) order.
fn uploaded_files(ws: &Workspace) -> anyhow::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(&ws.uploads)
        .with_context(|| format!("cannot read {}", ws.uploads.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| allowed_file(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Run the extractor over every upload and store the ordered result.
/// Photos yielding no marker are logged and left out of the ordering.
pub fn detect(
    ws: &Workspace,
    state: &mut RunState,
    extractor: &MarkerExtractor,
) -> anyhow::Result<DetectReport> {
    state.phase = Phase::Processing;
    state.log(LogLevel::Info, "Detecting markers...");

    let mut found = Vec::new();
    for filename in uploaded_files(ws)? {
        let filepath = ws.uploads.join(&filename);
        match extractor.extract(&filepath) {
            Some(marker) => {
                state.log(LogLevel::Info, format!("  ✓ {} → {}", filename, marker));
                found.push(DetectedImage {
                    filename,
                    filepath,
                    marker,
                });
            }
            None => {
                state.log(LogLevel::Warning, format!("  ✗ {} → not detected", filename));
            }
        }
    }

    let ordered = order_detections(found);
    state.detected = ordered.clone();
    state.log(
        LogLevel::Success,
        format!("{} markers detected", ordered.len()),
    );
    state.phase = Phase::Idle;

    Ok(DetectReport {
        count: ordered.len(),
        markers: ordered,
    })
}

/// Generate a binary mask per detected photo (or per upload when nothing
/// has been detected yet) under `masks/mask_total_<name>`.
pub fn create_masks(ws: &Workspace, state: &mut RunState) -> anyhow::Result<MaskReport> {
    state.phase = Phase::Processing;
    state.log(LogLevel::Info, "Creating masks...");

    let items: Vec<(String, PathBuf)> = if state.detected.is_empty() {
        uploaded_files(ws)?
            .into_iter()
            .map(|name| {
                let path = ws.uploads.join(&name);
                (name, path)
            })
            .collect()
    } else {
        state
            .detected
            .iter()
            .map(|item| (item.filename.clone(), item.filepath.clone()))
            .collect()
    };

    let mut created = 0usize;
    for (filename, filepath) in items {
        let output = ws.masks.join(format!("{}{}", MASK_PREFIX, filename));
        match make_mask(&filepath, &output) {
            Ok(()) => {
                created += 1;
                state.log(LogLevel::Info, format!("  ✓ Mask: {}", filename));
            }
            Err(err) => {
                state.log(LogLevel::Error, format!("Mask failed for {}: {}", filename, err));
            }
        }
    }

    state.log(LogLevel::Success, format!("{} masks created", created));
    state.phase = Phase::Idle;
    Ok(MaskReport { count: created })
}

/// Compose the mask mosaic and the color mosaic, then count flowers on
/// the color one. Requires a prior successful `detect`; fails before any
/// side effect otherwise.
pub fn create_mosaic(ws: &Workspace, state: &mut RunState) -> anyhow::Result<MosaicReport> {
    if state.detected.is_empty() {
        anyhow::bail!("no markers detected yet; run detect first");
    }
    state.phase = Phase::Processing;
    state.log(LogLevel::Info, "Generating mosaic...");
    let ordered = state.detected.clone();

    compose(&ordered, &ws.masks, &ws.mask_mosaic_path(), state)?;
    compose(&ordered, &ws.uploads, &ws.color_mosaic_path(), state)?;

    let flower_count = count_flowers(&ws.color_mosaic_path(), &ws.flower_result_path(), state);
    state.flower_count = flower_count as usize;
    state.log(LogLevel::Success, "Mosaic complete");
    state.phase = Phase::Idle;

    Ok(MosaicReport {
        flower_count,
        images_loaded: state.images_loaded,
        images_total: state.images_total,
    })
}

/// Read-only snapshot of the whole run state.
pub fn status(state: &RunState) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(state)?)
}

/// Read-only snapshot of the run-state log list.
pub fn logs(state: &RunState) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::json!({ "logs": state.logs }))
}

/// The artifacts a caller can preview or download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    MaskMosaic,
    ColorMosaic,
    Flowers,
}

pub fn artifact_path(ws: &Workspace, artifact: Artifact) -> PathBuf {
    match artifact {
        Artifact::MaskMosaic => ws.mask_mosaic_path(),
        Artifact::ColorMosaic => ws.color_mosaic_path(),
        Artifact::Flowers => ws.flower_result_path(),
    }
}

/// Resolve an artifact for serving; an error here is the 404 case.
pub fn preview(ws: &Workspace, artifact: Artifact) -> anyhow::Result<PathBuf> {
    let path = artifact_path(ws, artifact);
    if path.exists() {
        Ok(path)
    } else {
        anyhow::bail!("not found: {}", path.display())
    }
}

/// Fixed liveness payload.
pub fn health() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "service": "vertical-mosaic-builder",
    })
}
