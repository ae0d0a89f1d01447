//! On-disk layout for one processing workspace.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Upload extensions accepted by ingest, matched case-insensitively.
const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Folder layout rooted at one directory: uploads, masks, mosaics and
/// results, plus the fixed artifact paths inside them.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub uploads: PathBuf,
    pub masks: PathBuf,
    pub mosaics: PathBuf,
    pub results: PathBuf,
}

impl Workspace {
    /// Open (and create if needed) the workspace folders under `root`.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let ws = Self {
            uploads: root.join("uploads"),
            masks: root.join("masks"),
            mosaics: root.join("mosaics"),
            results: root.join("results"),
            root,
        };
        for folder in [&ws.uploads, &ws.masks, &ws.mosaics, &ws.results] {
            std::fs::create_dir_all(folder)
                .with_context(|| format!("cannot create {}", folder.display()))?;
        }
        Ok(ws)
    }

    pub fn mask_mosaic_path(&self) -> PathBuf {
        self.mosaics.join("mosaic_masks.png")
    }

    pub fn color_mosaic_path(&self) -> PathBuf {
        self.mosaics.join("mosaic_color.png")
    }

    pub fn flower_result_path(&self) -> PathBuf {
        self.results.join("flowers_detected.jpg")
    }
}

/// Whether a filename carries an accepted image extension.
pub fn allowed_file(filename: &str) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Reduce an untrusted upload name to a safe flat filename: the last path
/// component with anything outside [A-Za-z0-9._-] replaced by `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
