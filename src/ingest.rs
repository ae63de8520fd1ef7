// SPDX-License-Identifier: GPL-3.0-only

//! Classification of uploaded files
//!
//! Every uploaded file is decided once, from its extension, to be either a
//! backdown image or a settings table. The rest of the crate only ever sees
//! the resulting [`Upload`] variants.

use crate::constants::{IMAGE_EXTENSIONS, SETTINGS_EXTENSIONS};
use crate::errors::{AppError, AppResult, Warning};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Kind of an uploaded file, decided from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Settings,
}

impl UploadKind {
    /// Classify a file name by extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()?
            .to_string_lossy()
            .to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(UploadKind::Image)
        } else if SETTINGS_EXTENSIONS.contains(&ext.as_str()) {
            Some(UploadKind::Settings)
        } else {
            None
        }
    }
}

/// A backdown image awaiting upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// Original file name, including extension
    pub file_name: String,
    /// File stem, matched against the settings `file_name` column
    pub name: String,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let name = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        Self {
            file_name,
            name,
            bytes,
        }
    }
}

/// A settings table as uploaded (raw text, delimiter not yet known)
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpload {
    pub file_name: String,
    pub text: String,
}

impl SettingsUpload {
    /// Build from raw bytes; the content must be UTF-8 (a BOM is dropped)
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let file_name = file_name.into();
        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::Ingest(format!("Settings file {} is not UTF-8: {}", file_name, e))
        })?;
        let text = match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        };
        Ok(Self { file_name, text })
    }
}

/// An uploaded file after classification
#[derive(Debug, Clone, PartialEq)]
pub enum Upload {
    Image(ImageAsset),
    Settings(SettingsUpload),
}

impl Upload {
    /// Classify in-memory content by its file name
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> AppResult<Self> {
        match UploadKind::from_file_name(file_name) {
            Some(UploadKind::Image) => Ok(Upload::Image(ImageAsset::new(file_name, bytes))),
            Some(UploadKind::Settings) => {
                Ok(Upload::Settings(SettingsUpload::from_bytes(file_name, bytes)?))
            }
            None => Err(AppError::Ingest(format!(
                "Unsupported file type: {} (expected png, jpg, jpeg, csv or tsv)",
                file_name
            ))),
        }
    }

    /// Read and classify a file from disk
    pub fn read(path: &Path) -> AppResult<Self> {
        let file_name = display_name(path);
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Ingest(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!(file = %file_name, size = bytes.len(), "Read upload");
        Self::from_bytes(&file_name, bytes)
    }
}

/// The images and settings table of one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    /// Images in upload order
    pub images: Vec<ImageAsset>,
    /// Settings table selected for this submission
    pub settings: Option<SettingsUpload>,
    /// Non-blocking diagnostics raised while selecting the settings table
    pub warnings: Vec<Warning>,
}

impl Ingested {
    /// Split uploads into images and settings
    ///
    /// An explicit settings table takes precedence. Otherwise the first
    /// uploaded settings candidate is used and a warning is raised when there
    /// is more than one.
    pub fn from_uploads(uploads: Vec<Upload>, explicit: Option<SettingsUpload>) -> Self {
        let mut images = Vec::new();
        let mut candidates = Vec::new();
        for upload in uploads {
            match upload {
                Upload::Image(image) => images.push(image),
                Upload::Settings(settings) => candidates.push(settings),
            }
        }

        let mut warnings = Vec::new();
        let settings = match explicit {
            Some(settings) => Some(settings),
            None => {
                let count = candidates.len();
                let first = candidates.into_iter().next();
                if let Some(first) = &first
                    && count > 1
                {
                    warn!(used = %first.file_name, count, "Multiple settings files uploaded");
                    warnings.push(Warning::MultipleSettingsFiles {
                        used: first.file_name.clone(),
                        count,
                    });
                }
                first
            }
        };

        Self {
            images,
            settings,
            warnings,
        }
    }

    /// Read every path (files or directories) and classify the contents
    ///
    /// Directories contribute their supported files sorted by name; unsupported
    /// files inside directories are skipped, but an unsupported file named
    /// directly is an error.
    pub fn from_paths(paths: &[PathBuf], settings: Option<&Path>) -> AppResult<Self> {
        let mut uploads = Vec::new();
        for path in collect_upload_paths(paths)? {
            uploads.push(Upload::read(&path)?);
        }

        let explicit = match settings {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    AppError::Ingest(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Some(SettingsUpload::from_bytes(display_name(path), bytes)?)
            }
            None => None,
        };

        Ok(Self::from_uploads(uploads, explicit))
    }
}

/// Expand directories into their supported files
fn collect_upload_paths(input: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for path in input {
        if path.is_dir() {
            let mut entries = Vec::new();
            let dir = std::fs::read_dir(path)
                .map_err(|e| AppError::Ingest(format!("Failed to list {}: {}", path.display(), e)))?;
            for entry in dir {
                let entry = entry.map_err(|e| AppError::Ingest(e.to_string()))?;
                let file_path = entry.path();
                if file_path.is_file()
                    && UploadKind::from_file_name(&display_name(&file_path)).is_some()
                {
                    entries.push(file_path);
                }
            }
            // Sort by filename for consistent ordering
            entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.extend(entries);
        } else {
            paths.push(path.clone());
        }
    }

    Ok(paths)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
