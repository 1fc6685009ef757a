//! File selection surface.
//!
//! Accepts one image file per interaction, from disk or from bytes handed
//! over by a UI shell, and enforces the type and size filters before anything
//! reaches the network.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::format::format_file_size;
use crate::managers::image_state_manager::{ImageStateManagerTrait, SharedImageState};
use crate::managers::object_url_registry::ObjectUrlRegistry;
use crate::types::errors::UploadError;
use crate::types::file::{extension_of, SelectedFile, ACCEPTED_EXTENSIONS, MAX_FILE_SIZE};

/// Trait defining file selection operations.
pub trait UploadManagerTrait {
    fn select_path(&mut self, path: &Path) -> Result<(), UploadError>;
    fn drop_files(&mut self, files: Vec<SelectedFile>) -> Result<(), UploadError>;
    fn remove_file(&mut self);
    fn preview(&mut self) -> Option<FilePreview>;
}

/// What the upload surface shows for the selected file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilePreview {
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub mime_type: String,
    pub url: String,
}

/// Checks the type and size filters for a candidate file.
pub fn validate_file(name: &str, size: u64) -> Result<(), UploadError> {
    let accepted = extension_of(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !accepted {
        return Err(UploadError::UnsupportedType(name.to_string()));
    }
    if size > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge {
            name: name.to_string(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// File selection surface writing into the shared conversion state.
pub struct UploadManager {
    state: SharedImageState,
    registry: ObjectUrlRegistry,
}

impl UploadManager {
    pub fn new(state: SharedImageState, registry: ObjectUrlRegistry) -> Self {
        Self {
            state,
            registry,
        }
    }

    fn accept(&mut self, file: SelectedFile) -> Result<(), UploadError> {
        if let Err(e) = validate_file(&file.name, file.size()) {
            log::warn!("Rejected file: {}", e);
            return Err(e);
        }
        log::info!(
            "Selected {} ({}, {})",
            file.name,
            file.mime_type(),
            format_file_size(file.size())
        );
        let url = self.registry.create_object_url(file.blob.clone());
        let mut state = self.state.lock();
        state.set_selected_file(Some(file));
        state.set_preview_url(Some(url));
        Ok(())
    }
}

impl UploadManagerTrait for UploadManager {
    /// Selects a file from disk. The size bound is checked against file
    /// metadata before the file is read.
    fn select_path(&mut self, path: &Path) -> Result<(), UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or(UploadError::NoFile)?;

        let metadata = fs::metadata(path).map_err(|e| UploadError::IoError(e.to_string()))?;
        if let Err(e) = validate_file(&name, metadata.len()) {
            log::warn!("Rejected file: {}", e);
            return Err(e);
        }

        let data = fs::read(path).map_err(|e| UploadError::IoError(e.to_string()))?;
        let mut file = SelectedFile::from_bytes(name, data);
        file.path = Some(path.to_path_buf());
        self.accept(file)
    }

    /// Handles a drop or picker interaction carrying in-memory files.
    fn drop_files(&mut self, mut files: Vec<SelectedFile>) -> Result<(), UploadError> {
        match files.len() {
            0 => Err(UploadError::NoFile),
            1 => {
                let file = files.remove(0);
                self.accept(file)
            }
            n => {
                log::warn!("Rejected drop of {} files", n);
                Err(UploadError::TooManyFiles(n))
            }
        }
    }

    /// Clears the file, the result and the error.
    fn remove_file(&mut self) {
        self.state.lock().set_selected_file(None);
    }

    /// Describes the selected file. The preview URL lives in the state, so a
    /// reset done elsewhere releases it too.
    fn preview(&mut self) -> Option<FilePreview> {
        let mut state = self.state.lock();
        let file = state.selected_file()?;
        let summary = file.summary();
        let blob = file.blob.clone();
        let stale = state
            .preview_url()
            .map(|url| !url.blob().same_data(&blob))
            .unwrap_or(true);
        if stale {
            let url = self.registry.create_object_url(blob);
            state.set_preview_url(Some(url));
        }
        let url = state.preview_url()?.as_str().to_string();
        drop(state);

        if !summary.mime_type.starts_with("image/") {
            return None;
        }
        Some(FilePreview {
            size_label: format_file_size(summary.size),
            name: summary.name,
            size: summary.size,
            mime_type: summary.mime_type,
            url,
        })
    }
}
