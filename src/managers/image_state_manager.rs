//! Conversion state container.
//!
//! Holds the selected file, the conversion options, progress, the converted
//! result and the last error. Every mutation is a plain field update; range
//! checks belong to the input surfaces.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::managers::object_url_registry::ObjectUrl;
use crate::types::conversion::ConvertedMetadata;
use crate::types::file::{FileSummary, SelectedFile};
use crate::types::options::{ConversionOptions, ConversionOptionsPatch};
use crate::types::progress::{ConversionProgress, ProgressPatch};

/// Trait defining conversion state operations.
pub trait ImageStateManagerTrait {
    fn set_selected_file(&mut self, file: Option<SelectedFile>);
    fn set_preview_url(&mut self, url: Option<ObjectUrl>);
    fn set_conversion_options(&mut self, patch: &ConversionOptionsPatch);
    fn set_progress(&mut self, patch: &ProgressPatch);
    fn set_converted_image_url(&mut self, url: Option<ObjectUrl>);
    fn set_converted_metadata(&mut self, metadata: Option<ConvertedMetadata>);
    fn set_error(&mut self, error: Option<String>);
    fn reset(&mut self);
}

/// Serializable view of the conversion state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageStateSnapshot {
    pub selected_file: Option<FileSummary>,
    pub conversion_options: ConversionOptions,
    pub progress: ConversionProgress,
    pub converted_image_url: Option<String>,
    pub converted_metadata: Option<ConvertedMetadata>,
    pub error: Option<String>,
    pub can_convert: bool,
}

/// In-memory conversion state.
#[derive(Debug, Default)]
pub struct ImageStateManager {
    selected_file: Option<SelectedFile>,
    preview_url: Option<ObjectUrl>,
    conversion_options: ConversionOptions,
    progress: ConversionProgress,
    converted_image_url: Option<ObjectUrl>,
    converted_metadata: Option<ConvertedMetadata>,
    error: Option<String>,
}

impl ImageStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    /// Display URL of the selected file, released with the selection.
    pub fn preview_url(&self) -> Option<&ObjectUrl> {
        self.preview_url.as_ref()
    }

    pub fn conversion_options(&self) -> &ConversionOptions {
        &self.conversion_options
    }

    pub fn progress(&self) -> &ConversionProgress {
        &self.progress
    }

    pub fn converted_image_url(&self) -> Option<&ObjectUrl> {
        self.converted_image_url.as_ref()
    }

    pub fn converted_metadata(&self) -> Option<&ConvertedMetadata> {
        self.converted_metadata.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A file is selected and no conversion is in flight.
    pub fn can_convert(&self) -> bool {
        self.selected_file.is_some() && !self.progress.is_converting
    }

    pub fn snapshot(&self) -> ImageStateSnapshot {
        ImageStateSnapshot {
            selected_file: self.selected_file.as_ref().map(SelectedFile::summary),
            conversion_options: self.conversion_options.clone(),
            progress: self.progress.clone(),
            converted_image_url: self
                .converted_image_url
                .as_ref()
                .map(|url| url.as_str().to_string()),
            converted_metadata: self.converted_metadata,
            error: self.error.clone(),
            can_convert: self.can_convert(),
        }
    }
}

impl ImageStateManagerTrait for ImageStateManager {
    /// Replaces the selected file. A new selection or a removal also drops the
    /// previous preview, result and error.
    fn set_selected_file(&mut self, file: Option<SelectedFile>) {
        self.selected_file = file;
        self.preview_url = None;
        self.converted_image_url = None;
        self.converted_metadata = None;
        self.error = None;
    }

    fn set_preview_url(&mut self, url: Option<ObjectUrl>) {
        self.preview_url = url;
    }

    fn set_conversion_options(&mut self, patch: &ConversionOptionsPatch) {
        self.conversion_options = self.conversion_options.apply(patch);
    }

    fn set_progress(&mut self, patch: &ProgressPatch) {
        self.progress = self.progress.apply(patch);
    }

    /// Stores the display URL of the result; the previous one is released.
    fn set_converted_image_url(&mut self, url: Option<ObjectUrl>) {
        self.converted_image_url = url;
    }

    fn set_converted_metadata(&mut self, metadata: Option<ConvertedMetadata>) {
        self.converted_metadata = metadata;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Conversion state shared between the surfaces, the orchestrator and the
/// progress animation task.
#[derive(Debug, Clone, Default)]
pub struct SharedImageState(Arc<Mutex<ImageStateManager>>);

impl SharedImageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state. A poisoned lock is recovered; every mutation leaves
    /// the state consistent.
    pub fn lock(&self) -> MutexGuard<'_, ImageStateManager> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ImageStateSnapshot {
        self.lock().snapshot()
    }
}
