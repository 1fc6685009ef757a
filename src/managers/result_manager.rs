//! Result surface: summary, download and start-over for a finished conversion.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::format::format_file_size;
use crate::managers::image_state_manager::{ImageStateManagerTrait, SharedImageState};
use crate::types::errors::ResultError;
use crate::types::options::ImageFormat;

/// Display lines of the result card. Absent entries are not shown.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResultSummary {
    pub url: String,
    pub format: String,
    pub dimensions: Option<String>,
    pub quality: Option<String>,
    pub dimension_limit: Option<String>,
    pub size_limit: Option<String>,
}

/// Name of the downloaded file: `<stem>_converted.<format>`.
pub fn download_file_name(original: &str, format: ImageFormat) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}_converted.{}", stem, format.as_str())
}

/// Trait defining result operations.
pub trait ResultManagerTrait {
    fn summary(&self) -> Option<ResultSummary>;
    fn save_result(&self, dir: Option<&Path>) -> Result<PathBuf, ResultError>;
    fn start_over(&self);
}

/// Result surface bound to the shared conversion state.
#[derive(Debug, Clone)]
pub struct ResultManager {
    state: SharedImageState,
}

impl ResultManager {
    pub fn new(state: SharedImageState) -> Self {
        Self { state }
    }
}

impl ResultManagerTrait for ResultManager {
    fn summary(&self) -> Option<ResultSummary> {
        let state = self.state.lock();
        let url = state.converted_image_url()?;
        let options = state.conversion_options();

        let dimensions = state.converted_metadata().map(|meta| {
            format!(
                "{} × {} / {}",
                meta.width,
                meta.height,
                format_file_size(meta.size)
            )
        });

        let dimension_limit = match (options.max_width, options.max_height) {
            (Some(w), Some(h)) => Some(format!("{}px × {}px", w, h)),
            (Some(w), None) => Some(format!("{}px", w)),
            (None, Some(h)) => Some(format!("{}px", h)),
            (None, None) => None,
        };

        Some(ResultSummary {
            url: url.as_str().to_string(),
            format: options.target_format.as_str().to_uppercase(),
            dimensions,
            quality: options.quality.map(|q| format!("{}%", q)),
            dimension_limit,
            size_limit: options.max_size_mb.map(|mb| format!("{}MB 이하", mb)),
        })
    }

    /// Writes the converted image to disk.
    ///
    /// Without an explicit directory the file lands next to the source file,
    /// or in the current directory for in-memory selections.
    fn save_result(&self, dir: Option<&Path>) -> Result<PathBuf, ResultError> {
        let (bytes, file_name, source_dir) = {
            let state = self.state.lock();
            let url = state.converted_image_url().ok_or(ResultError::NoResult)?;
            let file = state.selected_file().ok_or(ResultError::NoResult)?;
            let name = download_file_name(&file.name, state.conversion_options().target_format);
            let source_dir = file
                .path
                .as_ref()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf);
            (url.blob().clone(), name, source_dir)
        };

        let target_dir = dir
            .map(Path::to_path_buf)
            .or(source_dir)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));

        fs::create_dir_all(&target_dir).map_err(|e| ResultError::IoError(e.to_string()))?;
        let target = target_dir.join(file_name);
        fs::write(&target, bytes.bytes()).map_err(|e| ResultError::IoError(e.to_string()))?;

        log::info!("Saved converted image to {}", target.display());
        Ok(target)
    }

    /// Releases the result and restores the initial state.
    fn start_over(&self) {
        self.state.lock().reset();
    }
}
