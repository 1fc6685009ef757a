//! Options surface: edits conversion options as merge-patches on the shared state.

use crate::managers::image_state_manager::{ImageStateManagerTrait, SharedImageState};
use crate::types::errors::OptionsError;
use crate::types::options::{ConversionOptions, ConversionOptionsPatch, ImageFormat};

/// Slider position shown when no quality is set.
pub const DEFAULT_SLIDER_QUALITY: u8 = 85;

/// Trait defining option editing operations.
pub trait OptionsEditorTrait {
    fn available_formats(&self) -> [ImageFormat; 4];
    fn select_format(&self, format: ImageFormat);
    fn set_quality(&self, quality: u8);
    fn set_max_width(&self, input: &str) -> Result<(), OptionsError>;
    fn set_max_height(&self, input: &str) -> Result<(), OptionsError>;
    fn set_max_size_mb(&self, input: &str) -> Result<(), OptionsError>;
    fn quality_visible(&self) -> bool;
    fn slider_value(&self) -> u8;
    fn options(&self) -> ConversionOptions;
    fn apply(&self, patch: ConversionOptionsPatch);
}

/// Parses an optional positive integer field. Empty input means "no constraint".
pub fn parse_dimension(field: &str, input: &str) -> Result<Option<u32>, OptionsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: i64 = trimmed.parse().map_err(|_| OptionsError::InvalidNumber {
        field: field.to_string(),
        input: input.to_string(),
    })?;
    if value <= 0 {
        return Err(OptionsError::NotPositive {
            field: field.to_string(),
            input: input.to_string(),
        });
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| OptionsError::InvalidNumber {
            field: field.to_string(),
            input: input.to_string(),
        })
}

/// Parses an optional positive decimal field. Empty input means "no constraint".
pub fn parse_size_mb(input: &str) -> Result<Option<f64>, OptionsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| OptionsError::InvalidNumber {
            field: "max_size_mb".to_string(),
            input: input.to_string(),
        })?;
    if value <= 0.0 {
        return Err(OptionsError::NotPositive {
            field: "max_size_mb".to_string(),
            input: input.to_string(),
        });
    }
    Ok(Some(value))
}

/// Options surface bound to the shared conversion state.
#[derive(Debug, Clone)]
pub struct OptionsEditor {
    state: SharedImageState,
}

impl OptionsEditor {
    pub fn new(state: SharedImageState) -> Self {
        Self { state }
    }
}

impl OptionsEditorTrait for OptionsEditor {
    fn available_formats(&self) -> [ImageFormat; 4] {
        ImageFormat::ALL
    }

    fn select_format(&self, format: ImageFormat) {
        self.apply(ConversionOptionsPatch::target_format(format));
    }

    /// Sets the quality, clamped to the slider range 1–100.
    fn set_quality(&self, quality: u8) {
        self.apply(ConversionOptionsPatch::quality(Some(quality.clamp(1, 100))));
    }

    fn set_max_width(&self, input: &str) -> Result<(), OptionsError> {
        let width = parse_dimension("max_width", input)?;
        self.apply(ConversionOptionsPatch::max_width(width));
        Ok(())
    }

    fn set_max_height(&self, input: &str) -> Result<(), OptionsError> {
        let height = parse_dimension("max_height", input)?;
        self.apply(ConversionOptionsPatch::max_height(height));
        Ok(())
    }

    fn set_max_size_mb(&self, input: &str) -> Result<(), OptionsError> {
        let size = parse_size_mb(input)?;
        self.apply(ConversionOptionsPatch::max_size_mb(size));
        Ok(())
    }

    /// The quality slider only applies to lossy formats.
    fn quality_visible(&self) -> bool {
        self.state
            .lock()
            .conversion_options()
            .target_format
            .is_lossy()
    }

    fn slider_value(&self) -> u8 {
        self.state
            .lock()
            .conversion_options()
            .quality
            .unwrap_or(DEFAULT_SLIDER_QUALITY)
    }

    fn options(&self) -> ConversionOptions {
        self.state.lock().conversion_options().clone()
    }

    /// Merges several field changes in one update.
    fn apply(&self, patch: ConversionOptionsPatch) {
        self.state.lock().set_conversion_options(&patch);
    }
}
