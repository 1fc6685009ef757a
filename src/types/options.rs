use serde::{Deserialize, Serialize};
use std::fmt;

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Jpeg,
    Png,
    Jpg,
}

impl ImageFormat {
    /// Formats in the order the options surface offers them.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Webp,
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Jpg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }

    /// Case-insensitive parse of a format name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "webp" => Some(ImageFormat::Webp),
            "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "jpg" => Some(ImageFormat::Jpg),
            _ => None,
        }
    }

    /// Whether the quality setting applies to this format.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageFormat::Webp | ImageFormat::Jpeg | ImageFormat::Jpg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion options sent with a request. `None` means no constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionOptions {
    pub target_format: ImageFormat,
    pub quality: Option<u8>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub max_size_mb: Option<f64>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_format: ImageFormat::Webp,
            quality: Some(100),
            max_width: None,
            max_height: None,
            max_size_mb: None,
        }
    }
}

impl ConversionOptions {
    /// Returns a copy with every field present in `patch` overwritten.
    pub fn apply(&self, patch: &ConversionOptionsPatch) -> Self {
        Self {
            target_format: patch.target_format.unwrap_or(self.target_format),
            quality: patch.quality.unwrap_or(self.quality),
            max_width: patch.max_width.unwrap_or(self.max_width),
            max_height: patch.max_height.unwrap_or(self.max_height),
            max_size_mb: patch.max_size_mb.unwrap_or(self.max_size_mb),
        }
    }
}

/// Partial update of `ConversionOptions`.
///
/// The outer `Option` says whether the field is part of the patch; the inner
/// one is the new value, so `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionOptionsPatch {
    pub target_format: Option<ImageFormat>,
    pub quality: Option<Option<u8>>,
    pub max_width: Option<Option<u32>>,
    pub max_height: Option<Option<u32>>,
    pub max_size_mb: Option<Option<f64>>,
}

impl ConversionOptionsPatch {
    pub fn target_format(format: ImageFormat) -> Self {
        Self {
            target_format: Some(format),
            ..Self::default()
        }
    }

    pub fn quality(quality: Option<u8>) -> Self {
        Self {
            quality: Some(quality),
            ..Self::default()
        }
    }

    pub fn max_width(width: Option<u32>) -> Self {
        Self {
            max_width: Some(width),
            ..Self::default()
        }
    }

    pub fn max_height(height: Option<u32>) -> Self {
        Self {
            max_height: Some(height),
            ..Self::default()
        }
    }

    pub fn max_size_mb(size: Option<f64>) -> Self {
        Self {
            max_size_mb: Some(size),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
