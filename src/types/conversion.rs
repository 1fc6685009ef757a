use serde::{Deserialize, Serialize};

use super::file::Blob;

/// Successful response of the conversion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub blob: Blob,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

impl ConvertedImage {
    pub fn metadata(&self) -> ConvertedMetadata {
        ConvertedMetadata {
            width: self.width,
            height: self.height,
            size: self.size,
        }
    }
}

/// Dimensions and byte size of the converted image, kept in state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConvertedMetadata {
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

/// Format capabilities advertised by the conversion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupportedFormats {
    pub supported_formats: Vec<String>,
    pub input_formats: Vec<String>,
}

impl Default for SupportedFormats {
    fn default() -> Self {
        let supported: Vec<String> = ["webp", "jpeg", "jpg", "png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut input = supported.clone();
        input.push("bmp".to_string());
        input.push("tiff".to_string());
        Self {
            supported_formats: supported,
            input_formats: input,
        }
    }
}
