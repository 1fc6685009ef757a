use serde::{Deserialize, Serialize};

/// Progress of the current conversion attempt as shown to the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionProgress {
    pub is_converting: bool,
    pub progress: u8,
    pub message: String,
}

impl ConversionProgress {
    pub fn apply(&self, patch: &ProgressPatch) -> Self {
        Self {
            is_converting: patch.is_converting.unwrap_or(self.is_converting),
            progress: patch.progress.unwrap_or(self.progress),
            message: patch
                .message
                .clone()
                .unwrap_or_else(|| self.message.clone()),
        }
    }
}

/// Partial update of `ConversionProgress`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub is_converting: Option<bool>,
    pub progress: Option<u8>,
    pub message: Option<String>,
}

impl ProgressPatch {
    /// Patch touching only the percentage.
    pub fn percent(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Patch setting the percentage and message.
    pub fn step(progress: u8, message: &str) -> Self {
        Self {
            is_converting: None,
            progress: Some(progress),
            message: Some(message.to_string()),
        }
    }

    /// Patch setting all three fields.
    pub fn full(is_converting: bool, progress: u8, message: &str) -> Self {
        Self {
            is_converting: Some(is_converting),
            progress: Some(progress),
            message: Some(message.to_string()),
        }
    }
}
