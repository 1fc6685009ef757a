use std::fmt;

// === UploadError ===

/// Errors raised locally by the file selection surface, before any request.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadError {
    /// The interaction did not carry a file.
    NoFile,
    /// More than one file was dropped in a single interaction.
    TooManyFiles(usize),
    /// The file extension is not a recognized image type.
    UnsupportedType(String),
    /// The file exceeds the client-side size bound.
    FileTooLarge { name: String, size: u64, limit: u64 },
    /// The file could not be read from disk.
    IoError(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NoFile => write!(f, "No file selected"),
            UploadError::TooManyFiles(count) => {
                write!(f, "Only one file can be selected at a time (got {})", count)
            }
            UploadError::UnsupportedType(name) => {
                write!(f, "Unsupported image type: {}", name)
            }
            UploadError::FileTooLarge { name, size, limit } => write!(
                f,
                "File too large: {} ({} bytes, limit {} bytes)",
                name, size, limit
            ),
            UploadError::IoError(msg) => write!(f, "Failed to read file: {}", msg),
        }
    }
}

impl std::error::Error for UploadError {}

// === OptionsError ===

/// Errors raised by the options surface when an input cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsError {
    /// The input is not a number of the expected kind.
    InvalidNumber { field: String, input: String },
    /// The number parsed but is not positive.
    NotPositive { field: String, input: String },
    /// The format name is not one of the selectable target formats.
    UnknownFormat(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::InvalidNumber { field, input } => {
                write!(f, "Invalid number for {}: {}", field, input)
            }
            OptionsError::NotPositive { field, input } => {
                write!(f, "Value for {} must be positive: {}", field, input)
            }
            OptionsError::UnknownFormat(format) => write!(f, "Unknown target format: {}", format),
        }
    }
}

impl std::error::Error for OptionsError {}

// === ConversionError ===

pub const MSG_INVALID_IMAGE: &str = "잘못된 이미지 파일입니다.";
pub const MSG_SERVER_ERROR: &str = "서버에서 이미지 변환 중 오류가 발생했습니다.";
pub const MSG_TIMEOUT: &str = "요청 시간이 초과되었습니다. 파일 크기를 확인해주세요.";
pub const MSG_CONVERSION_FAILED: &str = "이미지 변환 중 오류가 발생했습니다.";

/// Errors produced by a conversion attempt against the remote service.
///
/// `Display` renders the user-facing message stored in the conversion state.
/// `Transport` and `Unexpected` keep their cause for logging only.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The service returned a structured `detail` message.
    Detail(String),
    /// HTTP 400: the service rejected the input image.
    InvalidImage,
    /// HTTP 500: the service failed while converting.
    ServerError,
    /// The request exceeded the client timeout.
    Timeout,
    /// Any other transport failure or unmapped status.
    Transport(String),
    /// A failure outside the transport, e.g. an undecodable response body.
    Unexpected(String),
}

impl ConversionError {
    /// Returns the message shown to the user.
    pub fn user_message(&self) -> &str {
        match self {
            ConversionError::Detail(detail) => detail,
            ConversionError::InvalidImage => MSG_INVALID_IMAGE,
            ConversionError::ServerError => MSG_SERVER_ERROR,
            ConversionError::Timeout => MSG_TIMEOUT,
            ConversionError::Transport(_) | ConversionError::Unexpected(_) => {
                MSG_CONVERSION_FAILED
            }
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ConversionError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === ResultError ===

/// Errors related to saving a converted image.
#[derive(Debug)]
pub enum ResultError {
    /// There is no converted image to save.
    NoResult,
    /// Writing the converted image failed.
    IoError(String),
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultError::NoResult => write!(f, "No converted image available"),
            ResultError::IoError(msg) => write!(f, "Failed to save converted image: {}", msg),
        }
    }
}

impl std::error::Error for ResultError {}
