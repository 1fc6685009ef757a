//! Remote conversion service client.
//!
//! Posts the selected file with its options as multipart form data, decodes
//! the returned image to learn its dimensions, and maps failures to the
//! messages shown to the user.

use std::future::Future;
use std::io::Cursor;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::managers::object_url_registry::ObjectUrlRegistry;
use crate::types::conversion::{ConvertedImage, SupportedFormats};
use crate::types::errors::ConversionError;
use crate::types::file::{Blob, SelectedFile};
use crate::types::options::ConversionOptions;

/// Trait defining the conversion service operations.
pub trait ImageServiceTrait {
    /// Converts `file` with `options`. Errors carry the user-facing message.
    fn convert_image(
        &self,
        file: &SelectedFile,
        options: &ConversionOptions,
    ) -> impl Future<Output = Result<ConvertedImage, ConversionError>> + Send;

    /// Fetches format capabilities, falling back to the built-in set on any failure.
    fn get_supported_formats(&self) -> impl Future<Output = SupportedFormats> + Send;
}

/// Text fields of the conversion form, in submission order.
///
/// Absent options are omitted, as are zero values.
pub fn form_fields(options: &ConversionOptions) -> Vec<(&'static str, String)> {
    let mut fields = vec![("target_format", options.target_format.as_str().to_string())];

    if let Some(width) = options.max_width.filter(|w| *w > 0) {
        fields.push(("max_width", width.to_string()));
    }
    if let Some(height) = options.max_height.filter(|h| *h > 0) {
        fields.push(("max_height", height.to_string()));
    }
    if let Some(size) = options.max_size_mb.filter(|s| *s > 0.0) {
        fields.push(("max_size_mb", size.to_string()));
    }
    if let Some(quality) = options.quality.filter(|q| *q > 0) {
        fields.push(("quality", quality.to_string()));
    }

    fields
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Maps a non-success response to a conversion error.
///
/// A string `detail` in a JSON body wins; then 400 and 500 get their own
/// messages; anything else is a generic failure.
pub fn map_error_response(status: u16, body: &[u8]) -> ConversionError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_string))
        .filter(|d| !d.is_empty());

    if let Some(detail) = detail {
        return ConversionError::Detail(detail);
    }

    match status {
        400 => ConversionError::InvalidImage,
        500 => ConversionError::ServerError,
        other => ConversionError::Transport(format!("HTTP {}", other)),
    }
}

/// Maps a transport-level failure (no usable response) to a conversion error.
fn map_transport_error(err: &reqwest::Error) -> ConversionError {
    if err.is_timeout() {
        ConversionError::Timeout
    } else {
        ConversionError::Transport(err.to_string())
    }
}

/// Reads the pixel dimensions of an encoded image.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), ConversionError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ConversionError::Unexpected(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ConversionError::Unexpected(e.to_string()))
}

/// reqwest-backed conversion service client.
#[derive(Debug, Clone)]
pub struct ImageService {
    client: Client,
    config: ServiceConfig,
    registry: ObjectUrlRegistry,
}

impl ImageService {
    pub fn new(config: ServiceConfig, registry: ObjectUrlRegistry) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            registry,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn build_form(file: &SelectedFile, options: &ConversionOptions) -> Result<Form, ConversionError> {
        let part = Part::bytes(file.blob.bytes().to_vec())
            .file_name(file.name.clone())
            .mime_str(file.mime_type())
            .map_err(|e| ConversionError::Unexpected(e.to_string()))?;

        let form = form_fields(options)
            .into_iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }

    async fn post_conversion(
        &self,
        file: &SelectedFile,
        options: &ConversionOptions,
    ) -> Result<ConvertedImage, ConversionError> {
        let form = Self::build_form(file, options)?;

        let response = self
            .client
            .post(self.config.convert_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(map_error_response(status.as_u16(), &body));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| map_transport_error(&e))?;
        let blob = Blob::new(bytes.to_vec(), mime_type);

        // The temporary URL only lives for the decode.
        let temp_url = self.registry.create_object_url(blob.clone());
        let dimensions = decode_dimensions(temp_url.blob().bytes());
        temp_url.revoke();
        let (width, height) = dimensions?;

        Ok(ConvertedImage {
            size: blob.size(),
            blob,
            width,
            height,
        })
    }
}

impl ImageServiceTrait for ImageService {
    async fn convert_image(
        &self,
        file: &SelectedFile,
        options: &ConversionOptions,
    ) -> Result<ConvertedImage, ConversionError> {
        log::info!(
            "Converting {} ({} bytes) to {}",
            file.name,
            file.size(),
            options.target_format
        );

        match self.post_conversion(file, options).await {
            Ok(image) => {
                log::info!(
                    "Conversion complete: {}x{}, {} bytes",
                    image.width,
                    image.height,
                    image.size
                );
                Ok(image)
            }
            Err(e) => {
                log::error!("Image conversion failed: {:?}", e);
                Err(e)
            }
        }
    }

    async fn get_supported_formats(&self) -> SupportedFormats {
        let result = async {
            self.client
                .get(self.config.formats_url())
                .send()
                .await?
                .error_for_status()?
                .json::<SupportedFormats>()
                .await
        }
        .await;

        match result {
            Ok(formats) => formats,
            Err(e) => {
                log::warn!("Failed to fetch supported formats: {}", e);
                SupportedFormats::default()
            }
        }
    }
}
