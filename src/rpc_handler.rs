//! RPC method handler for the imgconv JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` dispatches a call to the surfaces and services of `App`.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::options_editor::{parse_dimension, parse_size_mb, OptionsEditorTrait};
use crate::managers::result_manager::ResultManagerTrait;
use crate::managers::upload_manager::UploadManagerTrait;
use crate::services::conversion_orchestrator::ConversionOutcome;
use crate::services::image_service::ImageServiceTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::theme_engine::ThemeEngineTrait;
use crate::types::errors::OptionsError;
use crate::types::file::SelectedFile;
use crate::types::options::{ConversionOptionsPatch, ImageFormat};
use crate::types::settings::Theme;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

/// Reads a field that may arrive as a string, a number or null; null clears.
fn text_field(params: &Value, key: &str) -> Option<String> {
    params.get(key).map(|v| match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Builds an options patch from RPC params. Nothing is applied if any field is invalid.
pub fn options_patch_from_params(params: &Value) -> Result<ConversionOptionsPatch, String> {
    let mut patch = ConversionOptionsPatch::default();

    if let Some(format) = params.get("target_format") {
        let name = format.as_str().ok_or("target_format must be a string")?;
        let format = ImageFormat::parse(name)
            .ok_or_else(|| OptionsError::UnknownFormat(name.to_string()).to_string())?;
        patch.target_format = Some(format);
    }
    match params.get("quality") {
        None => {}
        Some(Value::Null) => patch.quality = Some(None),
        Some(v) => {
            let quality = v.as_u64().ok_or("quality must be a non-negative integer")?;
            patch.quality = Some(Some(quality.clamp(1, 100) as u8));
        }
    }
    if let Some(input) = text_field(params, "max_width") {
        patch.max_width = Some(parse_dimension("max_width", &input).map_err(|e| e.to_string())?);
    }
    if let Some(input) = text_field(params, "max_height") {
        patch.max_height = Some(parse_dimension("max_height", &input).map_err(|e| e.to_string())?);
    }
    if let Some(input) = text_field(params, "max_size_mb") {
        patch.max_size_mb = Some(parse_size_mb(&input).map_err(|e| e.to_string())?);
    }

    Ok(patch)
}

fn options_view(app: &App) -> Value {
    let editor = &app.options_editor;
    json!({
        "options": editor.options(),
        "available_formats": editor.available_formats(),
        "quality_visible": editor.quality_visible(),
        "slider_value": editor.slider_value(),
    })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Only the network-bound methods suspend; the rest never hold a lock
/// across an await.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "convert" => convert(app).await,
        "formats.get" => to_json(app.orchestrator.service().get_supported_formats().await),
        _ => dispatch(app, method, params),
    }
}

async fn convert(app: &App) -> Result<Value, String> {
    let outcome = app.orchestrator.convert().await;
    let (status, error) = match outcome {
        ConversionOutcome::Skipped => ("skipped", None),
        ConversionOutcome::Succeeded => ("succeeded", None),
        ConversionOutcome::Failed(message) => ("failed", Some(message)),
    };
    Ok(json!({
        "status": status,
        "error": error,
        "phase": app.orchestrator.phase(),
        "state": app.state.snapshot(),
    }))
}

fn dispatch(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Conversion state ───
        "state.get" => to_json(app.state.snapshot()),
        "reset" => {
            app.result_manager.start_over();
            to_json(app.state.snapshot())
        }

        // ─── File selection ───
        "file.select" => {
            let mut uploads = app.uploads();
            if let Some(path) = params.get("path").and_then(|v| v.as_str()) {
                uploads
                    .select_path(Path::new(path))
                    .map_err(|e| e.to_string())?;
            } else {
                let name = params.get("name").and_then(|v| v.as_str()).ok_or("missing name")?;
                let data = params.get("data").and_then(|v| v.as_str()).ok_or("missing data")?;
                let bytes = base64_decode(data)?;
                uploads
                    .drop_files(vec![SelectedFile::from_bytes(name, bytes)])
                    .map_err(|e| e.to_string())?;
            }
            let preview = uploads.preview();
            drop(uploads);
            Ok(json!({"file": preview, "state": app.state.snapshot()}))
        }
        "file.remove" => {
            app.uploads().remove_file();
            to_json(app.state.snapshot())
        }
        "file.preview" => {
            let preview = app.uploads().preview();
            to_json(preview)
        }

        // ─── Options ───
        "options.get" => Ok(options_view(app)),
        "options.set" => {
            let patch = options_patch_from_params(params)?;
            app.options_editor.apply(patch);
            Ok(options_view(app))
        }

        // ─── Result ───
        "result.get" => to_json(app.result_manager.summary()),
        "result.save" => {
            let dir = params.get("dir").and_then(|v| v.as_str()).map(Path::new);
            let path = app.save_result(dir).map_err(|e| e.to_string())?;
            Ok(json!({"path": path.to_string_lossy()}))
        }

        // ─── Theme ───
        "theme.get" => {
            let theme = app.themes().get_theme();
            Ok(json!({"theme": theme, "attribute": app.theme_attribute.value()}))
        }
        "theme.toggle" => {
            let theme = app.themes().toggle_theme().map_err(|e| e.to_string())?;
            Ok(json!({"theme": theme, "attribute": app.theme_attribute.value()}))
        }

        // ─── Settings ───
        "settings.get" => {
            let settings = app.settings().get_settings().clone();
            to_json(settings)
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let settings = {
                let mut engine = app.settings();
                engine.set_value(key, value).map_err(|e| e.to_string())?;
                engine.get_settings().clone()
            };
            // Keep the theme engine and its observers in step with the file.
            if key == "appearance.theme" {
                let theme: Theme = settings.appearance.theme;
                app.themes().set_theme(theme).map_err(|e| e.to_string())?;
            }
            to_json(settings)
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
