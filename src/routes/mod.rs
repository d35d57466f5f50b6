use chrono::{Datelike, Utc};
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::tokio::io::AsyncReadExt;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::images;

pub mod admin;
pub mod auth;
pub mod public;

/// Render `name` with the globals every page uses: site name, current year
/// and the pending flash message (or null).
pub(crate) fn render(
    name: &'static str,
    config: &AppConfig,
    flash: Option<FlashMessage<'_>>,
    context: Value,
) -> Template {
    let flash = match flash {
        Some(f) => json!({ "kind": f.kind(), "message": f.message() }),
        None => Value::Null,
    };
    render_with(name, config, flash, context)
}

/// Like [`render`], for pages that show an error inline instead of
/// redirecting with a flash.
pub(crate) fn render_error(
    name: &'static str,
    config: &AppConfig,
    message: &str,
    context: Value,
) -> Template {
    let flash = json!({ "kind": "error", "message": message });
    render_with(name, config, flash, context)
}

fn render_with(name: &'static str, config: &AppConfig, flash: Value, mut context: Value) -> Template {
    context["site_name"] = json!(config.site_name);
    context["year"] = json!(Utc::now().year());
    context["flash"] = flash;
    Template::render(name, &context)
}

/// Trimmed form value, with blank turned into `None`.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Store an uploaded image. `Ok(None)` means no file was chosen.
pub(crate) async fn save_image(
    config: &AppConfig,
    file: Option<&TempFile<'_>>,
) -> Result<Option<String>, String> {
    let file = match file {
        Some(f) if f.len() > 0 => f,
        _ => return Ok(None),
    };

    let original_name = file
        .raw_name()
        .map(|rn| rn.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();
    if images::allowed_extension(&original_name).is_none() {
        return Err(format!("Unsupported image type: {}", original_name));
    }

    let mut bytes = Vec::with_capacity(file.len() as usize);
    let reader = file.open().await.map_err(|e| e.to_string())?;
    rocket::tokio::pin!(reader);
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| e.to_string())?;

    let dir = config.upload_dir.clone();
    rocket::tokio::task::spawn_blocking(move || {
        images::process_upload(&dir, &bytes, &original_name)
    })
    .await
    .map_err(|e| e.to_string())?
    .map(Some)
}
