use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use std::path::Path;
use tokio::fs;

use crate::error::RecipeError;

/// Reads an image file and encodes it as a `data:` URI
///
/// # Arguments
/// * `image_path` - Path to the selected image
///
/// # Errors
/// Returns `RecipeError::ImageEncoding` if the file cannot be read or is empty
pub async fn encode_image_file(image_path: &Path) -> Result<String, RecipeError> {
    let image_data = fs::read(image_path).await.map_err(|e| {
        RecipeError::ImageEncoding(format!("{}: {}", image_path.display(), e))
    })?;

    if image_data.is_empty() {
        return Err(RecipeError::ImageEncoding(format!(
            "{}: file is empty",
            image_path.display()
        )));
    }

    let mime = detect_image_mime(&image_data)
        .or_else(|| mime_from_extension(image_path))
        .unwrap_or_else(|| {
            warn!(
                "Could not determine image type of {}, sending as octet-stream",
                image_path.display()
            );
            "application/octet-stream"
        });

    debug!(
        "Encoding {} ({} bytes, {})",
        image_path.display(),
        image_data.len(),
        mime
    );

    Ok(to_data_uri(mime, &image_data))
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Sniffs the MIME type from the file's magic bytes
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x42, 0x4D, ..] => Some("image/bmp"),
        _ => None,
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
