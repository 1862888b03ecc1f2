use crate::error::AppError;

/// Where the vision model will fetch the image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Inline `data:image/...;base64,` payload.
    DataUri { mime: String },
    Url,
}

/// Data URIs larger than this are rejected before reaching the model.
pub const MAX_DATA_URI_BYTES: usize = 20 * 1024 * 1024;

pub fn classify_image_reference(reference: &str) -> Result<ImageReference, AppError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(AppError::validation("imageUrl is required"));
    }

    if let Some(rest) = reference.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::validation("malformed data URI"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::validation("data URI must be base64 encoded"))?;
        if ext_from_mime(mime).is_none() {
            return Err(AppError::validation(format!(
                "unsupported image type {mime}"
            )));
        }
        if payload.is_empty() {
            return Err(AppError::validation("data URI has no image data"));
        }
        if reference.len() > MAX_DATA_URI_BYTES {
            return Err(AppError::validation("image is too large"));
        }
        return Ok(ImageReference::DataUri {
            mime: mime.to_string(),
        });
    }

    if reference.starts_with("https://") || reference.starts_with("http://") {
        return Ok(ImageReference::Url);
    }

    Err(AppError::validation(
        "imageUrl must be a data:image URI or an http(s) URL",
    ))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Short form for logs and persisted meal entries: inline payloads are not stored.
pub fn reference_for_storage(reference: &str) -> Option<String> {
    match classify_image_reference(reference) {
        Ok(ImageReference::Url) => Some(reference.trim().to_string()),
        _ => None,
    }
}
