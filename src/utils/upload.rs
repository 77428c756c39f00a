use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::AppError;

/// Subdirectory of the media root for blog cover images.
pub const BLOG_IMAGE_DIR: &str = "blog-images";

/// Subdirectory of the media root for profile avatars.
pub const AVATAR_DIR: &str = "avatars";

/// Accepted image file extensions, lowercase.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// An uploaded file pulled out of a multipart request.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Drain a multipart form into its text fields and at most one file field.
///
/// Browsers submit an empty part for a file input left blank; those are
/// treated as "no upload".
pub async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(HashMap<String, String>, Option<UploadedFile>), AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = part.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let filename = part.file_name().unwrap_or_default().to_string();
            let bytes = part
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            if !filename.is_empty() && !bytes.is_empty() {
                file = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = part
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
            fields.insert(name, value);
        }
    }

    Ok((fields, file))
}

/// Validate an uploaded filename and return its lowercased image extension.
pub fn image_extension(filename: &str) -> Result<String, AppError> {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed.contains('\0') || trimmed.chars().any(|c| c.is_ascii_control())
    {
        return Err(AppError::Validation("Invalid upload filename".into()));
    }

    // Only the extension is kept; the rest of the client-supplied name is
    // discarded, so path separators just mean we look at the last segment.
    let ext = trimmed
        .rsplit(['/', '\\'])
        .next()
        .and_then(|base| base.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| AppError::Validation("Upload must have a file extension".into()))?;

    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported image type '.{ext}' (allowed: png, jpg, jpeg, gif, webp)"
        )));
    }

    Ok(ext)
}

/// Write an uploaded image under `<media_root>/<subdir>/` with a generated
/// name, returning the path relative to the media root.
pub async fn save_image(
    media_root: &Path,
    subdir: &str,
    file: &UploadedFile,
) -> Result<String, AppError> {
    let ext = image_extension(&file.filename)?;
    let stored_name = format!("{}.{ext}", Uuid::new_v4());

    let dir = media_root.join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create media dir: {e}")))?;
    tokio::fs::write(dir.join(&stored_name), &file.bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write upload: {e}")))?;

    Ok(format!("{subdir}/{stored_name}"))
}
