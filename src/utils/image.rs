use std::path::Path;
use anyhow::{Context, Error};

/// load_image_bytes reads an uploaded image from disk.
///
/// # Arguments
/// * `path` - path of the image file
///
/// # Returns
/// * `Result<Vec<u8>, Error>`
pub async fn load_image_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, Error> {
    let path = path.as_ref();
    let im_bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;

    if im_bytes.is_empty() {
        return Err(Error::msg(format!("image {} is empty", path.display())))
    }
    Ok(im_bytes)
}

/// image_mime_type sniffs the container format from the leading bytes.
pub fn image_mime_type(im_bytes: &[u8]) -> &'static str {
    match im_bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => "application/octet-stream",
    }
}
