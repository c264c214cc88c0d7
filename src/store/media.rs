//! Extension to media-type mapping for file retrieval.

/// Extensions served with an `image/<ext>` content type.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Content type for everything that is not a recognised image.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Pick the response content type for a stored file name.
///
/// Matching is case-sensitive on the last extension, so `photo.png` is
/// `image/png` while `photo.PNG` and `archive.tar.gz` are generic binary.
pub fn media_type_for(filename: &str) -> String {
    let extension = match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[idx + 1..],
        _ => return OCTET_STREAM.to_string(),
    };

    if IMAGE_EXTENSIONS.contains(&extension) {
        format!("image/{}", extension)
    } else {
        OCTET_STREAM.to_string()
    }
}
