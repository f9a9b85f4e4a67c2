//! Shared public id generation for image store backends.

use uuid::Uuid;

/// Generate a fresh upload key. Every attempt for one file reuses the same key.
pub fn new_upload_key() -> String {
    Uuid::new_v4().to_string()
}

/// Public id for `upload_key`, optionally nested under `folder`.
#[cfg_attr(not(feature = "store-cloudinary"), allow(dead_code))]
pub fn scoped_public_id(folder: Option<&str>, upload_key: &str) -> String {
    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{}/{}", folder, upload_key),
        None => upload_key.to_string(),
    }
}

/// File extension for a supported image content type.
#[cfg_attr(not(feature = "store-local"), allow(dead_code))]
pub fn extension_for(content_type: &str) -> &'static str {
    let normalized = content_type
        .split(';')
        .next()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    match normalized.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_with_folder() {
        let key = new_upload_key();
        let id = scoped_public_id(Some("/posts/"), &key);
        assert_eq!(id, format!("posts/{}", key));
    }

    #[test]
    fn test_public_id_without_folder() {
        assert_eq!(scoped_public_id(None, "abc"), "abc");
        assert_eq!(scoped_public_id(Some(""), "abc"), "abc");
    }

    #[test]
    fn test_upload_keys_are_unique() {
        let a = new_upload_key();
        let b = new_upload_key();
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("Image/PNG; charset=binary"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("application/pdf"), "bin");
    }
}
