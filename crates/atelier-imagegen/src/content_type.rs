use std::path::Path;

/// Content type used when the filename gives nothing better
pub const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Pick the MIME type of an uploaded image from its filename
///
/// Only the extension is consulted; the bytes are never inspected. Only image
/// types are known, so a non-image name such as `notes.txt` yields the fallback.
pub fn resolve(filename: Option<&str>) -> &'static str {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| by_extension(&ext.to_ascii_lowercase()))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

fn by_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };

    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(resolve(Some("cat.png")), "image/png");
        assert_eq!(resolve(Some("cat.jpg")), "image/jpeg");
        assert_eq!(resolve(Some("cat.jpeg")), "image/jpeg");
        assert_eq!(resolve(Some("cat.webp")), "image/webp");
        assert_eq!(resolve(Some("cat.gif")), "image/gif");
        assert_eq!(resolve(Some("scan.tiff")), "image/tiff");
        assert_eq!(resolve(Some("logo.svg")), "image/svg+xml");
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(resolve(Some("IMG_0001.JPG")), "image/jpeg");
        assert_eq!(resolve(Some("Photo.WebP")), "image/webp");
    }

    #[test]
    fn paths_use_last_extension() {
        assert_eq!(resolve(Some("uploads/archive.tar.gif")), "image/gif");
        assert_eq!(resolve(Some("dir.jpg/image")), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn falls_back_to_png() {
        assert_eq!(resolve(None), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some("")), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some("README")), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some("notes.txt")), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some("report.pdf")), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some(".png")), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve(Some("trailing.")), FALLBACK_CONTENT_TYPE);
    }
}
