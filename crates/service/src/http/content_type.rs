//! Content-Type resolution for served object bytes.
//!
//! Magic bytes win over the key's extension; content that neither
//! identifies is served as plain text.

/// Resolve the Content-Type for a blob about to be served.
pub fn resolve(key: &str, body: &[u8]) -> String {
    if let Some(kind) = infer::get(body) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(key)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| "text/plain".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_win_over_extension() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";
        assert_eq!(resolve("misnamed.txt", png), "image/png");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(resolve("notes/readme.html", b"hello there"), "text/html");
    }

    #[test]
    fn test_generic_text_default() {
        assert_eq!(resolve("LICENSE", b"plain words"), "text/plain");
    }
}
