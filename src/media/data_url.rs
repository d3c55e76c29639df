//! `data:` URL encoding and decoding.
//!
//! Only the base64 form (`data:<mime>;base64,<payload>`) is produced.  The
//! decoder also accepts the percent-free plain form (`data:<mime>,<text>`)
//! because some services hand those back for tiny payloads.

use base64::{engine::general_purpose, Engine as _};

use super::MediaError;

/// MIME type used when nothing better is known.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Returns `true` when `reference` is an inline `data:` URL.
pub fn is_data_url(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Encode `bytes` as `data:<mime>;base64,...`.
pub fn encode(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Sniff the MIME type of `bytes` from their magic number.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Encode `bytes`, preferring `declared` and falling back to sniffing.
pub fn encode_with_mime(bytes: &[u8], declared: Option<&str>) -> String {
    let mime = declared
        .filter(|m| !m.is_empty())
        .or_else(|| sniff_mime(bytes))
        .unwrap_or(FALLBACK_MIME);
    encode(bytes, mime)
}

/// Decode a `data:` URL back into its MIME type and bytes.
pub fn decode(data_url: &str) -> Result<DecodedDataUrl, MediaError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidDataUrl("missing data: prefix".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::InvalidDataUrl("missing ',' separator".into()))?;

    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };

    let bytes = if is_base64 {
        general_purpose::STANDARD.decode(payload.trim())?
    } else {
        payload.as_bytes().to_vec()
    };

    let mime = if mime.is_empty() {
        "text/plain".to_string()
    } else {
        mime.to_string()
    };

    Ok(DecodedDataUrl { mime, bytes })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn encode_produces_base64_data_url() {
        assert_eq!(encode(b"hi", "text/plain"), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn decode_reverses_encode() {
        let url = encode(JPEG_MAGIC, "image/jpeg");
        let decoded = decode(&url).unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.bytes, JPEG_MAGIC);
    }

    #[test]
    fn sniffing_recognises_png_and_jpeg() {
        assert_eq!(sniff_mime(PNG_MAGIC), Some("image/png"));
        assert_eq!(sniff_mime(JPEG_MAGIC), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"plain text"), None);
    }

    #[test]
    fn declared_mime_beats_sniffing() {
        let url = encode_with_mime(PNG_MAGIC, Some("image/x-custom"));
        assert!(url.starts_with("data:image/x-custom;base64,"));
    }

    #[test]
    fn empty_declared_mime_falls_back_to_sniffing() {
        let url = encode_with_mime(PNG_MAGIC, Some(""));
        assert!(url.starts_with("data:image/png;base64,"));

        let unknown = encode_with_mime(b"???", None);
        assert!(unknown.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn decode_rejects_non_data_urls() {
        assert!(matches!(
            decode("https://example.com/car.jpg"),
            Err(MediaError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode("data:image/png;base64"),
            Err(MediaError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(
            decode("data:image/png;base64,@@@"),
            Err(MediaError::Base64(_))
        ));
    }

    #[test]
    fn decode_accepts_plain_payload() {
        let decoded = decode("data:,hello").unwrap();
        assert_eq!(decoded.mime, "text/plain");
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn is_data_url_checks_prefix() {
        assert!(is_data_url("data:image/png;base64,AAAA"));
        assert!(!is_data_url("http://example.com/a.png"));
    }
}
