//! Transport decoding, size limits, and signature checks

use crate::error::{PayloadError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docex_domain::{DocumentPayload, FileType};

/// Decode a payload into raw bytes, enforcing `limit`
///
/// Base64 input is checked against the limit before decoding (by estimated
/// decoded size) and again after.
pub fn decode_payload(payload: &DocumentPayload, limit: usize) -> Result<Vec<u8>> {
    let bytes = match payload {
        DocumentPayload::Bytes(bytes) => {
            check_size(bytes.len(), limit)?;
            bytes.clone()
        }
        DocumentPayload::Base64(text) => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                return Err(PayloadError::Malformed("document payload is empty".to_string()));
            }
            check_size(compact.len() / 4 * 3, limit)?;
            let decoded = STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| PayloadError::Malformed(format!("invalid base64 encoding: {}", e)))?;
            check_size(decoded.len(), limit)?;
            decoded
        }
    };

    if bytes.is_empty() {
        return Err(PayloadError::Malformed("document payload is empty".to_string()));
    }
    Ok(bytes)
}

fn check_size(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        Err(PayloadError::Oversize { size, limit })
    } else {
        Ok(())
    }
}

/// Parse a declared file type
pub fn parse_file_type(declared: &str) -> Result<FileType> {
    FileType::parse(declared).ok_or_else(|| PayloadError::UnsupportedType(declared.trim().to_string()))
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Check that the bytes start like the declared type
pub fn verify_signature(bytes: &[u8], file_type: FileType) -> Result<()> {
    let matches = match file_type {
        // Some producers emit junk before the header
        FileType::Pdf => bytes
            .windows(PDF_SIGNATURE.len())
            .take(1024)
            .any(|w| w == PDF_SIGNATURE),
        FileType::Docx => bytes.starts_with(ZIP_SIGNATURE),
        FileType::Png => bytes.starts_with(PNG_SIGNATURE),
        FileType::Jpg => bytes.starts_with(JPEG_SIGNATURE),
    };

    if matches {
        Ok(())
    } else {
        Err(PayloadError::Malformed(format!(
            "payload does not decode as a {} document",
            file_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        let payload = DocumentPayload::Base64("aGVs\nbG8=".to_string());
        assert_eq!(decode_payload(&payload, 100).unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let payload = DocumentPayload::Base64("not base64 at all!".to_string());
        assert!(matches!(decode_payload(&payload, 100), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_empty_payload_is_malformed() {
        let payload = DocumentPayload::Base64(String::new());
        assert!(matches!(decode_payload(&payload, 100), Err(PayloadError::Malformed(_))));
        assert!(matches!(
            decode_payload(&DocumentPayload::Bytes(vec![]), 100),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_oversize_rejected_before_decoding() {
        // 400 base64 chars is ~300 decoded bytes
        let payload = DocumentPayload::Base64("A".repeat(400));
        let err = decode_payload(&payload, 100).unwrap_err();
        assert_eq!(err.reason(), "oversize");
    }

    #[test]
    fn test_oversize_raw_bytes() {
        let err = decode_payload(&DocumentPayload::Bytes(vec![0; 11]), 10).unwrap_err();
        assert_eq!(err, PayloadError::Oversize { size: 11, limit: 10 });
    }

    #[test]
    fn test_parse_file_type() {
        assert_eq!(parse_file_type(" JPEG ").unwrap(), FileType::Jpg);
        assert_eq!(
            parse_file_type("tiff").unwrap_err(),
            PayloadError::UnsupportedType("tiff".to_string())
        );
    }

    #[test]
    fn test_signatures() {
        assert!(verify_signature(b"%PDF-1.4\n...", FileType::Pdf).is_ok());
        assert!(verify_signature(b"\n\n%PDF-1.7", FileType::Pdf).is_ok());
        assert!(verify_signature(b"PK\x03\x04rest", FileType::Docx).is_ok());
        assert!(verify_signature(&[0xff, 0xd8, 0xff, 0xe0], FileType::Jpg).is_ok());
        assert!(verify_signature(b"%PDF-1.4", FileType::Png).is_err());
        assert!(verify_signature(b"hello", FileType::Pdf).is_err());
    }
}
