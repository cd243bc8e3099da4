use std::fs;
use std::io;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

/// Decode a base64 check-in photo. Tolerates an optional
/// `data:image/...;base64,` prefix as sent by browser canvas captures.
pub fn decode_base64_image(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let raw = match payload.split_once(",") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    STANDARD.decode(raw.trim())
}

/// File name for a stored check-in photo. Extension follows the data
/// URI mime when present, otherwise defaults to jpg.
pub fn photo_file_name(user_id: u64, payload: &str) -> String {
    let ext = if payload.starts_with("data:image/png") {
        "png"
    } else if payload.starts_with("data:image/webp") {
        "webp"
    } else {
        "jpg"
    };
    format!("checkin_{}_{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Write photo bytes under `dir` and return the public URL path the
/// static file service exposes it at.
pub fn write_photo(dir: &str, file_name: &str, bytes: &[u8]) -> io::Result<String> {
    fs::create_dir_all(dir)?;
    fs::write(Path::new(dir).join(file_name), bytes)?;
    Ok(format!("/uploads/{}", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_raw_base64() {
        assert_eq!(decode_base64_image("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn strips_data_uri_prefix() {
        let payload = "data:image/jpeg;base64,aGVsbG8=";
        assert_eq!(decode_base64_image(payload).unwrap(), b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_base64_image("!!not base64!!").is_err());
    }

    #[test]
    fn picks_extension_from_mime() {
        assert!(photo_file_name(7, "data:image/png;base64,xxx").ends_with(".png"));
        assert!(photo_file_name(7, "data:image/jpeg;base64,xxx").ends_with(".jpg"));
        assert!(photo_file_name(7, "aGVsbG8=").ends_with(".jpg"));
        assert!(photo_file_name(7, "x").starts_with("checkin_7_"));
    }
}
