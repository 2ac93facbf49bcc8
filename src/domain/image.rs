//! Recipe images
//!
//! Images arrive either already decoded or as a `data:image/<ext>;base64,...`
//! string. Decoding yields bytes plus a content-addressed file name; storing
//! the bytes is the media layer's job.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use super::DomainError;

/// Storage prefix for recipe images
pub const IMAGE_PREFIX: &str = "recipes/images";

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const MAX_EXTENSION_LEN: usize = 10;

/// Image as received from the boundary layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Bytes already decoded by the caller, with their file extension
    Decoded { bytes: Vec<u8>, extension: String },
    /// `data:image/<ext>;base64,<payload>`
    DataUri(String),
}

impl From<String> for ImageInput {
    fn from(value: String) -> Self {
        ImageInput::DataUri(value)
    }
}

/// Image ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Storage key, `recipes/images/<sha256>.<ext>`
    pub key: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// Decode into bytes and derive the storage key.
    ///
    /// The key depends only on the content and extension, so uploading the
    /// same picture twice resolves to the same stored resource.
    pub fn decode(self) -> Result<DecodedImage, DomainError> {
        let (bytes, extension) = match self {
            ImageInput::Decoded { bytes, extension } => (bytes, extension.to_ascii_lowercase()),
            ImageInput::DataUri(uri) => parse_data_uri(&uri)?,
        };

        if bytes.is_empty() {
            return Err(DomainError::validation("Image is empty"));
        }
        validate_extension(&extension)?;

        let digest = hex::encode(Sha256::digest(&bytes));
        Ok(DecodedImage {
            key: format!("{}/{}.{}", IMAGE_PREFIX, digest, extension),
            bytes,
        })
    }
}

fn parse_data_uri(uri: &str) -> Result<(Vec<u8>, String), DomainError> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| DomainError::validation("Image must be a data:image/<ext>;base64 URI"))?;

    let (extension, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| DomainError::validation("Image data URI must be base64 encoded"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::validation(format!("Invalid base64 image payload: {}", e)))?;

    Ok((bytes, extension.to_ascii_lowercase()))
}

fn validate_extension(extension: &str) -> Result<(), DomainError> {
    let valid = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric());

    if valid {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Unsupported image extension: {:?}",
            extension
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_uri(payload: &[u8]) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(payload))
    }

    #[test]
    fn test_decode_data_uri() {
        let image = ImageInput::DataUri(png_uri(b"fake-png-bytes")).decode().unwrap();

        assert_eq!(image.bytes, b"fake-png-bytes");
        assert!(image.key.starts_with("recipes/images/"));
        assert!(image.key.ends_with(".png"));
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = ImageInput::DataUri(png_uri(b"same")).decode().unwrap();
        let b = ImageInput::Decoded {
            bytes: b"same".to_vec(),
            extension: "PNG".to_string(),
        }
        .decode()
        .unwrap();
        let c = ImageInput::DataUri(png_uri(b"other")).decode().unwrap();

        assert_eq!(a.key, b.key);
        assert_ne!(a.key, c.key);
    }

    #[test]
    fn test_rejects_plain_string() {
        let err = ImageInput::from("https://example.com/cake.png".to_string())
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_rejects_bad_base64() {
        let err = ImageInput::DataUri("data:image/jpeg;base64,@@@".to_string())
            .decode()
            .unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_rejects_path_like_extension() {
        let uri = format!("data:image/../x;base64,{}", STANDARD.encode(b"abc"));
        assert!(ImageInput::DataUri(uri).decode().is_err());
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = ImageInput::DataUri("data:image/png;base64,".to_string())
            .decode()
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
