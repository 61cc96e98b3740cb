//! Asset payloads, identifiers and the inline content encoding.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use derive_more::{Deref, Display};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted payload: 5 MiB. Payloads of exactly this size are accepted.
pub const MAX_ASSET_SIZE: usize = 5 * 1024 * 1024;

/// Media type prefix every accepted payload must carry.
pub const ACCEPTED_MEDIA_PREFIX: &str = "image/";

/// Rejection reasons for an upload, checked before any side effect.
///
/// The `Display` output is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The declared media type is not an image.
    #[error("Please select an image file")]
    UnsupportedMediaType {
        /// The rejected media type.
        media_type: String,
    },
    /// The payload exceeds [`MAX_ASSET_SIZE`].
    #[error("Image size should be less than 5MB")]
    TooLarge {
        /// Payload size in bytes.
        size: usize,
    },
}

impl ValidationError {
    /// Checks a declared media type and payload size, media type first.
    ///
    /// Lets callers reject a payload before loading it.
    pub fn check(media_type: &str, size: usize) -> Result<(), Self> {
        if !media_type.starts_with(ACCEPTED_MEDIA_PREFIX) {
            return Err(Self::UnsupportedMediaType {
                media_type: media_type.to_owned(),
            });
        }

        if size > MAX_ASSET_SIZE {
            return Err(Self::TooLarge { size });
        }

        Ok(())
    }
}

impl From<ValidationError> for crate::Error {
    fn from(err: ValidationError) -> Self {
        crate::Error::invalid_input()
            .with_message(err.to_string())
            .with_source(err)
    }
}

/// A binary payload submitted for storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpload {
    /// Original file name, embedded (URL-encoded) in internal locators.
    pub file_name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw payload.
    pub data: Bytes,
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.data.len())
            .finish()
    }
}

impl AssetUpload {
    /// Creates a new upload.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Returns the payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Checks the media type first, then the size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check(&self.media_type, self.data.len())
    }

    /// Encodes the payload as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        DataUrl::encode(&self.media_type, &self.data)
    }
}

/// Opaque identifier of an asset held in local storage.
///
/// Generated ids are the base-36 millisecond timestamp followed by a base-36
/// random token, so they never contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, Deref)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier from the current time and a random token.
    pub fn generate() -> Self {
        let millis = u64::try_from(Timestamp::now().as_millisecond()).unwrap_or_default();
        let token: u64 = rand::random();

        let mut id = to_base36(millis);
        id.push_str(&to_base36(token));
        Self(id)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id can be used as a single storage path segment.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty() && self.0 != "." && self.0 != ".." && !self.0.contains(['/', '\\'])
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }

    digits.into_iter().rev().collect()
}

/// Self-describing inline content: `data:<media-type>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Embedded media type.
    pub media_type: String,
    /// Decoded payload.
    pub data: Bytes,
}

impl DataUrl {
    /// Scheme prefix of every data URL.
    pub const PREFIX: &'static str = "data:";

    /// Encodes a payload into a data URL string.
    pub fn encode(media_type: &str, data: &[u8]) -> String {
        format!("data:{media_type};base64,{}", STANDARD.encode(data))
    }

    /// Decodes a base64 data URL. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix(Self::PREFIX)?;
        let (header, payload) = rest.split_once(',')?;
        let media_type = header.strip_suffix(";base64")?;
        let data = STANDARD.decode(payload).ok()?;

        Some(Self {
            media_type: media_type.to_owned(),
            data: Bytes::from(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_image_media_type() {
        let upload = AssetUpload::new("notes.txt", "text/plain", vec![1, 2, 3]);
        let err = upload.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please select an image file");
    }

    #[test]
    fn test_media_type_check_runs_before_size_check() {
        let upload = AssetUpload::new("huge.pdf", "application/pdf", vec![0; MAX_ASSET_SIZE + 1]);
        assert!(matches!(
            upload.validate(),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn test_media_type_check_is_case_sensitive() {
        let upload = AssetUpload::new("a.png", "IMAGE/PNG", vec![1]);
        assert!(upload.validate().is_err());
    }

    #[test]
    fn test_check_from_declared_size() {
        assert!(ValidationError::check("image/png", MAX_ASSET_SIZE).is_ok());
        assert_eq!(
            ValidationError::check("text/plain", MAX_ASSET_SIZE + 1),
            Err(ValidationError::UnsupportedMediaType {
                media_type: "text/plain".to_owned()
            })
        );
        assert_eq!(
            ValidationError::check("image/png", MAX_ASSET_SIZE + 1),
            Err(ValidationError::TooLarge { size: 5_242_881 })
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let exact = AssetUpload::new("a.png", "image/png", vec![0; MAX_ASSET_SIZE]);
        assert!(exact.validate().is_ok());

        let over = AssetUpload::new("a.png", "image/png", vec![0; MAX_ASSET_SIZE + 1]);
        let err = over.validate().unwrap_err();
        assert_eq!(err.to_string(), "Image size should be less than 5MB");
        assert_eq!(err, ValidationError::TooLarge { size: 5_242_881 });
    }

    #[test]
    fn test_validation_error_converts_to_invalid_input() {
        let err: crate::Error = ValidationError::TooLarge { size: 1 }.into();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert_eq!(
            err.message.as_deref(),
            Some("Image size should be less than 5MB")
        );
    }

    #[test]
    fn test_base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_generated_ids_are_distinct_and_path_safe() {
        let a = AssetId::generate();
        let b = AssetId::generate();
        assert_ne!(a, b);
        assert!(a.is_path_safe());
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_path_safety() {
        assert!(!AssetId::new("..").is_path_safe());
        assert!(!AssetId::new("").is_path_safe());
        assert!(!AssetId::new("a/b").is_path_safe());
        assert!(AssetId::new("lq3x9k2abc").is_path_safe());
    }

    #[test]
    fn test_data_url_encoding() {
        let upload = AssetUpload::new("a.png", "image/png", b"hi".to_vec());
        assert_eq!(upload.to_data_url(), "data:image/png;base64,aGk=");

        let decoded = DataUrl::parse("data:image/png;base64,aGk=").unwrap();
        assert_eq!(decoded.media_type, "image/png");
        assert_eq!(decoded.data.as_ref(), b"hi");

        assert!(DataUrl::parse("data:text/plain,hi").is_none());
        assert!(DataUrl::parse("https://example.com/a.png").is_none());
    }
}
