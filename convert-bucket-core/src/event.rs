//! S3 upload notification model and object key decoding.
//!
//! Only the fields the dispatcher reads are modelled; everything else in the
//! notification JSON is ignored during deserialization.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A storage notification as delivered to the function. May carry several records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Record {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    /// URL-encoded key, spaces escaped as `+`.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// One uploaded object to consider for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub bucket_name: String,
    /// Key exactly as the storage provider sent it (still encoded).
    pub object_key: String,
}

impl UploadEvent {
    pub fn new(bucket_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
        }
    }

    /// The object key with the storage provider's encoding removed.
    pub fn decoded_key(&self) -> Result<String, DispatchError> {
        decode_key(&self.object_key)
    }
}

impl From<&S3Record> for UploadEvent {
    fn from(record: &S3Record) -> Self {
        UploadEvent::new(&record.s3.bucket.name, &record.s3.object.key)
    }
}

/// Decodes an S3 notification key: `+` becomes a space, then `%XX` escapes are resolved.
///
/// `+` is replaced before percent-decoding, so an encoded `%2B` survives as a literal `+`.
/// A `%` not followed by two hex digits, or escapes that are not UTF-8, make the key invalid.
pub fn decode_key(raw: &str) -> Result<String, DispatchError> {
    let invalid = || DispatchError::InvalidKey {
        key: raw.to_string(),
    };
    if !escapes_well_formed(raw) {
        return Err(invalid());
    }
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| invalid())
}

fn escapes_well_formed(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
