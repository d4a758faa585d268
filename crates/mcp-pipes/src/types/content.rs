//! Content items: the atomic unit of a capability's output.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// MIME type assumed for blobs that do not declare one.
pub const DEFAULT_BLOB_MIME: &str = "application/octet-stream";

/// Inline text or binary data with a media type.
///
/// On the wire a blob is `{"type":"blob","mimeType":…,"data":<base64>}`;
/// `"image"` is accepted as an alias of `"blob"` when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Binary content.
    #[serde(rename = "blob", alias = "image")]
    Blob {
        /// Decoded bytes; base64 on the wire.
        #[serde(rename = "data", with = "base64_bytes")]
        bytes: Vec<u8>,
        /// MIME type (e.g. "image/png").
        #[serde(rename = "mimeType", default = "default_blob_mime")]
        mime_type: String,
    },
}

fn default_blob_mime() -> String {
    DEFAULT_BLOB_MIME.to_string()
}

impl ContentItem {
    /// Create a text item.
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    /// Create a blob item.
    pub fn blob(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        ContentItem::Blob {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, ContentItem::Blob { .. })
    }

    /// The text payload, if this is a text item.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { text } => Some(text),
            ContentItem::Blob { .. } => None,
        }
    }
}

/// Serde adapter: `Vec<u8>` as a standard base64 string.
pub mod base64_bytes {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
