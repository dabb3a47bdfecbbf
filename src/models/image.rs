use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Image reference as supplied by a caller. The caller states which variant it
/// is sending; nothing is inferred from the string content.
///
/// On the wire an inline payload is always `{"kind":"inline","data":...}`.
/// A hosted image is either `{"kind":"hosted","url":...}` or the bare URL
/// string stored blocks are serialized with, so a fetched profile can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSource {
    /// Image bytes embedded in the request as a `data:image/...;base64,` URI
    Inline { data: String },
    /// Already externalized image
    Hosted { url: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image payload must be a data URI")]
    NotADataUri,

    #[error("Image payload must be base64 encoded")]
    NotBase64Encoded,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image payload could not be decoded")]
    Undecodable,

    #[error("Image payload is empty")]
    Empty,

    #[error("Hosted image URL is not a valid http(s) URL: {0}")]
    InvalidHostedUrl(String),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TaggedSource {
    Inline { data: String },
    Hosted { url: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireSource {
    Url(String),
    Tagged(TaggedSource),
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireSource::deserialize(deserializer)? {
            WireSource::Url(url) => ImageSource::Hosted { url },
            WireSource::Tagged(TaggedSource::Inline { data }) => ImageSource::Inline { data },
            WireSource::Tagged(TaggedSource::Hosted { url }) => ImageSource::Hosted { url },
        })
    }
}

impl ImageSource {
    /// Check a hosted reference and return it for storage exactly as given
    pub fn validated_hosted_url(url: &str) -> Result<String, ImageError> {
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url.to_string()),
            _ => Err(ImageError::InvalidHostedUrl(url.to_string())),
        }
    }
}

/// A decoded inline image, ready to be handed to an uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    media_type: String,
    bytes: Vec<u8>,
}

impl InlineImage {
    /// Parse a `data:image/<subtype>;base64,<payload>` URI
    pub fn parse(data_uri: &str) -> Result<Self, ImageError> {
        let rest = data_uri.trim().strip_prefix("data:").ok_or(ImageError::NotADataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageError::NotADataUri)?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(ImageError::NotBase64Encoded);
        }
        if !media_type.starts_with("image/") || media_type.len() == "image/".len() {
            return Err(ImageError::UnsupportedMediaType(media_type));
        }

        let bytes = STANDARD.decode(payload.trim()).map_err(|_| ImageError::Undecodable)?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self { media_type, bytes })
    }

    pub fn from_bytes(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension used by uploaders that store plain files
    pub fn extension(&self) -> &str {
        match self.media_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/avif" => "avif",
            _ => "bin",
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}
