use serde::{Deserialize, Serialize};
use std::fmt;

use super::image::ImageSource;

/// Discriminates which display fields of a block are meaningful.
/// Unknown kinds are kept verbatim so newer clients round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Link,
    Image,
    Text,
    Map,
    Other(String),
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Link => "link",
            BlockKind::Image => "image",
            BlockKind::Text => "text",
            BlockKind::Map => "map",
            BlockKind::Other(kind) => kind,
        }
    }
}

impl From<String> for BlockKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "link" => BlockKind::Link,
            "image" => BlockKind::Image,
            "text" => BlockKind::Text,
            "map" => BlockKind::Map,
            _ => BlockKind::Other(kind),
        }
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted block. `image_url` only ever holds a hosted URL; inline
/// payloads live on [`BlockInput`] and are externalized before a `Block`
/// is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, alias = "userName")]
    pub display_label: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, alias = "bgColor")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "imgUrl")]
    pub image_url: Option<String>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            base_url: None,
            display_label: None,
            logo: None,
            background_color: None,
            content: None,
            location: None,
            image_url: None,
        }
    }

    /// A block the user has not customized yet: any of the user-editable
    /// fields is still unset.
    pub fn is_suggestion(&self) -> bool {
        self.content.is_none()
            || self.display_label.is_none()
            || self.location.is_none()
            || self.image_url.is_none()
    }

    /// Overwrite every field carried by `patch`, keep the rest. The image is
    /// handled by the caller since it may need externalizing first.
    pub fn merge(&mut self, patch: &BlockPatch) {
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        merge_field(&mut self.base_url, &patch.base_url);
        merge_field(&mut self.display_label, &patch.display_label);
        merge_field(&mut self.logo, &patch.logo);
        merge_field(&mut self.background_color, &patch.background_color);
        merge_field(&mut self.content, &patch.content);
        merge_field(&mut self.location, &patch.location);
    }
}

fn merge_field(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

/// Block fields as received on add and bulk replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, alias = "userName")]
    pub display_label: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, alias = "bgColor")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "imgUrl")]
    pub image: Option<ImageSource>,
}

impl BlockInput {
    /// Split into the persisted shape (without image) and the image source
    pub fn into_parts(self) -> (Block, Option<ImageSource>) {
        let block = Block {
            id: self.id,
            kind: self.kind,
            base_url: self.base_url,
            display_label: self.display_label,
            logo: self.logo,
            background_color: self.background_color,
            content: self.content,
            location: self.location,
            image_url: None,
        };
        (block, self.image)
    }
}

impl From<Block> for BlockInput {
    fn from(block: Block) -> Self {
        Self {
            id: block.id,
            kind: block.kind,
            base_url: block.base_url,
            display_label: block.display_label,
            logo: block.logo,
            background_color: block.background_color,
            content: block.content,
            location: block.location,
            image: block.image_url.map(|url| ImageSource::Hosted { url }),
        }
    }
}

/// Partial block update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    pub id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, alias = "userName", skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, alias = "bgColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, rename = "imgUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
}

impl BlockPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
