//! Shared types for funnel documents and stored funnel records.
//!
//! The JSON shape uses camelCase keys, and blocks carry a `type` tag:
//!
//! ```json
//! {
//!   "name": "Spring campaign",
//!   "bgColor": "#ffffff",
//!   "pages": [
//!     { "id": "p1", "blocks": [
//!       { "id": "b1", "type": "image", "src": "https://example.com/a.png", "alt": "Hero" }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A funnel record held by the store: parsed content plus its identifier.
///
/// Serializes as the content object with an extra `id` key, so a stored
/// funnel reads the same as the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funnel {
    /// Opaque identifier, unique within a store.
    pub id: String,

    /// Everything the processor produced.
    #[serde(flatten)]
    pub content: FunnelContent,
}

impl Funnel {
    /// Pair content with an identifier.
    #[must_use]
    pub const fn new(id: String, content: FunnelContent) -> Self {
        Self { id, content }
    }

    /// Iterate over every image block on every page, in document order.
    pub fn image_blocks(&self) -> impl Iterator<Item = &ImageBlock> {
        self.content
            .pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .filter_map(|block| match block {
                Block::Image(image) => Some(image),
                _ => None,
            })
    }
}

/// The content of a funnel as produced by a processor, before an id is
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelContent {
    /// Display name of the funnel.
    pub name: String,

    /// Page background as a CSS color.
    #[serde(default)]
    pub bg_color: String,

    /// Pages in display order.
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// One page of a funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// A typed content unit within a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    List(ListBlock),
    Button(ButtonBlock),
}

impl Block {
    /// The block's identifier, whatever its type.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Text(b) => &b.id,
            Self::Image(b) => &b.id,
            Self::List(b) => &b.id,
            Self::Button(b) => &b.id,
        }
    }
}

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// CSS `text-align` value.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: String,
    pub text: String,
    /// CSS color of the text.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub align: TextAlign,
}

/// A leaf image node: a source reference and its alt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub id: String,
    /// Image URL (absolute, relative, or `data:`).
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    pub id: String,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

/// An entry of a [`ListBlock`]: a titled description with an icon image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Icon image URL.
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonBlock {
    pub id: String,
    pub text: String,
    /// CSS color of the label.
    #[serde(default)]
    pub color: String,
    /// CSS background color.
    #[serde(default)]
    pub bg_color: String,
}
