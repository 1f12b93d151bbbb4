//! Content blocks and their builder.
//!
//! # Example
//!
//! ```rust
//! use nutty::{BlockContent, ContentBlock, FractionalIndex};
//!
//! let page = ContentBlock::builder()
//!     .f_index(FractionalIndex::start().after().unwrap())
//!     .content(BlockContent::Page { title: "Inbox".to_string() })
//!     .try_build()
//!     .unwrap();
//!
//! assert!(page.parent_id.is_none());
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::BlockError;
use crate::model::{FractionalIndex, NuttyId, NuttyTag};

/// What a block holds. Serialized with an internal `kind` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BlockContent {
    Page { title: String },
    Heading { markdown: String },
    Paragraph { markdown: String },
}

impl BlockContent {
    /// Serializes to a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, BlockError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserializes from a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, BlockError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Tags in the markdown, in order. Page titles never carry tags.
    pub fn target_tags(&self) -> Vec<NuttyTag> {
        match self {
            BlockContent::Page { .. } => Vec::new(),
            BlockContent::Heading { markdown } | BlockContent::Paragraph { markdown } => {
                NuttyTag::parse_all(markdown)
            }
        }
    }

    /// The title or markdown text.
    pub fn text(&self) -> &str {
        match self {
            BlockContent::Page { title } => title,
            BlockContent::Heading { markdown } | BlockContent::Paragraph { markdown } => markdown,
        }
    }
}

/// A block of content positioned among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    id: NuttyId,
    pub parent_id: Option<NuttyId>,
    pub f_index: FractionalIndex,
    pub content: BlockContent,
}

impl ContentBlock {
    pub fn new(
        id: NuttyId,
        parent_id: Option<NuttyId>,
        f_index: FractionalIndex,
        content: BlockContent,
    ) -> Self {
        Self {
            id,
            parent_id,
            f_index,
            content,
        }
    }

    /// Creates a block with a freshly generated ID.
    pub fn now(parent_id: Option<NuttyId>, f_index: FractionalIndex, content: BlockContent) -> Self {
        Self::new(NuttyId::now(), parent_id, f_index, content)
    }

    pub fn id(&self) -> &NuttyId {
        &self.id
    }

    /// Creation time, read from the ID.
    pub fn created_at(&self) -> DateTime<Local> {
        self.id.created_at()
    }

    pub fn builder() -> ContentBlockBuilder {
        ContentBlockBuilder::default()
    }
}

/// Builder for [`ContentBlock`].
#[derive(Debug, Clone, Default)]
pub struct ContentBlockBuilder {
    id: Option<NuttyId>,
    parent_id: Option<NuttyId>,
    f_index: Option<FractionalIndex>,
    content: Option<BlockContent>,
}

impl ContentBlockBuilder {
    /// Sets the ID. Without one, [`NuttyId::now`] is used.
    pub fn id(mut self, id: NuttyId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn parent_id(mut self, parent_id: Option<NuttyId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn f_index(mut self, f_index: FractionalIndex) -> Self {
        self.f_index = Some(f_index);
        self
    }

    pub fn content(mut self, content: BlockContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Builds the block, failing if the index or content is missing.
    pub fn try_build(self) -> Result<ContentBlock, BlockError> {
        let f_index = self.f_index.ok_or(BlockError::MissingIndex)?;
        let content = self.content.ok_or(BlockError::MissingContent)?;
        let id = self.id.unwrap_or_else(NuttyId::now);
        Ok(ContentBlock::new(id, self.parent_id, f_index, content))
    }
}
