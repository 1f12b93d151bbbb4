//! Data model types for Nutty content blocks.
//!
//! - Identifiers ([`NuttyId`], [`ShortCode`], [`AnyNuttyId`])
//! - Order-keys ([`FractionalIndex`])
//! - Tags (`[[code|text]]` references)
//! - Blocks (content positioned among siblings)
//! - Links (tag references resolved to block IDs)

pub mod block;
pub mod id;
pub mod index;
pub mod link;
pub mod tag;

pub use block::{BlockContent, ContentBlock, ContentBlockBuilder};
pub use id::{AnyNuttyId, NuttyId, ShortCode, is_valid_short_code};
pub use index::{FractionalIndex, check_index};
pub use link::ContentLink;
pub use tag::NuttyTag;
