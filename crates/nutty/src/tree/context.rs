use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::model::{ContentBlock, NuttyId};

/// A block together with everything needed to render it.
///
/// `blocks` holds the block itself, all its ancestors and descendants, and
/// every block it references or is referenced by, keyed by ID.
#[derive(Debug, Clone, Serialize)]
pub struct BlockContext {
    pub block_id: NuttyId,
    pub parent_id: Option<NuttyId>,
    pub children_ids: Vec<NuttyId>,
    pub reference_ids: Vec<NuttyId>,
    pub backlink_ids: Vec<NuttyId>,
    pub blocks: FxHashMap<NuttyId, ContentBlock>,
}

impl BlockContext {
    /// The block this context was built for.
    pub fn block(&self) -> Option<&ContentBlock> {
        self.blocks.get(&self.block_id)
    }
}
