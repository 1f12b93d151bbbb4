//! In-memory sibling tree of content blocks.
//!
//! [`BlockTree`] owns a set of blocks keyed by [`NuttyId`] and keeps their
//! parent links, fractional indices and tag links consistent:
//! - every parent exists
//! - inserting or moving a block assigns a fresh index to that block only
//! - a new index always lies strictly between its actual neighbours
//! - a block is never moved beneath itself
//! - saving a block replaces its outbound links with the tags it now holds
//!
//! It takes `&mut self` for every mutation, so concurrent reorders of one
//! sibling group are serialized by the borrow checker rather than by locks.
//! A persistent store has to give the same guarantee with transactions.

mod context;

pub use context::BlockContext;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::TreeError;
use crate::model::{
    AnyNuttyId, BlockContent, ContentBlock, ContentLink, FractionalIndex, NuttyId, ShortCode,
};

/// Blocks indexed by ID and by short code, plus their outbound links.
#[derive(Debug, Clone, Default)]
pub struct BlockTree {
    blocks: FxHashMap<NuttyId, ContentBlock>,
    by_code: FxHashMap<ShortCode, Vec<NuttyId>>,
    links: FxHashMap<NuttyId, Vec<ContentLink>>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &NuttyId) -> Option<&ContentBlock> {
        self.blocks.get(id)
    }

    /// Adds an existing block, keeping its index as is, and links its tags.
    pub fn insert(&mut self, block: ContentBlock) -> Result<(), TreeError> {
        let id = *block.id();
        if self.blocks.contains_key(&id) {
            return Err(TreeError::DuplicateBlock { id: id.to_string() });
        }
        if let Some(parent) = &block.parent_id {
            self.require(parent)?;
        }

        self.by_code.entry(id.short_code()).or_default().push(id);
        self.blocks.insert(id, block);
        self.sync_links(id);
        Ok(())
    }

    /// Creates a block after the last child of `parent`.
    pub fn append(
        &mut self,
        parent: Option<NuttyId>,
        content: BlockContent,
    ) -> Result<NuttyId, TreeError> {
        self.insert_between(parent, None, None, content)
    }

    /// Creates a block before the first child of `parent`.
    pub fn prepend(
        &mut self,
        parent: Option<NuttyId>,
        content: BlockContent,
    ) -> Result<NuttyId, TreeError> {
        let first = self.children(parent.as_ref()).first().map(|b| *b.id());
        self.insert_between(parent, None, first, content)
    }

    /// Creates a block between two children of `parent`.
    ///
    /// With both neighbours given, `next` must directly follow `prev`. With
    /// one given, the block goes right next to it. With neither, the block
    /// goes after the last child.
    pub fn insert_between(
        &mut self,
        parent: Option<NuttyId>,
        prev: Option<NuttyId>,
        next: Option<NuttyId>,
        content: BlockContent,
    ) -> Result<NuttyId, TreeError> {
        if let Some(parent) = &parent {
            self.require(parent)?;
        }
        let f_index = self.index_between(parent.as_ref(), prev.as_ref(), next.as_ref(), None)?;
        let block = ContentBlock::now(parent, f_index, content);
        let id = *block.id();
        self.insert(block)?;
        Ok(id)
    }

    /// Moves a block under `new_parent`, between `prev` and `next`.
    ///
    /// Neighbours follow the rules of [`Self::insert_between`], with the moved
    /// block itself left out of the sibling list. Only the moved block
    /// receives a new index. Returns that index.
    pub fn move_block(
        &mut self,
        id: NuttyId,
        new_parent: Option<NuttyId>,
        prev: Option<NuttyId>,
        next: Option<NuttyId>,
    ) -> Result<FractionalIndex, TreeError> {
        self.require(&id)?;
        if let Some(parent) = &new_parent {
            self.require(parent)?;
            if self.ancestors_and_self(parent).any(|a| a == id) {
                return Err(TreeError::Cycle { id: id.to_string() });
            }
        }
        for neighbour in prev.iter().chain(next.iter()) {
            if *neighbour == id {
                return Err(TreeError::NotASibling {
                    id: id.to_string(),
                    parent: describe_parent(new_parent.as_ref()),
                });
            }
        }

        let f_index =
            self.index_between(new_parent.as_ref(), prev.as_ref(), next.as_ref(), Some(&id))?;
        debug!(id = %id, index = f_index.as_str(), "moving block");

        if let Some(block) = self.blocks.get_mut(&id) {
            block.parent_id = new_parent;
            block.f_index = f_index.clone();
        }
        Ok(f_index)
    }

    /// Replaces a block's content and re-links its tags.
    pub fn update_content(&mut self, id: &NuttyId, content: BlockContent) -> Result<(), TreeError> {
        let block = self
            .blocks
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownBlock { id: id.to_string() })?;
        block.content = content;
        self.sync_links(*id);
        Ok(())
    }

    /// Removes a leaf block along with every link to or from it.
    pub fn remove(&mut self, id: &NuttyId) -> Result<ContentBlock, TreeError> {
        self.require(id)?;
        let count = self.children(Some(id)).len();
        if count > 0 {
            return Err(TreeError::HasChildren {
                id: id.to_string(),
                count,
            });
        }

        if let Some(ids) = self.by_code.get_mut(&id.short_code()) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.by_code.remove(&id.short_code());
            }
        }

        self.links.remove(id);
        for links in self.links.values_mut() {
            links.retain(|link| link.target_id != *id);
        }
        self.links.retain(|_, links| !links.is_empty());

        self.blocks
            .remove(id)
            .ok_or_else(|| TreeError::UnknownBlock { id: id.to_string() })
    }

    /// Children of `parent` (roots for `None`), in index order.
    ///
    /// Blocks that share an index position are ordered by ID.
    pub fn children(&self, parent: Option<&NuttyId>) -> Vec<&ContentBlock> {
        let mut children: Vec<&ContentBlock> = self
            .blocks
            .values()
            .filter(|b| b.parent_id.as_ref() == parent)
            .collect();
        children.sort_by(|a, b| a.f_index.cmp(&b.f_index).then_with(|| a.id().cmp(b.id())));
        children
    }

    /// Parent, grandparent and so on up to the root.
    pub fn ancestors(&self, id: &NuttyId) -> Result<Vec<&ContentBlock>, TreeError> {
        self.require(id)?;
        Ok(self
            .ancestors_and_self(id)
            .skip(1)
            .filter_map(|a| self.blocks.get(&a))
            .collect())
    }

    /// Every block beneath `id`, depth first, siblings in index order.
    pub fn descendants(&self, id: &NuttyId) -> Result<Vec<&ContentBlock>, TreeError> {
        self.require(id)?;
        let mut found = Vec::new();
        let mut stack: Vec<&ContentBlock> = self.children(Some(id)).into_iter().rev().collect();
        while let Some(block) = stack.pop() {
            found.push(block);
            stack.extend(self.children(Some(block.id())).into_iter().rev());
        }
        Ok(found)
    }

    /// Outbound links of `id`, in tag order.
    pub fn links_from(&self, id: &NuttyId) -> &[ContentLink] {
        self.links.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Blocks that `id` links to, in tag order.
    pub fn references(&self, id: &NuttyId) -> Result<Vec<&ContentBlock>, TreeError> {
        self.require(id)?;
        Ok(self
            .links_from(id)
            .iter()
            .filter_map(|link| self.blocks.get(&link.target_id))
            .collect())
    }

    /// Blocks that link to `id`, ordered by ID.
    pub fn backlinks(&self, id: &NuttyId) -> Result<Vec<&ContentBlock>, TreeError> {
        self.require(id)?;
        let mut sources: Vec<&ContentBlock> = self
            .links
            .values()
            .flatten()
            .filter(|link| link.target_id == *id)
            .filter_map(|link| self.blocks.get(&link.source_id))
            .collect();
        sources.sort_by_key(|b| *b.id());
        Ok(sources)
    }

    /// Everything needed to render `id`: its lineage, subtree and links.
    pub fn context(&self, id: &NuttyId) -> Result<BlockContext, TreeError> {
        let block = self.require(id)?;
        let ancestors = self.ancestors(id)?;
        let descendants = self.descendants(id)?;
        let references = self.references(id)?;
        let backlinks = self.backlinks(id)?;

        let related = ancestors
            .iter()
            .chain(&descendants)
            .chain(&references)
            .chain(&backlinks)
            .copied();
        let mut blocks: FxHashMap<NuttyId, ContentBlock> =
            related.map(|b| (*b.id(), b.clone())).collect();
        blocks.insert(*id, block.clone());

        Ok(BlockContext {
            block_id: *id,
            parent_id: block.parent_id,
            children_ids: self.children(Some(id)).iter().map(|b| *b.id()).collect(),
            reference_ids: references.iter().map(|b| *b.id()).collect(),
            backlink_ids: backlinks.iter().map(|b| *b.id()).collect(),
            blocks,
        })
    }

    /// Finds the full ID behind a dissociated short code.
    pub fn resolve(&self, code: &ShortCode) -> Result<NuttyId, TreeError> {
        match self.by_code.get(code).map(Vec::as_slice) {
            Some([id]) => Ok(*id),
            Some(ids) if ids.len() > 1 => Err(TreeError::Ambiguous {
                code: code.to_string(),
                count: ids.len(),
            }),
            _ => Err(TreeError::Unresolved {
                code: code.to_string(),
            }),
        }
    }

    /// Like [`Self::resolve`], but passes full IDs through after checking
    /// that they exist.
    pub fn resolve_any(&self, id: &AnyNuttyId) -> Result<NuttyId, TreeError> {
        match id {
            AnyNuttyId::Associated(id) => self.require(id).map(|_| *id),
            AnyNuttyId::Dissociated(code) => self.resolve(code),
        }
    }

    fn require(&self, id: &NuttyId) -> Result<&ContentBlock, TreeError> {
        self.blocks
            .get(id)
            .ok_or_else(|| TreeError::UnknownBlock { id: id.to_string() })
    }

    /// Rebuilds the outbound links of `source` from its current tags.
    ///
    /// Tags that resolve to no block, or to several, are skipped. Links to
    /// targets that are still tagged keep their IDs.
    fn sync_links(&mut self, source: NuttyId) {
        let Some(block) = self.blocks.get(&source) else {
            return;
        };

        let mut targets: Vec<NuttyId> = Vec::new();
        for tag in block.content.target_tags() {
            match self.resolve(&tag.short_code()) {
                Ok(target) if !targets.contains(&target) => targets.push(target),
                Ok(_) => {}
                Err(err) => debug!(source = %source, tag = %tag, error = %err, "skipping tag"),
            }
        }

        let previous = self.links.remove(&source).unwrap_or_default();
        let links: Vec<ContentLink> = targets
            .into_iter()
            .map(|target| {
                previous
                    .iter()
                    .find(|link| link.target_id == target)
                    .cloned()
                    .unwrap_or_else(|| ContentLink::now(source, target))
            })
            .collect();
        if !links.is_empty() {
            self.links.insert(source, links);
        }
    }

    /// Index for a block placed among the children of `parent`.
    ///
    /// `moving` is left out of the sibling list so a block can move within
    /// its own parent.
    fn index_between(
        &self,
        parent: Option<&NuttyId>,
        prev: Option<&NuttyId>,
        next: Option<&NuttyId>,
        moving: Option<&NuttyId>,
    ) -> Result<FractionalIndex, TreeError> {
        for id in prev.iter().chain(next.iter()) {
            self.sibling(parent, id)?;
        }
        let siblings: Vec<&ContentBlock> = self
            .children(parent)
            .into_iter()
            .filter(|b| Some(b.id()) != moving)
            .collect();
        let position = |id: &NuttyId| {
            siblings
                .iter()
                .position(|b| b.id() == id)
                .ok_or_else(|| TreeError::NotASibling {
                    id: id.to_string(),
                    parent: describe_parent(parent),
                })
        };

        let (lower, upper) = match (prev, next) {
            (Some(prev), Some(next)) => {
                let at = position(prev)?;
                match siblings.get(at + 1) {
                    Some(following) if following.id() == next => (Some(siblings[at]), Some(*following)),
                    _ => {
                        return Err(TreeError::NotAdjacent {
                            prev: prev.to_string(),
                            next: next.to_string(),
                        });
                    }
                }
            }
            (Some(prev), None) => {
                let at = position(prev)?;
                (Some(siblings[at]), siblings.get(at + 1).copied())
            }
            (None, Some(next)) => {
                let at = position(next)?;
                (at.checked_sub(1).map(|i| siblings[i]), Some(siblings[at]))
            }
            (None, None) => (siblings.last().copied(), None),
        };

        let f_index = match (lower, upper) {
            (Some(lower), Some(upper)) => FractionalIndex::between(&lower.f_index, &upper.f_index)?,
            (Some(lower), None) => lower.f_index.after()?,
            (None, Some(upper)) => upper.f_index.before()?,
            (None, None) => {
                FractionalIndex::between(&FractionalIndex::start(), &FractionalIndex::end())?
            }
        };
        Ok(f_index)
    }

    fn sibling(&self, parent: Option<&NuttyId>, id: &NuttyId) -> Result<&ContentBlock, TreeError> {
        let block = self.require(id)?;
        if block.parent_id.as_ref() != parent {
            return Err(TreeError::NotASibling {
                id: id.to_string(),
                parent: describe_parent(parent),
            });
        }
        Ok(block)
    }

    /// Walks from `id` up to its root, yielding `id` first.
    fn ancestors_and_self(&self, id: &NuttyId) -> impl Iterator<Item = NuttyId> + '_ {
        let mut current = Some(*id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.blocks.get(&id).and_then(|b| b.parent_id);
            Some(id)
        })
    }
}

fn describe_parent(parent: Option<&NuttyId>) -> String {
    parent.map_or_else(|| "the root".to_string(), NuttyId::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_siblings;

    fn para(text: &str) -> BlockContent {
        BlockContent::Paragraph {
            markdown: text.to_string(),
        }
    }

    fn texts(tree: &BlockTree, parent: Option<&NuttyId>) -> Vec<String> {
        tree.children(parent)
            .iter()
            .map(|b| b.content.text().to_string())
            .collect()
    }

    /// Asserts that no two children of `parent` share an index position.
    fn assert_distinct(tree: &BlockTree, parent: Option<&NuttyId>) {
        let children = tree.children(parent);
        let indices = children.iter().map(|b| &b.f_index);
        assert!(validate_siblings(indices).is_ok(), "{:?}", children);
    }

    fn ids(blocks: &[&ContentBlock]) -> Vec<NuttyId> {
        blocks.iter().map(|b| *b.id()).collect()
    }

    #[test]
    fn test_append_prepend_order() {
        let mut tree = BlockTree::new();
        tree.append(None, para("b")).unwrap();
        assert_distinct(&tree, None);
        tree.append(None, para("c")).unwrap();
        assert_distinct(&tree, None);
        tree.prepend(None, para("a")).unwrap();
        assert_distinct(&tree, None);
        assert_eq!(texts(&tree, None), ["a", "b", "c"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_many_appends_and_prepends_stay_distinct() {
        let mut tree = BlockTree::new();
        for i in 0..30 {
            tree.append(None, para(&format!("a{i}"))).unwrap();
            tree.prepend(None, para(&format!("p{i}"))).unwrap();
            assert_distinct(&tree, None);
        }
        let order = texts(&tree, None);
        assert_eq!(order.first().map(String::as_str), Some("p29"));
        assert_eq!(order.last().map(String::as_str), Some("a29"));
    }

    #[test]
    fn test_append_after_key_past_end() {
        let mut tree = BlockTree::new();
        let last = ContentBlock::now(None, FractionalIndex::new("~P").unwrap(), para("last"));
        tree.insert(last).unwrap();

        tree.append(None, para("appended")).unwrap();
        assert_eq!(texts(&tree, None), ["last", "appended"]);
        assert_distinct(&tree, None);
    }

    #[test]
    fn test_insert_between() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        let c = tree.append(None, para("c")).unwrap();
        tree.insert_between(None, Some(a), Some(c), para("b")).unwrap();
        assert_eq!(texts(&tree, None), ["a", "b", "c"]);
        assert_distinct(&tree, None);
    }

    #[test]
    fn test_insert_between_requires_adjacent_neighbours() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        let c = tree.append(None, para("c")).unwrap();
        let b = tree.insert_between(None, Some(a), Some(c), para("b")).unwrap();

        // `b` now sits between them.
        let err = tree.insert_between(None, Some(a), Some(c), para("x")).unwrap_err();
        assert!(matches!(err, TreeError::NotAdjacent { .. }));
        let err = tree.insert_between(None, Some(c), Some(a), para("x")).unwrap_err();
        assert!(matches!(err, TreeError::NotAdjacent { .. }));

        tree.insert_between(None, Some(a), Some(b), para("ab")).unwrap();
        tree.insert_between(None, Some(b), Some(c), para("bc")).unwrap();
        assert_eq!(texts(&tree, None), ["a", "ab", "b", "bc", "c"]);
        assert_distinct(&tree, None);
    }

    #[test]
    fn test_single_neighbour_uses_actual_neighbour() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        let c = tree.append(None, para("c")).unwrap();

        tree.insert_between(None, Some(a), None, para("after a")).unwrap();
        assert_distinct(&tree, None);
        tree.insert_between(None, None, Some(c), para("before c")).unwrap();
        assert_distinct(&tree, None);
        tree.insert_between(None, None, None, para("end")).unwrap();
        assert_distinct(&tree, None);

        assert_eq!(texts(&tree, None), ["a", "after a", "before c", "c", "end"]);
    }

    #[test]
    fn test_move_only_rewrites_moved_block() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        let b = tree.append(None, para("b")).unwrap();
        let c = tree.append(None, para("c")).unwrap();

        let before: Vec<_> = [a, b]
            .iter()
            .map(|id| tree.get(id).unwrap().f_index.clone())
            .collect();

        let new_index = tree.move_block(c, None, Some(a), Some(b)).unwrap();
        assert_eq!(texts(&tree, None), ["a", "c", "b"]);
        assert_eq!(tree.get(&c).unwrap().f_index, new_index);
        assert_distinct(&tree, None);

        let after: Vec<_> = [a, b]
            .iter()
            .map(|id| tree.get(id).unwrap().f_index.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_within_parent() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        tree.append(None, para("b")).unwrap();
        let c = tree.append(None, para("c")).unwrap();

        // To the end, then to the front.
        tree.move_block(a, None, None, None).unwrap();
        assert_eq!(texts(&tree, None), ["b", "c", "a"]);
        assert_distinct(&tree, None);

        let first = *tree.children(None)[0].id();
        tree.move_block(c, None, None, Some(first)).unwrap();
        assert_eq!(texts(&tree, None), ["c", "b", "a"]);
        assert_distinct(&tree, None);
    }

    #[test]
    fn test_move_under_new_parent() {
        let mut tree = BlockTree::new();
        let page = tree.append(None, BlockContent::Page { title: "p".into() }).unwrap();
        let loose = tree.append(None, para("x")).unwrap();
        tree.append(Some(page), para("first")).unwrap();

        tree.move_block(loose, Some(page), None, None).unwrap();
        assert_eq!(tree.get(&loose).unwrap().parent_id, Some(page));
        assert_eq!(texts(&tree, Some(&page)), ["first", "x"]);
        assert_distinct(&tree, Some(&page));
        assert_eq!(tree.children(None).len(), 1);
    }

    #[test]
    fn test_move_rejects_non_adjacent_neighbours() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        tree.append(None, para("b")).unwrap();
        let c = tree.append(None, para("c")).unwrap();
        let d = tree.append(None, para("d")).unwrap();

        let err = tree.move_block(d, None, Some(a), Some(c)).unwrap_err();
        assert!(matches!(err, TreeError::NotAdjacent { .. }));
        assert_eq!(texts(&tree, None), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_move_rejects_cycles() {
        let mut tree = BlockTree::new();
        let root = tree.append(None, para("root")).unwrap();
        let child = tree.append(Some(root), para("child")).unwrap();

        assert!(matches!(
            tree.move_block(root, Some(child), None, None),
            Err(TreeError::Cycle { .. })
        ));
        assert!(matches!(
            tree.move_block(root, Some(root), None, None),
            Err(TreeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_neighbours_must_be_siblings() {
        let mut tree = BlockTree::new();
        let page = tree.append(None, para("page")).unwrap();
        let nested = tree.append(Some(page), para("nested")).unwrap();
        let err = tree.insert_between(None, Some(nested), None, para("x")).unwrap_err();
        assert!(matches!(err, TreeError::NotASibling { .. }));

        let err = tree.move_block(page, None, Some(page), None).unwrap_err();
        assert!(matches!(err, TreeError::NotASibling { .. }));
    }

    #[test]
    fn test_insert_rejects_duplicates_and_orphans() {
        let mut tree = BlockTree::new();
        let block = ContentBlock::now(None, FractionalIndex::start(), para("a"));
        tree.insert(block.clone()).unwrap();
        assert!(matches!(tree.insert(block), Err(TreeError::DuplicateBlock { .. })));

        let orphan = ContentBlock::now(Some(NuttyId::now()), FractionalIndex::start(), para("o"));
        assert!(matches!(tree.insert(orphan), Err(TreeError::UnknownBlock { .. })));
    }

    #[test]
    fn test_identical_neighbour_indices() {
        let mut tree = BlockTree::new();
        tree.insert(ContentBlock::now(None, FractionalIndex::new("O").unwrap(), para("a")))
            .unwrap();
        tree.insert(ContentBlock::now(None, FractionalIndex::new("O!").unwrap(), para("b")))
            .unwrap();
        assert!(validate_siblings(tree.children(None).iter().map(|b| &b.f_index)).is_err());

        let order = ids(&tree.children(None));
        let err = tree
            .insert_between(None, Some(order[0]), Some(order[1]), para("c"))
            .unwrap_err();
        assert!(matches!(err, TreeError::Index(_)));
    }

    #[test]
    fn test_remove() {
        let mut tree = BlockTree::new();
        let page = tree.append(None, para("page")).unwrap();
        let child = tree.append(Some(page), para("child")).unwrap();

        assert!(matches!(tree.remove(&page), Err(TreeError::HasChildren { count: 1, .. })));
        tree.remove(&child).unwrap();
        tree.remove(&page).unwrap();
        assert!(tree.is_empty());
        assert!(matches!(
            tree.resolve(&page.short_code()),
            Err(TreeError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_resolve_short_codes() {
        let mut tree = BlockTree::new();
        let id = tree.append(None, para("a")).unwrap();
        assert_eq!(tree.resolve(&id.short_code()).unwrap(), id);
        assert_eq!(tree.resolve_any(&AnyNuttyId::from(id)).unwrap(), id);
        assert_eq!(tree.resolve_any(&AnyNuttyId::from(id.short_code())).unwrap(), id);

        // Same low 41 bits, different high bits.
        let twin_uuid = uuid::Uuid::from_u128(id.uuid().as_u128() ^ (1 << 100));
        let twin = ContentBlock::new(NuttyId::new(twin_uuid), None, FractionalIndex::end(), para("b"));
        tree.insert(twin).unwrap();
        assert!(matches!(
            tree.resolve(&id.short_code()),
            Err(TreeError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_tags_become_links() {
        let mut tree = BlockTree::new();
        let target = tree.append(None, para("target")).unwrap();
        let other = tree.append(None, para("other")).unwrap();
        let text = format!(
            "[[{}]] twice [[{}|again]] and [[{}]]",
            target.short_code(),
            target.short_code(),
            other.short_code()
        );
        let source = tree.append(None, para(&text)).unwrap();

        assert_eq!(ids(&tree.references(&source).unwrap()), [target, other]);
        assert_eq!(ids(&tree.backlinks(&target).unwrap()), [source]);
        assert_eq!(ids(&tree.backlinks(&other).unwrap()), [source]);
        assert!(tree.references(&target).unwrap().is_empty());

        let links = tree.links_from(&source);
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.source_id == source));
    }

    #[test]
    fn test_pages_and_unknown_tags_do_not_link() {
        let mut tree = BlockTree::new();
        let target = tree.append(None, para("target")).unwrap();
        let title = format!("[[{}]]", target.short_code());
        let page = tree.append(None, BlockContent::Page { title }).unwrap();
        assert!(tree.links_from(&page).is_empty());

        let stranger = NuttyId::now();
        let text = format!("[[{}]]", stranger.short_code());
        let source = tree.append(None, para(&text)).unwrap();
        assert!(tree.references(&source).unwrap().is_empty());
    }

    #[test]
    fn test_update_content_resyncs_links() {
        let mut tree = BlockTree::new();
        let a = tree.append(None, para("a")).unwrap();
        let b = tree.append(None, para("b")).unwrap();
        let source = tree.append(None, para(&format!("[[{}]]", a.short_code()))).unwrap();
        let kept = tree.links_from(&source)[0].clone();

        let both = format!("[[{}]] [[{}]]", a.short_code(), b.short_code());
        tree.update_content(&source, para(&both)).unwrap();
        assert_eq!(ids(&tree.references(&source).unwrap()), [a, b]);
        assert_eq!(tree.links_from(&source)[0].id(), kept.id());

        tree.update_content(&source, para(&format!("[[{}]]", b.short_code()))).unwrap();
        assert_eq!(ids(&tree.references(&source).unwrap()), [b]);
        assert!(tree.backlinks(&a).unwrap().is_empty());

        let err = tree.update_content(&NuttyId::now(), para("x")).unwrap_err();
        assert!(matches!(err, TreeError::UnknownBlock { .. }));
    }

    #[test]
    fn test_remove_drops_links() {
        let mut tree = BlockTree::new();
        let target = tree.append(None, para("target")).unwrap();
        let source = tree.append(None, para(&format!("[[{}]]", target.short_code()))).unwrap();

        tree.remove(&target).unwrap();
        assert!(tree.links_from(&source).is_empty());

        tree.remove(&source).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let mut tree = BlockTree::new();
        let page = tree.append(None, BlockContent::Page { title: "p".into() }).unwrap();
        let h1 = tree.append(Some(page), para("h1")).unwrap();
        let h2 = tree.append(Some(page), para("h2")).unwrap();
        let p1 = tree.append(Some(h1), para("p1")).unwrap();
        let p2 = tree.append(Some(h2), para("p2")).unwrap();

        assert_eq!(ids(&tree.ancestors(&p1).unwrap()), [h1, page]);
        assert!(tree.ancestors(&page).unwrap().is_empty());
        assert_eq!(ids(&tree.descendants(&page).unwrap()), [h1, p1, h2, p2]);
        assert!(tree.descendants(&p2).unwrap().is_empty());
        assert!(matches!(
            tree.ancestors(&NuttyId::now()),
            Err(TreeError::UnknownBlock { .. })
        ));
    }

    #[test]
    fn test_context() {
        let mut tree = BlockTree::new();
        let page = tree.append(None, BlockContent::Page { title: "p".into() }).unwrap();
        let heading = tree.append(Some(page), para("h")).unwrap();
        let child = tree.append(Some(heading), para("c")).unwrap();
        let target = tree.append(None, para("t")).unwrap();
        tree.update_content(&heading, para(&format!("[[{}]]", target.short_code())))
            .unwrap();
        let fan = tree.append(None, para(&format!("[[{}]]", heading.short_code()))).unwrap();

        let context = tree.context(&heading).unwrap();
        assert_eq!(context.block_id, heading);
        assert_eq!(context.parent_id, Some(page));
        assert_eq!(context.children_ids, [child]);
        assert_eq!(context.reference_ids, [target]);
        assert_eq!(context.backlink_ids, [fan]);
        assert_eq!(context.blocks.len(), 5);
        assert_eq!(context.block().map(|b| *b.id()), Some(heading));

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["block_id"], heading.to_wire_string());
    }
}
