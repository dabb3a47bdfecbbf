use serde::{Deserialize, Serialize};

use super::block::Block;

/// Ordered, id-keyed collection of blocks. Order is display order.
///
/// Ids are compared as strings and are not required to be unique: `push`
/// never deduplicates, lookups act on the first match. Lookups are linear,
/// collections hold tens of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockCollection(Vec<Block>);

impl BlockCollection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Block] {
        &self.0
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|block| block.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.0.iter().find(|block| block.id == id)
    }

    /// Last block carrying `id`; after a `push` this is the one just added
    pub fn last_with_id(&self, id: &str) -> Option<&Block> {
        self.0.iter().rev().find(|block| block.id == id)
    }

    /// Append at the end, duplicates allowed
    pub fn push(&mut self, block: Block) {
        self.0.push(block);
    }

    /// Overwrite the first block with the same id. Returns the block back
    /// when no such id exists.
    pub fn replace(&mut self, block: Block) -> Result<(), Block> {
        match self.position(&block.id) {
            Some(index) => {
                self.0[index] = block;
                Ok(())
            }
            None => Err(block),
        }
    }

    /// Replace in place when the id exists, append otherwise
    pub fn upsert(&mut self, block: Block) {
        if let Err(block) = self.replace(block) {
            self.0.push(block);
        }
    }

    /// Remove the first block with `id`, keeping the relative order of the rest
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        self.position(id).map(|index| self.0.remove(index))
    }

    pub fn replace_all(&mut self, blocks: Vec<Block>) {
        self.0 = blocks;
    }

    pub fn retain(&mut self, keep: impl FnMut(&Block) -> bool) {
        self.0.retain(keep);
    }

    pub fn into_vec(self) -> Vec<Block> {
        self.0
    }
}

impl From<Vec<Block>> for BlockCollection {
    fn from(blocks: Vec<Block>) -> Self {
        Self(blocks)
    }
}

impl FromIterator<Block> for BlockCollection {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BlockCollection {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockKind;

    fn block(id: &str, content: &str) -> Block {
        let mut block = Block::new(id, BlockKind::Text);
        block.content = Some(content.to_string());
        block
    }

    fn ids(collection: &BlockCollection) -> Vec<&str> {
        collection.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn push_keeps_duplicates() {
        let mut blocks = BlockCollection::new();
        blocks.push(block("1", "a"));
        blocks.push(block("1", "b"));

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.get("1").unwrap().content.as_deref(), Some("a"));
        assert_eq!(blocks.last_with_id("1").unwrap().content.as_deref(), Some("b"));
    }

    #[test]
    fn remove_takes_first_match_and_keeps_order() {
        let mut blocks: BlockCollection = vec![block("1", "a"), block("2", "b"), block("3", "c")].into();

        let removed = blocks.remove("2").unwrap();
        assert_eq!(removed.content.as_deref(), Some("b"));
        assert_eq!(ids(&blocks), vec!["1", "3"]);
        assert!(blocks.remove("2").is_none());
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn replace_reports_missing_id() {
        let mut blocks: BlockCollection = vec![block("1", "a")].into();

        assert!(blocks.replace(block("1", "z")).is_ok());
        assert_eq!(blocks.get("1").unwrap().content.as_deref(), Some("z"));

        let rejected = blocks.replace(block("9", "q")).unwrap_err();
        assert_eq!(rejected.id, "9");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let mut blocks: BlockCollection = vec![block("1", "a"), block("2", "b")].into();

        blocks.upsert(block("1", "a2"));
        blocks.upsert(block("3", "c"));

        assert_eq!(ids(&blocks), vec!["1", "2", "3"]);
        assert_eq!(blocks.get("1").unwrap().content.as_deref(), Some("a2"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let blocks: BlockCollection = vec![block("1", "a")].into();
        let value = serde_json::to_value(&blocks).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "1");
    }
}
