//! Client-side copy of a profile's blocks plus the onboarding flag.
//!
//! The mirror is a cache: every transition is synchronous and side-effect
//! free, and [`MirrorState::reconcile`] replaces the local blocks with the
//! server's aggregate whenever one is at hand.

use serde::{Deserialize, Serialize};

use crate::models::{Block, BlockCollection, Profile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorState {
    pub is_first_time: bool,
    pub blocks: BlockCollection,
}

impl Default for MirrorState {
    fn default() -> Self {
        Self {
            is_first_time: true,
            blocks: BlockCollection::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorAction {
    SetFirstTime(bool),
    /// Replace the block with the same id in place, append when absent
    UpsertBlock(Block),
    SetAllBlocks(Vec<Block>),
    /// No-op when the id is absent
    RemoveBlock(String),
    /// Overwrite the block with the same id; no-op when absent
    UpdateBlock(Block),
    /// Drop every block the user has not customized yet
    FilterSuggestions,
}

/// Whether an action changed the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl MirrorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: MirrorAction) -> Transition {
        match action {
            MirrorAction::SetFirstTime(flag) => {
                if self.is_first_time == flag {
                    return Transition::Unchanged;
                }
                self.is_first_time = flag;
                Transition::Changed
            }
            MirrorAction::UpsertBlock(block) => {
                self.blocks.upsert(block);
                Transition::Changed
            }
            MirrorAction::SetAllBlocks(blocks) => {
                self.blocks.replace_all(blocks);
                Transition::Changed
            }
            MirrorAction::RemoveBlock(id) => match self.blocks.remove(&id) {
                Some(_) => Transition::Changed,
                None => {
                    tracing::debug!("Mirror has no block {} to remove", id);
                    Transition::Unchanged
                }
            },
            MirrorAction::UpdateBlock(block) => match self.blocks.replace(block) {
                Ok(()) => Transition::Changed,
                Err(block) => {
                    tracing::debug!("Mirror has no block {} to update", block.id);
                    Transition::Unchanged
                }
            },
            MirrorAction::FilterSuggestions => {
                let before = self.blocks.len();
                self.blocks.retain(|block| !block.is_suggestion());
                if self.blocks.len() == before {
                    Transition::Unchanged
                } else {
                    Transition::Changed
                }
            }
        }
    }

    /// Adopt the server's blocks; the onboarding flag is client-only and kept
    pub fn reconcile(&mut self, profile: &Profile) -> Transition {
        if self.blocks == profile.blocks {
            return Transition::Unchanged;
        }
        self.blocks = profile.blocks.clone();
        Transition::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, UserRef};
    use uuid::Uuid;

    fn text(id: &str, content: &str) -> Block {
        let mut block = Block::new(id, BlockKind::Text);
        block.content = Some(content.to_string());
        block
    }

    fn customized(id: &str) -> Block {
        let mut block = text(id, "hello");
        block.display_label = Some("me".to_string());
        block.location = Some("Lisbon".to_string());
        block.image_url = Some("https://assets.bento.test/a.png".to_string());
        block
    }

    fn ids(state: &MirrorState) -> Vec<&str> {
        state.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn starts_in_onboarding() {
        let mut state = MirrorState::new();
        assert!(state.is_first_time);
        assert_eq!(state.apply(MirrorAction::SetFirstTime(false)), Transition::Changed);
        assert!(!state.is_first_time);
        assert_eq!(state.apply(MirrorAction::SetFirstTime(false)), Transition::Unchanged);
    }

    #[test]
    fn upsert_replaces_in_place_or_appends() {
        let mut state = MirrorState::new();
        state.apply(MirrorAction::UpsertBlock(text("1", "a")));
        state.apply(MirrorAction::UpsertBlock(text("2", "b")));
        state.apply(MirrorAction::UpsertBlock(text("1", "c")));

        assert_eq!(ids(&state), vec!["1", "2"]);
        assert_eq!(state.blocks.get("1").unwrap().content.as_deref(), Some("c"));
    }

    #[test]
    fn remove_and_update_ignore_unknown_ids() {
        let mut state = MirrorState::new();
        state.apply(MirrorAction::SetAllBlocks(vec![text("1", "a"), text("2", "b"), text("3", "c")]));

        assert_eq!(state.apply(MirrorAction::RemoveBlock("9".to_string())), Transition::Unchanged);
        assert_eq!(state.apply(MirrorAction::UpdateBlock(text("9", "z"))), Transition::Unchanged);
        assert_eq!(ids(&state), vec!["1", "2", "3"]);

        assert_eq!(state.apply(MirrorAction::RemoveBlock("2".to_string())), Transition::Changed);
        assert_eq!(ids(&state), vec!["1", "3"]);

        assert_eq!(state.apply(MirrorAction::UpdateBlock(text("3", "z"))), Transition::Changed);
        assert_eq!(state.blocks.get("3").unwrap().content.as_deref(), Some("z"));
    }

    #[test]
    fn filter_suggestions_keeps_customized_blocks() {
        let mut state = MirrorState::new();
        state.apply(MirrorAction::SetAllBlocks(vec![
            Block::new("placeholder", BlockKind::Link),
            customized("mine"),
            text("half", "only content"),
        ]));

        assert_eq!(state.apply(MirrorAction::FilterSuggestions), Transition::Changed);
        assert_eq!(ids(&state), vec!["mine"]);
        assert_eq!(state.apply(MirrorAction::FilterSuggestions), Transition::Unchanged);
    }

    #[test]
    fn reconcile_adopts_server_blocks() {
        let user = UserRef {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
        };
        let mut profile = Profile::empty(&user);
        profile.blocks.push(text("server", "x"));

        let mut state = MirrorState::new();
        state.apply(MirrorAction::UpsertBlock(text("local", "y")));
        state.apply(MirrorAction::SetFirstTime(false));

        assert_eq!(state.reconcile(&profile), Transition::Changed);
        assert_eq!(ids(&state), vec!["server"]);
        assert!(!state.is_first_time);
        assert_eq!(state.reconcile(&profile), Transition::Unchanged);
    }
}
