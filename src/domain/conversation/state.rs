//! Durable per-conversation state: which menu the user is in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flow a conversation starts in before any routing has happened.
pub const DEFAULT_FLOW: &str = "main";

/// Step a conversation starts in before any routing has happened.
pub const DEFAULT_STEP: &str = "start";

/// Step every menu transition lands on.
pub const MENU_STEP: &str = "menu";

/// Durable `{flow, step, extra}` record for one conversation.
///
/// Created lazily on first inbound event, mutated only by the action
/// router, and never deleted. `extra` carries cross-cutting fields such
/// as the detected language. The sequencer serializes all writers, so
/// read-merge-write here needs no store-level locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub flow: String,
    pub step: String,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            flow: DEFAULT_FLOW.to_string(),
            step: DEFAULT_STEP.to_string(),
            extra: Map::new(),
        }
    }
}

/// Partial update applied to a ConversationState by merge.
///
/// `None` fields leave the current value untouched; `extra` keys overlay
/// existing ones without replacing the rest of the map.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub flow: Option<String>,
    pub step: Option<String>,
    pub extra: Map<String, Value>,
}

impl StateUpdate {
    /// Update that moves the conversation to a menu flow.
    pub fn menu(flow: impl Into<String>) -> Self {
        Self {
            flow: Some(flow.into()),
            step: Some(MENU_STEP.to_string()),
            extra: Map::new(),
        }
    }

    /// Update that only overlays one extra key.
    pub fn extra_entry(key: impl Into<String>, value: Value) -> Self {
        let mut extra = Map::new();
        extra.insert(key.into(), value);
        Self {
            flow: None,
            step: None,
            extra,
        }
    }

    /// True when the update carries no change at all.
    pub fn is_empty(&self) -> bool {
        self.flow.is_none() && self.step.is_none() && self.extra.is_empty()
    }
}

impl ConversationState {
    /// Applies an update by merge. Idempotent: applying the same update
    /// twice leaves the state identical to applying it once.
    pub fn merge(&mut self, update: StateUpdate) {
        if let Some(flow) = update.flow {
            self.flow = flow;
        }
        if let Some(step) = update.step {
            self.step = step;
        }
        for (key, value) in update.extra {
            self.extra.insert(key, value);
        }
    }

    /// Detected language of the conversation, if one was ever recorded.
    pub fn language(&self) -> Option<&str> {
        self.extra.get("lang").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_state_is_main_start() {
        let state = ConversationState::default();
        assert_eq!(state.flow, "main");
        assert_eq!(state.step, "start");
        assert!(state.extra.is_empty());
    }

    #[test]
    fn menu_update_sets_flow_and_menu_step() {
        let mut state = ConversationState::default();
        state.merge(StateUpdate::menu("jewellery"));
        assert_eq!(state.flow, "jewellery");
        assert_eq!(state.step, "menu");
    }

    #[test]
    fn merge_overlays_extra_without_replacing_map() {
        let mut state = ConversationState::default();
        state.merge(StateUpdate::extra_entry("lang", json!("hi")));
        state.merge(StateUpdate::extra_entry("segment", json!("vip")));

        assert_eq!(state.extra.get("lang"), Some(&json!("hi")));
        assert_eq!(state.extra.get("segment"), Some(&json!("vip")));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut once = ConversationState::default();
        once.merge(StateUpdate::extra_entry("segment", json!("vip")));
        once.merge(StateUpdate::extra_entry("lang", json!("hi")));

        let mut twice = once.clone();
        twice.merge(StateUpdate::extra_entry("lang", json!("hi")));

        assert_eq!(once, twice);
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut state = ConversationState::default();
        state.merge(StateUpdate::menu("offers"));
        let before = state.clone();

        let update = StateUpdate::default();
        assert!(update.is_empty());
        state.merge(update);
        assert_eq!(state, before);
    }

    #[test]
    fn language_reads_lang_extra() {
        let mut state = ConversationState::default();
        assert_eq!(state.language(), None);
        state.merge(StateUpdate::extra_entry("lang", json!("hi")));
        assert_eq!(state.language(), Some("hi"));
    }
}
