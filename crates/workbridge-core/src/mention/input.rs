use super::trigger::{commit_selection, Rect, TriggerState};
use crate::project::{CachedFileItem, FileCache};

type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// Chat input buffer that owns the `@mention` trigger state.
///
/// The trigger is recomputed from scratch on every edit, so no stale
/// trigger survives a change to the text.
pub struct MentionInput {
    text: String,
    caret: usize,
    container: Option<Rect>,
    trigger: TriggerState,
    on_change: Option<ChangeListener>,
}

impl Default for MentionInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionInput {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            container: None,
            trigger: TriggerState::hidden(),
            on_change: None,
        }
    }

    /// Called with the new text whenever a selection is committed.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
        self.reevaluate();
    }

    /// Apply an edit coming from the text area.
    pub fn update(&mut self, text: impl Into<String>, caret: usize) {
        self.text = text.into();
        self.caret = caret.min(self.text.len());
        self.reevaluate();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn trigger(&self) -> &TriggerState {
        &self.trigger
    }

    /// Current dropdown entries for the active trigger; empty when hidden.
    pub fn suggestions(&self, cache: &FileCache, limit: Option<usize>) -> Vec<CachedFileItem> {
        if !self.trigger.is_visible {
            return Vec::new();
        }
        cache.get_filtered_files(&self.trigger.query, limit)
    }

    /// Insert the chosen path at the active trigger. Returns false when no
    /// trigger is visible.
    pub fn select(&mut self, path: &str) -> bool {
        if !self.trigger.is_visible {
            return false;
        }
        let splice = commit_selection(&self.text, self.trigger.trigger_index, self.caret, path);
        self.text = splice.text;
        self.caret = splice.caret;
        // Closed until the next edit even though the caret still follows `@path`.
        self.trigger = TriggerState::hidden();

        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.text);
        }
        true
    }

    /// Hide the dropdown without touching the text (e.g. on Escape).
    pub fn dismiss(&mut self) {
        self.trigger = TriggerState::hidden();
    }

    fn reevaluate(&mut self) {
        self.trigger = TriggerState::evaluate(&self.text, self.caret, self.container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_update_tracks_trigger() {
        let mut input = MentionInput::new();
        input.update("open @sr", 8);
        assert!(input.trigger().is_visible);
        assert_eq!(input.trigger().query, "sr");

        input.update("open @src ", 10);
        assert!(!input.trigger().is_visible);
    }

    #[test]
    fn test_select_splices_and_notifies() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();

        let mut input = MentionInput::new();
        input.on_change(move |text| sink.lock().unwrap().push(text.to_string()));
        input.update("fix @ma", 7);

        assert!(input.select("src/main.rs"));
        assert_eq!(input.text(), "fix @src/main.rs");
        assert_eq!(input.caret(), input.text().len());
        assert_eq!(*changes.lock().unwrap(), vec!["fix @src/main.rs".to_string()]);
    }

    #[test]
    fn test_select_without_trigger_is_noop() {
        let mut input = MentionInput::new();
        input.update("no mention", 10);
        assert!(!input.select("a.rs"));
        assert_eq!(input.text(), "no mention");
    }

    #[test]
    fn test_dismiss_hides_until_next_edit() {
        let mut input = MentionInput::new();
        input.update("@a", 2);
        input.dismiss();
        assert!(!input.trigger().is_visible);
        input.update("@ab", 3);
        assert!(input.trigger().is_visible);
    }
}
