pub mod input;
pub mod trigger;

pub use input::MentionInput;
pub use trigger::{commit_selection, Anchor, Rect, Splice, TriggerState, TRIGGER_CHAR};
