/// The character that opens file-mention autocomplete.
pub const TRIGGER_CHAR: char = '@';

/// Bounding box of the scroll container the input lives in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Where the dropdown should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    /// Top-center of the container.
    pub fn top_center(container: Rect) -> Self {
        Self {
            x: container.x + container.width / 2.0,
            y: container.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriggerState {
    pub is_visible: bool,
    pub query: String,
    pub position: Anchor,
    /// Byte offset of the `@` in the buffer.
    pub trigger_index: usize,
}

impl TriggerState {
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Recompute the trigger from the whole buffer and caret.
    ///
    /// Only the nearest `@` before the caret counts. It must start a token
    /// (buffer start, space or newline before it) and no whitespace may sit
    /// between it and the caret.
    pub fn evaluate(text: &str, caret: usize, container: Option<Rect>) -> Self {
        let caret = floor_char_boundary(text, caret);
        let before = &text[..caret];

        let Some(trigger_index) = before.rfind(TRIGGER_CHAR) else {
            return Self::hidden();
        };

        let query = &before[trigger_index + TRIGGER_CHAR.len_utf8()..];
        if query.chars().any(char::is_whitespace) {
            return Self::hidden();
        }

        let starts_token = match before[..trigger_index].chars().next_back() {
            None => true,
            Some(c) => c == ' ' || c == '\n',
        };
        if !starts_token {
            return Self::hidden();
        }

        Self {
            is_visible: true,
            query: query.to_string(),
            position: container.map(Anchor::top_center).unwrap_or_default(),
            trigger_index,
        }
    }
}

/// Result of splicing a chosen path into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub caret: usize,
}

/// Replace `[trigger_index, caret)` with `@path`; the caret lands right after the path.
pub fn commit_selection(text: &str, trigger_index: usize, caret: usize, path: &str) -> Splice {
    let caret = floor_char_boundary(text, caret);
    let start = floor_char_boundary(text, trigger_index.min(caret));

    let mut spliced = String::with_capacity(text.len() + path.len() + 1);
    spliced.push_str(&text[..start]);
    spliced.push(TRIGGER_CHAR);
    spliced.push_str(path);
    let new_caret = spliced.len();
    spliced.push_str(&text[caret..]);

    Splice {
        text: spliced,
        caret: new_caret,
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
