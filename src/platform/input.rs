//! Player intents and their browser key bindings

use serde::{Deserialize, Serialize};

/// A movement request from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// One keyboard step left
    Left,
    /// One keyboard step right
    Right,
    /// Center the player under a pointer/touch x (canvas coordinates)
    MoveTo(f32),
}

/// Map a `KeyboardEvent.key` value to an intent
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Intent::Left),
        "ArrowRight" | "d" | "D" => Some(Intent::Right),
        _ => None,
    }
}
