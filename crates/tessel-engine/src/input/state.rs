use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Polled keyboard capability.
///
/// The viewer asks once per frame whether a key is held; nothing in the
/// rendering core owns key state.
pub trait KeyInput {
    fn is_key_down(&self, key: Key) -> bool;
}

/// Held keys and focus for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases never arrive for keys held while focus leaves.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(key);
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }
}

impl KeyInput for InputState {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
