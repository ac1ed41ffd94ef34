//! Platform-agnostic keyboard input
//!
//! Two layers, both fed by [`Keyboard::inject_key`]:
//! - a held-key table, read every frame by camera controls;
//! - a queue of [`InputEvent`]s: `KeyDown`/`KeyUp` edges plus a `KeyPressed`
//!   convenience event that also repeats while a key auto-repeats.
//!
//! Platform adapters (see `input_adapter`) translate native events into these types.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Keys the engine reacts to.
///
/// Letters and arrows cover every [`KeyBindings`](crate::scene::camera::KeyBindings)
/// slot; `Space` and `Escape` are left for application shortcuts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Space,
    Escape,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// The key went from released to held.
    KeyDown(Key),
    /// The key went from held to released.
    KeyUp(Key),
    /// The key was pressed, including auto-repeats.
    KeyPressed(Key),
}

/// Held-key table plus pending input events.
#[derive(Debug, Default, Clone)]
pub struct Keyboard {
    held: HashSet<Key>,
    events: VecDeque<InputEvent>,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key state change from the platform layer.
    ///
    /// A repeated press of a held key queues only `KeyPressed`, a release of a
    /// key that is not held queues nothing.
    pub fn inject_key(&mut self, key: Key, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if self.held.insert(key) {
                    self.events.push_back(InputEvent::KeyDown(key));
                }
                self.events.push_back(InputEvent::KeyPressed(key));
            }
            ButtonState::Released => {
                if self.held.remove(&key) {
                    self.events.push_back(InputEvent::KeyUp(key));
                }
            }
        }
    }

    /// Whether `key` is currently held.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Takes all pending events in arrival order.
    pub fn drain_events(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    /// Releases every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        for key in std::mem::take(&mut self.held) {
            self.events.push_back(InputEvent::KeyUp(key));
        }
    }
}
