//! Keyboard input handling.
//!
//! This module defines the [`GameKey`] enum for abstracting game actions from physical keys,
//! and provides [`KeyState`] for tracking held keys. WASD and the arrow keys both drive
//! movement; holding either key of a pair counts as holding the direction.

use crate::game::collision::MovementInput;
use crate::maze::grid::Direction;
use std::collections::HashMap;
use winit::keyboard::{self, PhysicalKey};

/// Every action that can be triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Move up (W or Up Arrow).
    MoveUp,
    /// Move down (S or Down Arrow).
    MoveDown,
    /// Move left (A or Left Arrow).
    MoveLeft,
    /// Move right (D or Right Arrow).
    MoveRight,
    /// Enter the selected maze (Enter or Space).
    Confirm,
    /// Leave the current level for the world map (Escape).
    Escape,
    /// Restart the current level (R).
    Restart,
    /// Show the next world on the world map (N).
    NextWorld,
    /// Show the previous world on the world map (P).
    PrevWorld,
    /// Quit the game (`).
    Quit,
}

impl GameKey {
    /// Direction a movement key stands for.
    pub fn direction(self) -> Option<Direction> {
        match self {
            GameKey::MoveUp => Some(Direction::Top),
            GameKey::MoveRight => Some(Direction::Right),
            GameKey::MoveDown => Some(Direction::Bottom),
            GameKey::MoveLeft => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Tracks which physical keys are held and the action each one is bound to.
///
/// Two physical keys can drive the same action (W and Up Arrow), so an action
/// stays held until every key bound to it is released.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Currently held physical keys and their actions.
    pub held: HashMap<PhysicalKey, GameKey>,
}

impl KeyState {
    /// Creates a new, empty [`KeyState`].
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
        }
    }

    /// Marks `physical`, bound to `key`, as pressed.
    ///
    /// # Returns
    /// `true` if `key` was not already held through any binding, so callers
    /// can react to the initial press only and ignore auto-repeat.
    pub fn press_key(&mut self, physical: PhysicalKey, key: GameKey) -> bool {
        let newly_held = !self.is_pressed(key);
        self.held.insert(physical, key);
        newly_held
    }

    /// Marks `physical` as released.
    pub fn release_key(&mut self, physical: PhysicalKey) {
        self.held.remove(&physical);
    }

    /// Checks if any key bound to `key` is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.held.values().any(|&held| held == key)
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Held movement directions.
    pub fn movement_input(&self) -> MovementInput {
        MovementInput {
            up: self.is_pressed(GameKey::MoveUp),
            right: self.is_pressed(GameKey::MoveRight),
            down: self.is_pressed(GameKey::MoveDown),
            left: self.is_pressed(GameKey::MoveLeft),
        }
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it matches a mapped action.
///
/// # Returns
/// * `Some(GameKey)` if the key maps to a game action.
/// * `None` otherwise.
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MoveUp,
            ArrowDown => GameKey::MoveDown,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Enter => GameKey::Confirm,
            Space => GameKey::Confirm,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => match_char_key!(c, {
            "w" => GameKey::MoveUp,
            "s" => GameKey::MoveDown,
            "a" => GameKey::MoveLeft,
            "d" => GameKey::MoveRight,
            "r" => GameKey::Restart,
            "n" => GameKey::NextWorld,
            "p" => GameKey::PrevWorld,
            "`" => GameKey::Quit,
        }),

        _ => None,
    }
}
