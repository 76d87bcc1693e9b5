//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework. Maps `crossterm` key events into
//! [`InputEvent`]s and turns cursor picks and mouse clicks into
//! [`crate::types::GameAction`] requests.

pub mod handler;
pub mod map;

pub use rock_em_blocks_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, should_quit, Direction, InputEvent};
