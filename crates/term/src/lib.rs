//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for the board. It avoids widget
//! toolkits and renders into a simple framebuffer that is then flushed to
//! the terminal.
//!
//! - [`game_view`] is pure: snapshot in, framebuffer out
//! - [`renderer`] owns the terminal and writes only what changed
//! - [`replay`] paces the recorded cascade rounds

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod replay;

pub use rock_em_blocks_core as core;
pub use rock_em_blocks_types as types;

pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use game_view::{color_rgb, BoardLayout, BoardOverlay, CascadePhase, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use replay::CascadeReplay;
