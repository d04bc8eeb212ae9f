//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! and mouse events into [`crate::types::GameAction`]s and pointer events,
//! and classifies pointer presses on blocks (double clicks, the delayed
//! right click) into block commands.

pub mod handler;
pub mod map;

pub use brainbox_types as types;

pub use handler::{BlockCommand, InputHandler};
pub use map::{handle_key_event, map_mouse_event, should_quit, PointerEvent};
