//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids
//! widget/layout libraries and instead renders into a simple framebuffer
//! that is diffed and flushed to the terminal.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Map world coordinates to terminal cells in one place, both ways, so
//!   mouse input and drawing agree
//! - Compensate for glyph aspect ratio (2 chars wide per block cell)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use brainbox_core as core;
pub use brainbox_types as types;

pub use fb::{blend, Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{format_elapsed, AnchorY, GameView, Layout, Viewport};
pub use renderer::{collect_changed_spans, encode_full_into, encode_spans_into, Span, TerminalRenderer};
