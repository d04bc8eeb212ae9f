//! Brain Box (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so binaries and tests
//! can write `brainbox::core::Game` or `brainbox::leaderboard::run_server`.
//! [`play`] routes pointer input into a game and [`submit`] connects a
//! finished game to the leaderboard.

pub use brainbox_core as core;
pub use brainbox_input as input;
pub use brainbox_leaderboard as leaderboard;
pub use brainbox_term as term;
pub use brainbox_types as types;

pub mod play;
pub mod submit;
