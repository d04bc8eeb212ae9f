//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the puzzle rules, state management, and geometry.
//! It has **no dependencies** on terminals, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed deals the same tray
//! - **Testable**: Every rule is exercised without a screen
//! - **Portable**: Can run in any environment (terminal, headless, benches)
//!
//! # Module Structure
//!
//! - [`grid`]: diamond lattice of target cells and their occupancy
//! - [`shapes`]: shape catalog and dealing
//! - [`transform`]: translate/rotate/scale transforms built on `glam::Affine2`
//! - [`block`]: draggable blocks, bounds, and grid snapping
//! - [`physics`]: the (disabled) gravity loop
//! - [`banner`]: completion banner timing and blink
//! - [`game_state`]: the orchestrator
//! - [`rng`]: seeded shuffling
//! - [`snapshot`]: render-ready copies of the game state
//!
//! # Rules
//!
//! - Blocks start in the tray, rotated 45 degrees so their squares line up
//!   with the diamond grid
//! - Dropping a block aligns its first cell with the nearest grid cell
//!   within 90 units; the drop only sticks if every cell lands on a free
//!   grid cell
//! - Rotations are quarter turns around the block's pivot cell; flips mirror
//!   around it
//! - The puzzle is solved when every grid cell is covered
//!
//! # Example
//!
//! ```
//! use brainbox_core::Game;
//! use brainbox_types::{BlockAction, GameAction};
//!
//! let mut game = Game::new(12345);
//! game.start();
//!
//! game.apply_action(GameAction::SelectNext);
//! game.apply_action(GameAction::Block(BlockAction::RotateCw));
//! game.tick(16);
//!
//! assert_eq!(game.elapsed_ms(), 16);
//! assert!(!game.is_completed());
//! ```

pub mod banner;
pub mod block;
pub mod game_state;
pub mod grid;
pub mod physics;
pub mod rng;
pub mod shapes;
pub mod snapshot;
pub mod transform;

pub use brainbox_types as types;

// Re-export commonly used types for convenience
pub use banner::CompletionBanner;
pub use block::{Block, PhysicsState};
pub use game_state::{Game, GameEvent};
pub use grid::{Grid, GridCell, GridKey};
pub use physics::Physics;
pub use rng::SimpleRng;
pub use shapes::{deal_shapes, ShapeDef, BASE_SHAPES, EXTRA_SHAPES};
pub use snapshot::{BannerSnapshot, BlockSnapshot, CellSnapshot, GameSnapshot, GridCellSnapshot};
pub use transform::{normalize_angle, Transform};

pub use glam::Vec2;
