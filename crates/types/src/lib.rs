//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, input mapping).
//!
//! # Canvas and Grid
//!
//! The play area is a 900x700 world-unit canvas with y growing downwards.
//! The left half hosts a diamond-oriented grid, the right half is the tray
//! where blocks start.
//!
//! - **Half block size**: 30 (distance between diagonal grid neighbours on each axis)
//! - **Grid**: 9 columns (i = -4..=4) by 11 rows (j = -5..=5), keeping only the
//!   (i, j) pairs with different parity: 50 cells
//! - **Snap reach**: 90 from the reference cell, **snap tolerance**: 5
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `DOUBLE_CLICK_MS` | 300 | Two primary presses within this window rotate counter-clockwise |
//! | `RIGHT_CLICK_MS` | 250 | Secondary press waits this long before flipping |
//! | `CELEBRATION_MS` | 5000 | Completion banner lifetime |
//! | `CELEBRATION_BLINK_MS` | 800 | Half period of the banner blink |
//!
//! # Examples
//!
//! ```
//! use brainbox_types::{BlockAction, GameConfig, Rgb};
//!
//! let action = BlockAction::from_str("rotateCw").unwrap();
//! assert_eq!(action, BlockAction::RotateCw);
//! assert_eq!(action.rotation_degrees(), Some(90.0));
//!
//! let config = GameConfig::default();
//! assert_eq!(config.grid.max_snap_distance, 90.0);
//!
//! assert_eq!(Rgb::from_hex("#572765"), Some(Rgb::new(0x57, 0x27, 0x65)));
//! ```

/// Canvas width in world units
pub const CANVAS_WIDTH: f32 = 900.0;

/// Canvas height in world units
pub const CANVAS_HEIGHT: f32 = 700.0;

/// Half the diagonal of a grid diamond
pub const HALF_BLOCK_SIZE: f32 = 30.0;

/// Grid columns (i ranges over -cols/2..=cols/2)
pub const GRID_COLS: u8 = 9;

/// Grid rows (j ranges over -rows/2..=rows/2)
pub const GRID_ROWS: u8 = 11;

/// Maximum distance between a block's reference cell and the grid cell it snaps to
pub const MAX_SNAP_DISTANCE: f32 = HALF_BLOCK_SIZE * 3.0;

/// Distance within which a block cell counts as sitting on a grid cell
pub const SNAP_TOLERANCE: f32 = 5.0;

/// Rows in a shape matrix
pub const SHAPE_ROWS: usize = 4;

/// Columns in a shape matrix
pub const SHAPE_COLS: usize = 3;

/// Rotation every block starts with (degrees)
pub const INITIAL_ROTATION: f32 = 45.0;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Double click window for the primary button
pub const DOUBLE_CLICK_MS: u32 = 300;

/// Delay before a single secondary click is treated as a flip
pub const RIGHT_CLICK_MS: u32 = 250;

/// Completion banner lifetime
pub const CELEBRATION_MS: u32 = 5000;

/// Half period of the completion banner blink
pub const CELEBRATION_BLINK_MS: u32 = 800;

/// Banner opacity at the bottom of a blink
pub const CELEBRATION_MIN_OPACITY: f32 = 0.3;

/// Block opacity while being dragged
pub const DRAG_OPACITY: f32 = 0.9;

/// Number of shapes drawn from the extra pool on top of the base set
pub const RANDOM_EXTRA_COUNT: usize = 2;

/// Grid layout and snapping parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub rows: u8,
    pub cols: u8,
    pub max_snap_distance: f32,
    pub tolerance: f32,
}

/// Where blocks are laid out before the player touches them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrayConfig {
    pub cols: usize,
    pub start_x: f32,
    pub start_y: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

/// Gravity parameters. Gravity is disabled; these are carried for the stub.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub force: f32,
    pub friction: f32,
    pub bounce: f32,
    pub ground_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelebrationConfig {
    pub duration_ms: u32,
    pub blink_ms: u32,
    pub min_opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    pub double_click_ms: u32,
    pub right_click_ms: u32,
}

/// Complete game configuration.
///
/// `GameConfig::default()` reproduces the stock puzzle; tests shrink the grid
/// to build small solvable boards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub half_block_size: f32,
    pub grid: GridConfig,
    pub tray: TrayConfig,
    pub random_extra_count: usize,
    pub initial_rotation: f32,
    pub physics: PhysicsConfig,
    pub celebration: CelebrationConfig,
    pub input: InputConfig,
    pub drag_opacity: f32,
}

impl GameConfig {
    /// Side length of one block cell square (a grid diamond seen unrotated)
    pub fn cell_size(&self) -> f32 {
        self.half_block_size.hypot(self.half_block_size)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            half_block_size: HALF_BLOCK_SIZE,
            grid: GridConfig {
                rows: GRID_ROWS,
                cols: GRID_COLS,
                max_snap_distance: MAX_SNAP_DISTANCE,
                tolerance: SNAP_TOLERANCE,
            },
            tray: TrayConfig {
                cols: 4,
                start_x: 520.0,
                start_y: 50.0,
                horizontal_spacing: 110.0,
                vertical_spacing: 160.0,
            },
            random_extra_count: RANDOM_EXTRA_COUNT,
            initial_rotation: INITIAL_ROTATION,
            physics: PhysicsConfig {
                force: 0.3,
                friction: 0.98,
                bounce: 5.0,
                ground_y: CANVAS_HEIGHT,
            },
            celebration: CelebrationConfig {
                duration_ms: CELEBRATION_MS,
                blink_ms: CELEBRATION_BLINK_MS,
                min_opacity: CELEBRATION_MIN_OPACITY,
            },
            input: InputConfig {
                double_click_ms: DOUBLE_CLICK_MS,
                right_click_ms: RIGHT_CLICK_MS,
            },
            drag_opacity: DRAG_OPACITY,
        }
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill and stroke colors of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockColor {
    pub fill: Rgb,
    pub stroke: Rgb,
}

impl BlockColor {
    pub const fn solid(rgb: Rgb) -> Self {
        Self {
            fill: rgb,
            stroke: rgb,
        }
    }
}

/// Mirror axis for flips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Operations the player can apply to a single block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockAction {
    /// Rotate 90° clockwise around the pivot
    RotateCw,
    /// Rotate 90° counter-clockwise around the pivot
    RotateCcw,
    /// Mirror along the block's local x axis
    FlipHorizontal,
    /// Mirror along the block's local y axis
    FlipVertical,
    /// Send the block back to its tray slot
    Reset,
}

impl BlockAction {
    /// Parse action from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use brainbox_types::BlockAction;
    ///
    /// assert_eq!(BlockAction::from_str("flipHorizontal"), Some(BlockAction::FlipHorizontal));
    /// assert_eq!(BlockAction::from_str("ROTATECCW"), Some(BlockAction::RotateCcw));
    /// assert_eq!(BlockAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rotatecw" => Some(BlockAction::RotateCw),
            "rotateccw" => Some(BlockAction::RotateCcw),
            "fliphorizontal" => Some(BlockAction::FlipHorizontal),
            "flipvertical" => Some(BlockAction::FlipVertical),
            "reset" => Some(BlockAction::Reset),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockAction::RotateCw => "rotateCw",
            BlockAction::RotateCcw => "rotateCcw",
            BlockAction::FlipHorizontal => "flipHorizontal",
            BlockAction::FlipVertical => "flipVertical",
            BlockAction::Reset => "reset",
        }
    }

    /// Signed rotation in degrees, positive is clockwise on screen
    pub fn rotation_degrees(&self) -> Option<f32> {
        match self {
            BlockAction::RotateCw => Some(90.0),
            BlockAction::RotateCcw => Some(-90.0),
            _ => None,
        }
    }

    pub fn flip_axis(&self) -> Option<FlipAxis> {
        match self {
            BlockAction::FlipHorizontal => Some(FlipAxis::Horizontal),
            BlockAction::FlipVertical => Some(FlipAxis::Vertical),
            _ => None,
        }
    }
}

/// Game-level actions, mostly produced by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Apply a block action to the selected block
    Block(BlockAction),
    /// Cycle the selection to the next block
    SelectNext,
    /// Toggle pause
    Pause,
    /// Put every block back in the tray and restart the clock
    Reset,
}

impl GameAction {
    /// Parse action from string
    ///
    /// Block actions parse through [`BlockAction::from_str`]; `resetGame`
    /// is the game-level reset.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "selectnext" => Some(GameAction::SelectNext),
            "pause" => Some(GameAction::Pause),
            "resetgame" => Some(GameAction::Reset),
            other => BlockAction::from_str(other).map(GameAction::Block),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Block(action) => action.as_str(),
            GameAction::SelectNext => "selectNext",
            GameAction::Pause => "pause",
            GameAction::Reset => "resetGame",
        }
    }
}

/// Pointer buttons the game distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Index of a block inside a game
pub type BlockId = usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = GameConfig::default();
        assert_eq!(config.width, 900.0);
        assert_eq!(config.height, 700.0);
        assert_eq!(config.grid.rows, 11);
        assert_eq!(config.grid.cols, 9);
        assert_eq!(config.grid.max_snap_distance, 90.0);
        assert_eq!(config.grid.tolerance, 5.0);
        assert_eq!(config.input.double_click_ms, 300);
        assert_eq!(config.input.right_click_ms, 250);
        assert_eq!(config.celebration.duration_ms, 5000);
        assert_eq!(config.physics.ground_y, config.height);
    }

    #[test]
    fn cell_size_is_diamond_side() {
        let config = GameConfig::default();
        assert!((config.cell_size() - 42.426_407).abs() < 1e-3);
    }

    #[test]
    fn rgb_hex_parsing() {
        assert_eq!(Rgb::from_hex("e4132e"), Some(Rgb::new(0xe4, 0x13, 0x2e)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zz0000"), None);
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn game_action_parsing() {
        assert_eq!(GameAction::from_str("selectNext"), Some(GameAction::SelectNext));
        assert_eq!(GameAction::from_str("resetGame"), Some(GameAction::Reset));
        assert_eq!(
            GameAction::from_str("reset"),
            Some(GameAction::Block(BlockAction::Reset))
        );
        assert_eq!(
            GameAction::from_str("flipVertical"),
            Some(GameAction::Block(BlockAction::FlipVertical))
        );
        assert_eq!(GameAction::Block(BlockAction::RotateCcw).as_str(), "rotateCcw");
    }

    #[test]
    fn block_action_geometry() {
        assert_eq!(BlockAction::RotateCcw.rotation_degrees(), Some(-90.0));
        assert_eq!(BlockAction::FlipVertical.flip_axis(), Some(FlipAxis::Vertical));
        assert_eq!(BlockAction::Reset.rotation_degrees(), None);
        assert_eq!(BlockAction::Reset.flip_axis(), None);
    }
}
