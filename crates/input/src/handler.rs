//! Click classification for block pointer presses.
//!
//! Terminals report raw button presses only, so double clicks and the
//! delayed single right click are recognised here against a clock that the
//! game loop advances with [`InputHandler::update`]:
//!
//! - two primary presses on the same block within `double_click_ms`
//!   rotate it counter-clockwise
//! - a secondary press arms a `right_click_ms` timer; a second secondary
//!   press before it fires rotates clockwise, otherwise the block flips
//!   horizontally when the timer expires

use crate::types::{BlockAction, BlockId, InputConfig, PointerButton, DOUBLE_CLICK_MS, RIGHT_CLICK_MS};

/// A block operation produced by pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCommand {
    pub block: BlockId,
    pub action: BlockAction,
}

impl BlockCommand {
    pub fn new(block: BlockId, action: BlockAction) -> Self {
        Self { block, action }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingFlip {
    block: BlockId,
    due_ms: u64,
}

/// Tracks click history for pointer presses on blocks.
#[derive(Debug, Clone)]
pub struct InputHandler {
    now_ms: u64,
    last_primary: Option<(BlockId, u64)>,
    pending_flip: Option<PendingFlip>,
    double_click_ms: u32,
    right_click_ms: u32,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_config(InputConfig {
            double_click_ms: DOUBLE_CLICK_MS,
            right_click_ms: RIGHT_CLICK_MS,
        })
    }

    pub fn with_config(config: InputConfig) -> Self {
        Self {
            now_ms: 0,
            last_primary: None,
            pending_flip: None,
            double_click_ms: config.double_click_ms,
            right_click_ms: config.right_click_ms,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Block waiting for its right click timer, if any
    pub fn pending_flip(&self) -> Option<BlockId> {
        self.pending_flip.map(|p| p.block)
    }

    /// Handle a button press that landed on `block`
    pub fn pointer_down(&mut self, block: BlockId, button: PointerButton) -> Option<BlockCommand> {
        match button {
            PointerButton::Primary => self.primary_down(block),
            PointerButton::Secondary => self.secondary_down(block),
        }
    }

    fn primary_down(&mut self, block: BlockId) -> Option<BlockCommand> {
        let now = self.now_ms;
        match self.last_primary {
            Some((last, at)) if last == block && now - at < u64::from(self.double_click_ms) => {
                self.last_primary = None;
                Some(BlockCommand::new(block, BlockAction::RotateCcw))
            }
            _ => {
                self.last_primary = Some((block, now));
                None
            }
        }
    }

    fn secondary_down(&mut self, block: BlockId) -> Option<BlockCommand> {
        // A second press before the timer fires cancels it and rotates the
        // block under the pointer.
        if self.pending_flip.take().is_some() {
            return Some(BlockCommand::new(block, BlockAction::RotateCw));
        }
        self.pending_flip = Some(PendingFlip {
            block,
            due_ms: self.now_ms + u64::from(self.right_click_ms),
        });
        None
    }

    /// Advance the clock; fires the right click timer when it is due
    pub fn update(&mut self, elapsed_ms: u32) -> Option<BlockCommand> {
        self.now_ms += u64::from(elapsed_ms);
        match self.pending_flip {
            Some(pending) if self.now_ms >= pending.due_ms => {
                self.pending_flip = None;
                Some(BlockCommand::new(pending.block, BlockAction::FlipHorizontal))
            }
            _ => None,
        }
    }

    /// Forget click history and drop a pending flip
    pub fn reset(&mut self) {
        self.last_primary = None;
        self.pending_flip = None;
    }
}
