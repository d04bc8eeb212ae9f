//! Physics module - the gravity loop, currently inert
//!
//! Gravity is disabled, so `update` only forwards to each block's
//! `apply_physics`. The run/pause flags still gate whether the game calls it.

use crate::block::Block;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Physics {
    running: bool,
    paused: bool,
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.paused = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.running {
            self.paused = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Running and not paused
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    /// Advance every block by one step
    pub fn update(&self, blocks: &mut [Block]) {
        if !self.is_active() {
            return;
        }
        for block in blocks.iter_mut() {
            block.apply_physics();
        }
    }

    /// Clear motion and interaction flags on every block
    pub fn reset(&self, blocks: &mut [Block]) {
        for block in blocks.iter_mut() {
            let state = block.physics_mut();
            state.velocity_y = 0.0;
            state.grounded = false;
            state.dragging = false;
            state.selected = false;
        }
    }
}
