//! Game state module - the orchestrator
//!
//! Owns the grid, the dealt blocks, the physics loop and the completion
//! banner, and turns pointer and keyboard level requests into block
//! operations. Completion is checked after every drop and every block
//! action; the first time the grid is full the clock stops, the banner is
//! shown and a [`GameEvent::Completed`] is queued.

use glam::Vec2;

use crate::banner::CompletionBanner;
use crate::block::Block;
use crate::grid::Grid;
use crate::physics::Physics;
use crate::rng::SimpleRng;
use crate::shapes::{deal_shapes, ShapeDef};
use crate::snapshot::{BannerSnapshot, BlockSnapshot, GameSnapshot, GridCellSnapshot};
use crate::types::{BlockAction, BlockId, GameAction, GameConfig};

/// Things that happened since the last [`Game::take_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A block was dropped onto the grid
    Snapped { block: BlockId },
    /// A block was dropped but did not fit
    SnapRejected { block: BlockId },
    /// Every grid cell is covered
    Completed { elapsed_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    block: BlockId,
    /// Block origin minus the pointer position at grab time
    grab_offset: Vec2,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    blocks: Vec<Block>,
    physics: Physics,
    banner: CompletionBanner,
    selected: Option<BlockId>,
    drag: Option<DragState>,
    /// Draw order, topmost last
    z_order: Vec<BlockId>,
    completed: bool,
    elapsed_ms: u64,
    paused: bool,
    started: bool,
    events: Vec<GameEvent>,
    seed: u32,
}

impl Game {
    /// Create a stock game dealt from `seed`
    pub fn new(seed: u32) -> Self {
        Self::with_config(GameConfig::default(), seed)
    }

    pub fn with_config(config: GameConfig, seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let shapes = deal_shapes(&mut rng, config.random_extra_count);
        Self::from_parts(config, shapes, seed)
    }

    /// Create a game with an explicit block list, in tray order
    pub fn from_parts(config: GameConfig, shapes: Vec<ShapeDef>, seed: u32) -> Self {
        let blocks: Vec<Block> = shapes
            .into_iter()
            .enumerate()
            .map(|(id, shape)| Block::new(id, shape, &config))
            .collect();

        Self {
            grid: Grid::new(&config),
            z_order: (0..blocks.len()).collect(),
            blocks,
            physics: Physics::new(),
            banner: CompletionBanner::new(config.celebration),
            selected: None,
            drag: None,
            completed: false,
            elapsed_ms: 0,
            paused: false,
            started: false,
            events: Vec::new(),
            seed,
            config,
        }
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.physics.start();
        log::debug!(
            "game started: seed={} blocks={} cells={}",
            self.seed,
            self.blocks.len(),
            self.grid.len()
        );
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    pub fn dragging(&self) -> Option<BlockId> {
        self.drag.map(|d| d.block)
    }

    pub fn z_order(&self) -> &[BlockId] {
        &self.z_order
    }

    pub fn banner(&self) -> &CompletionBanner {
        &self.banner
    }

    /// Hand completion display to the host UI: the banner stays hidden and
    /// completions are counted for [`Game::take_external_completions`].
    pub fn set_external_banner(&mut self, external: bool) {
        self.banner.set_external(external);
    }

    /// Completions reported since the last call while the banner is external
    pub fn take_external_completions(&mut self) -> u32 {
        self.banner.take_external_events()
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance the clock, physics and banner by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: u32) {
        if !self.started || self.paused {
            return;
        }
        if !self.completed {
            self.elapsed_ms += u64::from(elapsed_ms);
        }
        self.physics.update(&mut self.blocks);
        self.banner.tick(elapsed_ms);
    }

    /// Topmost block under `point`
    pub fn block_at(&self, point: Vec2) -> Option<BlockId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.blocks[id].contains_point(point))
    }

    /// Select `id` and raise it to the top. Returns false for unknown ids.
    pub fn select_block(&mut self, id: BlockId) -> bool {
        if id >= self.blocks.len() {
            return false;
        }
        if let Some(prev) = self.selected.take() {
            self.blocks[prev].deselect();
        }
        self.blocks[id].select();
        self.selected = Some(id);
        self.raise(id);
        true
    }

    pub fn clear_selection(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.blocks[prev].deselect();
        }
    }

    /// Cycle the selection in block order
    pub fn select_next(&mut self) -> bool {
        if self.blocks.is_empty() {
            return false;
        }
        let next = match self.selected {
            Some(id) => (id + 1) % self.blocks.len(),
            None => 0,
        };
        self.select_block(next)
    }

    fn raise(&mut self, id: BlockId) {
        if let Some(pos) = self.z_order.iter().position(|&b| b == id) {
            self.z_order.remove(pos);
            self.z_order.push(id);
        }
    }

    /// Grab the topmost block under `point`: select it and lift it off the grid
    pub fn begin_drag(&mut self, point: Vec2) -> Option<BlockId> {
        if self.paused || self.drag.is_some() {
            return None;
        }
        let id = self.block_at(point)?;
        self.select_block(id);
        let block = &mut self.blocks[id];
        block.begin_drag(&mut self.grid);
        self.drag = Some(DragState {
            block: id,
            grab_offset: block.position() - point,
        });
        Some(id)
    }

    pub fn drag_to(&mut self, point: Vec2) {
        if let Some(drag) = self.drag {
            self.blocks[drag.block].drag_to(point + drag.grab_offset);
        }
    }

    /// Drop the dragged block. Returns whether it snapped, or None when
    /// nothing was being dragged.
    pub fn end_drag(&mut self) -> Option<bool> {
        let drag = self.drag.take()?;
        let snapped = self.blocks[drag.block].end_drag(&mut self.grid);
        self.record_snap(drag.block, snapped);
        self.check_completion();
        Some(snapped)
    }

    fn record_snap(&mut self, block: BlockId, snapped: bool) {
        if snapped {
            log::debug!(
                "block {} snapped, {}/{} cells placed",
                block,
                self.grid.occupied_count(),
                self.grid.len()
            );
            self.events.push(GameEvent::Snapped { block });
        } else {
            self.events.push(GameEvent::SnapRejected { block });
        }
    }

    /// Apply `action` to block `id`.
    ///
    /// A block that sits on the grid is lifted before a rotation or flip
    /// and snapped again afterwards, so occupancy always matches its cells.
    pub fn apply_block_action(&mut self, id: BlockId, action: BlockAction) -> bool {
        if self.paused || id >= self.blocks.len() {
            return false;
        }
        if self.drag.is_some_and(|d| d.block == id) {
            return false;
        }

        if action == BlockAction::Reset {
            self.blocks[id].reset(&mut self.grid);
            return true;
        }

        let block = &mut self.blocks[id];
        let was_grounded = block.is_grounded();
        if was_grounded {
            self.grid.release_block(id);
            block.physics_mut().grounded = false;
        }

        if let Some(angle) = action.rotation_degrees() {
            block.rotate(angle);
        } else if let Some(axis) = action.flip_axis() {
            block.flip(axis);
        }

        if was_grounded {
            let snapped = self.blocks[id].snap_to_grid(&mut self.grid);
            self.record_snap(id, snapped);
        }
        self.check_completion();
        true
    }

    /// Apply a keyboard level action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Block(block_action) => match self.selected {
                Some(id) => self.apply_block_action(id, block_action),
                None => false,
            },
            GameAction::SelectNext => !self.paused && self.select_next(),
            GameAction::Pause => {
                if self.paused {
                    self.resume();
                } else {
                    self.pause();
                }
                true
            }
            GameAction::Reset => {
                self.reset();
                true
            }
        }
    }

    pub fn pause(&mut self) {
        if self.paused || !self.started {
            return;
        }
        self.paused = true;
        self.physics.pause();
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.physics.resume();
    }

    /// Put every block back in the tray and restart the clock
    pub fn reset(&mut self) {
        self.physics.stop();
        self.grid.reset();
        self.drag = None;
        for block in self.blocks.iter_mut() {
            block.reset(&mut self.grid);
        }
        self.physics.reset(&mut self.blocks);
        self.selected = None;
        self.z_order = (0..self.blocks.len()).collect();
        self.completed = false;
        self.banner.hide();
        self.elapsed_ms = 0;
        self.paused = false;
        if self.started {
            self.physics.start();
        }
        log::debug!("game reset");
    }

    fn check_completion(&mut self) {
        if self.completed || !self.grid.is_complete() {
            return;
        }
        self.completed = true;
        self.physics.stop();
        self.banner.show();
        self.clear_selection();
        log::info!("puzzle completed in {} ms", self.elapsed_ms);
        self.events.push(GameEvent::Completed {
            elapsed_ms: self.elapsed_ms,
        });
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.clear();
        out.canvas = Vec2::new(self.config.width, self.config.height);
        out.grid.extend(
            self.grid
                .cells()
                .iter()
                .zip(self.grid.occupancy())
                .map(|(cell, &owner)| GridCellSnapshot {
                    center: cell.center,
                    owner,
                }),
        );
        out.blocks
            .extend(self.z_order.iter().map(|&id| BlockSnapshot::from(&self.blocks[id])));
        out.selected = self.selected;
        out.placed_cells = self.grid.occupied_count();
        out.total_cells = self.grid.len();
        out.elapsed_ms = self.elapsed_ms;
        out.completed = self.completed;
        out.paused = self.paused;
        out.started = self.started;
        out.seed = self.seed;
        out.banner = BannerSnapshot {
            visible: self.banner.is_visible(),
            opacity: self.banner.opacity(),
            remaining_ms: self.banner.remaining_ms(),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
