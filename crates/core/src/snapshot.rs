use arrayvec::ArrayVec;
use glam::Vec2;

use crate::block::Block;
use crate::shapes::MAX_SHAPE_CELLS;
use crate::types::{BlockColor, BlockId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSnapshot {
    pub center: Vec2,
    /// Corners of the cell square in world space
    pub corners: [Vec2; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSnapshot {
    pub id: BlockId,
    pub color: BlockColor,
    pub position: Vec2,
    pub rotation: f32,
    pub flipped_x: bool,
    pub flipped_y: bool,
    pub opacity: f32,
    pub selected: bool,
    pub dragging: bool,
    pub grounded: bool,
    pub cells: ArrayVec<CellSnapshot, MAX_SHAPE_CELLS>,
}

impl From<&Block> for BlockSnapshot {
    fn from(block: &Block) -> Self {
        let centers = block.cell_world_centers();
        let corners = block.cell_world_corners();
        let physics = block.physics();
        let transform = block.transform();
        Self {
            id: block.id(),
            color: block.shape().color,
            position: transform.position,
            rotation: transform.rotation,
            flipped_x: physics.flipped_x,
            flipped_y: physics.flipped_y,
            opacity: block.opacity(),
            selected: physics.selected,
            dragging: physics.dragging,
            grounded: physics.grounded,
            cells: centers
                .iter()
                .zip(corners.iter())
                .map(|(&center, &corners)| CellSnapshot { center, corners })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCellSnapshot {
    pub center: Vec2,
    pub owner: Option<BlockId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BannerSnapshot {
    pub visible: bool,
    pub opacity: f32,
    pub remaining_ms: u32,
}

/// Everything a view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameSnapshot {
    /// World size (width, height)
    pub canvas: Vec2,
    pub grid: Vec<GridCellSnapshot>,
    /// Blocks in draw order, topmost last
    pub blocks: Vec<BlockSnapshot>,
    pub selected: Option<BlockId>,
    pub placed_cells: usize,
    pub total_cells: usize,
    pub elapsed_ms: u64,
    pub completed: bool,
    pub paused: bool,
    pub started: bool,
    pub seed: u32,
    pub banner: BannerSnapshot,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.canvas = Vec2::ZERO;
        self.grid.clear();
        self.blocks.clear();
        self.selected = None;
        self.placed_cells = 0;
        self.total_cells = 0;
        self.elapsed_ms = 0;
        self.completed = false;
        self.paused = false;
        self.started = false;
        self.seed = 0;
        self.banner = BannerSnapshot::default();
    }

    pub fn playable(&self) -> bool {
        self.started && !self.completed && !self.paused
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockSnapshot> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
