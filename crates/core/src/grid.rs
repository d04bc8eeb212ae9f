//! Grid module - diamond lattice of target cells and their occupancy
//!
//! Cells are diamonds whose centers sit on a lattice with spacing
//! `half_block_size`. For lattice coordinates `i` (columns) and `j` (rows)
//! only pairs with different parity are kept, so neighbouring cells touch
//! along their edges diagonally. With the default 9x11 lattice this gives
//! 50 cells centered on the left half of the canvas.
//!
//! Occupancy is keyed by the rounded world position of a cell center.
//! Lookups are linear scans; the grid never has more than ~100 cells.

use std::collections::HashMap;

use glam::Vec2;

use crate::types::{BlockId, GameConfig};

/// Integer key of a grid cell: its center rounded to whole world units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub x: i32,
    pub y: i32,
}

impl GridKey {
    pub fn from_point(point: Vec2) -> Self {
        Self {
            x: point.x.round() as i32,
            y: point.y.round() as i32,
        }
    }
}

/// A single target cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub center: Vec2,
    /// Lattice coordinates (i, j)
    pub lattice: (i8, i8),
}

impl GridCell {
    pub fn key(&self) -> GridKey {
        GridKey::from_point(self.center)
    }
}

/// The puzzle grid
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<GridCell>,
    /// Owner per cell, same order as `cells`
    occupancy: Vec<Option<BlockId>>,
    index: HashMap<GridKey, usize>,
}

impl Grid {
    /// Build the diamond lattice described by `config`
    pub fn new(config: &GameConfig) -> Self {
        let half = config.half_block_size;
        let origin = Vec2::new(config.width / 4.0, config.height / 2.0);
        let i_max = (config.grid.cols / 2) as i8;
        let j_max = (config.grid.rows / 2) as i8;

        let mut cells = Vec::new();
        for i in -i_max..=i_max {
            for j in (-j_max..=j_max).rev() {
                if (i % 2).abs() == (j % 2).abs() {
                    continue;
                }
                cells.push(GridCell {
                    center: origin + Vec2::new(i as f32 * half, j as f32 * half),
                    lattice: (i, j),
                });
            }
        }

        let index = cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell.key(), idx))
            .collect();

        Self {
            occupancy: vec![None; cells.len()],
            cells,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, idx: usize) -> Option<&GridCell> {
        self.cells.get(idx)
    }

    pub fn centers(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cells.iter().map(|c| c.center)
    }

    /// Index of the cell whose key matches `point`
    pub fn cell_index(&self, point: Vec2) -> Option<usize> {
        self.index.get(&GridKey::from_point(point)).copied()
    }

    pub fn owner(&self, point: Vec2) -> Option<BlockId> {
        self.cell_index(point).and_then(|idx| self.occupancy[idx])
    }

    pub fn owner_at(&self, idx: usize) -> Option<BlockId> {
        self.occupancy.get(idx).copied().flatten()
    }

    /// Owner per cell, in cell order
    pub fn occupancy(&self) -> &[Option<BlockId>] {
        &self.occupancy
    }

    /// Whether the cell at `point` is taken by a block other than `exclude`.
    ///
    /// Points that are not grid cells count as occupied.
    pub fn is_occupied(&self, point: Vec2, exclude: Option<BlockId>) -> bool {
        match self.cell_index(point) {
            Some(idx) => match self.occupancy[idx] {
                Some(owner) => Some(owner) != exclude,
                None => false,
            },
            None => true,
        }
    }

    /// Mark the cell at `point` as owned by `block`.
    /// Returns false if `point` is not a grid cell.
    pub fn occupy(&mut self, point: Vec2, block: BlockId) -> bool {
        match self.cell_index(point) {
            Some(idx) => {
                self.occupancy[idx] = Some(block);
                true
            }
            None => false,
        }
    }

    /// Clear the cell at `point`.
    /// Returns false if `point` is not a grid cell.
    pub fn release(&mut self, point: Vec2) -> bool {
        match self.cell_index(point) {
            Some(idx) => {
                self.occupancy[idx] = None;
                true
            }
            None => false,
        }
    }

    /// Clear every cell owned by `block`, returning how many were cleared
    pub fn release_block(&mut self, block: BlockId) -> usize {
        let mut released = 0;
        for slot in self.occupancy.iter_mut() {
            if *slot == Some(block) {
                *slot = None;
                released += 1;
            }
        }
        released
    }

    /// Closest cell within `max_dist` of `point`. Ties keep the earlier cell.
    pub fn find_nearest(&self, point: Vec2, max_dist: f32) -> Option<usize> {
        let mut best = None;
        let mut best_dist = f32::INFINITY;
        for (idx, cell) in self.cells.iter().enumerate() {
            let dist = cell.center.distance(point);
            if dist < best_dist && dist <= max_dist {
                best_dist = dist;
                best = Some(idx);
            }
        }
        best
    }

    /// First cell whose center lies within `tolerance` of `point`
    pub fn find_within(&self, point: Vec2, tolerance: f32) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.center.distance(point) <= tolerance)
    }

    /// Cells owned by `block`
    pub fn cells_of(&self, block: BlockId) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells
            .iter()
            .zip(self.occupancy.iter())
            .filter(move |(_, owner)| **owner == Some(block))
            .map(|(cell, _)| cell)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|o| o.is_some()).count()
    }

    /// Every cell is covered
    pub fn is_complete(&self) -> bool {
        self.occupied_count() == self.cells.len()
    }

    /// Clear all occupancy
    pub fn reset(&mut self) {
        self.occupancy.fill(None);
    }
}
