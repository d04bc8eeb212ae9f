//! Block module - a draggable shape with its transform and snap logic
//!
//! A block is a shape matrix drawn as squares of side `cell_size` in its
//! local frame, placed in the world by a [`Transform`]. All geometry the
//! game needs (cell centers, corners, bounds, hit testing) is derived from
//! that transform on demand.

use arrayvec::ArrayVec;
use glam::Vec2;

use crate::grid::Grid;
use crate::shapes::{ShapeDef, MAX_SHAPE_CELLS};
use crate::transform::Transform;
use crate::types::{BlockId, FlipAxis, GameConfig};

/// Per-block motion and interaction flags
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsState {
    pub velocity_y: f32,
    pub grounded: bool,
    pub dragging: bool,
    pub selected: bool,
    pub flipped_x: bool,
    pub flipped_y: bool,
}

/// World positions of a block's filled cells
pub type CellCenters = ArrayVec<Vec2, MAX_SHAPE_CELLS>;

#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    shape: ShapeDef,
    pivot: (usize, usize),
    transform: Transform,
    /// Tray slot the block returns to on reset
    home: Transform,
    physics: PhysicsState,
    opacity: f32,
    config: GameConfig,
}

impl Block {
    /// Create block `id` at its tray slot
    pub fn new(id: BlockId, shape: ShapeDef, config: &GameConfig) -> Self {
        let mut block = Self {
            id,
            pivot: shape.pivot(),
            shape,
            transform: Self::tray_transform(id, config),
            home: Self::tray_transform(id, config),
            physics: PhysicsState::default(),
            opacity: 1.0,
            config: *config,
        };
        block.constrain_to_bounds();
        block.home = block.transform;
        block
    }

    /// Transform of tray slot `index`, before bounds are applied
    pub fn tray_transform(index: usize, config: &GameConfig) -> Transform {
        let tray = &config.tray;
        let cols = tray.cols.max(1);
        let row = (index / cols) as f32;
        let col = (index % cols) as f32;
        Transform::new(
            Vec2::new(
                tray.start_x + col * tray.horizontal_spacing,
                tray.start_y + row * tray.vertical_spacing,
            ),
            config.initial_rotation,
        )
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn shape(&self) -> &ShapeDef {
        &self.shape
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn home(&self) -> &Transform {
        &self.home
    }

    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsState {
        &mut self.physics
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_grounded(&self) -> bool {
        self.physics.grounded
    }

    pub fn is_dragging(&self) -> bool {
        self.physics.dragging
    }

    pub fn is_selected(&self) -> bool {
        self.physics.selected
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    fn cell_size(&self) -> f32 {
        self.config.cell_size()
    }

    /// Center of cell (row, col) in block-local coordinates
    pub fn local_cell_center(&self, row: usize, col: usize) -> Vec2 {
        let s = self.cell_size();
        Vec2::new(col as f32 * s + s / 2.0, row as f32 * s + s / 2.0)
    }

    pub fn local_pivot(&self) -> Vec2 {
        self.local_cell_center(self.pivot.0, self.pivot.1)
    }

    pub fn pivot_world(&self) -> Vec2 {
        self.transform.apply(self.local_pivot())
    }

    /// World centers of the filled cells, row-major
    pub fn cell_world_centers(&self) -> CellCenters {
        self.centers_under(&self.transform)
    }

    fn centers_under(&self, transform: &Transform) -> CellCenters {
        self.shape
            .filled_cells()
            .iter()
            .map(|&(row, col)| transform.apply(self.local_cell_center(row, col)))
            .collect()
    }

    /// World center of the first filled cell; the point snapping aligns
    pub fn reference_point(&self) -> Option<Vec2> {
        self.shape
            .filled_cells()
            .first()
            .map(|&(row, col)| self.transform.apply(self.local_cell_center(row, col)))
    }

    /// World corners of each filled cell, in the order
    /// top-left, top-right, bottom-right, bottom-left of the local square
    pub fn cell_world_corners(&self) -> ArrayVec<[Vec2; 4], MAX_SHAPE_CELLS> {
        let s = self.cell_size();
        self.shape
            .filled_cells()
            .iter()
            .map(|&(row, col)| {
                let x = col as f32 * s;
                let y = row as f32 * s;
                [
                    self.transform.apply(Vec2::new(x, y)),
                    self.transform.apply(Vec2::new(x + s, y)),
                    self.transform.apply(Vec2::new(x + s, y + s)),
                    self.transform.apply(Vec2::new(x, y + s)),
                ]
            })
            .collect()
    }

    /// Axis-aligned world bounds (min, max) of every filled cell corner
    pub fn world_bounds(&self) -> Option<(Vec2, Vec2)> {
        let corners = self.cell_world_corners();
        let mut points = corners.iter().flatten();
        let first = *points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
    }

    /// Shift the block so its bounds lie inside the canvas.
    /// A left or top overflow takes precedence over right or bottom.
    pub fn constrain_to_bounds(&mut self) {
        let Some((min, max)) = self.world_bounds() else {
            return;
        };

        let dx = if min.x < 0.0 {
            -min.x
        } else if max.x > self.config.width {
            self.config.width - max.x
        } else {
            0.0
        };
        let dy = if min.y < 0.0 {
            -min.y
        } else if max.y > self.config.height {
            self.config.height - max.y
        } else {
            0.0
        };

        if dx != 0.0 || dy != 0.0 {
            self.transform.translate(Vec2::new(dx, dy));
        }
    }

    /// Rotate by `angle` degrees (positive is clockwise) around the pivot
    pub fn rotate(&mut self, angle: f32) {
        let pivot = self.local_pivot();
        self.transform.rotate_about(pivot, angle);
        self.constrain_to_bounds();
    }

    /// Mirror along `axis`, keeping the pivot in place
    pub fn flip(&mut self, axis: FlipAxis) {
        let mut scale = self.transform.scale;
        match axis {
            FlipAxis::Horizontal => {
                self.physics.flipped_x = !self.physics.flipped_x;
                scale.x = if self.physics.flipped_x { -1.0 } else { 1.0 };
            }
            FlipAxis::Vertical => {
                self.physics.flipped_y = !self.physics.flipped_y;
                scale.y = if self.physics.flipped_y { -1.0 } else { 1.0 };
            }
        }
        let pivot = self.local_pivot();
        self.transform.rescale_about(pivot, scale);
        self.constrain_to_bounds();
    }

    /// Move the block origin to `position` without bounds checks
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    pub fn begin_drag(&mut self, grid: &mut Grid) {
        grid.release_block(self.id);
        self.physics.dragging = true;
        self.physics.grounded = false;
        self.opacity = self.config.drag_opacity;
    }

    /// Move the block origin to `position`, kept on the canvas
    pub fn drag_to(&mut self, position: Vec2) {
        self.set_position(position);
        self.constrain_to_bounds();
    }

    /// Drop the block and try to snap it. Returns whether it snapped.
    pub fn end_drag(&mut self, grid: &mut Grid) -> bool {
        self.physics.dragging = false;
        let snapped = self.snap_to_grid(grid);
        self.opacity = 1.0;
        snapped
    }

    /// Align the block onto the grid.
    ///
    /// The reference cell moves to the nearest grid center within reach and
    /// every other cell must then sit on a free grid cell. Nothing changes
    /// unless all cells fit.
    pub fn snap_to_grid(&mut self, grid: &mut Grid) -> bool {
        let Some(reference) = self.reference_point() else {
            return false;
        };
        let Some(nearest) = grid.find_nearest(reference, self.config.grid.max_snap_distance) else {
            return false;
        };
        let Some(target) = grid.cell(nearest) else {
            return false;
        };
        let offset = target.center - reference;

        let mut future = self.transform;
        future.translate(offset);

        let mut targets: ArrayVec<usize, MAX_SHAPE_CELLS> = ArrayVec::new();
        for center in self.centers_under(&future) {
            let Some(idx) = grid.find_within(center, self.config.grid.tolerance) else {
                return false;
            };
            if grid.owner_at(idx).is_some_and(|owner| owner != self.id) {
                return false;
            }
            targets.push(idx);
        }

        grid.release_block(self.id);
        self.transform = future;
        for idx in targets {
            if let Some(cell) = grid.cell(idx) {
                let center = cell.center;
                grid.occupy(center, self.id);
            }
        }
        self.physics.grounded = true;
        self.physics.velocity_y = 0.0;
        self.constrain_to_bounds();
        true
    }

    pub fn select(&mut self) {
        self.physics.selected = true;
    }

    pub fn deselect(&mut self) {
        self.physics.selected = false;
    }

    /// Return to the tray slot with default orientation
    pub fn reset(&mut self, grid: &mut Grid) {
        grid.release_block(self.id);
        self.transform = self.home;
        self.opacity = 1.0;
        let selected = self.physics.selected;
        self.physics = PhysicsState {
            selected,
            ..PhysicsState::default()
        };
    }

    /// Gravity is disabled: blocks stay where they are dropped
    pub fn apply_physics(&mut self) {}

    /// Whether world point `point` falls inside one of the filled cells
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = self.transform.apply_inverse(point);
        let s = self.cell_size();
        if local.x < 0.0 || local.y < 0.0 {
            return false;
        }
        let col = (local.x / s).floor() as usize;
        let row = (local.y / s).floor() as usize;
        self.shape.is_filled(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BASE_SHAPES, EXTRA_SHAPES};
    use crate::types::Rgb;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-2
    }

    fn in_bounds(block: &Block, config: &GameConfig) -> bool {
        let (min, max) = block.world_bounds().unwrap();
        min.x >= -1e-3 && min.y >= -1e-3 && max.x <= config.width + 1e-3 && max.y <= config.height + 1e-3
    }

    #[test]
    fn tray_slots_follow_layout() {
        let config = GameConfig::default();
        let t = Block::tray_transform(5, &config);
        assert_eq!(t.position, Vec2::new(520.0 + 110.0, 50.0 + 160.0));
        assert_eq!(t.rotation, 45.0);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn new_block_is_on_canvas() {
        let config = GameConfig::default();
        for (id, shape) in BASE_SHAPES.iter().enumerate() {
            let block = Block::new(id, *shape, &config);
            assert!(in_bounds(&block, &config), "block {id} out of bounds");
        }
    }

    #[test]
    fn rotate_keeps_pivot_fixed() {
        let config = GameConfig::default();
        let mut block = Block::new(0, EXTRA_SHAPES[3], &config);
        block.set_position(Vec2::new(450.0, 350.0));
        let before = block.pivot_world();
        block.rotate(90.0);
        assert_eq!(block.rotation(), 135.0);
        assert!(close(block.pivot_world(), before));
        block.rotate(-180.0);
        assert_eq!(block.rotation(), 315.0);
        assert!(close(block.pivot_world(), before));
    }

    #[test]
    fn flip_toggles_scale_and_keeps_pivot() {
        let config = GameConfig::default();
        let mut block = Block::new(0, BASE_SHAPES[3], &config);
        block.set_position(Vec2::new(450.0, 350.0));
        let before = block.pivot_world();
        block.flip(FlipAxis::Horizontal);
        assert!(block.physics().flipped_x);
        assert_eq!(block.transform().scale, Vec2::new(-1.0, 1.0));
        assert!(close(block.pivot_world(), before));
        block.flip(FlipAxis::Horizontal);
        assert!(!block.physics().flipped_x);
        assert_eq!(block.transform().scale, Vec2::ONE);
        block.flip(FlipAxis::Vertical);
        assert_eq!(block.transform().scale, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn constrain_pulls_block_back() {
        let config = GameConfig::default();
        let mut block = Block::new(0, BASE_SHAPES[0], &config);
        block.drag_to(Vec2::new(-200.0, 900.0));
        assert!(in_bounds(&block, &config));
        let (min, max) = block.world_bounds().unwrap();
        assert!(min.x.abs() < 1e-3);
        assert!((max.y - config.height).abs() < 1e-3);
    }

    #[test]
    fn snap_aligns_every_cell() {
        let config = GameConfig::default();
        let mut grid = Grid::new(&config);
        let mut block = Block::new(0, BASE_SHAPES[11], &config);
        let target = grid.cells()[20].center;
        let reference = block.reference_point().unwrap();
        block.set_position(block.position() + target - reference + Vec2::new(7.0, -6.0));

        assert!(block.snap_to_grid(&mut grid));
        assert!(block.is_grounded());
        assert!(close(block.reference_point().unwrap(), target));
        for center in block.cell_world_centers() {
            assert_eq!(grid.owner(center), Some(0));
        }
        assert_eq!(grid.occupied_count(), block.shape().cell_count());
    }

    #[test]
    fn snap_fails_far_from_grid() {
        let config = GameConfig::default();
        let mut grid = Grid::new(&config);
        let mut block = Block::new(0, BASE_SHAPES[0], &config);
        let before = *block.transform();
        assert!(!block.snap_to_grid(&mut grid));
        assert_eq!(*block.transform(), before);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn snap_rejects_occupied_cells() {
        let config = GameConfig::default();
        let mut grid = Grid::new(&config);
        let target = grid.cells()[20].center;

        let mut first = Block::new(0, EXTRA_SHAPES[0], &config);
        let reference = first.reference_point().unwrap();
        first.set_position(first.position() + target - reference);
        assert!(first.snap_to_grid(&mut grid));

        let mut second = Block::new(1, EXTRA_SHAPES[0], &config);
        let reference = second.reference_point().unwrap();
        second.set_position(second.position() + target - reference);
        let before = *second.transform();
        assert!(!second.snap_to_grid(&mut grid));
        assert_eq!(*second.transform(), before);
        assert_eq!(grid.owner(target), Some(0));
    }

    #[test]
    fn drag_releases_cells() {
        let config = GameConfig::default();
        let mut grid = Grid::new(&config);
        let mut block = Block::new(2, EXTRA_SHAPES[0], &config);
        let target = grid.cells()[0].center;
        let reference = block.reference_point().unwrap();
        block.set_position(block.position() + target - reference);
        assert!(block.end_drag(&mut grid));

        block.begin_drag(&mut grid);
        assert!(block.is_dragging());
        assert!(!block.is_grounded());
        assert_eq!(block.opacity(), config.drag_opacity);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn reset_returns_home() {
        let config = GameConfig::default();
        let mut grid = Grid::new(&config);
        let mut block = Block::new(1, BASE_SHAPES[1], &config);
        let home = *block.home();
        block.rotate(90.0);
        block.flip(FlipAxis::Vertical);
        block.drag_to(Vec2::new(100.0, 100.0));
        block.reset(&mut grid);
        assert_eq!(*block.transform(), home);
        assert!(!block.physics().flipped_y);
    }

    #[test]
    fn hit_test_uses_filled_cells() {
        let config = GameConfig::default();
        let shape = ShapeDef::new([[1, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]], Rgb::new(1, 2, 3));
        let block = Block::new(0, shape, &config);
        let inside = block.transform().apply(block.local_cell_center(0, 0));
        let empty = block.transform().apply(block.local_cell_center(1, 1));
        assert!(block.contains_point(inside));
        assert!(!block.contains_point(empty));
    }
}
