//! Shape catalog and dealing.
//!
//! Each shape is a 4-row by 3-column matrix. `0` is empty, `1` is a filled
//! cell and `2` is a filled cell that also serves as the pivot for rotations
//! and flips. Shapes without a `2` pivot around cell (1, 1), whether or not
//! that cell is filled.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{BlockColor, Rgb, SHAPE_COLS, SHAPE_ROWS};

/// Occupancy matrix of a block, row-major
pub type ShapeMatrix = [[u8; SHAPE_COLS]; SHAPE_ROWS];

/// Maximum filled cells a shape can have
pub const MAX_SHAPE_CELLS: usize = SHAPE_ROWS * SHAPE_COLS;

const DEFAULT_PIVOT: (usize, usize) = (1, 1);

/// A block shape with its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeDef {
    pub cells: ShapeMatrix,
    pub color: BlockColor,
}

impl ShapeDef {
    pub const fn new(cells: ShapeMatrix, color: Rgb) -> Self {
        Self {
            cells,
            color: BlockColor::solid(color),
        }
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .is_some_and(|&v| v > 0)
    }

    /// Filled cells as (row, col), in row-major order
    pub fn filled_cells(&self) -> ArrayVec<(usize, usize), MAX_SHAPE_CELLS> {
        let mut out = ArrayVec::new();
        for (row, values) in self.cells.iter().enumerate() {
            for (col, &v) in values.iter().enumerate() {
                if v > 0 {
                    out.push((row, col));
                }
            }
        }
        out
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v > 0).count()
    }

    /// Cell the block rotates and flips around, as (row, col)
    pub fn pivot(&self) -> (usize, usize) {
        for (row, values) in self.cells.iter().enumerate() {
            for (col, &v) in values.iter().enumerate() {
                if v == 2 {
                    return (row, col);
                }
            }
        }
        DEFAULT_PIVOT
    }
}

/// Shapes every game uses
pub const BASE_SHAPES: [ShapeDef; 12] = [
    ShapeDef::new(
        [[1, 0, 0], [1, 0, 0], [1, 0, 0], [1, 0, 0]],
        Rgb::new(0x57, 0x27, 0x65),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 0, 0], [1, 0, 0], [1, 1, 0]],
        Rgb::new(0x19, 0x33, 0x76),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 1, 0], [1, 1, 0], [0, 0, 0]],
        Rgb::new(0xe4, 0x13, 0x2e),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 1, 0], [0, 1, 0], [0, 1, 0]],
        Rgb::new(0x05, 0x84, 0x34),
    ),
    ShapeDef::new(
        [[0, 0, 0], [0, 0, 1], [0, 1, 1], [1, 1, 0]],
        Rgb::new(0xdc, 0x50, 0x6e),
    ),
    ShapeDef::new(
        [[1, 1, 1], [0, 0, 1], [0, 0, 1], [0, 0, 0]],
        Rgb::new(0x9d, 0xc9, 0xba),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 1, 0], [0, 1, 0], [0, 0, 0]],
        Rgb::new(0x85, 0x38, 0x1c),
    ),
    ShapeDef::new(
        [[0, 0, 0], [0, 1, 1], [0, 0, 1], [0, 1, 1]],
        Rgb::new(0xdb, 0xb3, 0x01),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 0, 0], [1, 1, 0], [0, 0, 0]],
        Rgb::new(0xfe, 0x20, 0x0c),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 0, 0], [1, 1, 0], [1, 0, 0]],
        Rgb::new(0xdf, 0xbc, 0xa8),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 1, 0], [1, 0, 0], [0, 0, 0]],
        Rgb::new(0x9d, 0xaf, 0x26),
    ),
    ShapeDef::new(
        [[1, 0, 0], [1, 1, 0], [0, 0, 0], [0, 0, 0]],
        Rgb::new(0xcf, 0xc2, 0xa4),
    ),
];

/// Pool the extra shapes of a game are drawn from
pub const EXTRA_SHAPES: [ShapeDef; 4] = [
    ShapeDef::new(
        [[2, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]],
        Rgb::new(0x6a, 0x4c, 0x93),
    ),
    ShapeDef::new(
        [[1, 0, 0], [2, 0, 0], [0, 0, 0], [0, 0, 0]],
        Rgb::new(0x19, 0x82, 0xc4),
    ),
    ShapeDef::new(
        [[1, 0, 0], [2, 0, 0], [1, 0, 0], [0, 0, 0]],
        Rgb::new(0xff, 0x92, 0x4c),
    ),
    ShapeDef::new(
        [[1, 0, 0], [2, 1, 0], [0, 0, 0], [0, 0, 0]],
        Rgb::new(0x8a, 0xc9, 0x26),
    ),
];

/// Deal the block list of a game: every base shape plus `extra_count`
/// shapes from the extra pool, in shuffled order.
pub fn deal_shapes(rng: &mut SimpleRng, extra_count: usize) -> Vec<ShapeDef> {
    let mut extras = EXTRA_SHAPES;
    rng.shuffle(&mut extras);

    let mut shapes: Vec<ShapeDef> = BASE_SHAPES.to_vec();
    shapes.extend(extras.iter().take(extra_count).copied());
    rng.shuffle(&mut shapes);
    shapes
}
